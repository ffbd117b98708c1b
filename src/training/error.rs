use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("Model has not been fitted")]
    NotFitted,

    #[error("Cannot fit on an empty training set")]
    EmptyTrainingSet,

    #[error("Feature matrix has {rows} rows but there are {targets} targets")]
    LengthMismatch { rows: usize, targets: usize },

    #[error("Model expects {expected} features, got {found}")]
    FeatureCountMismatch { expected: usize, found: usize },

    #[error("Normal equations are singular; use a positive alpha")]
    Singular,

    #[error("Invalid hyperparameter: {0}")]
    InvalidHyperparameter(String),
}
