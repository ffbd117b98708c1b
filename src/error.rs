use crate::artifacts::error::ArtifactError;
use crate::features::error::FeatureError;
use crate::source::error::DataSourceError;
use crate::training::error::TrainingError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error(transparent)]
    DataSource(#[from] DataSourceError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error(transparent)]
    Training(#[from] TrainingError),
}
