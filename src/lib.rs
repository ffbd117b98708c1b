mod artifacts;
mod error;
mod features;
mod pipeline;
mod source;
mod training;
mod types;
mod utils;

pub use error::ForecastError;
pub use pipeline::*;

pub use types::category_encoder::{CategoricalEncoders, CategoryEncoder};
pub use types::feature_column::{
    FeatureColumn, UnknownFeatureColumn, CITY_COLUMN, COUNTRY_COLUMN, DATE_COLUMN,
};
pub use types::observation::Observation;
pub use types::observation_table::ObservationTable;

pub use features::builder::{build_features, BuildReport, FeatureBuilder, FeatureSet, InstanceKey};
pub use features::forecast::ForecastSet;
pub use features::scaler::{ScalerParams, StandardScaler};
pub use features::schema::FeatureSchema;
pub use features::split::{split, split_point, TrainTestSplit};

pub use artifacts::FeatureArtifacts;

pub use source::memory::MemorySource;
pub use source::warehouse::WarehouseSource;
pub use source::DataSource;

pub use training::metrics::{evaluate, fit_and_evaluate, mean_squared_error, r2_score, Evaluation};
pub use training::regressor::{Regressor, RidgeRegressor};

pub use utils::default_warehouse_root;

pub use artifacts::error::ArtifactError;
pub use features::error::FeatureError;
pub use source::error::DataSourceError;
pub use training::error::TrainingError;
