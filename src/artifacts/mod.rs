//! Everything fitted during a pipeline run that inference needs to reproduce the exact
//! same features: the feature schema, the categorical encoders and the scaler params.
//!
//! These are stored next to the trained model. Refitting them on new data would assign
//! different codes and scales than the model was trained with.

pub mod error;

use crate::artifacts::error::ArtifactError;
use crate::features::error::FeatureError;
use crate::features::forecast::{build_forecast_rows, ForecastSet};
use crate::features::scaler::ScalerParams;
use crate::features::schema::FeatureSchema;
use crate::types::category_encoder::CategoricalEncoders;
use crate::types::observation_table::ObservationTable;
use bincode::config::{Configuration, Fixint, LittleEndian};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

const BINCODE_CONFIG: Configuration<LittleEndian, Fixint> =
    bincode::config::standard().with_fixed_int_encoding();

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureArtifacts {
    pub schema: FeatureSchema,
    pub encoders: CategoricalEncoders,
    pub scaler: ScalerParams,
}

impl FeatureArtifacts {
    pub fn feature_names(&self) -> Vec<String> {
        self.schema.feature_names()
    }

    /// Builds scaled feature rows forecasting the day after each city's latest
    /// observation in `table`, using the stored encoders and scaler.
    ///
    /// # Errors
    ///
    /// * [`FeatureError::UnknownCategory`] for a city or country not seen in training.
    /// * [`FeatureError::SchemaMismatch`] if `table` lacks a column the model was
    ///   trained with.
    pub fn forecast_features(&self, table: &ObservationTable) -> Result<ForecastSet, FeatureError> {
        let rows = build_forecast_rows(&self.schema, &self.encoders, table)?;
        Ok(ForecastSet {
            features: self.scaler.transform(&rows.features)?,
            ..rows
        })
    }

    /// Writes the artifacts to `path` in bincode format, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ArtifactError> {
        let bytes = bincode::serde::encode_to_vec(self, BINCODE_CONFIG)
            .map_err(|e| ArtifactError::Encode(Box::new(e)))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ArtifactError::Write(path.to_path_buf(), e))?;
        }
        std::fs::write(path, &bytes).map_err(|e| ArtifactError::Write(path.to_path_buf(), e))?;
        info!("Wrote feature artifacts ({} bytes) to {}", bytes.len(), path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let bytes = std::fs::read(path).map_err(|e| ArtifactError::Read(path.to_path_buf(), e))?;
        let (artifacts, _) = bincode::serde::decode_from_slice::<Self, _>(&bytes, BINCODE_CONFIG)
            .map_err(|e| ArtifactError::Decode(path.to_path_buf(), Box::new(e)))?;
        Ok(artifacts)
    }

    /// Human-readable dump, useful for logging next to a model registry entry.
    pub fn to_json(&self) -> Result<String, ArtifactError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
