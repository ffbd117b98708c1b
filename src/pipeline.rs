//! This module provides the main entry point: turning a table of observations (or a
//! table fetched from a [`DataSource`]) into scaled, chronologically split training
//! data plus the artifacts needed to build identical features at inference time.

use crate::artifacts::FeatureArtifacts;
use crate::error::ForecastError;
use crate::features::builder::{BuildReport, FeatureBuilder, InstanceKey};
use crate::features::error::FeatureError;
use crate::features::scaler::StandardScaler;
use crate::features::split::{split, split_point, TrainTestSplit};
use crate::source::DataSource;
use crate::training::metrics::{fit_and_evaluate, Evaluation};
use crate::training::regressor::Regressor;
use crate::types::feature_column::FeatureColumn;
use crate::types::observation_table::ObservationTable;
use bon::{bon, Builder};
use log::{info, warn};

/// Table fetched by [`ForecastPipeline::fetch`] when none is given.
pub const DEFAULT_TABLE: &str = "weather_summary";
/// Row limit used by [`ForecastPipeline::fetch`] when none is given.
pub const DEFAULT_ROW_LIMIT: usize = 10_000;

/// Settings for one training-data preparation run.
///
/// Defaults: predict `avg_temperature` from 1 day of history and hold out the last 20%
/// of instances for testing.
///
/// # Examples
///
/// ```
/// use weathercast::{FeatureColumn, ForecastPipeline};
///
/// let pipeline = ForecastPipeline::builder()
///     .target(FeatureColumn::MaxTemperature)
///     .lag_days(3)
///     .build();
/// assert_eq!(pipeline.lag_days(), 3);
/// assert_eq!(pipeline.test_fraction(), 0.2);
/// ```
#[derive(Debug, Clone, Builder)]
pub struct ForecastPipeline {
    #[builder(default = FeatureColumn::AvgTemperature)]
    target: FeatureColumn,
    #[builder(default = 1)]
    lag_days: usize,
    #[builder(default = 0.2)]
    test_fraction: f64,
}

/// Scaled train/test data ready for a [`Regressor`], with everything needed to
/// reproduce the features later.
#[derive(Debug, Clone)]
pub struct PreparedData {
    /// Feature matrices are scaled; targets are raw values of the target column.
    pub split: TrainTestSplit,
    pub train_keys: Vec<InstanceKey>,
    pub test_keys: Vec<InstanceKey>,
    pub feature_names: Vec<String>,
    pub artifacts: FeatureArtifacts,
    pub report: BuildReport,
}

impl PreparedData {
    /// Fits `model` on the training rows and scores it on the test rows.
    pub fn evaluate<R: Regressor + ?Sized>(&self, model: &mut R) -> Result<Evaluation, ForecastError> {
        Ok(fit_and_evaluate(model, &self.split)?)
    }
}

#[bon]
impl ForecastPipeline {
    pub fn target(&self) -> FeatureColumn {
        self.target
    }

    pub fn lag_days(&self) -> usize {
        self.lag_days
    }

    pub fn test_fraction(&self) -> f64 {
        self.test_fraction
    }

    /// Builds lagged features from `table`, splits them chronologically and scales
    /// both sides with params fitted on the training rows only.
    ///
    /// # Errors
    ///
    /// * [`FeatureError::InvalidArgument`] for an empty table, a missing target column,
    ///   `lag_days == 0`, or a `test_fraction` that leaves either side empty.
    /// * [`FeatureError::EmptyResult`] if no city has enough history.
    pub fn prepare(&self, table: &ObservationTable) -> Result<PreparedData, ForecastError> {
        let set = FeatureBuilder::new(self.target, self.lag_days)?.build(table)?;
        let at = split_point(set.len(), self.test_fraction)?;
        let raw = split(&set.features, &set.targets, self.test_fraction)?;

        let (scaler, x_train) = StandardScaler::fit_transform(&raw.x_train)?;
        let x_test = scaler.transform(&raw.x_test)?;
        info!("Training set size: {:?}", x_train.dim());
        info!("Test set size: {:?}", x_test.dim());

        let mut train_keys = set.instance_keys;
        let test_keys = train_keys.split_off(at);

        Ok(PreparedData {
            split: TrainTestSplit {
                x_train,
                x_test,
                y_train: raw.y_train,
                y_test: raw.y_test,
            },
            train_keys,
            test_keys,
            feature_names: set.feature_names,
            artifacts: FeatureArtifacts {
                schema: set.schema,
                encoders: set.encoders,
                scaler,
            },
            report: set.report,
        })
    }

    /// Fetches observations from a data source and prepares them.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `source`: **Required.** The [`DataSource`] to read from.
    /// * `.table(&str)`: Optional. Table name, defaults to [`DEFAULT_TABLE`].
    /// * `.row_limit(usize)`: Optional. Most recent rows to fetch, defaults to
    ///   [`DEFAULT_ROW_LIMIT`].
    ///
    /// # Errors
    ///
    /// Fetch failures are returned as [`ForecastError::DataSource`]. A fetch that
    /// returns no rows aborts with [`FeatureError::EmptyResult`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use weathercast::{ForecastPipeline, WarehouseSource};
    ///
    /// # fn main() -> Result<(), weathercast::ForecastError> {
    /// let source = WarehouseSource::builder()
    ///     .project("weather-demo")
    ///     .dataset("weather_dataset")
    ///     .build();
    ///
    /// let prepared = ForecastPipeline::builder()
    ///     .build()
    ///     .fetch(&source)
    ///     .row_limit(5_000)
    ///     .call()?;
    /// println!("{} training rows", prepared.split.train_size());
    /// # Ok(())
    /// # }
    /// ```
    #[builder(start_fn = fetch)]
    #[doc(hidden)]
    pub fn build_fetch(
        &self,
        #[builder(start_fn)] source: &dyn DataSource,
        table: Option<&str>,
        row_limit: Option<usize>,
    ) -> Result<PreparedData, ForecastError> {
        let table_name = table.unwrap_or(DEFAULT_TABLE);
        let observations =
            source.fetch(table_name, Some(row_limit.unwrap_or(DEFAULT_ROW_LIMIT)))?;

        if observations.is_empty() {
            warn!("Table {} returned no rows", table_name);
            return Err(FeatureError::EmptyResult {
                groups: 0,
                skipped: 0,
            }
            .into());
        }
        info!("Preparing {} rows from table {}", observations.len(), table_name);
        self.prepare(&observations)
    }
}
