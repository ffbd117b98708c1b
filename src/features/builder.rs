//! Turns an observation table into a lagged supervised learning matrix.
//!
//! Each city is treated as its own time series: instance `i` of a city uses the rows
//! `i - 1 ..= i - lag_days` of that same city as inputs and row `i` as target, so no
//! value ever leaks across cities or from the future into the inputs.

use crate::features::error::FeatureError;
use crate::features::schema::FeatureSchema;
use crate::types::category_encoder::{CategoricalEncoders, CategoryEncoder};
use crate::types::feature_column::{FeatureColumn, CITY_COLUMN, COUNTRY_COLUMN};
use crate::types::observation_table::ObservationTable;
use crate::utils::calendar_features;
use chrono::NaiveDate;
use log::{debug, info, warn};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Identifies the (city, day) a feature row predicts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceKey {
    pub city: String,
    pub date: NaiveDate,
}

/// Per-run counts reported next to the feature matrix.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BuildReport {
    /// Number of distinct cities in the table.
    pub groups: usize,
    /// Cities with `rows <= lag_days`, which contribute no instances.
    pub skipped_cities: Vec<String>,
    pub instances: usize,
}

/// The output of [`FeatureBuilder::build`].
///
/// `features`, `targets` and `instance_keys` are index aligned. Rows are ordered by
/// city (sorted) and then by ascending date within each city.
#[derive(Debug, Clone)]
pub struct FeatureSet {
    /// One row per instance, `schema.width()` columns, laid out as `feature_names`.
    /// Missing measurements are `NaN`.
    pub features: Array2<f64>,
    /// The target column's value on the day each row predicts. May be `NaN` when that
    /// measurement is missing.
    pub targets: Array1<f64>,
    pub feature_names: Vec<String>,
    /// Encoders fitted on the whole table; store them to build inference rows.
    pub encoders: CategoricalEncoders,
    pub schema: FeatureSchema,
    /// The (city, date) each row predicts.
    pub instance_keys: Vec<InstanceKey>,
    pub report: BuildReport,
}

impl FeatureSet {
    /// Number of instances (rows).
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Builds lagged feature matrices predicting `target` from the previous `lag_days`
/// days of observations of the same city.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureBuilder {
    target: FeatureColumn,
    lag_days: usize,
}

impl FeatureBuilder {
    /// # Errors
    ///
    /// Returns [`FeatureError::InvalidArgument`] if `lag_days` is zero.
    pub fn new(target: FeatureColumn, lag_days: usize) -> Result<Self, FeatureError> {
        if lag_days == 0 {
            return Err(FeatureError::InvalidArgument(
                "lag_days must be at least 1".to_string(),
            ));
        }
        Ok(Self { target, lag_days })
    }

    /// Like [`FeatureBuilder::new`], with the target given by its column name.
    pub fn for_target_name(target: &str, lag_days: usize) -> Result<Self, FeatureError> {
        let target = FeatureColumn::from_name(target).ok_or_else(|| {
            FeatureError::InvalidArgument(format!("'{target}' is not a feature column"))
        })?;
        Self::new(target, lag_days)
    }

    pub fn target(&self) -> FeatureColumn {
        self.target
    }

    pub fn lag_days(&self) -> usize {
        self.lag_days
    }

    /// Builds the feature matrix, targets and encoders for `table`.
    ///
    /// Missing measurements become `NaN` and are passed through unchanged; validating
    /// them is up to the caller.
    ///
    /// # Errors
    ///
    /// * [`FeatureError::InvalidArgument`] if the table is empty, lacks the target
    ///   column, or holds two rows for the same (city, date).
    /// * [`FeatureError::EmptyResult`] if no city has more than `lag_days` rows.
    pub fn build(&self, table: &ObservationTable) -> Result<FeatureSet, FeatureError> {
        if table.is_empty() {
            return Err(FeatureError::InvalidArgument(
                "observation table is empty".to_string(),
            ));
        }

        let columns = table.feature_columns();
        let Some(target_idx) = columns.iter().position(|c| *c == self.target) else {
            return Err(FeatureError::InvalidArgument(format!(
                "target column '{}' is not present in the observation table",
                self.target
            )));
        };
        if columns.len() < FeatureColumn::ALL.len() {
            let missing: Vec<&str> = FeatureColumn::ALL
                .iter()
                .filter(|c| !columns.contains(c))
                .map(|c| c.name())
                .collect();
            warn!("Feature columns missing from table, leaving them out: {missing:?}");
        }

        let rows = SortedRows::from_table(table, &columns)?;
        let encoders = CategoricalEncoders {
            city: CategoryEncoder::fit(&rows.cities),
            country: rows.countries.as_ref().map(|c| CategoryEncoder::fit(c)),
        };
        debug!(
            "Encoded {} cities and {} countries",
            encoders.city.len(),
            encoders.country.as_ref().map_or(0, CategoryEncoder::len)
        );

        let schema = FeatureSchema {
            target: self.target,
            lag_days: self.lag_days,
            columns,
            has_country: rows.countries.is_some(),
        };

        let groups = rows.groups();
        let mut report = BuildReport {
            groups: groups.len(),
            ..Default::default()
        };
        let mut flat = Vec::new();
        let mut targets = Vec::new();
        let mut instance_keys = Vec::new();

        for group in groups {
            let city = &rows.cities[group.start];
            if group.len() <= self.lag_days {
                warn!(
                    "City '{}' has {} rows, not enough history for {} lag days; skipping",
                    city,
                    group.len(),
                    self.lag_days
                );
                report.skipped_cities.push(city.clone());
                continue;
            }

            for i in group.start + self.lag_days..group.end {
                rows.push_lagged(i, self.lag_days, &mut flat);
                rows.push_encoded(i, &encoders, &mut flat)?;
                flat.extend(calendar_features(rows.dates[i]));
                targets.push(rows.values[target_idx][i]);
                instance_keys.push(InstanceKey {
                    city: city.clone(),
                    date: rows.dates[i],
                });
            }
        }

        if targets.is_empty() {
            return Err(FeatureError::EmptyResult {
                groups: report.groups,
                skipped: report.skipped_cities.len(),
            });
        }
        report.instances = targets.len();
        info!(
            "Built {} instances of width {} from {} city groups ({} skipped)",
            report.instances,
            schema.width(),
            report.groups,
            report.skipped_cities.len()
        );

        Ok(FeatureSet {
            features: Array2::from_shape_vec((targets.len(), schema.width()), flat)?,
            targets: Array1::from(targets),
            feature_names: schema.feature_names(),
            encoders,
            schema,
            instance_keys,
            report,
        })
    }
}

/// Builds features for `table` predicting the column named `target_column`.
///
/// Shorthand for [`FeatureBuilder::for_target_name`] followed by
/// [`FeatureBuilder::build`].
pub fn build_features(
    table: &ObservationTable,
    target_column: &str,
    lag_days: usize,
) -> Result<FeatureSet, FeatureError> {
    FeatureBuilder::for_target_name(target_column, lag_days)?.build(table)
}

/// Observation columns extracted into plain vectors, sorted by (city, date).
pub(crate) struct SortedRows {
    pub dates: Vec<NaiveDate>,
    pub cities: Vec<String>,
    pub countries: Option<Vec<String>>,
    // One vector per schema column, NaN where the measurement is missing.
    pub values: Vec<Vec<f64>>,
}

impl SortedRows {
    pub fn from_table(
        table: &ObservationTable,
        columns: &[FeatureColumn],
    ) -> Result<Self, FeatureError> {
        let sorted = table.sorted_by_city_and_date()?;
        let dates = sorted.dates()?;
        let cities = sorted.strings(CITY_COLUMN)?;
        let countries = if sorted.has_country() {
            Some(sorted.strings(COUNTRY_COLUMN)?)
        } else {
            None
        };

        let mut values = Vec::with_capacity(columns.len());
        for column in columns {
            let column_values = sorted
                .values(*column)?
                .ok_or_else(|| FeatureError::MissingColumn(column.name().to_string()))?;
            values.push(
                column_values
                    .into_iter()
                    .map(|v| v.unwrap_or(f64::NAN))
                    .collect(),
            );
        }

        for i in 1..dates.len() {
            if cities[i] == cities[i - 1] && dates[i] == dates[i - 1] {
                return Err(FeatureError::InvalidArgument(format!(
                    "duplicate observation for city '{}' on {}",
                    cities[i], dates[i]
                )));
            }
        }

        Ok(Self {
            dates,
            cities,
            countries,
            values,
        })
    }

    /// Contiguous row ranges of each city, in sorted order.
    pub fn groups(&self) -> Vec<Range<usize>> {
        let mut groups = Vec::new();
        let mut start = 0;
        for i in 1..=self.cities.len() {
            if i == self.cities.len() || self.cities[i] != self.cities[start] {
                groups.push(start..i);
                start = i;
            }
        }
        groups
    }

    /// Appends the lagged values for a target at row `target`, which may be one past the
    /// end of its group when forecasting. Requires `target >= lag_days`.
    pub fn push_lagged(&self, target: usize, lag_days: usize, out: &mut Vec<f64>) {
        for lag in 1..=lag_days {
            for column in &self.values {
                out.push(column[target - lag]);
            }
        }
    }

    /// Appends the encoded city and country of row `row`.
    pub fn push_encoded(
        &self,
        row: usize,
        encoders: &CategoricalEncoders,
        out: &mut Vec<f64>,
    ) -> Result<(), FeatureError> {
        out.push(encode(&encoders.city, CITY_COLUMN, &self.cities[row])? as f64);
        if let (Some(encoder), Some(countries)) = (&encoders.country, &self.countries) {
            out.push(encode(encoder, COUNTRY_COLUMN, &countries[row])? as f64);
        }
        Ok(())
    }
}

fn encode(encoder: &CategoryEncoder, column: &str, value: &str) -> Result<u32, FeatureError> {
    encoder
        .encode(value)
        .ok_or_else(|| FeatureError::UnknownCategory {
            column: column.to_string(),
            value: value.to_string(),
        })
}
