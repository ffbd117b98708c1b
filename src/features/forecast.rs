//! Feature rows for forecasting the day after the latest observation of each city.

use crate::features::builder::{InstanceKey, SortedRows};
use crate::features::error::FeatureError;
use crate::features::schema::FeatureSchema;
use crate::types::category_encoder::CategoricalEncoders;
use crate::types::feature_column::{FeatureColumn, COUNTRY_COLUMN};
use crate::types::observation_table::ObservationTable;
use crate::utils::calendar_features;
use log::warn;
use ndarray::Array2;

/// Unscaled forecast rows, one per city with enough history.
#[derive(Debug, Clone)]
pub struct ForecastSet {
    pub features: Array2<f64>,
    /// The (city, day) each row forecasts: the day after the city's last observation.
    pub keys: Vec<InstanceKey>,
    /// Cities with fewer than `lag_days` rows.
    pub skipped_cities: Vec<String>,
}

/// Builds one feature row per city using a schema and encoders fitted earlier.
///
/// The encoders are not refitted: a city or country they do not know is an error,
/// because a fresh code would not mean what the model learned.
pub(crate) fn build_forecast_rows(
    schema: &FeatureSchema,
    encoders: &CategoricalEncoders,
    table: &ObservationTable,
) -> Result<ForecastSet, FeatureError> {
    if table.is_empty() {
        return Err(FeatureError::InvalidArgument(
            "observation table is empty".to_string(),
        ));
    }
    check_schema(schema, table)?;

    let rows = SortedRows::from_table(table, &schema.columns)?;
    let mut flat = Vec::new();
    let mut keys = Vec::new();
    let mut skipped_cities = Vec::new();

    for group in rows.groups() {
        let city = &rows.cities[group.start];
        if group.len() < schema.lag_days {
            warn!(
                "City '{}' has {} rows, need {} to forecast; skipping",
                city,
                group.len(),
                schema.lag_days
            );
            skipped_cities.push(city.clone());
            continue;
        }

        let last = group.end - 1;
        let date = rows.dates[last].succ_opt().ok_or_else(|| {
            FeatureError::InvalidArgument(format!("no day follows {}", rows.dates[last]))
        })?;

        rows.push_lagged(group.end, schema.lag_days, &mut flat);
        rows.push_encoded(last, encoders, &mut flat)?;
        flat.extend(calendar_features(date));
        keys.push(InstanceKey {
            city: city.clone(),
            date,
        });
    }

    Ok(ForecastSet {
        features: Array2::from_shape_vec((keys.len(), schema.width()), flat)?,
        keys,
        skipped_cities,
    })
}

fn check_schema(schema: &FeatureSchema, table: &ObservationTable) -> Result<(), FeatureError> {
    let present = table.feature_columns();
    let columns_ok = schema.columns.iter().all(|c| present.contains(c));
    let country_ok = !schema.has_country || table.has_country();
    if columns_ok && country_ok {
        return Ok(());
    }

    let describe = |columns: &[FeatureColumn], country: bool| {
        let mut names: Vec<&str> = columns.iter().map(|c| c.name()).collect();
        if country {
            names.push(COUNTRY_COLUMN);
        }
        names.join(", ")
    };
    Err(FeatureError::SchemaMismatch {
        expected: describe(&schema.columns, schema.has_country),
        found: describe(&present, table.has_country()),
    })
}
