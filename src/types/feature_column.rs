//! Defines the raw numeric weather columns that feed the lagged feature vectors,
//! together with the names of the key columns every observation table carries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of the observation date column.
pub const DATE_COLUMN: &str = "date";
/// Name of the city column. This is also the grouping key for lag construction.
pub const CITY_COLUMN: &str = "city";
/// Name of the country column.
pub const COUNTRY_COLUMN: &str = "country";

/// One of the raw numeric weather measurements recorded per city and day.
///
/// The declaration order is significant: lagged features are always emitted in the
/// order of [`FeatureColumn::ALL`], so every row of a feature matrix has the same layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeatureColumn {
    /// Daily mean temperature (°C).
    AvgTemperature,
    /// Daily maximum temperature (°C).
    MaxTemperature,
    /// Daily minimum temperature (°C).
    MinTemperature,
    /// Total precipitation over the day (mm).
    TotalPrecipitation,
    /// Maximum wind speed over the day (km/h).
    MaxWindSpeed,
    /// Mean relative humidity (%).
    AvgHumidity,
    /// Mean sea-level pressure (hPa).
    AvgPressure,
}

impl FeatureColumn {
    /// All feature columns, in their fixed declared order.
    pub const ALL: [FeatureColumn; 7] = [
        FeatureColumn::AvgTemperature,
        FeatureColumn::MaxTemperature,
        FeatureColumn::MinTemperature,
        FeatureColumn::TotalPrecipitation,
        FeatureColumn::MaxWindSpeed,
        FeatureColumn::AvgHumidity,
        FeatureColumn::AvgPressure,
    ];

    /// The column name used in observation tables and warehouse files.
    pub fn name(&self) -> &'static str {
        match self {
            FeatureColumn::AvgTemperature => "avg_temperature",
            FeatureColumn::MaxTemperature => "max_temperature",
            FeatureColumn::MinTemperature => "min_temperature",
            FeatureColumn::TotalPrecipitation => "total_precipitation",
            FeatureColumn::MaxWindSpeed => "max_wind_speed",
            FeatureColumn::AvgHumidity => "avg_humidity",
            FeatureColumn::AvgPressure => "avg_pressure",
        }
    }

    /// Name of this column's feature at the given lag, e.g. `avg_temperature_lag_1`.
    pub fn lag_name(&self, lag: usize) -> String {
        format!("{}_lag_{}", self.name(), lag)
    }

    /// Looks up a feature column by its table name.
    pub fn from_name(name: &str) -> Option<FeatureColumn> {
        FeatureColumn::ALL.into_iter().find(|c| c.name() == name)
    }
}

/// Formats a `FeatureColumn` using its table column name.
///
/// # Examples
///
/// ```
/// use weathercast::FeatureColumn;
///
/// assert_eq!(FeatureColumn::AvgTemperature.to_string(), "avg_temperature");
/// ```
impl fmt::Display for FeatureColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Error returned when parsing a string that is not a known feature column name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a feature column")]
pub struct UnknownFeatureColumn(pub String);

impl FromStr for FeatureColumn {
    type Err = UnknownFeatureColumn;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeatureColumn::from_name(s).ok_or_else(|| UnknownFeatureColumn(s.to_string()))
    }
}
