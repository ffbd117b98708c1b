use crate::types::feature_column::FeatureColumn;
use serde::{Deserialize, Serialize};

pub const CITY_ENCODED: &str = "city_encoded";
pub const COUNTRY_ENCODED: &str = "country_encoded";
pub const CALENDAR_FEATURES: [&str; 3] = ["day_of_year", "month", "weekday"];

/// The layout of every feature vector produced in one run.
///
/// A vector holds, for each lag `1..=lag_days`, the value of every column in
/// `columns` from that many days before the target day; then the encoded city (and
/// country, when the table had one) of the target day; then its day of year, month
/// and weekday. With all seven columns and a country the width is `lag_days * 7 + 5`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub target: FeatureColumn,
    pub lag_days: usize,
    /// Raw columns that were present in the table, in declared order.
    pub columns: Vec<FeatureColumn>,
    pub has_country: bool,
}

impl FeatureSchema {
    pub fn width(&self) -> usize {
        self.lag_days * self.columns.len()
            + 1
            + usize::from(self.has_country)
            + CALENDAR_FEATURES.len()
    }

    /// Column names of the feature matrix, matching the emitted layout exactly.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.width());
        for lag in 1..=self.lag_days {
            names.extend(self.columns.iter().map(|c| c.lag_name(lag)));
        }
        names.push(CITY_ENCODED.to_string());
        if self.has_country {
            names.push(COUNTRY_ENCODED.to_string());
        }
        names.extend(CALENDAR_FEATURES.iter().map(|n| n.to_string()));
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_schema_names() {
        let schema = FeatureSchema {
            target: FeatureColumn::AvgTemperature,
            lag_days: 2,
            columns: FeatureColumn::ALL.to_vec(),
            has_country: true,
        };
        let names = schema.feature_names();

        assert_eq!(schema.width(), 2 * 7 + 5);
        assert_eq!(names.len(), schema.width());
        assert_eq!(names[0], "avg_temperature_lag_1");
        assert_eq!(names[6], "avg_pressure_lag_1");
        assert_eq!(names[7], "avg_temperature_lag_2");
        assert_eq!(
            &names[14..],
            ["city_encoded", "country_encoded", "day_of_year", "month", "weekday"]
        );
    }

    #[test]
    fn absent_columns_shrink_the_schema() {
        let schema = FeatureSchema {
            target: FeatureColumn::AvgTemperature,
            lag_days: 3,
            columns: vec![FeatureColumn::AvgTemperature, FeatureColumn::AvgHumidity],
            has_country: false,
        };

        assert_eq!(schema.width(), 3 * 2 + 4);
        assert_eq!(schema.feature_names().len(), schema.width());
        assert!(!schema.feature_names().contains(&"country_encoded".to_string()));
    }
}
