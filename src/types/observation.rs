use crate::types::feature_column::FeatureColumn;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of weather for one city, as stored in the warehouse summary table.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub city: String,
    pub country: String,
    pub avg_temperature: Option<f64>,     // °C
    pub max_temperature: Option<f64>,     // °C
    pub min_temperature: Option<f64>,     // °C
    pub total_precipitation: Option<f64>, // mm
    pub max_wind_speed: Option<f64>,      // km/h
    pub avg_humidity: Option<f64>,        // %
    pub avg_pressure: Option<f64>,        // hPa
}

impl Observation {
    /// Creates an observation with every measurement missing.
    pub fn new(date: NaiveDate, city: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            date,
            city: city.into(),
            country: country.into(),
            avg_temperature: None,
            max_temperature: None,
            min_temperature: None,
            total_precipitation: None,
            max_wind_speed: None,
            avg_humidity: None,
            avg_pressure: None,
        }
    }

    pub fn value(&self, column: FeatureColumn) -> Option<f64> {
        match column {
            FeatureColumn::AvgTemperature => self.avg_temperature,
            FeatureColumn::MaxTemperature => self.max_temperature,
            FeatureColumn::MinTemperature => self.min_temperature,
            FeatureColumn::TotalPrecipitation => self.total_precipitation,
            FeatureColumn::MaxWindSpeed => self.max_wind_speed,
            FeatureColumn::AvgHumidity => self.avg_humidity,
            FeatureColumn::AvgPressure => self.avg_pressure,
        }
    }

    pub fn set_value(&mut self, column: FeatureColumn, value: Option<f64>) {
        let slot = match column {
            FeatureColumn::AvgTemperature => &mut self.avg_temperature,
            FeatureColumn::MaxTemperature => &mut self.max_temperature,
            FeatureColumn::MinTemperature => &mut self.min_temperature,
            FeatureColumn::TotalPrecipitation => &mut self.total_precipitation,
            FeatureColumn::MaxWindSpeed => &mut self.max_wind_speed,
            FeatureColumn::AvgHumidity => &mut self.avg_humidity,
            FeatureColumn::AvgPressure => &mut self.avg_pressure,
        };
        *slot = value;
    }

    /// Builder-style setter, handy for fixtures.
    pub fn with(mut self, column: FeatureColumn, value: f64) -> Self {
        self.set_value(column, Some(value));
        self
    }
}
