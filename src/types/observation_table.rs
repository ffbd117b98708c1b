//! Contains the `ObservationTable` structure: a validated polars frame of per-city daily
//! weather observations.

use crate::features::error::FeatureError;
use crate::types::feature_column::{FeatureColumn, CITY_COLUMN, COUNTRY_COLUMN, DATE_COLUMN};
use crate::types::observation::Observation;
use crate::utils::date_from_epoch_days;
use chrono::NaiveDate;
use polars::prelude::*;

/// A table of daily weather observations, one row per (city, date).
///
/// The underlying frame always has a `date` column of type `Date` and a `city` column of
/// type `String`. A `country` column (`String`) and any subset of the
/// [`FeatureColumn`]s (`Float64`) may be present; columns that are absent are simply
/// left out of the features built from the table.
///
/// The table is never mutated after construction. Operations that reorder or limit
/// rows return a new table.
///
/// Missing measurements are kept as nulls. They are not imputed or dropped here.
#[derive(Debug, Clone)]
pub struct ObservationTable {
    frame: DataFrame,
}

impl ObservationTable {
    /// Validates and normalizes a polars frame into an observation table.
    ///
    /// Only the known columns are kept. `date` may be a `Date`, a `Datetime` or a
    /// `YYYY-MM-DD` string column; numeric feature columns are cast to `Float64`.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::MissingColumn`] if `date` or `city` is absent,
    /// [`FeatureError::DateParse`] if a date string is malformed and
    /// [`FeatureError::DataFrameProcessing`] if a cast fails.
    pub fn from_frame(frame: DataFrame) -> Result<Self, FeatureError> {
        for required in [DATE_COLUMN, CITY_COLUMN] {
            if frame.column(required).is_err() {
                return Err(FeatureError::MissingColumn(required.to_string()));
            }
        }

        let mut columns = vec![
            normalize_date_column(frame.column(DATE_COLUMN)?)?,
            frame.column(CITY_COLUMN)?.cast(&DataType::String)?,
        ];
        if let Ok(country) = frame.column(COUNTRY_COLUMN) {
            columns.push(country.cast(&DataType::String)?);
        }
        for feature in FeatureColumn::ALL {
            if let Ok(values) = frame.column(feature.name()) {
                columns.push(values.cast(&DataType::Float64)?);
            }
        }

        Ok(Self {
            frame: DataFrame::new(columns)?,
        })
    }

    /// Builds a table holding every column from a list of observations.
    pub fn from_observations(observations: &[Observation]) -> Result<Self, FeatureError> {
        let dates: Vec<NaiveDate> = observations.iter().map(|o| o.date).collect();
        let cities: Vec<&str> = observations.iter().map(|o| o.city.as_str()).collect();
        let countries: Vec<&str> = observations.iter().map(|o| o.country.as_str()).collect();

        let mut columns = vec![
            Column::new(DATE_COLUMN.into(), dates),
            Column::new(CITY_COLUMN.into(), cities),
            Column::new(COUNTRY_COLUMN.into(), countries),
        ];
        for feature in FeatureColumn::ALL {
            let values: Vec<Option<f64>> = observations.iter().map(|o| o.value(feature)).collect();
            columns.push(Column::new(feature.name().into(), values));
        }

        Self::from_frame(DataFrame::new(columns)?)
    }

    /// The normalized polars frame backing this table.
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    pub fn len(&self) -> usize {
        self.frame.height()
    }

    /// `true` when the table holds no rows. A fetch that matches nothing yields an
    /// empty table rather than an error.
    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    pub fn has_country(&self) -> bool {
        self.frame.column(COUNTRY_COLUMN).is_ok()
    }

    /// The feature columns present in this table, in declared order.
    pub fn feature_columns(&self) -> Vec<FeatureColumn> {
        FeatureColumn::ALL
            .into_iter()
            .filter(|c| self.frame.column(c.name()).is_ok())
            .collect()
    }

    /// Returns a copy of the table sorted by city, then date, both ascending.
    /// Rows that compare equal keep their relative order.
    pub fn sorted_by_city_and_date(&self) -> Result<ObservationTable, FeatureError> {
        let frame = self
            .frame
            .clone()
            .lazy()
            .sort(
                [CITY_COLUMN, DATE_COLUMN],
                SortMultipleOptions::default().with_maintain_order(true),
            )
            .collect()?;
        Ok(Self { frame })
    }

    /// Returns the most recent rows first, keeping at most `limit` of them.
    pub fn latest(&self, limit: Option<usize>) -> Result<ObservationTable, FeatureError> {
        let mut lazy = self.frame.clone().lazy().sort(
            [DATE_COLUMN],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        );
        if let Some(limit) = limit {
            lazy = lazy.limit(IdxSize::try_from(limit).unwrap_or(IdxSize::MAX));
        }
        Ok(Self {
            frame: lazy.collect()?,
        })
    }

    pub(crate) fn dates(&self) -> Result<Vec<NaiveDate>, FeatureError> {
        self.frame
            .column(DATE_COLUMN)?
            .date()?
            .into_iter()
            .map(|days| {
                days.map(date_from_epoch_days).ok_or_else(|| {
                    FeatureError::InvalidArgument("observation table contains a null date".into())
                })
            })
            .collect()
    }

    pub(crate) fn strings(&self, name: &str) -> Result<Vec<String>, FeatureError> {
        self.frame
            .column(name)?
            .str()?
            .into_iter()
            .map(|value| {
                value.map(str::to_string).ok_or_else(|| {
                    FeatureError::InvalidArgument(format!("column '{name}' contains a null value"))
                })
            })
            .collect()
    }

    /// Values of a feature column, or `None` when the table does not have it.
    pub(crate) fn values(&self, column: FeatureColumn) -> Result<Option<Vec<Option<f64>>>, FeatureError> {
        match self.frame.column(column.name()) {
            Ok(values) => Ok(Some(values.f64()?.into_iter().collect())),
            Err(_) => Ok(None),
        }
    }

    /// Collects the table into row structs. Columns absent from the table come back as
    /// `None` measurements and an empty country.
    pub fn to_observations(&self) -> Result<Vec<Observation>, FeatureError> {
        let dates = self.dates()?;
        let cities = self.strings(CITY_COLUMN)?;
        let countries = if self.has_country() {
            Some(self.strings(COUNTRY_COLUMN)?)
        } else {
            None
        };

        let mut rows: Vec<Observation> = dates
            .into_iter()
            .zip(cities)
            .enumerate()
            .map(|(i, (date, city))| {
                let country = countries
                    .as_ref()
                    .map(|c| c[i].clone())
                    .unwrap_or_default();
                Observation::new(date, city, country)
            })
            .collect();

        for feature in FeatureColumn::ALL {
            if let Some(values) = self.values(feature)? {
                for (row, value) in rows.iter_mut().zip(values) {
                    row.set_value(feature, value);
                }
            }
        }
        Ok(rows)
    }
}

fn normalize_date_column(column: &Column) -> Result<Column, FeatureError> {
    match column.dtype() {
        DataType::Date => Ok(column.clone()),
        DataType::Datetime(_, _) => Ok(column.cast(&DataType::Date)?),
        DataType::String => {
            let parsed = column
                .str()?
                .into_iter()
                .map(|value| {
                    value
                        .map(|s| {
                            NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|source| {
                                FeatureError::DateParse {
                                    value: s.to_string(),
                                    source,
                                }
                            })
                        })
                        .transpose()
                })
                .collect::<Result<Vec<Option<NaiveDate>>, FeatureError>>()?;
            Ok(Column::new(DATE_COLUMN.into(), parsed))
        }
        other => Err(FeatureError::InvalidArgument(format!(
            "column '{DATE_COLUMN}' has unsupported type {other}"
        ))),
    }
}
