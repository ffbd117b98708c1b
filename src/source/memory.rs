use crate::source::error::DataSourceError;
use crate::source::DataSource;
use crate::types::observation_table::ObservationTable;
use std::collections::HashMap;

/// A [`DataSource`] serving tables held in memory.
///
/// Fetches behave like the warehouse: rows come back newest first and `row_limit` keeps
/// the most recent ones. Unknown table names yield
/// [`DataSourceError::TableNotFound`].
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use weathercast::{DataSource, MemorySource, Observation, ObservationTable};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let day = |d| NaiveDate::from_ymd_opt(2024, 5, d).unwrap();
/// let table = ObservationTable::from_observations(&[
///     Observation::new(day(1), "Ghent", "Belgium"),
///     Observation::new(day(2), "Ghent", "Belgium"),
/// ])?;
/// let source = MemorySource::new().with_table("weather_summary", table);
///
/// let latest = source.fetch("weather_summary", Some(1))?;
/// assert_eq!(latest.to_observations()?[0].date, day(2));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: HashMap<String, ObservationTable>,
}

impl MemorySource {
    /// Creates a source without any tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a table and returns the source, for chaining.
    ///
    /// # Arguments
    ///
    /// * `name` - The name `fetch` will look the table up by.
    /// * `table` - The observations to serve.
    pub fn with_table(mut self, name: impl Into<String>, table: ObservationTable) -> Self {
        self.insert(name, table);
        self
    }

    /// Adds or replaces the table called `name`.
    pub fn insert(&mut self, name: impl Into<String>, table: ObservationTable) {
        self.tables.insert(name.into(), table);
    }
}

impl DataSource for MemorySource {
    fn fetch(
        &self,
        table_name: &str,
        row_limit: Option<usize>,
    ) -> Result<ObservationTable, DataSourceError> {
        let table = self
            .tables
            .get(table_name)
            .ok_or_else(|| DataSourceError::TableNotFound {
                table: table_name.to_string(),
                location: "memory source".to_string(),
            })?;
        table
            .latest(row_limit)
            .map_err(|source| DataSourceError::InvalidTable {
                table: table_name.to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::observation::Observation;
    use chrono::NaiveDate;

    #[test]
    fn fetch_orders_and_limits() -> Result<(), Box<dyn std::error::Error>> {
        let day = |d| NaiveDate::from_ymd_opt(2024, 4, d).unwrap();
        let table = ObservationTable::from_observations(&[
            Observation::new(day(2), "Kyiv", "Ukraine"),
            Observation::new(day(5), "Lviv", "Ukraine"),
            Observation::new(day(3), "Kyiv", "Ukraine"),
        ])?;
        let source = MemorySource::new().with_table("weather_summary", table);

        let fetched = source.fetch("weather_summary", Some(2))?.to_observations()?;
        let dates: Vec<NaiveDate> = fetched.iter().map(|o| o.date).collect();
        assert_eq!(dates, vec![day(5), day(3)]);
        Ok(())
    }

    #[test]
    fn unknown_table() {
        let err = MemorySource::new().fetch("missing", None).unwrap_err();
        assert!(matches!(err, DataSourceError::TableNotFound { .. }));
    }
}
