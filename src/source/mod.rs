//! Where observation tables come from.

pub mod error;
pub mod memory;
pub mod warehouse;

use crate::source::error::DataSourceError;
use crate::types::observation_table::ObservationTable;

/// A store of per-city daily weather observations.
///
/// Implementations return rows ordered by date, newest first, keeping at most
/// `row_limit` rows. Consumers must not rely on that order: feature construction sorts
/// the table itself.
///
/// A table with no matching rows is returned as an empty [`ObservationTable`], not as an
/// error. An unreachable store or a request that cannot be served is an error.
pub trait DataSource {
    fn fetch(
        &self,
        table_name: &str,
        row_limit: Option<usize>,
    ) -> Result<ObservationTable, DataSourceError>;
}
