//! File-backed warehouse holding one parquet or CSV file per table.

use crate::source::error::DataSourceError;
use crate::source::DataSource;
use crate::types::feature_column::DATE_COLUMN;
use crate::types::observation_table::ObservationTable;
use crate::utils::default_warehouse_root;
use bon::Builder;
use log::{info, warn};
use polars::prelude::*;
use std::path::{Path, PathBuf};

/// Reads observation tables from `<root>/<project>/<dataset>/<table>.parquet`, falling
/// back to `<table>.csv` when no parquet file exists.
///
/// # Examples
///
/// ```no_run
/// use weathercast::{DataSource, WarehouseSource};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let source = WarehouseSource::builder()
///     .project("weather-demo")
///     .dataset("weather_dataset")
///     .root("/var/lib/warehouse")
///     .build();
///
/// let table = source.fetch("weather_summary", Some(10_000))?;
/// println!("{} rows", table.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Builder)]
pub struct WarehouseSource {
    #[builder(into)]
    project: String,
    #[builder(into)]
    dataset: String,
    /// Defaults to [`crate::default_warehouse_root`].
    #[builder(into)]
    root: Option<PathBuf>,
}

impl WarehouseSource {
    pub fn dataset_dir(&self) -> Result<PathBuf, DataSourceError> {
        let root = self
            .root
            .clone()
            .or_else(default_warehouse_root)
            .ok_or(DataSourceError::RootResolution)?;
        Ok(root.join(&self.project).join(&self.dataset))
    }

    /// Resolves a table name to its parquet or CSV file inside the dataset directory.
    ///
    /// Names that are empty, contain a path separator, or equal `.`/`..` are never
    /// looked up, so a table name cannot point outside the dataset directory.
    fn table_path(&self, table_name: &str) -> Result<PathBuf, DataSourceError> {
        let dir = self.dataset_dir()?;
        if !is_plain_table_name(table_name) {
            warn!("Rejecting table name {:?}", table_name);
            return Err(DataSourceError::TableNotFound {
                table: table_name.to_string(),
                location: dir.display().to_string(),
            });
        }
        for extension in ["parquet", "csv"] {
            let path = dir.join(format!("{table_name}.{extension}"));
            if path.is_file() {
                return Ok(path);
            }
        }
        warn!("No parquet or csv file for table {} in {:?}", table_name, dir);
        Err(DataSourceError::TableNotFound {
            table: table_name.to_string(),
            location: dir.display().to_string(),
        })
    }

    fn scan(path: &Path) -> PolarsResult<LazyFrame> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("csv") => LazyCsvReader::new(path)
                .with_has_header(true)
                .with_try_parse_dates(true)
                .finish(),
            _ => LazyFrame::scan_parquet(path, Default::default()),
        }
    }
}

fn is_plain_table_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
}

impl DataSource for WarehouseSource {
    fn fetch(
        &self,
        table_name: &str,
        row_limit: Option<usize>,
    ) -> Result<ObservationTable, DataSourceError> {
        let path = self.table_path(table_name)?;
        info!("Querying table {} from {:?}", table_name, path);

        let frame = Self::scan(&path)
            .and_then(|lazy| {
                let mut lazy = lazy.sort(
                    [DATE_COLUMN],
                    SortMultipleOptions::default()
                        .with_order_descending(true)
                        .with_maintain_order(true),
                );
                if let Some(limit) = row_limit {
                    lazy = lazy.limit(IdxSize::try_from(limit).unwrap_or(IdxSize::MAX));
                }
                lazy.collect()
            })
            .map_err(|source| DataSourceError::DataUnavailable {
                table: table_name.to_string(),
                source,
            })?;
        info!("Retrieved {} rows of weather data", frame.height());

        ObservationTable::from_frame(frame).map_err(|source| DataSourceError::InvalidTable {
            table: table_name.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::observation::Observation;
    use crate::FeatureColumn;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn source(root: &Path) -> WarehouseSource {
        WarehouseSource::builder()
            .project("demo")
            .dataset("weather")
            .root(root)
            .build()
    }

    fn write_parquet(dir: &Path, name: &str, table: ObservationTable) -> Result<(), Box<dyn std::error::Error>> {
        std::fs::create_dir_all(dir)?;
        let file = std::fs::File::create(dir.join(format!("{name}.parquet")))?;
        let mut frame = table.into_frame();
        ParquetWriter::new(file).finish(&mut frame)?;
        Ok(())
    }

    #[test]
    fn parquet_rows_come_back_newest_first() -> Result<(), Box<dyn std::error::Error>> {
        let tmp = tempdir()?;
        let source = source(tmp.path());
        let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let rows: Vec<Observation> = (0..6)
            .map(|i| {
                Observation::new(start + chrono::Duration::days(i), "Lisbon", "Portugal")
                    .with(FeatureColumn::AvgTemperature, 15.0 + i as f64)
            })
            .collect();
        write_parquet(&source.dataset_dir()?, "weather_summary", ObservationTable::from_observations(&rows)?)?;

        let table = source.fetch("weather_summary", Some(4))?;
        let dates: Vec<NaiveDate> = table.to_observations()?.iter().map(|o| o.date).collect();

        assert_eq!(table.len(), 4);
        assert_eq!(
            dates,
            (2..6).rev().map(|i| start + chrono::Duration::days(i)).collect::<Vec<_>>()
        );
        Ok(())
    }

    #[test]
    fn csv_tables_are_read() -> Result<(), Box<dyn std::error::Error>> {
        let tmp = tempdir()?;
        let source = source(tmp.path());
        let dir = source.dataset_dir()?;
        std::fs::create_dir_all(&dir)?;
        std::fs::write(
            dir.join("daily.csv"),
            "date,city,country,avg_temperature,avg_humidity\n\
             2024-02-01,Lisbon,Portugal,15.5,70\n\
             2024-02-02,Lisbon,Portugal,16.0,72\n",
        )?;

        let table = source.fetch("daily", None)?;

        assert_eq!(table.len(), 2);
        assert_eq!(
            table.feature_columns(),
            vec![FeatureColumn::AvgTemperature, FeatureColumn::AvgHumidity]
        );
        let rows = table.to_observations()?;
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2024, 2, 2).unwrap());
        assert_eq!(rows[0].avg_humidity, Some(72.0));
        Ok(())
    }

    #[test]
    fn no_matching_rows_is_an_empty_table() -> Result<(), Box<dyn std::error::Error>> {
        let tmp = tempdir()?;
        let source = source(tmp.path());
        write_parquet(&source.dataset_dir()?, "empty", ObservationTable::from_observations(&[])?)?;

        let table = source.fetch("empty", Some(10))?;
        assert!(table.is_empty());
        Ok(())
    }

    #[test]
    fn missing_table_is_reported() -> Result<(), Box<dyn std::error::Error>> {
        let tmp = tempdir()?;
        let err = source(tmp.path()).fetch("nope", None).unwrap_err();
        assert!(matches!(err, DataSourceError::TableNotFound { ref table, .. } if table == "nope"));
        Ok(())
    }

    #[test]
    fn table_names_cannot_escape_the_dataset() -> Result<(), Box<dyn std::error::Error>> {
        let tmp = tempdir()?;
        let source = source(tmp.path());
        // A real table one level above the dataset directory.
        let dir = source.dataset_dir()?;
        std::fs::create_dir_all(&dir)?;
        std::fs::write(
            tmp.path().join("demo").join("outside.csv"),
            "date,city\n2024-02-01,Lisbon\n",
        )?;

        for name in ["../outside", "../../demo/outside", "sub/table", "..", ".", "", "a\\b"] {
            let err = source.fetch(name, None).unwrap_err();
            assert!(
                matches!(err, DataSourceError::TableNotFound { ref table, .. } if table == name),
                "{name:?} gave {err:?}"
            );
        }
        Ok(())
    }

    #[test]
    fn huge_row_limit_is_not_truncated() -> Result<(), Box<dyn std::error::Error>> {
        let tmp = tempdir()?;
        let source = source(tmp.path());
        let rows: Vec<Observation> = (0..3)
            .map(|i| {
                Observation::new(
                    NaiveDate::from_ymd_opt(2024, 2, 1).unwrap() + chrono::Duration::days(i),
                    "Porto",
                    "Portugal",
                )
            })
            .collect();
        write_parquet(&source.dataset_dir()?, "daily", ObservationTable::from_observations(&rows)?)?;

        let table = source.fetch("daily", Some(u32::MAX as usize + 1))?;
        assert_eq!(table.len(), 3);
        Ok(())
    }

    #[test]
    fn unreadable_file_is_data_unavailable() -> Result<(), Box<dyn std::error::Error>> {
        let tmp = tempdir()?;
        let source = source(tmp.path());
        let dir = source.dataset_dir()?;
        std::fs::create_dir_all(&dir)?;
        std::fs::write(dir.join("broken.parquet"), b"definitely not parquet")?;

        let err = source.fetch("broken", None).unwrap_err();
        assert!(matches!(err, DataSourceError::DataUnavailable { .. }));
        Ok(())
    }
}
