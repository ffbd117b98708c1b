//! Trains a ridge model on a CSV warehouse table and saves the feature artifacts.
//!
//! Run with a warehouse root holding `weather-demo/weather_dataset/weather_summary.csv`:
//! `cargo run --example train_from_csv -- /path/to/warehouse`.
//! Without an argument a synthetic table is written to a temporary directory.

use chrono::{Duration, NaiveDate};
use std::env;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use weathercast::{FeatureColumn, ForecastPipeline, RidgeRegressor, WarehouseSource};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let root = match env::args().nth(1) {
        Some(path) => PathBuf::from(path),
        None => {
            write_synthetic_table(tmp.path())?;
            tmp.path().to_path_buf()
        }
    };

    let source = WarehouseSource::builder()
        .project("weather-demo")
        .dataset("weather_dataset")
        .root(root.clone())
        .build();

    let pipeline = ForecastPipeline::builder()
        .target(FeatureColumn::AvgTemperature)
        .lag_days(3)
        .build();
    let prepared = pipeline.fetch(&source).row_limit(10_000).call()?;

    println!(
        "Built {} instances from {} cities ({} skipped)",
        prepared.report.instances,
        prepared.report.groups,
        prepared.report.skipped_cities.len()
    );
    println!("Features: {:?}", prepared.feature_names);

    let mut model = RidgeRegressor::new(1.0)?;
    let evaluation = prepared.evaluate(&mut model)?;
    println!(
        "Test MSE {:.3}, RMSE {:.3}, r2 {:.3}",
        evaluation.mse, evaluation.rmse, evaluation.r2
    );

    let artifacts_path = root.join("artifacts").join("avg_temperature.bin");
    prepared.artifacts.save(&artifacts_path)?;
    println!("Saved feature artifacts to {}", artifacts_path.display());

    Ok(())
}

fn write_synthetic_table(root: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let dir = root.join("weather-demo").join("weather_dataset");
    std::fs::create_dir_all(&dir)?;

    let mut csv = String::from(
        "date,city,country,avg_temperature,max_temperature,min_temperature,\
         total_precipitation,max_wind_speed,avg_humidity,avg_pressure\n",
    );
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let cities = [("Amsterdam", "Netherlands", 10.0), ("Madrid", "Spain", 16.0), ("Oslo", "Norway", 5.0)];
    for (city, country, base) in cities {
        for d in 0..365 {
            let t = base + 9.0 * ((d as f64 - 100.0) / 58.0).sin();
            writeln!(
                csv,
                "{},{city},{country},{t:.1},{:.1},{:.1},{:.1},{:.1},{:.1},{:.1}",
                start + Duration::days(d),
                t + 4.5,
                t - 4.0,
                (d % 6) as f64 * 0.8,
                12.0 + (d % 9) as f64,
                65.0 + (d % 13) as f64,
                1008.0 + (d % 5) as f64
            )?;
        }
    }
    std::fs::write(dir.join("weather_summary.csv"), csv)?;
    Ok(())
}
