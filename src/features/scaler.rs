//! Column-wise standardization fitted on training rows only.

use crate::features::error::FeatureError;
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

// Standard deviations this small (relative to the column mean) are treated as zero.
const ZERO_STD_TOLERANCE: f64 = 1e-12;

/// Per-column mean and standard deviation learned by [`StandardScaler::fit`].
///
/// Columns whose standard deviation is zero store a scale of `1.0`, so constant
/// columns transform to a flat `0.0` instead of dividing by zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    mean: Vec<f64>,
    std: Vec<f64>,
}

impl ScalerParams {
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn std(&self) -> &[f64] {
        &self.std
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Returns `(value - mean) / std` for every column of `matrix`.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::InvalidArgument`] if the column count differs from the
    /// one the params were fitted on.
    pub fn transform(&self, matrix: &Array2<f64>) -> Result<Array2<f64>, FeatureError> {
        if matrix.ncols() != self.n_features() {
            return Err(FeatureError::InvalidArgument(format!(
                "scaler was fitted on {} columns, got {}",
                self.n_features(),
                matrix.ncols()
            )));
        }

        let mut scaled = matrix.to_owned();
        for ((mut column, mean), std) in scaled
            .axis_iter_mut(Axis(1))
            .zip(&self.mean)
            .zip(&self.std)
        {
            column.mapv_inplace(|v| (v - mean) / std);
        }
        Ok(scaled)
    }
}

/// Z-score standardization (population standard deviation).
pub struct StandardScaler;

impl StandardScaler {
    /// Learns per-column mean and standard deviation from `train`.
    ///
    /// Missing (`NaN`) cells are ignored when computing a column's statistics and stay
    /// `NaN` after [`ScalerParams::transform`]. A column with no finite values at all
    /// gets a mean of `0.0` and a scale of `1.0`.
    ///
    /// Only training rows may be passed here; the returned params are then applied
    /// unchanged to the test rows and to any later inference rows.
    pub fn fit(train: &Array2<f64>) -> Result<ScalerParams, FeatureError> {
        if train.nrows() == 0 {
            return Err(FeatureError::InvalidArgument(
                "cannot fit scaler on an empty matrix".to_string(),
            ));
        }

        let (mean, std): (Vec<f64>, Vec<f64>) = train
            .axis_iter(Axis(1))
            .map(|column| {
                let (mean, std) = finite_moments(column.iter().copied());
                let std = if std <= ZERO_STD_TOLERANCE * mean.abs().max(1.0) {
                    1.0
                } else {
                    std
                };
                (mean, std)
            })
            .unzip();

        Ok(ScalerParams { mean, std })
    }

    /// Fits on `train` and returns the params with the scaled train matrix.
    pub fn fit_transform(
        train: &Array2<f64>,
    ) -> Result<(ScalerParams, Array2<f64>), FeatureError> {
        let params = Self::fit(train)?;
        let scaled = params.transform(train)?;
        Ok((params, scaled))
    }
}

/// Mean and population standard deviation over the finite values of a column.
fn finite_moments(values: impl Iterator<Item = f64> + Clone) -> (f64, f64) {
    let (count, sum) = values
        .clone()
        .filter(|v| v.is_finite())
        .fold((0usize, 0.0), |(n, s), v| (n + 1, s + v));
    if count == 0 {
        return (0.0, 0.0);
    }
    let mean = sum / count as f64;
    let variance = values
        .filter(|v| v.is_finite())
        .map(|v| (v - mean).powi(2))
        .sum::<f64>()
        / count as f64;
    (mean, variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::split::split;
    use ndarray::{array, Array1};

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn round_trip_standardizes_columns() -> Result<(), Box<dyn std::error::Error>> {
        let train = array![
            [1.0, 10.0, 5.0],
            [2.0, 30.0, 5.0],
            [3.0, 20.0, 5.0],
            [6.0, 60.0, 5.0],
        ];
        let (_, scaled) = StandardScaler::fit_transform(&train)?;

        for j in 0..2 {
            let column = scaled.column(j);
            let mean = column.mean().unwrap();
            let std = column.std(0.0);
            assert!(mean.abs() < TOLERANCE, "column {j} mean {mean}");
            assert!((std - 1.0).abs() < TOLERANCE, "column {j} std {std}");
        }
        // Constant column comes out flat.
        assert!(scaled.column(2).iter().all(|v| *v == 0.0));
        Ok(())
    }

    #[test]
    fn zero_std_is_replaced_by_one() -> Result<(), Box<dyn std::error::Error>> {
        let params = StandardScaler::fit(&array![[7.0, 1.0], [7.0, 3.0]])?;
        assert_eq!(params.mean(), [7.0, 2.0]);
        assert_eq!(params.std(), [1.0, 1.0]);
        Ok(())
    }

    #[test]
    fn params_come_from_train_rows_only() -> Result<(), Box<dyn std::error::Error>> {
        // Train rows are small, test rows much larger.
        let features = Array2::from_shape_fn((10, 1), |(i, _)| if i < 8 { i as f64 } else { 1000.0 });
        let targets = Array1::zeros(10);
        let split = split(&features, &targets, 0.2)?;

        let params = StandardScaler::fit(&split.x_train)?;
        assert!((params.mean()[0] - 3.5).abs() < TOLERANCE);
        let expected_std = (0..8).map(|i| (i as f64 - 3.5).powi(2)).sum::<f64>() / 8.0;
        assert!((params.std()[0] - expected_std.sqrt()).abs() < TOLERANCE);

        // The same params are applied to test: values stay far outside the train range.
        let scaled_test = params.transform(&split.x_test)?;
        assert!(scaled_test.iter().all(|v| *v > 100.0));
        Ok(())
    }

    #[test]
    fn missing_cells_do_not_spread() -> Result<(), Box<dyn std::error::Error>> {
        let params = StandardScaler::fit(&array![[1.0], [f64::NAN], [3.0], [5.0]])?;
        let expected_std = (8.0f64 / 3.0).sqrt();
        assert!((params.mean()[0] - 3.0).abs() < TOLERANCE);
        assert!((params.std()[0] - expected_std).abs() < TOLERANCE);

        let scaled = params.transform(&array![[1.0], [f64::NAN], [3.0], [100.0]])?;
        assert!((scaled[[0, 0]] + 2.0 / expected_std).abs() < TOLERANCE);
        assert!(scaled[[1, 0]].is_nan());
        assert_eq!(scaled[[2, 0]], 0.0);
        assert!((scaled[[3, 0]] - 97.0 / expected_std).abs() < TOLERANCE);
        Ok(())
    }

    #[test]
    fn all_missing_column_stays_missing() -> Result<(), Box<dyn std::error::Error>> {
        let params = StandardScaler::fit(&array![[f64::NAN, 1.0], [f64::NAN, 3.0]])?;
        assert_eq!(params.mean()[0], 0.0);
        assert_eq!(params.std()[0], 1.0);

        let scaled = params.transform(&array![[f64::NAN, 2.0]])?;
        assert!(scaled[[0, 0]].is_nan());
        assert_eq!(scaled[[0, 1]], 0.0);
        Ok(())
    }

    #[test]
    fn column_count_must_match() -> Result<(), Box<dyn std::error::Error>> {
        let params = StandardScaler::fit(&array![[1.0, 2.0], [3.0, 4.0]])?;
        assert!(matches!(
            params.transform(&array![[1.0, 2.0, 3.0]]),
            Err(FeatureError::InvalidArgument(_))
        ));
        Ok(())
    }

    #[test]
    fn empty_matrix_is_rejected() {
        let empty = Array2::<f64>::zeros((0, 3));
        assert!(matches!(
            StandardScaler::fit(&empty),
            Err(FeatureError::InvalidArgument(_))
        ));
    }
}
