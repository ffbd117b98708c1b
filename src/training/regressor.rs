use crate::training::error::TrainingError;
use ndarray::{Array1, Array2, Axis};

/// A regression model trained on a scaled feature matrix.
///
/// Hyperparameter search lives outside this crate; it only needs to construct
/// candidates, call [`Regressor::fit`] and score them with
/// [`crate::evaluate`].
pub trait Regressor {
    /// Fits the model, replacing any previous fit.
    ///
    /// # Arguments
    ///
    /// * `x` - Scaled feature matrix, one row per instance.
    /// * `y` - Target of each row.
    ///
    /// # Errors
    ///
    /// Returns [`TrainingError::LengthMismatch`] if `x` and `y` disagree on the number of
    /// rows, [`TrainingError::EmptyTrainingSet`] for zero rows, or a model specific error
    /// when the fit itself fails.
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), TrainingError>;

    /// Predicts one value per row of `x`.
    ///
    /// # Errors
    ///
    /// Returns [`TrainingError::NotFitted`] before a successful [`Regressor::fit`], and
    /// [`TrainingError::FeatureCountMismatch`] if `x` has a different number of columns
    /// than the training matrix.
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, TrainingError>;
}

// Pivots smaller than this are treated as zero when solving the normal equations.
const PIVOT_TOLERANCE: f64 = 1e-12;

/// Linear least squares with an L2 penalty and an unpenalized intercept.
#[derive(Debug, Clone, PartialEq)]
pub struct RidgeRegressor {
    alpha: f64,
    weights: Option<Array1<f64>>,
    intercept: f64,
}

impl RidgeRegressor {
    /// Creates an unfitted model with L2 penalty `alpha`.
    ///
    /// `alpha = 0.0` is ordinary least squares, which fails with
    /// [`TrainingError::Singular`] on collinear or constant columns.
    ///
    /// # Errors
    ///
    /// Returns [`TrainingError::InvalidHyperparameter`] if `alpha` is negative, `NaN` or
    /// infinite.
    ///
    /// # Example
    ///
    /// ```
    /// use ndarray::array;
    /// use weathercast::{Regressor, RidgeRegressor};
    ///
    /// let mut model = RidgeRegressor::new(0.0)?;
    /// model.fit(&array![[0.0], [1.0], [2.0]], &array![1.0, 3.0, 5.0])?;
    /// let predicted = model.predict(&array![[3.0]])?;
    /// assert!((predicted[0] - 7.0).abs() < 1e-9);
    /// # Ok::<(), weathercast::TrainingError>(())
    /// ```
    pub fn new(alpha: f64) -> Result<Self, TrainingError> {
        if !(alpha >= 0.0 && alpha.is_finite()) {
            return Err(TrainingError::InvalidHyperparameter(format!(
                "alpha must be a finite non-negative number, got {alpha}"
            )));
        }
        Ok(Self {
            alpha,
            weights: None,
            intercept: 0.0,
        })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Fitted coefficients, one per feature column, or `None` before fitting.
    pub fn weights(&self) -> Option<&Array1<f64>> {
        self.weights.as_ref()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl Default for RidgeRegressor {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            weights: None,
            intercept: 0.0,
        }
    }
}

impl Regressor for RidgeRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), TrainingError> {
        if x.nrows() != y.len() {
            return Err(TrainingError::LengthMismatch {
                rows: x.nrows(),
                targets: y.len(),
            });
        }
        let (Some(x_mean), Some(y_mean)) = (x.mean_axis(Axis(0)), y.mean()) else {
            return Err(TrainingError::EmptyTrainingSet);
        };

        let xc = x - &x_mean;
        let yc = y - y_mean;
        let mut gram = xc.t().dot(&xc);
        for i in 0..gram.nrows() {
            gram[[i, i]] += self.alpha;
        }
        let rhs = xc.t().dot(&yc);

        let weights = solve(gram, rhs).ok_or(TrainingError::Singular)?;
        self.intercept = y_mean - x_mean.dot(&weights);
        self.weights = Some(weights);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, TrainingError> {
        let weights = self.weights.as_ref().ok_or(TrainingError::NotFitted)?;
        if x.ncols() != weights.len() {
            return Err(TrainingError::FeatureCountMismatch {
                expected: weights.len(),
                found: x.ncols(),
            });
        }
        Ok(x.dot(weights) + self.intercept)
    }
}

/// Solves `a * x = b` by Gaussian elimination with partial pivoting.
/// Returns `None` when `a` is (numerically) singular.
fn solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Option<Array1<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[[i, col]].abs().total_cmp(&a[[j, col]].abs()))?;
        if !(a[[pivot, col]].abs() > PIVOT_TOLERANCE) {
            return None;
        }
        if pivot != col {
            for k in 0..n {
                a.swap([col, k], [pivot, k]);
            }
            b.swap(col, pivot);
        }
        for row in col + 1..n {
            let factor = a[[row, col]] / a[[col, col]];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[[row, k]] -= factor * a[[col, k]];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = Array1::zeros(n);
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[[row, k]] * x[k]).sum();
        x[row] = (b[row] - tail) / a[[row, row]];
    }
    Some(x)
}
