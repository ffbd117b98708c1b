use crate::features::split::TrainTestSplit;
use crate::training::error::TrainingError;
use crate::training::regressor::Regressor;
use log::info;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Test-set scores of a fitted model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub mse: f64,
    pub rmse: f64,
    pub r2: f64,
}

impl Evaluation {
    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<Self, TrainingError> {
        let mse = mean_squared_error(y_true, y_pred)?;
        Ok(Self {
            mse,
            rmse: mse.sqrt(),
            r2: r2_score(y_true, y_pred)?,
        })
    }

    /// The scalar a hyperparameter search minimizes: the mean squared error.
    pub fn objective(&self) -> f64 {
        self.mse
    }
}

fn check_lengths(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<(), TrainingError> {
    if y_true.len() != y_pred.len() {
        return Err(TrainingError::LengthMismatch {
            rows: y_pred.len(),
            targets: y_true.len(),
        });
    }
    if y_true.is_empty() {
        return Err(TrainingError::EmptyTrainingSet);
    }
    Ok(())
}

pub fn mean_squared_error(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64, TrainingError> {
    check_lengths(y_true, y_pred)?;
    let sum: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    Ok(sum / y_true.len() as f64)
}

/// Coefficient of determination. A constant `y_true` scores 1.0 when predicted
/// perfectly and 0.0 otherwise.
pub fn r2_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64, TrainingError> {
    check_lengths(y_true, y_pred)?;
    let mean = y_true.sum() / y_true.len() as f64;
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}

/// Scores `model` on `(x, y)`.
pub fn evaluate<R: Regressor + ?Sized>(
    model: &R,
    x: &ndarray::Array2<f64>,
    y: &Array1<f64>,
) -> Result<Evaluation, TrainingError> {
    let predicted = model.predict(x)?;
    Evaluation::compute(y, &predicted)
}

/// Fits `model` on the train split and scores it on the test split.
pub fn fit_and_evaluate<R: Regressor + ?Sized>(
    model: &mut R,
    split: &TrainTestSplit,
) -> Result<Evaluation, TrainingError> {
    model.fit(&split.x_train, &split.y_train)?;
    let evaluation = evaluate(model, &split.x_test, &split.y_test)?;
    info!(
        "Test MSE {:.4}, RMSE {:.4}, r2 {:.4} on {} instances",
        evaluation.mse,
        evaluation.rmse,
        evaluation.r2,
        split.y_test.len()
    );
    Ok(evaluation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::regressor::RidgeRegressor;
    use ndarray::array;

    #[test]
    fn known_scores() -> Result<(), Box<dyn std::error::Error>> {
        let y_true = array![3.0, -0.5, 2.0, 7.0];
        let y_pred = array![2.5, 0.0, 2.0, 8.0];
        let evaluation = Evaluation::compute(&y_true, &y_pred)?;

        assert!((evaluation.mse - 0.375).abs() < 1e-12);
        assert!((evaluation.rmse - 0.375f64.sqrt()).abs() < 1e-12);
        assert!((evaluation.r2 - 0.948_608_137_044_967_9).abs() < 1e-12);
        assert_eq!(evaluation.objective(), evaluation.mse);
        Ok(())
    }

    #[test]
    fn constant_truth() -> Result<(), Box<dyn std::error::Error>> {
        let y_true = array![1.0, 1.0];
        assert_eq!(r2_score(&y_true, &array![1.0, 1.0])?, 1.0);
        assert_eq!(r2_score(&y_true, &array![1.0, 2.0])?, 0.0);
        Ok(())
    }

    #[test]
    fn length_checks() {
        assert!(matches!(
            mean_squared_error(&array![1.0], &array![1.0, 2.0]),
            Err(TrainingError::LengthMismatch { .. })
        ));
        assert!(matches!(
            r2_score(&Array1::zeros(0), &Array1::zeros(0)),
            Err(TrainingError::EmptyTrainingSet)
        ));
    }

    #[test]
    fn fit_then_score_on_test() -> Result<(), Box<dyn std::error::Error>> {
        let split = TrainTestSplit {
            x_train: array![[0.0], [1.0], [2.0], [3.0]],
            y_train: array![1.0, 3.0, 5.0, 7.0],
            x_test: array![[4.0], [5.0]],
            y_test: array![9.0, 11.0],
        };
        let mut model = RidgeRegressor::new(0.0)?;
        let evaluation = fit_and_evaluate(&mut model, &split)?;

        assert!(evaluation.mse < 1e-12);
        assert!((evaluation.r2 - 1.0).abs() < 1e-9);
        Ok(())
    }
}
