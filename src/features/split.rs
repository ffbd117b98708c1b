//! Chronological train/test split.

use crate::features::error::FeatureError;
use ndarray::{s, Array1, Array2};

// Absorbs rounding in `n * (1 - test_fraction)` so that e.g. 10 * (1 - 0.9) floors to 1.
const SPLIT_EPSILON: f64 = 1e-9;

/// Train and test partitions of a feature matrix and its targets.
///
/// Produced by [`split`]. Row `i` of `x_train` belongs to `y_train[i]`, and likewise for
/// the test side. No rows are shuffled: the train side holds the first
/// [`TrainTestSplit::train_size`] rows of the input, in their original order.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<f64>,
    pub y_test: Array1<f64>,
}

impl TrainTestSplit {
    /// Number of training instances.
    pub fn train_size(&self) -> usize {
        self.y_train.len()
    }

    /// Number of held-out test instances.
    pub fn test_size(&self) -> usize {
        self.y_test.len()
    }
}

/// Index of the first test row for `n` rows: `floor(n * (1 - test_fraction))`.
///
/// # Errors
///
/// Returns [`FeatureError::InvalidArgument`] if `test_fraction` is not strictly between
/// 0 and 1, if `n < 2`, or if either side of the split would be empty.
pub fn split_point(n: usize, test_fraction: f64) -> Result<usize, FeatureError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(FeatureError::InvalidArgument(format!(
            "test_fraction must be in (0, 1), got {test_fraction}"
        )));
    }
    if n < 2 {
        return Err(FeatureError::InvalidArgument(format!(
            "need at least 2 instances to split, got {n}"
        )));
    }

    let split = (n as f64 * (1.0 - test_fraction) + SPLIT_EPSILON).floor() as usize;
    if split == 0 || split >= n {
        return Err(FeatureError::InvalidArgument(format!(
            "test_fraction {test_fraction} leaves an empty train or test set for {n} instances"
        )));
    }
    Ok(split)
}

/// Splits rows `[0, split)` into train and `[split, n)` into test, without shuffling.
///
/// Rows keep the order they were built in, so for a single city every test instance is
/// later in time than every train instance.
///
/// # Arguments
///
/// * `features` - The feature matrix, one row per instance.
/// * `targets` - The target of each row of `features`.
/// * `test_fraction` - Share of instances held out for testing, strictly between 0 and 1.
///
/// # Errors
///
/// Returns [`FeatureError::InvalidArgument`] if `features` and `targets` disagree on the
/// number of rows, or for any of the reasons listed on [`split_point`].
///
/// # Example
///
/// ```
/// use ndarray::{array, Array2};
/// use weathercast::split;
///
/// let features = Array2::from_shape_fn((5, 2), |(i, j)| (i * 10 + j) as f64);
/// let targets = array![0.0, 1.0, 2.0, 3.0, 4.0];
///
/// let split = split(&features, &targets, 0.2)?;
/// assert_eq!(split.train_size(), 4);
/// assert_eq!(split.y_test, array![4.0]);
/// # Ok::<(), weathercast::FeatureError>(())
/// ```
pub fn split(
    features: &Array2<f64>,
    targets: &Array1<f64>,
    test_fraction: f64,
) -> Result<TrainTestSplit, FeatureError> {
    if features.nrows() != targets.len() {
        return Err(FeatureError::InvalidArgument(format!(
            "feature matrix has {} rows but there are {} targets",
            features.nrows(),
            targets.len()
        )));
    }
    let at = split_point(targets.len(), test_fraction)?;

    Ok(TrainTestSplit {
        x_train: features.slice(s![..at, ..]).to_owned(),
        x_test: features.slice(s![at.., ..]).to_owned(),
        y_train: targets.slice(s![..at]).to_owned(),
        y_test: targets.slice(s![at..]).to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> (Array2<f64>, Array1<f64>) {
        let features = Array2::from_shape_fn((n, 2), |(i, j)| (i * 10 + j) as f64);
        let targets = Array1::from_iter((0..n).map(|i| i as f64));
        (features, targets)
    }

    #[test]
    fn eighty_twenty() -> Result<(), Box<dyn std::error::Error>> {
        let (x, y) = numbered(100);
        let split = split(&x, &y, 0.2)?;

        assert_eq!(split.train_size(), 80);
        assert_eq!(split.test_size(), 20);
        assert_eq!(split.x_train.nrows() + split.x_test.nrows(), 100);
        Ok(())
    }

    #[test]
    fn order_is_preserved() -> Result<(), Box<dyn std::error::Error>> {
        let (x, y) = numbered(10);
        let split = split(&x, &y, 0.3)?;

        assert_eq!(split.y_train.to_vec(), (0..7).map(|i| i as f64).collect::<Vec<_>>());
        assert_eq!(split.y_test.to_vec(), vec![7.0, 8.0, 9.0]);
        assert_eq!(split.x_test[[0, 1]], 71.0);
        Ok(())
    }

    #[test]
    fn sizes_always_add_up() -> Result<(), Box<dyn std::error::Error>> {
        for n in 2..40 {
            for fraction in [0.1, 0.25, 0.5, 0.75] {
                let (x, y) = numbered(n);
                if let Ok(split) = split(&x, &y, fraction) {
                    assert_eq!(split.train_size() + split.test_size(), n);
                    assert!(split.train_size() > 0 && split.test_size() > 0);
                }
            }
        }
        Ok(())
    }

    #[test]
    fn invalid_fraction_or_size() {
        let (x, y) = numbered(10);
        for fraction in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
            assert!(matches!(
                split(&x, &y, fraction),
                Err(FeatureError::InvalidArgument(_))
            ));
        }

        let (x, y) = numbered(1);
        assert!(matches!(split(&x, &y, 0.5), Err(FeatureError::InvalidArgument(_))));

        // floor(3 * 0.9) = 2 train rows is fine; floor(3 * 0.3) = 0 leaves no train rows.
        let (x, y) = numbered(3);
        assert!(split(&x, &y, 0.1).is_ok());
        assert!(matches!(split(&x, &y, 0.7), Err(FeatureError::InvalidArgument(_))));
    }

    #[test]
    fn split_point_is_exact_near_whole_numbers() -> Result<(), Box<dyn std::error::Error>> {
        assert_eq!(split_point(10, 0.9)?, 1);
        assert_eq!(split_point(10, 0.7)?, 3);
        assert_eq!(split_point(100, 0.2)?, 80);
        assert_eq!(split_point(1000, 0.35)?, 650);
        assert_eq!(split_point(7, 0.5)?, 3);
        Ok(())
    }

    #[test]
    fn mismatched_lengths() {
        let (x, _) = numbered(5);
        let y = Array1::zeros(4);
        assert!(matches!(split(&x, &y, 0.2), Err(FeatureError::InvalidArgument(_))));
    }
}
