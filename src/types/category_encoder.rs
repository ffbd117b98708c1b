//! Dense integer codes for the categorical columns (city and country).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A bidirectional mapping between category strings and dense codes `0..len`.
///
/// Codes follow the lexicographic order of the distinct values the encoder was fitted
/// on, so the assignment depends only on the set of observed values and not on the
/// order they were seen in. Fitting twice on the same values gives identical codes.
///
/// # Examples
///
/// ```
/// use weathercast::CategoryEncoder;
///
/// let encoder = CategoryEncoder::fit(["Paris", "Berlin", "Paris", "Amsterdam"]);
/// assert_eq!(encoder.encode("Amsterdam"), Some(0));
/// assert_eq!(encoder.encode("Paris"), Some(2));
/// assert_eq!(encoder.decode(1), Some("Berlin"));
/// assert_eq!(encoder.encode("Rome"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryEncoder {
    // Sorted and unique; the index of a value is its code.
    classes: Vec<String>,
}

impl CategoryEncoder {
    pub fn fit<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let distinct: BTreeSet<String> = values
            .into_iter()
            .map(|v| v.as_ref().to_string())
            .collect();
        Self {
            classes: distinct.into_iter().collect(),
        }
    }

    pub fn encode(&self, value: &str) -> Option<u32> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(value))
            .ok()
            .map(|idx| idx as u32)
    }

    pub fn decode(&self, code: u32) -> Option<&str> {
        self.classes.get(code as usize).map(String::as_str)
    }

    /// The known values, in code order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// The encoders fitted for one pipeline run. `country` is `None` when the observation
/// table had no country column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalEncoders {
    pub city: CategoryEncoder,
    pub country: Option<CategoryEncoder>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_lexicographic_and_dense() {
        let encoder = CategoryEncoder::fit(["b", "c", "a", "c", "b"]);
        assert_eq!(encoder.classes(), ["a", "b", "c"]);
        assert_eq!(encoder.len(), 3);
        for (code, class) in encoder.classes().iter().enumerate() {
            assert_eq!(encoder.encode(class), Some(code as u32));
            assert_eq!(encoder.decode(code as u32), Some(class.as_str()));
        }
    }

    #[test]
    fn assignment_ignores_input_order() {
        let first = CategoryEncoder::fit(["Tokyo", "Lima", "Cairo"]);
        let second = CategoryEncoder::fit(["Cairo", "Tokyo", "Lima", "Lima"]);
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_values_and_codes() {
        let encoder = CategoryEncoder::fit(["x"]);
        assert_eq!(encoder.encode("y"), None);
        assert_eq!(encoder.decode(1), None);
        assert!(CategoryEncoder::fit(Vec::<String>::new()).is_empty());
    }
}
