//! Range functions and their metadata.
//!
//! Conventions:
//! - Function names are ALL CAPS and take exactly one `ref:ref` range.
//! - Only cells holding a number take part; empty and text cells are skipped,
//!   not read as zero.
//! - A range with no numbers yields 0 for every function.
//! - If you add a function, extend [`RangeFunction`] and [`RANGE_FUNCTIONS`].

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RangeFunction {
    Sum,
    Mean,
    Max,
    Min,
}

pub struct RangeBuiltin {
    pub function: RangeFunction,
    pub sheet_name: &'static str,
    pub description: &'static str,
}

pub const RANGE_FUNCTIONS: &[RangeBuiltin] = &[
    RangeBuiltin {
        function: RangeFunction::Sum,
        sheet_name: "SUM",
        description: "Sum of numeric values in a cell range",
    },
    RangeBuiltin {
        function: RangeFunction::Mean,
        sheet_name: "MEAN",
        description: "Mean of numeric values in a cell range",
    },
    RangeBuiltin {
        function: RangeFunction::Max,
        sheet_name: "MAX",
        description: "Largest numeric value in a cell range",
    },
    RangeBuiltin {
        function: RangeFunction::Min,
        sheet_name: "MIN",
        description: "Smallest numeric value in a cell range",
    },
];

/// Alternation of all function names, for building larger patterns.
pub fn function_names_pattern() -> String {
    RANGE_FUNCTIONS
        .iter()
        .map(|b| b.sheet_name)
        .collect::<Vec<_>>()
        .join("|")
}

/// Regex matching a function name and its open paren at the end of some text,
/// e.g. the `SUM(` in `5+SUM(`.
fn call_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"({})\($", function_names_pattern()))
            .expect("range call suffix regex must compile")
    })
}

impl RangeFunction {
    pub fn from_name(name: &str) -> Option<RangeFunction> {
        RANGE_FUNCTIONS
            .iter()
            .find(|b| b.sheet_name.eq_ignore_ascii_case(name))
            .map(|b| b.function)
    }

    pub fn name(self) -> &'static str {
        RANGE_FUNCTIONS
            .iter()
            .find(|b| b.function == self)
            .map(|b| b.sheet_name)
            .unwrap_or("?")
    }

    /// Split `text` ending in `FUNC(` into the length of the text before the
    /// call and the function it names.
    pub fn split_call(text: &str) -> Option<(usize, RangeFunction)> {
        let caps = call_suffix_re().captures(text)?;
        let whole = caps.get(0)?;
        let function = RangeFunction::from_name(&caps[1])?;
        Some((whole.start(), function))
    }

    /// Aggregate the numeric values of a range.
    pub fn apply(self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        match self {
            RangeFunction::Sum => values.iter().sum(),
            RangeFunction::Mean => values.iter().sum::<f64>() / values.len() as f64,
            RangeFunction::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            RangeFunction::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_empty_range_is_zero() {
        for builtin in RANGE_FUNCTIONS {
            assert_eq!(builtin.function.apply(&[]), 0.0, "{}", builtin.sheet_name);
        }
    }

    #[test]
    fn test_apply_aggregates() {
        let values = [4.0, -2.0, 10.0];
        assert_eq!(RangeFunction::Sum.apply(&values), 12.0);
        assert_eq!(RangeFunction::Mean.apply(&values), 4.0);
        assert_eq!(RangeFunction::Max.apply(&values), 10.0);
        assert_eq!(RangeFunction::Min.apply(&values), -2.0);
    }

    #[test]
    fn test_split_call() {
        assert_eq!(RangeFunction::split_call("5+MEAN("), Some((2, RangeFunction::Mean)));
        assert_eq!(RangeFunction::split_call("SUM("), Some((0, RangeFunction::Sum)));
        assert_eq!(RangeFunction::split_call("5+"), None);
        assert_eq!(RangeFunction::from_name("min"), Some(RangeFunction::Min));
        assert_eq!(RangeFunction::Max.name(), "MAX");
    }
}
