//! Computed cell values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The computed value of a cell. An absent value (empty cell) is `None` at
/// the use site rather than a variant here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    /// Classify literal (non-formula) input.
    /// - Empty string or whitespace -> `None`
    /// - Finite number, surrounding whitespace allowed -> `Number`
    /// - Otherwise -> `Text`, kept verbatim
    pub fn from_input(input: &str) -> Option<Value> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Some(Value::Number(n)),
            _ => Some(Value::Text(input.to_string())),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(_) => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    /// Text spliced into an arithmetic expression in place of a reference.
    /// Absent values read as zero.
    pub fn operand_text(value: Option<&Value>) -> String {
        match value {
            None => "0".to_string(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Text(s)) => s.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// Format a number for display.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "#NAN!".to_string()
    } else if n.is_infinite() {
        "#INF!".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        let s = format!("{:.10}", n);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_input_classifies_literals() {
        assert_eq!(Value::from_input(""), None);
        assert_eq!(Value::from_input("   "), None);
        assert_eq!(Value::from_input(" 5 "), Some(Value::Number(5.0)));
        assert_eq!(Value::from_input("-2.5"), Some(Value::Number(-2.5)));
        assert_eq!(Value::from_input("apples"), Some(Value::Text("apples".into())));
        assert_eq!(Value::from_input("inf"), Some(Value::Text("inf".into())));
    }

    #[test]
    fn test_operand_text_reads_absent_as_zero() {
        assert_eq!(Value::operand_text(None), "0");
        assert_eq!(Value::operand_text(Some(&Value::Number(-3.0))), "-3");
        assert_eq!(Value::operand_text(Some(&Value::Number(0.5))), "0.5");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(11.0), "11");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(1.0 / 3.0), "0.3333333333");
        assert_eq!(format_number(f64::INFINITY), "#INF!");
        assert_eq!(format_number(f64::NAN), "#NAN!");
    }
}
