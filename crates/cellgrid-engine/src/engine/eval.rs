//! Arithmetic evaluation of a fully substituted formula.
//!
//! By the time a formula gets here every reference and range call has been
//! replaced by its value, leaving text such as `5+5*-2`. That text must match
//! `number (op number)*`; it is then handed to Rhai with each number bound
//! as a float variable, so the four operators follow their usual precedence
//! and IEEE-754 semantics (`1/0` is infinity, not an error).

use regex::Regex;
use rhai::{Engine, Scope};
use std::sync::OnceLock;

use super::error::CellError;

fn numeric_expr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^-?[0-9]+(?:\.[0-9]+)?(?:[-+*/]-?[0-9]+(?:\.[0-9]+)?)*$")
            .expect("numeric expression regex must compile")
    })
}

fn numeric_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?<number>-?[0-9]+(?:\.[0-9]+)?)(?<op>[-+*/])?")
            .expect("numeric token regex must compile")
    })
}

/// Is `expr` a plain chain of numbers and operators?
pub fn is_numeric_expression(expr: &str) -> bool {
    numeric_expr_re().is_match(expr)
}

/// Operands handed to Rhai in one script. Rhai nests each binary operator
/// one level deeper, so long chains are folded in pieces of this size.
const CHUNK: usize = 16;

/// Evaluates numeric residue with a Rhai engine.
pub struct Arithmetic {
    engine: Engine,
}

impl Arithmetic {
    pub fn new() -> Self {
        let mut engine = Engine::new();
        engine.set_max_expr_depths(64, 32);
        Arithmetic { engine }
    }

    /// Evaluate a numeric expression such as `5+5*-2`.
    ///
    /// Multiplicative runs are folded first, then the additive chain of
    /// their results. Both folds go left to right, which keeps the result
    /// identical to evaluating the whole expression at once.
    pub fn evaluate(&self, expr: &str) -> Result<f64, CellError> {
        if !is_numeric_expression(expr) {
            return Err(CellError::NonNumericOperation);
        }

        // Each term is a product run; `additive` holds the operator in front
        // of every term after the first.
        let mut terms: Vec<(f64, Vec<(char, f64)>)> = Vec::new();
        let mut additive: Vec<char> = Vec::new();
        let mut pending: Option<char> = None;
        for caps in numeric_token_re().captures_iter(expr) {
            let number: f64 = caps["number"]
                .parse()
                .map_err(|_| CellError::NonNumericOperation)?;
            match pending {
                Some(op @ ('*' | '/')) => {
                    if let Some((_, run)) = terms.last_mut() {
                        run.push((op, number));
                    }
                }
                Some(op) => {
                    additive.push(op);
                    terms.push((number, Vec::new()));
                }
                None => terms.push((number, Vec::new())),
            }
            pending = caps
                .name("op")
                .and_then(|op| op.as_str().chars().next());
        }

        let mut values = Vec::with_capacity(terms.len());
        for (first, run) in &terms {
            values.push(self.fold(*first, run)?);
        }
        let Some((&first, rest)) = values.split_first() else {
            return Err(CellError::NonNumericOperation);
        };
        let chain: Vec<(char, f64)> = additive.into_iter().zip(rest.iter().copied()).collect();
        self.fold(first, &chain)
    }

    /// Left fold of `first op n op n ...`, at most `CHUNK` operands per script.
    fn fold(&self, first: f64, chain: &[(char, f64)]) -> Result<f64, CellError> {
        let mut acc = first;
        for chunk in chain.chunks(CHUNK) {
            let mut scope = Scope::new();
            let mut script = String::from("n0");
            scope.push("n0", acc);
            for (i, (op, number)) in chunk.iter().enumerate() {
                let name = format!("n{}", i + 1);
                script.push(' ');
                script.push(*op);
                script.push(' ');
                script.push_str(&name);
                scope.push(name, *number);
            }
            log::trace!("evaluating {}", script);
            acc = self
                .engine
                .eval_expression_with_scope::<f64>(&mut scope, &script)
                .map_err(|e| CellError::Arithmetic(e.to_string()))?;
        }
        Ok(acc)
    }
}

impl Default for Arithmetic {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_expression() {
        assert!(is_numeric_expression("5"));
        assert!(is_numeric_expression("-5.5+2"));
        assert!(is_numeric_expression("5--2*3/-1"));
        assert!(!is_numeric_expression("5+apples"));
        assert!(!is_numeric_expression("5+#REF!"));
        assert!(!is_numeric_expression("inf+1"));
        assert!(!is_numeric_expression(""));
    }

    #[test]
    fn test_evaluate_follows_precedence() {
        let arithmetic = Arithmetic::new();
        assert_eq!(arithmetic.evaluate("5+5").unwrap(), 10.0);
        assert_eq!(arithmetic.evaluate("2+3*4").unwrap(), 14.0);
        assert_eq!(arithmetic.evaluate("10-4-3").unwrap(), 3.0);
        assert_eq!(arithmetic.evaluate("7/2").unwrap(), 3.5);
        assert_eq!(arithmetic.evaluate("5--2").unwrap(), 7.0);
        assert_eq!(arithmetic.evaluate("-3*-3").unwrap(), 9.0);
    }

    #[test]
    fn test_evaluate_rejects_non_numeric_residue() {
        let arithmetic = Arithmetic::new();
        assert_eq!(
            arithmetic.evaluate("apples+1"),
            Err(CellError::NonNumericOperation)
        );
    }

    #[test]
    fn test_evaluate_long_chain() {
        let arithmetic = Arithmetic::new();
        let expr = vec!["1"; 5000].join("+");
        assert_eq!(arithmetic.evaluate(&expr).unwrap(), 5000.0);
        let expr = vec!["1"; 5000].join("*");
        assert_eq!(arithmetic.evaluate(&expr).unwrap(), 1.0);
        let expr = vec!["1"; 5000].join("-");
        assert_eq!(arithmetic.evaluate(&expr).unwrap(), -4998.0);
    }

    #[test]
    fn test_evaluate_precedence_across_chunks() {
        let arithmetic = Arithmetic::new();
        // 39 ones, then a product that spans a chunk boundary.
        let mut expr = vec!["1"; 39].join("+");
        expr.push_str("+1");
        expr.push_str(&"*1".repeat(40));
        expr.push_str("*0");
        assert_eq!(arithmetic.evaluate(&expr).unwrap(), 39.0);
        assert_eq!(arithmetic.evaluate("8/2/2-1-1").unwrap(), 0.0);
    }
}
