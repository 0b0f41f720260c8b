//! Formula recognition, validation and compilation.
//!
//! Input is treated as a formula when it starts with `=` (after optional
//! whitespace). The formula is upper-cased and stripped of all whitespace,
//! then must match:
//!
//! ```text
//! operand  := cellRef | number | FUNC(cellRef:cellRef)
//! formula  := operand (op operand)*          op ∈ + - * /
//! cellRef  := letters digits
//! number   := -? digits (. digits)?
//! ```
//!
//! There is no grouping and no nesting of function calls.

use regex::Regex;
use std::sync::OnceLock;

use super::error::CellError;
use super::functions::function_names_pattern;
use super::template::{FormulaTemplate, FormulaToken};

fn formula_trigger_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*=").expect("formula trigger regex must compile"))
}

fn formula_grammar_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let operand = format!(
            r"(?:[A-Z]+[0-9]+|-?[0-9]+(?:\.[0-9]+)?|(?:{})\([A-Z]+[0-9]+:[A-Z]+[0-9]+\))",
            function_names_pattern()
        );
        Regex::new(&format!(r"^{op}(?:[-+*/]{op})*$", op = operand))
            .expect("formula grammar regex must compile")
    })
}

fn reference_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Z]+[0-9]+").expect("reference regex must compile"))
}

/// Does this raw input ask to be a formula?
pub fn is_formula(raw: &str) -> bool {
    formula_trigger_re().is_match(raw)
}

/// Upper-case the input and drop all whitespace: `" = a5 + 5"` -> `"=A5+5"`.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Formula body without its leading `=`.
fn body(normalized: &str) -> &str {
    normalized.strip_prefix('=').unwrap_or(normalized)
}

/// Check a normalised formula against the grammar.
pub fn validate(normalized: &str) -> Result<(), CellError> {
    if formula_grammar_re().is_match(body(normalized)) {
        Ok(())
    } else {
        Err(CellError::Syntax)
    }
}

/// Validate `raw` and compile it into a template, resolving every reference
/// through `resolve`.
///
/// Construction is atomic: the first reference that fails to resolve aborts
/// the whole compile with that error and nothing is returned.
pub fn compile<H, F>(raw: &str, mut resolve: F) -> Result<FormulaTemplate<H>, CellError>
where
    H: Copy,
    F: FnMut(&str) -> Result<H, CellError>,
{
    let normalized = normalize(raw);
    validate(&normalized)?;
    let body = body(&normalized);

    let mut tokens = Vec::new();
    let mut last = 0;
    for m in reference_re().find_iter(body) {
        tokens.push(FormulaToken::Literal(body[last..m.start()].to_string()));
        tokens.push(FormulaToken::Reference(resolve(m.as_str())?));
        last = m.end();
    }
    tokens.push(FormulaToken::Literal(body[last..].to_string()));

    Ok(FormulaTemplate::new(tokens))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::CellRef;
    use pretty_assertions::assert_eq;

    fn resolve_any(text: &str) -> Result<CellRef, CellError> {
        CellRef::parse(text)
    }

    #[test]
    fn test_is_formula() {
        assert!(is_formula("=A1"));
        assert!(is_formula("   = 5"));
        assert!(!is_formula("5="));
        assert!(!is_formula("x"));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(" = a5 + 5 + sum(b1:b3)"), "=A5+5+SUM(B1:B3)");
        assert_eq!(normalize("=b 3"), "=B3");
    }

    #[test]
    fn test_validate_accepts_grammar() {
        for ok in [
            "=A1",
            "=5",
            "=-5.25",
            "=A1+B2*3",
            "=A1--5",
            "=SUM(A1:B3)",
            "=MEAN(A1:A3)+MAX(B1:B2)/MIN(C3:C1)",
            "=1/0",
        ] {
            assert!(validate(ok).is_ok(), "{} should validate", ok);
        }
    }

    #[test]
    fn test_validate_rejects_everything_else() {
        for bad in [
            "=",
            "=A",
            "=1+",
            "=(1+2)",
            "=SUM(A1)",
            "=SUM(SUM(A1:A2):A3)",
            "=AVG(A1:A2)",
            "=1.",
            "=A1 B1",
            "==A1",
        ] {
            assert_eq!(validate(&normalize(bad)), Err(CellError::Syntax), "{}", bad);
        }
    }

    #[test]
    fn test_compile_builds_alternating_template() {
        let template = compile("=a5+5+sum(b1:b3)", resolve_any).unwrap();
        assert_eq!(
            template.tokens(),
            &[
                FormulaToken::Reference(CellRef::new(1, 5)),
                FormulaToken::Literal("+5+SUM(".to_string()),
                FormulaToken::Reference(CellRef::new(2, 1)),
                FormulaToken::Literal(":".to_string()),
                FormulaToken::Reference(CellRef::new(2, 3)),
                FormulaToken::Literal(")".to_string()),
            ]
        );
    }

    #[test]
    fn test_compile_is_atomic_on_unknown_reference() {
        let mut seen = Vec::new();
        let result = compile("=A1+Z9+B1", |text: &str| {
            seen.push(text.to_string());
            if text == "Z9" {
                Err(CellError::UnknownReference(text.to_string()))
            } else {
                CellRef::parse(text)
            }
        });
        assert_eq!(result, Err(CellError::UnknownReference("Z9".to_string())));
        assert_eq!(seen, vec!["A1", "Z9"]);
    }

    #[test]
    fn test_compile_rejects_bad_syntax_before_resolving() {
        let result = compile("=A1+", |_: &str| -> Result<CellRef, CellError> {
            panic!("resolver must not run for invalid syntax")
        });
        assert_eq!(result, Err(CellError::Syntax));
    }
}
