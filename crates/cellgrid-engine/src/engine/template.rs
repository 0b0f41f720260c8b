//! Compiled formula templates.
//!
//! A template is the formula body (without the leading `=`) split into
//! literal text and cell handles, e.g. `=A5+5+SUM(B1:B3)` becomes
//! `[Ref(a5), "+5+SUM(", Ref(b1), ":", Ref(b3), ")"]`. Handles are resolved
//! back to addresses only when the formula text is rendered, so a template
//! survives rows and columns moving around.

use super::functions::RangeFunction;

/// One piece of a compiled formula.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormulaToken<H> {
    Literal(String),
    Reference(H),
}

/// A formula term after grouping range calls back together.
#[derive(Clone, Debug, PartialEq)]
pub enum Term<H> {
    Text(String),
    Cell(H),
    Range(RangeFunction, H, H),
}

/// Ordered, literal-merged token list of a formula.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormulaTemplate<H> {
    tokens: Vec<FormulaToken<H>>,
}

impl<H: Copy> FormulaTemplate<H> {
    /// Build a template, merging adjacent literals and dropping empty ones.
    pub fn new(tokens: impl IntoIterator<Item = FormulaToken<H>>) -> Self {
        let mut merged: Vec<FormulaToken<H>> = Vec::new();
        for token in tokens {
            match token {
                FormulaToken::Literal(text) if text.is_empty() => {}
                FormulaToken::Literal(text) => {
                    if let Some(FormulaToken::Literal(prev)) = merged.last_mut() {
                        prev.push_str(&text);
                    } else {
                        merged.push(FormulaToken::Literal(text));
                    }
                }
                reference => merged.push(reference),
            }
        }
        FormulaTemplate { tokens: merged }
    }

    pub fn tokens(&self) -> &[FormulaToken<H>] {
        &self.tokens
    }

    /// Handles in the order they appear, duplicates included.
    pub fn references(&self) -> impl Iterator<Item = H> + '_ {
        self.tokens.iter().filter_map(|token| match token {
            FormulaToken::Reference(h) => Some(*h),
            FormulaToken::Literal(_) => None,
        })
    }

    /// True for a formula made of exactly one reference, e.g. `=A5`.
    /// Such a formula may evaluate to text.
    pub fn is_single_reference(&self) -> bool {
        matches!(self.tokens.as_slice(), [FormulaToken::Reference(_)])
    }

    pub fn has_range(&self) -> bool {
        self.tokens
            .iter()
            .any(|token| matches!(token, FormulaToken::Literal(text) if text == ":"))
    }

    /// Render `=` plus the formula, asking `label` for each handle's current text.
    pub fn render(&self, mut label: impl FnMut(H) -> String) -> String {
        let mut out = String::from("=");
        for token in &self.tokens {
            match token {
                FormulaToken::Literal(text) => out.push_str(text),
                FormulaToken::Reference(h) => out.push_str(&label(*h)),
            }
        }
        out
    }

    /// Regroup `FUNC(` ref `:` ref `)` sequences into [`Term::Range`].
    ///
    /// References adjacent to a `:` literal are range corners; every other
    /// reference becomes a [`Term::Cell`]. Returns `None` if a range is not
    /// preceded by a recognised function name, which a parsed template never
    /// produces.
    pub fn terms(&self) -> Option<Vec<Term<H>>> {
        let mut terms = Vec::new();
        let mut text = String::new();
        let mut close_paren = false;
        let mut i = 0;

        while i < self.tokens.len() {
            match &self.tokens[i] {
                FormulaToken::Literal(literal) => {
                    let literal = if close_paren {
                        close_paren = false;
                        literal.strip_prefix(')')?
                    } else {
                        literal.as_str()
                    };
                    text.push_str(literal);
                    i += 1;
                }
                FormulaToken::Reference(start) => {
                    let range_end = match (self.tokens.get(i + 1), self.tokens.get(i + 2)) {
                        (
                            Some(FormulaToken::Literal(colon)),
                            Some(FormulaToken::Reference(end)),
                        ) if colon == ":" => Some(*end),
                        _ => None,
                    };
                    match range_end {
                        Some(end) => {
                            let (prefix_len, function) = RangeFunction::split_call(&text)?;
                            text.truncate(prefix_len);
                            flush(&mut terms, &mut text);
                            terms.push(Term::Range(function, *start, end));
                            close_paren = true;
                            i += 3;
                        }
                        None => {
                            flush(&mut terms, &mut text);
                            terms.push(Term::Cell(*start));
                            i += 1;
                        }
                    }
                }
            }
        }
        if close_paren {
            return None;
        }
        flush(&mut terms, &mut text);
        Some(terms)
    }
}

fn flush<H>(terms: &mut Vec<Term<H>>, text: &mut String) {
    if !text.is_empty() {
        terms.push(Term::Text(std::mem::take(text)));
    }
}
