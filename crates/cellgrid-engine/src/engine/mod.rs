//! Formula language API.
//!
//! This module holds the pieces of the formula language that do not need a
//! grid to work:
//!
//! - [`CellRef`], [`col_to_letters`], [`letters_to_col`] - A1 addresses
//! - [`Value`] - Computed cell values and literal classification
//! - [`FormulaTemplate`], [`FormulaToken`], [`Term`] - Compiled formulas
//! - [`compile`], [`is_formula`], [`normalize`] - Formula parsing
//! - [`RangeFunction`] - SUM/MEAN/MAX/MIN
//! - [`Arithmetic`] - Evaluation of the final numeric expression
//! - [`CellError`] - Everything a cell can report

mod cell_ref;
mod error;
mod eval;
mod functions;
mod parse;
mod template;
mod value;

pub use cell_ref::{CellRef, col_to_letters, letters_to_col};
pub use error::CellError;
pub use eval::{Arithmetic, is_numeric_expression};
pub use functions::{RANGE_FUNCTIONS, RangeBuiltin, RangeFunction};
pub use parse::{compile, is_formula, normalize, validate};
pub use template::{FormulaTemplate, FormulaToken, Term};
pub use value::{Value, format_number};
