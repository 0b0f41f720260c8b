//! Cell entities.
//!
//! A cell's identity is its [`CellId`], an index into the spreadsheet's cell
//! arena. It never changes when rows or columns move, which is what lets
//! formula templates hold handles instead of addresses.

use cellgrid_engine::engine::{CellError, FormulaTemplate, Value};
use std::fmt;

/// Stable handle to a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(u32);

impl CellId {
    pub(crate) fn new(index: usize) -> CellId {
        CellId(u32::try_from(index).unwrap_or(u32::MAX))
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The type of content stored in a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellKind {
    Empty,
    Literal,
    Formula,
}

/// A cell in the spreadsheet.
#[derive(Clone, Debug)]
pub struct Cell {
    pub(crate) kind: CellKind,
    /// Edit text for non-formula cells (the literal, or a rejected formula).
    pub(crate) text: String,
    pub(crate) value: Option<Value>,
    pub(crate) error: Option<CellError>,
    pub(crate) template: Option<FormulaTemplate<CellId>>,
    /// Cells this formula reads. Duplicates allowed, insertion order kept.
    pub(crate) referenced: Vec<CellId>,
    /// Cells whose formulas read this cell. Duplicates allowed.
    pub(crate) dependent: Vec<CellId>,
    pub(crate) destroyed: bool,
}

impl Cell {
    pub fn new_empty() -> Cell {
        Cell {
            kind: CellKind::Empty,
            text: String::new(),
            value: None,
            error: None,
            template: None,
            referenced: Vec::new(),
            dependent: Vec::new(),
            destroyed: false,
        }
    }

    pub fn kind(&self) -> CellKind {
        self.kind
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn error(&self) -> Option<&CellError> {
        self.error.as_ref()
    }

    pub fn template(&self) -> Option<&FormulaTemplate<CellId>> {
        self.template.as_ref()
    }

    pub fn referenced(&self) -> &[CellId] {
        &self.referenced
    }

    pub fn dependents(&self) -> &[CellId] {
        &self.dependent
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Holds a number, for sorting and range aggregation.
    pub fn number(&self) -> Option<f64> {
        self.value.as_ref().and_then(Value::as_number)
    }

    /// Drop everything but the dependent list, which belongs to other cells'
    /// formulas.
    pub(crate) fn clear_contents(&mut self) {
        self.kind = CellKind::Empty;
        self.text.clear();
        self.error = None;
        self.template = None;
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::new_empty()
    }
}
