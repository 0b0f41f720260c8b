//! Error types attached to cells.

use thiserror::Error;

/// Everything that can go wrong while turning a cell's input into a value.
///
/// None of these are fatal: the cell keeps a fallback value and carries the
/// error as its message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CellError {
    #[error("Formula syntax is not recognised. Operands are cell references, numbers or SUM/MEAN/MAX/MIN(ref:ref), joined by + - * /")]
    Syntax,

    #[error("{0} is not a valid cell reference")]
    InvalidAddress(String),

    #[error("The cell reference {0} isn't on the grid")]
    UnknownReference(String),

    #[error("Formula contains a self-reference")]
    SelfReference,

    #[error("Formula contains a circular reference")]
    CircularReference,

    #[error("Formula refers to a cell that has been removed from the grid (#REF!)")]
    DestroyedReference,

    #[error("Function range contains the formula's own cell")]
    RangeSelfInclusion,

    #[error("Formula applies arithmetic to a non-numeric value")]
    NonNumericOperation,

    #[error("Arithmetic failed: {0}")]
    Arithmetic(String),
}

impl CellError {
    /// Errors that reject the formula outright instead of producing a value.
    pub fn rejects_formula(&self) -> bool {
        matches!(
            self,
            CellError::Syntax
                | CellError::InvalidAddress(_)
                | CellError::UnknownReference(_)
                | CellError::SelfReference
                | CellError::CircularReference
        )
    }
}
