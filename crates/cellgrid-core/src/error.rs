//! Error types for the spreadsheet aggregate.

use cellgrid_engine::engine::CellError;
use thiserror::Error;

use crate::sheet::CellId;

/// Errors returned by spreadsheet commands.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SheetError {
    #[error(transparent)]
    Cell(#[from] CellError),

    #[error("{0}")]
    Structural(String),

    #[error("Cell has been removed from the grid")]
    Destroyed,

    #[error("Cell {0} does not belong to this sheet")]
    UnknownCell(CellId),
}

pub type Result<T> = std::result::Result<T, SheetError>;
