//! cellgrid-core - the spreadsheet aggregate: cells, grid, dependency graph.

pub mod config;
pub mod error;
pub mod sheet;

pub use config::SheetConfig;
pub use error::{Result, SheetError};
pub use sheet::{Cell, CellId, CellKind, Direction, GridIndex, Spreadsheet};

pub use cellgrid_engine::engine::{CellError, CellRef, Value};
