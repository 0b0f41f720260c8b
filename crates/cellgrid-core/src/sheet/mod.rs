//! The spreadsheet aggregate and its cell, grid and formula lifecycle.

mod cell;
mod deps;
mod eval;
mod grid;
mod ops;
mod sort;
mod state;

pub use cell::{Cell, CellId, CellKind};
pub use grid::{Direction, GridIndex};
pub use state::Spreadsheet;
