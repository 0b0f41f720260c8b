//! cellgrid_engine - Formula language for the cellgrid spreadsheet.

pub mod engine;
