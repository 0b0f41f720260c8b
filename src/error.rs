//! Error types for the cellgrid command shell

use cellgrid_core::SheetError;
use thiserror::Error;

/// Errors reported for a single shell command
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Unknown command: {0} (try 'help')")]
    UnknownCommand(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    #[error(transparent)]
    Sheet(#[from] SheetError),
}

pub type Result<T> = std::result::Result<T, CliError>;
