//! Sheet configuration.

use serde::Deserialize;

/// Initial grid size in data rows and columns (headings not counted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    pub rows: usize,
    pub columns: usize,
}

impl Default for SheetConfig {
    fn default() -> Self {
        SheetConfig {
            rows: 14,
            columns: 4,
        }
    }
}
