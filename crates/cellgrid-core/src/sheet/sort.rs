//! Row sorting by the computed values of one column.
//!
//! Rows move as whole units of cells. Formulas hold cell handles, so moving
//! a row never touches a template; only range rectangles, which are defined
//! by their corner positions, need refreshing afterwards.

use cellgrid_engine::engine::{CellRef, letters_to_col};

use super::cell::{CellId, CellKind};
use super::state::Spreadsheet;
use crate::error::{Result, SheetError};

impl Spreadsheet {
    /// Sort data rows `start..=end` (either order) by the numbers in
    /// `column`. Rows without a number keep their relative order below the
    /// sorted ones. Nothing moves if a bound is off the grid.
    pub fn sort_rows(
        &mut self,
        column: &str,
        start: usize,
        end: usize,
        descending: bool,
    ) -> Result<()> {
        let label = column.trim().to_uppercase();
        let col = letters_to_col(&label)
            .filter(|c| (1..=self.grid.column_count()).contains(c))
            .ok_or_else(|| SheetError::Structural(format!("Column {} does not exist", label)))?;
        for row in [start, end] {
            if row == 0 || row > self.grid.row_count() {
                return Err(SheetError::Structural(format!("Row {} does not exist", row)));
            }
        }
        let (top, bottom) = (start.min(end), start.max(end));

        // Stable partition: numbers first, everything else after.
        let mut numeric_end = top;
        for row in top..=bottom {
            if self.sort_key(col, row).is_some() {
                self.grid.move_row(row, numeric_end);
                numeric_end += 1;
            }
        }

        // Selection sort of the numeric block; the first row seen wins ties.
        for window in top..numeric_end {
            let mut best = window;
            let mut best_key = self.sort_key(col, window);
            for row in window + 1..numeric_end {
                let key = self.sort_key(col, row);
                let better = match (key, best_key) {
                    (Some(k), Some(b)) if descending => k > b,
                    (Some(k), Some(b)) => k < b,
                    _ => false,
                };
                if better {
                    best = row;
                    best_key = key;
                }
            }
            self.grid.move_row(best, window);
        }

        self.grid.reindex_rows(top);
        self.grid.relabel_rows(top);
        log::info!(
            "sorted rows {}..={} by column {} ({})",
            top,
            bottom,
            label,
            if descending { "descending" } else { "ascending" }
        );

        self.refresh_range_formulas();
        Ok(())
    }

    /// Number held by the cell at `col`, `row` in the current row order.
    fn sort_key(&self, col: usize, row: usize) -> Option<f64> {
        let id = self.grid.get(CellRef::new(col, row))?;
        self.cells[id.index()].number()
    }

    fn refresh_range_formulas(&mut self) {
        let seeds: Vec<CellId> = self
            .grid
            .iter()
            .filter(|id| {
                let cell = &self.cells[id.index()];
                cell.kind == CellKind::Formula
                    && cell.template.as_ref().is_some_and(|t| t.has_range())
            })
            .collect();
        self.cascade(seeds);
    }
}
