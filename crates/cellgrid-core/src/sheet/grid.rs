//! Position index for the spreadsheet.
//!
//! [`GridIndex`] is the only place that knows where a cell sits. Data rows
//! and columns are one-based; row 0 and column 0 are the headings and never
//! hold a cell.

use cellgrid_engine::engine::{CellError, CellRef, col_to_letters};
use std::collections::HashMap;

use super::cell::CellId;
use crate::error::{Result, SheetError};

/// Neighbour lookup direction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Address <-> cell mapping plus heading labels.
#[derive(Debug, Default)]
pub struct GridIndex {
    /// `rows[r - 1][c - 1]` is the cell at row `r`, column `c`.
    rows: Vec<Vec<CellId>>,
    positions: HashMap<CellId, CellRef>,
    row_labels: Vec<String>,
    col_labels: Vec<String>,
}

impl GridIndex {
    /// Build a `rows` x `columns` grid, asking `alloc` for each new cell.
    pub fn with_size(rows: usize, columns: usize, mut alloc: impl FnMut() -> CellId) -> Self {
        let mut grid = GridIndex {
            rows: (0..rows)
                .map(|_| (0..columns).map(|_| alloc()).collect())
                .collect(),
            ..Default::default()
        };
        grid.reindex_rows(1);
        grid.relabel_rows(1);
        grid.relabel_columns(1);
        grid
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn get(&self, pos: CellRef) -> Option<CellId> {
        let row = self.rows.get(pos.row.checked_sub(1)?)?;
        row.get(pos.col.checked_sub(1)?).copied()
    }

    /// Cells of data row `row`, left to right.
    pub fn row(&self, row: usize) -> Option<&[CellId]> {
        self.rows.get(row.checked_sub(1)?).map(Vec::as_slice)
    }

    /// Cells of data column `col`, top to bottom.
    pub fn column(&self, col: usize) -> Vec<CellId> {
        let Some(index) = col.checked_sub(1) else {
            return Vec::new();
        };
        self.rows.iter().filter_map(|row| row.get(index).copied()).collect()
    }

    /// Every live cell, row by row.
    pub fn iter(&self) -> impl Iterator<Item = CellId> + '_ {
        self.rows.iter().flatten().copied()
    }

    /// Resolve an address such as "B3".
    pub fn find_by_address(&self, text: &str) -> std::result::Result<CellId, CellError> {
        let pos = CellRef::parse(text)?;
        self.get(pos)
            .ok_or_else(|| CellError::UnknownReference(pos.to_string()))
    }

    /// Current position of a cell, or `None` once its row/column is gone.
    pub fn position_of(&self, id: CellId) -> Option<CellRef> {
        self.positions.get(&id).copied()
    }

    /// Cells inside the rectangle spanned by two corners, in either order.
    pub fn cells_in_rect(&self, a: CellRef, b: CellRef) -> Vec<CellId> {
        let (top, bottom) = (a.row.min(b.row), a.row.max(b.row));
        let (left, right) = (a.col.min(b.col), a.col.max(b.col));
        let mut cells = Vec::new();
        for row in top..=bottom {
            for col in left..=right {
                if let Some(id) = self.get(CellRef::new(col, row)) {
                    cells.push(id);
                }
            }
        }
        cells
    }

    /// The adjacent cell in `direction`, or `id` itself at the edge.
    pub fn neighbour(&self, id: CellId, direction: Direction) -> Option<CellId> {
        let pos = self.position_of(id)?;
        let next = match direction {
            Direction::Up => pos.row.checked_sub(1).map(|row| CellRef::new(pos.col, row)),
            Direction::Down => Some(CellRef::new(pos.col, pos.row + 1)),
            Direction::Left => pos.col.checked_sub(1).map(|col| CellRef::new(col, pos.row)),
            Direction::Right => Some(CellRef::new(pos.col + 1, pos.row)),
        };
        Some(next.and_then(|p| self.get(p)).unwrap_or(id))
    }

    /// Insert `cells` as a new row directly below row `after` (0 = top).
    pub fn insert_row(&mut self, after: usize, cells: Vec<CellId>) -> Result<()> {
        if after > self.row_count() {
            return Err(SheetError::Structural(format!("Row {} does not exist", after)));
        }
        if cells.len() != self.column_count() {
            return Err(SheetError::Structural(format!(
                "A new row needs {} cells, got {}",
                self.column_count(),
                cells.len()
            )));
        }
        self.rows.insert(after, cells);
        self.reindex_rows(after + 1);
        self.relabel_rows(after + 1);
        Ok(())
    }

    /// Insert `cells` (one per row, top to bottom) as a new column right of
    /// column `after` (0 = far left).
    pub fn insert_column(&mut self, after: usize, cells: Vec<CellId>) -> Result<()> {
        if after > self.column_count() {
            return Err(SheetError::Structural(format!(
                "Column {} does not exist",
                col_to_letters(after)
            )));
        }
        if cells.len() != self.row_count() {
            return Err(SheetError::Structural(format!(
                "A new column needs {} cells, got {}",
                self.row_count(),
                cells.len()
            )));
        }
        for (row, id) in self.rows.iter_mut().zip(cells) {
            row.insert(after, id);
        }
        self.reindex_columns(after + 1);
        self.relabel_columns(after + 1);
        Ok(())
    }

    /// Take data row `row` out of the index. The last row cannot be removed.
    pub fn remove_row(&mut self, row: usize) -> Result<Vec<CellId>> {
        if self.row_count() <= 1 {
            return Err(SheetError::Structural(
                "The grid must keep at least one row".to_string(),
            ));
        }
        if row == 0 || row > self.row_count() {
            return Err(SheetError::Structural(format!("Row {} does not exist", row)));
        }
        let removed = self.rows.remove(row - 1);
        for id in &removed {
            self.positions.remove(id);
        }
        self.reindex_rows(row);
        self.relabel_rows(row);
        Ok(removed)
    }

    /// Take data column `col` out of the index. The last column cannot be removed.
    pub fn remove_column(&mut self, col: usize) -> Result<Vec<CellId>> {
        if self.column_count() <= 1 {
            return Err(SheetError::Structural(
                "The grid must keep at least one column".to_string(),
            ));
        }
        if col == 0 || col > self.column_count() {
            return Err(SheetError::Structural(format!(
                "Column {} does not exist",
                col_to_letters(col)
            )));
        }
        let removed: Vec<CellId> = self.rows.iter_mut().map(|row| row.remove(col - 1)).collect();
        for id in &removed {
            self.positions.remove(id);
        }
        self.reindex_columns(col);
        self.relabel_columns(col);
        Ok(removed)
    }

    /// Relocate data row `from` so it ends up at `to`, shifting the rows in
    /// between. Positions are stale until [`GridIndex::reindex_rows`].
    pub fn move_row(&mut self, from: usize, to: usize) {
        if from == to || from == 0 || to == 0 || from > self.row_count() || to > self.row_count() {
            return;
        }
        let row = self.rows.remove(from - 1);
        self.rows.insert(to - 1, row);
    }

    /// Recompute positions for rows `from..`.
    pub fn reindex_rows(&mut self, from: usize) {
        for (r, row) in self.rows.iter().enumerate().skip(from.saturating_sub(1)) {
            for (c, id) in row.iter().enumerate() {
                self.positions.insert(*id, CellRef::new(c + 1, r + 1));
            }
        }
    }

    /// Recompute positions for columns `from..` in every row.
    pub fn reindex_columns(&mut self, from: usize) {
        for (r, row) in self.rows.iter().enumerate() {
            for (c, id) in row.iter().enumerate().skip(from.saturating_sub(1)) {
                self.positions.insert(*id, CellRef::new(c + 1, r + 1));
            }
        }
    }

    /// Regenerate row heading labels from row `from` down.
    pub fn relabel_rows(&mut self, from: usize) {
        let count = self.row_count();
        self.row_labels.truncate(from.saturating_sub(1).min(count));
        for row in self.row_labels.len() + 1..=count {
            self.row_labels.push(row.to_string());
        }
    }

    /// Regenerate column heading labels from column `from` rightwards.
    pub fn relabel_columns(&mut self, from: usize) {
        let count = self.column_count();
        self.col_labels.truncate(from.saturating_sub(1).min(count));
        for col in self.col_labels.len() + 1..=count {
            self.col_labels.push(col_to_letters(col));
        }
    }

    pub fn row_label(&self, row: usize) -> Option<&str> {
        self.row_labels.get(row.checked_sub(1)?).map(String::as_str)
    }

    pub fn column_label(&self, col: usize) -> Option<&str> {
        self.col_labels.get(col.checked_sub(1)?).map(String::as_str)
    }
}
