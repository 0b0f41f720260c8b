use cellgrid_engine::engine::{Arithmetic, CellError, CellRef, Value};

use super::cell::{Cell, CellId, CellKind};
use super::grid::{Direction, GridIndex};
use crate::config::SheetConfig;
use crate::error::{Result, SheetError};

/// Label rendered in place of a reference to a removed cell.
pub(crate) const REF_ERROR: &str = "#REF!";

/// One sheet: the cell arena, the grid that places cells, and the evaluator.
///
/// Cells are never freed. A cell whose row or column is removed stays in the
/// arena marked destroyed, so every [`CellId`] handed out remains valid.
pub struct Spreadsheet {
    pub(crate) cells: Vec<Cell>,
    pub(crate) grid: GridIndex,
    pub(crate) arithmetic: Arithmetic,
}

impl Spreadsheet {
    /// Create an empty sheet. Both dimensions are at least one.
    pub fn new(config: SheetConfig) -> Self {
        let mut cells = Vec::new();
        let grid = GridIndex::with_size(config.rows.max(1), config.columns.max(1), || {
            cells.push(Cell::new_empty());
            CellId::new(cells.len() - 1)
        });
        log::debug!(
            "new sheet with {} rows and {} columns",
            grid.row_count(),
            grid.column_count()
        );
        Spreadsheet {
            cells,
            grid,
            arithmetic: Arithmetic::new(),
        }
    }

    pub(crate) fn alloc_cell(&mut self) -> CellId {
        self.cells.push(Cell::new_empty());
        CellId::new(self.cells.len() - 1)
    }

    pub fn grid(&self) -> &GridIndex {
        &self.grid
    }

    pub fn row_count(&self) -> usize {
        self.grid.row_count()
    }

    pub fn column_count(&self) -> usize {
        self.grid.column_count()
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id.index())
    }

    /// The cell for `id` if it belongs to this sheet and is still on the grid.
    pub(crate) fn live(&self, id: CellId) -> Result<&Cell> {
        let cell = self.cell(id).ok_or(SheetError::UnknownCell(id))?;
        if cell.destroyed {
            return Err(SheetError::Destroyed);
        }
        Ok(cell)
    }

    pub fn resolve_address(&self, text: &str) -> Result<CellId> {
        Ok(self.grid.find_by_address(text)?)
    }

    pub fn position_of(&self, id: CellId) -> Result<CellRef> {
        self.grid.position_of(id).ok_or(SheetError::Destroyed)
    }

    /// Current address of a cell, e.g. "B3".
    pub fn address_of(&self, id: CellId) -> Result<String> {
        Ok(self.position_of(id)?.to_string())
    }

    /// Address of a handle inside a formula, or `#REF!` once it is gone.
    pub(crate) fn label(&self, id: CellId) -> String {
        self.grid
            .position_of(id)
            .map(|pos| pos.to_string())
            .unwrap_or_else(|| REF_ERROR.to_string())
    }

    pub fn computed_value(&self, id: CellId) -> Option<&Value> {
        self.cell(id).and_then(Cell::value)
    }

    pub fn error(&self, id: CellId) -> Option<&CellError> {
        self.cell(id).and_then(Cell::error)
    }

    /// Text to show when editing: the formula with current addresses, or the
    /// raw literal text.
    pub fn edit_text(&self, id: CellId) -> String {
        let Some(cell) = self.cell(id) else {
            return String::new();
        };
        match (&cell.kind, &cell.template) {
            (CellKind::Formula, Some(template)) => template.render(|h| self.label(h)),
            _ => cell.text.clone(),
        }
    }

    pub fn cell_above(&self, id: CellId) -> Result<CellId> {
        self.neighbour(id, Direction::Up)
    }

    pub fn cell_below(&self, id: CellId) -> Result<CellId> {
        self.neighbour(id, Direction::Down)
    }

    pub fn cell_left(&self, id: CellId) -> Result<CellId> {
        self.neighbour(id, Direction::Left)
    }

    pub fn cell_right(&self, id: CellId) -> Result<CellId> {
        self.neighbour(id, Direction::Right)
    }

    fn neighbour(&self, id: CellId, direction: Direction) -> Result<CellId> {
        self.grid
            .neighbour(id, direction)
            .ok_or(SheetError::Destroyed)
    }

    /// Set a cell by address. Shorthand for resolving then [`Spreadsheet::set_raw_input`].
    pub fn set(&mut self, address: &str, text: &str) -> Result<CellId> {
        let id = self.resolve_address(address)?;
        self.set_raw_input(id, text)?;
        Ok(id)
    }

    /// Computed value at an address, if the address is on the grid.
    pub fn value_at(&self, address: &str) -> Option<&Value> {
        let id = self.grid.find_by_address(address).ok()?;
        self.computed_value(id)
    }
}

impl Default for Spreadsheet {
    fn default() -> Self {
        Self::new(SheetConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sheet_has_configured_size() {
        let sheet = Spreadsheet::new(SheetConfig { rows: 3, columns: 2 });
        assert_eq!(sheet.row_count(), 3);
        assert_eq!(sheet.column_count(), 2);
        assert!(sheet.resolve_address("B3").is_ok());
        assert!(sheet.resolve_address("C1").is_err());
    }

    #[test]
    fn test_zero_sized_config_still_has_one_cell() {
        let sheet = Spreadsheet::new(SheetConfig { rows: 0, columns: 0 });
        assert_eq!(sheet.row_count(), 1);
        assert_eq!(sheet.column_count(), 1);
    }

    #[test]
    fn test_address_of_and_navigation() {
        let sheet = Spreadsheet::default();
        let b2 = sheet.resolve_address("b2").unwrap();
        assert_eq!(sheet.address_of(b2).unwrap(), "B2");
        let up = sheet.cell_above(b2).unwrap();
        assert_eq!(sheet.address_of(up).unwrap(), "B1");
        assert_eq!(sheet.cell_above(up).unwrap(), up);
        let left = sheet.cell_left(b2).unwrap();
        assert_eq!(sheet.address_of(left).unwrap(), "A2");
        assert_eq!(sheet.cell_left(left).unwrap(), left);
    }

    #[test]
    fn test_literal_edit_text_is_raw() {
        let mut sheet = Spreadsheet::default();
        let a1 = sheet.set("A1", " hello ").unwrap();
        assert_eq!(sheet.edit_text(a1), " hello ");
        assert_eq!(
            sheet.computed_value(a1),
            Some(&Value::Text(" hello ".to_string()))
        );
    }
}
