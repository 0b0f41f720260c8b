use cellgrid_engine::engine::{CellError, Value, compile, is_formula, normalize};

use super::cell::{CellId, CellKind};
use super::eval::Outcome;
use super::state::Spreadsheet;
use crate::error::{Result, SheetError};

/// Dimension for row/column operations
#[derive(Copy, Clone)]
enum Dimension {
    Row,
    Column,
}

impl Dimension {
    fn name(self) -> &'static str {
        match self {
            Dimension::Row => "row",
            Dimension::Column => "column",
        }
    }
}

impl Spreadsheet {
    /// Assign raw user input to a cell and propagate the result.
    ///
    /// Formula problems never fail the call: they end up as the cell's error,
    /// with a fallback value. Only a foreign or removed cell is an `Err`.
    pub fn set_raw_input(&mut self, id: CellId, text: &str) -> Result<()> {
        self.live(id)?;
        let changed = if is_formula(text) {
            self.assign_formula(id, text)
        } else {
            self.assign_literal(id, text)
        };
        if changed {
            self.notify_dependents(id);
        }
        Ok(())
    }

    fn assign_literal(&mut self, id: CellId, text: &str) -> bool {
        self.replace_edges(id, Vec::new());
        let value = Value::from_input(text);
        let cell = &mut self.cells[id.index()];
        cell.clear_contents();
        cell.kind = if value.is_some() {
            CellKind::Literal
        } else {
            CellKind::Empty
        };
        cell.text = text.to_string();
        self.set_value(id, value)
    }

    fn assign_formula(&mut self, id: CellId, raw: &str) -> bool {
        let grid = &self.grid;
        let template = match compile(raw, |address| grid.find_by_address(address)) {
            Ok(template) => template,
            Err(error) => return self.reject(id, raw, error),
        };

        match self.evaluate(id, &template) {
            Outcome::Rejected(error) => self.reject(id, raw, error),
            Outcome::Evaluated {
                value,
                error,
                referenced,
            } => {
                self.replace_edges(id, referenced);
                if let Some(error) = &error {
                    log::debug!("{}: {}", self.label(id), error);
                }
                let cell = &mut self.cells[id.index()];
                cell.clear_contents();
                cell.kind = CellKind::Formula;
                cell.template = Some(template);
                cell.error = error;
                self.set_value(id, value)
            }
        }
    }

    /// Turn a formula that cannot be accepted into a literal carrying the
    /// error. No edges or template survive.
    fn reject(&mut self, id: CellId, raw: &str, error: CellError) -> bool {
        log::warn!("{}: rejected {}: {}", self.label(id), raw.trim(), error);
        let text = match error {
            CellError::Syntax => raw.to_string(),
            _ => normalize(raw),
        };
        let value = match error {
            // Showing the formula text would feed the cycle it closes.
            CellError::CircularReference => self.cells[id.index()].value.clone(),
            _ => Some(Value::Text(text.clone())),
        };

        self.replace_edges(id, Vec::new());
        let cell = &mut self.cells[id.index()];
        cell.clear_contents();
        cell.kind = CellKind::Literal;
        cell.text = text;
        cell.error = Some(error);
        self.set_value(id, value)
    }

    /// Insert an empty row below the anchor cell's row.
    pub fn insert_row(&mut self, anchor: CellId) -> Result<()> {
        let pos = self.position_of(anchor)?;
        self.insert_at(Dimension::Row, pos.row)
    }

    /// Insert an empty column right of the anchor cell's column.
    pub fn insert_column(&mut self, anchor: CellId) -> Result<()> {
        let pos = self.position_of(anchor)?;
        self.insert_at(Dimension::Column, pos.col)
    }

    /// Insert an empty row below data row `after`; 0 inserts at the top.
    pub fn insert_row_after(&mut self, after: usize) -> Result<()> {
        self.insert_at(Dimension::Row, after)
    }

    /// Insert an empty column right of data column `after`; 0 inserts at the left.
    pub fn insert_column_after(&mut self, after: usize) -> Result<()> {
        self.insert_at(Dimension::Column, after)
    }

    /// Remove the anchor cell's row. Formulas reading it show `#REF!`.
    pub fn remove_row(&mut self, anchor: CellId) -> Result<()> {
        let pos = self.position_of(anchor)?;
        self.remove_at(Dimension::Row, pos.row)
    }

    /// Remove the anchor cell's column. Formulas reading it show `#REF!`.
    pub fn remove_column(&mut self, anchor: CellId) -> Result<()> {
        let pos = self.position_of(anchor)?;
        self.remove_at(Dimension::Column, pos.col)
    }

    pub fn remove_row_at(&mut self, row: usize) -> Result<()> {
        self.remove_at(Dimension::Row, row)
    }

    pub fn remove_column_at(&mut self, col: usize) -> Result<()> {
        self.remove_at(Dimension::Column, col)
    }

    fn insert_at(&mut self, dim: Dimension, after: usize) -> Result<()> {
        let (limit, width) = match dim {
            Dimension::Row => (self.grid.row_count(), self.grid.column_count()),
            Dimension::Column => (self.grid.column_count(), self.grid.row_count()),
        };
        if after > limit {
            return Err(SheetError::Structural(format!(
                "Cannot insert after {} {}: the grid has {}",
                dim.name(),
                after,
                limit
            )));
        }

        let cells: Vec<CellId> = (0..width).map(|_| self.alloc_cell()).collect();
        match dim {
            Dimension::Row => self.grid.insert_row(after, cells)?,
            Dimension::Column => self.grid.insert_column(after, cells)?,
        }
        log::info!("inserted {} after {}", dim.name(), after);

        // Ranges with a corner on the boundary may now cover the new cells.
        let boundary = match dim {
            Dimension::Row => self.grid.row(after).map(<[CellId]>::to_vec).unwrap_or_default(),
            Dimension::Column => self.grid.column(after),
        };
        let seeds: Vec<CellId> = boundary
            .iter()
            .flat_map(|id| self.cells[id.index()].dependent.clone())
            .collect();
        self.cascade(seeds);
        Ok(())
    }

    fn remove_at(&mut self, dim: Dimension, index: usize) -> Result<()> {
        let removed = match dim {
            Dimension::Row => self.grid.remove_row(index)?,
            Dimension::Column => self.grid.remove_column(index)?,
        };
        log::info!("removed {} {}", dim.name(), index);
        self.destroy_cells(&removed);
        Ok(())
    }

    /// Destroy cells already taken out of the grid, then let their
    /// dependents discover the dangling references.
    fn destroy_cells(&mut self, removed: &[CellId]) {
        for id in removed {
            self.replace_edges(*id, Vec::new());
            let cell = &mut self.cells[id.index()];
            cell.clear_contents();
            cell.value = None;
            cell.destroyed = true;
        }
        let seeds: Vec<CellId> = removed
            .iter()
            .flat_map(|id| self.cells[id.index()].dependent.clone())
            .collect();
        self.cascade(seeds);
    }
}

#[cfg(test)]
mod tests {
    use crate::sheet::deps::assert_edges_symmetric;
    use crate::{CellKind, SheetConfig, SheetError, Spreadsheet};
    use cellgrid_engine::engine::{CellError, Value};
    use pretty_assertions::assert_eq;

    fn number(value: Option<&Value>) -> Option<f64> {
        value.and_then(Value::as_number)
    }

    #[test]
    fn test_self_reference_falls_back_to_formula_text() {
        let mut sheet = Spreadsheet::default();
        let a1 = sheet.set("A1", "=A1").unwrap();
        assert_eq!(sheet.error(a1), Some(&CellError::SelfReference));
        assert_eq!(sheet.computed_value(a1), Some(&Value::Text("=A1".to_string())));
        assert!(sheet.cell(a1).unwrap().referenced().is_empty());
        assert!(sheet.cell(a1).unwrap().dependents().is_empty());
        assert_eq!(sheet.cell(a1).unwrap().kind(), CellKind::Literal);
    }

    #[test]
    fn test_circular_reference_leaves_first_formula_alone() {
        let mut sheet = Spreadsheet::default();
        let a1 = sheet.set("A1", "=B1").unwrap();
        assert_eq!(sheet.error(a1), None);
        assert_eq!(number(sheet.computed_value(a1)), Some(0.0));

        let b1 = sheet.set("B1", "=A1").unwrap();
        assert_eq!(sheet.error(b1), Some(&CellError::CircularReference));
        assert_eq!(sheet.computed_value(b1), None);
        assert_eq!(sheet.edit_text(b1), "=A1");

        assert_eq!(sheet.edit_text(a1), "=B1");
        assert_eq!(number(sheet.computed_value(a1)), Some(0.0));
        assert_eq!(sheet.cell(a1).unwrap().referenced(), &[b1]);
        assert!(sheet.cell(b1).unwrap().referenced().is_empty());
        assert_edges_symmetric(&sheet);
    }

    #[test]
    fn test_propagation_without_explicit_recompute() {
        let mut sheet = Spreadsheet::default();
        sheet.set("A1", "5").unwrap();
        let b1 = sheet.set("B1", "=A1+1").unwrap();
        assert_eq!(number(sheet.computed_value(b1)), Some(6.0));
        sheet.set("A1", "10").unwrap();
        assert_eq!(number(sheet.computed_value(b1)), Some(11.0));
    }

    #[test]
    fn test_syntax_error_keeps_raw_text() {
        let mut sheet = Spreadsheet::default();
        let a1 = sheet.set("A1", " =1+ ").unwrap();
        assert_eq!(sheet.error(a1), Some(&CellError::Syntax));
        assert_eq!(sheet.computed_value(a1), Some(&Value::Text(" =1+ ".to_string())));
        assert_eq!(sheet.edit_text(a1), " =1+ ");
        assert!(sheet.cell(a1).unwrap().template().is_none());
    }

    #[test]
    fn test_unknown_reference_is_atomic() {
        let mut sheet = Spreadsheet::new(SheetConfig { rows: 3, columns: 3 });
        let a1 = sheet.set("A1", "1").unwrap();
        let b1 = sheet.set("B1", "=a1+z9").unwrap();
        assert_eq!(
            sheet.error(b1),
            Some(&CellError::UnknownReference("Z9".to_string()))
        );
        assert_eq!(sheet.computed_value(b1), Some(&Value::Text("=A1+Z9".to_string())));
        assert!(sheet.cell(a1).unwrap().dependents().is_empty());
    }

    #[test]
    fn test_reassignment_replaces_edges() {
        let mut sheet = Spreadsheet::default();
        let a1 = sheet.set("A1", "1").unwrap();
        let a2 = sheet.set("A2", "2").unwrap();
        let b1 = sheet.set("B1", "=A1").unwrap();
        sheet.set_raw_input(b1, "=A2*2").unwrap();
        assert!(sheet.cell(a1).unwrap().dependents().is_empty());
        assert_eq!(sheet.cell(a2).unwrap().dependents(), &[b1]);
        sheet.set("A1", "100").unwrap();
        assert_eq!(number(sheet.computed_value(b1)), Some(4.0));
        assert_edges_symmetric(&sheet);
    }

    #[test]
    fn test_clearing_a_cell_makes_it_empty() {
        let mut sheet = Spreadsheet::default();
        let a1 = sheet.set("A1", "3").unwrap();
        let b1 = sheet.set("B1", "=A1+1").unwrap();
        sheet.set_raw_input(a1, "  ").unwrap();
        assert_eq!(sheet.cell(a1).unwrap().kind(), CellKind::Empty);
        assert_eq!(sheet.computed_value(a1), None);
        assert_eq!(number(sheet.computed_value(b1)), Some(1.0));
    }

    #[test]
    fn test_delete_row_leaves_ref_error() {
        let mut sheet = Spreadsheet::default();
        let a1 = sheet.set("A1", "4").unwrap();
        let b2 = sheet.set("B2", "=A1").unwrap();
        sheet.remove_row(a1).unwrap();

        assert_eq!(sheet.address_of(a1), Err(SheetError::Destroyed));
        assert_eq!(sheet.address_of(b2).unwrap(), "B1");
        assert_eq!(sheet.error(b2), Some(&CellError::DestroyedReference));
        assert_eq!(sheet.computed_value(b2), Some(&Value::Text("=#REF!".to_string())));
        assert_eq!(sheet.edit_text(b2), "=#REF!");
        assert!(sheet.cell(b2).unwrap().referenced().is_empty());
        assert!(sheet.cell(a1).unwrap().is_destroyed());
        assert_edges_symmetric(&sheet);
    }

    #[test]
    fn test_delete_empty_cell_still_notifies() {
        let mut sheet = Spreadsheet::default();
        let c3 = sheet.set("C3", "=B2*2").unwrap();
        assert_eq!(number(sheet.computed_value(c3)), Some(0.0));
        sheet.remove_column_at(2).unwrap();
        assert_eq!(sheet.error(c3), Some(&CellError::DestroyedReference));
        assert_eq!(sheet.edit_text(c3), "=#REF!*2");
    }

    #[test]
    fn test_destroyed_reference_does_not_hide_other_terms() {
        let mut sheet = Spreadsheet::default();
        sheet.set("A1", "1").unwrap();
        sheet.set("A2", "2").unwrap();
        let c2 = sheet.set("C2", "=A1+A2").unwrap();
        sheet.remove_row_at(1).unwrap();
        let a2 = sheet.resolve_address("A1").unwrap();
        assert_eq!(sheet.cell(c2).unwrap().referenced(), &[a2]);
        assert_eq!(sheet.edit_text(c2), "=#REF!+A1");
    }

    #[test]
    fn test_cannot_remove_last_row_or_column() {
        let mut sheet = Spreadsheet::new(SheetConfig { rows: 1, columns: 1 });
        let a1 = sheet.resolve_address("A1").unwrap();
        assert!(matches!(sheet.remove_row(a1), Err(SheetError::Structural(_))));
        assert!(matches!(sheet.remove_column(a1), Err(SheetError::Structural(_))));
        assert!(!sheet.cell(a1).unwrap().is_destroyed());
    }

    #[test]
    fn test_insert_row_inside_range_is_picked_up() {
        let mut sheet = Spreadsheet::default();
        let a1 = sheet.set("A1", "1").unwrap();
        sheet.set("A2", "2").unwrap();
        let b1 = sheet.set("B1", "=SUM(A1:A2)").unwrap();
        sheet.insert_row(a1).unwrap();

        assert_eq!(sheet.edit_text(b1), "=SUM(A1:A3)");
        sheet.set("A2", "10").unwrap();
        assert_eq!(number(sheet.computed_value(b1)), Some(13.0));
        assert_eq!(sheet.cell(b1).unwrap().referenced().len(), 3);
        assert_edges_symmetric(&sheet);
    }

    #[test]
    fn test_insert_column_inside_range_is_picked_up() {
        let mut sheet = Spreadsheet::default();
        let a1 = sheet.set("A1", "1").unwrap();
        sheet.set("B1", "2").unwrap();
        let c3 = sheet.set("C3", "=SUM(A1:B1)").unwrap();
        sheet.insert_column(a1).unwrap();

        assert_eq!(sheet.address_of(c3).unwrap(), "D3");
        assert_eq!(sheet.edit_text(c3), "=SUM(A1:C1)");
        sheet.set("B1", "10").unwrap();
        assert_eq!(number(sheet.computed_value(c3)), Some(13.0));
        assert_eq!(sheet.cell(c3).unwrap().referenced().len(), 3);
        assert_edges_symmetric(&sheet);
    }

    #[test]
    fn test_delete_range_corner_leaves_ref_error() {
        let mut sheet = Spreadsheet::default();
        let a1 = sheet.set("A1", "1").unwrap();
        let a2 = sheet.set("A2", "2").unwrap();
        let a3 = sheet.set("A3", "3").unwrap();
        let c5 = sheet.set("C5", "=SUM(A1:A3)").unwrap();
        assert_eq!(number(sheet.computed_value(c5)), Some(6.0));

        sheet.remove_row(a1).unwrap();
        assert_eq!(sheet.error(c5), Some(&CellError::DestroyedReference));
        assert_eq!(sheet.edit_text(c5), "=SUM(#REF!:A2)");
        assert_eq!(
            sheet.computed_value(c5),
            Some(&Value::Text("=SUM(#REF!:A2)".to_string()))
        );
        assert!(sheet.cell(c5).unwrap().referenced().is_empty());
        assert!(sheet.cell(a2).unwrap().dependents().is_empty());
        assert!(sheet.cell(a3).unwrap().dependents().is_empty());
        assert_edges_symmetric(&sheet);
    }

    #[test]
    fn test_insert_shifts_addresses_not_formulas() {
        let mut sheet = Spreadsheet::default();
        sheet.set("A1", "7").unwrap();
        let b1 = sheet.set("B1", "=A1*2").unwrap();
        sheet.insert_column_after(0).unwrap();
        assert_eq!(sheet.address_of(b1).unwrap(), "C1");
        assert_eq!(sheet.edit_text(b1), "=B1*2");
        assert_eq!(number(sheet.computed_value(b1)), Some(14.0));
        assert_eq!(sheet.column_count(), 5);
        assert_eq!(sheet.grid().column_label(5), Some("E"));
    }

    #[test]
    fn test_insert_after_out_of_range_is_structural() {
        let mut sheet = Spreadsheet::new(SheetConfig { rows: 2, columns: 2 });
        assert!(matches!(
            sheet.insert_row_after(3),
            Err(SheetError::Structural(_))
        ));
        assert_eq!(sheet.row_count(), 2);
    }

    #[test]
    fn test_destroyed_cell_rejects_input() {
        let mut sheet = Spreadsheet::default();
        let a1 = sheet.resolve_address("A1").unwrap();
        sheet.remove_row(a1).unwrap();
        assert_eq!(sheet.set_raw_input(a1, "1"), Err(SheetError::Destroyed));
        assert_eq!(sheet.insert_row(a1), Err(SheetError::Destroyed));
    }

    #[test]
    fn test_error_clears_when_input_is_fixed() {
        let mut sheet = Spreadsheet::default();
        let a1 = sheet.set("A1", "=A1").unwrap();
        sheet.set_raw_input(a1, "=2*3").unwrap();
        assert_eq!(sheet.error(a1), None);
        assert_eq!(number(sheet.computed_value(a1)), Some(6.0));
        assert_eq!(sheet.cell(a1).unwrap().kind(), CellKind::Formula);
    }
}
