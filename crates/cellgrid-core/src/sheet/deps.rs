//! Dependency graph bookkeeping.
//!
//! Edges live on the cells themselves: `referenced` is the outgoing list,
//! `dependent` the incoming one. Every change goes through
//! [`Spreadsheet::replace_edges`] so the two sides stay mirrored.

use cellgrid_engine::engine::CellError;
use std::collections::HashSet;

use super::cell::CellId;
use super::state::Spreadsheet;

impl Spreadsheet {
    /// Does `candidate` read `target`, directly or through other formulas?
    pub fn is_dependent_on(&self, candidate: CellId, target: CellId) -> bool {
        let mut stack = match self.cell(candidate) {
            Some(cell) => cell.referenced.clone(),
            None => return false,
        };
        let mut visited = HashSet::new();
        while let Some(id) = stack.pop() {
            if id == target {
                return true;
            }
            if !visited.insert(id) {
                continue;
            }
            if let Some(cell) = self.cell(id) {
                stack.extend(cell.referenced.iter().copied());
            }
        }
        false
    }

    /// May `owner`'s formula read `candidate`?
    pub(crate) fn check_reference(&self, candidate: CellId, owner: CellId) -> Result<(), CellError> {
        if self.grid.position_of(candidate).is_none() {
            return Err(CellError::DestroyedReference);
        }
        if candidate == owner {
            return Err(CellError::SelfReference);
        }
        if self.is_dependent_on(candidate, owner) {
            return Err(CellError::CircularReference);
        }
        Ok(())
    }

    /// Drop all of `owner`'s outgoing edges, then register `referenced`.
    pub(crate) fn replace_edges(&mut self, owner: CellId, referenced: Vec<CellId>) {
        let old = std::mem::replace(&mut self.cells[owner.index()].referenced, referenced);
        for target in old {
            let dependents = &mut self.cells[target.index()].dependent;
            if let Some(at) = dependents.iter().position(|d| *d == owner) {
                dependents.remove(at);
            }
        }
        let targets = self.cells[owner.index()].referenced.clone();
        for target in targets {
            self.cells[target.index()].dependent.push(owner);
        }
    }
}

/// Every referenced edge has its mirror and vice versa, counting duplicates.
#[cfg(test)]
pub(crate) fn assert_edges_symmetric(sheet: &Spreadsheet) {
    for (i, cell) in sheet.cells.iter().enumerate() {
        let id = CellId::new(i);
        for target in &cell.referenced {
            let forward = cell.referenced.iter().filter(|t| *t == target).count();
            let back = sheet.cells[target.index()]
                .dependent
                .iter()
                .filter(|d| **d == id)
                .count();
            assert_eq!(forward, back, "edge {} -> {} is not mirrored", id, target);
        }
        for dependent in &cell.dependent {
            assert!(
                sheet.cells[dependent.index()].referenced.contains(&id),
                "dependent {} of {} does not reference it",
                dependent,
                id
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::assert_edges_symmetric;
    use crate::Spreadsheet;
    use cellgrid_engine::engine::CellError;

    #[test]
    fn test_is_dependent_on_is_transitive() {
        let mut sheet = Spreadsheet::default();
        let a1 = sheet.set("A1", "1").unwrap();
        let b1 = sheet.set("B1", "=A1").unwrap();
        let c1 = sheet.set("C1", "=B1*2").unwrap();
        assert!(sheet.is_dependent_on(c1, a1));
        assert!(sheet.is_dependent_on(b1, a1));
        assert!(!sheet.is_dependent_on(a1, c1));
        assert_edges_symmetric(&sheet);
    }

    #[test]
    fn test_check_reference_order() {
        let mut sheet = Spreadsheet::default();
        let a1 = sheet.set("A1", "=B1").unwrap();
        let b1 = sheet.resolve_address("B1").unwrap();
        assert_eq!(sheet.check_reference(a1, a1), Err(CellError::SelfReference));
        assert_eq!(sheet.check_reference(a1, b1), Err(CellError::CircularReference));
        assert_eq!(sheet.check_reference(b1, a1), Ok(()));
    }

    #[test]
    fn test_duplicate_references_are_mirrored() {
        let mut sheet = Spreadsheet::default();
        let a1 = sheet.set("A1", "2").unwrap();
        let b1 = sheet.set("B1", "=A1*A1").unwrap();
        assert_eq!(sheet.cell(b1).unwrap().referenced(), &[a1, a1]);
        assert_eq!(sheet.cell(a1).unwrap().dependents(), &[b1, b1]);
        sheet.set_raw_input(b1, "=A1").unwrap();
        assert_eq!(sheet.cell(a1).unwrap().dependents(), &[b1]);
        assert_edges_symmetric(&sheet);
    }

    #[test]
    fn test_literal_assignment_severs_edges() {
        let mut sheet = Spreadsheet::default();
        let a1 = sheet.set("A1", "2").unwrap();
        let b1 = sheet.set("B1", "=A1+1").unwrap();
        sheet.set_raw_input(b1, "plain").unwrap();
        assert!(sheet.cell(b1).unwrap().referenced().is_empty());
        assert!(sheet.cell(a1).unwrap().dependents().is_empty());
    }
}
