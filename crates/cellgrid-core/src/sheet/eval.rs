//! Formula evaluation and recompute propagation.

use cellgrid_engine::engine::{CellError, FormulaTemplate, RangeFunction, Term, Value};

use super::cell::{CellId, CellKind};
use super::state::{REF_ERROR, Spreadsheet};
use crate::error::Result;

/// Result of running a template against the current grid.
pub(crate) enum Outcome {
    /// A reference check failed; the formula cannot be accepted.
    Rejected(CellError),
    /// The formula stands. `error` is set when the value is a fallback.
    Evaluated {
        value: Option<Value>,
        error: Option<CellError>,
        referenced: Vec<CellId>,
    },
}

impl Spreadsheet {
    /// Render a template with the current address of every handle.
    pub(crate) fn render(&self, template: &FormulaTemplate<CellId>) -> String {
        template.render(|h| self.label(h))
    }

    /// Evaluate `template` as the formula of `owner`.
    pub(crate) fn evaluate(&self, owner: CellId, template: &FormulaTemplate<CellId>) -> Outcome {
        let Some(terms) = template.terms() else {
            return Outcome::Rejected(CellError::Syntax);
        };

        let mut residue = String::new();
        let mut referenced = Vec::new();
        let mut single = None;
        let mut destroyed = false;
        let mut range_error = None;
        let mut text_operand = false;
        let arithmetic = !template.is_single_reference();

        for term in terms {
            match term {
                Term::Text(text) => residue.push_str(&text),
                Term::Cell(target) => match self.check_reference(target, owner) {
                    Ok(()) => {
                        let value = self.cells[target.index()].value.as_ref();
                        if arithmetic && matches!(value, Some(Value::Text(_))) {
                            // Text is never spliced in as expression syntax.
                            text_operand = true;
                            residue.push('0');
                        } else {
                            residue.push_str(&Value::operand_text(value));
                        }
                        single = value.cloned();
                        referenced.push(target);
                    }
                    Err(CellError::DestroyedReference) => {
                        destroyed = true;
                        residue.push_str(REF_ERROR);
                    }
                    Err(e) => return Outcome::Rejected(e),
                },
                Term::Range(function, start, end) => {
                    match self.aggregate(owner, function, start, end) {
                        Ok((result, members)) => {
                            residue.push_str(&result.to_string());
                            referenced.extend(members);
                        }
                        Err(CellError::DestroyedReference) => {
                            destroyed = true;
                            residue.push_str(REF_ERROR);
                        }
                        Err(CellError::RangeSelfInclusion) => {
                            range_error.get_or_insert(CellError::RangeSelfInclusion);
                            residue.push('0');
                        }
                        Err(e) => return Outcome::Rejected(e),
                    }
                }
            }
        }

        let error = if destroyed {
            Some(CellError::DestroyedReference)
        } else if range_error.is_some() {
            range_error
        } else if text_operand {
            Some(CellError::NonNumericOperation)
        } else {
            None
        };
        if let Some(error) = error {
            return Outcome::Evaluated {
                value: Some(Value::Text(self.render(template))),
                error: Some(error),
                referenced,
            };
        }
        if !arithmetic {
            return Outcome::Evaluated {
                value: Some(single.unwrap_or(Value::Number(0.0))),
                error: None,
                referenced,
            };
        }
        match self.arithmetic.evaluate(&residue) {
            Ok(n) => Outcome::Evaluated {
                value: Some(Value::Number(n)),
                error: None,
                referenced,
            },
            Err(error) => Outcome::Evaluated {
                value: Some(Value::Text(self.render(template))),
                error: Some(error),
                referenced,
            },
        }
    }

    /// Aggregate the numeric cells of a range. Returns the result and every
    /// member of the rectangle, which all become referenced cells.
    fn aggregate(
        &self,
        owner: CellId,
        function: RangeFunction,
        start: CellId,
        end: CellId,
    ) -> std::result::Result<(f64, Vec<CellId>), CellError> {
        let from = self
            .grid
            .position_of(start)
            .ok_or(CellError::DestroyedReference)?;
        let to = self
            .grid
            .position_of(end)
            .ok_or(CellError::DestroyedReference)?;

        let members = self.grid.cells_in_rect(from, to);
        if members.contains(&owner) {
            return Err(CellError::RangeSelfInclusion);
        }
        if members.iter().any(|m| self.is_dependent_on(*m, owner)) {
            return Err(CellError::CircularReference);
        }

        let values: Vec<f64> = members
            .iter()
            .filter_map(|m| self.cells[m.index()].number())
            .collect();
        Ok((function.apply(&values), members))
    }

    /// Store a new value. Returns true if it differs from the old one.
    pub(crate) fn set_value(&mut self, id: CellId, value: Option<Value>) -> bool {
        let cell = &mut self.cells[id.index()];
        if same_value(cell.value.as_ref(), value.as_ref()) {
            return false;
        }
        cell.value = value;
        true
    }

    /// Re-run an existing formula without re-parsing it.
    fn recalculate(&mut self, id: CellId) -> bool {
        let cell = &self.cells[id.index()];
        if cell.destroyed || cell.kind != CellKind::Formula {
            return false;
        }
        let Some(template) = cell.template.as_ref() else {
            return false;
        };

        let (value, error, referenced) = match self.evaluate(id, template) {
            Outcome::Evaluated {
                value,
                error,
                referenced,
            } => (value, error, referenced),
            Outcome::Rejected(error) => {
                // Keep only the edges that are still valid.
                let referenced = template
                    .references()
                    .filter(|r| self.check_reference(*r, id).is_ok())
                    .collect();
                (Some(Value::Text(self.render(template))), Some(error), referenced)
            }
        };

        self.replace_edges(id, referenced);
        self.cells[id.index()].error = error;
        self.set_value(id, value)
    }

    /// Recompute `seeds` and, whenever a value changes, everything that
    /// depends on it. Each path through the graph recomputes its cells once.
    pub(crate) fn cascade(&mut self, seeds: Vec<CellId>) {
        let mut worklist: Vec<CellId> = seeds.into_iter().rev().collect();
        while let Some(id) = worklist.pop() {
            if !self.recalculate(id) {
                log::trace!("{} unchanged", self.label(id));
                continue;
            }
            let cell = &self.cells[id.index()];
            log::debug!(
                "{} = {:?}, notifying {} dependents",
                self.label(id),
                cell.value,
                cell.dependent.len()
            );
            worklist.extend(cell.dependent.iter().rev().copied());
        }
    }

    /// Propagate a changed value of `id` to its dependents.
    pub(crate) fn notify_dependents(&mut self, id: CellId) {
        let dependents = self.cells[id.index()].dependent.clone();
        self.cascade(dependents);
    }

    /// Force a recompute of `id`, e.g. after a structural edit changed which
    /// cells its ranges cover.
    pub fn nudge(&mut self, id: CellId) -> Result<()> {
        self.live(id)?;
        self.cascade(vec![id]);
        Ok(())
    }
}

/// Value equality where two NaNs are the same result.
fn same_value(old: Option<&Value>, new: Option<&Value>) -> bool {
    match (old, new) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a.to_bits() == b.to_bits(),
        _ => old == new,
    }
}
