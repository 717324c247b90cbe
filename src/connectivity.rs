//! Enumeration of the (row, column) equation pairs that elements and boundary conditions
//! may write to.
use crate::model::{equation_index, EquationNumber, FiniteElementDomain, LocationArrays};
use crate::DssError;

/// Candidate row indices of every column of a square system.
///
/// Rows are kept sorted and unique per column, so inserting the same pair repeatedly
/// has no effect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnCandidates {
    columns: Vec<Vec<usize>>,
}

impl ColumnCandidates {
    pub fn new(num_equations: usize) -> Self {
        Self {
            columns: vec![Vec::new(); num_equations],
        }
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Sorted, unique rows of the given column.
    pub fn column(&self, col: usize) -> &[usize] {
        &self.columns[col]
    }

    pub fn columns(&self) -> impl '_ + ExactSizeIterator<Item = &[usize]> {
        self.columns.iter().map(Vec::as_slice)
    }

    /// Total number of candidate entries.
    pub fn nnz(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    /// Inserts the 0-based pair `(row, col)` unless already present.
    ///
    /// # Panics
    ///
    /// Panics if `col` is out of bounds.
    pub fn insert(&mut self, row: usize, col: usize) {
        let rows = &mut self.columns[col];
        if let Err(position) = rows.binary_search(&row) {
            rows.insert(position, row);
        }
    }

    /// Inserts every pair of positive equation numbers from the given row and column location
    /// arrays. Non-positive equation numbers are skipped.
    pub fn insert_locations(&mut self, rows: &[EquationNumber], cols: &[EquationNumber]) -> Result<(), DssError> {
        let num_equations = self.num_columns();
        let check_bounds = |index: usize| {
            if index < num_equations {
                Ok(index)
            } else {
                Err(DssError::EquationOutOfBounds {
                    equation: index + 1,
                    num_equations,
                })
            }
        };

        for &row in rows {
            if let Some(row) = equation_index(row) {
                let row = check_bounds(row)?;
                for &col in cols {
                    if let Some(col) = equation_index(col) {
                        let col = check_bounds(col)?;
                        self.insert(row, col);
                    }
                }
            }
        }
        Ok(())
    }
}

/// Collects the candidate entries of every element and every active boundary condition
/// of the domain.
pub fn enumerate_connectivity(domain: &dyn FiniteElementDomain) -> Result<ColumnCandidates, DssError> {
    let mut candidates = ColumnCandidates::new(domain.num_equations());

    let mut locations = Vec::new();
    for element_index in 0..domain.num_elements() {
        domain.populate_element_locations(element_index, &mut locations);
        candidates.insert_locations(&locations, &locations)?;
    }

    let mut location_pairs: Vec<LocationArrays> = Vec::new();
    for bc_index in 0..domain.num_boundary_conditions() {
        if !domain.is_active_boundary_condition(bc_index) {
            continue;
        }
        domain.populate_boundary_condition_locations(bc_index, &mut location_pairs);
        for pair in &location_pairs {
            candidates.insert_locations(&pair.rows, &pair.columns)?;
        }
    }

    Ok(candidates)
}
