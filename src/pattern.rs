//! Construction of compressed-column sparsity patterns.
//!
//! Patterns are represented by `nalgebra-sparse`'s [`SparsityPattern`] with columns as the
//! major dimension: `major_offsets()` are the column start offsets and `lane(j)` holds the
//! sorted row indices of column `j`.
use crate::connectivity::{enumerate_connectivity, ColumnCandidates};
use crate::model::FiniteElementDomain;
use crate::DssError;
use nalgebra_sparse::pattern::SparsityPattern;

/// Computes column offsets as the prefix sum of per-column sizes and emits all rows contiguously.
pub fn build_pattern(candidates: &ColumnCandidates) -> Result<SparsityPattern, DssError> {
    let num_equations = candidates.num_columns();
    let nnz = candidates.nnz();

    let mut column_offsets = Vec::new();
    column_offsets
        .try_reserve_exact(num_equations + 1)
        .map_err(|source| DssError::AllocationFailed {
            what: "column offsets",
            source,
        })?;
    let mut row_indices = Vec::new();
    row_indices
        .try_reserve_exact(nnz)
        .map_err(|source| DssError::AllocationFailed {
            what: "row indices",
            source,
        })?;

    for rows in candidates.columns() {
        column_offsets.push(row_indices.len());
        row_indices.extend_from_slice(rows);
    }
    column_offsets.push(row_indices.len());

    let pattern =
        SparsityPattern::try_from_offsets_and_indices(num_equations, num_equations, column_offsets, row_indices)
            .expect("Column candidates are sorted and unique, and therefore form a valid pattern");
    Ok(pattern)
}

/// Builds the compressed-column pattern of all entries that elements and active boundary
/// conditions of the domain may write to.
pub fn build_domain_pattern(domain: &dyn FiniteElementDomain) -> Result<SparsityPattern, DssError> {
    let candidates = enumerate_connectivity(domain)?;
    build_pattern(&candidates)
}

/// Sorted row indices stored in the given column of a compressed-column pattern.
pub fn column_rows(pattern: &SparsityPattern, col: usize) -> &[usize] {
    pattern.lane(col)
}

/// Whether the compressed-column pattern contains the 0-based entry `(row, col)`.
pub fn contains_entry(pattern: &SparsityPattern, row: usize, col: usize) -> bool {
    col < pattern.major_dim() && column_rows(pattern, col).binary_search(&row).is_ok()
}
