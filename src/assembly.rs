//! Assembly of a [`DssMatrix`] from caller-provided local contributions.
//!
//! The domain supplies the location arrays of every element and active boundary condition,
//! while local assemblers compute the corresponding dense local matrices.
use crate::model::{EquationNumber, FiniteElementDomain, LocationArrays};
use crate::{DssError, DssMatrix};
use fenris_dss_engine::{Real, SolverEngine};
use nalgebra::{DMatrix, DMatrixViewMut, Scalar};
use std::cell::RefCell;

/// Computes local element matrices.
///
/// The output has as many rows and columns as the element's location array and is zeroed
/// before it is handed to the assembler.
pub trait ElementMatrixAssembler<T: Scalar> {
    fn assemble_element_matrix_into(&self, element_index: usize, output: DMatrixViewMut<T>) -> eyre::Result<()>;
}

/// Computes local matrices of boundary conditions.
///
/// A boundary condition contributes one local matrix per location array pair. The output has
/// as many rows as the pair's row locations and as many columns as its column locations.
pub trait BoundaryConditionMatrixAssembler<T: Scalar> {
    fn assemble_boundary_condition_matrix_into(
        &self,
        bc_index: usize,
        pair_index: usize,
        output: DMatrixViewMut<T>,
    ) -> eyre::Result<()>;
}

impl<T, F> ElementMatrixAssembler<T> for F
where
    T: Scalar,
    F: Fn(usize, DMatrixViewMut<T>) -> eyre::Result<()>,
{
    fn assemble_element_matrix_into(&self, element_index: usize, output: DMatrixViewMut<T>) -> eyre::Result<()> {
        self(element_index, output)
    }
}

/// Assembler for boundary conditions that contribute nothing to the matrix.
#[derive(Debug, Copy, Clone, Default)]
pub struct NoBoundaryConditionContributions;

impl<T: Scalar> BoundaryConditionMatrixAssembler<T> for NoBoundaryConditionContributions {
    fn assemble_boundary_condition_matrix_into(&self, _: usize, _: usize, _: DMatrixViewMut<T>) -> eyre::Result<()> {
        Ok(())
    }
}

/// Drives assembly of all elements and active boundary conditions of a domain into a [`DssMatrix`].
#[derive(Debug, Clone)]
pub struct DssAssembler<T: Scalar> {
    // Buffers reused across assemblies
    workspace: RefCell<DssAssemblerWorkspace<T>>,
}

impl<T: Scalar> Default for DssAssembler<T> {
    fn default() -> Self {
        Self {
            workspace: RefCell::new(DssAssemblerWorkspace::default()),
        }
    }
}

#[derive(Debug, Clone)]
struct DssAssemblerWorkspace<T: Scalar> {
    locations: Vec<EquationNumber>,
    location_pairs: Vec<LocationArrays>,
    local_matrix: DMatrix<T>,
}

impl<T: Scalar> Default for DssAssemblerWorkspace<T> {
    fn default() -> Self {
        Self {
            locations: Vec::new(),
            location_pairs: Vec::new(),
            local_matrix: DMatrix::from_row_slice(0, 0, &[]),
        }
    }
}

impl<T: Real> DssAssembler<T> {
    /// Adds the local matrices of all elements of the domain to the matrix.
    pub fn assemble_elements_into<E: SolverEngine<T>>(
        &self,
        matrix: &mut DssMatrix<T, E>,
        domain: &dyn FiniteElementDomain,
        element_assembler: &dyn ElementMatrixAssembler<T>,
    ) -> Result<(), DssError> {
        let ws = &mut *self.workspace.borrow_mut();
        let locations = &mut ws.locations;
        let local_matrix = &mut ws.local_matrix;

        for element_index in 0..domain.num_elements() {
            domain.populate_element_locations(element_index, locations);
            let n = locations.len();
            local_matrix.resize_mut(n, n, T::zero());
            local_matrix.fill(T::zero());

            element_assembler
                .assemble_element_matrix_into(element_index, DMatrixViewMut::from(&mut *local_matrix))
                .map_err(DssError::Assembly)?;
            matrix.assemble(locations, &*local_matrix)?;
        }
        Ok(())
    }

    /// Adds the local matrices of all active boundary conditions of the domain to the matrix.
    pub fn assemble_boundary_conditions_into<E: SolverEngine<T>>(
        &self,
        matrix: &mut DssMatrix<T, E>,
        domain: &dyn FiniteElementDomain,
        bc_assembler: &dyn BoundaryConditionMatrixAssembler<T>,
    ) -> Result<(), DssError> {
        let ws = &mut *self.workspace.borrow_mut();
        let location_pairs = &mut ws.location_pairs;
        let local_matrix = &mut ws.local_matrix;

        for bc_index in 0..domain.num_boundary_conditions() {
            if !domain.is_active_boundary_condition(bc_index) {
                continue;
            }
            domain.populate_boundary_condition_locations(bc_index, location_pairs);
            for (pair_index, pair) in location_pairs.iter().enumerate() {
                local_matrix.resize_mut(pair.rows.len(), pair.columns.len(), T::zero());
                local_matrix.fill(T::zero());

                bc_assembler
                    .assemble_boundary_condition_matrix_into(
                        bc_index,
                        pair_index,
                        DMatrixViewMut::from(&mut *local_matrix),
                    )
                    .map_err(DssError::Assembly)?;
                matrix.assemble_rectangular(&pair.rows, &pair.columns, &*local_matrix)?;
            }
        }
        Ok(())
    }

    /// Zeroes the matrix and assembles all elements and active boundary conditions into it.
    pub fn assemble_into<E: SolverEngine<T>>(
        &self,
        matrix: &mut DssMatrix<T, E>,
        domain: &dyn FiniteElementDomain,
        element_assembler: &dyn ElementMatrixAssembler<T>,
        bc_assembler: &dyn BoundaryConditionMatrixAssembler<T>,
    ) -> Result<(), DssError> {
        matrix.zero();
        self.assemble_elements_into(matrix, domain, element_assembler)?;
        self.assemble_boundary_conditions_into(matrix, domain, bc_assembler)
    }
}
