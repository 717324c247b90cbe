use fenris_dss::assembly::{
    BoundaryConditionMatrixAssembler, DssAssembler, ElementMatrixAssembler, NoBoundaryConditionContributions,
};
use fenris_dss::engine::FactorizationKind::{SymmetricLdl, UnsymmetricLu};
use fenris_dss::model::{BoundaryCondition, Dof, DomainModel, LocationArrays};
use fenris_dss::nalgebra::{DMatrix, DMatrixViewMut, DVector};
use fenris_dss::DssError;
use matrixcompare::assert_matrix_eq;

use super::{bar_stiffness, built_matrix, clamped_bar, stored_values};

struct BarElementAssembler {
    stiffness: f64,
}

impl ElementMatrixAssembler<f64> for BarElementAssembler {
    fn assemble_element_matrix_into(&self, _: usize, mut output: DMatrixViewMut<f64>) -> eyre::Result<()> {
        output.copy_from(&(bar_stiffness() * self.stiffness));
        Ok(())
    }
}

/// Couples equations 1 and 2 to a Lagrange multiplier with equation 3.
struct MultiplierAssembler;

impl BoundaryConditionMatrixAssembler<f64> for MultiplierAssembler {
    fn assemble_boundary_condition_matrix_into(
        &self,
        bc_index: usize,
        pair_index: usize,
        mut output: DMatrixViewMut<f64>,
    ) -> eyre::Result<()> {
        eyre::ensure!(bc_index == 0, "unexpected boundary condition {}", bc_index);
        let value = (pair_index + 1) as f64;
        output.fill(value);
        Ok(())
    }
}

fn multiplier_domain(active: bool) -> DomainModel {
    let mut domain = DomainModel::new();
    let a = domain.add_entity(vec![Dof::Primary(1)]);
    let b = domain.add_entity(vec![Dof::Primary(2)]);
    domain.add_element(vec![a, b]);
    domain.add_boundary_condition(BoundaryCondition {
        active,
        locations: vec![
            LocationArrays::new(vec![1, 2], vec![3]),
            LocationArrays::new(vec![3], vec![1, 2]),
        ],
        internal: vec![vec![Dof::Primary(3)]],
    });
    domain
}

#[test]
fn assemble_elements_matches_manual_assembly() {
    let domain = clamped_bar(4);
    let assembler = DssAssembler::default();

    let mut matrix = built_matrix(UnsymmetricLu, &domain);
    assembler
        .assemble_elements_into(&mut matrix, &domain, &BarElementAssembler { stiffness: 2.0 })
        .unwrap();

    #[rustfmt::skip]
    let expected = DMatrix::from_row_slice(3, 3, &[
        4.0, -2.0, 0.0,
        -2.0, 4.0, -2.0,
        0.0, -2.0, 2.0,
    ]);
    assert_matrix_eq!(stored_values(&matrix), expected, comp = abs, tol = 1e-14);
}

#[test]
fn closures_are_element_assemblers() {
    let domain = clamped_bar(3);
    let assembler = DssAssembler::default();
    let element_assembler = |element: usize, mut output: DMatrixViewMut<f64>| -> eyre::Result<()> {
        output.fill_diagonal((element + 1) as f64);
        Ok(())
    };

    let mut matrix = built_matrix(SymmetricLdl, &domain);
    assembler
        .assemble_into(&mut matrix, &domain, &element_assembler, &NoBoundaryConditionContributions)
        .unwrap();
    assert_eq!(stored_values(&matrix), DMatrix::from_diagonal(&DVector::from_column_slice(&[3.0, 2.0])));
}

#[test]
fn assemble_into_includes_active_boundary_conditions() {
    let domain = multiplier_domain(true);
    let assembler = DssAssembler::default();
    let mut matrix = built_matrix(UnsymmetricLu, &domain);
    // Stale values are discarded by assemble_into
    *matrix.get_mut(0, 0).unwrap() = 100.0;

    assembler
        .assemble_into(&mut matrix, &domain, &BarElementAssembler { stiffness: 1.0 }, &MultiplierAssembler)
        .unwrap();

    #[rustfmt::skip]
    let expected = DMatrix::from_row_slice(3, 3, &[
        1.0, -1.0, 1.0,
        -1.0, 1.0, 1.0,
        2.0, 2.0, 0.0,
    ]);
    assert_eq!(stored_values(&matrix), expected);
}

#[test]
fn inactive_boundary_conditions_are_not_assembled() {
    let domain = multiplier_domain(false);
    let assembler = DssAssembler::default();
    let mut matrix = built_matrix(UnsymmetricLu, &domain);
    assembler
        .assemble_into(&mut matrix, &domain, &BarElementAssembler { stiffness: 1.0 }, &MultiplierAssembler)
        .unwrap();

    assert_eq!(matrix.nrows(), 3);
    assert_eq!(matrix.get(2, 0), 0.0);
    assert_eq!(matrix.get(0, 2), 0.0);
    assert_eq!(matrix.get(0, 1), -1.0);
}

#[test]
fn local_assembler_errors_are_propagated() {
    let domain = clamped_bar(3);
    let assembler = DssAssembler::default();
    let failing = |element: usize, _: DMatrixViewMut<f64>| -> eyre::Result<()> {
        Err(eyre::eyre!("element {} is inverted", element))
    };

    let mut matrix = built_matrix(UnsymmetricLu, &domain);
    let result = assembler.assemble_elements_into(&mut matrix, &domain, &failing);
    match result {
        Err(DssError::Assembly(report)) => assert_eq!(report.to_string(), "element 0 is inverted"),
        other => panic!("unexpected result: {:?}", other),
    }
}
