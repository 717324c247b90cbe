use fenris_dss::assembly::{BoundaryConditionMatrixAssembler, DssAssembler};
use fenris_dss::engine::{EngineError, FactorizationKind};
use fenris_dss::model::{BoundaryCondition, Dof, DomainModel, EquationNumber, FiniteElementDomain, LocationArrays};
use fenris_dss::nalgebra::{DMatrixViewMut, DVector};
use fenris_dss::{DssError, DssMatrix};
use matrixcompare::assert_matrix_eq;

use super::BarElements;

/// Unit coefficients coupling a displacement to its Lagrange multiplier.
struct UnitMultiplier;

impl BoundaryConditionMatrixAssembler<f64> for UnitMultiplier {
    fn assemble_boundary_condition_matrix_into(&self, _: usize, _: usize, mut output: DMatrixViewMut<f64>) -> eyre::Result<()> {
        output.fill(1.0);
        Ok(())
    }
}

/// A free-floating bar of `num_nodes` nodes, held at the first node by a Lagrange multiplier
/// owned by an active boundary condition.
fn bar_with_multiplier(num_nodes: usize) -> DomainModel {
    let mut domain = DomainModel::new();
    for node in 0..num_nodes {
        domain.add_entity(vec![Dof::Primary(node as EquationNumber + 1)]);
    }
    for node in 1..num_nodes {
        domain.add_element(vec![node - 1, node]);
    }
    let multiplier = num_nodes as EquationNumber + 1;
    domain.add_boundary_condition(
        BoundaryCondition::active(vec![
            LocationArrays::new(vec![multiplier], vec![1]),
            LocationArrays::new(vec![1], vec![multiplier]),
        ])
        .with_internal_entities(vec![vec![Dof::Primary(multiplier)]]),
    );
    domain
}

fn assemble_and_factorize(kind: FactorizationKind, domain: &DomainModel) -> Result<DssMatrix<f64>, DssError> {
    let mut matrix = DssMatrix::new(kind)?;
    matrix.build_internal_structure(domain)?;
    DssAssembler::default().assemble_into(
        &mut matrix,
        domain,
        &BarElements { element_length: 1.0 },
        &UnitMultiplier,
    )?;
    matrix.factorized()?;
    Ok(matrix)
}

#[test]
fn multiplier_constrained_bar_under_tip_load() {
    let num_nodes = 5;
    let domain = bar_with_multiplier(num_nodes);
    let n = domain.num_equations();
    assert_eq!(n, num_nodes + 1);

    let mut load = DVector::zeros(n);
    load[num_nodes - 1] = 1.0;

    // Displacements grow linearly from the held node, and the multiplier balances the load
    let mut expected = DVector::from_iterator(n, (0..n).map(|i| i as f64));
    expected[num_nodes] = 1.0;

    for kind in [FactorizationKind::SymmetricLdl, FactorizationKind::UnsymmetricLu] {
        let matrix = assemble_and_factorize(kind, &domain).unwrap();
        assert!(matrix.block_map().is_some());
        let x = matrix.solve_vector(&load).unwrap();
        assert_matrix_eq!(x, expected, comp = abs, tol = 1e-12);
    }
}

#[test]
fn symmetric_storage_keeps_only_the_lower_multiplier_coupling() {
    let num_nodes = 3;
    let domain = bar_with_multiplier(num_nodes);
    let mut matrix = DssMatrix::new(FactorizationKind::SymmetricLdl).unwrap();
    matrix.build_internal_structure(&domain).unwrap();
    DssAssembler::default()
        .assemble_into(
            &mut matrix,
            &domain,
            &BarElements { element_length: 1.0 },
            &UnitMultiplier,
        )
        .unwrap();

    assert_eq!(matrix.get(num_nodes, 0), 1.0);
    assert_eq!(matrix.get(0, num_nodes), 0.0);

    // The represented matrix is symmetric nonetheless
    let mut unit = DVector::zeros(num_nodes + 1);
    unit[0] = 1.0;
    let column = matrix.times(&unit).unwrap();
    assert_eq!(column[num_nodes], 1.0);
    let mut unit = DVector::zeros(num_nodes + 1);
    unit[num_nodes] = 1.0;
    let column = matrix.times(&unit).unwrap();
    assert_eq!(column[0], 1.0);
}

#[test]
fn cholesky_rejects_saddle_point_system() {
    let domain = bar_with_multiplier(4);
    let result = assemble_and_factorize(FactorizationKind::SymmetricLl, &domain);
    assert!(matches!(
        result,
        Err(DssError::Engine(EngineError::FactorizationFailed(FactorizationKind::SymmetricLl)))
    ));
}
