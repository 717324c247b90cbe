use crate::model::{BoundaryCondition, Dof, DomainModel, EquationNumber, LocationArrays};
use ::proptest::collection::vec;
use ::proptest::prelude::*;
use nalgebra::DMatrix;

/// Location arrays of up to `max_len` entries referencing equations `1 ..= num_equations`,
/// interspersed with non-positive (skipped) equation numbers.
pub fn location_array(num_equations: usize, max_len: usize) -> impl Strategy<Value = Vec<EquationNumber>> {
    vec(-1..=num_equations as EquationNumber, 0..=max_len)
}

pub fn dense_matrix(nrows: usize, ncols: usize) -> impl Strategy<Value = DMatrix<f64>> {
    // Small values keep sums of many contributions exactly comparable with tolerances
    vec(-10.0..10.0, nrows * ncols).prop_map(move |values| DMatrix::from_vec(nrows, ncols, values))
}

pub fn symmetric_matrix(n: usize) -> impl Strategy<Value = DMatrix<f64>> {
    dense_matrix(n, n).prop_map(|a| &a + a.transpose())
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DomainModelParams {
    pub max_entities: usize,
    pub max_dofs_per_entity: usize,
    pub max_elements: usize,
    pub max_entities_per_element: usize,
    pub max_boundary_conditions: usize,
}

impl Default for DomainModelParams {
    fn default() -> Self {
        Self {
            max_entities: 8,
            max_dofs_per_entity: 3,
            max_elements: 6,
            max_entities_per_element: 3,
            max_boundary_conditions: 2,
        }
    }
}

#[derive(Debug, Copy, Clone)]
enum DofKind {
    Free,
    Constrained,
    Dependent,
}

fn dof_kind() -> impl Strategy<Value = DofKind> {
    prop_oneof![
        4 => Just(DofKind::Free),
        1 => Just(DofKind::Constrained),
        1 => Just(DofKind::Dependent),
    ]
}

/// Numbers free dofs consecutively, entity by entity.
fn number_dofs(entity_kinds: &[Vec<DofKind>]) -> (Vec<Vec<Dof>>, usize) {
    let mut num_equations = 0;
    let entity_dofs = entity_kinds
        .iter()
        .map(|kinds| {
            kinds
                .iter()
                .map(|kind| match kind {
                    DofKind::Free => {
                        num_equations += 1;
                        Dof::Primary(num_equations as EquationNumber)
                    }
                    DofKind::Constrained => Dof::Primary(0),
                    DofKind::Dependent => Dof::Dependent,
                })
                .collect()
        })
        .collect();
    (entity_dofs, num_equations)
}

fn boundary_condition(num_equations: usize) -> impl Strategy<Value = BoundaryCondition> {
    let pair = (location_array(num_equations, 3), location_array(num_equations, 3))
        .prop_map(|(rows, columns)| LocationArrays::new(rows, columns));
    (any::<bool>(), vec(pair, 0..=2)).prop_map(|(active, locations)| BoundaryCondition {
        active,
        locations,
        internal: Vec::new(),
    })
}

impl Arbitrary for DomainModel {
    type Parameters = DomainModelParams;
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(params: Self::Parameters) -> Self::Strategy {
        let entity_kinds = vec(
            vec(dof_kind(), 1..=params.max_dofs_per_entity.max(1)),
            1..=params.max_entities.max(1),
        );
        entity_kinds
            .prop_flat_map(move |entity_kinds| {
                let num_entities = entity_kinds.len();
                let (entity_dofs, num_equations) = number_dofs(&entity_kinds);
                let elements = vec(
                    vec(0..num_entities, 1..=params.max_entities_per_element.max(1)),
                    0..=params.max_elements,
                );
                let bcs = vec(boundary_condition(num_equations), 0..=params.max_boundary_conditions);
                (Just(entity_dofs), elements, bcs)
            })
            .prop_map(|(entity_dofs, elements, bcs)| {
                let mut domain = DomainModel::new();
                for dofs in entity_dofs {
                    domain.add_entity(dofs);
                }
                for entities in elements {
                    domain.add_element(entities);
                }
                for bc in bcs {
                    domain.add_boundary_condition(bc);
                }
                domain
            })
            .boxed()
    }
}
