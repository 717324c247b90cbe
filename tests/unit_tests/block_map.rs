use fenris_dss::block_map::{block_size, build_block_map, BlockSlot};
use fenris_dss::model::{create_chain_domain, BoundaryCondition, Dof, DomainModel};

use BlockSlot::{Equation, Unmapped};

#[test]
fn block_size_is_largest_dof_count_of_ordinary_entities() {
    let mut domain = DomainModel::new();
    domain.add_entity(vec![Dof::Primary(1)]);
    domain.add_entity(vec![Dof::Primary(2), Dof::Primary(3), Dof::Primary(4)]);
    domain.add_entity(vec![Dof::Primary(5), Dof::Primary(6)]);
    assert_eq!(block_size(&domain), 3);
    assert_eq!(block_size(&DomainModel::new()), 0);
}

#[test]
fn block_map_of_chain_domain() {
    let domain = create_chain_domain(3, 2, &[1]);
    let block_map = build_block_map(&domain).unwrap().unwrap();
    assert_eq!(block_map.block_size(), 2);
    assert_eq!(block_map.num_blocks(), 3);
    assert_eq!(block_map.block(0).unwrap(), &[Equation(0), Equation(1)]);
    assert_eq!(block_map.block(1).unwrap(), &[Unmapped, Unmapped]);
    assert_eq!(block_map.block(2).unwrap(), &[Equation(2), Equation(3)]);
    assert_eq!(block_map.to_flat_array(), vec![0, 1, -1, -1, 2, 3]);
}

#[test]
fn block_map_pads_short_entities_and_unmaps_dependent_dofs() {
    let mut domain = DomainModel::new();
    domain.add_entity(vec![Dof::Primary(1), Dof::Dependent, Dof::Primary(2)]);
    domain.add_entity(vec![Dof::Primary(3)]);
    let block_map = build_block_map(&domain).unwrap().unwrap();
    assert_eq!(block_map.block(0).unwrap(), &[Equation(0), Unmapped, Equation(1)]);
    assert_eq!(block_map.block(1).unwrap(), &[Equation(2), Unmapped, Unmapped]);
}

#[test]
fn block_map_orders_internal_entities_after_ordinary_entities() {
    let mut domain = DomainModel::new();
    let a = domain.add_entity(vec![Dof::Primary(1), Dof::Primary(2)]);
    let b = domain.add_entity(vec![Dof::Primary(3), Dof::Primary(4)]);
    domain.add_element_with_internal_entities(vec![a, b], vec![vec![Dof::Primary(6)]]);
    domain.add_boundary_condition(
        BoundaryCondition::active(Vec::new()).with_internal_entities(vec![vec![Dof::Primary(5)]]),
    );
    domain.add_boundary_condition(BoundaryCondition {
        active: false,
        locations: Vec::new(),
        internal: vec![vec![Dof::Primary(7)]],
    });

    let block_map = build_block_map(&domain).unwrap().unwrap();
    assert_eq!(block_map.num_blocks(), 4);
    let blocks: Vec<_> = block_map.blocks().collect();
    assert_eq!(blocks[0], &[Equation(0), Equation(1)]);
    assert_eq!(blocks[1], &[Equation(2), Equation(3)]);
    assert_eq!(blocks[2], &[Equation(4), Unmapped]);
    assert_eq!(blocks[3], &[Equation(5), Unmapped]);
}

#[test]
fn block_map_falls_back_when_internal_entity_exceeds_block_size() {
    let mut domain = DomainModel::new();
    let a = domain.add_entity(vec![Dof::Primary(1)]);
    domain.add_element_with_internal_entities(vec![a], vec![vec![Dof::Primary(2), Dof::Primary(3)]]);
    assert_eq!(build_block_map(&domain).unwrap(), None);
}
