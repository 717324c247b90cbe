//! Construction of the map from entity blocks to global equations.
use crate::model::{dof_entities, equation_index, Dof, DofEntity, FiniteElementDomain};
use crate::DssError;
use log::info;

pub use fenris_dss_engine::{BlockMap, BlockSlot};

/// The block size of the domain: the largest number of degrees of freedom of any ordinary entity.
pub fn block_size(domain: &dyn FiniteElementDomain) -> usize {
    let mut dofs = Vec::new();
    (0..domain.num_dof_entities())
        .map(|entity| {
            domain.populate_entity_dofs(DofEntity::Ordinary(entity), &mut dofs);
            dofs.len()
        })
        .max()
        .unwrap_or(0)
}

fn block_slot(dof: &Dof) -> BlockSlot {
    match dof {
        Dof::Primary(number) => equation_index(*number)
            .map(BlockSlot::Equation)
            .unwrap_or(BlockSlot::Unmapped),
        Dof::Dependent => BlockSlot::Unmapped,
    }
}

/// Builds the block map of the domain with blocks of size [`block_size`].
///
/// Returns `Ok(None)` if some entity has more degrees of freedom than the block size,
/// in which case the structure must be used without block mapping.
pub fn build_block_map(domain: &dyn FiniteElementDomain) -> Result<Option<BlockMap>, DssError> {
    let block_size = block_size(domain);
    let num_blocks = dof_entities(domain).count();

    let mut slots = Vec::new();
    slots
        .try_reserve_exact(num_blocks * block_size)
        .map_err(|source| DssError::AllocationFailed {
            what: "block map",
            source,
        })?;

    let mut dofs = Vec::new();
    for entity in dof_entities(domain) {
        domain.populate_entity_dofs(entity, &mut dofs);
        if dofs.len() > block_size {
            info!(
                "Entity {:?} has {} dofs, exceeding the block size {}. Using pattern-only storage.",
                entity,
                dofs.len(),
                block_size
            );
            return Ok(None);
        }

        slots.extend(dofs.iter().map(block_slot));
        slots.extend((dofs.len()..block_size).map(|_| BlockSlot::Unmapped));
    }

    Ok(Some(BlockMap::try_from_slots(num_blocks, block_size, slots)?))
}
