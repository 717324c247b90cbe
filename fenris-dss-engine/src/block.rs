use crate::EngineError;
use serde::{Deserialize, Serialize};

/// A single slot of a block: either a 0-based equation index or unmapped.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockSlot {
    Equation(usize),
    Unmapped,
}

impl BlockSlot {
    pub fn equation(self) -> Option<usize> {
        match self {
            BlockSlot::Equation(index) => Some(index),
            BlockSlot::Unmapped => None,
        }
    }

    pub fn is_unmapped(self) -> bool {
        self == BlockSlot::Unmapped
    }
}

/// Map from fixed-size blocks of degrees of freedom to global equations.
///
/// Each block corresponds to one entity owning degrees of freedom, and consists of exactly
/// `block_size` slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockMap {
    block_size: usize,
    num_blocks: usize,
    slots: Vec<BlockSlot>,
}

impl BlockMap {
    pub fn try_from_slots(num_blocks: usize, block_size: usize, slots: Vec<BlockSlot>) -> Result<Self, EngineError> {
        let expected = num_blocks
            .checked_mul(block_size)
            .ok_or_else(|| EngineError::InvalidBlockMap("block count overflows".to_string()))?;
        if slots.len() != expected {
            return Err(EngineError::InvalidBlockMap(format!(
                "expected {} slots for {} blocks of size {}, got {}",
                expected,
                num_blocks,
                block_size,
                slots.len()
            )));
        }
        Ok(Self {
            block_size,
            num_blocks,
            slots,
        })
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    pub fn slots(&self) -> &[BlockSlot] {
        &self.slots
    }

    pub fn block(&self, index: usize) -> Option<&[BlockSlot]> {
        if index < self.num_blocks {
            let begin = index * self.block_size;
            Some(&self.slots[begin..begin + self.block_size])
        } else {
            None
        }
    }

    pub fn blocks<'a>(&'a self) -> impl 'a + Iterator<Item = &'a [BlockSlot]> {
        (0..self.num_blocks).map(move |i| self.block(i).unwrap())
    }

    /// Returns the largest equation index referenced by the map, if any.
    pub fn max_equation(&self) -> Option<usize> {
        self.slots.iter().filter_map(|slot| slot.equation()).max()
    }

    /// Flat encoding of the map with `-1` marking unmapped slots,
    /// for engines that consume the raw array.
    pub fn to_flat_array(&self) -> Vec<i64> {
        self.slots
            .iter()
            .map(|slot| match slot {
                BlockSlot::Equation(index) => *index as i64,
                BlockSlot::Unmapped => -1,
            })
            .collect()
    }
}
