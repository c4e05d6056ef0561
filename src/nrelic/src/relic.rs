//! Recovered relic data
//!
//! Field names match the JSON shape consumed by the relic calculator front
//! end, so these types serialize directly.

use serde::{Deserialize, Serialize};

/// One decoded 72-byte relic slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelicSlot {
    /// Absolute offset of the record in the memory image
    pub offset: usize,
    /// Record length, always 72 for relics
    pub size: usize,
    pub item_id: u32,
    pub effect1_id: u32,
    pub effect2_id: u32,
    pub effect3_id: u32,
    pub sec_effect1_id: u32,
    pub sec_effect2_id: u32,
    pub sec_effect3_id: u32,
    /// Inventory sort index
    pub sorting: u16,
}

impl RelicSlot {
    /// Primary effect IDs in slot order
    pub fn effects(&self) -> [u32; 3] {
        [self.effect1_id, self.effect2_id, self.effect3_id]
    }

    /// Secondary (curse) effect IDs in slot order
    pub fn secondary_effects(&self) -> [u32; 3] {
        [self.sec_effect1_id, self.sec_effect2_id, self.sec_effect3_id]
    }
}

/// All relics recovered for one character section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRelicSet {
    pub section_number: u8,
    pub character_name: String,
    pub relics: Vec<RelicSlot>,
}
