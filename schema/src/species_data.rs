use crate::{AgentType, MoveId, SpeciesId};
use serde::{Deserialize, Serialize};

/// Catch rate used when a species entry omits one.
pub const DEFAULT_CATCH_RATE: u8 = 100;

fn default_catch_rate() -> u8 {
    DEFAULT_CATCH_RATE
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    /// Context window. Grows into maximum vitality.
    pub vitality: u16,
    pub processing: u16,
    pub creativity: u16,
    pub alignment: u16,
    pub robustness: u16,
    pub speed: u16,
}

impl BaseStats {
    pub fn total(&self) -> u32 {
        [
            self.vitality,
            self.processing,
            self.creativity,
            self.alignment,
            self.robustness,
            self.speed,
        ]
        .iter()
        .map(|&stat| stat as u32)
        .sum()
    }

    /// The largest of the six base stats.
    pub fn max(&self) -> u16 {
        [
            self.vitality,
            self.processing,
            self.creativity,
            self.alignment,
            self.robustness,
            self.speed,
        ]
        .into_iter()
        .max()
        .unwrap_or_default()
    }

    /// Mean of the six base stats, unrounded.
    pub fn average(&self) -> f64 {
        self.total() as f64 / 6.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnsetEntry {
    pub level: u8,
    pub move_id: MoveId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evolution {
    pub into: SpeciesId,
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesData {
    pub name: String,
    pub types: Vec<AgentType>,
    pub base_stats: BaseStats,
    /// Ordered by level; entries sharing a level keep their listed order.
    pub learnset: Vec<LearnsetEntry>,
    #[serde(default)]
    pub evolution: Option<Evolution>,
    #[serde(default = "default_catch_rate")]
    pub catch_rate: u8,
    #[serde(default)]
    pub description: String,
}

impl SpeciesData {
    pub fn has_type(&self, agent_type: AgentType) -> bool {
        self.types.contains(&agent_type)
    }

    /// Moves unlocked at exactly `level`, in learnset order.
    pub fn moves_learned_at(&self, level: u8) -> impl Iterator<Item = &MoveId> {
        self.learnset
            .iter()
            .filter(move |entry| entry.level == level)
            .map(|entry| &entry.move_id)
    }

    /// Every move unlocked at or below `level`, in learnset order.
    pub fn moves_known_by(&self, level: u8) -> impl Iterator<Item = &MoveId> {
        self.learnset
            .iter()
            .filter(move |entry| entry.level <= level)
            .map(|entry| &entry.move_id)
    }
}
