use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumIter};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum AgentType {
    Code,
    Creative,
    Research,
    Logic,
    Vision,
    Speech,
    Safety,
    Chaos,
    /// Carried only by built-in moves such as Struggle. Neutral against everything.
    Typeless,
}

/// Multipliers a type chart is allowed to contain.
pub const ALLOWED_MULTIPLIERS: [f64; 4] = [0.0, 0.5, 1.0, 2.0];

/// Attacking type -> defending type -> multiplier.
///
/// Pairs missing from the table are neutral (1.0). The chart is data, so a
/// matchup can be made immune by writing an explicit `0.0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeChart {
    entries: BTreeMap<AgentType, BTreeMap<AgentType, f64>>,
}

impl TypeChart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one matchup. Used by tests and tooling; data files go through serde.
    pub fn with_entry(mut self, attacking: AgentType, defending: AgentType, multiplier: f64) -> Self {
        self.entries
            .entry(attacking)
            .or_default()
            .insert(defending, multiplier);
        self
    }

    /// Single-pair lookup: 2.0 super effective, 0.5 resisted, 0.0 immune, 1.0 otherwise.
    pub fn matchup(&self, attacking: AgentType, defending: AgentType) -> f64 {
        self.entries
            .get(&attacking)
            .and_then(|row| row.get(&defending))
            .copied()
            .unwrap_or(1.0)
    }

    /// Combined multiplier against every type the defender carries.
    pub fn effectiveness(&self, attacking: AgentType, defending: &[AgentType]) -> f64 {
        defending
            .iter()
            .map(|&defender| self.matchup(attacking, defender))
            .product()
    }

    /// Returns the first entry whose multiplier is outside [`ALLOWED_MULTIPLIERS`].
    pub fn find_invalid_entry(&self) -> Option<(AgentType, AgentType, f64)> {
        self.entries.iter().find_map(|(&attacking, row)| {
            row.iter()
                .find(|(_, multiplier)| !ALLOWED_MULTIPLIERS.contains(multiplier))
                .map(|(&defending, &multiplier)| (attacking, defending, multiplier))
        })
    }
}
