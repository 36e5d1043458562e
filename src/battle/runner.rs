//! Read-only render data for hosts that draw an encounter.

use crate::agent::{AgentInst, StatusCondition};
use crate::battle::engine::{AnimationTimers, Cursors};
use crate::battle::state::{EncounterOutcome, Phase};
use schema::{MoveId, SpeciesId, StatKind};
use serde::{Deserialize, Serialize};

/// Everything a presentation layer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterView {
    pub phase: Phase,
    /// What the narration on screen belongs to.
    pub stage: Phase,
    pub player: CombatantView,
    pub enemy: CombatantView,
    pub cursors: Cursors,
    pub message: Option<String>,
    /// Lines queued behind `message`.
    pub messages_remaining: usize,
    pub timers: AnimationTimers,
    pub trainer: Option<String>,
    pub reserves_remaining: usize,
    /// The move waiting on a learn-move decision.
    pub learning: Option<MoveId>,
    pub capture_beats: Option<u8>,
    pub outcome: Option<EncounterOutcome>,
}

/// Public state of one combatant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantView {
    pub species: SpeciesId,
    pub nickname: String,
    pub level: u8,
    pub vitality: u16,
    pub max_vitality: u16,
    pub xp: u32,
    pub xp_to_next: u32,
    pub status: Option<StatusCondition>,
    /// Stages in `StatKind::ALL` order.
    pub stat_stages: Vec<(StatKind, i8)>,
    pub moves: Vec<MoveView>,
    pub is_wild: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveView {
    pub move_id: MoveId,
    pub pp: u8,
    pub max_pp: u8,
}

impl CombatantView {
    pub fn from_agent(agent: &AgentInst) -> Self {
        Self {
            species: agent.species.clone(),
            nickname: agent.nickname.clone(),
            level: agent.level(),
            vitality: agent.vitality(),
            max_vitality: agent.max_vitality(),
            xp: agent.xp,
            xp_to_next: agent.xp_to_next,
            status: agent.status,
            stat_stages: StatKind::ALL
                .iter()
                .map(|stat| (*stat, agent.stat_stage(*stat)))
                .collect(),
            moves: agent
                .moves()
                .iter()
                .map(|instance| MoveView {
                    move_id: instance.move_id.clone(),
                    pp: instance.pp(),
                    max_pp: instance.max_pp(),
                })
                .collect(),
            is_wild: agent.is_wild,
        }
    }

    pub fn vitality_fraction(&self) -> f64 {
        if self.max_vitality == 0 {
            return 0.0;
        }
        self.vitality as f64 / self.max_vitality as f64
    }
}
