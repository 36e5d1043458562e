// Secondary effects that ride on a landed move.

mod damage_effects;
mod stat_effects;
mod status_effects;

use crate::agent::AgentInst;
use crate::battle::state::{BattleRng, EventBus};
use schema::{EffectTarget, MoveEffect};

use self::{damage_effects::*, stat_effects::*, status_effects::*};

/// Who is involved in the effect and how hard the move just hit.
#[derive(Debug, Clone)]
pub struct EffectContext<'a> {
    pub attacker_name: &'a str,
    pub defender_name: &'a str,
    pub damage_dealt: u16,
}

impl<'a> EffectContext<'a> {
    pub fn new(attacker_name: &'a str, defender_name: &'a str, damage_dealt: u16) -> Self {
        Self {
            attacker_name,
            defender_name,
            damage_dealt,
        }
    }

    pub fn target_name(&self, target: EffectTarget) -> &'a str {
        match target {
            EffectTarget::User => self.attacker_name,
            EffectTarget::Opponent => self.defender_name,
        }
    }
}

/// Rolls `chance` and, on success, applies `effect`. Returns whether the roll succeeded.
///
/// The roll is drawn for every effect kind, including fixed-range damage
/// whose work already happened in the damage step.
pub fn apply_secondary_effect(
    effect: &MoveEffect,
    chance: u8,
    attacker: &mut AgentInst,
    defender: &mut AgentInst,
    context: &EffectContext<'_>,
    rng: &mut BattleRng,
    bus: &mut EventBus,
) -> bool {
    if rng.next_unit("secondary effect chance") * 100.0 >= chance as f64 {
        return false;
    }

    match effect {
        MoveEffect::Confuse | MoveEffect::Poison => {
            apply_status_effect(effect, defender, context, bus);
        }
        MoveEffect::StatChange {
            stat,
            stages,
            target,
        } => {
            let recipient = match target {
                EffectTarget::User => attacker,
                EffectTarget::Opponent => defender,
            };
            apply_stat_change_effect(*stat, *stages, recipient, context.target_name(*target), bus);
        }
        MoveEffect::Recoil { fraction } => {
            apply_recoil_effect(*fraction, attacker, context, bus);
        }
        MoveEffect::RandomDamage { .. } => {}
    }
    true
}
