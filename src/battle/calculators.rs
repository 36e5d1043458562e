use crate::agent::AgentInst;
use crate::battle::state::BattleRng;
use crate::battle::stats::effective_stat;
use crate::content::ContentCatalog;
use crate::errors::ContentResult;
use schema::{MoveCategory, MoveData, MoveEffect, StatKind};
use tracing::debug;

/// Same-type attack bonus.
pub const STAB_MULTIPLIER: f64 = 1.5;
/// Lower bound of the damage roll; the upper bound is 1.0.
pub const MIN_DAMAGE_ROLL: f64 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageOutcome {
    pub damage: u16,
    pub effectiveness: f64,
}

impl DamageOutcome {
    pub fn none() -> Self {
        Self {
            damage: 0,
            effectiveness: 1.0,
        }
    }
}

/// Which stats a move category reads as (attack, defense).
pub fn attack_and_defense_stats(category: MoveCategory) -> Option<(StatKind, StatKind)> {
    match category {
        MoveCategory::Physical => Some((StatKind::Processing, StatKind::Alignment)),
        MoveCategory::Special => Some((StatKind::Creativity, StatKind::Robustness)),
        MoveCategory::Status => None,
    }
}

/// The stat formula before the random roll:
/// ((2·level/5 + 2) · power · atk/def)/50 + 2
pub fn base_damage(level: u8, power: u16, attack: f64, defense: f64) -> f64 {
    let defense = defense.max(1.0);
    ((2.0 * level as f64 / 5.0 + 2.0) * power as f64 * attack / defense) / 50.0 + 2.0
}

/// Calculates the damage `move_data` deals from `attacker` to `defender`.
///
/// Status moves deal nothing and draw nothing. A fixed-range move skips the
/// stat formula. Everything else is floored and kept at one or more unless
/// the defender is immune.
pub fn calculate_damage(
    attacker: &AgentInst,
    defender: &AgentInst,
    move_data: &MoveData,
    catalog: &ContentCatalog,
    rng: &mut BattleRng,
) -> ContentResult<DamageOutcome> {
    let Some((attack_stat, defense_stat)) = attack_and_defense_stats(move_data.category) else {
        return Ok(DamageOutcome::none());
    };

    let defender_types = &catalog.species(&defender.species)?.types;
    let effectiveness = catalog.effectiveness(move_data.move_type, defender_types);

    if let Some(MoveEffect::RandomDamage { min, max }) = move_data.effect {
        let roll = rng.next_unit("fixed damage range");
        let damage = (roll * (max - min) as f64).floor() as u16 + min;
        let damage = if effectiveness == 0.0 { 0 } else { damage };
        return Ok(DamageOutcome {
            damage,
            effectiveness,
        });
    }

    let attack = effective_stat(attacker, attack_stat);
    let defense = effective_stat(defender, defense_stat);
    let base = base_damage(attacker.level(), move_data.power, attack, defense);

    let attacker_types = &catalog.species(&attacker.species)?.types;
    let stab = if attacker_types.contains(&move_data.move_type) {
        STAB_MULTIPLIER
    } else {
        1.0
    };

    let roll = MIN_DAMAGE_ROLL + rng.next_unit("damage roll") * (1.0 - MIN_DAMAGE_ROLL);
    let raw = (base * effectiveness * stab * roll).floor();
    let damage = if effectiveness == 0.0 {
        0
    } else {
        raw.clamp(1.0, u16::MAX as f64) as u16
    };

    debug!(
        attacker = %attacker.nickname,
        defender = %defender.nickname,
        base,
        effectiveness,
        stab,
        roll,
        damage,
        "damage calculated"
    );

    Ok(DamageOutcome {
        damage,
        effectiveness,
    })
}
