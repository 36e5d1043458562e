use crate::agent::{AgentInst, StatusCondition};
use crate::battle::ai::MoveChoice;
use crate::battle::calculators::calculate_damage;
use crate::battle::move_effects::{apply_secondary_effect, EffectContext};
use crate::battle::state::{BattleEvent, BattleRng, EventBus, Side};
use crate::battle::stats::{effective_speed, move_hits};
use crate::content::ContentCatalog;
use crate::errors::{ActionError, BattleResult};
use tracing::debug;

pub const CONFUSION_SELF_HIT_CHANCE: f64 = 0.33;
pub const CONFUSION_RECOVERY_CHANCE: f64 = 0.25;
/// A confused self-hit costs 1/20 of max vitality.
pub const CONFUSION_DAMAGE_DIVISOR: u16 = 20;
/// Poison costs 1/16 of max vitality after each move against the poisoned agent.
pub const POISON_DAMAGE_DIVISOR: u16 = 16;

/// Display names for both sides. The enemy's carries the "Wild " prefix in wild battles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleNames {
    pub player: String,
    pub enemy: String,
}

impl BattleNames {
    pub fn new(player: &AgentInst, enemy: &AgentInst, wild: bool) -> Self {
        let prefix = if wild { "Wild " } else { "" };
        Self {
            player: player.nickname.clone(),
            enemy: format!("{prefix}{}", enemy.nickname),
        }
    }

    pub fn of(&self, side: Side) -> &str {
        match side {
            Side::Player => &self.player,
            Side::Enemy => &self.enemy,
        }
    }
}

/// What one move did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveResolution {
    /// The move connected: it passed accuracy and the user did not hit itself.
    pub hit: bool,
    /// Damage dealt to the defender, or to the user on a confused self-hit.
    pub damage: u16,
    pub effectiveness: f64,
    pub self_hit: bool,
}

impl MoveResolution {
    fn missed() -> Self {
        Self {
            hit: false,
            damage: 0,
            effectiveness: 1.0,
            self_hit: false,
        }
    }
}

/// Everything that happened in one exchange or one free move.
#[derive(Debug, Clone, Default)]
pub struct TurnReport {
    pub events: EventBus,
    /// Agents at zero vitality when resolution stopped, defender first.
    pub fainted: Vec<Side>,
    /// The acting side and result of the last move resolved.
    pub last_move: Option<(Side, MoveResolution)>,
}

impl TurnReport {
    pub fn first_fainted(&self) -> Option<Side> {
        self.fainted.first().copied()
    }

    pub fn lines(&self) -> Vec<String> {
        self.events.formatted_lines()
    }
}

/// Resolves one move: accuracy, confusion, PP, damage, then the secondary effect.
pub fn resolve_move(
    attacker: &mut AgentInst,
    defender: &mut AgentInst,
    choice: MoveChoice,
    names: (&str, &str),
    catalog: &ContentCatalog,
    rng: &mut BattleRng,
    bus: &mut EventBus,
) -> BattleResult<MoveResolution> {
    let (attacker_name, defender_name) = names;
    let move_data = match choice {
        MoveChoice::Slot(slot) => {
            let instance = attacker
                .moves()
                .get(slot)
                .ok_or(ActionError::InvalidMoveSlot(slot))?;
            catalog.move_data(&instance.move_id)?
        }
        MoveChoice::Struggle => {
            bus.push(BattleEvent::NoMovesLeft {
                user: attacker_name.to_string(),
            });
            catalog.struggle()
        }
    };

    bus.push(BattleEvent::MoveUsed {
        user: attacker_name.to_string(),
        move_name: move_data.name.clone(),
    });

    if !move_hits(move_data.accuracy, rng) {
        bus.push(BattleEvent::MoveMissed {
            user: attacker_name.to_string(),
        });
        return Ok(MoveResolution::missed());
    }

    if attacker.status == Some(StatusCondition::Confused) {
        if rng.next_unit("confusion self-hit") < CONFUSION_SELF_HIT_CHANCE {
            let damage = attacker.take_damage(attacker.max_vitality() / CONFUSION_DAMAGE_DIVISOR);
            bus.push(BattleEvent::Confused {
                agent: attacker_name.to_string(),
            });
            bus.push(BattleEvent::HurtItself {
                agent: attacker_name.to_string(),
                damage,
            });
            return Ok(MoveResolution {
                hit: false,
                damage,
                effectiveness: 1.0,
                self_hit: true,
            });
        }
        if rng.next_unit("confusion recovery") < CONFUSION_RECOVERY_CHANCE {
            attacker.status = None;
            bus.push(BattleEvent::SnappedOut {
                agent: attacker_name.to_string(),
            });
        }
    }

    if let MoveChoice::Slot(slot) = choice {
        if let Some(instance) = attacker.move_slot_mut(slot) {
            instance.use_pp();
        }
    }

    let outcome = calculate_damage(attacker, defender, move_data, catalog, rng)?;
    if move_data.is_damaging() {
        let taken = defender.take_damage(outcome.damage);
        bus.push(BattleEvent::DamageDealt {
            target: defender_name.to_string(),
            damage: taken,
            remaining: defender.vitality(),
        });
        bus.push(BattleEvent::AttackTypeEffectiveness {
            multiplier: outcome.effectiveness,
        });
    }

    if let Some(effect) = &move_data.effect {
        let context = EffectContext::new(attacker_name, defender_name, outcome.damage);
        apply_secondary_effect(
            effect,
            move_data.effect_chance,
            attacker,
            defender,
            &context,
            rng,
            bus,
        );
    }

    Ok(MoveResolution {
        hit: true,
        damage: outcome.damage,
        effectiveness: outcome.effectiveness,
        self_hit: false,
    })
}

/// Player first on equal effective speed.
pub fn player_moves_first(player: &AgentInst, enemy: &AgentInst) -> bool {
    effective_speed(player) >= effective_speed(enemy)
}

fn fainted_sides(defender_side: Side, defender: &AgentInst, attacker: &AgentInst) -> Vec<Side> {
    let mut fainted = Vec::new();
    if defender.is_fainted() {
        fainted.push(defender_side);
    }
    if attacker.is_fainted() {
        fainted.push(defender_side.opponent());
    }
    fainted
}

/// The check after each move: faints first, then the defender's poison tick, then faints again.
fn after_move(
    defender_side: Side,
    defender: &mut AgentInst,
    attacker: &AgentInst,
    bus: &mut EventBus,
) -> Vec<Side> {
    let fainted = fainted_sides(defender_side, defender, attacker);
    if !fainted.is_empty() {
        return fainted;
    }

    if defender.status == Some(StatusCondition::Poisoned) {
        let damage = defender.take_damage(defender.max_vitality() / POISON_DAMAGE_DIVISOR);
        bus.push(BattleEvent::PoisonDamage {
            agent: defender.nickname.clone(),
            damage,
        });
    }
    fainted_sides(defender_side, defender, attacker)
}

/// Resolves one move by `side` and runs the post-move checks.
fn resolve_side(
    side: Side,
    player: &mut AgentInst,
    enemy: &mut AgentInst,
    choice: MoveChoice,
    names: &BattleNames,
    catalog: &ContentCatalog,
    rng: &mut BattleRng,
    report: &mut TurnReport,
) -> BattleResult<()> {
    let (attacker, defender) = match side {
        Side::Player => (player, enemy),
        Side::Enemy => (enemy, player),
    };
    let resolution = resolve_move(
        attacker,
        defender,
        choice,
        (names.of(side), names.of(side.opponent())),
        catalog,
        rng,
        &mut report.events,
    )?;
    report.last_move = Some((side, resolution));
    report.fainted = after_move(side.opponent(), defender, attacker, &mut report.events);
    Ok(())
}

/// Resolves a full exchange. The faster side acts first; a faint ends the exchange early.
pub fn resolve_exchange(
    player: &mut AgentInst,
    enemy: &mut AgentInst,
    player_choice: MoveChoice,
    enemy_choice: MoveChoice,
    names: &BattleNames,
    catalog: &ContentCatalog,
    rng: &mut BattleRng,
) -> BattleResult<TurnReport> {
    let order = if player_moves_first(player, enemy) {
        [(Side::Player, player_choice), (Side::Enemy, enemy_choice)]
    } else {
        [(Side::Enemy, enemy_choice), (Side::Player, player_choice)]
    };
    debug!(first = ?order[0].0, "turn order decided");

    let mut report = TurnReport::default();
    for (side, choice) in order {
        resolve_side(side, player, enemy, choice, names, catalog, rng, &mut report)?;
        if !report.fainted.is_empty() {
            break;
        }
    }
    Ok(report)
}

/// A single unanswered enemy move, granted after a failed escape, an item, a switch
/// or a failed capture.
pub fn resolve_free_move(
    player: &mut AgentInst,
    enemy: &mut AgentInst,
    enemy_choice: MoveChoice,
    names: &BattleNames,
    catalog: &ContentCatalog,
    rng: &mut BattleRng,
) -> BattleResult<TurnReport> {
    let mut report = TurnReport::default();
    resolve_side(Side::Enemy, player, enemy, enemy_choice, names, catalog, rng, &mut report)?;
    Ok(report)
}
