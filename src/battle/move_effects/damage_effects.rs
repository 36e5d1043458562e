use super::EffectContext;
use crate::agent::AgentInst;
use crate::battle::state::{BattleEvent, EventBus};

/// The attacker takes floor(fraction × damage dealt).
pub(super) fn apply_recoil_effect(
    fraction: f64,
    attacker: &mut AgentInst,
    context: &EffectContext<'_>,
    bus: &mut EventBus,
) {
    let recoil = (context.damage_dealt as f64 * fraction).floor() as u16;
    let taken = attacker.take_damage(recoil);
    bus.push(BattleEvent::RecoilTaken {
        agent: context.attacker_name.to_string(),
        damage: taken,
    });
}
