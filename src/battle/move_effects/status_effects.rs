use super::EffectContext;
use crate::agent::{AgentInst, StatusCondition};
use crate::battle::state::{BattleEvent, EventBus};
use schema::MoveEffect;

/// Inflicts confusion or poison. A target that already has a status is left alone.
pub(super) fn apply_status_effect(
    effect: &MoveEffect,
    defender: &mut AgentInst,
    context: &EffectContext<'_>,
    bus: &mut EventBus,
) {
    let status = match effect {
        MoveEffect::Confuse => StatusCondition::Confused,
        MoveEffect::Poison => StatusCondition::Poisoned,
        _ => return,
    };
    if defender.status.is_some() {
        return;
    }
    defender.status = Some(status);
    bus.push(BattleEvent::StatusInflicted {
        target: context.defender_name.to_string(),
        status,
    });
}
