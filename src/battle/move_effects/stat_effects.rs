use crate::agent::AgentInst;
use crate::battle::state::{BattleEvent, EventBus};
use schema::StatKind;

/// Apply stat change effect. The stage is clamped, but the narration
/// always reports the attempted change.
pub(super) fn apply_stat_change_effect(
    stat: StatKind,
    stages: i8,
    recipient: &mut AgentInst,
    recipient_name: &str,
    bus: &mut EventBus,
) {
    recipient.change_stat_stage(stat, stages);
    bus.push(BattleEvent::StatStageChanged {
        target: recipient_name.to_string(),
        stat,
        stages,
    });
}
