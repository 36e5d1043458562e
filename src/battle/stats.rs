use crate::agent::{AgentInst, STAGE_LIMIT};
use crate::battle::state::BattleRng;
use schema::StatKind;

/// (2 + stage) / 2 for non-negative stages, 2 / (2 - stage) below zero.
pub fn stage_multiplier(stage: i8) -> f64 {
    let stage = stage.clamp(-STAGE_LIMIT, STAGE_LIMIT) as f64;
    if stage >= 0.0 {
        (2.0 + stage) / 2.0
    } else {
        2.0 / (2.0 - stage)
    }
}

/// Scales a raw stat by its stage. Left unrounded; damage floors once at the end.
pub fn apply_stat_stage_multiplier(base: u16, stage: i8) -> f64 {
    base as f64 * stage_multiplier(stage)
}

/// Calculate an effective stat including its battle stage.
pub fn effective_stat(agent: &AgentInst, stat: StatKind) -> f64 {
    apply_stat_stage_multiplier(agent.stats().get(stat), agent.stat_stage(stat))
}

/// Calculate effective speed including stat stages. Used for turn order only;
/// escape odds read raw speed.
pub fn effective_speed(agent: &AgentInst) -> f64 {
    effective_stat(agent, StatKind::Speed)
}

/// A move misses when a draw over [0, 100) exceeds its accuracy.
pub fn move_hits(accuracy: u8, rng: &mut BattleRng) -> bool {
    rng.next_unit("accuracy check") * 100.0 <= accuracy as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(-6, 0.25)]
    #[case(-2, 0.5)]
    #[case(-1, 2.0 / 3.0)]
    #[case(0, 1.0)]
    #[case(1, 1.5)]
    #[case(2, 2.0)]
    #[case(6, 4.0)]
    fn test_stage_multiplier_table(#[case] stage: i8, #[case] expected: f64) {
        assert_eq!(stage_multiplier(stage), expected);
    }

    #[test]
    fn test_out_of_range_stages_are_clamped() {
        assert_eq!(stage_multiplier(9), 4.0);
        assert_eq!(stage_multiplier(-100), 0.25);
    }

    #[rstest]
    #[case(100, 0.99, true)]
    #[case(90, 0.89, true)]
    #[case(90, 0.90, true)]
    #[case(90, 0.91, false)]
    #[case(0, 0.0, true)]
    #[case(0, 0.01, false)]
    fn test_accuracy_threshold(#[case] accuracy: u8, #[case] roll: f64, #[case] hits: bool) {
        let mut rng = BattleRng::new_for_test(vec![roll]);
        assert_eq!(move_hits(accuracy, &mut rng), hits);
    }

    proptest! {
        #[test]
        fn prop_stage_multiplier_is_monotonic(stage in -6i8..6) {
            prop_assert!(stage_multiplier(stage) < stage_multiplier(stage + 1));
        }

        #[test]
        fn prop_stage_multiplier_stays_in_range(stage in any::<i8>()) {
            let multiplier = stage_multiplier(stage);
            prop_assert!((0.25..=4.0).contains(&multiplier));
        }
    }
}
