//! A module for defining AI behaviors for battle opponents.

use crate::agent::AgentInst;
use crate::battle::calculators::STAB_MULTIPLIER;
use crate::battle::state::BattleRng;
use crate::content::ContentCatalog;
use crate::errors::ContentResult;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Power assumed for moves that list none, so status moves still get a score.
pub const STATUS_MOVE_SCORE: f64 = 30.0;
/// Upper bound of the random jitter added to each score.
pub const SCORE_JITTER: f64 = 20.0;

/// The move an agent will use this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveChoice {
    /// Index into the agent's move slots.
    Slot(usize),
    /// Every slot is out of PP.
    Struggle,
}

/// A trait for any system that can pick a move for an agent.
pub trait Behavior {
    fn choose_move(
        &self,
        attacker: &AgentInst,
        defender: &AgentInst,
        catalog: &ContentCatalog,
        rng: &mut BattleRng,
    ) -> ContentResult<MoveChoice>;
}

/// Scores each usable move by power, matchup and same-type bonus, plus jitter.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringAI;

impl ScoringAI {
    pub fn new() -> Self {
        Self
    }

    /// Score for one slot, without jitter.
    fn score_move(
        &self,
        slot: usize,
        attacker: &AgentInst,
        defender: &AgentInst,
        catalog: &ContentCatalog,
    ) -> ContentResult<f64> {
        let move_data = catalog.move_data(&attacker.moves()[slot].move_id)?;
        let defender_types = &catalog.species(&defender.species)?.types;
        let attacker_types = &catalog.species(&attacker.species)?.types;

        let power = if move_data.power == 0 {
            STATUS_MOVE_SCORE
        } else {
            move_data.power as f64
        };
        let mut score = power * catalog.effectiveness(move_data.move_type, defender_types);
        if attacker_types.contains(&move_data.move_type) {
            score *= STAB_MULTIPLIER;
        }
        Ok(score)
    }
}

impl Behavior for ScoringAI {
    fn choose_move(
        &self,
        attacker: &AgentInst,
        defender: &AgentInst,
        catalog: &ContentCatalog,
        rng: &mut BattleRng,
    ) -> ContentResult<MoveChoice> {
        let mut scored = Vec::with_capacity(attacker.moves().len());
        for (slot, instance) in attacker.moves().iter().enumerate() {
            if !instance.is_usable() {
                continue;
            }
            let score = self.score_move(slot, attacker, defender, catalog)?
                + rng.next_unit("opponent move jitter") * SCORE_JITTER;
            scored.push((slot, score));
        }

        // max_by_key keeps the last maximum; scanning in reverse keeps the first.
        let choice = scored
            .iter()
            .rev()
            .max_by_key(|(_, score)| OrderedFloat(*score))
            .map_or(MoveChoice::Struggle, |(slot, _)| MoveChoice::Slot(*slot));

        debug!(agent = %attacker.nickname, ?scored, ?choice, "opponent chose move");
        Ok(choice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::tests::common::{bundled_catalog, TestAgentBuilder};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_prefers_super_effective_move() {
        let catalog = bundled_catalog();
        // Code attacks are doubled against Research.
        let attacker = TestAgentBuilder::new("tokenite", 10)
            .with_moves(&["hello_world", "tokenize"])
            .build(&catalog);
        let defender = TestAgentBuilder::new("datum", 10).build(&catalog);
        let mut rng = BattleRng::new_for_test(vec![0.0, 0.99]);

        let choice = ScoringAI::new()
            .choose_move(&attacker, &defender, &catalog, &mut rng)
            .unwrap();
        assert_eq!(choice, MoveChoice::Slot(0));
    }

    #[test]
    fn test_ties_go_to_first_slot() {
        let catalog = bundled_catalog();
        let attacker = TestAgentBuilder::new("sparky", 10)
            .with_moves(&["hello_world", "hello_world"])
            .build(&catalog);
        let defender = TestAgentBuilder::new("muse", 10).build(&catalog);
        let mut rng = BattleRng::new_for_test(vec![0.5, 0.5]);

        let choice = ScoringAI::new()
            .choose_move(&attacker, &defender, &catalog, &mut rng)
            .unwrap();
        assert_eq!(choice, MoveChoice::Slot(0));
    }

    #[test]
    fn test_skips_empty_slots_and_falls_back_to_struggle() {
        let catalog = bundled_catalog();
        let mut attacker = TestAgentBuilder::new("sparky", 10)
            .with_moves(&["hello_world", "compile"])
            .build(&catalog);
        attacker.move_slot_mut(0).unwrap().set_pp(0);
        let defender = TestAgentBuilder::new("muse", 10).build(&catalog);

        // Only one jitter is drawn: the empty slot is never scored.
        let mut rng = BattleRng::new_for_test(vec![0.0]);
        let choice = ScoringAI::new()
            .choose_move(&attacker, &defender, &catalog, &mut rng)
            .unwrap();
        assert_eq!(choice, MoveChoice::Slot(1));
        assert_eq!(rng.remaining(), Some(0));

        attacker.move_slot_mut(1).unwrap().set_pp(0);
        let mut rng = BattleRng::new_for_test(vec![]);
        let choice = ScoringAI::new()
            .choose_move(&attacker, &defender, &catalog, &mut rng)
            .unwrap();
        assert_eq!(choice, MoveChoice::Struggle);
    }
}
