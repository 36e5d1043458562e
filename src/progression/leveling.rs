use super::RewardCalculator;
use crate::agent::{AgentInst, MoveInstance, MAX_LEVEL};
use crate::content::ContentCatalog;
use crate::errors::ContentResult;
use schema::{MoveId, SpeciesId};
use serde::{Deserialize, Serialize};
use tracing::info;

/// One level climbed, with the moves picked up into free slots on the way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelGained {
    pub level: u8,
    pub learned: Vec<MoveId>,
}

/// Everything an experience award changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUpReport {
    pub levels: Vec<LevelGained>,
    /// Moves offered while all four slots were full, in the order they came up.
    pub pending_moves: Vec<MoveId>,
    /// Set when the agent reached its evolution level. Not applied yet.
    pub evolution: Option<SpeciesId>,
}

impl LevelUpReport {
    pub fn leveled_up(&self) -> bool {
        !self.levels.is_empty()
    }
}

impl RewardCalculator {
    /// Adds experience and climbs levels until it runs out or the cap is hit.
    ///
    /// Each level recomputes stats from the current species and keeps the
    /// vitality the agent gained. Evolution is only reported; the caller
    /// applies it once every move decision is settled.
    pub fn apply_experience(
        &self,
        agent: &mut AgentInst,
        amount: u32,
        catalog: &ContentCatalog,
    ) -> ContentResult<LevelUpReport> {
        let species = catalog.species(&agent.species)?;
        let mut report = LevelUpReport::default();
        agent.xp = agent.xp.saturating_add(amount);

        while agent.xp >= agent.xp_to_next && agent.level() < MAX_LEVEL {
            agent.xp -= agent.xp_to_next;
            agent.grow_level(species);
            let level = agent.level();

            let mut learned = Vec::new();
            for move_id in species.moves_learned_at(level) {
                let instance = MoveInstance::new(move_id.clone(), catalog.move_data(move_id)?);
                if agent.learn_move(instance) {
                    learned.push(move_id.clone());
                } else {
                    report.pending_moves.push(move_id.clone());
                }
            }
            info!(agent = %agent.nickname, level, "level up");
            report.levels.push(LevelGained { level, learned });

            if let Some(evolution) = &species.evolution {
                if level >= evolution.level {
                    report.evolution = Some(evolution.into.clone());
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::xp_to_next_level;
    use crate::battle::tests::common::{bundled_catalog, TestAgentBuilder};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_level_up_carries_leftover() {
        let catalog = bundled_catalog();
        let mut sparky = TestAgentBuilder::new("sparky", 5).build(&catalog);
        let before_max = sparky.max_vitality();
        sparky.take_damage(5);

        let report = RewardCalculator
            .apply_experience(&mut sparky, 130, &catalog)
            .unwrap();
        assert_eq!(sparky.level(), 6);
        assert_eq!(sparky.xp, 30);
        assert_eq!(sparky.xp_to_next, xp_to_next_level(6));
        assert_eq!(report.levels.len(), 1);

        let gained = sparky.max_vitality() - before_max;
        assert_eq!(sparky.vitality(), before_max - 5 + gained);
    }

    #[test]
    fn test_learns_into_free_slot() {
        let catalog = bundled_catalog();
        let mut sparky = TestAgentBuilder::new("sparky", 8).build(&catalog);
        assert_eq!(sparky.moves().len(), 2);

        let needed = sparky.xp_to_next;
        let report = RewardCalculator
            .apply_experience(&mut sparky, needed, &catalog)
            .unwrap();
        assert_eq!(
            report.levels,
            vec![LevelGained {
                level: 9,
                learned: vec![MoveId::new("debug")],
            }]
        );
        assert!(report.pending_moves.is_empty());
        assert_eq!(sparky.moves().len(), 3);
    }

    #[test]
    fn test_full_slots_queue_the_move_and_flag_evolution() {
        let catalog = bundled_catalog();
        let mut sparky = TestAgentBuilder::new("sparky", 15)
            .with_moves(&["hello_world", "compile", "debug", "hello_world"])
            .build(&catalog);

        let needed = sparky.xp_to_next;
        let report = RewardCalculator
            .apply_experience(&mut sparky, needed, &catalog)
            .unwrap();
        assert_eq!(sparky.level(), 16);
        assert_eq!(report.pending_moves, vec![MoveId::new("stack_overflow")]);
        assert_eq!(report.evolution, Some(SpeciesId::new("compilot")));
        // Evolution is deferred.
        assert_eq!(sparky.species, SpeciesId::new("sparky"));
    }

    #[test]
    fn test_level_cap_holds_for_huge_awards() {
        let catalog = bundled_catalog();
        let mut agent = TestAgentBuilder::new("executron", 98).build(&catalog);
        let report = RewardCalculator
            .apply_experience(&mut agent, u32::MAX, &catalog)
            .unwrap();
        assert_eq!(agent.level(), MAX_LEVEL);
        assert_eq!(report.levels.len(), 2);
        assert_eq!(agent.xp_to_next, xp_to_next_level(MAX_LEVEL));

        let report = RewardCalculator
            .apply_experience(&mut agent, 1_000, &catalog)
            .unwrap();
        assert!(!report.leveled_up());
        assert_eq!(agent.level(), MAX_LEVEL);
    }
}
