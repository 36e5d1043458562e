use super::RewardCalculator;
use crate::agent::{AgentInst, MoveInstance};
use crate::content::ContentCatalog;
use crate::errors::ContentResult;
use schema::MoveId;

impl RewardCalculator {
    /// Get moves learned at a specific level.
    pub fn moves_learned_at_level(
        &self,
        agent: &AgentInst,
        level: u8,
        catalog: &ContentCatalog,
    ) -> ContentResult<Vec<MoveId>> {
        let species = catalog.species(&agent.species)?;
        Ok(species.moves_learned_at(level).cloned().collect())
    }

    /// Overwrites `slot` with `new_move` at full PP. Returns the forgotten move,
    /// or None when the slot is empty.
    pub fn replace_move(
        &self,
        agent: &mut AgentInst,
        slot: usize,
        new_move: &MoveId,
        catalog: &ContentCatalog,
    ) -> ContentResult<Option<MoveId>> {
        let instance = MoveInstance::new(new_move.clone(), catalog.move_data(new_move)?);
        Ok(agent
            .replace_move(slot, instance)
            .map(|forgotten| forgotten.move_id))
    }
}
