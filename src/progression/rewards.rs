use crate::agent::AgentInst;
use crate::content::ContentCatalog;
use crate::errors::ContentResult;
use schema::SpeciesData;

/// Experience scales with the defeated agent's level divided by this.
const LEVEL_DIVISOR: f64 = 5.0;

/// Calculator for experience rewards and the growth that follows them.
#[derive(Debug, Clone, Copy, Default)]
pub struct RewardCalculator;

impl RewardCalculator {
    /// Experience for defeating an agent of `species` at `level`.
    /// Formula: floor(average base stat × level / 5)
    pub fn experience_yield(&self, species: &SpeciesData, level: u8) -> u32 {
        (species.base_stats.average() * level as f64 / LEVEL_DIVISOR).floor() as u32
    }

    pub fn experience_for_defeating(
        &self,
        defeated: &AgentInst,
        catalog: &ContentCatalog,
    ) -> ContentResult<u32> {
        let species = catalog.species(&defeated.species)?;
        Ok(self.experience_yield(species, defeated.level()))
    }

    /// Experience for capturing: a share of the defeat yield, floored.
    pub fn experience_for_capture(
        &self,
        captured: &AgentInst,
        catalog: &ContentCatalog,
        share: f64,
    ) -> ContentResult<u32> {
        let full = self.experience_for_defeating(captured, catalog)?;
        Ok((full as f64 * share).floor() as u32)
    }
}
