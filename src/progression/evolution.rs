use super::RewardCalculator;
use crate::agent::AgentInst;
use crate::content::ContentCatalog;
use crate::errors::ContentResult;
use schema::SpeciesId;
use tracing::info;

impl RewardCalculator {
    /// The species this agent should evolve into at its current level, if any.
    pub fn should_evolve(
        &self,
        agent: &AgentInst,
        catalog: &ContentCatalog,
    ) -> ContentResult<Option<SpeciesId>> {
        let species = catalog.species(&agent.species)?;
        Ok(species
            .evolution
            .as_ref()
            .filter(|evolution| agent.level() >= evolution.level)
            .map(|evolution| evolution.into.clone()))
    }

    /// Turns the agent into `into`. Level and experience carry over; stats are
    /// recomputed from the new base block and vitality is fully restored.
    /// Returns the new species' display name.
    pub fn evolve(
        &self,
        agent: &mut AgentInst,
        into: &SpeciesId,
        catalog: &ContentCatalog,
    ) -> ContentResult<String> {
        let species = catalog.species(into)?;
        let old_name = agent.nickname.clone();
        agent.transform_into(into, species);
        info!(from = %old_name, into = %species.name, level = agent.level(), "evolution");
        Ok(species.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::tests::common::{bundled_catalog, TestAgentBuilder};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_should_evolve_at_threshold() {
        let catalog = bundled_catalog();
        let young = TestAgentBuilder::new("sparky", 15).build(&catalog);
        let ready = TestAgentBuilder::new("sparky", 16).build(&catalog);
        let final_form = TestAgentBuilder::new("executron", 80).build(&catalog);

        assert_eq!(RewardCalculator.should_evolve(&young, &catalog).unwrap(), None);
        assert_eq!(
            RewardCalculator.should_evolve(&ready, &catalog).unwrap(),
            Some(SpeciesId::new("compilot"))
        );
        assert_eq!(RewardCalculator.should_evolve(&final_form, &catalog).unwrap(), None);
    }

    #[test]
    fn test_evolution_recomputes_from_new_species_only() {
        let catalog = bundled_catalog();
        let mut evolved = TestAgentBuilder::new("sparky", 20).build(&catalog);
        evolved.xp = 1234;
        evolved.take_damage(10);
        let moves_before = evolved.moves().to_vec();

        let name = RewardCalculator
            .evolve(&mut evolved, &SpeciesId::new("compilot"), &catalog)
            .unwrap();
        let native = TestAgentBuilder::new("compilot", 20).build(&catalog);

        assert_eq!(name, "Compilot");
        assert_eq!(evolved.nickname, "Compilot");
        assert_eq!(evolved.level(), 20);
        assert_eq!(evolved.xp, 1234);
        assert_eq!(evolved.stats(), native.stats());
        assert_eq!(evolved.max_vitality(), native.max_vitality());
        assert_eq!(evolved.vitality(), evolved.max_vitality());
        assert_eq!(evolved.moves(), moves_before.as_slice());
    }
}
