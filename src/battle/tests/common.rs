use crate::agent::{AgentInst, MoveInstance, StatusCondition};
use crate::battle::engine::{BattleContext, Encounter};
use crate::battle::presentation::RecordingSink;
use crate::battle::state::{BattleRng, EncounterKind, EncounterOutcome, Input, Phase};
use crate::content::ContentCatalog;
use crate::errors::BattleResult;
use crate::roster::Roster;
use schema::{ItemId, MoveId, SpeciesId};

/// The bundled catalog. Panics if the shipped data does not validate.
pub fn bundled_catalog() -> ContentCatalog {
    match ContentCatalog::bundled() {
        Ok(catalog) => catalog,
        Err(err) => panic!("Failed to load bundled content: {}", err),
    }
}

/// A builder for creating test agent instances with common defaults.
///
/// # Example
/// ```ignore
/// let agent = TestAgentBuilder::new("sparky", 10)
///     .with_moves(&["compile"])
///     .with_status(StatusCondition::Poisoned)
///     .build(&catalog);
/// ```
pub struct TestAgentBuilder {
    species: String,
    level: u8,
    moves: Option<Vec<String>>,
    status: Option<StatusCondition>,
    vitality: Option<u16>,
    wild: bool,
}

impl TestAgentBuilder {
    pub fn new(species: &str, level: u8) -> Self {
        Self {
            species: species.to_string(),
            level,
            moves: None,
            status: None,
            vitality: None,
            wild: false,
        }
    }

    /// Replaces the learnset moves. Duplicates are allowed.
    pub fn with_moves(mut self, moves: &[&str]) -> Self {
        self.moves = Some(moves.iter().map(|id| id.to_string()).collect());
        self
    }

    pub fn with_status(mut self, status: StatusCondition) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets current vitality. If not set, vitality is max.
    pub fn with_vitality(mut self, vitality: u16) -> Self {
        self.vitality = Some(vitality);
        self
    }

    pub fn wild(mut self) -> Self {
        self.wild = true;
        self
    }

    pub fn build(self, catalog: &ContentCatalog) -> AgentInst {
        let species = SpeciesId::new(&self.species);
        let mut agent = match AgentInst::new(catalog, &species, self.level) {
            Ok(agent) => agent,
            Err(err) => panic!("Failed to build {}: {}", self.species, err),
        };

        if let Some(moves) = self.moves {
            let instances = moves.iter().map(|id| {
                let move_id = MoveId::new(id);
                match catalog.move_data(&move_id) {
                    Ok(data) => MoveInstance::new(move_id, data),
                    Err(err) => panic!("Unknown test move {}: {}", id, err),
                }
            });
            agent.set_moves(instances.collect::<Vec<_>>());
        }

        agent.status = self.status;
        agent.is_wild = self.wild;
        if let Some(vitality) = self.vitality {
            agent.set_vitality(vitality);
        }
        agent
    }
}

/// A roster with `party` in order and `items` in the bag.
pub fn roster_with(party: Vec<AgentInst>, items: &[(&str, u32)]) -> Roster {
    let mut roster = Roster::new();
    for agent in party {
        roster.add_agent(agent);
    }
    for (item, quantity) in items {
        roster.add_item(ItemId::new(*item), *quantity);
    }
    roster
}

/// Owns every collaborator an encounter needs, so tests can drive one end to end.
pub struct TestHarness {
    pub catalog: ContentCatalog,
    pub roster: Roster,
    pub rng: BattleRng,
    pub sink: RecordingSink,
}

impl TestHarness {
    pub fn new(catalog: ContentCatalog, roster: Roster, rng: BattleRng) -> Self {
        Self {
            catalog,
            roster,
            rng,
            sink: RecordingSink::new(),
        }
    }

    pub fn start(&mut self, opponent: AgentInst, kind: EncounterKind) -> BattleResult<Encounter> {
        let mut ctx = BattleContext::new(&self.catalog, &mut self.roster, &mut self.rng, &mut self.sink);
        Encounter::start(opponent, kind, &mut ctx)
    }

    pub fn advance(
        &mut self,
        encounter: &mut Encounter,
        input: Input,
    ) -> BattleResult<Option<EncounterOutcome>> {
        let mut ctx = BattleContext::new(&self.catalog, &mut self.roster, &mut self.rng, &mut self.sink);
        encounter.advance(input, &mut ctx)
    }

    /// Sends each input in turn, panicking on any error.
    pub fn press(&mut self, encounter: &mut Encounter, inputs: &[Input]) -> Option<EncounterOutcome> {
        let mut outcome = None;
        for input in inputs {
            outcome = assert_ok(self.advance(encounter, *input));
        }
        outcome
    }

    /// Confirms narration until the encounter leaves `Message` or ends.
    pub fn confirm_messages(&mut self, encounter: &mut Encounter) -> Option<EncounterOutcome> {
        let mut outcome = None;
        while encounter.phase() == Phase::Message {
            outcome = assert_ok(self.advance(encounter, Input::Confirm));
        }
        outcome
    }

    /// Plays the intro through to the menu.
    pub fn skip_intro(&mut self, encounter: &mut Encounter) {
        assert_ok(self.advance(encounter, Input::Idle));
        self.confirm_messages(encounter);
        assert_eq!(encounter.phase(), Phase::Menu);
    }
}

/// Helper function to assert that a Result is Ok and return the value.
/// Provides clear error messages in tests when functions unexpectedly fail.
pub fn assert_ok<T>(result: BattleResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("Expected Ok but got error: {}", err),
    }
}
