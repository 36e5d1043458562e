use crate::agent::AgentInst;
use crate::config::BattleConfig;
use crate::errors::{BattleResult, BattleStateError};
use schema::{ItemId, SpeciesId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where a captured agent ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureDestination {
    Party,
    Storage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item_id: ItemId,
    pub quantity: u32,
}

/// The narrow view of the player's progress that an encounter needs.
///
/// Party order matters: slot 0 leads. Bag order does not.
pub trait RosterAccess {
    fn party(&self) -> &[AgentInst];
    fn party_member_mut(&mut self, index: usize) -> Option<&mut AgentInst>;
    fn bag(&self) -> &[ItemStack];
    /// Removes one of `item`. Stacks that reach zero disappear. False if none was held.
    fn consume_item(&mut self, item: &ItemId) -> bool;
    fn receive_captured(&mut self, agent: AgentInst) -> CaptureDestination;
    /// Marks a species as seen, and as caught when `caught` is set.
    fn record_sighting(&mut self, species: &SpeciesId, caught: bool);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DexEntry {
    pub seen: bool,
    pub caught: bool,
}

/// Reference roster: party, unlimited storage, bag and the AgentDex ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    party: Vec<AgentInst>,
    storage: Vec<AgentInst>,
    bag: Vec<ItemStack>,
    dex: BTreeMap<SpeciesId, DexEntry>,
    party_capacity: usize,
}

impl Roster {
    pub fn new() -> Self {
        Self::with_party_capacity(BattleConfig::DEFAULT_PARTY_CAPACITY)
    }

    pub fn with_party_capacity(party_capacity: usize) -> Self {
        Self {
            party: Vec::new(),
            storage: Vec::new(),
            bag: Vec::new(),
            dex: BTreeMap::new(),
            party_capacity: party_capacity.max(1),
        }
    }

    pub fn from_config(config: &BattleConfig) -> Self {
        Self::with_party_capacity(config.party_capacity)
    }

    /// Adds an owned agent, overflowing to storage once the party is full.
    pub fn add_agent(&mut self, mut agent: AgentInst) -> CaptureDestination {
        agent.is_wild = false;
        self.record_sighting(&agent.species.clone(), true);
        if self.party.len() < self.party_capacity {
            self.party.push(agent);
            CaptureDestination::Party
        } else {
            self.storage.push(agent);
            CaptureDestination::Storage
        }
    }

    pub fn add_item(&mut self, item_id: ItemId, quantity: u32) {
        if quantity == 0 {
            return;
        }
        match self.bag.iter_mut().find(|stack| stack.item_id == item_id) {
            Some(stack) => stack.quantity += quantity,
            None => self.bag.push(ItemStack { item_id, quantity }),
        }
    }

    pub fn item_count(&self, item_id: &ItemId) -> u32 {
        self.bag
            .iter()
            .find(|stack| &stack.item_id == item_id)
            .map_or(0, |stack| stack.quantity)
    }

    pub fn storage(&self) -> &[AgentInst] {
        &self.storage
    }

    pub fn party_capacity(&self) -> usize {
        self.party_capacity
    }

    pub fn dex_entry(&self, species: &SpeciesId) -> DexEntry {
        self.dex.get(species).copied().unwrap_or_default()
    }

    pub fn seen_count(&self) -> usize {
        self.dex.values().filter(|entry| entry.seen).count()
    }

    pub fn caught_count(&self) -> usize {
        self.dex.values().filter(|entry| entry.caught).count()
    }

    pub fn has_usable_agent(&self) -> bool {
        self.party.iter().any(|agent| !agent.is_fainted())
    }

    /// Full restore of every party member, as a rest stop would do.
    pub fn heal_party(&mut self) {
        self.party.iter_mut().for_each(AgentInst::restore_full);
    }

    /// Pretty JSON of the whole roster, for hosts that persist it as text.
    pub fn to_json(&self) -> BattleResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|err| BattleStateError::Snapshot(format!("roster to JSON: {err}")).into())
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self::new()
    }
}

impl RosterAccess for Roster {
    fn party(&self) -> &[AgentInst] {
        &self.party
    }

    fn party_member_mut(&mut self, index: usize) -> Option<&mut AgentInst> {
        self.party.get_mut(index)
    }

    fn bag(&self) -> &[ItemStack] {
        &self.bag
    }

    fn consume_item(&mut self, item: &ItemId) -> bool {
        let Some(index) = self.bag.iter().position(|stack| &stack.item_id == item) else {
            return false;
        };
        let stack = &mut self.bag[index];
        stack.quantity = stack.quantity.saturating_sub(1);
        if stack.quantity == 0 {
            self.bag.remove(index);
        }
        true
    }

    fn receive_captured(&mut self, agent: AgentInst) -> CaptureDestination {
        self.add_agent(agent)
    }

    fn record_sighting(&mut self, species: &SpeciesId, caught: bool) {
        let entry = self.dex.entry(species.clone()).or_default();
        entry.seen = true;
        entry.caught |= caught;
    }
}
