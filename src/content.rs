//! Content catalog: species, moves, items and the type chart.
//!
//! Content is external data. A catalog is loaded once, validated as a whole,
//! and then shared read-only by every encounter.

use crate::errors::{ContentError, ContentResult};
use schema::{
    AgentType, ItemData, ItemId, MoveCategory, MoveData, MoveEffect, MoveId, SpeciesData,
    SpeciesId, TypeChart,
};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Identifier reserved for the built-in fallback move.
pub const STRUGGLE_ID: &str = "struggle";
/// Highest base stat a species may declare. Keeps level-100 stats inside `u16`.
pub const MAX_BASE_STAT: u16 = 255;

const SPECIES_FILE: &str = "species.ron";
const MOVES_FILE: &str = "moves.ron";
const ITEMS_FILE: &str = "items.ron";
const TYPE_CHART_FILE: &str = "type_chart.ron";

/// The move used when an agent has no usable move left.
/// Typeless, so it is neutral against everything and never gets a same-type bonus.
pub fn struggle_move() -> MoveData {
    MoveData {
        name: "Struggle".to_string(),
        move_type: AgentType::Typeless,
        category: MoveCategory::Physical,
        power: 50,
        accuracy: 100,
        max_pp: 0,
        effect: Some(MoveEffect::Recoil { fraction: 0.25 }),
        effect_chance: 100,
        description: "Used only when every other move is out of tokens.".to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct ContentCatalog {
    species: BTreeMap<SpeciesId, SpeciesData>,
    moves: BTreeMap<MoveId, MoveData>,
    items: BTreeMap<ItemId, ItemData>,
    type_chart: TypeChart,
    struggle: MoveData,
}

impl ContentCatalog {
    /// Builds a catalog from already-parsed tables and validates it.
    pub fn from_parts(
        species: BTreeMap<SpeciesId, SpeciesData>,
        moves: BTreeMap<MoveId, MoveData>,
        items: BTreeMap<ItemId, ItemData>,
        type_chart: TypeChart,
    ) -> ContentResult<Self> {
        let catalog = Self {
            species,
            moves,
            items,
            type_chart,
            struggle: struggle_move(),
        };
        catalog.validate()?;
        debug!(
            species = catalog.species.len(),
            moves = catalog.moves.len(),
            items = catalog.items.len(),
            "content catalog ready"
        );
        Ok(catalog)
    }

    /// Parses the four RON documents that make up a catalog.
    pub fn from_ron_strs(
        species: &str,
        moves: &str,
        items: &str,
        type_chart: &str,
    ) -> ContentResult<Self> {
        Self::from_parts(
            parse_table("species", species)?,
            parse_table("moves", moves)?,
            parse_table("items", items)?,
            parse_table("type chart", type_chart)?,
        )
    }

    /// The roster shipped with the crate.
    pub fn bundled() -> ContentResult<Self> {
        Self::from_ron_strs(
            include_str!("../data/species.ron"),
            include_str!("../data/moves.ron"),
            include_str!("../data/items.ron"),
            include_str!("../data/type_chart.ron"),
        )
    }

    /// Reads `species.ron`, `moves.ron`, `items.ron` and `type_chart.ron` from `dir`.
    pub fn load_dir(dir: impl AsRef<Path>) -> ContentResult<Self> {
        let dir = dir.as_ref();
        let read = |file: &str| {
            let path = dir.join(file);
            fs::read_to_string(&path).map_err(|err| ContentError::Io {
                path: path.display().to_string(),
                details: err.to_string(),
            })
        };
        Self::from_ron_strs(
            &read(SPECIES_FILE)?,
            &read(MOVES_FILE)?,
            &read(ITEMS_FILE)?,
            &read(TYPE_CHART_FILE)?,
        )
    }

    /// Swaps in a different type chart, validating the result.
    pub fn with_type_chart(mut self, type_chart: TypeChart) -> ContentResult<Self> {
        self.type_chart = type_chart;
        self.validate()?;
        Ok(self)
    }

    pub fn species(&self, id: &SpeciesId) -> ContentResult<&SpeciesData> {
        self.species
            .get(id)
            .ok_or_else(|| ContentError::SpeciesNotFound(id.clone()))
    }

    pub fn move_data(&self, id: &MoveId) -> ContentResult<&MoveData> {
        if id.as_str() == STRUGGLE_ID {
            return Ok(&self.struggle);
        }
        self.moves
            .get(id)
            .ok_or_else(|| ContentError::MoveNotFound(id.clone()))
    }

    pub fn item(&self, id: &ItemId) -> ContentResult<&ItemData> {
        self.items
            .get(id)
            .ok_or_else(|| ContentError::ItemNotFound(id.clone()))
    }

    pub fn struggle(&self) -> &MoveData {
        &self.struggle
    }

    pub fn type_chart(&self) -> &TypeChart {
        &self.type_chart
    }

    pub fn effectiveness(&self, attacking: AgentType, defending: &[AgentType]) -> f64 {
        self.type_chart.effectiveness(attacking, defending)
    }

    pub fn species_ids(&self) -> impl Iterator<Item = &SpeciesId> {
        self.species.keys()
    }

    pub fn move_ids(&self) -> impl Iterator<Item = &MoveId> {
        self.moves.keys()
    }

    pub fn item_ids(&self) -> impl Iterator<Item = &ItemId> {
        self.items.keys()
    }

    /// Cross-checks every reference between tables.
    pub fn validate(&self) -> ContentResult<()> {
        if self.moves.contains_key(STRUGGLE_ID) {
            return Err(invalid("moves", format!("'{STRUGGLE_ID}' is reserved")));
        }

        for (id, data) in &self.moves {
            if data.accuracy > 100 {
                return Err(invalid("moves", format!("{id}: accuracy {} above 100", data.accuracy)));
            }
            if data.effect_chance > 100 {
                return Err(invalid(
                    "moves",
                    format!("{id}: effect chance {} above 100", data.effect_chance),
                ));
            }
            if data.move_type == AgentType::Typeless {
                return Err(invalid("moves", format!("{id}: only built-in moves are typeless")));
            }
            match &data.effect {
                Some(MoveEffect::RandomDamage { min, max }) if min >= max => {
                    return Err(invalid("moves", format!("{id}: empty damage range {min}..{max}")));
                }
                Some(MoveEffect::Recoil { fraction }) if !(0.0..=1.0).contains(fraction) => {
                    return Err(invalid("moves", format!("{id}: recoil fraction {fraction}")));
                }
                Some(MoveEffect::StatChange { stages: 0, .. }) => {
                    return Err(invalid("moves", format!("{id}: stat change of zero stages")));
                }
                _ => {}
            }
        }

        for (id, data) in &self.species {
            if data.types.is_empty() || data.types.len() > 2 {
                return Err(invalid(
                    "species",
                    format!("{id}: needs one or two types, found {}", data.types.len()),
                ));
            }
            if data.types.contains(&AgentType::Typeless) {
                return Err(invalid("species", format!("{id}: species cannot be typeless")));
            }
            if data.base_stats.max() > MAX_BASE_STAT {
                return Err(invalid(
                    "species",
                    format!("{id}: base stat {} above {MAX_BASE_STAT}", data.base_stats.max()),
                ));
            }
            if !data.learnset.iter().any(|entry| entry.level <= 1) {
                return Err(invalid("species", format!("{id}: learns nothing at level 1")));
            }
            for entry in &data.learnset {
                if !self.moves.contains_key(&entry.move_id) {
                    return Err(invalid(
                        "species",
                        format!("{id}: learnset references unknown move {}", entry.move_id),
                    ));
                }
            }
            if let Some(evolution) = &data.evolution {
                if !self.species.contains_key(&evolution.into) {
                    return Err(invalid(
                        "species",
                        format!("{id}: evolves into unknown species {}", evolution.into),
                    ));
                }
            }
        }

        for (id, data) in &self.items {
            if let schema::ItemKind::Capture { modifier } = data.kind {
                if modifier <= 0.0 {
                    return Err(invalid("items", format!("{id}: capture modifier {modifier}")));
                }
            }
        }

        if let Some((attacking, defending, multiplier)) = self.type_chart.find_invalid_entry() {
            return Err(invalid(
                "type chart",
                format!("{attacking} vs {defending} has multiplier {multiplier}"),
            ));
        }

        Ok(())
    }
}

fn parse_table<T: DeserializeOwned>(table: &'static str, text: &str) -> ContentResult<T> {
    ron::from_str(text).map_err(|err| ContentError::MalformedData {
        table,
        details: err.to_string(),
    })
}

fn invalid(table: &'static str, details: String) -> ContentError {
    ContentError::Invalid { table, details }
}
