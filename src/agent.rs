use crate::content::ContentCatalog;
use crate::errors::ContentResult;
use schema::{BaseStats, MoveData, MoveId, SpeciesData, SpeciesId, StatKind};
use serde::{Deserialize, Serialize};

pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 100;
pub const MAX_MOVES: usize = 4;
/// Stat stages live in `[-STAGE_LIMIT, STAGE_LIMIT]`.
pub const STAGE_LIMIT: i8 = 6;

/// Experience needed to climb out of `level`.
pub fn xp_to_next_level(level: u8) -> u32 {
    ((level as f64).powi(3) * 0.8).floor() as u32
}

/// floor(2 × base × level / 100) + 5
pub fn stat_at_level(base: u16, level: u8) -> u16 {
    u16::try_from((2 * base as u32 * level as u32) / 100 + 5).unwrap_or(u16::MAX)
}

/// floor(2 × base × level / 100) + level + 10
pub fn vitality_at_level(base: u16, level: u8) -> u16 {
    u16::try_from((2 * base as u32 * level as u32) / 100 + level as u32 + 10).unwrap_or(u16::MAX)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusCondition {
    Poisoned,
    Confused,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveInstance {
    pub move_id: MoveId,
    pp: u8,
    max_pp: u8,
}

impl MoveInstance {
    pub fn new(move_id: MoveId, data: &MoveData) -> Self {
        Self {
            move_id,
            pp: data.max_pp,
            max_pp: data.max_pp,
        }
    }

    pub fn pp(&self) -> u8 {
        self.pp
    }

    pub fn max_pp(&self) -> u8 {
        self.max_pp
    }

    pub fn is_usable(&self) -> bool {
        self.pp > 0
    }

    /// Spends one use. Returns false when nothing was left.
    pub fn use_pp(&mut self) -> bool {
        if self.pp == 0 {
            return false;
        }
        self.pp -= 1;
        true
    }

    pub fn set_pp(&mut self, pp: u8) {
        self.pp = pp.min(self.max_pp);
    }

    pub fn restore_pp(&mut self) {
        self.pp = self.max_pp;
    }
}

/// The five derived stats. Vitality is tracked separately on the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub processing: u16,
    pub creativity: u16,
    pub alignment: u16,
    pub robustness: u16,
    pub speed: u16,
}

impl Stats {
    pub fn at_level(base: &BaseStats, level: u8) -> Self {
        Self {
            processing: stat_at_level(base.processing, level),
            creativity: stat_at_level(base.creativity, level),
            alignment: stat_at_level(base.alignment, level),
            robustness: stat_at_level(base.robustness, level),
            speed: stat_at_level(base.speed, level),
        }
    }

    pub fn get(&self, stat: StatKind) -> u16 {
        match stat {
            StatKind::Processing => self.processing,
            StatKind::Creativity => self.creativity,
            StatKind::Alignment => self.alignment,
            StatKind::Robustness => self.robustness,
            StatKind::Speed => self.speed,
        }
    }
}

/// One creature instance. Owned by the player's roster or by an encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentInst {
    pub species: SpeciesId,
    pub nickname: String,
    level: u8,
    pub xp: u32,
    pub xp_to_next: u32,
    max_vitality: u16,
    vitality: u16,
    stats: Stats,
    moves: Vec<MoveInstance>,
    pub status: Option<StatusCondition>,
    stat_stages: [i8; 5],
    pub is_wild: bool,
}

impl AgentInst {
    /// A fresh, fully healed agent knowing the last four moves it could have learned.
    pub fn new(catalog: &ContentCatalog, species: &SpeciesId, level: u8) -> ContentResult<Self> {
        let data = catalog.species(species)?;
        let level = level.clamp(MIN_LEVEL, MAX_LEVEL);

        let known: Vec<&MoveId> = data.moves_known_by(level).collect();
        let skip = known.len().saturating_sub(MAX_MOVES);
        let moves = known
            .into_iter()
            .skip(skip)
            .map(|move_id| {
                let move_data = catalog.move_data(move_id)?;
                Ok(MoveInstance::new(move_id.clone(), move_data))
            })
            .collect::<ContentResult<Vec<_>>>()?;

        let max_vitality = vitality_at_level(data.base_stats.vitality, level);
        Ok(Self {
            species: species.clone(),
            nickname: data.name.clone(),
            level,
            xp: 0,
            xp_to_next: xp_to_next_level(level),
            max_vitality,
            vitality: max_vitality,
            stats: Stats::at_level(&data.base_stats, level),
            moves,
            status: None,
            stat_stages: [0; 5],
            is_wild: false,
        })
    }

    pub fn new_wild(catalog: &ContentCatalog, species: &SpeciesId, level: u8) -> ContentResult<Self> {
        let mut agent = Self::new(catalog, species, level)?;
        agent.is_wild = true;
        Ok(agent)
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn vitality(&self) -> u16 {
        self.vitality
    }

    pub fn max_vitality(&self) -> u16 {
        self.max_vitality
    }

    pub fn is_fainted(&self) -> bool {
        self.vitality == 0
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn moves(&self) -> &[MoveInstance] {
        &self.moves
    }

    pub fn move_slot_mut(&mut self, slot: usize) -> Option<&mut MoveInstance> {
        self.moves.get_mut(slot)
    }

    pub fn has_usable_move(&self) -> bool {
        self.moves.iter().any(MoveInstance::is_usable)
    }

    pub fn stat_stage(&self, stat: StatKind) -> i8 {
        self.stat_stages[stat.index()]
    }

    /// Adds `delta` stages, clamped. Returns the new stage.
    pub fn change_stat_stage(&mut self, stat: StatKind, delta: i8) -> i8 {
        let slot = &mut self.stat_stages[stat.index()];
        *slot = slot.saturating_add(delta).clamp(-STAGE_LIMIT, STAGE_LIMIT);
        *slot
    }

    /// Clears everything that only lasts for one battle.
    pub fn reset_battle_state(&mut self) {
        self.stat_stages = [0; 5];
    }

    /// Returns the damage actually taken.
    pub fn take_damage(&mut self, amount: u16) -> u16 {
        let taken = amount.min(self.vitality);
        self.vitality -= taken;
        taken
    }

    /// Returns the amount actually restored.
    pub fn heal(&mut self, amount: u16) -> u16 {
        let restored = amount.min(self.max_vitality - self.vitality);
        self.vitality += restored;
        restored
    }

    pub fn set_vitality(&mut self, vitality: u16) {
        self.vitality = vitality.min(self.max_vitality);
    }

    pub fn restore_full(&mut self) {
        self.vitality = self.max_vitality;
        self.status = None;
        self.moves.iter_mut().for_each(MoveInstance::restore_pp);
    }

    /// Appends a move if a slot is free. Returns false when all four are taken.
    pub fn learn_move(&mut self, instance: MoveInstance) -> bool {
        if self.moves.len() >= MAX_MOVES {
            return false;
        }
        self.moves.push(instance);
        true
    }

    /// Overwrites the whole move list, keeping at most four.
    pub fn set_moves(&mut self, moves: impl IntoIterator<Item = MoveInstance>) {
        self.moves = moves.into_iter().take(MAX_MOVES).collect();
    }

    /// Swaps out the move in `slot`, returning the forgotten one.
    pub fn replace_move(&mut self, slot: usize, instance: MoveInstance) -> Option<MoveInstance> {
        let existing = self.moves.get_mut(slot)?;
        Some(std::mem::replace(existing, instance))
    }

    /// Raises the level by one and recomputes stats from `species`.
    /// Current vitality grows by however much the maximum grew.
    pub(crate) fn grow_level(&mut self, species: &SpeciesData) {
        self.level = (self.level + 1).min(MAX_LEVEL);
        self.xp_to_next = xp_to_next_level(self.level);

        let old_max = self.max_vitality;
        self.max_vitality = vitality_at_level(species.base_stats.vitality, self.level);
        let gained = self.max_vitality.saturating_sub(old_max);
        self.vitality = (self.vitality + gained).min(self.max_vitality);
        self.stats = Stats::at_level(&species.base_stats, self.level);
    }

    /// Becomes `species`, keeping level and experience. Fully restores vitality.
    pub(crate) fn transform_into(&mut self, species_id: &SpeciesId, species: &SpeciesData) {
        self.species = species_id.clone();
        self.nickname = species.name.clone();
        self.max_vitality = vitality_at_level(species.base_stats.vitality, self.level);
        self.vitality = self.max_vitality;
        self.stats = Stats::at_level(&species.base_stats, self.level);
    }
}
