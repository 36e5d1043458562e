use crate::agent::StatusCondition;
use crate::errors::BattleStateError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use schema::StatKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Intro,
    Menu,
    MoveSelect,
    Bag,
    Switch,
    Executing,
    /// Narration is on screen and waits for Confirm.
    Message,
    Faint,
    Xp,
    LevelUp,
    LearnMove,
    Evolution,
    /// A trainer's next reserve being announced.
    SendOut,
    Catch,
    Run,
    Win,
    Lose,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Win | Phase::Lose | Phase::Run)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Enemy,
            Side::Enemy => Side::Player,
        }
    }
}

/// One discrete host input. `Idle` is a frame without a key press.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Up,
    Down,
    Left,
    Right,
    Confirm,
    Cancel,
    Idle,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncounterOutcome {
    Won,
    Lost,
    Fled,
}

impl EncounterOutcome {
    /// The boolean handed to the overworld: only a victory counts.
    pub fn is_win(self) -> bool {
        self == EncounterOutcome::Won
    }
}

/// A trainer's name and the agents still waiting behind the active one, in send-out order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TrainerParty {
    pub name: String,
    pub reserves: Vec<crate::agent::AgentInst>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum EncounterKind {
    Wild,
    Trainer(TrainerParty),
}

impl EncounterKind {
    pub fn is_trainer(&self) -> bool {
        matches!(self, EncounterKind::Trainer(_))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum BattleEvent {
    // Move resolution
    MoveUsed {
        user: String,
        move_name: String,
    },
    MoveMissed {
        user: String,
    },
    NoMovesLeft {
        user: String,
    },
    Confused {
        agent: String,
    },
    HurtItself {
        agent: String,
        damage: u16,
    },
    SnappedOut {
        agent: String,
    },
    DamageDealt {
        target: String,
        damage: u16,
        remaining: u16,
    },
    AttackTypeEffectiveness {
        multiplier: f64,
    },
    StatusInflicted {
        target: String,
        status: StatusCondition,
    },
    StatStageChanged {
        target: String,
        stat: StatKind,
        stages: i8,
    },
    RecoilTaken {
        agent: String,
        damage: u16,
    },
    PoisonDamage {
        agent: String,
        damage: u16,
    },
    Fainted {
        agent: String,
    },

    // Progression
    ExperienceGained {
        agent: String,
        amount: u32,
    },
    LevelUp {
        agent: String,
        level: u8,
    },
    MoveLearned {
        agent: String,
        move_name: String,
    },
    WantsToLearn {
        agent: String,
        move_name: String,
    },
    AlreadyKnowsFour {
        agent: String,
    },
    ForgetPrompt {
        move_name: String,
    },
    ForgetCountdown,
    MoveForgotten {
        agent: String,
        old_move: String,
    },
    LearnedReplacement {
        move_name: String,
    },
    DidNotLearn {
        agent: String,
        move_name: String,
    },
    Evolving {
        agent: String,
    },
    EvolvedInto {
        agent: String,
        species_name: String,
    },

    // Encounter flow
    WildAppeared {
        agent: String,
    },
    TrainerSentOut {
        trainer: String,
        agent: String,
    },
    SentOut {
        agent: String,
    },
    CantRunFromTrainer,
    GotAwaySafely,
    CantEscape,
    NoPpLeft,
    BagEmpty,
    CantCaptureTrainerAgent,
    ThrewItem {
        item_name: String,
    },
    Captured {
        agent: String,
    },
    AddedToTeam {
        agent: String,
    },
    SentToStorage {
        agent: String,
    },
    BrokeFree {
        agent: String,
    },
    ItemUsed {
        item_name: String,
        restored: u16,
    },
    NoContextLeft {
        agent: String,
    },
    AlreadyOut {
        agent: String,
    },
    SendOutAnother,
    BlackedOut,
}

impl BattleEvent {
    /// The narration line for this event, or None for silent bookkeeping events.
    pub fn format(&self) -> Option<String> {
        match self {
            // === Move Events ===
            BattleEvent::MoveUsed { user, move_name } => Some(format!("{user} used {move_name}!")),
            BattleEvent::MoveMissed { user } => Some(format!("{user}'s attack missed!")),
            BattleEvent::NoMovesLeft { user } => Some(format!("{user} has no tokens left!")),
            BattleEvent::Confused { agent } => Some(format!("{agent} is confused!")),
            BattleEvent::HurtItself { .. } => Some("It hurt itself in confusion!".to_string()),
            BattleEvent::SnappedOut { agent } => Some(format!("{agent} snapped out of confusion!")),
            BattleEvent::DamageDealt { .. } => None, // The health bar tells this story
            BattleEvent::AttackTypeEffectiveness { multiplier } => {
                if *multiplier > 1.0 {
                    Some("It's super effective!".to_string())
                } else if *multiplier == 0.0 {
                    Some("It had no effect!".to_string())
                } else if *multiplier < 1.0 {
                    Some("It's not very effective...".to_string())
                } else {
                    None
                }
            }
            BattleEvent::StatusInflicted { target, status } => Some(match status {
                StatusCondition::Confused => format!("{target} became confused!"),
                StatusCondition::Poisoned => format!("{target} was poisoned!"),
            }),
            BattleEvent::StatStageChanged { target, stat, stages } => {
                let amount = if stages.unsigned_abs() > 1 { " sharply" } else { "" };
                let direction = if *stages > 0 { "rose" } else { "fell" };
                Some(format!("{target}'s {stat}{amount} {direction}!"))
            }
            BattleEvent::RecoilTaken { agent, .. } => Some(format!("{agent} took recoil damage!")),
            BattleEvent::PoisonDamage { agent, .. } => Some(format!("{agent} took poison damage!")),
            BattleEvent::Fainted { agent } => Some(format!("{agent} hallucinated into oblivion!")),

            // === Progression Events ===
            BattleEvent::ExperienceGained { agent, amount } => {
                Some(format!("{agent} gained {amount} XP!"))
            }
            BattleEvent::LevelUp { agent, level } => Some(format!("{agent} grew to Lv. {level}!")),
            BattleEvent::MoveLearned { agent, move_name } => {
                Some(format!("{agent} learned {move_name}!"))
            }
            BattleEvent::WantsToLearn { agent, move_name } => {
                Some(format!("{agent} wants to learn {move_name}!"))
            }
            BattleEvent::AlreadyKnowsFour { agent } => {
                Some(format!("But {agent} already knows 4 moves."))
            }
            BattleEvent::ForgetPrompt { move_name } => {
                Some(format!("Forget a move to learn {move_name}?"))
            }
            BattleEvent::ForgetCountdown => Some("1... 2... 3... Poof!".to_string()),
            BattleEvent::MoveForgotten { agent, old_move } => Some(format!("{agent} forgot {old_move}.")),
            BattleEvent::LearnedReplacement { move_name } => Some(format!("And learned {move_name}!")),
            BattleEvent::DidNotLearn { agent, move_name } => {
                Some(format!("{agent} did not learn {move_name}."))
            }
            BattleEvent::Evolving { agent } => Some(format!("What? {agent} is evolving!")),
            BattleEvent::EvolvedInto { agent, species_name } => {
                Some(format!("{agent} evolved into {species_name}!"))
            }

            // === Encounter Events ===
            BattleEvent::WildAppeared { agent } => Some(format!("Wild {agent} appeared!")),
            BattleEvent::TrainerSentOut { trainer, agent } => {
                Some(format!("{trainer} sent out {agent}!"))
            }
            BattleEvent::SentOut { agent } => Some(format!("Go! {agent}!")),
            BattleEvent::CantRunFromTrainer => Some("Can't run from a trainer battle!".to_string()),
            BattleEvent::GotAwaySafely => Some("Got away safely!".to_string()),
            BattleEvent::CantEscape => Some("Can't escape!".to_string()),
            BattleEvent::NoPpLeft => Some("No tokens left for this move!".to_string()),
            BattleEvent::BagEmpty => Some("Your bag is empty!".to_string()),
            BattleEvent::CantCaptureTrainerAgent => {
                Some("Can't capture a trainer's agent!".to_string())
            }
            BattleEvent::ThrewItem { item_name } => Some(format!("You threw a {item_name}!")),
            BattleEvent::Captured { agent } => Some(format!("Gotcha! {agent} was captured!")),
            BattleEvent::AddedToTeam { agent } => Some(format!("{agent} was added to your team!")),
            BattleEvent::SentToStorage { agent } => Some(format!("{agent} was sent to the Server!")),
            BattleEvent::BrokeFree { agent } => Some(format!("Oh no! {agent} broke free!")),
            BattleEvent::ItemUsed { item_name, .. } => {
                Some(format!("Used {item_name}! Restored context window."))
            }
            BattleEvent::NoContextLeft { agent } => Some(format!("{agent} has no context left!")),
            BattleEvent::AlreadyOut { agent } => Some(format!("{agent} is already out!")),
            BattleEvent::SendOutAnother => Some("Send out another agent?".to_string()),
            BattleEvent::BlackedOut => {
                Some("All your agents have hallucinated! You blacked out...".to_string())
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventBus {
    events: Vec<BattleEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    /// The narration for every event in order, skipping silent ones.
    pub fn formatted_lines(&self) -> Vec<String> {
        self.events.iter().filter_map(BattleEvent::format).collect()
    }

    pub fn extend(&mut self, other: EventBus) {
        self.events.extend(other.events);
    }

    /// Return true if the event bus contains no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Return the number of events in the bus.
    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl fmt::Display for EventBus {
    /// Shows the debug format of all events, one per line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for event in &self.events {
            writeln!(f, "  {:?}", event)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum RngSource {
    Seeded(StdRng),
    Scripted { outcomes: Vec<f64>, index: usize },
}

/// Uniform `[0, 1)` draws for every probability in a battle.
///
/// Every draw names what it is for, so a scripted test that runs dry
/// says exactly which roll it was missing.
#[derive(Debug, Clone)]
pub struct BattleRng {
    source: RngSource,
}

impl BattleRng {
    pub fn new_seeded(seed: u64) -> Self {
        Self {
            source: RngSource::Seeded(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn new_random() -> Self {
        Self {
            source: RngSource::Seeded(StdRng::from_os_rng()),
        }
    }

    /// Replays `outcomes` in order. Values are clamped into `[0, 1)`.
    pub fn new_for_test(outcomes: Vec<f64>) -> Self {
        Self {
            source: RngSource::Scripted { outcomes, index: 0 },
        }
    }

    pub fn next_unit(&mut self, reason: &str) -> f64 {
        let value = match &mut self.source {
            RngSource::Seeded(rng) => rng.random::<f64>(),
            RngSource::Scripted { outcomes, index } => {
                if *index >= outcomes.len() {
                    panic!(
                        "BattleRng exhausted! Tried to get a value for: '{}'. Need more random values.",
                        reason
                    );
                }
                let value = outcomes[*index].clamp(0.0, MAX_UNIT);
                *index += 1;
                value
            }
        };
        trace!(value, reason, "rng draw");
        value
    }

    /// Draws left in a scripted source. None for seeded sources.
    pub fn remaining(&self) -> Option<usize> {
        match &self.source {
            RngSource::Seeded(_) => None,
            RngSource::Scripted { outcomes, index } => Some(outcomes.len().saturating_sub(*index)),
        }
    }
}

/// Largest f64 below 1.0.
const MAX_UNIT: f64 = 1.0 - f64::EPSILON / 2.0;

/// Message lines waiting for the player to page through them.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct MessageQueue {
    lines: Vec<String>,
    index: usize,
}

impl MessageQueue {
    pub fn load(&mut self, lines: Vec<String>) {
        self.lines = lines;
        self.index = 0;
    }

    pub fn current(&self) -> Option<&str> {
        self.lines.get(self.index).map(String::as_str)
    }

    /// Lines after the one on screen.
    pub fn remaining(&self) -> usize {
        self.lines.len().saturating_sub(self.index + 1)
    }

    /// Moves to the next line. Returns false once every line has been read.
    pub fn advance(&mut self) -> bool {
        if self.index < self.lines.len() {
            self.index += 1;
        }
        self.index < self.lines.len()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.index = 0;
    }
}

/// Checks the single-continuation invariant before a new message batch starts.
pub(crate) fn ensure_no_pending<T>(pending: &Option<T>) -> Result<(), BattleStateError> {
    if pending.is_some() {
        return Err(BattleStateError::ContinuationPending);
    }
    Ok(())
}
