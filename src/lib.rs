//! AgentMon Battle Engine
//!
//! Turn-based encounter resolution for AgentMon: one player agent against
//! one wild or trainer-owned opponent, driven a single input at a time.
//! Content is data-driven (RON tables) and every random draw goes through
//! a substitutable source, so any encounter can be replayed exactly.

// --- MODULE DECLARATIONS ---
pub mod agent;
pub mod battle;
pub mod config;
pub mod content;
pub mod errors;
pub mod progression;
pub mod roster;

// --- PUBLIC API RE-EXPORTS ---

// Static data definitions.
pub use schema::{
    AgentType, BaseStats, ItemData, ItemId, ItemKind, MoveCategory, MoveData, MoveEffect, MoveId,
    SpeciesData, SpeciesId, StatKind, TypeChart,
};

// Runtime types.
pub use agent::{AgentInst, MoveInstance, StatusCondition};
pub use content::ContentCatalog;
pub use roster::{CaptureDestination, Roster, RosterAccess};

// The encounter state machine and what hosts plug into it.
pub use battle::engine::{BattleContext, Encounter};
pub use battle::presentation::{AnimationCue, NullSink, PresentationSink, RecordingSink, SoundCue};
pub use battle::runner::EncounterView;
pub use battle::state::{
    BattleEvent, BattleRng, EncounterKind, EncounterOutcome, Input, Phase, Side, TrainerParty,
};
pub use config::BattleConfig;

// Crate-specific error and result types.
pub use errors::{
    ActionError, BattleEngineError, BattleResult, BattleStateError, ConfigError, ConfigResult,
    ContentError, ContentResult,
};
