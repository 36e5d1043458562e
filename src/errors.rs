use schema::{ItemId, MoveId, SpeciesId};
use thiserror::Error;

/// Main error type for the AgentMon battle engine.
///
/// Game-rule outcomes (misses, failed captures, failed escapes) are never
/// errors; they are narrated and the encounter carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleEngineError {
    /// Bad or missing content data. Fatal for encounter setup.
    #[error("Content error: {0}")]
    Content(#[from] ContentError),
    /// The encounter reached a state it should never be in.
    #[error("Battle state error: {0}")]
    BattleState(#[from] BattleStateError),
    /// The host asked for something the current phase cannot do.
    #[error("Action error: {0}")]
    Action(#[from] ActionError),
    /// Tunables failed to load or validate.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors related to species, move, item and type chart data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error("Species not found: {0}")]
    SpeciesNotFound(SpeciesId),
    #[error("Move not found: {0}")]
    MoveNotFound(MoveId),
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),
    /// A table parsed but one of its entries breaks a content rule.
    #[error("Invalid content in {table}: {details}")]
    Invalid { table: &'static str, details: String },
    /// A data file could not be parsed.
    #[error("Malformed {table} data: {details}")]
    MalformedData { table: &'static str, details: String },
    #[error("Failed to read {path}: {details}")]
    Io { path: String, details: String },
}

/// Errors related to encounter state consistency.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleStateError {
    /// A message sequence was started while another continuation was still waiting.
    #[error("A message continuation is already pending")]
    ContinuationPending,
    /// The player has no agent with context window left.
    #[error("No agent in the party can battle")]
    NoUsableAgent,
    /// The active party index no longer points at an agent.
    #[error("Invalid party index: {0}")]
    InvalidPartyIndex(usize),
    /// The opponent was already out of context window at setup.
    #[error("Opponent {0} has no context window left")]
    OpponentFainted(String),
    #[error("Snapshot failed: {0}")]
    Snapshot(String),
    #[error("Inconsistent battle state: {0}")]
    InconsistentState(String),
}

/// Errors related to host input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// Input arrived after the encounter already reported its outcome.
    #[error("The encounter has already ended")]
    EncounterFinished,
    #[error("Invalid move slot: {0}")]
    InvalidMoveSlot(usize),
    #[error("Invalid action: {0}")]
    InvalidAction(String),
}

/// Errors related to loading a [`crate::config::BattleConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {details}")]
    Io { path: String, details: String },
    #[error("Malformed config: {0}")]
    Malformed(String),
    #[error("Config value {field} out of range: {details}")]
    OutOfRange { field: &'static str, details: String },
}

/// Type alias for Results using BattleEngineError
pub type BattleResult<T> = Result<T, BattleEngineError>;

/// Type alias for Results using ContentError
pub type ContentResult<T> = Result<T, ContentError>;

/// Type alias for Results using ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;
