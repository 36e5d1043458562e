// AgentMon Schema - Shared content definitions
// Species, moves, items and the type chart are immutable data consumed by the
// battle engine. Nothing in this crate mutates at runtime.

pub use agent_types::*;
pub use battle_data::*;
pub use ids::*;
pub use species_data::*;

pub mod agent_types;
pub mod battle_data;
pub mod ids;
pub mod species_data;
