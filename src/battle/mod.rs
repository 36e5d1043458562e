pub mod ai;
pub mod calculators;
pub mod catch;
pub mod engine;
pub mod move_effects;
pub mod presentation;
pub mod runner;
pub mod sequences;
pub mod state;
pub mod stats;
pub mod turn_orchestrator;

#[cfg(test)]
pub(crate) mod tests;
