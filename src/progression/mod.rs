pub mod evolution;
pub mod leveling;
pub mod moves;
pub mod rewards;

pub use leveling::{LevelGained, LevelUpReport};
pub use rewards::RewardCalculator;
