use crate::AgentType;
use serde::{Deserialize, Serialize};
use strum::Display;

fn always() -> u8 {
    100
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveCategory {
    /// Processing against alignment.
    Physical,
    /// Creativity against robustness.
    Special,
    /// Never deals damage.
    Status,
}

/// The five stats that carry battle stages. Vitality has no stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum StatKind {
    Processing,
    Creativity,
    Alignment,
    Robustness,
    Speed,
}

impl StatKind {
    pub const ALL: [StatKind; 5] = [
        StatKind::Processing,
        StatKind::Creativity,
        StatKind::Alignment,
        StatKind::Robustness,
        StatKind::Speed,
    ];

    pub fn index(self) -> usize {
        match self {
            StatKind::Processing => 0,
            StatKind::Creativity => 1,
            StatKind::Alignment => 2,
            StatKind::Robustness => 3,
            StatKind::Speed => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EffectTarget {
    User,
    #[default]
    Opponent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MoveEffect {
    Confuse,
    Poison,
    StatChange {
        stat: StatKind,
        stages: i8,
        #[serde(default)]
        target: EffectTarget,
    },
    /// The attacker loses this fraction of the damage it just dealt.
    Recoil { fraction: f64 },
    /// Replaces the damage formula with a uniform draw in `[min, max)`.
    RandomDamage { min: u16, max: u16 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveData {
    pub name: String,
    pub move_type: AgentType,
    pub category: MoveCategory,
    pub power: u16,
    /// Percent, 0-100.
    pub accuracy: u8,
    pub max_pp: u8,
    #[serde(default)]
    pub effect: Option<MoveEffect>,
    /// Percent chance the effect triggers on a hit.
    #[serde(default = "always")]
    pub effect_chance: u8,
    #[serde(default)]
    pub description: String,
}

impl MoveData {
    pub fn is_damaging(&self) -> bool {
        self.category != MoveCategory::Status
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemKind {
    /// An API key thrown at a wild agent. `modifier` scales the capture rate.
    Capture { modifier: f64 },
    /// Restores this much context window, capped at the maximum.
    Heal { amount: u16 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemData {
    pub name: String,
    pub kind: ItemKind,
    #[serde(default)]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_effect_defaults() {
        let text = r#"(
            name: "Writer's Block",
            move_type: Creative,
            category: Status,
            power: 0,
            accuracy: 90,
            max_pp: 15,
            effect: Some(StatChange(stat: Speed, stages: -2)),
        )"#;
        let data: MoveData = ron::from_str(text).unwrap();
        assert_eq!(data.effect_chance, 100);
        assert!(!data.is_damaging());
        assert_eq!(
            data.effect,
            Some(MoveEffect::StatChange {
                stat: StatKind::Speed,
                stages: -2,
                target: EffectTarget::Opponent,
            })
        );
    }

    #[test]
    fn test_stat_kind_indices_are_distinct() {
        let mut seen: Vec<usize> = StatKind::ALL.iter().map(|stat| stat.index()).collect();
        seen.sort();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }
}
