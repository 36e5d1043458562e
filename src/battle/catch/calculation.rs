use crate::agent::AgentInst;
use crate::battle::state::BattleRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A rate at or above this always captures.
pub const GUARANTEED_CAPTURE_RATE: u32 = 255;
/// Shakes needed for a capture.
pub const SHAKES_TO_CAPTURE: u8 = 3;
/// Any status makes the target easier to capture.
pub const STATUS_CAPTURE_BONUS: f64 = 1.5;

/// Outcome of one capture attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRoll {
    pub rate: u32,
    pub shakes: u8,
    pub caught: bool,
}

/// Formula: floor(catch_rate × (3 − 2 × vitality ratio) × status bonus × item modifier / 3)
pub fn capture_rate(target: &AgentInst, species_catch_rate: u8, item_modifier: f64) -> u32 {
    let vitality_ratio = target.vitality() as f64 / target.max_vitality().max(1) as f64;
    let vitality_factor = 3.0 - 2.0 * vitality_ratio;
    let status_factor = if target.status.is_some() {
        STATUS_CAPTURE_BONUS
    } else {
        1.0
    };
    (species_catch_rate as f64 * vitality_factor * status_factor * item_modifier / 3.0).floor()
        as u32
}

/// Three shakes without a roll once the rate is guaranteed, otherwise
/// min(3, floor(4 × rate × U / 255)).
pub fn shake_count(rate: u32, rng: &mut BattleRng) -> u8 {
    if rate >= GUARANTEED_CAPTURE_RATE {
        return SHAKES_TO_CAPTURE;
    }
    let roll = rng.next_unit("capture shakes");
    let shakes = (4.0 * rate as f64 * roll / GUARANTEED_CAPTURE_RATE as f64).floor() as u8;
    shakes.min(SHAKES_TO_CAPTURE)
}

pub fn roll_capture(
    target: &AgentInst,
    species_catch_rate: u8,
    item_modifier: f64,
    rng: &mut BattleRng,
) -> CaptureRoll {
    let rate = capture_rate(target, species_catch_rate, item_modifier);
    let shakes = shake_count(rate, rng);
    let roll = CaptureRoll {
        rate,
        shakes,
        caught: shakes >= SHAKES_TO_CAPTURE,
    };
    debug!(target = %target.nickname, ?roll, "capture rolled");
    roll
}
