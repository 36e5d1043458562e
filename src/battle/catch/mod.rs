pub mod calculation;
pub mod validation;

pub use calculation::{capture_rate, roll_capture, shake_count, CaptureRoll};
pub use validation::{can_attempt_catch, CatchError};
