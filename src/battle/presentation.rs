//! Requests the engine makes of whatever draws and plays the battle.
//!
//! The engine never waits on the sink. Narration is paged by the host
//! sending Confirm to `Encounter::advance`, which plays the role of the
//! resume continuation.

use crate::battle::state::Side;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationCue {
    HitShake(Side),
    SuperEffectiveFlash(Side),
    /// One wobble of the capture item.
    CaptureShake,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    Select,
    Cursor,
    Hit,
    SuperEffective,
    NotEffective,
    Capture,
    CaptureFail,
    LevelUp,
    Faint,
    Evolution,
}

pub trait PresentationSink {
    /// A new batch of narration is on screen, starting at its first line.
    fn show_messages(&mut self, lines: &[String]);
    fn play_animation(&mut self, cue: AnimationCue);
    fn play_sound(&mut self, cue: SoundCue);
}

/// Discards every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl PresentationSink for NullSink {
    fn show_messages(&mut self, _lines: &[String]) {}
    fn play_animation(&mut self, _cue: AnimationCue) {}
    fn play_sound(&mut self, _cue: SoundCue) {}
}

/// Keeps every request in order, for tests and headless hosts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingSink {
    pub messages: Vec<String>,
    pub animations: Vec<AnimationCue>,
    pub sounds: Vec<SoundCue>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_message(&self, line: &str) -> bool {
        self.messages.iter().any(|message| message == line)
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.animations.clear();
        self.sounds.clear();
    }
}

impl PresentationSink for RecordingSink {
    fn show_messages(&mut self, lines: &[String]) {
        self.messages.extend_from_slice(lines);
    }

    fn play_animation(&mut self, cue: AnimationCue) {
        self.animations.push(cue);
    }

    fn play_sound(&mut self, cue: SoundCue) {
        self.sounds.push(cue);
    }
}
