//! Music and sound effects
//!
//! The [`Mixer`] remembers which track belongs to which mode and only restarts
//! playback when a mode switch actually changes the track. The sound itself is
//! produced by an [`AudioSink`]; the library ships a sink that just logs, which
//! is what tests and headless runs use.

use crate::game::ModeId;
use log::{debug, info};
use std::collections::HashMap;

/// One-shot sound effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    Click,
    Click2,
    Sword,
    Punch,
    Miss,
    Fire,
    Powerup,
    ClothBelt,
    RunAway,
    BattleWon,
}

impl SoundEffect {
    /// File stem under `assets/sound/`.
    pub fn key(self) -> &'static str {
        match self {
            SoundEffect::Click => "click",
            SoundEffect::Click2 => "click2",
            SoundEffect::Sword => "sword",
            SoundEffect::Punch => "punch",
            SoundEffect::Miss => "miss",
            SoundEffect::Fire => "fire",
            SoundEffect::Powerup => "powerup",
            SoundEffect::ClothBelt => "cloth_belt",
            SoundEffect::RunAway => "run_away",
            SoundEffect::BattleWon => "battle_won",
        }
    }
}

/// Whatever actually makes noise.
pub trait AudioSink {
    fn play_music(&mut self, track: &str);
    fn stop_music(&mut self);
    fn play_sound(&mut self, effect: SoundEffect);
}

/// Sink that only writes to the log.
#[derive(Debug, Default)]
pub struct LogSink;

impl AudioSink for LogSink {
    fn play_music(&mut self, track: &str) {
        info!("music: {}", track);
    }

    fn stop_music(&mut self) {
        info!("music stopped");
    }

    fn play_sound(&mut self, effect: SoundEffect) {
        debug!("sound: {}", effect.key());
    }
}

pub struct Mixer {
    songs: HashMap<ModeId, Option<String>>,
    current: Option<String>,
    effects: Vec<SoundEffect>,
    sink: Box<dyn AudioSink>,
}

impl Mixer {
    pub fn new(sink: Box<dyn AudioSink>) -> Self {
        Mixer {
            songs: HashMap::new(),
            current: None,
            effects: Vec::new(),
            sink,
        }
    }

    /// Associates a track with a mode. `None` means silence.
    pub fn set_level_song(&mut self, mode: ModeId, track: Option<&str>) {
        self.songs.insert(mode, track.map(str::to_string));
    }

    pub fn song_for(&self, mode: ModeId) -> Option<&str> {
        self.songs.get(&mode).and_then(|track| track.as_deref())
    }

    /// Switches to the mode's track if it differs from what is playing.
    /// Modes without an entry keep the current music.
    pub fn play(&mut self, mode: ModeId) {
        let Some(track) = self.songs.get(&mode) else {
            return;
        };
        if *track == self.current {
            return;
        }

        match track {
            Some(name) => self.sink.play_music(name),
            None => self.sink.stop_music(),
        }
        self.current = track.clone();
    }

    pub fn current_track(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn play_effect(&mut self, effect: SoundEffect) {
        self.effects.push(effect);
        self.sink.play_sound(effect);
    }

    /// Drains the effects played since the last call.
    pub fn take_effects(&mut self) -> Vec<SoundEffect> {
        std::mem::take(&mut self.effects)
    }
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new(Box::new(LogSink))
    }
}
