//! Sound events and audio sinks
//!
//! The simulation never plays audio itself. It emits [`GameEvent`]s, and
//! [`dispatch_events`] turns the audible ones into [`SoundEvent`]s for
//! whichever [`AudioSink`] the front end installed. Each sound carries a
//! procedural tone recipe so a synthesizer backend needs no sample files.

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEvent {
    /// Food eaten; pitch rises with the combo
    Eat { combo: u32 },
    /// Timeline saved as an echo
    Echo,
    Paradox,
    Death,
    PowerUp,
    Portal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
}

/// Oscillator sweep with an exponential gain decay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneSpec {
    pub waveform: Waveform,
    pub start_hz: f32,
    pub end_hz: f32,
    /// Peak gain before master/sfx volume
    pub gain: f32,
    pub duration_s: f32,
}

impl SoundEvent {
    pub fn tone(self) -> ToneSpec {
        let (waveform, start_hz, end_hz, gain, duration_s) = match self {
            SoundEvent::Eat { combo } => (Waveform::Sine, 400.0 + combo as f32 * 50.0, 800.0, 0.2, 0.15),
            SoundEvent::Echo => (Waveform::Sawtooth, 200.0, 100.0, 0.15, 0.3),
            SoundEvent::Paradox => (Waveform::Square, 150.0, 50.0, 0.25, 0.5),
            SoundEvent::Death => (Waveform::Sawtooth, 400.0, 50.0, 0.3, 0.8),
            SoundEvent::PowerUp => (Waveform::Sine, 300.0, 600.0, 0.2, 0.3),
            SoundEvent::Portal => (Waveform::Sine, 200.0, 800.0, 0.15, 0.4),
        };
        ToneSpec {
            waveform,
            start_hz,
            end_hz,
            gain,
            duration_s,
        }
    }

    /// Audible counterpart of a game event, if any
    pub fn from_game_event(event: &GameEvent) -> Option<Self> {
        match *event {
            GameEvent::Eat { combo, .. } => Some(SoundEvent::Eat { combo }),
            GameEvent::EchoSaved { .. } => Some(SoundEvent::Echo),
            GameEvent::Paradox => Some(SoundEvent::Paradox),
            GameEvent::Death { .. } => Some(SoundEvent::Death),
            GameEvent::PowerUp { .. } => Some(SoundEvent::PowerUp),
            GameEvent::Portal => Some(SoundEvent::Portal),
            GameEvent::AiDeath | GameEvent::Alert(_) | GameEvent::MatchOver { .. } => None,
        }
    }
}

/// Anything that can play sound events
pub trait AudioSink {
    fn play(&mut self, event: SoundEvent);
}

/// Discards every sound
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _event: SoundEvent) {}
}

/// Writes each sound to the log (headless runs)
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAudio;

impl AudioSink for LogAudio {
    fn play(&mut self, event: SoundEvent) {
        let tone = event.tone();
        log::debug!(
            "♪ {:?}: {:?} {:.0}->{:.0}Hz for {:.2}s",
            event,
            tone.waveform,
            tone.start_hz,
            tone.end_hz,
            tone.duration_s
        );
    }
}

/// Collects sounds in order
impl AudioSink for Vec<SoundEvent> {
    fn play(&mut self, event: SoundEvent) {
        self.push(event);
    }
}

/// Volume and mute control in front of another sink
#[derive(Debug, Clone)]
pub struct AudioMixer<S> {
    sink: S,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl<S: AudioSink> AudioMixer<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

impl<S: AudioSink> AudioSink for AudioMixer<S> {
    fn play(&mut self, event: SoundEvent) {
        if self.effective_volume() <= 0.0 {
            return;
        }
        self.sink.play(event);
    }
}

/// Play every audible event in order; returns how many sounds were sent
pub fn dispatch_events(events: &[GameEvent], sink: &mut impl AudioSink) -> usize {
    let mut played = 0;
    for sound in events.iter().filter_map(SoundEvent::from_game_event) {
        sink.play(sound);
        played += 1;
    }
    played
}
