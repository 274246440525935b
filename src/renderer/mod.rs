//! Rendering interface
//!
//! Renderers are read-only consumers of the simulation. Each frame they get a
//! borrowed [`Frame`] plus a [`RenderConfig`] value; there is no global style
//! state. A text renderer ships for headless runs and tests.

pub mod ascii;
pub mod theme;

pub use ascii::AsciiRenderer;
pub use theme::{Palette, Skin, Theme};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::{GameMode, GameState, PlayerSlot, TimedEffectKind};

/// Presentation options chosen by the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RenderConfig {
    pub theme: Theme,
    pub skin: Skin,
    /// Disable shake and chromatic effects
    #[serde(default)]
    pub reduced_motion: bool,
}

impl RenderConfig {
    pub fn palette(&self) -> Palette {
        Palette::new(self.theme, self.skin)
    }
}

/// Heads-up display values derived from the state
#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub scores: [u64; 2],
    pub combo: u32,
    pub multiplier: u32,
    pub paradox_remaining_ms: Option<f32>,
    /// Recorder fill (0..=1) for player one
    pub timeline_progress: f32,
    pub saved_timelines: usize,
    /// Timed power-ups with their remaining time
    pub active_effects: Vec<(&'static str, f64)>,
    pub time_remaining_ms: Option<f32>,
}

/// Read-only view of one simulation frame
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub state: &'a GameState,
}

impl<'a> Frame<'a> {
    pub fn new(state: &'a GameState) -> Self {
        Self { state }
    }

    pub fn hud(&self) -> Hud {
        let state = self.state;
        let p1 = state.player(PlayerSlot::One);
        let active_effects = state
            .active_effects
            .iter()
            .filter_map(|e| match e.kind {
                TimedEffectKind::PowerUp(kind) => {
                    Some((kind.label(), (e.expires_at_ms - state.clock_ms).max(0.0)))
                }
                _ => None,
            })
            .collect();
        Hud {
            scores: [p1.score, state.player(PlayerSlot::Two).score],
            combo: state.combo,
            multiplier: state.multiplier,
            paradox_remaining_ms: state.paradox_mode.then_some(state.paradox_timer_ms),
            timeline_progress: p1.recorder.as_ref().map(|r| r.progress()).unwrap_or(0.0),
            saved_timelines: p1.saved_timelines.len(),
            active_effects,
            time_remaining_ms: (state.mode == GameMode::TimeTrial).then_some(state.time_trial_remaining_ms),
        }
    }

    /// Camera offset in grid units for the current screen shake
    pub fn shake_offset(&self, config: &RenderConfig, time_ms: f64) -> Vec2 {
        if config.reduced_motion || self.state.screen_shake <= 0.0 {
            return Vec2::ZERO;
        }
        let t = (time_ms / 1000.0) as f32;
        // Pixel-scale magnitude mapped to cells
        let magnitude = self.state.screen_shake / 20.0;
        Vec2::new((t * 71.0).sin(), (t * 53.0).cos()) * magnitude
    }

    /// Chromatic aberration strength (0..=1)
    pub fn aberration(&self, config: &RenderConfig) -> f32 {
        if config.reduced_motion {
            0.0
        } else {
            self.state.chromatic_aberration.clamp(0.0, 1.0)
        }
    }
}

/// Anything that can draw a frame
pub trait Renderer {
    type Output;

    fn render(&mut self, frame: &Frame<'_>, config: &RenderConfig, time_ms: f64) -> Self::Output;
}
