//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied frame deltas only (no wall clock reads)
//! - Seeded RNG only
//! - No rendering, audio or platform dependencies

pub mod ai;
pub mod collision;
pub mod entities;
pub mod snake;
pub mod state;
pub mod tick;
pub mod timeline;

pub use ai::{AiDifficulty, AiView};
pub use collision::DeathCause;
pub use entities::{Food, FoodKind, LaserAxis, LaserGrid, MovingBlock, Portal, PowerUp, PowerUpKind};
pub use snake::Snake;
pub use state::{
    AiOpponent, Alert, GameEvent, GameMode, GamePhase, GameState, MatchConfig, Player, PlayerMode,
    PlayerSlot, TimedEffect, TimedEffectKind,
};
pub use tick::{PlayerActions, TickInput, apply_power_up, effective_speed, pickup_points, speed_for_score, tick, trigger_paradox};
pub use timeline::{EchoPlayback, EchoSample, LogicalClock, Recording, TimelineRecorder};
