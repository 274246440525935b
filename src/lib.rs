//! Chrono Serpent - A time-travel snake arcade game
//!
//! Core modules:
//! - `sim`: Simulation core (snakes, echoes, world entities, tick pipeline)
//! - `level`: Custom level definitions and share codes
//! - `renderer`: Read-only frame consumers and render configuration
//! - `audio`: Sound event sinks
//! - `persistence`: Saved levels and high score storage
//! - `platform`: Frame clock for display-refresh driven ticking

pub mod audio;
pub mod highscores;
pub mod level;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use highscores::HighScores;
pub use level::{LevelDefinition, LevelError};
pub use settings::Settings;

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// A cell on the game grid
pub type Position = IVec2;

/// Game configuration constants
pub mod consts {
    /// Default grid dimensions
    pub const GRID_WIDTH: i32 = 16;
    pub const GRID_HEIGHT: i32 = 16;

    /// Largest frame delta fed to the simulation (ms), guards against tab-out stalls
    pub const MAX_FRAME_DT_MS: f32 = 100.0;

    /// Snake defaults
    pub const SNAKE_MOVE_INTERVAL_MS: f32 = 150.0;
    pub const GROWTH_PER_FOOD: u32 = 3;
    /// Visual interpolation rate (per second)
    pub const VISUAL_LERP_SPEED: f32 = 15.0;

    /// Timeline / echoes
    pub const MAX_ECHOES: usize = 5;
    pub const ECHO_RECORD_TIME_MS: f64 = 30_000.0;
    /// A saved timeline must hold more samples than this
    pub const MIN_ECHO_SAMPLES: usize = 30;

    /// Paradox mode
    pub const PARADOX_DURATION_MS: f32 = 5_000.0;
    pub const PARADOX_MULTIPLIER: u32 = 5;
    pub const PARADOX_SPEED_FACTOR: f32 = 2.0;
    pub const PARADOX_SCREEN_SHAKE: f32 = 20.0;

    /// Power-up tuning
    pub const TIME_DILATION_FACTOR: f32 = 0.5;
    pub const SPEED_BOOST_FACTOR: f32 = 1.5;
    pub const REWIND_MIN_LENGTH: usize = 4;
    pub const REWIND_SEGMENTS: usize = 3;

    /// Scoring
    pub const COMBO_WINDOW_MS: f32 = 2_000.0;
    pub const NORMAL_FOOD_POINTS: u64 = 10;
    pub const CHRONO_FOOD_POINTS: u64 = 50;
    pub const MULTIPLIER_CAP: u32 = 10;

    /// Portals
    pub const PORTAL_USES: u32 = 5;
    pub const PORTAL_COOLDOWN_MS: f32 = 500.0;
    pub const MAX_PORTALS: usize = 3;

    /// Hazards
    pub const LASER_ON_MS: f32 = 1_000.0;
    pub const LASER_OFF_MS: f32 = 1_000.0;
    pub const BLOCK_STEP_MS: f32 = 500.0;

    /// Actions
    pub const PHASE_MODE_MS: f32 = 2_000.0;
    pub const CHRONO_BOOST_MS: f64 = 2_000.0;
    pub const CHRONO_BOOST_FACTOR: f32 = 1.5;
    pub const QUANTUM_TUNNEL_WINDOW_MS: f64 = 3_000.0;

    /// AI
    pub const AI_RESPAWN_DELAY_MS: f64 = 2_000.0;
    pub const AI_BLOCK_CHANCE: f32 = 0.3;

    /// Spawning
    pub const SPAWN_ATTEMPTS: u32 = 100;
    pub const CHRONO_SPAWN_CHANCE: f32 = 0.15;
    pub const POWERUP_SPAWN_CHANCE: f32 = 0.08;
    pub const PORTAL_SPAWN_CHANCE: f32 = 0.05;
    pub const FRENZY_EXTRA_FOOD_CHANCE: f32 = 0.5;
    pub const FRENZY_BURST: usize = 5;
    pub const HAZARD_SPAWN_CHANCE: f32 = 0.3;

    /// Difficulty ramp
    pub const SPEED_STEP_SCORE: u64 = 100;
    pub const SPEED_STEP: f32 = 0.05;
    pub const HAZARD_MILESTONE_SCORE: u64 = 200;

    /// Time trial length
    pub const TIME_TRIAL_MS: f32 = 60_000.0;
}

/// One of the four grid headings (no diagonals)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit step on the grid (y grows downward)
    #[inline]
    pub fn delta(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }

    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Build from a unit delta, `None` for anything that is not a cardinal step
    pub fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        match (dx, dy) {
            (0, -1) => Some(Direction::Up),
            (0, 1) => Some(Direction::Down),
            (-1, 0) => Some(Direction::Left),
            (1, 0) => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Whether `pos` lies inside [0, width) x [0, height)
#[inline]
pub fn in_bounds(pos: IVec2, width: i32, height: i32) -> bool {
    pos.x >= 0 && pos.x < width && pos.y >= 0 && pos.y < height
}

/// Grid (taxicab) distance
#[inline]
pub fn manhattan(a: IVec2, b: IVec2) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// Wrap an out-of-bounds position onto the opposite edge
pub fn wrap_to_grid(pos: IVec2, width: i32, height: i32) -> IVec2 {
    let mut wrapped = pos;
    if pos.x < 0 {
        wrapped.x = width - 1;
    } else if pos.x >= width {
        wrapped.x = 0;
    }
    if pos.y < 0 {
        wrapped.y = height - 1;
    } else if pos.y >= height {
        wrapped.y = 0;
    }
    wrapped
}
