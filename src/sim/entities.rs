//! World entities: collectibles, portals and hazards

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::snake::Snake;
use crate::consts::*;

/// Food types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FoodKind {
    #[default]
    Normal,
    /// Temporal bonus fruit
    Chrono,
}

impl FoodKind {
    pub fn base_points(self) -> u64 {
        match self {
            FoodKind::Normal => NORMAL_FOOD_POINTS,
            FoodKind::Chrono => CHRONO_FOOD_POINTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub pos: IVec2,
    pub kind: FoodKind,
}

impl Food {
    pub fn new(pos: IVec2, kind: FoodKind) -> Self {
        Self { pos, kind }
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    TimeDilation,
    EchoMagnet,
    QuantumTunnel,
    Rewind,
    SpeedBoost,
    Multiplier,
    Invincibility,
    FoodFrenzy,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 8] = [
        PowerUpKind::TimeDilation,
        PowerUpKind::EchoMagnet,
        PowerUpKind::QuantumTunnel,
        PowerUpKind::Rewind,
        PowerUpKind::SpeedBoost,
        PowerUpKind::Multiplier,
        PowerUpKind::Invincibility,
        PowerUpKind::FoodFrenzy,
    ];

    /// Effect duration in ms; 0 means the effect is instantaneous
    pub fn duration_ms(self) -> f64 {
        match self {
            PowerUpKind::TimeDilation => 10_000.0,
            PowerUpKind::EchoMagnet => 8_000.0,
            PowerUpKind::QuantumTunnel => 0.0,
            PowerUpKind::Rewind => 0.0,
            PowerUpKind::SpeedBoost => 8_000.0,
            PowerUpKind::Multiplier => 15_000.0,
            PowerUpKind::Invincibility => 5_000.0,
            PowerUpKind::FoodFrenzy => 10_000.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PowerUpKind::TimeDilation => "TIME DILATION",
            PowerUpKind::EchoMagnet => "ECHO MAGNET",
            PowerUpKind::QuantumTunnel => "QUANTUM TUNNEL",
            PowerUpKind::Rewind => "TIMELINE REWIND",
            PowerUpKind::SpeedBoost => "SPEED BOOST",
            PowerUpKind::Multiplier => "SCORE x2",
            PowerUpKind::Invincibility => "INVINCIBLE",
            PowerUpKind::FoodFrenzy => "FOOD FRENZY",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub pos: IVec2,
    pub kind: PowerUpKind,
}

impl PowerUp {
    pub fn new(pos: IVec2, kind: PowerUpKind) -> Self {
        Self { pos, kind }
    }
}

/// Linked pair of cells with limited uses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portal {
    pub entry: IVec2,
    pub exit: IVec2,
    pub uses: u32,
    pub cooldown_ms: f32,
}

impl Portal {
    pub fn new(entry: IVec2, exit: IVec2) -> Self {
        Self::with_uses(entry, exit, PORTAL_USES)
    }

    pub fn with_uses(entry: IVec2, exit: IVec2, uses: u32) -> Self {
        Self {
            entry,
            exit,
            uses,
            cooldown_ms: 0.0,
        }
    }

    pub fn update(&mut self, dt_ms: f32) {
        if self.cooldown_ms > 0.0 {
            self.cooldown_ms -= dt_ms;
        }
    }

    /// Move the snake's head to the paired endpoint.
    ///
    /// Fails without side effects when cooling down, depleted, or when the
    /// head is on neither endpoint.
    pub fn teleport(&mut self, snake: &mut Snake) -> bool {
        if self.cooldown_ms > 0.0 || self.uses == 0 {
            return false;
        }
        let head = snake.head();
        let destination = if head == self.entry {
            self.exit
        } else if head == self.exit {
            self.entry
        } else {
            return false;
        };
        snake.teleport_head(destination);
        self.cooldown_ms = PORTAL_COOLDOWN_MS;
        self.uses -= 1;
        true
    }

    pub fn is_depleted(&self) -> bool {
        self.uses == 0
    }

    pub fn touches(&self, pos: IVec2) -> bool {
        self.entry == pos || self.exit == pos
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaserAxis {
    #[default]
    Horizontal,
    Vertical,
}

/// Beam that toggles between hazardous and safe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaserGrid {
    pub origin: IVec2,
    pub axis: LaserAxis,
    pub length: i32,
    pub on_ms: f32,
    pub off_ms: f32,
    active: bool,
    timer_ms: f32,
}

impl LaserGrid {
    pub fn new(origin: IVec2, axis: LaserAxis, length: i32) -> Self {
        Self {
            origin,
            axis,
            length,
            on_ms: LASER_ON_MS,
            off_ms: LASER_OFF_MS,
            active: true,
            timer_ms: 0.0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn update(&mut self, dt_ms: f32) {
        self.timer_ms += dt_ms;
        if self.active && self.timer_ms >= self.on_ms {
            self.active = false;
            self.timer_ms = 0.0;
        } else if !self.active && self.timer_ms >= self.off_ms {
            self.active = true;
            self.timer_ms = 0.0;
        }
    }

    /// Whether `pos` lies on the beam, regardless of duty state
    pub fn covers(&self, pos: IVec2) -> bool {
        match self.axis {
            LaserAxis::Horizontal => {
                pos.y == self.origin.y && pos.x >= self.origin.x && pos.x < self.origin.x + self.length
            }
            LaserAxis::Vertical => {
                pos.x == self.origin.x && pos.y >= self.origin.y && pos.y < self.origin.y + self.length
            }
        }
    }

    /// Hazard test, only while the beam is on
    pub fn hits(&self, pos: IVec2) -> bool {
        self.active && self.covers(pos)
    }

    pub fn cells(&self) -> impl Iterator<Item = IVec2> + '_ {
        let step = match self.axis {
            LaserAxis::Horizontal => IVec2::X,
            LaserAxis::Vertical => IVec2::Y,
        };
        (0..self.length.max(0)).map(move |i| self.origin + step * i)
    }
}

/// Block patrolling a cyclic waypoint path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingBlock {
    pub pos: IVec2,
    path: Vec<IVec2>,
    path_index: usize,
    timer_ms: f32,
    pub step_interval_ms: f32,
}

impl MovingBlock {
    /// `None` for an empty path
    pub fn new(path: Vec<IVec2>) -> Option<Self> {
        let pos = *path.first()?;
        Some(Self {
            pos,
            path,
            path_index: 0,
            timer_ms: 0.0,
            step_interval_ms: BLOCK_STEP_MS,
        })
    }

    /// Square loop of side `size` starting at `corner`
    pub fn square_patrol(corner: IVec2, size: i32) -> Self {
        let path = vec![
            corner,
            corner + IVec2::new(size, 0),
            corner + IVec2::new(size, size),
            corner + IVec2::new(0, size),
        ];
        Self {
            pos: corner,
            path,
            path_index: 0,
            timer_ms: 0.0,
            step_interval_ms: BLOCK_STEP_MS,
        }
    }

    pub fn path(&self) -> &[IVec2] {
        &self.path
    }

    pub fn update(&mut self, dt_ms: f32) {
        if self.path.is_empty() {
            return;
        }
        self.timer_ms += dt_ms;
        if self.timer_ms >= self.step_interval_ms {
            self.timer_ms = 0.0;
            self.path_index = (self.path_index + 1) % self.path.len();
            self.pos = self.path[self.path_index];
        }
    }

    pub fn hits(&self, pos: IVec2) -> bool {
        self.pos == pos
    }
}
