//! Custom level definitions and share codes
//!
//! A level is plain JSON (walls, lasers, portals and two spawn points). The
//! share code is the standard base64 encoding of that JSON, so codes can be
//! pasted between players.

use base64::{Engine as _, engine::general_purpose};
use glam::IVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{GRID_HEIGHT, GRID_WIDTH};
use crate::in_bounds;
use crate::sim::LaserAxis;

/// Errors that can occur while importing a level
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("Share code is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Share code is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Level JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{what} at ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        what: &'static str,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },

    #[error("Laser at ({x}, {y}) has non-positive length {length}")]
    InvalidLaserLength { x: i32, y: i32, length: i32 },

    #[error("Portal at ({x}, {y}) links to itself")]
    DegeneratePortal { x: i32, y: i32 },
}

/// Integer grid coordinate as stored in level JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<GridPoint> for IVec2 {
    fn from(p: GridPoint) -> Self {
        IVec2::new(p.x, p.y)
    }
}

impl From<IVec2> for GridPoint {
    fn from(v: IVec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

fn default_laser_length() -> i32 {
    3
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaserSpec {
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub direction: LaserAxis,
    #[serde(default = "default_laser_length")]
    pub length: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalSpec {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

fn default_spawn1() -> GridPoint {
    GridPoint::new(4, GRID_HEIGHT / 2)
}

fn default_spawn2() -> GridPoint {
    GridPoint::new(GRID_WIDTH - 5, GRID_HEIGHT / 2)
}

/// A custom level layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDefinition {
    #[serde(default)]
    pub walls: Vec<GridPoint>,
    #[serde(default)]
    pub lasers: Vec<LaserSpec>,
    #[serde(default)]
    pub portals: Vec<PortalSpec>,
    #[serde(default = "default_spawn1")]
    pub spawn1: GridPoint,
    #[serde(default = "default_spawn2")]
    pub spawn2: GridPoint,
}

impl Default for LevelDefinition {
    fn default() -> Self {
        Self {
            walls: Vec::new(),
            lasers: Vec::new(),
            portals: Vec::new(),
            spawn1: default_spawn1(),
            spawn2: default_spawn2(),
        }
    }
}

/// A named level as kept in the saved-levels list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedLevel {
    pub name: String,
    pub data: LevelDefinition,
    /// Creation time (ms since the Unix epoch)
    #[serde(default)]
    pub created: u64,
}

impl LevelDefinition {
    /// Empty layout with spawns placed for a `width` x `height` grid
    pub fn empty(width: i32, height: i32) -> Self {
        Self {
            spawn1: GridPoint::new(4.min(width - 1), height / 2),
            spawn2: GridPoint::new((width - 5).max(0), height / 2),
            ..Default::default()
        }
    }

    /// Encode as a share code
    pub fn to_code(&self) -> Result<String, LevelError> {
        let json = serde_json::to_string(self)?;
        Ok(general_purpose::STANDARD.encode(json))
    }

    /// Decode, parse and validate a share code against the grid size
    pub fn from_code(code: &str, width: i32, height: i32) -> Result<Self, LevelError> {
        let bytes = general_purpose::STANDARD.decode(code.trim())?;
        let json = String::from_utf8(bytes)?;
        Self::from_json(&json, width, height)
    }

    pub fn from_json(json: &str, width: i32, height: i32) -> Result<Self, LevelError> {
        let level: LevelDefinition = serde_json::from_str(json)?;
        level.validate(width, height)?;
        Ok(level)
    }

    /// Check every coordinate lies on the grid and every laser has a length
    pub fn validate(&self, width: i32, height: i32) -> Result<(), LevelError> {
        let check = |what: &'static str, x: i32, y: i32| {
            if in_bounds(IVec2::new(x, y), width, height) {
                Ok(())
            } else {
                Err(LevelError::OutOfBounds {
                    what,
                    x,
                    y,
                    width,
                    height,
                })
            }
        };

        for wall in &self.walls {
            check("Wall", wall.x, wall.y)?;
        }
        for laser in &self.lasers {
            check("Laser", laser.x, laser.y)?;
            if laser.length <= 0 {
                return Err(LevelError::InvalidLaserLength {
                    x: laser.x,
                    y: laser.y,
                    length: laser.length,
                });
            }
        }
        for portal in &self.portals {
            check("Portal entry", portal.x1, portal.y1)?;
            check("Portal exit", portal.x2, portal.y2)?;
            if (portal.x1, portal.y1) == (portal.x2, portal.y2) {
                return Err(LevelError::DegeneratePortal {
                    x: portal.x1,
                    y: portal.y1,
                });
            }
        }
        check("Spawn 1", self.spawn1.x, self.spawn1.y)?;
        check("Spawn 2", self.spawn2.x, self.spawn2.y)?;
        Ok(())
    }

    // --- Editing ---

    /// Place a wall; returns false if one is already there
    pub fn add_wall(&mut self, pos: GridPoint) -> bool {
        if self.walls.contains(&pos) {
            return false;
        }
        self.walls.push(pos);
        true
    }

    /// Place a default horizontal laser of length 3
    pub fn add_laser(&mut self, pos: GridPoint) -> bool {
        if self.lasers.iter().any(|l| l.x == pos.x && l.y == pos.y) {
            return false;
        }
        self.lasers.push(LaserSpec {
            x: pos.x,
            y: pos.y,
            direction: LaserAxis::Horizontal,
            length: default_laser_length(),
        });
        true
    }

    pub fn add_portal(&mut self, entry: GridPoint, exit: GridPoint) -> bool {
        if entry == exit {
            return false;
        }
        self.portals.push(PortalSpec {
            x1: entry.x,
            y1: entry.y,
            x2: exit.x,
            y2: exit.y,
        });
        true
    }

    /// Remove every wall, laser and portal touching `pos`
    pub fn erase_at(&mut self, pos: GridPoint) {
        self.walls.retain(|&w| w != pos);
        self.lasers.retain(|l| (l.x, l.y) != (pos.x, pos.y));
        self.portals
            .retain(|p| (p.x1, p.y1) != (pos.x, pos.y) && (p.x2, p.y2) != (pos.x, pos.y));
    }
}
