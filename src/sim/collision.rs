//! Collision predicates for grid entities
//!
//! Pure tests only. The fixed precedence in which these are evaluated, and
//! what a hit does to the match, lives in `tick`.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::entities::{LaserGrid, MovingBlock};
use super::snake::Snake;
use super::timeline::EchoPlayback;

/// Why a snake died
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Boundary,
    SelfBite,
    Wall,
    OtherPlayer,
    Laser,
    MovingBlock,
    AiBody,
}

impl DeathCause {
    pub fn describe(self) -> &'static str {
        match self {
            DeathCause::Boundary => "left the grid",
            DeathCause::SelfBite => "bit itself",
            DeathCause::Wall => "hit a wall",
            DeathCause::OtherPlayer => "hit the other player",
            DeathCause::Laser => "crossed a live laser",
            DeathCause::MovingBlock => "hit a moving block",
            DeathCause::AiBody => "hit the AI snake",
        }
    }
}

/// Head lands on any segment of `other`
#[inline]
pub fn head_hits_body(head: IVec2, other: &Snake) -> bool {
    other.occupies(head)
}

pub fn head_hits_wall(head: IVec2, walls: &[IVec2]) -> bool {
    walls.contains(&head)
}

/// Any live echo overlaps the head
pub fn head_hits_echo(head: IVec2, echoes: &[EchoPlayback]) -> bool {
    echoes.iter().any(|e| e.collides_with(head))
}

pub fn head_hits_laser(head: IVec2, lasers: &[LaserGrid]) -> bool {
    lasers.iter().any(|l| l.hits(head))
}

pub fn head_hits_block(head: IVec2, blocks: &[MovingBlock]) -> bool {
    blocks.iter().any(|b| b.hits(head))
}

/// Cells that count as obstacles for AI planning
pub fn obstacle_cells(walls: &[IVec2], lasers: &[LaserGrid], blocks: &[MovingBlock]) -> Vec<IVec2> {
    let mut cells: Vec<IVec2> = walls.to_vec();
    cells.extend(lasers.iter().map(|l| l.origin));
    cells.extend(blocks.iter().map(|b| b.pos));
    cells
}
