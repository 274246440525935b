//! AI opponent steering policies
//!
//! Each policy is a pure function of the world view plus one random roll, and
//! returns the heading the AI should buffer before its next move.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::entities::Food;
use crate::{Direction, manhattan};

/// AI opponent difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiDifficulty {
    #[default]
    Learner,
    Strategist,
    Master,
}

impl AiDifficulty {
    /// Milliseconds between AI moves
    pub fn move_interval_ms(self) -> f32 {
        match self {
            AiDifficulty::Learner => 200.0,
            AiDifficulty::Strategist => 130.0,
            AiDifficulty::Master => 100.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AiDifficulty::Learner => "learner",
            AiDifficulty::Strategist => "strategist",
            AiDifficulty::Master => "master",
        }
    }

    /// Case-insensitive name, also accepting easy / medium / hard
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "learner" | "easy" => Some(AiDifficulty::Learner),
            "strategist" | "medium" => Some(AiDifficulty::Strategist),
            "master" | "hard" => Some(AiDifficulty::Master),
            _ => None,
        }
    }
}

/// What the AI can see when deciding
#[derive(Debug, Clone, Copy)]
pub struct AiView<'a> {
    pub head: IVec2,
    pub food: &'a [Food],
    /// Head of the opposing player, if alive
    pub opponent_head: Option<IVec2>,
    /// Known obstacle cells (walls, laser origins, blocks)
    pub obstacles: &'a [IVec2],
}

/// Pick a heading for the AI, `None` when there is nothing to chase.
///
/// `roll` is a uniform sample in [0, 1) used by the strategist's block check.
pub fn decide(difficulty: AiDifficulty, view: &AiView<'_>, roll: f32) -> Option<Direction> {
    let target = match difficulty {
        AiDifficulty::Learner => nearest_food(view.head, view.food),
        AiDifficulty::Strategist => strategist_target(view, roll),
        AiDifficulty::Master => master_target(view),
    }?;
    steer_toward(view.head, target)
}

/// Manhattan-nearest food; earliest wins ties
pub fn nearest_food(from: IVec2, food: &[Food]) -> Option<IVec2> {
    food.iter()
        .map(|f| f.pos)
        .min_by_key(|&pos| manhattan(from, pos))
}

fn strategist_target(view: &AiView<'_>, roll: f32) -> Option<IVec2> {
    if roll < crate::consts::AI_BLOCK_CHANCE {
        if let Some(opponent) = view.opponent_head {
            if let Some(contested) = nearest_food(opponent, view.food) {
                if manhattan(view.head, contested) < manhattan(opponent, contested) {
                    return Some(contested);
                }
            }
        }
    }
    nearest_food(view.head, view.food)
}

/// Master score: closer is better, plus a bonus for food that is neither on
/// nor orthogonally next to a known obstacle.
///
/// The AI's own body is not treated as an obstacle.
pub fn master_score(head: IVec2, food: IVec2, obstacles: &[IVec2]) -> i32 {
    let near_obstacle = obstacles.iter().any(|&o| manhattan(o, food) <= 1);
    let safe_bonus = if near_obstacle { 0 } else { 50 };
    (100 - manhattan(head, food)) + safe_bonus
}

fn master_target(view: &AiView<'_>) -> Option<IVec2> {
    let mut best: Option<(IVec2, i32)> = None;
    for f in view.food {
        let score = master_score(view.head, f.pos, view.obstacles);
        if best.is_none_or(|(_, s)| score > s) {
            best = Some((f.pos, score));
        }
    }
    best.map(|(pos, _)| pos)
}

/// Close the larger axis gap first
pub fn steer_toward(from: IVec2, target: IVec2) -> Option<Direction> {
    let d = target - from;
    if d.x.abs() > d.y.abs() {
        Some(if d.x > 0 { Direction::Right } else { Direction::Left })
    } else if d.y != 0 {
        Some(if d.y > 0 { Direction::Down } else { Direction::Up })
    } else if d.x != 0 {
        Some(if d.x > 0 { Direction::Right } else { Direction::Left })
    } else {
        None
    }
}
