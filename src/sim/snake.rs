//! Snake entity: segment chain, buffered steering, growth

use std::collections::VecDeque;

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::{Direction, in_bounds};

/// A live snake (player, second player or AI)
///
/// Segments run head first. The chain never becomes empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snake {
    segments: VecDeque<IVec2>,
    direction: Direction,
    pending_direction: Direction,
    /// Segments still owed to the tail
    pub growth_pending: u32,
    /// Milliseconds between discrete moves
    pub move_interval_ms: f32,
    move_timer_ms: f32,
    /// Suppresses all fatal collisions
    pub invincible: bool,
    phase_remaining_ms: f32,
    /// Per-snake cadence multiplier (speed power-up, chrono boost)
    pub speed_boost: f32,
    /// Smoothed head position for rendering (grid units)
    pub visual: Vec2,
    /// Where `visual` is heading
    pub target: Vec2,
}

impl Snake {
    pub fn new(head: IVec2, direction: Direction) -> Self {
        let mut segments = VecDeque::new();
        segments.push_back(head);
        Self {
            segments,
            direction,
            pending_direction: direction,
            growth_pending: 0,
            move_interval_ms: SNAKE_MOVE_INTERVAL_MS,
            move_timer_ms: 0.0,
            invincible: false,
            phase_remaining_ms: 0.0,
            speed_boost: 1.0,
            visual: head.as_vec2(),
            target: head.as_vec2(),
        }
    }

    /// Build a snake from an explicit segment chain (head first)
    ///
    /// Returns `None` for an empty chain.
    pub fn from_segments(segments: &[IVec2], direction: Direction) -> Option<Self> {
        let head = *segments.first()?;
        let mut snake = Self::new(head, direction);
        snake.segments = segments.iter().copied().collect();
        Some(snake)
    }

    #[inline]
    pub fn head(&self) -> IVec2 {
        // The chain is never empty
        self.segments[0]
    }

    pub fn segments(&self) -> &VecDeque<IVec2> {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn pending_direction(&self) -> Direction {
        self.pending_direction
    }

    pub fn occupies(&self, pos: IVec2) -> bool {
        self.segments.contains(&pos)
    }

    /// Buffer a new heading for the next move
    ///
    /// An exact reversal of the committed heading is dropped while the snake
    /// is longer than one segment.
    pub fn set_direction(&mut self, dir: Direction) {
        if self.segments.len() > 1 && dir == self.direction.opposite() {
            return;
        }
        self.pending_direction = dir;
    }

    /// Advance timers; performs at most one discrete move.
    ///
    /// Returns true when the snake moved this call.
    pub fn advance_tick(&mut self, dt_ms: f32, speed_factor: f32) -> bool {
        if self.phase_remaining_ms > 0.0 {
            self.phase_remaining_ms -= dt_ms;
            if self.phase_remaining_ms <= 0.0 {
                self.phase_remaining_ms = 0.0;
            }
        }

        self.move_timer_ms += dt_ms * speed_factor * self.speed_boost;
        let moved = if self.move_timer_ms >= self.move_interval_ms {
            self.move_timer_ms = 0.0;
            self.step();
            true
        } else {
            false
        };

        let t = (VISUAL_LERP_SPEED * dt_ms / 1000.0).min(1.0);
        self.visual += (self.target - self.visual) * t;

        moved
    }

    /// One discrete move: commit heading, push head, settle the tail
    pub fn step(&mut self) {
        self.direction = self.pending_direction;
        let new_head = self.head() + self.direction.delta();
        self.segments.push_front(new_head);
        if self.growth_pending > 0 {
            self.growth_pending -= 1;
        } else {
            self.segments.pop_back();
        }
        self.target = new_head.as_vec2();
    }

    pub fn grow(&mut self, amount: u32) {
        self.growth_pending += amount;
    }

    /// Head overlaps its own body (never while phasing)
    pub fn self_collided(&self) -> bool {
        if self.phase_mode() {
            return false;
        }
        let head = self.head();
        self.segments.iter().skip(1).any(|&seg| seg == head)
    }

    pub fn out_of_bounds(&self, width: i32, height: i32) -> bool {
        !in_bounds(self.head(), width, height)
    }

    /// Move only the head cell (portals, quantum tunnel wrap)
    pub fn teleport_head(&mut self, pos: IVec2) {
        self.segments[0] = pos;
        self.target = pos.as_vec2();
    }

    /// Drop up to `count` trailing segments, always keeping the head
    pub fn trim_tail(&mut self, count: usize) {
        let keep = self.segments.len().saturating_sub(count).max(1);
        self.segments.truncate(keep);
    }

    pub fn phase_mode(&self) -> bool {
        self.phase_remaining_ms > 0.0
    }

    pub fn phase_remaining_ms(&self) -> f32 {
        self.phase_remaining_ms
    }

    /// Start phasing; returns false if already phasing
    pub fn activate_phase(&mut self, duration_ms: f32) -> bool {
        if self.phase_mode() {
            return false;
        }
        self.phase_remaining_ms = duration_ms;
        true
    }
}
