//! Text renderer for terminals, logs and tests

use std::fmt::Write as _;

use glam::IVec2;

use super::theme::Color;
use super::{Frame, RenderConfig, Renderer};
use crate::sim::{FoodKind, LaserAxis, PlayerMode, PlayerSlot};

/// Draws the grid as characters, one row per line, followed by a HUD line.
///
/// Later layers overwrite earlier ones: hazards, then pickups, echoes and
/// finally snakes.
#[derive(Debug, Clone, Default)]
pub struct AsciiRenderer {
    /// Wrap cells in 24-bit ANSI color escapes from the palette
    pub ansi: bool,
}

#[derive(Clone, Copy)]
struct Cell {
    glyph: char,
    color: Color,
}

impl AsciiRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ansi(ansi: bool) -> Self {
        Self { ansi }
    }
}

impl Renderer for AsciiRenderer {
    type Output = String;

    fn render(&mut self, frame: &Frame<'_>, config: &RenderConfig, _time_ms: f64) -> String {
        let state = frame.state;
        let palette = config.palette();
        let (w, h) = (state.width.max(0) as usize, state.height.max(0) as usize);
        let mut grid = vec![
            Cell {
                glyph: '.',
                color: palette.grid,
            };
            w * h
        ];
        let mut put = |pos: IVec2, glyph: char, color: Color| {
            if pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < w && (pos.y as usize) < h {
                grid[pos.y as usize * w + pos.x as usize] = Cell { glyph, color };
            }
        };

        for &wall in &state.walls {
            put(wall, '#', palette.portal);
        }
        for laser in state.lasers.iter().filter(|l| l.is_active()) {
            let glyph = match laser.axis {
                LaserAxis::Horizontal => '-',
                LaserAxis::Vertical => '|',
            };
            for cell in laser.cells() {
                put(cell, glyph, palette.laser);
            }
        }
        for block in &state.blocks {
            put(block.pos, 'B', palette.laser);
        }
        for portal in &state.portals {
            put(portal.entry, 'O', palette.portal);
            put(portal.exit, 'O', palette.portal);
        }
        for food in &state.food {
            match food.kind {
                FoodKind::Normal => put(food.pos, '*', palette.food),
                FoodKind::Chrono => put(food.pos, 'C', palette.chrono_fruit),
            }
        }
        for powerup in &state.powerups {
            put(powerup.pos, 'P', palette.snake[2]);
        }
        for echo in &state.echoes {
            for &seg in echo.segments() {
                put(seg, 'e', palette.echo);
            }
        }

        let snakes = [
            (state.snake(PlayerSlot::One), ('@', 'o'), palette.snake),
            (state.snake(PlayerSlot::Two), ('&', '+'), palette.snake2),
            (state.ai_snake(), ('A', 'a'), palette.snake2),
        ];
        for (snake, (head, body), colors) in snakes {
            let Some(snake) = snake else { continue };
            for (i, &seg) in snake.segments().iter().enumerate().rev() {
                if i == 0 {
                    put(seg, head, colors[0]);
                } else {
                    put(seg, body, colors[1]);
                }
            }
        }

        let mut out = String::with_capacity((w + 1) * h + 64);
        for row in grid.chunks(w.max(1)) {
            for cell in row {
                if self.ansi {
                    let [r, g, b, _] = cell.color.map(|c| (c.clamp(0.0, 1.0) * 255.0) as u8);
                    let _ = write!(out, "\x1b[38;2;{};{};{}m{}", r, g, b, cell.glyph);
                } else {
                    out.push(cell.glyph);
                }
            }
            if self.ansi {
                out.push_str("\x1b[0m");
            }
            out.push('\n');
        }

        let hud = frame.hud();
        let _ = write!(
            out,
            "score {} | combo {} | x{}",
            hud.scores[0], hud.combo, hud.multiplier
        );
        if state.player_mode == PlayerMode::TwoPlayer {
            let _ = write!(out, " | p2 {}", hud.scores[1]);
        }
        if let Some(ms) = hud.paradox_remaining_ms {
            let _ = write!(out, " | PARADOX {:.1}s", ms / 1000.0);
        }
        let _ = write!(
            out,
            " | timeline {:>3.0}% ({} saved)",
            hud.timeline_progress * 100.0,
            hud.saved_timelines
        );
        for (label, remaining) in &hud.active_effects {
            let _ = write!(out, " | {} {:.0}s", label, remaining / 1000.0);
        }
        if let Some(ms) = hud.time_remaining_ms {
            let _ = write!(out, " | {:.0}s left", ms / 1000.0);
        }
        out.push('\n');
        out
    }
}
