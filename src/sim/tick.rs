//! Per-frame simulation tick
//!
//! Advances a match by one display frame. Each live player is checked in a
//! fixed precedence order: boundary, self, walls, the other player, echoes,
//! food, power-ups, portals, lasers, moving blocks, then the AI body.

use super::ai::{self, AiView};
use super::collision::{self, DeathCause};
use super::entities::{FoodKind, PowerUpKind};
use super::state::{Alert, GameEvent, GameMode, GamePhase, GameState, PlayerSlot, TimedEffect, TimedEffectKind};
use crate::consts::*;
use crate::{Direction, wrap_to_grid};

/// Edge-triggered actions for one player slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerActions {
    pub save_timeline: bool,
    pub chrono_boost: bool,
    pub phase_mode: bool,
}

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Requested heading per slot (player one, player two)
    pub directions: [Option<Direction>; 2],
    pub actions: [PlayerActions; 2],
    /// Pause toggle
    pub pause: bool,
}

impl TickInput {
    /// Input that only steers one slot
    pub fn steer(slot: PlayerSlot, direction: Direction) -> Self {
        let mut input = Self::default();
        input.directions[slot.index()] = Some(direction);
        input
    }
}

/// Advance the match by `dt_ms` of wall time
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: f32) {
    if input.pause {
        state.toggle_pause();
    }
    if state.phase != GamePhase::Playing {
        return;
    }

    let dt_ms = dt_ms.clamp(0.0, MAX_FRAME_DT_MS);
    state.clock_ms += f64::from(dt_ms);

    expire_effects(state);
    apply_input(state, input);

    // AI decides before it moves
    steer_ai(state);

    let speed = effective_speed(state);
    for player in &mut state.players {
        if let Some(snake) = player.snake.as_mut() {
            snake.advance_tick(dt_ms, speed);
        }
    }
    if let Some(snake) = state.ai.as_mut().and_then(|ai| ai.snake.as_mut()) {
        snake.advance_tick(dt_ms, speed);
    }

    for player in &mut state.players {
        if let (Some(recorder), Some(snake)) = (player.recorder.as_mut(), player.snake.as_ref()) {
            recorder.record_sample(snake, dt_ms);
        }
    }

    update_world(state, dt_ms);
    if state.phase != GamePhase::Playing {
        return;
    }

    for slot in PlayerSlot::ALL {
        if state.is_over() {
            return;
        }
        if let Some(cause) = resolve_player(state, slot) {
            kill_player(state, slot, cause);
        }
    }
    if !state.is_over() {
        resolve_ai(state);
    }
}

/// Speed factor applied to every snake this tick
pub fn effective_speed(state: &GameState) -> f32 {
    if state.paradox_mode {
        state.game_speed * PARADOX_SPEED_FACTOR
    } else if state.time_dilation {
        state.game_speed * TIME_DILATION_FACTOR
    } else {
        state.game_speed
    }
}

/// Difficulty speed factor for a primary score
pub fn speed_for_score(score: u64) -> f32 {
    1.0 + (score / SPEED_STEP_SCORE) as f32 * SPEED_STEP
}

/// Points for one pickup, using the combo count from before the pickup
pub fn pickup_points(base: u64, multiplier: u32, combo: u32) -> u64 {
    // base * mult * (1 + combo / 10), floored, in integer math
    base * u64::from(multiplier) * (10 + u64::from(combo)) / 10
}

fn apply_input(state: &mut GameState, input: &TickInput) {
    for slot in PlayerSlot::ALL {
        let i = slot.index();
        if let Some(dir) = input.directions[i] {
            if let Some(snake) = state.snake_mut(slot) {
                snake.set_direction(dir);
            }
        }
        let actions = input.actions[i];
        if actions.save_timeline {
            state.save_timeline(slot);
        }
        if actions.chrono_boost {
            state.activate_chrono_boost(slot);
        }
        if actions.phase_mode {
            state.activate_phase_mode(slot);
        }
    }
}

fn steer_ai(state: &mut GameState) {
    let Some(ai) = state.ai.as_ref() else {
        return;
    };
    let Some(head) = ai.snake.as_ref().map(|s| s.head()) else {
        return;
    };
    let difficulty = ai.difficulty;

    let roll = state.roll();
    let obstacles = collision::obstacle_cells(&state.walls, &state.lasers, &state.blocks);
    let view = AiView {
        head,
        food: &state.food,
        opponent_head: state.snake(PlayerSlot::One).map(|s| s.head()),
        obstacles: &obstacles,
    };
    let decision = ai::decide(difficulty, &view, roll);

    if let (Some(dir), Some(snake)) = (decision, state.ai.as_mut().and_then(|ai| ai.snake.as_mut())) {
        snake.set_direction(dir);
    }
}

fn update_world(state: &mut GameState, dt_ms: f32) {
    for echo in &mut state.echoes {
        echo.advance(dt_ms);
    }

    for portal in &mut state.portals {
        portal.update(dt_ms);
    }
    state.portals.retain(|p| !p.is_depleted());

    for laser in &mut state.lasers {
        laser.update(dt_ms);
    }
    for block in &mut state.blocks {
        block.update(dt_ms);
    }

    if state.paradox_mode {
        state.paradox_timer_ms -= dt_ms;
        if state.paradox_timer_ms <= 0.0 {
            end_paradox(state);
        }
    }

    if state.combo_timer_ms > 0.0 {
        state.combo_timer_ms -= dt_ms;
        if state.combo_timer_ms <= 0.0 {
            state.combo_timer_ms = 0.0;
            state.combo = 0;
        }
    }

    // Screen effects
    state.screen_shake *= 0.9;
    if state.screen_shake < 0.01 {
        state.screen_shake = 0.0;
    }
    if !state.paradox_mode {
        state.chromatic_aberration *= 0.95;
        if state.chromatic_aberration < 0.01 {
            state.chromatic_aberration = 0.0;
        }
    }

    if state.mode == GameMode::TimeTrial {
        state.time_trial_remaining_ms -= dt_ms;
        if state.time_trial_remaining_ms <= 0.0 {
            state.time_trial_remaining_ms = 0.0;
            state.emit(GameEvent::Alert(Alert::TimeUp));
            end_match(state);
        }
    }
}

/// Run the collision chain for one slot; `Some` means the snake died
fn resolve_player(state: &mut GameState, slot: PlayerSlot) -> Option<DeathCause> {
    let i = slot.index();
    let (width, height) = (state.width, state.height);
    let tunnel = state.players[i].quantum_tunnel;

    let snake = state.players[i].snake.as_mut()?;
    if snake.out_of_bounds(width, height) {
        if tunnel || snake.invincible {
            let wrapped = wrap_to_grid(snake.head(), width, height);
            snake.teleport_head(wrapped);
            if tunnel {
                state.players[i].quantum_tunnel = false;
                log::debug!("P{} tunnelled across the boundary", slot.number());
            }
        } else {
            return Some(DeathCause::Boundary);
        }
    }

    let snake = state.players[i].snake.as_ref()?;
    let head = snake.head();
    if !snake.invincible {
        if snake.self_collided() {
            return Some(DeathCause::SelfBite);
        }
        if collision::head_hits_wall(head, &state.walls) {
            return Some(DeathCause::Wall);
        }
        if let Some(other) = state.players[slot.other().index()].snake.as_ref() {
            if collision::head_hits_body(head, other) {
                return Some(DeathCause::OtherPlayer);
            }
        }
    }

    // Touching an echo is a paradox, never a death
    if !snake.phase_mode() && collision::head_hits_echo(head, &state.echoes) {
        trigger_paradox(state);
    }

    if let Some(idx) = state.food.iter().position(|f| f.pos == head) {
        collect_food(state, slot, idx);
    }

    if let Some(idx) = state.powerups.iter().position(|p| p.pos == head) {
        let powerup = state.powerups.remove(idx);
        apply_power_up(state, slot, powerup.kind);
    }

    let snake = state.players[i].snake.as_mut()?;
    if state.portals.iter_mut().any(|portal| portal.teleport(snake)) {
        state.emit(GameEvent::Portal);
    }

    // Power-ups above may have changed the head or invincibility
    let snake = state.players[i].snake.as_ref()?;
    let head = snake.head();
    if !snake.invincible {
        if collision::head_hits_laser(head, &state.lasers) {
            return Some(DeathCause::Laser);
        }
        if collision::head_hits_block(head, &state.blocks) {
            return Some(DeathCause::MovingBlock);
        }
        if state.ai_snake().is_some_and(|ai| collision::head_hits_body(head, ai)) {
            return Some(DeathCause::AiBody);
        }
    }
    None
}

fn kill_player(state: &mut GameState, slot: PlayerSlot, cause: DeathCause) {
    let player = state.player_mut(slot);
    if player.snake.take().is_none() {
        return;
    }
    player.recorder = None;
    player.quantum_tunnel = false;
    let score = player.score;

    log::info!("P{} {} (score {})", slot.number(), cause.describe(), score);
    state.emit(GameEvent::Death { slot, cause });
    match slot {
        PlayerSlot::One => end_match(state),
        PlayerSlot::Two => state.emit(GameEvent::Alert(Alert::PlayerDown(slot))),
    }
}

fn end_match(state: &mut GameState) {
    if state.phase == GamePhase::GameOver {
        return;
    }
    state.phase = GamePhase::GameOver;
    let score = state.player(PlayerSlot::One).score;
    log::info!(
        "Game over: score={} food={} max_combo={} echoes={} paradoxes={}",
        score,
        state.food_collected,
        state.max_combo,
        state.echoes_created,
        state.paradoxes_triggered
    );
    state.emit(GameEvent::MatchOver { score });
}

fn resolve_ai(state: &mut GameState) {
    let (width, height) = (state.width, state.height);
    let Some(snake) = state.ai_snake() else {
        return;
    };
    let head = snake.head();
    let dead = snake.out_of_bounds(width, height) || snake.self_collided();

    if !dead {
        if let Some(idx) = state.food.iter().position(|f| f.pos == head) {
            state.food.remove(idx);
            if let Some(snake) = state.ai.as_mut().and_then(|ai| ai.snake.as_mut()) {
                snake.grow(GROWTH_PER_FOOD);
            }
            state.spawn_food(FoodKind::Normal);
        }
        return;
    }

    if let Some(ai) = state.ai.as_mut() {
        ai.snake = None;
    }
    state.add_effect(TimedEffectKind::AiRespawn, PlayerSlot::Two, AI_RESPAWN_DELAY_MS);
    state.emit(GameEvent::AiDeath);
    log::info!("AI snake died, respawning in {}ms", AI_RESPAWN_DELAY_MS);
}

/// Score a food pickup and run the follow-up spawns
fn collect_food(state: &mut GameState, slot: PlayerSlot, idx: usize) {
    let food = state.food.remove(idx);
    let points = pickup_points(food.kind.base_points(), state.multiplier, state.combo);

    state.combo += 1;
    state.max_combo = state.max_combo.max(state.combo);
    state.combo_timer_ms = COMBO_WINDOW_MS;
    state.food_collected += 1;

    let player = state.player_mut(slot);
    player.score += points;
    if let Some(snake) = player.snake.as_mut() {
        snake.grow(GROWTH_PER_FOOD);
    }

    let combo = state.combo;
    state.emit(GameEvent::Eat { slot, combo });
    log::debug!("P{} ate {:?} for {} (combo {})", slot.number(), food.kind, points, combo);

    spawn_after_pickup(state);
    if slot == PlayerSlot::One {
        update_difficulty(state);
    }
}

fn spawn_after_pickup(state: &mut GameState) {
    state.spawn_food(FoodKind::Normal);

    if state.roll() < CHRONO_SPAWN_CHANCE {
        state.spawn_food(FoodKind::Chrono);
    }
    if state.roll() < POWERUP_SPAWN_CHANCE {
        state.spawn_powerup();
    }
    if state.portals.len() < MAX_PORTALS && state.roll() < PORTAL_SPAWN_CHANCE {
        state.spawn_portal();
    }
    if state.food_frenzy && state.roll() < FRENZY_EXTRA_FOOD_CHANCE {
        state.spawn_food(FoodKind::Normal);
    }
    if state.paradox_mode {
        state.spawn_food(FoodKind::Normal);
    }
}

/// Recompute game speed and handle any newly crossed hazard milestones
fn update_difficulty(state: &mut GameState) {
    let score = state.player(PlayerSlot::One).score;
    state.game_speed = speed_for_score(score);

    let milestone = score / HAZARD_MILESTONE_SCORE;
    while state.hazard_milestone < milestone {
        state.hazard_milestone += 1;
        if state.mode == GameMode::Classic && state.roll() >= HAZARD_SPAWN_CHANCE {
            continue;
        }
        let (kind, spawned) = if state.hazard_milestone % 2 == 1 {
            ("laser", state.spawn_laser())
        } else {
            ("moving block", state.spawn_moving_block())
        };
        if spawned {
            log::info!("Milestone {}: spawned {}", state.hazard_milestone, kind);
        }
    }
}

/// Enter paradox mode; no-op while already active
pub fn trigger_paradox(state: &mut GameState) -> bool {
    if state.paradox_mode {
        return false;
    }
    state.paradox_mode = true;
    state.paradox_timer_ms = PARADOX_DURATION_MS;
    state.multiplier = PARADOX_MULTIPLIER;
    state.paradoxes_triggered += 1;
    state.screen_shake = PARADOX_SCREEN_SHAKE;
    state.chromatic_aberration = 1.0;
    log::info!("Paradox triggered (#{})", state.paradoxes_triggered);
    state.emit(GameEvent::Paradox);
    state.emit(GameEvent::Alert(Alert::Paradox));
    true
}

fn end_paradox(state: &mut GameState) {
    state.paradox_mode = false;
    state.paradox_timer_ms = 0.0;
    state.multiplier = state.bonus_multiplier;
    state.chromatic_aberration = 0.0;
    log::debug!("Paradox ended, multiplier back to {}", state.multiplier);
}

/// Apply a collected power-up for `slot`
pub fn apply_power_up(state: &mut GameState, slot: PlayerSlot, kind: PowerUpKind) {
    let duration = kind.duration_ms();
    match kind {
        PowerUpKind::TimeDilation => {
            state.time_dilation = true;
        }
        PowerUpKind::EchoMagnet => {
            for echo in &mut state.echoes {
                echo.restart();
            }
        }
        PowerUpKind::QuantumTunnel => {
            let player = state.player_mut(slot);
            let Some(snake) = player.snake.as_mut() else {
                return;
            };
            snake.invincible = true;
            player.quantum_tunnel = true;
            state.add_effect(TimedEffectKind::TunnelWindow, slot, QUANTUM_TUNNEL_WINDOW_MS);
        }
        PowerUpKind::Rewind => {
            if let Some(snake) = state.snake_mut(slot) {
                if snake.len() > REWIND_MIN_LENGTH {
                    snake.trim_tail(REWIND_SEGMENTS);
                }
            }
        }
        PowerUpKind::SpeedBoost => {
            let Some(snake) = state.snake_mut(slot) else {
                return;
            };
            snake.speed_boost = SPEED_BOOST_FACTOR;
        }
        PowerUpKind::Multiplier => {
            state.multiplier = (state.multiplier * 2).min(MULTIPLIER_CAP);
            state.bonus_multiplier = (state.bonus_multiplier * 2).min(MULTIPLIER_CAP);
        }
        PowerUpKind::Invincibility => {
            let Some(snake) = state.snake_mut(slot) else {
                return;
            };
            snake.invincible = true;
        }
        PowerUpKind::FoodFrenzy => {
            state.food_frenzy = true;
            for _ in 0..FRENZY_BURST {
                state.spawn_food(FoodKind::Normal);
            }
        }
    }

    if duration > 0.0 {
        state.add_effect(TimedEffectKind::PowerUp(kind), slot, duration);
    }
    log::debug!("P{} picked up {:?}", slot.number(), kind);
    state.emit(GameEvent::PowerUp { slot, kind });
    state.emit(GameEvent::Alert(Alert::PowerUp(kind)));
}

/// Revert every effect whose expiry has passed on the match clock
fn expire_effects(state: &mut GameState) {
    let now = state.clock_ms;
    let (expired, active): (Vec<TimedEffect>, Vec<TimedEffect>) = state
        .active_effects
        .drain(..)
        .partition(|e| e.expires_at_ms <= now);
    state.active_effects = active;
    for effect in expired {
        revert_effect(state, effect);
    }
}

fn revert_effect(state: &mut GameState, effect: TimedEffect) {
    let slot = effect.slot;
    match effect.kind {
        TimedEffectKind::PowerUp(PowerUpKind::TimeDilation) => {
            state.time_dilation = state.effect_active(effect.kind);
        }
        TimedEffectKind::PowerUp(PowerUpKind::FoodFrenzy) => {
            state.food_frenzy = state.effect_active(effect.kind);
        }
        TimedEffectKind::PowerUp(PowerUpKind::Multiplier) => {
            if !state.effect_active(effect.kind) {
                state.bonus_multiplier = 1;
                if !state.paradox_mode {
                    state.multiplier = 1;
                }
            }
        }
        TimedEffectKind::PowerUp(PowerUpKind::SpeedBoost) | TimedEffectKind::ChronoBoost => {
            let boosted = state.has_effect(TimedEffectKind::PowerUp(PowerUpKind::SpeedBoost), slot)
                || state.has_effect(TimedEffectKind::ChronoBoost, slot);
            if !boosted {
                if let Some(snake) = state.snake_mut(slot) {
                    snake.speed_boost = 1.0;
                }
            }
        }
        TimedEffectKind::TunnelWindow | TimedEffectKind::PowerUp(PowerUpKind::Invincibility) => {
            if effect.kind == TimedEffectKind::TunnelWindow {
                state.player_mut(slot).quantum_tunnel = false;
            }
            let protected = state.has_effect(TimedEffectKind::PowerUp(PowerUpKind::Invincibility), slot)
                || state.has_effect(TimedEffectKind::TunnelWindow, slot);
            if !protected {
                if let Some(snake) = state.snake_mut(slot) {
                    snake.invincible = false;
                }
            }
        }
        // Instant or display-only effects
        TimedEffectKind::PowerUp(
            PowerUpKind::EchoMagnet | PowerUpKind::QuantumTunnel | PowerUpKind::Rewind,
        ) => {}
        TimedEffectKind::AiRespawn => {
            if state.ai.as_ref().is_some_and(|ai| ai.snake.is_none()) {
                let pos = state.ai_respawn_position();
                if let Some(ai) = state.ai.as_mut() {
                    ai.snake = Some(ai.spawn_snake(pos, Direction::Left));
                }
                log::info!("AI snake respawned at {:?}", pos);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::IVec2;

    use super::*;
    use crate::sim::entities::{Food, LaserAxis, LaserGrid, Portal};
    use crate::sim::snake::Snake;
    use crate::sim::state::{MatchConfig, PlayerMode};
    use crate::sim::timeline::{EchoPlayback, EchoSample, Recording};

    /// Fresh single-player match with no random food on the board
    fn quiet_state() -> GameState {
        let mut state = GameState::new(42);
        state.food.clear();
        state.powerups.clear();
        state
    }

    fn run(state: &mut GameState, ms: f32) {
        let mut left = ms;
        while left > 0.0 {
            let dt = left.min(50.0);
            tick(state, &TickInput::default(), dt);
            left -= dt;
        }
    }

    fn freeze(state: &mut GameState, slot: PlayerSlot) {
        if let Some(snake) = state.snake_mut(slot) {
            snake.move_interval_ms = f32::MAX;
        }
    }

    #[test]
    fn test_pickup_scores_grows_and_combos() {
        let mut state = quiet_state();
        state.food.push(Food::new(IVec2::new(5, 8), FoodKind::Normal));

        run(&mut state, SNAKE_MOVE_INTERVAL_MS);

        let snake = state.snake(PlayerSlot::One).unwrap();
        assert_eq!(snake.head(), IVec2::new(5, 8));
        assert_eq!(snake.growth_pending, GROWTH_PER_FOOD);
        assert_eq!(state.player(PlayerSlot::One).score, 10);
        assert_eq!(state.combo, 1);
        assert_eq!(state.food_collected, 1);
        assert!(state.food.iter().all(|f| f.pos != IVec2::new(5, 8)));
        assert!(!state.food.is_empty());
        assert!(state.drain_events().contains(&GameEvent::Eat {
            slot: PlayerSlot::One,
            combo: 1
        }));
    }

    #[test]
    fn test_pickup_points_formula() {
        assert_eq!(pickup_points(10, 1, 0), 10);
        assert_eq!(pickup_points(10, 1, 1), 11);
        assert_eq!(pickup_points(50, 5, 3), 325);
        assert_eq!(pickup_points(10, 2, 9), 38);
    }

    #[test]
    fn test_combo_resets_after_idle_window() {
        let mut state = quiet_state();
        freeze(&mut state, PlayerSlot::One);
        state.combo = 4;
        state.combo_timer_ms = COMBO_WINDOW_MS;
        run(&mut state, COMBO_WINDOW_MS);
        assert_eq!(state.combo, 0);
    }

    #[test]
    fn test_boundary_death_ends_match_once() {
        let mut state = quiet_state();
        state.players[0].snake = Some(Snake::new(IVec2::new(15, 8), Direction::Right));
        run(&mut state, SNAKE_MOVE_INTERVAL_MS);

        assert!(state.is_over());
        assert!(state.snake(PlayerSlot::One).is_none());
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::Death {
            slot: PlayerSlot::One,
            cause: DeathCause::Boundary
        }));
        assert_eq!(
            events.iter().filter(|e| matches!(e, GameEvent::MatchOver { .. })).count(),
            1
        );

        run(&mut state, 500.0);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_quantum_tunnel_wraps_once() {
        let mut state = quiet_state();
        state.players[0].snake = Some(Snake::new(IVec2::new(15, 8), Direction::Right));
        apply_power_up(&mut state, PlayerSlot::One, PowerUpKind::QuantumTunnel);
        assert!(state.player(PlayerSlot::One).quantum_tunnel);

        run(&mut state, SNAKE_MOVE_INTERVAL_MS);
        assert!(!state.is_over());
        assert_eq!(state.snake(PlayerSlot::One).unwrap().head(), IVec2::new(0, 8));
        assert!(!state.player(PlayerSlot::One).quantum_tunnel);
    }

    #[test]
    fn test_quantum_tunnel_window_closes() {
        let mut state = quiet_state();
        freeze(&mut state, PlayerSlot::One);
        apply_power_up(&mut state, PlayerSlot::One, PowerUpKind::QuantumTunnel);
        run(&mut state, QUANTUM_TUNNEL_WINDOW_MS as f32 + 50.0);
        assert!(!state.player(PlayerSlot::One).quantum_tunnel);
        assert!(!state.snake(PlayerSlot::One).unwrap().invincible);
        assert!(state.active_effects.is_empty());
    }

    #[test]
    fn test_echo_contact_triggers_paradox_once() {
        let mut state = quiet_state();
        let body = vec![IVec2::new(5, 8), IVec2::new(6, 8), IVec2::new(7, 8)];
        let recording = Recording::new(vec![
            EchoSample {
                time_ms: 0.0,
                segments: body.clone(),
                direction: Direction::Left,
            },
            EchoSample {
                time_ms: 10_000.0,
                segments: body,
                direction: Direction::Left,
            },
        ]);
        state.echoes.push(EchoPlayback::new(recording));

        run(&mut state, SNAKE_MOVE_INTERVAL_MS);
        assert!(state.paradox_mode);
        assert_eq!(state.multiplier, PARADOX_MULTIPLIER);
        assert_eq!(state.paradoxes_triggered, 1);
        assert_eq!(state.screen_shake, PARADOX_SCREEN_SHAKE);
        assert_eq!(state.chromatic_aberration, 1.0);

        // Still inside the echo on the next moves
        run(&mut state, 150.0);
        assert!(!state.is_over());
        assert_eq!(state.paradoxes_triggered, 1);
    }

    #[test]
    fn test_phase_mode_blocks_paradox() {
        let mut state = quiet_state();
        let recording = Recording::new(vec![
            EchoSample {
                time_ms: 0.0,
                segments: vec![IVec2::new(5, 8)],
                direction: Direction::Left,
            },
            EchoSample {
                time_ms: 10_000.0,
                segments: vec![IVec2::new(5, 8)],
                direction: Direction::Left,
            },
        ]);
        state.echoes.push(EchoPlayback::new(recording));
        assert!(state.activate_phase_mode(PlayerSlot::One));
        run(&mut state, SNAKE_MOVE_INTERVAL_MS);
        assert!(!state.paradox_mode);
    }

    #[test]
    fn test_paradox_lapse_restores_multiplier() {
        let mut state = quiet_state();
        freeze(&mut state, PlayerSlot::One);
        assert!(trigger_paradox(&mut state));
        assert!(!trigger_paradox(&mut state));
        run(&mut state, PARADOX_DURATION_MS);
        assert!(!state.paradox_mode);
        assert_eq!(state.multiplier, 1);
        assert_eq!(state.chromatic_aberration, 0.0);

        // Multiplier power-up still running when paradox ends
        apply_power_up(&mut state, PlayerSlot::One, PowerUpKind::Multiplier);
        assert_eq!(state.multiplier, 2);
        trigger_paradox(&mut state);
        assert_eq!(state.multiplier, PARADOX_MULTIPLIER);
        run(&mut state, PARADOX_DURATION_MS);
        assert_eq!(state.multiplier, 2);

        run(&mut state, PowerUpKind::Multiplier.duration_ms() as f32);
        assert_eq!(state.multiplier, 1);
    }

    #[test]
    fn test_paradox_doubles_speed_dilation_halves() {
        let mut state = quiet_state();
        assert_eq!(effective_speed(&state), 1.0);
        state.time_dilation = true;
        assert_eq!(effective_speed(&state), 0.5);
        trigger_paradox(&mut state);
        assert_eq!(effective_speed(&state), 2.0);
    }

    #[test]
    fn test_phase_mode_prevents_self_death() {
        let coiled = [
            IVec2::new(5, 5),
            IVec2::new(6, 5),
            IVec2::new(6, 6),
            IVec2::new(5, 6),
            IVec2::new(5, 5),
        ];
        let mut state = quiet_state();
        state.players[0].snake = Some(Snake::from_segments(&coiled, Direction::Up).unwrap());
        freeze(&mut state, PlayerSlot::One);
        state.activate_phase_mode(PlayerSlot::One);
        run(&mut state, 50.0);
        assert!(!state.is_over());

        let mut state = quiet_state();
        state.players[0].snake = Some(Snake::from_segments(&coiled, Direction::Up).unwrap());
        freeze(&mut state, PlayerSlot::One);
        run(&mut state, 50.0);
        assert!(state.is_over());
    }

    #[test]
    fn test_depleted_portal_removed_on_next_update() {
        let mut state = quiet_state();
        state.portals.push(Portal::with_uses(IVec2::new(5, 8), IVec2::new(10, 3), 1));

        run(&mut state, SNAKE_MOVE_INTERVAL_MS);
        assert_eq!(state.snake(PlayerSlot::One).unwrap().head(), IVec2::new(10, 3));
        assert_eq!(state.portals.len(), 1);
        assert!(state.portals[0].is_depleted());

        tick(&mut state, &TickInput::default(), 10.0);
        assert!(state.portals.is_empty());
    }

    #[test]
    fn test_laser_kills_unless_invincible() {
        let mut state = quiet_state();
        state.lasers.push(LaserGrid::new(IVec2::new(5, 6), LaserAxis::Vertical, 4));
        apply_power_up(&mut state, PlayerSlot::One, PowerUpKind::Invincibility);
        run(&mut state, SNAKE_MOVE_INTERVAL_MS);
        assert!(!state.is_over());

        let mut state = quiet_state();
        state.lasers.push(LaserGrid::new(IVec2::new(5, 6), LaserAxis::Vertical, 4));
        run(&mut state, SNAKE_MOVE_INTERVAL_MS);
        assert!(state.is_over());
        assert!(state.drain_events().contains(&GameEvent::Death {
            slot: PlayerSlot::One,
            cause: DeathCause::Laser
        }));
    }

    #[test]
    fn test_power_up_expiry_reverts_once() {
        let mut state = quiet_state();
        freeze(&mut state, PlayerSlot::One);
        apply_power_up(&mut state, PlayerSlot::One, PowerUpKind::Invincibility);
        apply_power_up(&mut state, PlayerSlot::One, PowerUpKind::SpeedBoost);
        assert!(state.snake(PlayerSlot::One).unwrap().invincible);

        run(&mut state, PowerUpKind::Invincibility.duration_ms() as f32);
        assert!(!state.snake(PlayerSlot::One).unwrap().invincible);
        assert_eq!(state.snake(PlayerSlot::One).unwrap().speed_boost, SPEED_BOOST_FACTOR);

        run(&mut state, 3_000.0);
        assert_eq!(state.snake(PlayerSlot::One).unwrap().speed_boost, 1.0);
        assert!(state.active_effects.is_empty());
    }

    #[test]
    fn test_expiry_on_dead_target_is_noop() {
        let mut state = quiet_state();
        apply_power_up(&mut state, PlayerSlot::One, PowerUpKind::SpeedBoost);
        state.players[0].snake = None;
        state.clock_ms += 10_000.0;
        expire_effects(&mut state);
        assert!(state.active_effects.is_empty());
    }

    #[test]
    fn test_rewind_trims_long_snakes_only() {
        let mut state = quiet_state();
        let long: Vec<IVec2> = (0..6).map(|i| IVec2::new(8 - i, 4)).collect();
        state.players[0].snake = Some(Snake::from_segments(&long, Direction::Right).unwrap());
        apply_power_up(&mut state, PlayerSlot::One, PowerUpKind::Rewind);
        assert_eq!(state.snake(PlayerSlot::One).unwrap().len(), 3);

        let short: Vec<IVec2> = (0..4).map(|i| IVec2::new(8 - i, 4)).collect();
        state.players[0].snake = Some(Snake::from_segments(&short, Direction::Right).unwrap());
        apply_power_up(&mut state, PlayerSlot::One, PowerUpKind::Rewind);
        assert_eq!(state.snake(PlayerSlot::One).unwrap().len(), 4);
    }

    #[test]
    fn test_food_frenzy_spawns_burst() {
        let mut state = quiet_state();
        apply_power_up(&mut state, PlayerSlot::One, PowerUpKind::FoodFrenzy);
        assert!(state.food_frenzy);
        assert_eq!(state.food.len(), FRENZY_BURST);
    }

    #[test]
    fn test_secondary_death_keeps_match_running() {
        let config = MatchConfig {
            player_mode: PlayerMode::TwoPlayer,
            ..Default::default()
        };
        let mut state = GameState::with_config(9, &config);
        state.food.clear();
        freeze(&mut state, PlayerSlot::One);
        state.players[1].snake = Some(Snake::new(IVec2::new(15, 3), Direction::Right));

        run(&mut state, SNAKE_MOVE_INTERVAL_MS);
        assert!(!state.is_over());
        assert!(state.snake(PlayerSlot::Two).is_none());
        assert!(state.player(PlayerSlot::Two).recorder.is_none());
        assert!(state
            .drain_events()
            .contains(&GameEvent::Alert(Alert::PlayerDown(PlayerSlot::Two))));
    }

    #[test]
    fn test_ai_respawns_after_delay() {
        let config = MatchConfig {
            player_mode: PlayerMode::VersusAi,
            ..Default::default()
        };
        let mut state = GameState::with_config(13, &config);
        state.food.clear();
        freeze(&mut state, PlayerSlot::One);
        if let Some(ai) = state.ai.as_mut() {
            ai.snake = Some(Snake::new(IVec2::new(-1, 5), Direction::Left));
        }

        tick(&mut state, &TickInput::default(), 50.0);
        assert!(state.ai_snake().is_none());
        assert!(state.effect_active(TimedEffectKind::AiRespawn));

        let mut respawned = None;
        for _ in 0..60 {
            tick(&mut state, &TickInput::default(), 50.0);
            if let Some(snake) = state.ai_snake() {
                respawned = Some(snake.head());
                break;
            }
        }
        let head = respawned.expect("AI should respawn");
        assert!((5..11).contains(&head.x) && (5..11).contains(&head.y));
        assert!(state.clock_ms >= 50.0 + AI_RESPAWN_DELAY_MS);
    }

    #[test]
    fn test_difficulty_ramp() {
        assert_eq!(speed_for_score(0), 1.0);
        assert_eq!(speed_for_score(99), 1.0);
        assert!((speed_for_score(100) - 1.05).abs() < 1e-6);
        assert!((speed_for_score(250) - 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_hazard_milestone_fires_once() {
        let config = MatchConfig {
            mode: GameMode::Temporal,
            ..Default::default()
        };
        let mut state = GameState::with_config(21, &config);
        state.players[0].score = 210;
        update_difficulty(&mut state);
        assert_eq!(state.hazard_milestone, 1);
        assert_eq!(state.lasers.len(), 1);

        state.players[0].score = 230;
        update_difficulty(&mut state);
        assert_eq!(state.lasers.len(), 1);

        state.players[0].score = 410;
        update_difficulty(&mut state);
        assert_eq!(state.hazard_milestone, 2);
        assert_eq!(state.blocks.len(), 1);
    }

    #[test]
    fn test_time_trial_runs_out() {
        let config = MatchConfig {
            mode: GameMode::TimeTrial,
            ..Default::default()
        };
        let mut state = GameState::with_config(5, &config);
        freeze(&mut state, PlayerSlot::One);
        state.time_trial_remaining_ms = 80.0;
        run(&mut state, 100.0);
        assert!(state.is_over());
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::Alert(Alert::TimeUp)));
        assert!(events.contains(&GameEvent::MatchOver { score: 0 }));
    }

    #[test]
    fn test_pause_freezes_simulation() {
        let mut state = quiet_state();
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, 50.0);
        assert_eq!(state.phase, GamePhase::Paused);
        run(&mut state, 1_000.0);
        assert_eq!(state.clock_ms, 0.0);
        assert_eq!(state.snake(PlayerSlot::One).unwrap().head(), IVec2::new(4, 8));

        tick(&mut state, &pause, 50.0);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.clock_ms, 50.0);
    }

    #[test]
    fn test_steering_input_buffers_direction() {
        let mut state = quiet_state();
        tick(&mut state, &TickInput::steer(PlayerSlot::One, Direction::Up), 50.0);
        run(&mut state, 100.0);
        assert_eq!(state.snake(PlayerSlot::One).unwrap().head(), IVec2::new(4, 7));
    }

    fn two_sample_echo(at: IVec2) -> EchoPlayback {
        let sample = |time_ms| EchoSample {
            time_ms,
            segments: vec![at],
            direction: Direction::Up,
        };
        EchoPlayback::new(Recording::new(vec![sample(0.0), sample(500.0)]))
    }

    #[test]
    fn test_time_dilation_pickup_and_expiry() {
        let mut state = quiet_state();
        freeze(&mut state, PlayerSlot::One);
        apply_power_up(&mut state, PlayerSlot::One, PowerUpKind::TimeDilation);
        assert!(state.time_dilation);
        assert_eq!(effective_speed(&state), TIME_DILATION_FACTOR);

        run(&mut state, 9_900.0);
        assert!(state.time_dilation);
        run(&mut state, 150.0);
        assert!(!state.time_dilation);
        assert_eq!(effective_speed(&state), 1.0);
    }

    #[test]
    fn test_echo_magnet_restarts_live_and_finished_echoes() {
        let mut state = quiet_state();
        let mut live = two_sample_echo(IVec2::new(1, 1));
        live.advance(100.0);
        let mut finished = two_sample_echo(IVec2::new(2, 2));
        finished.advance(600.0);
        assert!(finished.is_finished());
        state.echoes = vec![live, finished];

        apply_power_up(&mut state, PlayerSlot::One, PowerUpKind::EchoMagnet);
        for echo in &state.echoes {
            assert_eq!(echo.cursor(), 0);
            assert_eq!(echo.elapsed_ms(), 0.0);
            assert!(!echo.is_finished());
        }
        assert!(state.echoes[1].collides_with(IVec2::new(2, 2)));
    }

    #[test]
    fn test_food_frenzy_expiry_clears_flag() {
        let mut state = quiet_state();
        freeze(&mut state, PlayerSlot::One);
        apply_power_up(&mut state, PlayerSlot::One, PowerUpKind::FoodFrenzy);
        assert!(state.food_frenzy);

        run(&mut state, 10_050.0);
        assert!(!state.food_frenzy);
        assert!(!state.effect_active(TimedEffectKind::PowerUp(PowerUpKind::FoodFrenzy)));
    }

    #[test]
    fn test_multiplier_compounds_up_to_cap() {
        let mut state = quiet_state();
        let mut seen = Vec::new();
        for _ in 0..4 {
            apply_power_up(&mut state, PlayerSlot::One, PowerUpKind::Multiplier);
            seen.push(state.multiplier);
        }
        assert_eq!(seen, vec![2, 4, 8, MULTIPLIER_CAP]);
        assert_eq!(state.bonus_multiplier, MULTIPLIER_CAP);
    }

    #[test]
    fn test_invincible_snake_wraps_at_boundary() {
        let mut state = quiet_state();
        state.players[0].snake = Some(Snake::new(IVec2::new(15, 8), Direction::Right));
        apply_power_up(&mut state, PlayerSlot::One, PowerUpKind::Invincibility);

        run(&mut state, SNAKE_MOVE_INTERVAL_MS);
        assert!(!state.is_over());
        let snake = state.snake(PlayerSlot::One).unwrap();
        assert_eq!(snake.head(), IVec2::new(0, 8));
        assert!(snake.invincible);
        assert!(!state.player(PlayerSlot::One).quantum_tunnel);
    }
}
