//! Game state and core simulation types
//!
//! Everything the orchestrator owns for one match lives here, together with
//! the spawning helpers and the player-triggered actions.

use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ai::AiDifficulty;
use super::collision::DeathCause;
use super::entities::{Food, FoodKind, LaserAxis, LaserGrid, MovingBlock, Portal, PowerUp, PowerUpKind};
use super::snake::Snake;
use super::timeline::{EchoPlayback, Recording, TimelineRecorder};
use crate::consts::*;
use crate::level::{LevelDefinition, LevelError};
use crate::{Direction, in_bounds};

/// Current phase of the match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    Paused,
    /// Primary player died or the time trial ran out
    GameOver,
}

/// Rule set for a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Classic,
    /// Chrono fruit from the start, hazards always spawn at milestones
    Temporal,
    /// Match ends when the clock runs out
    TimeTrial,
}

/// Who shares the grid with the primary player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerMode {
    #[default]
    Single,
    TwoPlayer,
    VersusAi,
}

/// Player slot index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerSlot {
    One,
    Two,
}

impl PlayerSlot {
    pub const ALL: [PlayerSlot; 2] = [PlayerSlot::One, PlayerSlot::Two];

    pub fn index(self) -> usize {
        match self {
            PlayerSlot::One => 0,
            PlayerSlot::Two => 1,
        }
    }

    pub fn other(self) -> Self {
        match self {
            PlayerSlot::One => PlayerSlot::Two,
            PlayerSlot::Two => PlayerSlot::One,
        }
    }

    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }
}

/// One human-controlled slot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Player {
    /// `None` once dead (or never spawned)
    pub snake: Option<Snake>,
    pub recorder: Option<TimelineRecorder>,
    /// Timelines saved by this slot, capped at `MAX_ECHOES`
    pub saved_timelines: Vec<Recording>,
    pub score: u64,
    /// One-shot boundary wrap armed by the quantum tunnel power-up
    pub quantum_tunnel: bool,
}

impl Player {
    fn spawned(pos: IVec2, direction: Direction) -> Self {
        let mut recorder = TimelineRecorder::new();
        recorder.start();
        Self {
            snake: Some(Snake::new(pos, direction)),
            recorder: Some(recorder),
            ..Default::default()
        }
    }

    pub fn is_alive(&self) -> bool {
        self.snake.is_some()
    }
}

/// The AI opponent; its snake is `None` while waiting to respawn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiOpponent {
    pub difficulty: AiDifficulty,
    pub snake: Option<Snake>,
}

impl AiOpponent {
    pub fn spawn_snake(&self, pos: IVec2, direction: Direction) -> Snake {
        let mut snake = Snake::new(pos, direction);
        snake.move_interval_ms = self.difficulty.move_interval_ms();
        snake
    }
}

/// Deferred effect with an absolute expiry on the match clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimedEffectKind {
    PowerUp(PowerUpKind),
    /// Quantum tunnel wrap window
    TunnelWindow,
    ChronoBoost,
    AiRespawn,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedEffect {
    pub kind: TimedEffectKind,
    /// Slot the effect applies to (ignored for match-wide effects)
    pub slot: PlayerSlot,
    pub expires_at_ms: f64,
}

/// Player-visible notices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alert {
    MaxEchoes,
    TimelineSaved(PlayerSlot),
    ChronoBoost,
    PhaseMode,
    Paradox,
    PowerUp(PowerUpKind),
    PlayerDown(PlayerSlot),
    TimeUp,
}

impl Alert {
    pub fn text(&self) -> String {
        match self {
            Alert::MaxEchoes => "MAX ECHOES!".to_string(),
            Alert::TimelineSaved(slot) => format!("P{} TIMELINE SAVED!", slot.number()),
            Alert::ChronoBoost => "CHRONO BOOST!".to_string(),
            Alert::PhaseMode => "PHASE MODE!".to_string(),
            Alert::Paradox => "PARADOX!".to_string(),
            Alert::PowerUp(kind) => format!("{}!", kind.label()),
            Alert::PlayerDown(slot) => format!("P{} DOWN!", slot.number()),
            Alert::TimeUp => "TIME UP!".to_string(),
        }
    }
}

/// Discrete events emitted during a tick for audio/UI consumers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Eat { slot: PlayerSlot, combo: u32 },
    EchoSaved { slot: PlayerSlot },
    Paradox,
    Death { slot: PlayerSlot, cause: DeathCause },
    AiDeath,
    PowerUp { slot: PlayerSlot, kind: PowerUpKind },
    Portal,
    Alert(Alert),
    /// Terminal transition; carries the primary player's final score
    MatchOver { score: u64 },
}

/// Parameters fixed at match start
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchConfig {
    pub width: i32,
    pub height: i32,
    pub mode: GameMode,
    pub player_mode: PlayerMode,
    pub ai_difficulty: AiDifficulty,
    pub level: Option<LevelDefinition>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            width: GRID_WIDTH,
            height: GRID_HEIGHT,
            mode: GameMode::Classic,
            player_mode: PlayerMode::Single,
            ai_difficulty: AiDifficulty::Learner,
            level: None,
        }
    }
}

/// Complete match state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    pub width: i32,
    pub height: i32,
    pub mode: GameMode,
    pub player_mode: PlayerMode,
    pub phase: GamePhase,
    /// Match clock (ms of unpaused simulation)
    pub clock_ms: f64,

    pub players: [Player; 2],
    pub ai: Option<AiOpponent>,
    pub echoes: Vec<EchoPlayback>,
    pub food: Vec<Food>,
    pub powerups: Vec<PowerUp>,
    pub portals: Vec<Portal>,
    pub lasers: Vec<LaserGrid>,
    pub blocks: Vec<MovingBlock>,
    /// Static hazards from a custom level
    pub walls: Vec<IVec2>,

    pub multiplier: u32,
    /// Multiplier granted by power-ups, restored when paradox lapses
    pub bonus_multiplier: u32,
    pub combo: u32,
    pub combo_timer_ms: f32,
    pub max_combo: u32,
    pub paradox_mode: bool,
    pub paradox_timer_ms: f32,
    pub time_dilation: bool,
    pub food_frenzy: bool,
    pub active_effects: Vec<TimedEffect>,
    /// Difficulty speed factor derived from score
    pub game_speed: f32,
    /// Highest hazard milestone already handled
    pub hazard_milestone: u64,
    pub time_trial_remaining_ms: f32,

    pub food_collected: u32,
    pub echoes_created: u32,
    pub paradoxes_triggered: u32,

    /// Screen effect magnitudes (presentation only)
    pub screen_shake: f32,
    pub chromatic_aberration: f32,

    /// Events produced since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a single-player classic match on the default grid
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, &MatchConfig::default())
    }

    /// Start a match; a level that does not fit the grid is dropped with a
    /// warning and the match starts on an empty board
    pub fn with_config(seed: u64, config: &MatchConfig) -> Self {
        match Self::try_with_config(seed, config) {
            Ok(state) => state,
            Err(e) => {
                log::warn!("Ignoring invalid level: {}", e);
                let fallback = MatchConfig {
                    level: None,
                    ..config.clone()
                };
                Self::build(seed, &fallback)
            }
        }
    }

    /// Start a match, rejecting a level that does not fit the grid
    pub fn try_with_config(seed: u64, config: &MatchConfig) -> Result<Self, LevelError> {
        if let Some(level) = &config.level {
            level.validate(config.width.max(1), config.height.max(1))?;
        }
        Ok(Self::build(seed, config))
    }

    fn build(seed: u64, config: &MatchConfig) -> Self {
        let width = config.width.max(1);
        let height = config.height.max(1);
        let (spawn1, spawn2) = match &config.level {
            Some(level) => (level.spawn1.into(), level.spawn2.into()),
            None => (
                IVec2::new(width / 4, height / 2),
                IVec2::new(width * 3 / 4, height / 2),
            ),
        };

        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            width,
            height,
            mode: config.mode,
            player_mode: config.player_mode,
            phase: GamePhase::Playing,
            clock_ms: 0.0,
            players: [Player::spawned(spawn1, Direction::Right), Player::default()],
            ai: None,
            echoes: Vec::new(),
            food: Vec::new(),
            powerups: Vec::new(),
            portals: Vec::new(),
            lasers: Vec::new(),
            blocks: Vec::new(),
            walls: Vec::new(),
            multiplier: 1,
            bonus_multiplier: 1,
            combo: 0,
            combo_timer_ms: 0.0,
            max_combo: 0,
            paradox_mode: false,
            paradox_timer_ms: 0.0,
            time_dilation: false,
            food_frenzy: false,
            active_effects: Vec::new(),
            game_speed: 1.0,
            hazard_milestone: 0,
            time_trial_remaining_ms: TIME_TRIAL_MS,
            food_collected: 0,
            echoes_created: 0,
            paradoxes_triggered: 0,
            screen_shake: 0.0,
            chromatic_aberration: 0.0,
            events: Vec::new(),
        };

        match config.player_mode {
            PlayerMode::Single => {}
            PlayerMode::TwoPlayer => {
                state.players[1] = Player::spawned(spawn2, Direction::Left);
            }
            PlayerMode::VersusAi => {
                let mut ai = AiOpponent {
                    difficulty: config.ai_difficulty,
                    snake: None,
                };
                ai.snake = Some(ai.spawn_snake(spawn2, Direction::Left));
                state.ai = Some(ai);
            }
        }

        if let Some(level) = &config.level {
            state.load_level_entities(level);
        }

        state.spawn_food(FoodKind::Normal);
        state.spawn_food(FoodKind::Normal);
        if state.mode == GameMode::Temporal {
            state.spawn_food(FoodKind::Chrono);
        }

        log::info!(
            "Match started: {}x{} {:?} {:?} seed={}",
            width,
            height,
            state.mode,
            state.player_mode,
            seed
        );
        state
    }

    fn load_level_entities(&mut self, level: &LevelDefinition) {
        self.walls = level.walls.iter().map(|&w| w.into()).collect();
        self.lasers = level
            .lasers
            .iter()
            .map(|l| LaserGrid::new(IVec2::new(l.x, l.y), l.direction, l.length))
            .collect();
        self.portals = level
            .portals
            .iter()
            .map(|p| Portal::new(IVec2::new(p.x1, p.y1), IVec2::new(p.x2, p.y2)))
            .collect();
        log::info!(
            "Loaded level: {} walls, {} lasers, {} portals",
            self.walls.len(),
            self.lasers.len(),
            self.portals.len()
        );
    }

    pub fn player(&self, slot: PlayerSlot) -> &Player {
        &self.players[slot.index()]
    }

    pub fn player_mut(&mut self, slot: PlayerSlot) -> &mut Player {
        &mut self.players[slot.index()]
    }

    pub fn snake(&self, slot: PlayerSlot) -> Option<&Snake> {
        self.players[slot.index()].snake.as_ref()
    }

    pub fn snake_mut(&mut self, slot: PlayerSlot) -> Option<&mut Snake> {
        self.players[slot.index()].snake.as_mut()
    }

    pub fn ai_snake(&self) -> Option<&Snake> {
        self.ai.as_ref().and_then(|ai| ai.snake.as_ref())
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Uniform roll in [0, 1) from the match RNG
    pub fn roll(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    pub fn has_effect(&self, kind: TimedEffectKind, slot: PlayerSlot) -> bool {
        self.active_effects
            .iter()
            .any(|e| e.kind == kind && e.slot == slot)
    }

    /// Any slot holds an effect of this kind
    pub fn effect_active(&self, kind: TimedEffectKind) -> bool {
        self.active_effects.iter().any(|e| e.kind == kind)
    }

    pub fn add_effect(&mut self, kind: TimedEffectKind, slot: PlayerSlot, duration_ms: f64) {
        self.active_effects.push(TimedEffect {
            kind,
            slot,
            expires_at_ms: self.clock_ms + duration_ms,
        });
    }

    // --- Spawning ---

    fn is_occupied(&self, pos: IVec2) -> bool {
        self.players
            .iter()
            .filter_map(|p| p.snake.as_ref())
            .chain(self.ai_snake())
            .any(|s| s.occupies(pos))
            || self.walls.contains(&pos)
            || self.food.iter().any(|f| f.pos == pos)
            || self.powerups.iter().any(|p| p.pos == pos)
    }

    /// Random free cell, `None` after `SPAWN_ATTEMPTS` misses
    pub fn find_empty_position(&mut self) -> Option<IVec2> {
        for _ in 0..SPAWN_ATTEMPTS {
            let pos = IVec2::new(
                self.rng.random_range(0..self.width),
                self.rng.random_range(0..self.height),
            );
            if !self.is_occupied(pos) {
                return Some(pos);
            }
        }
        None
    }

    /// Random value in [margin, extent - margin), falling back to the full
    /// extent on grids too small for the margin
    fn inner_coord(&mut self, extent: i32, margin: i32) -> i32 {
        if extent > margin * 2 {
            self.rng.random_range(margin..extent - margin)
        } else {
            self.rng.random_range(0..extent.max(1))
        }
    }

    pub fn spawn_food(&mut self, kind: FoodKind) -> bool {
        match self.find_empty_position() {
            Some(pos) => {
                self.food.push(Food::new(pos, kind));
                true
            }
            None => false,
        }
    }

    pub fn spawn_powerup(&mut self) -> bool {
        let Some(pos) = self.find_empty_position() else {
            return false;
        };
        let kind = PowerUpKind::ALL[self.rng.random_range(0..PowerUpKind::ALL.len())];
        self.powerups.push(PowerUp::new(pos, kind));
        true
    }

    pub fn spawn_portal(&mut self) -> bool {
        let Some(entry) = self.find_empty_position() else {
            return false;
        };
        let Some(exit) = self.find_empty_position() else {
            return false;
        };
        if entry == exit {
            return false;
        }
        self.portals.push(Portal::new(entry, exit));
        true
    }

    /// Place a laser whose beam avoids every occupied cell
    pub fn spawn_laser(&mut self) -> bool {
        for _ in 0..SPAWN_ATTEMPTS {
            let origin = IVec2::new(self.inner_coord(self.width, 5), self.inner_coord(self.height, 5));
            let axis = if self.rng.random_bool(0.5) {
                LaserAxis::Horizontal
            } else {
                LaserAxis::Vertical
            };
            let length = self.rng.random_range(3..8);
            let laser = LaserGrid::new(origin, axis, length);
            let clear = laser
                .cells()
                .all(|c| in_bounds(c, self.width, self.height) && !self.is_occupied(c));
            if clear {
                log::debug!("Spawned laser at {:?} ({:?}, len {})", origin, axis, length);
                self.lasers.push(laser);
                return true;
            }
        }
        false
    }

    /// Place a block patrolling a 3x3 square loop
    pub fn spawn_moving_block(&mut self) -> bool {
        const SIZE: i32 = 3;
        for _ in 0..SPAWN_ATTEMPTS {
            let corner = IVec2::new(
                self.inner_coord(self.width - SIZE, 1),
                self.inner_coord(self.height - SIZE, 1),
            );
            let block = MovingBlock::square_patrol(corner, SIZE);
            let clear = block
                .path()
                .iter()
                .all(|&c| in_bounds(c, self.width, self.height) && !self.is_occupied(c));
            if clear {
                log::debug!("Spawned moving block at {:?}", corner);
                self.blocks.push(block);
                return true;
            }
        }
        false
    }

    /// Respawn position for the AI (best effort, not guaranteed safe)
    pub fn ai_respawn_position(&mut self) -> IVec2 {
        IVec2::new(self.inner_coord(self.width, 5), self.inner_coord(self.height, 5))
    }

    // --- Player actions ---

    /// Freeze the slot's recorder into a new echo.
    ///
    /// Refused with `Alert::MaxEchoes` (and no other change) when the slot is
    /// at capacity. Recordings too short to replay are discarded. The
    /// recorder restarts either way.
    pub fn save_timeline(&mut self, slot: PlayerSlot) -> bool {
        let player = &mut self.players[slot.index()];
        if player.recorder.is_none() {
            return false;
        }
        if player.saved_timelines.len() >= MAX_ECHOES {
            self.emit(GameEvent::Alert(Alert::MaxEchoes));
            return false;
        }

        let Some(recorder) = player.recorder.as_mut() else {
            return false;
        };
        let recording = recorder.stop();
        recorder.start();

        if recording.len() <= MIN_ECHO_SAMPLES {
            log::debug!(
                "P{} timeline too short to save ({} samples)",
                slot.number(),
                recording.len()
            );
            return false;
        }

        player.saved_timelines.push(recording.clone());
        self.echoes.push(EchoPlayback::new(recording));
        self.echoes_created += 1;
        log::info!("P{} saved a timeline ({} echoes live)", slot.number(), self.echoes.len());
        self.emit(GameEvent::EchoSaved { slot });
        self.emit(GameEvent::Alert(Alert::TimelineSaved(slot)));
        true
    }

    /// Short speed burst, available once the slot has saved a timeline
    pub fn activate_chrono_boost(&mut self, slot: PlayerSlot) -> bool {
        let player = &mut self.players[slot.index()];
        if player.saved_timelines.is_empty() {
            return false;
        }
        let Some(snake) = player.snake.as_mut() else {
            return false;
        };
        snake.speed_boost = CHRONO_BOOST_FACTOR;
        self.add_effect(TimedEffectKind::ChronoBoost, slot, CHRONO_BOOST_MS);
        self.emit(GameEvent::Alert(Alert::ChronoBoost));
        true
    }

    /// Temporary self-collision immunity; not re-armable while active
    pub fn activate_phase_mode(&mut self, slot: PlayerSlot) -> bool {
        let Some(snake) = self.snake_mut(slot) else {
            return false;
        };
        if !snake.activate_phase(PHASE_MODE_MS) {
            return false;
        }
        self.emit(GameEvent::Alert(Alert::PhaseMode));
        true
    }

    pub fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            GamePhase::Playing => GamePhase::Paused,
            GamePhase::Paused => GamePhase::Playing,
            GamePhase::GameOver => GamePhase::GameOver,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_match_layout() {
        let state = GameState::new(7);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.snake(PlayerSlot::One).unwrap().head(), IVec2::new(4, 8));
        assert!(state.snake(PlayerSlot::Two).is_none());
        assert!(state.ai.is_none());
        assert_eq!(state.food.len(), 2);
        assert!(state.player(PlayerSlot::One).recorder.as_ref().unwrap().is_recording());
    }

    #[test]
    fn test_two_player_and_ai_spawns() {
        let config = MatchConfig {
            player_mode: PlayerMode::TwoPlayer,
            ..Default::default()
        };
        let state = GameState::with_config(1, &config);
        let p2 = state.snake(PlayerSlot::Two).unwrap();
        assert_eq!(p2.head(), IVec2::new(12, 8));
        assert_eq!(p2.direction(), Direction::Left);

        let config = MatchConfig {
            player_mode: PlayerMode::VersusAi,
            ai_difficulty: AiDifficulty::Master,
            ..Default::default()
        };
        let state = GameState::with_config(1, &config);
        let ai = state.ai_snake().unwrap();
        assert_eq!(ai.move_interval_ms, 100.0);
    }

    #[test]
    fn test_out_of_grid_level_is_rejected() {
        let mut level = LevelDefinition::default();
        level.spawn1 = crate::level::GridPoint::new(-5, 40);
        level.add_wall(crate::level::GridPoint::new(99, 99));
        let config = MatchConfig {
            level: Some(level),
            ..Default::default()
        };

        assert!(matches!(
            GameState::try_with_config(1, &config),
            Err(LevelError::OutOfBounds { .. })
        ));

        let state = GameState::with_config(1, &config);
        assert!(state.walls.is_empty());
        assert_eq!(state.snake(PlayerSlot::One).unwrap().head(), IVec2::new(4, 8));
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_temporal_mode_spawns_chrono_fruit() {
        let config = MatchConfig {
            mode: GameMode::Temporal,
            ..Default::default()
        };
        let state = GameState::with_config(3, &config);
        assert_eq!(state.food.len(), 3);
        assert_eq!(state.food.iter().filter(|f| f.kind == FoodKind::Chrono).count(), 1);
    }

    #[test]
    fn test_spawn_avoids_occupied_cells() {
        let mut state = GameState::new(11);
        for _ in 0..50 {
            state.spawn_food(FoodKind::Normal);
        }
        let head = state.snake(PlayerSlot::One).unwrap().head();
        assert!(state.food.iter().all(|f| f.pos != head));
        let mut cells: Vec<_> = state.food.iter().map(|f| (f.pos.x, f.pos.y)).collect();
        cells.sort();
        cells.dedup();
        assert_eq!(cells.len(), state.food.len());
    }

    #[test]
    fn test_spawn_gives_up_on_full_grid() {
        let config = MatchConfig {
            width: 1,
            height: 1,
            ..Default::default()
        };
        let mut state = GameState::with_config(5, &config);
        assert!(state.food.is_empty());
        assert!(!state.spawn_food(FoodKind::Normal));
        assert!(state.find_empty_position().is_none());
    }

    #[test]
    fn test_short_timeline_not_saved() {
        let mut state = GameState::new(2);
        let snake = state.snake(PlayerSlot::One).unwrap().clone();
        let recorder = state.player_mut(PlayerSlot::One).recorder.as_mut().unwrap();
        for _ in 0..10 {
            recorder.record_sample(&snake, 16.0);
        }
        assert!(!state.save_timeline(PlayerSlot::One));
        assert!(state.echoes.is_empty());
        assert_eq!(state.echoes_created, 0);
        // Recorder restarted with an empty buffer
        let recorder = state.player(PlayerSlot::One).recorder.as_ref().unwrap();
        assert!(recorder.is_recording());
        assert_eq!(recorder.sample_count(), 0);
    }

    #[test]
    fn test_timeline_needs_more_than_minimum_samples() {
        let mut state = GameState::new(2);
        let snake = state.snake(PlayerSlot::One).unwrap().clone();
        let recorder = state.player_mut(PlayerSlot::One).recorder.as_mut().unwrap();
        for _ in 0..MIN_ECHO_SAMPLES {
            recorder.record_sample(&snake, 16.0);
        }
        assert!(!state.save_timeline(PlayerSlot::One));
        assert!(state.echoes.is_empty());

        let recorder = state.player_mut(PlayerSlot::One).recorder.as_mut().unwrap();
        for _ in 0..=MIN_ECHO_SAMPLES {
            recorder.record_sample(&snake, 16.0);
        }
        assert!(state.save_timeline(PlayerSlot::One));
        assert_eq!(state.echoes.len(), 1);
        assert_eq!(state.player(PlayerSlot::One).saved_timelines[0].len(), MIN_ECHO_SAMPLES + 1);
    }

    #[test]
    fn test_timeline_cap_refuses_without_side_effects() {
        let mut state = GameState::new(2);
        let snake = state.snake(PlayerSlot::One).unwrap().clone();
        for _ in 0..MAX_ECHOES {
            let recorder = state.player_mut(PlayerSlot::One).recorder.as_mut().unwrap();
            for _ in 0..=MIN_ECHO_SAMPLES {
                recorder.record_sample(&snake, 16.0);
            }
            assert!(state.save_timeline(PlayerSlot::One));
        }
        let recorder = state.player_mut(PlayerSlot::One).recorder.as_mut().unwrap();
        recorder.record_sample(&snake, 16.0);
        state.drain_events();

        assert!(!state.save_timeline(PlayerSlot::One));
        assert_eq!(state.echoes.len(), MAX_ECHOES);
        assert_eq!(state.echoes_created, MAX_ECHOES as u32);
        assert_eq!(state.drain_events(), vec![GameEvent::Alert(Alert::MaxEchoes)]);
        // Recorder kept its buffer
        let recorder = state.player(PlayerSlot::One).recorder.as_ref().unwrap();
        assert_eq!(recorder.sample_count(), 1);
    }

    #[test]
    fn test_chrono_boost_requires_saved_timeline() {
        let mut state = GameState::new(4);
        assert!(!state.activate_chrono_boost(PlayerSlot::One));
        let snake = state.snake(PlayerSlot::One).unwrap().clone();
        let recorder = state.player_mut(PlayerSlot::One).recorder.as_mut().unwrap();
        for _ in 0..=MIN_ECHO_SAMPLES {
            recorder.record_sample(&snake, 16.0);
        }
        assert!(state.save_timeline(PlayerSlot::One));
        assert!(state.activate_chrono_boost(PlayerSlot::One));
        assert_eq!(state.snake(PlayerSlot::One).unwrap().speed_boost, CHRONO_BOOST_FACTOR);
        assert!(state.has_effect(TimedEffectKind::ChronoBoost, PlayerSlot::One));
    }

    #[test]
    fn test_phase_mode_not_rearmed() {
        let mut state = GameState::new(4);
        assert!(state.activate_phase_mode(PlayerSlot::One));
        assert!(!state.activate_phase_mode(PlayerSlot::One));
        assert!(!state.activate_phase_mode(PlayerSlot::Two));
    }
}
