//! Chrono Serpent - headless driver
//!
//! Plays a match on autopilot at a simulated 60 Hz display rate, drawing the
//! board as text and logging sounds. Finished matches go to the leaderboard
//! in the data directory.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use clap::Parser;

    use chrono_serpent::audio::{AudioMixer, LogAudio, dispatch_events};
    use chrono_serpent::level::LevelDefinition;
    use chrono_serpent::persistence::{self, JsonFileStore, Persistence};
    use chrono_serpent::platform::{FrameClock, now_epoch_ms};
    use chrono_serpent::renderer::{AsciiRenderer, Frame, Renderer};
    use chrono_serpent::sim::ai::{self, AiView};
    use chrono_serpent::sim::collision::obstacle_cells;
    use chrono_serpent::sim::{AiDifficulty, GameEvent, GameState, PlayerMode, PlayerSlot, TickInput, tick};
    use chrono_serpent::Settings;

    /// Simulated display refresh interval
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Autopilot saves a timeline this often (ms of match time)
    const SAVE_EVERY_MS: f64 = 8_000.0;
    /// Print the board every this many frames
    const DRAW_EVERY: u64 = 120;

    #[derive(Parser, Debug)]
    #[command(
        author,
        version,
        about = "Headless Chrono Serpent match on autopilot",
        long_about = "Plays a match against the AI with the first player on a master-level autopilot.\n\
                      The board is printed as text, sounds are logged, and the final score goes to\n\
                      the leaderboard in the data directory."
    )]
    pub struct Args {
        /// Match seed
        #[arg(long, default_value_t = 0xC0FFEE)]
        pub seed: u64,

        /// Level share code to play on
        #[arg(long)]
        pub level: Option<String>,

        /// Frames to simulate before stopping (60 per second)
        #[arg(long, default_value_t = 60 * 120)]
        pub frames: u64,

        /// Directory holding settings, levels and high scores
        #[arg(long, default_value = ".chrono-serpent")]
        pub data: PathBuf,

        /// Color the board with ANSI escapes
        #[arg(long)]
        pub ansi: bool,
    }

    /// Master-level steering for a human slot
    fn autopilot(state: &GameState, slot: PlayerSlot, roll: f32) -> Option<chrono_serpent::Direction> {
        let head = state.snake(slot)?.head();
        let obstacles = obstacle_cells(&state.walls, &state.lasers, &state.blocks);
        let view = AiView {
            head,
            food: &state.food,
            opponent_head: state.snake(slot.other()).map(|s| s.head()),
            obstacles: &obstacles,
        };
        ai::decide(AiDifficulty::Master, &view, roll)
    }

    pub fn run(args: Args) {
        let settings = Settings::load(&args.data.join("settings.json"));
        let mut store = JsonFileStore::new(&args.data);
        let saved = persistence::levels_or_default(&store, settings.grid_width, settings.grid_height);
        log::info!("{} saved level(s) in {}", saved.len(), store.dir().display());

        let level = args.level.as_deref().and_then(|code| {
            match LevelDefinition::from_code(code, settings.grid_width, settings.grid_height) {
                Ok(level) => Some(level),
                Err(e) => {
                    log::warn!("Ignoring level code: {}", e);
                    None
                }
            }
        });

        let mut config = settings.match_config(level);
        if config.player_mode == PlayerMode::Single {
            config.player_mode = PlayerMode::VersusAi;
        }
        let mut state = GameState::with_config(args.seed, &config);
        log::info!(
            "Match starting: {:?} / {:?} on {}x{} (seed {})",
            state.mode,
            state.player_mode,
            state.width,
            state.height,
            args.seed
        );

        let mut audio = AudioMixer::new(LogAudio);
        audio.set_master_volume(settings.master_volume);
        audio.set_sfx_volume(settings.sfx_volume);
        audio.set_muted(settings.muted);

        let render_config = settings.render_config();
        let mut renderer = AsciiRenderer::with_ansi(args.ansi);
        let mut clock = FrameClock::new();
        let mut next_save_ms = SAVE_EVERY_MS;

        for frame in 0..args.frames {
            let now = frame as f64 * FRAME_MS;
            let dt = clock.frame(now);

            let mut input = TickInput::default();
            for slot in PlayerSlot::ALL {
                if slot == PlayerSlot::Two && state.player_mode != PlayerMode::TwoPlayer {
                    continue;
                }
                let roll = state.roll();
                input.directions[slot.index()] = autopilot(&state, slot, roll);
            }
            if state.clock_ms >= next_save_ms {
                input.actions[0].save_timeline = true;
                next_save_ms += SAVE_EVERY_MS;
            }

            tick(&mut state, &input, dt);

            let events = state.drain_events();
            dispatch_events(&events, &mut audio);
            for event in &events {
                match event {
                    GameEvent::Alert(alert) => log::info!("{}", alert.text()),
                    GameEvent::Death { slot, cause } => {
                        log::info!("Player {} {}", slot.number(), cause.describe())
                    }
                    _ => {}
                }
            }

            if frame % DRAW_EVERY == 0 || state.is_over() {
                print!("{}", renderer.render(&Frame::new(&state), &render_config, now));
            }
            if state.is_over() {
                break;
            }
        }

        let score = state.player(PlayerSlot::One).score;
        log::info!(
            "Match ended after {:.1}s: score {}, food {}, echoes {}, paradoxes {}",
            state.clock_ms / 1000.0,
            score,
            state.food_collected,
            state.echoes_created,
            state.paradoxes_triggered
        );

        if state.is_over() {
            if let Some(rank) = persistence::record_match(&mut store, &state, now_epoch_ms()) {
                println!("New high score! Rank #{}", rank);
            }
        }
        if let Ok(scores) = store.load_high_scores() {
            if let Some(top) = scores.top_score() {
                println!("Best: {}", top);
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    let args = <native::Args as clap::Parser>::parse();
    log::info!("Chrono Serpent (native) starting...");
    native::run(args);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Web hosts drive the library directly
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use clap::Parser;

    use super::native::Args;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["chrono-serpent"]).unwrap();
        assert_eq!(args.seed, 0xC0FFEE);
        assert_eq!(args.frames, 7_200);
        assert_eq!(args.data, std::path::PathBuf::from(".chrono-serpent"));
        assert!(args.level.is_none());
        assert!(!args.ansi);
    }

    #[test]
    fn test_args_parse_flags() {
        let args = Args::try_parse_from([
            "chrono-serpent",
            "--seed",
            "42",
            "--level",
            "eyJ3YWxscyI6W119",
            "--frames",
            "10",
            "--ansi",
        ])
        .unwrap();
        assert_eq!(args.seed, 42);
        assert_eq!(args.level.as_deref(), Some("eyJ3YWxscyI6W119"));
        assert_eq!(args.frames, 10);
        assert!(args.ansi);
    }

    #[test]
    fn test_args_reject_bad_numbers() {
        assert!(Args::try_parse_from(["chrono-serpent", "--seed", "abc"]).is_err());
        assert!(Args::try_parse_from(["chrono-serpent", "--seed"]).is_err());
        assert!(Args::try_parse_from(["chrono-serpent", "--bogus"]).is_err());
    }
}
