//! Rift Runner headless runner
//!
//! Drives the simulation at a fixed frame rate without a renderer: useful for
//! soak runs, balance checks and demo-mode replays. The browser build talks to
//! the library through `platform::web` instead.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use anyhow::{Context, Result};
    use clap::Parser;

    use rift_runner::highscores::{HighScores, format_date};
    use rift_runner::platform::now_ms;
    use rift_runner::sim::{GameEvent, GamePhase, InputIntent, tick};
    use rift_runner::{Difficulty, Settings, Tuning};

    #[derive(Parser, Debug)]
    #[command(name = "rift-runner", version, about = "Headless two-realm brawler simulation")]
    struct Args {
        /// RNG seed (skyline layout, waves, AI rolls)
        #[arg(long, default_value_t = 1)]
        seed: u64,

        /// Simulated seconds to run
        #[arg(long, default_value_t = 60.0)]
        seconds: f32,

        /// Simulated frames per second
        #[arg(long, default_value_t = 60)]
        fps: u32,

        /// JSON file with balance overrides
        #[arg(long)]
        tuning: Option<PathBuf>,

        /// easy, normal or hard
        #[arg(long, default_value = "normal", value_parser = parse_difficulty)]
        difficulty: Difficulty,

        /// Let the AI play the player
        #[arg(long)]
        demo: bool,

        /// Leaderboard file, read before and written after the run
        #[arg(long)]
        scores: Option<PathBuf>,
    }

    fn parse_difficulty(s: &str) -> Result<Difficulty, String> {
        Difficulty::from_str(s).ok_or_else(|| format!("unknown difficulty '{s}'"))
    }

    fn load_tuning(path: Option<&PathBuf>) -> Result<Tuning> {
        let Some(path) = path else {
            return Ok(Tuning::default());
        };
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading tuning file {}", path.display()))?;
        Tuning::from_json(&json).with_context(|| format!("invalid tuning in {}", path.display()))
    }

    fn load_scores(path: Option<&PathBuf>) -> Result<HighScores> {
        match path {
            Some(path) if path.exists() => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading scores {}", path.display()))?;
                Ok(HighScores::from_json(&json)?)
            }
            _ => Ok(HighScores::new()),
        }
    }

    pub fn run() -> Result<()> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        let args = Args::parse();

        let base = load_tuning(args.tuning.as_ref())?;
        let settings = Settings::from_difficulty(args.difficulty);
        let mut scores = load_scores(args.scores.as_ref())?;

        let mut state = settings.new_game(args.seed, &base);
        state.start();
        log::info!(
            "Running {}s at {} fps (seed {}, {}, demo {})",
            args.seconds,
            args.fps,
            args.seed,
            args.difficulty.as_str(),
            args.demo
        );

        let dt = 1.0 / args.fps.max(1) as f32;
        let frames = (args.seconds.max(0.0) / dt).round() as u64;
        let input = InputIntent {
            demo: args.demo,
            ..InputIntent::default()
        };

        let mut runs = 0u32;
        for _ in 0..frames {
            tick(&mut state, &input, dt);
            for event in state.drain_events() {
                if let GameEvent::PlayerDied { .. } = event {
                    runs += 1;
                    if let Some(run) = state.last_run {
                        scores.add_score(run, now_ms());
                    }
                }
            }
        }

        if state.phase == GamePhase::Running {
            log::info!(
                "Stopped on wave {} with score {} ({} kills, {} hp)",
                state.wave(),
                state.score,
                state.kills,
                state.player.hp.round()
            );
        }
        println!("Runs finished: {runs}");
        for (i, entry) in scores.entries.iter().enumerate() {
            println!(
                "#{} {:>7}  wave {:>2}  {:>3} kills  {}",
                i + 1,
                entry.score,
                entry.wave,
                entry.kills,
                format_date(entry.timestamp_ms)
            );
        }

        if let Some(path) = &args.scores {
            std::fs::write(path, scores.to_json()?)
                .with_context(|| format!("writing scores {}", path.display()))?;
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The wasm entry point is `platform::web::start`
}
