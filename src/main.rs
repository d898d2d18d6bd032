//! Spacer Field entry point
//!
//! Plays a seeded game in idle mode and prints a JSON summary of the run.

#[cfg(not(target_arch = "wasm32"))]
mod runner {
    use std::path::PathBuf;

    use anyhow::Result;
    use clap::Parser;
    use serde::Serialize;

    use spacer_field::consts::SIM_DT;
    use spacer_field::sim::{Building, Field, FieldEvent, GamePhase, SimContext, TickInput, tick};
    use spacer_field::{Difficulty, FieldSettings};

    /// Default run length: five simulated minutes
    const DEFAULT_FRAMES: u64 = 60 * 60 * 5;

    #[derive(Debug, Parser)]
    #[command(author, version, about = "Headless Spacer Field runner")]
    struct Cli {
        /// Run seed (defaults to the wall clock)
        #[arg(long)]
        seed: Option<u64>,

        /// Frames to simulate at 60 Hz
        #[arg(long, default_value_t = DEFAULT_FRAMES)]
        frames: u64,

        /// JSON settings file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Difficulty preset applied on top of the settings
        #[arg(long, value_parser = parse_difficulty)]
        difficulty: Option<Difficulty>,
    }

    fn parse_difficulty(s: &str) -> Result<Difficulty, String> {
        Difficulty::from_str(s).ok_or_else(|| format!("unknown difficulty `{s}`"))
    }

    /// Outcome of a headless run
    #[derive(Debug, Serialize)]
    struct RunSummary {
        seed: u64,
        frames: u64,
        elapsed: f32,
        outcome: GamePhase,
        spacers: usize,
        tears: usize,
        triangles: usize,
        clusters: usize,
    }

    fn clock_seed() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    pub fn run() -> Result<()> {
        let cli = Cli::parse();

        let mut settings = match &cli.config {
            Some(path) => FieldSettings::load(path),
            None => FieldSettings::default(),
        };
        if let Some(difficulty) = cli.difficulty {
            settings.apply_difficulty(difficulty);
        }

        let seed = cli.seed.unwrap_or_else(clock_seed);
        let frames = cli.frames;
        log::info!("Spacer Field starting with seed: {}", seed);

        let mut ctx = SimContext::new(seed);
        let mut field = Field::new(settings);
        field.generate(&mut ctx);

        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        while ctx.frame < frames && !field.phase().is_over() {
            for event in tick(&mut field, &mut ctx, &input, SIM_DT) {
                match event {
                    FieldEvent::GameOver { won } => {
                        log::info!(
                            "Game over at frame {}: {}",
                            ctx.frame,
                            if won { "won" } else { "lost" }
                        );
                    }
                    other => log::debug!("{:?}", other),
                }
            }
        }

        let count = |building: Building| {
            field
                .tiles()
                .iter()
                .filter(|t| t.building() == building)
                .count()
        };
        let summary = RunSummary {
            seed,
            frames: ctx.frame,
            elapsed: ctx.elapsed,
            outcome: field.phase(),
            spacers: count(Building::Spacer),
            tears: count(Building::Tear),
            triangles: field.triangle_count(),
            clusters: field.clusters().count(),
        };
        let json = serde_json::to_string_pretty(&summary)?;
        println!("{json}");
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    env_logger::init();
    runner::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No headless runner on the web; the library is driven by the host page
}
