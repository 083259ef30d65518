use std::path::PathBuf;

use anyhow::Context as _;
use bombris_engine::{BoardEngine, EngineConfig, EngineEvent, PieceSeed, SpeedPreset};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{
    schema::saved_game::SavedGame,
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    /// Seed for pieces and scripted input (32 hex digits, random if omitted)
    #[arg(long)]
    seed: Option<PieceSeed>,
    /// Maximum number of ticks to run
    #[arg(long, default_value_t = 200_000)]
    ticks: u64,
    /// Milliseconds of game time per tick
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,
    /// Starting fall speed
    #[arg(long, value_enum)]
    speed: Option<SpeedArg>,
    /// Board width
    #[arg(long)]
    width: Option<usize>,
    /// Board height
    #[arg(long)]
    height: Option<usize>,
    /// Bomb probability in percent
    #[arg(long)]
    bomb_percent: Option<u32>,
    /// Engine config JSON file; flags above override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum SpeedArg {
    Slow,
    Normal,
    Fast,
}

impl From<SpeedArg> for SpeedPreset {
    fn from(arg: SpeedArg) -> Self {
        match arg {
            SpeedArg::Slow => SpeedPreset::Slow,
            SpeedArg::Normal => SpeedPreset::Normal,
            SpeedArg::Fast => SpeedPreset::Fast,
        }
    }
}

impl SimulateArg {
    fn build_config(&self) -> anyhow::Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => util::read_config_file(path)?,
            None => EngineConfig::default(),
        };
        if let Some(speed) = self.speed {
            config = config.with_speed_preset(speed.into());
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(bomb_percent) = self.bomb_percent {
            config.bomb_percent = bomb_percent;
        }
        config.validate().context("Invalid engine config")?;
        Ok(config)
    }
}

/// Where the policy wants the current piece to go.
#[derive(Debug, Clone, Copy)]
struct Plan {
    rotations: u8,
    column: i32,
    hard_drop: bool,
}

/// Deterministic stand-in for a player: picks a random rotation and column
/// for every new piece, steers towards it one command per tick, then either
/// hard drops or holds fast fall.
struct ScriptedPolicy {
    rng: Pcg32,
    plan: Option<Plan>,
    locked_pieces: u64,
}

impl ScriptedPolicy {
    fn new(seed: PieceSeed) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.to_bytes()),
            plan: None,
            locked_pieces: 0,
        }
    }

    fn act(&mut self, engine: &mut BoardEngine) {
        let locked_pieces = engine.stats().completed_pieces();
        if self.plan.is_none() || locked_pieces != self.locked_pieces {
            self.locked_pieces = locked_pieces;
            engine.set_fast_fall(false);
            let width = i32::try_from(engine.config().width).unwrap_or(i32::MAX);
            self.plan = Some(Plan {
                rotations: self.rng.random_range(0..4),
                column: self.rng.random_range(0..width),
                hard_drop: self.rng.random_bool(0.7),
            });
        }
        let Some(plan) = &mut self.plan else {
            return;
        };

        if plan.rotations > 0 {
            plan.rotations -= 1;
            engine.rotate();
            return;
        }
        let x = engine.current_piece().x();
        if x < plan.column {
            if !engine.move_right() {
                plan.column = x;
            }
        } else if x > plan.column {
            if !engine.move_left() {
                plan.column = x;
            }
        } else if plan.hard_drop {
            engine.hard_drop();
        } else {
            engine.set_fast_fall(true);
        }
    }
}

fn log_event(tick: u64, event: &EngineEvent) {
    match event {
        EngineEvent::PieceLocked { .. } => {}
        EngineEvent::LinesCleared { rows, points } => {
            eprintln!("[tick {tick}] cleared {rows} line(s) for {points} points");
        }
        EngineEvent::BombExploded { x, y, destroyed } => {
            eprintln!("[tick {tick}] bomb exploded at ({x}, {y}), destroyed {destroyed} cell(s)");
        }
        EngineEvent::ScoreMilestone { score } => {
            eprintln!("[tick {tick}] reached {score} points");
        }
        EngineEvent::SpeedUp { fall_interval_ms } => {
            eprintln!("[tick {tick}] speed up! fall interval is now {fall_interval_ms}ms");
        }
        EngineEvent::GameOver { score } => {
            eprintln!("[tick {tick}] game over with {score} points");
        }
    }
}

/// Plays a game until its game-over animation completes or `ticks` run out.
///
/// Returns the engine and the number of ticks run.
fn simulate<F>(
    config: EngineConfig,
    seed: PieceSeed,
    ticks: u64,
    tick_ms: u64,
    mut on_event: F,
) -> anyhow::Result<(BoardEngine, u64)>
where
    F: FnMut(u64, &EngineEvent),
{
    let mut engine = BoardEngine::with_seed(config, seed)?;
    let mut policy = ScriptedPolicy::new(seed);
    let mut ticks_run = 0;
    while ticks_run < ticks && !engine.is_game_over_animation_complete() {
        if !engine.is_game_over() {
            policy.act(&mut engine);
        }
        engine.tick(tick_ms);
        for event in engine.take_events() {
            on_event(ticks_run, &event);
        }
        ticks_run += 1;
    }
    Ok((engine, ticks_run))
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let config = arg.build_config()?;
    let seed = arg.seed.unwrap_or_else(|| rand::rng().random());
    eprintln!(
        "Simulating a {}x{} game with seed {seed}...",
        config.width, config.height
    );

    let (engine, ticks_run) = simulate(config.clone(), seed, arg.ticks, arg.tick_ms, log_event)?;

    let stats = engine.stats();
    eprintln!();
    eprintln!("Ticks run: {ticks_run}");
    eprintln!("Score: {}", stats.score());
    eprintln!("Pieces locked: {}", stats.completed_pieces());
    eprintln!("Lines cleared: {}", stats.total_cleared_lines());
    eprintln!("Bombs exploded: {}", stats.bombs_exploded());
    eprintln!("Fall interval: {}ms", engine.fall_interval_ms());
    eprintln!("Game over: {}", engine.is_game_over());

    let saved = SavedGame {
        saved_at: chrono::Utc::now(),
        seed,
        config,
        snapshot: engine.export(),
    };
    let mut output = Output::open(arg.output.as_deref())?;
    output.write_json(&saved)?;
    eprintln!("Saved game written to {}", output.name());
    Ok(())
}
