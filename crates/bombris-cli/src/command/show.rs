use std::path::PathBuf;

use anyhow::Context as _;
use bombris_engine::{BoardEngine, Piece};

use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ShowArg {
    /// Saved game file written by `simulate`
    file: PathBuf,
}

/// Renders the board with the current piece drawn in lowercase and its
/// landing position drawn as `+`.
fn render_board(engine: &BoardEngine) -> Vec<String> {
    let board = engine.board();
    let mut rows: Vec<Vec<char>> = board
        .rows()
        .map(|row| row.iter().map(|cell| cell.as_char()).collect())
        .collect();
    let mut draw = |piece: &Piece, ch: char| {
        for (x, y) in piece.occupied_positions() {
            let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
                continue;
            };
            if let Some(cell) = rows.get_mut(y).and_then(|row| row.get_mut(x)) {
                *cell = ch;
            }
        }
    };
    if !engine.is_game_over() {
        let current = engine.current_piece();
        draw(&engine.ghost_piece(), '+');
        draw(current, current.kind().as_char().to_ascii_lowercase());
    }
    rows.into_iter()
        .map(|row| format!("|{}|", row.into_iter().collect::<String>()))
        .collect()
}

pub(crate) fn run(arg: &ShowArg) -> anyhow::Result<()> {
    let saved = util::read_saved_game_file(&arg.file)?;
    let engine = BoardEngine::from_snapshot(saved.config, saved.snapshot)
        .with_context(|| format!("Invalid snapshot in {}", arg.file.display()))?;

    println!("Saved at: {}", saved.saved_at);
    println!("Seed: {}", saved.seed);
    println!();
    for line in render_board(&engine) {
        println!("{line}");
    }
    println!("+{}+", "-".repeat(engine.board().width()));
    println!();

    let stats = engine.stats();
    let next = engine.next_piece();
    println!("Score: {}", stats.score());
    println!("Pieces locked: {}", stats.completed_pieces());
    println!("Lines cleared: {}", stats.total_cleared_lines());
    println!(
        "Clears (single/double/triple/quad): {:?}",
        &stats.line_cleared_counter()[1..]
    );
    println!(
        "Bombs exploded: {} ({} cells destroyed)",
        stats.bombs_exploded(),
        stats.bomb_cells_destroyed()
    );
    println!(
        "Fall interval: {}ms ({} speed-ups)",
        engine.fall_interval_ms(),
        engine.speed_ups_applied()
    );
    println!("Next piece: {:?}", next.kind());
    for row in next.shape().to_rows() {
        println!("  {row}");
    }
    if engine.is_game_over() {
        println!("Game over ({:?})", engine.game_over_animation());
    }
    Ok(())
}
