//! Property tests for the rules engine.
//!
//! Random seeds and command scripts drive an engine while checking the
//! invariants that must hold in every reachable state:
//!
//! - locked cells stay on the board and the falling piece never overlaps them
//! - the score never decreases and the fall interval never increases
//! - each speed-up threshold is applied at most once
//! - export/import reproduces the state exactly

use bombris_engine::{BoardEngine, EngineConfig, EngineEvent, PieceSeed};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Command {
    Tick(u64),
    Left,
    Right,
    Rotate,
    FastFall(bool),
    HardDrop,
}

fn command() -> impl Strategy<Value = Command> {
    prop_oneof![
        4 => (1u64..600).prop_map(Command::Tick),
        2 => Just(Command::Left),
        2 => Just(Command::Right),
        2 => Just(Command::Rotate),
        1 => any::<bool>().prop_map(Command::FastFall),
        1 => Just(Command::HardDrop),
    ]
}

fn config() -> impl Strategy<Value = EngineConfig> {
    (4usize..=16, 4usize..=24, 0u32..=100, prop::bool::ANY).prop_map(
        |(width, height, bomb_percent, strict_top_out)| EngineConfig {
            width,
            height,
            bomb_percent,
            // Low thresholds so speed-ups actually happen within a short script.
            speed_up_threshold: 200,
            score_milestone: 50,
            top_out_rows: usize::from(strict_top_out),
            ..EngineConfig::default()
        },
    )
}

fn apply(engine: &mut BoardEngine, command: Command) {
    match command {
        Command::Tick(ms) => engine.tick(ms),
        Command::Left => {
            engine.move_left();
        }
        Command::Right => {
            engine.move_right();
        }
        Command::Rotate => {
            engine.rotate();
        }
        Command::FastFall(enabled) => engine.set_fast_fall(enabled),
        Command::HardDrop => {
            engine.hard_drop();
        }
    }
}

fn assert_state_consistent(engine: &BoardEngine) {
    let board = engine.board();
    for (x, y, _) in board.locked_cells() {
        assert!(x < board.width() && y < board.height());
    }
    if !engine.is_game_over() {
        assert!(board.is_valid_move(engine.current_piece(), 0, 0));
    }
    assert!(engine.effective_fall_interval_ms() <= engine.fall_interval_ms());
    assert!(engine.fall_interval_ms() >= engine.config().min_fall_interval_ms);
}

proptest! {
    #[test]
    fn generated_script_respects_engine_invariants(
        seed in any::<[u8; 16]>(),
        config in config(),
        commands in prop::collection::vec(command(), 1..300),
    ) {
        let mut engine = BoardEngine::with_seed(config, PieceSeed::from_bytes(seed)).unwrap();
        let mut score = engine.score();
        let mut interval = engine.fall_interval_ms();
        let mut speed_up_events = 0;
        let mut game_over_events = 0;

        for command in commands {
            let was_game_over = engine.is_game_over();
            apply(&mut engine, command);
            assert_state_consistent(&engine);

            prop_assert!(engine.score() >= score);
            prop_assert!(engine.fall_interval_ms() <= interval);
            prop_assert!(!was_game_over || engine.is_game_over());
            score = engine.score();
            interval = engine.fall_interval_ms();

            for event in engine.take_events() {
                match event {
                    EngineEvent::SpeedUp { .. } => speed_up_events += 1,
                    EngineEvent::GameOver { .. } => game_over_events += 1,
                    _ => {}
                }
            }
        }

        let crossed = engine.score() / engine.config().speed_up_threshold;
        prop_assert_eq!(engine.speed_ups_applied(), crossed);
        prop_assert!(speed_up_events <= crossed);
        prop_assert_eq!(game_over_events, u32::from(engine.is_game_over()));
    }

    #[test]
    fn export_then_restore_is_identity(
        seed in any::<[u8; 16]>(),
        config in config(),
        commands in prop::collection::vec(command(), 0..200),
        continuation in prop::collection::vec(command(), 0..50),
    ) {
        let mut engine = BoardEngine::with_seed(config, PieceSeed::from_bytes(seed)).unwrap();
        for command in commands {
            apply(&mut engine, command);
        }
        engine.take_events();

        let snapshot = engine.export();
        let json = serde_json::to_string(&snapshot).unwrap();
        let mut restored =
            BoardEngine::from_snapshot(engine.config().clone(), serde_json::from_str(&json).unwrap())
                .unwrap();
        prop_assert_eq!(&restored, &engine);

        for command in continuation {
            apply(&mut engine, command);
            apply(&mut restored, command);
        }
        prop_assert_eq!(restored.export(), engine.export());
    }

    #[test]
    fn restore_rejects_mismatched_board(
        seed in any::<[u8; 16]>(),
        width in 4usize..=16,
        height in 4usize..=24,
    ) {
        let engine = BoardEngine::with_seed(EngineConfig::default(), PieceSeed::from_bytes(seed)).unwrap();
        prop_assume!((width, height) != (10, 20));
        let config = EngineConfig { width, height, ..EngineConfig::default() };
        prop_assert!(BoardEngine::from_snapshot(config, engine.export()).is_err());
    }
}

#[test]
fn clearing_without_full_rows_is_noop() {
    let config = EngineConfig {
        bomb_percent: 0,
        ..EngineConfig::default()
    };
    let mut engine = BoardEngine::with_seed(config, PieceSeed::from_bytes([3; 16])).unwrap();
    // A single piece on an empty board can never complete a row.
    engine.hard_drop();
    let mut board = engine.board().clone();
    let before = board.clone();
    assert_eq!(board.clear_lines(), 0);
    assert_eq!(board, before);
    assert_eq!(engine.stats().line_cleared_counter()[0], 1);
}
