use tempo::engine::{MoveEngine, TerminalStatus};

fn play(engine: &mut MoveEngine, line: &[&str]) {
    for uci in line {
        let mv = engine
            .move_from_uci(uci)
            .unwrap_or_else(|e| panic!("{uci}: {e}"));
        engine.make(mv);
    }
}

#[test]
fn knight_shuffle_reaches_threefold() {
    let mut engine = MoveEngine::start();
    let loop_once = ["b1c3", "b8c6", "c3b1", "c6b8"];

    play(&mut engine, &loop_once);
    assert_eq!(engine.repetition_count(), 2);
    assert_eq!(engine.terminal_status(), TerminalStatus::Ongoing);

    play(&mut engine, &loop_once);
    // Third visit to the starting position.
    assert_eq!(engine.repetition_count(), 3);
    assert!(engine.is_draw());
    assert_eq!(engine.terminal_status(), TerminalStatus::Draw);
    assert!(engine.legal_moves().is_empty());

    // Unwinding out of the repetition revives the game.
    engine.unmake();
    assert_eq!(engine.terminal_status(), TerminalStatus::Ongoing);
}

#[test]
fn fifty_move_rule_fires_at_the_configured_threshold() {
    let mut engine =
        MoveEngine::from_fen("4k3/8/8/8/8/8/8/4K2R w - - 50 80").unwrap();
    assert!(engine.is_draw());
    assert_eq!(engine.terminal_status(), TerminalStatus::Draw);

    // Standard play wants 100; the threshold is a field.
    engine.halfmove_draw_threshold = 100;
    assert!(!engine.is_draw());
    assert_eq!(engine.terminal_status(), TerminalStatus::Ongoing);

    let mut at_hundred =
        MoveEngine::from_fen("4k3/8/8/8/8/8/8/4K2R w - - 100 120").unwrap();
    at_hundred.halfmove_draw_threshold = 100;
    assert!(at_hundred.is_draw());
}

#[test]
fn bare_kings_and_single_minors_are_drawn() {
    for fen in [
        "4k3/8/8/8/8/8/8/4K3 w - - 0 1",          // K vs K
        "4k3/8/8/8/8/8/8/3NK3 w - - 0 1",          // K+N vs K
        "4k3/8/8/8/8/8/8/3BK3 w - - 0 1",          // K+B vs K
        "4k3/8/8/8/8/8/8/1NN1K3 w - - 0 1",        // K+NN vs bare K
    ] {
        let engine = MoveEngine::from_fen(fen).unwrap();
        assert!(engine.is_draw(), "{fen} should be a dead draw");
        assert_eq!(engine.terminal_status(), TerminalStatus::Draw, "{fen}");
    }
}

#[test]
fn mating_material_keeps_the_game_alive() {
    for fen in [
        "4k3/8/8/8/8/8/8/3QK3 w - - 0 1",          // queen
        "4k3/8/8/8/8/8/8/3RK3 w - - 0 1",          // rook
        "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1",         // a single pawn
        "4k3/8/8/8/8/8/8/2NB1K2 w - - 0 1",        // bishop + knight
        "4k3/8/8/8/8/8/8/1B1B1K2 w - - 0 1",       // two bishops
        "3nk3/8/8/8/8/8/8/1NN1K3 w - - 0 1",       // two knights vs a minor
    ] {
        let engine = MoveEngine::from_fen(fen).unwrap();
        assert!(!engine.is_draw(), "{fen} still has mating material");
        assert_eq!(engine.terminal_status(), TerminalStatus::Ongoing, "{fen}");
    }
}

#[test]
fn stalemate_is_not_a_draw_by_material() {
    // Classic corner stalemate: Black to move, no moves, not in check.
    let engine = MoveEngine::from_fen("k7/2Q5/8/8/8/8/8/4K3 b - - 0 1").unwrap();
    assert!(!engine.in_check());
    assert!(engine.legal_moves().is_empty());
    assert_eq!(engine.terminal_status(), TerminalStatus::Stalemate);
}

#[test]
fn checkmate_outranks_the_move_counter_only_below_the_threshold() {
    // Mate on the board with the clock short of the threshold: checkmate.
    let mated = MoveEngine::from_fen("RR5K/8/8/8/8/8/8/k7 b - - 49 80").unwrap();
    assert_eq!(mated.terminal_status(), TerminalStatus::Checkmate);
    // At the threshold the draw rule speaks first.
    let drawn = MoveEngine::from_fen("RR5K/8/8/8/8/8/8/k7 b - - 50 80").unwrap();
    assert_eq!(drawn.terminal_status(), TerminalStatus::Draw);
}

#[test]
fn threefold_counts_positions_not_move_pairs() {
    // Reaching the same position via a transposition still counts.
    let mut engine = MoveEngine::start();
    play(&mut engine, &["g1f3", "g8f6", "f3g1", "f6g8"]);
    assert_eq!(engine.repetition_count(), 2);
    play(&mut engine, &["b1c3", "b8c6", "c3b1", "c6b8"]);
    assert_eq!(engine.repetition_count(), 3);
    assert_eq!(engine.terminal_status(), TerminalStatus::Draw);
}
