//! Make/unmake invariants on randomized games.
//!
//! After every make and every unmake: the bitboards, square lists and
//! occupancies agree; the incremental hash equals a from-scratch hash;
//! FEN and UCI round-trip; and unwinding the whole game restores every
//! recorded position exactly.

use tempo::board::Board;
use tempo::cache::zobrist::hash_board;
use tempo::engine::MoveEngine;
use std::str::FromStr;

fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn assert_consistent(engine: &MoveEngine) {
    engine.board.validate().unwrap_or_else(|e| panic!("{e}\nFEN: {}", engine.board.to_fen()));
    assert_eq!(
        engine.current_hash(),
        hash_board(&engine.board),
        "incremental hash diverged\nFEN: {}",
        engine.board.to_fen()
    );
    let fen = engine.board.to_fen();
    let reparsed = Board::from_str(&fen).expect("own FEN parses");
    assert_eq!(reparsed, engine.board, "FEN round trip changed the position");
}

fn random_walk(seed: u64, max_plies: usize) {
    let mut engine = MoveEngine::start();
    let mut rng = seed;
    let mut trail: Vec<(String, u64)> = Vec::new();

    for _ in 0..max_plies {
        let moves = engine.legal_moves();
        if moves.is_empty() {
            break;
        }
        rng = splitmix64(rng);
        let mv = moves[(rng % moves.len() as u64) as usize];

        // The UCI string resolves back to the same move pre-make.
        let resolved = engine.move_from_uci(&mv.uci()).expect("own UCI resolves");
        assert_eq!(resolved, mv);

        trail.push((engine.board.to_fen(), engine.current_hash()));
        engine.make(mv);
        assert_consistent(&engine);
    }

    // Unwind everything; every recorded position must come back verbatim.
    while let Some((fen, hash)) = trail.pop() {
        engine.unmake();
        assert_consistent(&engine);
        assert_eq!(engine.board.to_fen(), fen);
        assert_eq!(engine.current_hash(), hash);
    }
    assert!(engine.move_stack().is_empty());
}

#[test]
fn random_games_hold_every_invariant() {
    for seed in 1..=8u64 {
        random_walk(seed * 0x1234_5678_9ABC_DEF, 120);
    }
}

#[test]
fn random_games_from_a_sharp_position() {
    // Kiwipete has castles, promotions-to-come and en passant in reach.
    let kiwipete = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    for seed in 1..=6u64 {
        let mut engine = MoveEngine::from_fen(kiwipete).unwrap();
        let mut rng = seed;
        let mut depth = 0;
        for _ in 0..80 {
            let moves = engine.legal_moves();
            if moves.is_empty() {
                break;
            }
            rng = splitmix64(rng);
            engine.make(moves[(rng % moves.len() as u64) as usize]);
            depth += 1;
            assert_consistent(&engine);
        }
        for _ in 0..depth {
            engine.unmake();
            assert_consistent(&engine);
        }
        assert_eq!(engine.board.to_fen(), kiwipete);
    }
}

#[test]
fn make_unmake_is_identity_for_every_root_move() {
    for fen in [
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1",
    ] {
        let mut engine = MoveEngine::from_fen(fen).unwrap();
        let hash = engine.current_hash();
        for mv in engine.legal_moves() {
            engine.make(mv);
            engine.unmake();
            assert_eq!(engine.board.to_fen(), fen, "after {}", mv.uci());
            assert_eq!(engine.current_hash(), hash, "after {}", mv.uci());
        }
    }
}

#[test]
fn uci_promotions_resolve_to_distinct_moves() {
    let engine = MoveEngine::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    let queen = engine.move_from_uci("a7a8q").unwrap();
    let knight = engine.move_from_uci("a7a8n").unwrap();
    assert_ne!(queen, knight);
    assert!(engine.move_from_uci("a7a8").is_err(), "promotion letter required");
    assert!(engine.move_from_uci("a7a8x").is_err());
}
