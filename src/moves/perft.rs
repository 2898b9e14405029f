//! Perft: exact legal-move-tree leaf counts.
//!
//! Draw detection is suspended for the duration of a run; perft counts
//! ignore the 50-move rule and repetitions.

use crate::engine::MoveEngine;
use crate::moves::types::Move;
use tracing::debug;

pub fn perft(engine: &mut MoveEngine, depth: u32) -> u64 {
    let saved = engine.can_draw;
    engine.can_draw = false;
    let nodes = walk(engine, depth);
    engine.can_draw = saved;
    nodes
}

/// Per-root-move breakdown plus the total, the way `perft <n>` prints it.
pub fn perft_divide(engine: &mut MoveEngine, depth: u32) -> (Vec<(Move, u64)>, u64) {
    let saved = engine.can_draw;
    engine.can_draw = false;

    let mut breakdown = Vec::new();
    let mut total = 0u64;
    for mv in engine.legal_moves() {
        engine.make(mv);
        let nodes = if depth <= 1 { 1 } else { walk(engine, depth - 1) };
        engine.unmake();
        debug!(mv = %mv.uci(), nodes, "perft divide");
        breakdown.push((mv, nodes));
        total += nodes;
    }

    engine.can_draw = saved;
    (breakdown, total)
}

fn walk(engine: &mut MoveEngine, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = engine.legal_moves();
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0;
    for mv in moves {
        engine.make(mv);
        nodes += walk(engine, depth - 1);
        engine.unmake();
    }
    nodes
}
