//! Move ordering for the alpha-beta loop.
//!
//! The presort key rewards promotions, en passant, winning-looking
//! captures and positional gains; the searcher adds the principal-
//! variation bonus on top when it is following the previous iteration's
//! line.

use crate::board::{Board, Color, Piece};
use crate::cache::cache;
use crate::moves::types::Move;
use crate::search::eval::piece_weight;
use crate::search::pst;
use crate::square::Square;

pub const KEY_W_PV: i32 = 10_000;
pub const KEY_W_PROMOTION: i32 = 900;
pub const KEY_W_EN_PASSANT: i32 = 200;
/// Floor for the capture bonus of a good capture.
pub const KEY_W_CAPTURE_FLOOR: i32 = 50;

/// Higher sorts earlier.
pub fn presort_key(board: &Board, mv: Move, endgame: bool) -> i32 {
    let mut weight = 0;

    if mv.promotion().is_some() {
        weight += KEY_W_PROMOTION;
    }
    if mv.is_en_passant() {
        weight += KEY_W_EN_PASSANT;
    }

    if let Some((taken, _)) = mv.capture
        && mv.piece != Piece::King
        && !is_bad_capture(board, mv)
    {
        let delta = piece_weight(taken) - piece_weight(mv.piece);
        weight += delta.max(KEY_W_CAPTURE_FLOOR);
    }

    weight += pst::value(mv.color, mv.piece, endgame, mv.to.index())
        - pst::value(mv.color, mv.piece, endgame, mv.from.index());
    weight
}

/// Static exchange heuristic. A capture is fine when the capturer is a
/// pawn, when it does not give up material (within a 200cp cushion), or
/// when the target square is not defended by an enemy pawn.
pub fn is_bad_capture(board: &Board, mv: Move) -> bool {
    let Some((taken, capture_sq)) = mv.capture else {
        return false;
    };
    if mv.piece == Piece::Pawn {
        return false;
    }
    if piece_weight(mv.piece) <= piece_weight(taken) + 200 {
        return false;
    }
    defended_by_pawn(board, capture_sq, mv.color.opposite())
}

/// Is `sq` covered by a pawn of `by`? A pawn of the other color standing
/// on `sq` would attack exactly the squares such defenders sit on.
pub fn defended_by_pawn(board: &Board, sq: Square, by: Color) -> bool {
    cache().pawn_attack_mask(by.opposite(), sq.index()) & board.bb(by, Piece::Pawn) != 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MoveEngine;

    #[test]
    fn promotions_outrank_quiet_moves() {
        let engine = MoveEngine::from_fen("4k3/P7/8/8/8/8/6P1/4K3 w - - 0 1").unwrap();
        let moves = engine.legal_moves();
        let promo = moves.iter().find(|m| m.uci() == "a7a8q").unwrap();
        let quiet = moves.iter().find(|m| m.uci() == "g2g3").unwrap();
        assert!(
            presort_key(&engine.board, *promo, false) > presort_key(&engine.board, *quiet, false)
        );
    }

    #[test]
    fn pawn_captures_are_never_bad() {
        // Pawn takes a defended knight: still a good capture.
        let engine = MoveEngine::from_fen("4k3/3p4/2n5/1P6/8/8/8/4K3 w - - 0 1").unwrap();
        let take = engine.move_from_uci("b5c6").unwrap();
        assert!(!is_bad_capture(&engine.board, take));
    }

    #[test]
    fn queen_grabbing_a_guarded_pawn_is_bad() {
        // The d5 pawn is guarded by the e6 pawn; QxP walks into it.
        let engine = MoveEngine::from_fen("4k3/8/4p3/3p4/8/8/3Q4/4K3 w - - 0 1").unwrap();
        let grab = engine.move_from_uci("d2d5").unwrap();
        assert!(is_bad_capture(&engine.board, grab));
        assert!(defended_by_pawn(&engine.board, "d5".parse().unwrap(), Color::Black));
    }

    #[test]
    fn queen_takes_undefended_pawn_is_fine() {
        let engine = MoveEngine::from_fen("4k3/8/8/3p4/8/8/3Q4/4K3 w - - 0 1").unwrap();
        let take = engine.move_from_uci("d2d5").unwrap();
        assert!(!is_bad_capture(&engine.board, take));
    }

    #[test]
    fn rook_takes_queen_is_fine_even_when_guarded() {
        // Winning material beats the pawn-guard veto.
        let engine = MoveEngine::from_fen("4k3/8/4p3/3q4/8/8/3R4/4K3 w - - 0 1").unwrap();
        let take = engine.move_from_uci("d2d5").unwrap();
        assert!(!is_bad_capture(&engine.board, take));
    }
}
