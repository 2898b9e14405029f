//! Turning a `Move` into a `MoveInstruction` and applying it.
//!
//! The instruction carries both the previous and the new castling rights,
//! en-passant target and halfmove clock, so `revert` restores the board
//! verbatim and the hash update can XOR both states in one pass.

use crate::board::castle_bits::*;
use crate::board::{Board, Color, Piece};
use crate::moves::types::{Move, MoveInstruction, MoveKind};
use crate::square::Square;

/// Rook relocation by the castling king's destination square.
#[inline(always)]
fn rook_castle_squares(king_to: u8) -> Option<(Square, Square)> {
    match king_to {
        62 => Some((Square::from_index(63), Square::from_index(61))), // White O-O
        58 => Some((Square::from_index(56), Square::from_index(59))), // White O-O-O
        6 => Some((Square::from_index(7), Square::from_index(5))),    // Black O-O
        2 => Some((Square::from_index(0), Square::from_index(3))),    // Black O-O-O
        _ => None,
    }
}

/// Builds the undo record for `mv` against the current board, without
/// touching the board.
pub fn build_instruction(board: &Board, mv: Move) -> MoveInstruction {
    let prev_castling = board.castling_rights;
    let prev_en_passant = board.en_passant;
    let prev_halfmove = board.halfmove_clock;

    if mv.null {
        // A null move only flips the side to move; the en-passant chance
        // lapses like it would after any reply.
        return MoveInstruction {
            mv,
            placed: mv.piece,
            prev_castling,
            new_castling: prev_castling,
            prev_en_passant,
            new_en_passant: None,
            prev_halfmove,
            new_halfmove: prev_halfmove,
            rook: None,
        };
    }

    let color = mv.color;

    let mut rights_to_clear = 0u8;
    if mv.piece == Piece::King {
        rights_to_clear |= castle_bit(color, SIDE_WEST) | castle_bit(color, SIDE_EAST);
    }
    if mv.piece == Piece::Rook {
        rights_to_clear |= rook_home_right(color, mv.from.index());
    }
    if let Some((Piece::Rook, capture_sq)) = mv.capture {
        rights_to_clear |= rook_home_right(color.opposite(), capture_sq.index());
    }

    let new_en_passant = if mv.kind == MoveKind::DoublePush {
        Some(mv.to)
    } else {
        None
    };

    let new_halfmove = if mv.piece == Piece::Pawn || mv.is_capture() {
        0
    } else {
        prev_halfmove + 1
    };

    MoveInstruction {
        mv,
        placed: mv.promotion().unwrap_or(mv.piece),
        prev_castling,
        new_castling: prev_castling & !rights_to_clear,
        prev_en_passant,
        new_en_passant,
        prev_halfmove,
        new_halfmove,
        rook: if mv.is_castle() {
            rook_castle_squares(mv.to.index())
        } else {
            None
        },
    }
}

impl Board {
    /// Executes an instruction. `revert` is its exact inverse.
    pub fn apply(&mut self, inst: &MoveInstruction) {
        let mv = inst.mv;
        if !mv.null {
            let color = mv.color;
            if let Some((taken, capture_sq)) = mv.capture {
                self.remove(capture_sq, color.opposite(), taken);
            } else if let Some((rook_from, rook_to)) = inst.rook {
                self.remove(rook_from, color, Piece::Rook);
                self.add(rook_to, color, Piece::Rook);
            }
            self.remove(mv.from, color, mv.piece);
            self.add(mv.to, color, inst.placed);
        }

        self.castling_rights = inst.new_castling;
        self.en_passant = inst.new_en_passant;
        self.halfmove_clock = inst.new_halfmove;
        if self.side_to_move == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = self.side_to_move.opposite();
    }

    pub fn revert(&mut self, inst: &MoveInstruction) {
        let mv = inst.mv;
        if !mv.null {
            let color = mv.color;
            self.remove(mv.to, color, inst.placed);
            self.add(mv.from, color, mv.piece);
            if let Some((taken, capture_sq)) = mv.capture {
                self.add(capture_sq, color.opposite(), taken);
            } else if let Some((rook_from, rook_to)) = inst.rook {
                self.remove(rook_to, color, Piece::Rook);
                self.add(rook_from, color, Piece::Rook);
            }
        }

        self.castling_rights = inst.prev_castling;
        self.en_passant = inst.prev_en_passant;
        self.halfmove_clock = inst.prev_halfmove;
        if self.side_to_move == Color::White {
            self.fullmove_number -= 1;
        }
        self.side_to_move = self.side_to_move.opposite();
    }
}
