//! Pseudo-legal move generation.
//!
//! Table-driven: each piece's step or ray targets come straight from the
//! move cache, so generation is list walks and occupancy tests. King
//! safety is not considered here; the legality filter handles it.

use crate::bitboard::BitboardExt;
use crate::board::castle_bits::*;
use crate::board::{Board, Color, Piece};
use crate::cache::{Direction, cache};
use crate::moves::types::{Move, MoveBuffer, MoveKind};
use crate::square::Square;

const PROMOTIONS: [Piece; 4] = [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight];

/// All pseudo-legal moves for the side to move.
pub fn pseudo_legal(board: &Board, list: &mut impl MoveBuffer) {
    let color = board.side_to_move;
    for &from in board.locations(color, Piece::Pawn) {
        pawn_moves_from(board, from, list);
    }
    for &from in board.locations(color, Piece::Knight) {
        knight_moves_from(board, from, list);
    }
    for kind in [Piece::Bishop, Piece::Rook, Piece::Queen] {
        for &from in board.locations(color, kind) {
            slider_moves_from(board, kind, from, list);
        }
    }
    for &from in board.locations(color, Piece::King) {
        king_moves_from(board, from, list);
    }
    castle_moves(board, list);
}

/// Pseudo-legal moves originating from one square (empty when the square
/// does not hold a piece of the side to move).
pub fn pseudo_legal_from(board: &Board, from: Square, list: &mut impl MoveBuffer) {
    let Some((color, kind)) = board.piece_at(from) else {
        return;
    };
    if color != board.side_to_move {
        return;
    }
    match kind {
        Piece::Pawn => pawn_moves_from(board, from.index(), list),
        Piece::Knight => knight_moves_from(board, from.index(), list),
        Piece::Bishop | Piece::Rook | Piece::Queen => {
            slider_moves_from(board, kind, from.index(), list)
        }
        Piece::King => {
            king_moves_from(board, from.index(), list);
            castle_moves(board, list);
        }
    }
}

/// Pseudo-legal moves for one piece kind of the side to move.
pub fn pseudo_legal_for(board: &Board, kind: Piece, list: &mut impl MoveBuffer) {
    let color = board.side_to_move;
    for &from in board.locations(color, kind) {
        match kind {
            Piece::Pawn => pawn_moves_from(board, from, list),
            Piece::Knight => knight_moves_from(board, from, list),
            Piece::Bishop | Piece::Rook | Piece::Queen => {
                slider_moves_from(board, kind, from, list)
            }
            Piece::King => king_moves_from(board, from, list),
        }
    }
    if kind == Piece::King {
        castle_moves(board, list);
    }
}

fn quiet(board: &Board, piece: Piece, from: u8, to: u8, kind: MoveKind) -> Move {
    Move {
        from: Square::from_index(from),
        to: Square::from_index(to),
        piece,
        color: board.side_to_move,
        kind,
        capture: None,
        null: false,
    }
}

fn capture(board: &Board, piece: Piece, from: u8, to: u8, taken: Piece) -> Move {
    Move {
        from: Square::from_index(from),
        to: Square::from_index(to),
        piece,
        color: board.side_to_move,
        kind: MoveKind::Normal,
        capture: Some((taken, Square::from_index(to))),
        null: false,
    }
}

/// A pawn move landing on the back rank expands into the four promotions.
fn push_pawn_landing(
    board: &Board,
    from: u8,
    to: u8,
    taken: Option<Piece>,
    list: &mut impl MoveBuffer,
) {
    let capture = taken.map(|kind| (kind, Square::from_index(to)));
    let to_rank = to / 8;
    if to_rank == 0 || to_rank == 7 {
        for promo in PROMOTIONS {
            list.push(Move {
                from: Square::from_index(from),
                to: Square::from_index(to),
                piece: Piece::Pawn,
                color: board.side_to_move,
                kind: MoveKind::Promotion(promo),
                capture,
                null: false,
            });
        }
    } else {
        list.push(Move {
            from: Square::from_index(from),
            to: Square::from_index(to),
            piece: Piece::Pawn,
            color: board.side_to_move,
            kind: MoveKind::Normal,
            capture,
            null: false,
        });
    }
}

fn pawn_moves_from(board: &Board, from: u8, list: &mut impl MoveBuffer) {
    let color = board.side_to_move;
    let tables = cache();

    // Pushes: nearest square first, and a blocked single push also blocks
    // the double.
    for (i, &to) in tables.pawn_pushes[color as usize][from as usize].iter().enumerate() {
        if board.occupied().occupied(Square::from_index(to)) {
            break;
        }
        if i == 1 {
            list.push(quiet(board, Piece::Pawn, from, to, MoveKind::DoublePush));
        } else {
            push_pawn_landing(board, from, to, None, list);
        }
    }

    // The square a capturing pawn lands on, one rank behind the target pawn.
    let ep_capture_sq = board.en_passant.map(|target| match color {
        Color::White => target.index() - 8,
        Color::Black => target.index() + 8,
    });

    for &to in &tables.pawn_attacks[color as usize][from as usize] {
        let to_sq = Square::from_index(to);
        if board.occupancy(color.opposite()).occupied(to_sq) {
            let (_, taken) = board.piece_at(to_sq).expect("occupancy and piece_at agree");
            push_pawn_landing(board, from, to, Some(taken), list);
        } else if Some(to) == ep_capture_sq {
            list.push(Move {
                from: Square::from_index(from),
                to: to_sq,
                piece: Piece::Pawn,
                color,
                kind: MoveKind::EnPassant,
                capture: Some((Piece::Pawn, board.en_passant.unwrap())),
                null: false,
            });
        }
    }
}

fn knight_moves_from(board: &Board, from: u8, list: &mut impl MoveBuffer) {
    step_moves(board, Piece::Knight, from, &cache().knight_steps[from as usize], list);
}

fn king_moves_from(board: &Board, from: u8, list: &mut impl MoveBuffer) {
    step_moves(board, Piece::King, from, &cache().king_steps[from as usize], list);
}

fn step_moves(board: &Board, piece: Piece, from: u8, steps: &[u8], list: &mut impl MoveBuffer) {
    let color = board.side_to_move;
    for &to in steps {
        let to_sq = Square::from_index(to);
        if board.occupancy(color).occupied(to_sq) {
            continue;
        }
        if let Some((_, taken)) = board.piece_at(to_sq) {
            list.push(capture(board, piece, from, to, taken));
        } else {
            list.push(quiet(board, piece, from, to, MoveKind::Normal));
        }
    }
}

fn slider_moves_from(board: &Board, piece: Piece, from: u8, list: &mut impl MoveBuffer) {
    let color = board.side_to_move;
    let directions: &[Direction] = match piece {
        Piece::Rook => &Direction::ORTHOGONAL,
        Piece::Bishop => &Direction::DIAGONAL,
        _ => &Direction::ALL,
    };
    for &dir in directions {
        for &to in cache().ray(dir, from) {
            let to_sq = Square::from_index(to);
            if board.occupancy(color).occupied(to_sq) {
                break;
            }
            if let Some((_, taken)) = board.piece_at(to_sq) {
                list.push(capture(board, piece, from, to, taken));
                break;
            }
            list.push(quiet(board, piece, from, to, MoveKind::Normal));
        }
    }
}

/// Castles are emitted when the rights bit is set, the clearance squares
/// are empty, and both king and rook stand on their home squares. Safety
/// of the king's path is the legality filter's business.
fn castle_moves(board: &Board, list: &mut impl MoveBuffer) {
    let color = board.side_to_move;
    let home = king_home(color);
    if !board.bb(color, Piece::King).occupied(Square::from_index(home)) {
        return;
    }
    for side in [SIDE_WEST, SIDE_EAST] {
        if !board.has_castling(castle_bit(color, side)) {
            continue;
        }
        if board.occupied() & cache().castle_clear[color as usize][side] != 0 {
            continue;
        }
        let rook_home = Square::from_index(ROOK_HOMES[color as usize][side]);
        if !board.bb(color, Piece::Rook).occupied(rook_home) {
            continue;
        }
        let (kind, to) = if side == SIDE_WEST {
            (MoveKind::CastleWest, home - 2)
        } else {
            (MoveKind::CastleEast, home + 2)
        };
        list.push(quiet(board, Piece::King, home, to, kind));
    }
}
