//! Square-attack tests and checker collection.
//!
//! Knights, pawns and kings are mask intersections against the cached
//! step tables; sliders are blocker-aware ray scans. Scans toward lower
//! indices take the reverse bitscan, the rest take the forward scan, so
//! the first hit is always the nearest blocker.

use crate::bitboard::{BitboardExt, bitscan_forward, bitscan_reverse};
use crate::board::{Board, Color, Piece};
use crate::cache::{Direction, cache};
use crate::square::Square;
use arrayvec::ArrayVec;

/// At most 8 knight squares, 2 pawn squares, 1 king and 8 ray directions
/// can attack one square at once.
pub type AttackerList = ArrayVec<(Square, Piece), 24>;

/// Nearest occupied square from `sq` in `dir`, against `occupancy`.
#[inline]
fn ray_hit(occupancy: u64, dir: Direction, sq: u8) -> Option<u8> {
    let masked = occupancy & cache().ray_mask(dir, sq);
    if masked == 0 {
        return None;
    }
    Some(if dir.scans_reverse() {
        bitscan_reverse(masked)
    } else {
        bitscan_forward(masked)
    })
}

/// True when `by` attacks `sq`. `lifted` removes one square from the
/// occupancy before the slider scans; passing the moving king's square
/// keeps it from blocking its own escape rays.
pub fn square_attacked(board: &Board, by: Color, sq: Square, lifted: Option<Square>) -> bool {
    let tables = cache();
    let idx = sq.index();

    if tables.knight_masks[idx as usize] & board.bb(by, Piece::Knight) != 0 {
        return true;
    }
    // A pawn of `by` attacks `sq` exactly when a pawn of the *other*
    // color standing on `sq` would attack the pawn's square.
    if tables.pawn_attack_mask(by.opposite(), idx) & board.bb(by, Piece::Pawn) != 0 {
        return true;
    }
    if tables.king_masks[idx as usize] & board.bb(by, Piece::King) != 0 {
        return true;
    }

    let mut occupancy = board.occupied();
    if let Some(gone) = lifted {
        occupancy = occupancy.without(gone);
    }
    let rooks_queens = board.bb(by, Piece::Rook) | board.bb(by, Piece::Queen);
    for dir in Direction::ORTHOGONAL {
        if let Some(hit) = ray_hit(occupancy, dir, idx)
            && rooks_queens & (1u64 << hit) != 0
        {
            return true;
        }
    }
    let bishops_queens = board.bb(by, Piece::Bishop) | board.bb(by, Piece::Queen);
    for dir in Direction::DIAGONAL {
        if let Some(hit) = ray_hit(occupancy, dir, idx)
            && bishops_queens & (1u64 << hit) != 0
        {
            return true;
        }
    }
    false
}

/// Every piece of `by` attacking `sq`, as (square, kind) pairs.
pub fn attackers_of(
    board: &Board,
    by: Color,
    sq: Square,
    lifted: Option<Square>,
) -> AttackerList {
    let tables = cache();
    let idx = sq.index();
    let mut attackers = AttackerList::new();

    let mut collect = |mut bb: u64, kind: Piece| {
        while bb != 0 {
            let hit = crate::bitboard::pop_lsb(&mut bb);
            attackers.push((Square::from_index(hit), kind));
        }
    };
    collect(
        tables.knight_masks[idx as usize] & board.bb(by, Piece::Knight),
        Piece::Knight,
    );
    collect(
        tables.pawn_attack_mask(by.opposite(), idx) & board.bb(by, Piece::Pawn),
        Piece::Pawn,
    );
    collect(
        tables.king_masks[idx as usize] & board.bb(by, Piece::King),
        Piece::King,
    );

    let mut occupancy = board.occupied();
    if let Some(gone) = lifted {
        occupancy = occupancy.without(gone);
    }
    for dir in Direction::ORTHOGONAL {
        if let Some(hit) = ray_hit(occupancy, dir, idx) {
            let hit_sq = Square::from_index(hit);
            if board.bb(by, Piece::Rook).occupied(hit_sq) {
                attackers.push((hit_sq, Piece::Rook));
            } else if board.bb(by, Piece::Queen).occupied(hit_sq) {
                attackers.push((hit_sq, Piece::Queen));
            }
        }
    }
    for dir in Direction::DIAGONAL {
        if let Some(hit) = ray_hit(occupancy, dir, idx) {
            let hit_sq = Square::from_index(hit);
            if board.bb(by, Piece::Bishop).occupied(hit_sq) {
                attackers.push((hit_sq, Piece::Bishop));
            } else if board.bb(by, Piece::Queen).occupied(hit_sq) {
                attackers.push((hit_sq, Piece::Queen));
            }
        }
    }
    attackers
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn slider_attacks_respect_blockers() {
        let board = Board::from_str("3rk3/8/8/3P4/8/8/8/3K4 w - - 0 1").unwrap();
        let d5: Square = "d5".parse().unwrap();
        let d1: Square = "d1".parse().unwrap();
        // The rook on d8 hits the pawn on d5 but not the king behind it.
        assert!(square_attacked(&board, Color::Black, d5, None));
        assert!(!square_attacked(&board, Color::Black, d1, None));
    }

    #[test]
    fn lifting_the_king_extends_the_ray() {
        let board = Board::from_str("3rk3/8/8/8/8/8/8/3K4 w - - 0 1").unwrap();
        let d1: Square = "d1".parse().unwrap();
        let d2: Square = "d2".parse().unwrap();
        assert!(square_attacked(&board, Color::Black, d1, None));
        // With the king lifted off d1, d2 stays covered through it.
        assert!(square_attacked(&board, Color::Black, d2, Some(d1)));
    }

    #[test]
    fn pawn_attack_direction_is_color_aware() {
        let board =
            Board::from_str("4k3/8/8/3p4/8/8/8/4K3 w - - 0 1").unwrap();
        // A black pawn on d5 covers c4 and e4, not c6/e6.
        assert!(square_attacked(&board, Color::Black, "c4".parse().unwrap(), None));
        assert!(square_attacked(&board, Color::Black, "e4".parse().unwrap(), None));
        assert!(!square_attacked(&board, Color::Black, "c6".parse().unwrap(), None));
    }

    #[test]
    fn attacker_collection_finds_everyone() {
        let board = Board::from_str("4k3/8/8/8/4n3/2b5/3P4/3K4 w - - 0 1").unwrap();
        let d2: Square = "d2".parse().unwrap();
        let mut kinds: Vec<Piece> = attackers_of(&board, Color::Black, d2, None)
            .into_iter()
            .map(|(_, kind)| kind)
            .collect();
        kinds.sort_by_key(|k| *k as u8);
        assert_eq!(kinds, vec![Piece::Knight, Piece::Bishop]);
    }
}
