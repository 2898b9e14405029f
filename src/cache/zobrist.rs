use crate::board::{Board, Color, Piece};
use crate::cache::cache;
use crate::moves::types::MoveInstruction;
use rand::{RngCore, SeedableRng, rngs::StdRng};

/// Fixed seed so two runs of the engine produce identical keys. Opening
/// books and the hash tests depend on this.
pub const ZOBRIST_SEED: u64 = 8_293_449_743_051_711_766;

pub struct ZobristKeys {
    /// [color][kind][square] with {White=0, Black=1} and {P,N,B,R,Q,K}={0..5}
    pub piece: [[[u64; 64]; 6]; 2],
    /// One key per castling-rights state (4-bit value, 16 states).
    pub castling: [u64; 16],
    /// En-passant keys by file; only the file of the target matters.
    pub en_passant_file: [u64; 8],
    /// XORed in whenever Black is to move.
    pub black_to_move: u64,
}

impl ZobristKeys {
    pub(crate) fn generate() -> Self {
        let mut rng = StdRng::seed_from_u64(ZOBRIST_SEED);

        // Zero keys would degenerate into no-ops under XOR.
        fn non_zero(rng: &mut StdRng) -> u64 {
            let mut v = rng.next_u64();
            while v == 0 {
                v = rng.next_u64();
            }
            v
        }

        let mut keys = ZobristKeys {
            piece: [[[0u64; 64]; 6]; 2],
            castling: [0u64; 16],
            en_passant_file: [0u64; 8],
            black_to_move: 0,
        };
        for color in 0..2 {
            for kind in 0..6 {
                for sq in 0..64 {
                    keys.piece[color][kind][sq] = non_zero(&mut rng);
                }
            }
        }
        for state in 0..16 {
            keys.castling[state] = non_zero(&mut rng);
        }
        for file in 0..8 {
            keys.en_passant_file[file] = non_zero(&mut rng);
        }
        keys.black_to_move = non_zero(&mut rng);
        keys
    }

    #[inline(always)]
    pub fn piece_key(&self, color: Color, kind: Piece, square: u8) -> u64 {
        self.piece[color as usize][kind as usize][square as usize]
    }
}

/// Full hash of a board, from scratch. Must agree with the incrementally
/// maintained hash at all times.
pub fn hash_board(board: &Board) -> u64 {
    let keys = &cache().zobrist;
    let mut hash = 0u64;

    for color in [Color::White, Color::Black] {
        for kind in Piece::ALL {
            for &sq in board.locations(color, kind) {
                hash ^= keys.piece_key(color, kind, sq);
            }
        }
    }
    hash ^= keys.castling[board.castling_rights as usize];
    if let Some(target) = board.en_passant {
        hash ^= keys.en_passant_file[target.file() as usize];
    }
    if board.side_to_move == Color::Black {
        hash ^= keys.black_to_move;
    }
    hash
}

/// Incremental hash update for one made move, driven entirely by the undo
/// record. XOR is its own inverse, so the same function applied to the
/// reversed instruction undoes the update.
pub fn update_hash(hash: u64, inst: &MoveInstruction) -> u64 {
    let keys = &cache().zobrist;
    let mv = inst.mv;
    let mut hash = hash;

    if !mv.null {
        let color = mv.color;
        if let Some((kind, sq)) = mv.capture {
            hash ^= keys.piece_key(color.opposite(), kind, sq.index());
        } else if let Some((rook_from, rook_to)) = inst.rook {
            hash ^= keys.piece_key(color, Piece::Rook, rook_from.index());
            hash ^= keys.piece_key(color, Piece::Rook, rook_to.index());
        }
        hash ^= keys.piece_key(color, mv.piece, mv.from.index());
        hash ^= keys.piece_key(color, inst.placed, mv.to.index());
    }

    hash ^= keys.castling[inst.prev_castling as usize];
    hash ^= keys.castling[inst.new_castling as usize];

    if let Some(target) = inst.prev_en_passant {
        hash ^= keys.en_passant_file[target.file() as usize];
    }
    if let Some(target) = inst.new_en_passant {
        hash ^= keys.en_passant_file[target.file() as usize];
    }

    // Flipping the side to move is always one XOR of the black key.
    hash ^ keys.black_to_move
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_reproducible() {
        let a = ZobristKeys::generate();
        let b = ZobristKeys::generate();
        assert_eq!(a.piece, b.piece);
        assert_eq!(a.castling, b.castling);
        assert_eq!(a.en_passant_file, b.en_passant_file);
        assert_eq!(a.black_to_move, b.black_to_move);
    }

    #[test]
    fn keys_are_distinct_enough() {
        let keys = ZobristKeys::generate();
        assert_ne!(keys.black_to_move, 0);
        assert_ne!(keys.castling[0], keys.castling[15]);
        assert_ne!(
            keys.piece[0][0][0], keys.piece[1][0][0],
            "white and black pawn keys must differ"
        );
    }
}
