//! Precomputed, immutable move tables.
//!
//! Table-driven move generation: every piece's step or ray targets are
//! computed once per from-square at startup, together with bitmask forms
//! of the same tables for attacker detection, line labels and masks for
//! pin scans, castle clearance masks, and the Zobrist key tables. Once
//! built the cache never changes, so it hides behind a process-wide
//! `OnceCell`.

pub mod zobrist;

use crate::board::Color;
use once_cell::sync::OnceCell;
use zobrist::ZobristKeys;

/// Ray directions. North is toward lower square indices (up the board
/// from White's point of view).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Direction {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::SouthEast,
        Direction::SouthWest,
    ];
    pub const ORTHOGONAL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];
    pub const DIAGONAL: [Direction; 4] = [
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::SouthEast,
        Direction::SouthWest,
    ];

    /// (file delta, rank delta) with rank counted from the top.
    pub const fn offsets(self) -> (i8, i8) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::NorthEast => (1, -1),
            Direction::NorthWest => (-1, -1),
            Direction::SouthEast => (1, 1),
            Direction::SouthWest => (-1, 1),
        }
    }

    /// Directions that walk toward decreasing indices need the reverse
    /// bitscan to find the nearest blocker; the rest need the forward scan.
    pub const fn scans_reverse(self) -> bool {
        matches!(
            self,
            Direction::North | Direction::West | Direction::NorthEast | Direction::NorthWest
        )
    }

    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Line families used for pin bookkeeping. A pinned piece may only move
/// to squares carrying the same label within its pin's family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LineKind {
    Rank = 0,
    File = 1,
    Diagonal = 2,
    AntiDiagonal = 3,
}

pub struct MoveCache {
    /// Pawn push targets per color, nearest square first; two entries from
    /// the starting rank, none on the back ranks.
    pub pawn_pushes: [[Vec<u8>; 64]; 2],
    /// Pawn capture targets per color (clipped to the board).
    pub pawn_attacks: [[Vec<u8>; 64]; 2],
    pub knight_steps: [Vec<u8>; 64],
    pub king_steps: [Vec<u8>; 64],
    /// Slider targets outward from the origin, nearest first, per direction.
    pub rays: [[Vec<u8>; 64]; 8],

    /// Bitmask forms of the move lists above.
    pub pawn_attack_masks: [[u64; 64]; 2],
    pub knight_masks: [u64; 64],
    pub king_masks: [u64; 64],
    pub ray_masks: [[u64; 64]; 8],

    /// line_of[family][square] = the line label of that square.
    pub line_of: [[u8; 64]; 4],
    pub rank_masks: [u64; 8],
    pub file_masks: [u64; 8],
    pub diagonal_masks: [u64; 15],
    pub anti_diagonal_masks: [u64; 15],

    /// Squares that must be empty between king and rook, per [color][side]
    /// with side 0 = west (queenside).
    pub castle_clear: [[u64; 2]; 2],
    pub light_squares: u64,
    pub dark_squares: u64,

    pub zobrist: ZobristKeys,
}

/// Shifts a square by (file, rank) deltas, `None` when the shift leaves
/// the board.
fn shift(pos: u8, dx: i8, dy: i8) -> Option<u8> {
    let file = (pos % 8) as i8 + dx;
    let rank = (pos / 8) as i8 + dy;
    if !(0..8).contains(&file) || !(0..8).contains(&rank) {
        return None;
    }
    Some((rank * 8 + file) as u8)
}

fn mask_of(list: &[u8]) -> u64 {
    list.iter().fold(0u64, |acc, &sq| acc | 1u64 << sq)
}

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (2, -1),
    (2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
];

impl MoveCache {
    fn build() -> Self {
        let mut pawn_pushes: [[Vec<u8>; 64]; 2] =
            std::array::from_fn(|_| std::array::from_fn(|_| Vec::new()));
        let mut pawn_attacks: [[Vec<u8>; 64]; 2] =
            std::array::from_fn(|_| std::array::from_fn(|_| Vec::new()));
        let mut knight_steps: [Vec<u8>; 64] = std::array::from_fn(|_| Vec::new());
        let mut king_steps: [Vec<u8>; 64] = std::array::from_fn(|_| Vec::new());
        let mut rays: [[Vec<u8>; 64]; 8] =
            std::array::from_fn(|_| std::array::from_fn(|_| Vec::new()));

        for pos in 0..64u8 {
            for color in [Color::White, Color::Black] {
                let ci = color as usize;
                pawn_pushes[ci][pos as usize] = Self::gen_pawn_pushes(pos, color);
                pawn_attacks[ci][pos as usize] = Self::gen_pawn_attacks(pos, color);
            }

            for (dx, dy) in KNIGHT_OFFSETS {
                if let Some(to) = shift(pos, dx, dy) {
                    knight_steps[pos as usize].push(to);
                }
            }
            for dir in Direction::ALL {
                let (dx, dy) = dir.offsets();
                if let Some(to) = shift(pos, dx, dy) {
                    king_steps[pos as usize].push(to);
                }
                rays[dir.index()][pos as usize] = Self::gen_ray(pos, dir);
            }
        }

        let mut pawn_attack_masks = [[0u64; 64]; 2];
        let mut knight_masks = [0u64; 64];
        let mut king_masks = [0u64; 64];
        let mut ray_masks = [[0u64; 64]; 8];
        for pos in 0..64 {
            pawn_attack_masks[0][pos] = mask_of(&pawn_attacks[0][pos]);
            pawn_attack_masks[1][pos] = mask_of(&pawn_attacks[1][pos]);
            knight_masks[pos] = mask_of(&knight_steps[pos]);
            king_masks[pos] = mask_of(&king_steps[pos]);
            for dir in 0..8 {
                ray_masks[dir][pos] = mask_of(&rays[dir][pos]);
            }
        }

        let mut line_of = [[0u8; 64]; 4];
        let mut rank_masks = [0u64; 8];
        let mut file_masks = [0u64; 8];
        let mut diagonal_masks = [0u64; 15];
        let mut anti_diagonal_masks = [0u64; 15];
        let mut light_squares = 0u64;
        let mut dark_squares = 0u64;
        for pos in 0..64u8 {
            let file = pos % 8;
            let rank = pos / 8;
            let diag = file + rank;
            let anti = (7 - file) + rank;
            line_of[LineKind::Rank as usize][pos as usize] = rank;
            line_of[LineKind::File as usize][pos as usize] = file;
            line_of[LineKind::Diagonal as usize][pos as usize] = diag;
            line_of[LineKind::AntiDiagonal as usize][pos as usize] = anti;
            rank_masks[rank as usize] |= 1u64 << pos;
            file_masks[file as usize] |= 1u64 << pos;
            diagonal_masks[diag as usize] |= 1u64 << pos;
            anti_diagonal_masks[anti as usize] |= 1u64 << pos;
            if (file + rank) % 2 == 0 {
                light_squares |= 1u64 << pos;
            } else {
                dark_squares |= 1u64 << pos;
            }
        }

        // Squares between king and rook. Black's masks sit on rank 8;
        // White's are the same shapes shifted to rank 1.
        let black_west = (1u64 << 1) | (1u64 << 2) | (1u64 << 3);
        let black_east = (1u64 << 5) | (1u64 << 6);
        let castle_clear = [
            [black_west << 56, black_east << 56],
            [black_west, black_east],
        ];

        MoveCache {
            pawn_pushes,
            pawn_attacks,
            knight_steps,
            king_steps,
            rays,
            pawn_attack_masks,
            knight_masks,
            king_masks,
            ray_masks,
            line_of,
            rank_masks,
            file_masks,
            diagonal_masks,
            anti_diagonal_masks,
            castle_clear,
            light_squares,
            dark_squares,
            zobrist: ZobristKeys::generate(),
        }
    }

    fn gen_pawn_pushes(pos: u8, color: Color) -> Vec<u8> {
        let dy: i8 = if color == Color::White { -1 } else { 1 };
        let rank = pos / 8;
        // No pawns live on the back ranks.
        if rank == 0 || rank == 7 {
            return Vec::new();
        }
        let mut moves = Vec::new();
        if let Some(to) = shift(pos, 0, dy) {
            moves.push(to);
        }
        let start_rank = if color == Color::White { 6 } else { 1 };
        if rank == start_rank
            && let Some(to) = shift(pos, 0, 2 * dy)
        {
            moves.push(to);
        }
        moves
    }

    fn gen_pawn_attacks(pos: u8, color: Color) -> Vec<u8> {
        let dy: i8 = if color == Color::White { -1 } else { 1 };
        let mut moves = Vec::new();
        for dx in [-1i8, 1] {
            if let Some(to) = shift(pos, dx, dy) {
                moves.push(to);
            }
        }
        moves
    }

    fn gen_ray(pos: u8, dir: Direction) -> Vec<u8> {
        let (dx, dy) = dir.offsets();
        let mut moves = Vec::new();
        let mut current = pos;
        while let Some(to) = shift(current, dx, dy) {
            moves.push(to);
            current = to;
        }
        moves
    }

    #[inline(always)]
    pub fn ray(&self, dir: Direction, sq: u8) -> &[u8] {
        &self.rays[dir.index()][sq as usize]
    }

    #[inline(always)]
    pub fn ray_mask(&self, dir: Direction, sq: u8) -> u64 {
        self.ray_masks[dir.index()][sq as usize]
    }

    #[inline(always)]
    pub fn line_label(&self, kind: LineKind, sq: u8) -> u8 {
        self.line_of[kind as usize][sq as usize]
    }

    #[inline(always)]
    pub fn pawn_attack_mask(&self, color: Color, sq: u8) -> u64 {
        self.pawn_attack_masks[color as usize][sq as usize]
    }
}

/// The process-wide cache, built on first use and immutable afterwards.
pub fn cache() -> &'static MoveCache {
    static CACHE: OnceCell<MoveCache> = OnceCell::new();
    CACHE.get_or_init(MoveCache::build)
}
