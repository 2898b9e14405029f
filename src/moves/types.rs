use crate::board::{Color, Piece};
use crate::square::Square;
use arrayvec::ArrayVec;
use std::fmt;
use std::ops::{Deref, DerefMut};

/// Anything move generation can push into: a `Vec` or a fixed-capacity
/// `ArrayVec`.
pub trait MoveBuffer: Deref<Target = [Move]> + DerefMut {
    fn push(&mut self, mv: Move);
    fn clear(&mut self);
}

impl MoveBuffer for Vec<Move> {
    fn push(&mut self, mv: Move) {
        self.push(mv);
    }
    fn clear(&mut self) {
        self.clear();
    }
}

impl<const N: usize> MoveBuffer for ArrayVec<Move, N> {
    fn push(&mut self, mv: Move) {
        self.push(mv);
    }
    fn clear(&mut self) {
        self.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    Normal,
    /// Pawn double push; sets the en-passant target on make.
    DoublePush,
    /// Queenside castle.
    CastleWest,
    /// Kingside castle.
    CastleEast,
    EnPassant,
    Promotion(Piece),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    pub color: Color,
    pub kind: MoveKind,
    /// Captured piece kind and square. The square differs from `to` only
    /// for en passant.
    pub capture: Option<(Piece, Square)>,
    /// The null move only flips the side to move; used by null-move
    /// pruning.
    pub null: bool,
}

impl Move {
    pub const NULL: Move = Move {
        from: Square::from_index(0),
        to: Square::from_index(0),
        piece: Piece::Pawn,
        color: Color::White,
        kind: MoveKind::Normal,
        capture: None,
        null: true,
    };

    #[inline(always)]
    pub fn is_capture(&self) -> bool {
        self.capture.is_some()
    }

    #[inline(always)]
    pub fn is_castle(&self) -> bool {
        matches!(self.kind, MoveKind::CastleWest | MoveKind::CastleEast)
    }

    #[inline(always)]
    pub fn is_en_passant(&self) -> bool {
        self.kind == MoveKind::EnPassant
    }

    #[inline(always)]
    pub fn promotion(&self) -> Option<Piece> {
        match self.kind {
            MoveKind::Promotion(kind) => Some(kind),
            _ => None,
        }
    }

    /// Stable identity for ordering comparisons: two moves in the same
    /// position are the same move iff their ids are equal.
    pub fn id(&self) -> u16 {
        if self.null {
            return u16::MAX;
        }
        let kind_code: u16 = match self.kind {
            MoveKind::Normal => 0,
            MoveKind::DoublePush => 1,
            MoveKind::CastleWest => 2,
            MoveKind::CastleEast => 3,
            MoveKind::EnPassant => 4,
            MoveKind::Promotion(Piece::Knight) => 5,
            MoveKind::Promotion(Piece::Bishop) => 6,
            MoveKind::Promotion(Piece::Rook) => 7,
            MoveKind::Promotion(_) => 8,
        };
        ((self.from.index() as u16) << 10) | ((self.to.index() as u16) << 4) | kind_code
    }

    /// Four or five characters: from, to, optional promotion letter.
    pub fn uci(&self) -> String {
        if self.null {
            return "0000".to_string();
        }
        match self.promotion() {
            Some(kind) => format!("{}{}{}", self.from, self.to, kind.letter()),
            None => format!("{}{}", self.from, self.to),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uci())?;
        if f.alternate() {
            if self.is_castle() {
                write!(f, " (castle)")?;
            } else if self.is_en_passant() {
                write!(f, " (ep)")?;
            } else if self.is_capture() {
                write!(f, " (x)")?;
            }
        }
        Ok(())
    }
}

/// Full undo record built when a move is made. Carries the previous
/// castling rights, en-passant target and halfmove clock verbatim, so
/// restoring the board needs no recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveInstruction {
    pub mv: Move,
    /// Kind standing on the to-square afterwards (the promotion kind for
    /// promotions, otherwise the moving piece).
    pub placed: Piece,
    pub prev_castling: u8,
    pub new_castling: u8,
    pub prev_en_passant: Option<Square>,
    pub new_en_passant: Option<Square>,
    pub prev_halfmove: u32,
    pub new_halfmove: u32,
    /// Rook relocation for castles.
    pub rook: Option<(Square, Square)>,
}
