//! The move engine: a board plus the stacks that make moves reversible.
//!
//! Owns make/unmake, the incrementally maintained position hash, the
//! checker list per position, pin computation and the legality filter,
//! and terminal-state detection. Legal mode gates every operation that
//! assumes exactly one king per color; violating it is a bug and aborts
//! with the move stack in the diagnostic.

use crate::bitboard::{BitboardExt, bitscan_forward};
use crate::board::{Board, Color, Piece};
use crate::cache::zobrist::{hash_board, update_hash};
use crate::cache::{Direction, LineKind, cache};
use crate::moves::attacks::{AttackerList, attackers_of, square_attacked};
use crate::moves::execute::build_instruction;
use crate::moves::movegen;
use crate::moves::types::{Move, MoveInstruction};
use crate::square::Square;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalStatus {
    Ongoing,
    Checkmate,
    Stalemate,
    Draw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinKind {
    /// The pinned piece may only move along its pin line.
    Normal,
    /// Only the en-passant capture is forbidden: taking would clear both
    /// pawns off the king's rank at once.
    EnPassant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pin {
    pub square: Square,
    pub line: LineKind,
    /// The rank/file/diagonal label the piece is pinned to.
    pub label: u8,
    pub kind: PinKind,
}

pub struct MoveEngine {
    pub board: Board,
    instructions: Vec<MoveInstruction>,
    move_list: Vec<Move>,
    /// Checkers of the side to move, one entry per reached position.
    checkers_stack: Vec<AttackerList>,
    /// Position hashes, one per reached position (threefold detection).
    hashes: Vec<u64>,
    legal_mode: bool,
    /// Null moves are refused unless the search frame enables them.
    pub allow_null: bool,
    /// Perft switches draw detection off while it runs.
    pub can_draw: bool,
    /// Halfmove clock value at which the 50-move rule fires. The engine's
    /// own convention is 50; standard play wants 100.
    pub halfmove_draw_threshold: u32,
}

impl MoveEngine {
    pub fn new(board: Board) -> Self {
        Self::with_legal_mode(board, true)
    }

    pub fn with_legal_mode(board: Board, legal_mode: bool) -> Self {
        let mut engine = MoveEngine {
            board,
            instructions: Vec::new(),
            move_list: Vec::new(),
            checkers_stack: Vec::new(),
            hashes: Vec::new(),
            legal_mode: false,
            allow_null: false,
            can_draw: true,
            halfmove_draw_threshold: 50,
        };
        engine.hashes.push(hash_board(&engine.board));
        if legal_mode {
            engine.set_legal_mode(true);
        }
        engine
    }

    pub fn start() -> Self {
        Self::new(Board::start())
    }

    pub fn from_fen(fen: &str) -> Result<Self, String> {
        let mut board = Board::new_empty();
        board.set_fen(fen)?;
        Ok(Self::new(board))
    }

    /// Sets the position from FEN and resets all history.
    pub fn set_fen(&mut self, fen: &str) -> Result<(), String> {
        let mut board = Board::new_empty();
        board.set_fen(fen)?;
        self.set_board(board);
        Ok(())
    }

    pub fn set_board(&mut self, board: Board) {
        self.board = board;
        self.instructions.clear();
        self.move_list.clear();
        self.checkers_stack.clear();
        self.hashes.clear();
        self.hashes.push(hash_board(&self.board));
        if self.legal_mode {
            self.push_checkers(None);
        }
    }

    #[inline(always)]
    pub fn legal_mode(&self) -> bool {
        self.legal_mode
    }

    /// Turning legal mode on requires exactly one king per color; the
    /// guarded operations below depend on it. Switching off is always
    /// allowed.
    pub fn set_legal_mode(&mut self, value: bool) {
        if !value {
            self.legal_mode = false;
            return;
        }
        if self.board.piece_count(Color::White, Piece::King) != 1
            || self.board.piece_count(Color::Black, Piece::King) != 1
        {
            self.legal_violation("legal mode needs exactly one king per side");
        }
        self.legal_mode = true;
        if self.checkers_stack.is_empty() {
            self.push_checkers(None);
        }
    }

    fn legal_violation(&self, msg: &str) -> ! {
        panic!(
            "legal mode violation: {}\nFEN: {}\nmove stack: {:?}",
            msg,
            self.board.to_fen(),
            self.move_list.iter().map(Move::uci).collect::<Vec<_>>()
        );
    }

    fn require_legal_mode(&self, what: &str) {
        if !self.legal_mode {
            self.legal_violation(what);
        }
    }

    #[inline(always)]
    pub fn current_hash(&self) -> u64 {
        *self.hashes.last().expect("hash stack never empty")
    }

    #[inline(always)]
    pub fn hash_history(&self) -> &[u64] {
        &self.hashes
    }

    #[inline(always)]
    pub fn move_stack(&self) -> &[Move] {
        &self.move_list
    }

    /// Checkers of the side to move at the current position.
    #[inline(always)]
    pub fn checkers(&self) -> &[(Square, Piece)] {
        self.checkers_stack
            .last()
            .map(|list| list.as_slice())
            .unwrap_or(&[])
    }

    #[inline(always)]
    pub fn in_check(&self) -> bool {
        !self.checkers().is_empty()
    }

    pub fn king_square(&self, color: Color) -> Square {
        self.require_legal_mode("king position is only guaranteed in legal mode");
        self.board.king_square(color)
    }

    /// Is `sq` attacked by `by`? With `remove_king` the side-to-move's
    /// king is lifted off the occupancy first, so a moving king does not
    /// block the ray it is fleeing along.
    pub fn square_attacked(&self, by: Color, sq: Square, remove_king: bool) -> bool {
        let lifted = if remove_king {
            self.require_legal_mode("square_attacked with remove_king needs legal mode");
            Some(self.king_square(self.board.side_to_move))
        } else {
            None
        };
        square_attacked(&self.board, by, sq, lifted)
    }

    // ---- make / unmake -------------------------------------------------

    /// Makes a move without checking its legality. Null moves must be
    /// enabled via `allow_null` and, in legal mode, are refused while in
    /// check; capturing a king in legal mode aborts.
    pub fn make(&mut self, mv: Move) {
        if mv.null {
            if !self.allow_null {
                self.legal_violation("null move while null moves are disabled");
            }
            if self.legal_mode && self.in_check() {
                self.legal_violation("null move while in check");
            }
        }

        let inst = build_instruction(&self.board, mv);
        self.board.apply(&inst);
        let hash = update_hash(self.current_hash(), &inst);
        self.instructions.push(inst);
        self.move_list.push(mv);
        self.hashes.push(hash);

        if self.legal_mode {
            if let Some((Piece::King, _)) = mv.capture {
                self.legal_violation("king captured in legal mode");
            }
            self.push_checkers(Some(mv));
        }
    }

    /// Reverses the last made move exactly, popping every stack.
    pub fn unmake(&mut self) {
        let inst = self
            .instructions
            .pop()
            .unwrap_or_else(|| self.legal_violation("unmake with an empty stack"));
        self.board.revert(&inst);
        self.move_list.pop();
        self.hashes.pop();
        if self.legal_mode {
            self.checkers_stack.pop();
        }
    }

    fn push_checkers(&mut self, mv: Option<Move>) {
        let checkers = match mv {
            Some(m) if m.null || !self.possible_check(m) => AttackerList::new(),
            _ => {
                let us = self.board.side_to_move;
                attackers_of(&self.board, us.opposite(), self.board.king_square(us), None)
            }
        };
        self.checkers_stack.push(checkers);
    }

    /// Cheap prefilter: could the move just made possibly give check to
    /// the side now to move? False lets the full attacker scan be skipped.
    fn possible_check(&self, mv: Move) -> bool {
        if mv.is_castle() {
            return true;
        }
        let king = self.board.king_square(self.board.side_to_move);

        // Vacating a line through the king can discover a check.
        if shares_any_line(mv.from, king) {
            return true;
        }
        if mv.piece == Piece::Knight || mv.promotion() == Some(Piece::Knight) {
            let dr = (mv.to.rank() as i8 - king.rank() as i8).abs();
            let df = (mv.to.file() as i8 - king.file() as i8).abs();
            return dr <= 2 && df <= 2;
        }
        if shares_any_line(mv.to, king) {
            return true;
        }
        // En passant also vacates the captured pawn's square.
        if mv.is_en_passant()
            && let Some((_, capture_sq)) = mv.capture
        {
            return shares_any_line(capture_sq, king);
        }
        false
    }

    // ---- pins ----------------------------------------------------------

    /// Pins on the side to move's king. Empty when legal mode is off.
    pub fn pins(&self) -> Vec<Pin> {
        if !self.legal_mode {
            return Vec::new();
        }
        let board = &self.board;
        let us = board.side_to_move;
        let them = us.opposite();
        let king = board.king_square(us);

        let mut pins = Vec::new();
        // Queens pin on every family; their squares join both loops.
        for &sq in board
            .locations(them, Piece::Rook)
            .iter()
            .chain(board.locations(them, Piece::Queen))
        {
            let attacker = Square::from_index(sq);
            if attacker.rank() == king.rank() {
                if let Some(pin) = self.pin_scan(LineKind::Rank, king, attacker, king.rank()) {
                    pins.push(pin);
                }
            } else if attacker.file() == king.file()
                && let Some(pin) = self.pin_scan(LineKind::File, king, attacker, king.file())
            {
                pins.push(pin);
            }
        }
        for &sq in board
            .locations(them, Piece::Bishop)
            .iter()
            .chain(board.locations(them, Piece::Queen))
        {
            let attacker = Square::from_index(sq);
            if attacker.diagonal() == king.diagonal() {
                if let Some(pin) =
                    self.pin_scan(LineKind::Diagonal, king, attacker, king.diagonal())
                {
                    pins.push(pin);
                }
            } else if attacker.anti_diagonal() == king.anti_diagonal()
                && let Some(pin) =
                    self.pin_scan(LineKind::AntiDiagonal, king, attacker, king.anti_diagonal())
            {
                pins.push(pin);
            }
        }
        pins
    }

    /// Looks for a pin by the slider on `attacker`, aligned with the king
    /// on the given line. Exactly one piece between them means that piece
    /// is pinned. When the rank scan finds no ordinary pin, the rescan
    /// with the en-passant pawn also lifted catches the one case where a
    /// capture removes two pieces from the rank at once.
    fn pin_scan(&self, line: LineKind, king: Square, attacker: Square, label: u8) -> Option<Pin> {
        let tables = cache();
        let dir = pin_direction(line, king.index(), attacker.index());
        // The attacker's ray covers the king and everything beyond it;
        // cutting the king's own ray leaves the between squares + king.
        let between = tables.ray_mask(dir, attacker.index()) & !tables.ray_mask(dir, king.index());
        let blockers = self.board.occupied() & between & !king.bit();

        if blockers != 0 && blockers & (blockers - 1) == 0 {
            return Some(Pin {
                square: Square::from_index(bitscan_forward(blockers)),
                line,
                label,
                kind: PinKind::Normal,
            });
        }

        if line != LineKind::Rank {
            return None;
        }
        let target = self.board.en_passant?;
        if target.rank() != label {
            return None;
        }
        let rescanned = blockers & !target.bit();
        if rescanned == 0 || rescanned & (rescanned - 1) != 0 {
            return None;
        }
        let pinned = Square::from_index(bitscan_forward(rescanned));
        if !self
            .board
            .bb(self.board.side_to_move, Piece::Pawn)
            .occupied(pinned)
        {
            return None;
        }
        if (pinned.index() as i16 - target.index() as i16).abs() != 1 {
            return None;
        }
        Some(Pin {
            square: pinned,
            line: LineKind::Rank,
            label,
            kind: PinKind::EnPassant,
        })
    }

    // ---- legality ------------------------------------------------------

    /// Legality of a pseudo-legal move, against the given pin set. The
    /// null move is never "legal" here even where it may be made.
    pub fn move_legal(&self, mv: Move, pins: &[Pin]) -> bool {
        if mv.null {
            return false;
        }
        self.require_legal_mode("move legality needs legal mode");

        if self.in_check() {
            return self.in_check_move_legal(mv, pins);
        }

        let them = self.board.side_to_move.opposite();
        if let Some(pin) = pins.iter().find(|p| p.square == mv.from) {
            match pin.kind {
                PinKind::Normal => {
                    if cache().line_label(pin.line, mv.to.index()) != pin.label {
                        return false;
                    }
                }
                PinKind::EnPassant => {
                    if mv.is_en_passant() {
                        return false;
                    }
                }
            }
        }
        if en_passant_removes_a_diagonal_blocker(mv, pins) {
            return false;
        }

        if mv.piece == Piece::King && self.square_attacked(them, mv.to, true) {
            return false;
        }
        // The king may not castle across an attacked square.
        match mv.kind {
            crate::moves::types::MoveKind::CastleWest => {
                let from = mv.from.index();
                if self.square_attacked(them, Square::from_index(from - 1), false)
                    || self.square_attacked(them, Square::from_index(from - 2), false)
                {
                    return false;
                }
            }
            crate::moves::types::MoveKind::CastleEast => {
                let from = mv.from.index();
                if self.square_attacked(them, Square::from_index(from + 1), false)
                    || self.square_attacked(them, Square::from_index(from + 2), false)
                {
                    return false;
                }
            }
            _ => {}
        }
        true
    }

    /// While in check the options narrow to: move the king to an
    /// unattacked square, capture the (single) checker, or interpose on a
    /// slider's line. Castling is never an escape.
    fn in_check_move_legal(&self, mv: Move, pins: &[Pin]) -> bool {
        let us = self.board.side_to_move;
        let them = us.opposite();

        if mv.is_castle() {
            return false;
        }
        if mv.piece == Piece::King {
            return !self.square_attacked(them, mv.to, true);
        }

        let checkers = self.checkers();
        if checkers.len() > 1 {
            return false;
        }
        if let Some(pin) = pins.iter().find(|p| p.square == mv.from) {
            match pin.kind {
                PinKind::Normal => return false,
                PinKind::EnPassant => {
                    if mv.is_en_passant() {
                        return false;
                    }
                }
            }
        }

        if en_passant_removes_a_diagonal_blocker(mv, pins) {
            return false;
        }

        let (checker_sq, checker_kind) = checkers[0];
        if let Some((_, capture_sq)) = mv.capture
            && capture_sq == checker_sq
        {
            return true;
        }
        // Only a slider's check can be blocked.
        if matches!(checker_kind, Piece::Pawn | Piece::Knight) {
            return false;
        }
        let king = self.board.king_square(us);
        if !shares_line_all(mv.to, checker_sq, king) {
            return false;
        }
        let (to, k, c) = (mv.to.index(), king.index(), checker_sq.index());
        (to < k && to > c) || (to > k && to < c)
    }

    // ---- move listing --------------------------------------------------

    /// Pseudo-legal moves; empty once the position is drawn, which is what
    /// lets `terminal_status` report a draw with pieces still mobile.
    pub fn pseudo_legal_moves(&self) -> Vec<Move> {
        if self.is_draw() {
            return Vec::new();
        }
        let mut list = Vec::with_capacity(64);
        movegen::pseudo_legal(&self.board, &mut list);
        list
    }

    pub fn pseudo_legal_moves_from(&self, from: Square) -> Vec<Move> {
        if self.is_draw() {
            return Vec::new();
        }
        let mut list = Vec::with_capacity(28);
        movegen::pseudo_legal_from(&self.board, from, &mut list);
        list
    }

    pub fn pseudo_legal_moves_for(&self, kind: Piece) -> Vec<Move> {
        if self.is_draw() {
            return Vec::new();
        }
        let mut list = Vec::with_capacity(40);
        movegen::pseudo_legal_for(&self.board, kind, &mut list);
        list
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        self.require_legal_mode("legal move listing needs legal mode");
        let pins = self.pins();
        self.pseudo_legal_moves()
            .into_iter()
            .filter(|&mv| self.move_legal(mv, &pins))
            .collect()
    }

    pub fn legal_moves_from(&self, from: Square) -> Vec<Move> {
        self.require_legal_mode("legal move listing needs legal mode");
        let pins = self.pins();
        self.pseudo_legal_moves_from(from)
            .into_iter()
            .filter(|&mv| self.move_legal(mv, &pins))
            .collect()
    }

    pub fn has_legal_moves(&self) -> bool {
        self.require_legal_mode("legal move listing needs legal mode");
        let pins = self.pins();
        self.pseudo_legal_moves()
            .iter()
            .any(|&mv| self.move_legal(mv, &pins))
    }

    /// Resolves a UCI move string against the current legal moves.
    pub fn move_from_uci(&self, uci: &str) -> Result<Move, String> {
        if !uci.is_ascii() || uci.len() < 4 || uci.len() > 5 {
            return Err(format!("invalid move string {:?}", uci));
        }
        let from: Square = uci[0..2].parse()?;
        let to: Square = uci[2..4].parse()?;
        let promotion = match uci.as_bytes().get(4) {
            None => None,
            Some(b'q') => Some(Piece::Queen),
            Some(b'r') => Some(Piece::Rook),
            Some(b'b') => Some(Piece::Bishop),
            Some(b'n') => Some(Piece::Knight),
            Some(_) => return Err(format!("invalid promotion in {:?}", uci)),
        };
        self.legal_moves()
            .into_iter()
            .find(|m| m.from == from && m.to == to && m.promotion() == promotion)
            .ok_or_else(|| format!("not a legal move here: {}", uci))
    }

    // ---- draws and terminal states -------------------------------------

    /// How often the current position hash occurs in the history
    /// (including the current position itself).
    pub fn repetition_count(&self) -> usize {
        let current = self.current_hash();
        self.hashes.iter().filter(|&&h| h == current).count()
    }

    pub fn is_draw(&self) -> bool {
        if !self.can_draw {
            return false;
        }
        if self.board.halfmove_clock >= self.halfmove_draw_threshold {
            return true;
        }
        if self.repetition_count() >= 3 {
            return true;
        }
        !self.sufficient_material()
    }

    /// Mating material test. Any pawn, rook or queen settles it; after
    /// that, a side needs two bishops, bishop + knight, or two knights
    /// against a non-bare opponent.
    fn sufficient_material(&self) -> bool {
        let board = &self.board;
        for color in [Color::White, Color::Black] {
            if board.piece_count(color, Piece::Pawn) > 0
                || board.piece_count(color, Piece::Rook) > 0
                || board.piece_count(color, Piece::Queen) > 0
            {
                return true;
            }
        }
        let wn = board.piece_count(Color::White, Piece::Knight);
        let wb = board.piece_count(Color::White, Piece::Bishop);
        let bn = board.piece_count(Color::Black, Piece::Knight);
        let bb = board.piece_count(Color::Black, Piece::Bishop);
        minors_can_mate(wn, wb, bn, bb) || minors_can_mate(bn, bb, wn, wb)
    }

    pub fn in_checkmate(&self) -> bool {
        self.require_legal_mode("checkmate test needs legal mode");
        if !self.in_check() {
            return false;
        }
        // Check with no moves in a drawn position is still a draw.
        if self.is_draw() {
            return false;
        }
        !self.has_legal_moves()
    }

    pub fn terminal_status(&self) -> TerminalStatus {
        if self.has_legal_moves() {
            return TerminalStatus::Ongoing;
        }
        if self.in_checkmate() {
            return TerminalStatus::Checkmate;
        }
        if self.is_draw() {
            return TerminalStatus::Draw;
        }
        TerminalStatus::Stalemate
    }
}

/// Can a side with `n` knights and `b` bishops (and nothing else) mate an
/// opponent holding `n_other`/`b_other` minors?
fn minors_can_mate(n: usize, b: usize, n_other: usize, b_other: usize) -> bool {
    if b == 0 {
        // Knights alone: one never mates; two only against a non-bare king.
        if n <= 1 {
            return false;
        }
        if n == 2 && n_other + b_other == 0 {
            return false;
        }
        true
    } else if n == 0 {
        b > 1
    } else {
        // Bishop + knight can mate.
        true
    }
}

#[inline]
fn pin_direction(line: LineKind, king: u8, attacker: u8) -> Direction {
    // The ray from the attacker toward the king. On every family a greater
    // index lies east/south of a smaller one.
    match line {
        LineKind::Rank => {
            if king > attacker {
                Direction::East
            } else {
                Direction::West
            }
        }
        LineKind::File => {
            if king > attacker {
                Direction::South
            } else {
                Direction::North
            }
        }
        LineKind::Diagonal => {
            if king > attacker {
                Direction::SouthWest
            } else {
                Direction::NorthEast
            }
        }
        LineKind::AntiDiagonal => {
            if king > attacker {
                Direction::SouthEast
            } else {
                Direction::NorthWest
            }
        }
    }
}

/// The pin scan records *any* single blocker between a slider and the
/// king, our piece or not. When the blocker is the enemy pawn an
/// en-passant capture would remove, and the pin line is a diagonal, the
/// capture uncovers the slider: the capturing pawn lands one rank behind
/// the vanished pawn, off the diagonal. (A file pin self-blocks, since
/// the capture square shares the captured pawn's file; the rank case is
/// the dedicated rescan.)
#[inline]
fn en_passant_removes_a_diagonal_blocker(mv: Move, pins: &[Pin]) -> bool {
    if !mv.is_en_passant() {
        return false;
    }
    let Some((_, capture_sq)) = mv.capture else {
        return false;
    };
    pins.iter().any(|p| {
        p.square == capture_sq
            && p.kind == PinKind::Normal
            && matches!(p.line, LineKind::Diagonal | LineKind::AntiDiagonal)
    })
}

#[inline]
fn shares_any_line(a: Square, b: Square) -> bool {
    a.rank() == b.rank()
        || a.file() == b.file()
        || a.diagonal() == b.diagonal()
        || a.anti_diagonal() == b.anti_diagonal()
}

#[inline]
fn shares_line_all(a: Square, b: Square, c: Square) -> bool {
    (a.rank() == b.rank() && a.rank() == c.rank())
        || (a.file() == b.file() && a.file() == c.file())
        || (a.diagonal() == b.diagonal() && a.diagonal() == c.diagonal())
        || (a.anti_diagonal() == b.anti_diagonal() && a.anti_diagonal() == c.anti_diagonal())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_has_twenty_legal_moves() {
        let engine = MoveEngine::start();
        assert_eq!(engine.legal_moves().len(), 20);
        assert!(!engine.in_check());
        assert_eq!(engine.terminal_status(), TerminalStatus::Ongoing);
    }

    #[test]
    fn file_pinned_pawn_may_only_push_along_the_file() {
        // Rook e6, pawn e4, king e1: the pawn is pinned on the e-file, so
        // its push stays legal but nothing takes it off the file.
        let engine = MoveEngine::from_fen("8/k7/4r3/8/4P3/8/8/4K3 w - - 0 1").unwrap();
        let pins = engine.pins();
        assert_eq!(pins.len(), 1);
        assert_eq!(pins[0].square.to_string(), "e4");
        assert_eq!(pins[0].line, LineKind::File);
        let pawn_moves = engine.legal_moves_from("e4".parse().unwrap());
        assert_eq!(pawn_moves.iter().map(|m| m.uci()).collect::<Vec<_>>(), vec!["e4e5"]);
    }

    #[test]
    fn diagonally_pinned_pawn_may_only_take_the_pinner() {
        // Bishop h4 pins the g3 pawn against the king on f2. The push to
        // g4 leaves the diagonal; capturing the bishop stays on it.
        let engine = MoveEngine::from_fen("4k3/8/8/8/7b/6P1/5K2/8 w - - 0 1").unwrap();
        let pins = engine.pins();
        assert_eq!(pins.len(), 1);
        assert_eq!(pins[0].square.to_string(), "g3");
        assert_eq!(pins[0].line, LineKind::Diagonal);
        let ucis: Vec<String> = engine
            .legal_moves_from("g3".parse().unwrap())
            .iter()
            .map(|m| m.uci())
            .collect();
        assert_eq!(ucis, vec!["g3h4"]);
    }

    #[test]
    fn double_check_forces_a_king_move() {
        let engine = MoveEngine::from_fen("4k3/8/8/8/4r3/8/3b4/4K3 w - - 0 1").unwrap();
        assert_eq!(engine.checkers().len(), 2);
        let moves = engine.legal_moves();
        assert!(!moves.is_empty());
        assert!(moves.iter().all(|m| m.piece == Piece::King));
    }

    #[test]
    fn check_can_be_blocked_or_captured() {
        // Rook e8 checks the king on e1; Rd4 can interpose on e4, Ra8 can
        // capture the checker, and the king can step off the e-file.
        let engine = MoveEngine::from_fen("R3r3/8/8/8/3R4/8/8/4K2k w - - 0 1").unwrap();
        let ucis: Vec<String> = engine.legal_moves().iter().map(|m| m.uci()).collect();
        assert!(ucis.contains(&"d4e4".to_string()), "interpose missing: {ucis:?}");
        assert!(ucis.contains(&"a8e8".to_string()), "capture missing: {ucis:?}");
        assert!(ucis.contains(&"e1d1".to_string()));
        assert!(!ucis.contains(&"e1e2".to_string()), "e2 is still covered through the king");
        assert!(!ucis.contains(&"d4d1".to_string()), "d1 does not block the e-file");
    }

    #[test]
    fn null_move_round_trips_the_position() {
        let mut engine = MoveEngine::start();
        engine.allow_null = true;
        let fen = engine.board.to_fen();
        let hash = engine.current_hash();
        engine.make(Move::NULL);
        assert_eq!(engine.board.side_to_move, Color::Black);
        assert_ne!(engine.current_hash(), hash);
        engine.unmake();
        assert_eq!(engine.board.to_fen(), fen);
        assert_eq!(engine.current_hash(), hash);
    }

    #[test]
    #[should_panic(expected = "null move")]
    fn null_move_requires_permission() {
        let mut engine = MoveEngine::start();
        engine.make(Move::NULL);
    }

    #[test]
    fn make_unmake_keeps_every_invariant() {
        let mut engine = MoveEngine::start();
        let initial = engine.board.clone();
        for mv in engine.legal_moves() {
            engine.make(mv);
            engine.board.validate().unwrap();
            assert_eq!(engine.current_hash(), hash_board(&engine.board));
            engine.unmake();
            assert_eq!(engine.board, initial);
        }
    }
}
