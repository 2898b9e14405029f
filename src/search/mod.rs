//! Iterative-deepening alpha-beta search.
//!
//! Fail-hard negamax with a transposition table, null-move pruning and a
//! capture-only quiescence search. The outer driver deepens one ply at a
//! time under a wall-clock budget; running out of time unwinds the
//! current iteration only, so the previous iteration's best move is
//! always intact.

pub mod eval;
pub mod ordering;
pub mod pst;
pub mod tt;

use crate::board::Piece;
use crate::book::OpeningBook;
use crate::engine::{MoveEngine, TerminalStatus};
use crate::moves::types::Move;
use eval::{WEIGHT_CHECKMATE, evaluate, is_endgame};
use ordering::{KEY_W_PV, is_bad_capture, presort_key};
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use tt::{Bound, Node, TranspositionTable};

pub const MAX_DEPTH: i32 = 50;
pub const ALPHA_DEF: i32 = -100_000_000;
pub const BETA_DEF: i32 = 100_000_000;
/// Null-move reduction.
const NULL_DEPTH: i32 = 3;

/// Raised when the ponder budget runs out; unwinds the current iteration
/// and never reaches the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeUp;

pub struct Engine {
    pub move_engine: MoveEngine,
    pub tt: TranspositionTable,
    pub book: Option<OpeningBook>,
    pub max_depth: i32,

    deadline: Option<(Instant, Duration)>,
    root_depth: i32,
    endgame: bool,

    // Principal-variation following: the previous iteration's tree seeds
    // move ordering, one chain link per followed ply.
    last_ponder: Option<Rc<Node>>,
    following: bool,
    follow_node: Option<Rc<Node>>,
    follow_depth: i32,

    nodes: u64,
    null_prunes: u64,
    tt_reads: u64,
    pv_seeds: u64,
}

impl Engine {
    pub fn new(move_engine: MoveEngine) -> Self {
        Engine {
            move_engine,
            tt: TranspositionTable::default(),
            book: None,
            max_depth: MAX_DEPTH,
            deadline: None,
            root_depth: 0,
            endgame: false,
            last_ponder: None,
            following: false,
            follow_node: None,
            follow_depth: 0,
            nodes: 0,
            null_prunes: 0,
            tt_reads: 0,
            pv_seeds: 0,
        }
    }

    #[inline(always)]
    fn check_stop(&self) -> Result<(), TimeUp> {
        if let Some((start, budget)) = self.deadline
            && start.elapsed() > budget
        {
            return Err(TimeUp);
        }
        Ok(())
    }

    fn out_of_time(&self) -> bool {
        self.check_stop().is_err()
    }

    fn reset_counters(&mut self) {
        self.nodes = 0;
        self.null_prunes = 0;
        self.tt_reads = 0;
        self.pv_seeds = 0;
    }

    /// Searches for the ponder budget in seconds and returns (score, best
    /// move). An opening-book hit is returned with score 0, but the
    /// search still runs to warm the transposition table.
    pub fn ponder(&mut self, seconds: f64) -> (i32, Move) {
        self.tt.advance_turn();

        let book_move = self.book.as_ref().and_then(|b| b.lookup(&self.move_engine));
        if book_move.is_some() {
            info!("opening book move found");
        }

        // Depth 1 runs without a clock so a move always exists, even if
        // the budget expires immediately.
        self.deadline = None;
        self.last_ponder = None;
        self.reset_counters();
        let first = self
            .search_to_depth(1)
            .expect("the unclocked depth-1 search cannot time out");
        self.last_ponder = Some(first);

        self.deadline = Some((Instant::now(), Duration::from_secs_f64(seconds)));
        let mut reached = 1;
        for depth in 2..=self.max_depth {
            if self.out_of_time() {
                break;
            }
            self.reset_counters();
            match self.search_to_depth(depth) {
                Ok(node) => {
                    let branch_factor = (self.nodes.max(1) as f64).powf(1.0 / depth as f64);
                    info!(
                        depth,
                        nodes = self.nodes,
                        null_prunes = self.null_prunes,
                        tt_reads = self.tt_reads,
                        pv_seeds = self.pv_seeds,
                        branch_factor,
                        "iteration complete"
                    );
                    self.last_ponder = Some(node);
                    reached = depth;
                }
                Err(TimeUp) => {
                    info!(depth_reached = reached, "ponder budget exhausted");
                    break;
                }
            }
        }
        self.deadline = None;

        let node = self
            .last_ponder
            .take()
            .expect("at least the depth-1 search completed");
        debug!(score = node.score, best = %node.best_move.uci(), "ponder finished");

        match book_move {
            Some(mv) => (0, mv),
            None => (node.score, node.best_move),
        }
    }

    /// One full-window search to a fixed depth.
    pub fn search_to_depth(&mut self, depth: i32) -> Result<Rc<Node>, TimeUp> {
        assert!(depth > 0);
        self.check_stop()?;

        let saved_null = self.move_engine.allow_null;
        self.move_engine.allow_null = true;
        self.endgame = is_endgame(&self.move_engine.board);
        self.root_depth = depth;
        self.following = false;
        self.follow_node = None;
        self.follow_depth = 0;

        let result = self.alphabeta(depth, ALPHA_DEF, BETA_DEF, Move::NULL, true);
        self.move_engine.allow_null = saved_null;
        result
    }

    fn alphabeta(
        &mut self,
        depth_left: i32,
        mut alpha: i32,
        beta: i32,
        p_move: Move,
        allow_null: bool,
    ) -> Result<Rc<Node>, TimeUp> {
        self.check_stop()?;
        let hash = self.move_engine.current_hash();

        // Probe skipped at the root (a best move must come from a real
        // search) and while following the previous principal variation.
        if depth_left != self.root_depth
            && !self.following
            && let Some(entry) = self.tt.probe(hash, depth_left)
        {
            match entry.bound {
                Bound::Lower if entry.score >= beta => {
                    self.tt_reads += 1;
                    return Ok(Rc::new(Node {
                        mv: p_move,
                        best_move: entry.best_move,
                        best_child: entry.best_child.clone(),
                        score: beta,
                        bound: Bound::Lower,
                        quiescence: false,
                    }));
                }
                Bound::Upper if entry.score <= alpha => {
                    self.tt_reads += 1;
                    return Ok(Rc::new(Node {
                        mv: p_move,
                        best_move: Move::NULL,
                        best_child: None,
                        score: alpha,
                        bound: Bound::Upper,
                        quiescence: false,
                    }));
                }
                Bound::Exact => {
                    self.tt_reads += 1;
                    return Ok(Rc::new(Node {
                        mv: p_move,
                        best_move: entry.best_move,
                        best_child: entry.best_child.clone(),
                        score: entry.score.clamp(alpha, beta),
                        bound: Bound::Exact,
                        quiescence: false,
                    }));
                }
                _ => {}
            }
        }

        self.nodes += 1;
        if depth_left == 0 {
            return self.quiescence(alpha, beta, 0, p_move);
        }

        // Null move: let the opponent move twice. Unsound in zugzwang, so
        // never in the endgame, never in check, never at the root, and
        // disabled again inside the reduced child.
        if allow_null
            && !self.following
            && depth_left != self.root_depth
            && depth_left > NULL_DEPTH
            && !self.endgame
            && !self.move_engine.in_check()
        {
            let reduced = (depth_left - 1 - NULL_DEPTH).max(0);
            self.move_engine.make(Move::NULL);
            let result = self.alphabeta(reduced, -beta, -beta + 1, Move::NULL, false);
            self.move_engine.unmake();
            let sub = result?;
            if -sub.score >= beta {
                self.null_prunes += 1;
                return Ok(Rc::new(Node {
                    mv: p_move,
                    best_move: Move::NULL,
                    best_child: None,
                    score: beta,
                    bound: Bound::Lower,
                    quiescence: false,
                }));
            }
        }

        let pv_move_id = self.pv_seed(depth_left);

        let mut moves = self.move_engine.legal_moves();
        if moves.is_empty() {
            let score = match self.move_engine.terminal_status() {
                TerminalStatus::Draw | TerminalStatus::Stalemate => 0,
                TerminalStatus::Checkmate => -(WEIGHT_CHECKMATE + 1000 * depth_left),
                TerminalStatus::Ongoing => panic!(
                    "no legal moves but the position is not terminal\nFEN: {}",
                    self.move_engine.board.to_fen()
                ),
            };
            return Ok(Rc::new(Node {
                mv: p_move,
                best_move: Move::NULL,
                best_child: None,
                score,
                bound: Bound::Exact,
                quiescence: false,
            }));
        }

        {
            let board = &self.move_engine.board;
            let endgame = self.endgame;
            moves.sort_by_cached_key(|&mv| {
                let mut weight = presort_key(board, mv, endgame);
                if Some(mv.id()) == pv_move_id {
                    weight += KEY_W_PV;
                }
                -weight
            });
        }

        let original_alpha = alpha;
        let mut best_move = Move::NULL;
        let mut best_child: Option<Rc<Node>> = None;

        for mv in moves {
            self.move_engine.make(mv);
            let result = self.alphabeta(depth_left - 1, -beta, -alpha, mv, allow_null);
            // The frame's make/unmake pair completes before time-up
            // propagates; the board is never left half-made.
            self.move_engine.unmake();
            let sub = result?;
            let score = -sub.score;

            if score >= beta {
                let node = Rc::new(Node {
                    mv: p_move,
                    best_move: mv,
                    best_child: Some(sub),
                    score: beta,
                    bound: Bound::Lower,
                    quiescence: false,
                });
                self.tt.store(hash, depth_left, node.clone());
                return Ok(node);
            }
            if score > alpha {
                alpha = score;
                best_move = mv;
                best_child = Some(sub);
            }
        }

        let bound = if alpha > original_alpha {
            Bound::Exact
        } else {
            Bound::Upper
        };
        let node = Rc::new(Node {
            mv: p_move,
            best_move,
            best_child,
            score: alpha,
            bound,
            quiescence: false,
        });
        self.tt.store(hash, depth_left, node.clone());
        Ok(node)
    }

    /// Capture-only extension past the horizon. Stand pat, delta-prune
    /// hopeless nodes, then try the good captures.
    fn quiescence(
        &mut self,
        mut alpha: i32,
        beta: i32,
        qdepth: i32,
        p_move: Move,
    ) -> Result<Rc<Node>, TimeUp> {
        self.check_stop()?;

        let stand_pat = evaluate(&self.move_engine, qdepth == 0, self.endgame);
        if stand_pat >= beta {
            return Ok(Rc::new(Node {
                mv: p_move,
                best_move: Move::NULL,
                best_child: None,
                score: beta,
                bound: Bound::Lower,
                quiescence: true,
            }));
        }

        let mut delta = 900;
        if p_move.promotion() == Some(Piece::Queen) {
            delta += 775;
        }
        if stand_pat < alpha - delta {
            return Ok(Rc::new(Node {
                mv: p_move,
                best_move: Move::NULL,
                best_child: None,
                score: alpha,
                bound: Bound::Upper,
                quiescence: true,
            }));
        }

        if stand_pat > alpha {
            alpha = stand_pat;
        }

        let mut best_move = Move::NULL;
        let mut best_child: Option<Rc<Node>> = None;
        let captures: Vec<Move> = self
            .move_engine
            .legal_moves()
            .into_iter()
            .filter(|m| m.is_capture())
            .collect();
        for mv in captures {
            if is_bad_capture(&self.move_engine.board, mv) {
                continue;
            }
            self.move_engine.make(mv);
            let result = self.quiescence(-beta, -alpha, qdepth + 1, mv);
            self.move_engine.unmake();
            let sub = result?;
            let score = -sub.score;

            if score >= beta {
                return Ok(Rc::new(Node {
                    mv: p_move,
                    best_move: mv,
                    best_child: Some(sub),
                    score: beta,
                    bound: Bound::Lower,
                    quiescence: true,
                }));
            }
            if score > alpha {
                alpha = score;
                best_move = mv;
                best_child = Some(sub);
            }
        }

        Ok(Rc::new(Node {
            mv: p_move,
            best_move,
            best_child,
            score: alpha,
            bound: Bound::Exact,
            quiescence: true,
        }))
    }

    /// The move to boost at this node while walking the previous
    /// iteration's best line. Following starts at the root, descends one
    /// chain link per followed ply, and stops one level above the horizon
    /// or when the stored line runs out.
    fn pv_seed(&mut self, depth_left: i32) -> Option<u16> {
        if depth_left == self.root_depth {
            let prev = self.last_ponder.clone()?;
            if prev.best_move.null {
                return None;
            }
            self.following = true;
            self.follow_node = prev.best_child.clone();
            self.follow_depth = depth_left;
            self.pv_seeds += 1;
            return Some(prev.best_move.id());
        }
        if !self.following {
            return None;
        }
        if depth_left <= 1 {
            self.following = false;
            return None;
        }
        if depth_left >= self.follow_depth {
            // A sibling at an already-followed level; the spine has moved on.
            return None;
        }
        let Some(node) = self.follow_node.clone() else {
            self.following = false;
            return None;
        };
        if node.best_move.null {
            self.following = false;
            return None;
        }
        self.follow_node = node.best_child.clone();
        self.follow_depth = depth_left;
        self.pv_seeds += 1;
        Some(node.best_move.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_mate_in_one_for_white() {
        let mut engine = Engine::new(MoveEngine::from_fen("1R5K/2R5/8/8/8/8/8/k7 w - - 0 1").unwrap());
        let node = engine.search_to_depth(1).unwrap();
        assert_eq!(node.best_move.uci(), "c7a7");
        assert!(node.score > WEIGHT_CHECKMATE / 2);
    }

    #[test]
    fn finds_mate_in_one_for_black() {
        let mut engine = Engine::new(MoveEngine::from_fen("1r5k/2r5/8/8/8/8/8/K7 b - - 0 1").unwrap());
        let node = engine.search_to_depth(2).unwrap();
        assert_eq!(node.best_move.uci(), "c7a7");
        assert!(node.score > WEIGHT_CHECKMATE / 2);
    }

    #[test]
    fn wins_material_within_two_plies() {
        let mut engine = Engine::new(MoveEngine::from_fen("1K6/8/3r2Q1/8/8/b7/8/4k3 w - - 0 1").unwrap());
        let node = engine.search_to_depth(2).unwrap();
        assert!(node.score >= 200, "expected a material win, got {}", node.score);
    }

    #[test]
    fn a_ponder_returns_the_depth_one_move_even_with_a_zero_budget() {
        let mut engine = Engine::new(MoveEngine::from_fen("1R5K/2R5/8/8/8/8/8/k7 w - - 0 1").unwrap());
        let (score, mv) = engine.ponder(0.0);
        assert_eq!(mv.uci(), "c7a7");
        assert!(score > WEIGHT_CHECKMATE / 2);
    }
}
