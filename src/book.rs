//! Opening book: an opaque position -> move lookup.
//!
//! The on-disk format is a bincode-serialized map from a position key
//! (the first four FEN fields, clocks dropped) to a UCI move string.
//! Absence of a book file is not an error; the engine just searches.

use crate::engine::MoveEngine;
use crate::moves::types::Move;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

#[derive(Serialize, Deserialize)]
struct BookFile {
    entries: HashMap<String, String>,
}

pub struct OpeningBook {
    entries: HashMap<String, String>,
}

/// Position key: placement, side to move, castling, en passant. The
/// clocks never matter for book lines.
pub fn position_key(fen: &str) -> String {
    fen.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
}

impl OpeningBook {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let bytes = std::fs::read(path.as_ref())
            .map_err(|e| format!("cannot read book {}: {}", path.as_ref().display(), e))?;
        let file: BookFile = bincode::deserialize(&bytes)
            .map_err(|e| format!("cannot parse book {}: {}", path.as_ref().display(), e))?;
        Ok(OpeningBook {
            entries: file.entries,
        })
    }

    pub fn from_entries(entries: HashMap<String, String>) -> Self {
        OpeningBook { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The book move for the current position, if the book knows one and
    /// it is legal here.
    pub fn lookup(&self, engine: &MoveEngine) -> Option<Move> {
        let key = position_key(&engine.board.to_fen());
        let uci = self.entries.get(&key)?;
        match engine.move_from_uci(uci) {
            Ok(mv) => Some(mv),
            Err(err) => {
                debug!(%key, %uci, %err, "book move is not legal here; ignoring");
                None
            }
        }
    }
}
