use crate::board::castle_bits::*;
use crate::board::{Board, Color, Piece};
use crate::square::Square;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl Board {
    /// Replaces the position with one parsed from a FEN string.
    ///
    /// The en-passant field of a FEN names the *capture* square (behind the
    /// pawn that just double-pushed); the board stores the pawn's own
    /// square, hence the ±8 conversion. The clock fields are optional and
    /// default to 0 and 1.
    pub fn set_fen(&mut self, fen: &str) -> Result<(), String> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(format!("FEN needs at least 4 fields, got {}", fields.len()));
        }

        let mut board = Board::new_empty();

        let rows: Vec<&str> = fields[0].split('/').collect();
        if rows.len() != 8 {
            return Err(format!("FEN placement needs 8 ranks, got {}", rows.len()));
        }
        let mut kings = [0usize; 2];
        for (rank, row) in rows.iter().enumerate() {
            let mut file = 0u8;
            let mut last_was_digit = false;
            for ch in row.chars() {
                if let Some(run) = ch.to_digit(10) {
                    if last_was_digit {
                        return Err("two empty-run digits in a row".to_string());
                    }
                    if run == 0 || run > 8 {
                        return Err(format!("bad empty-run digit {:?}", ch));
                    }
                    file += run as u8;
                    last_was_digit = true;
                    continue;
                }
                last_was_digit = false;
                let kind = Piece::from_letter(ch)
                    .ok_or_else(|| format!("invalid piece letter {:?}", ch))?;
                let color = if ch.is_ascii_uppercase() {
                    Color::White
                } else {
                    Color::Black
                };
                if file >= 8 {
                    return Err(format!("rank {} overflows the board", 8 - rank));
                }
                if kind == Piece::King {
                    kings[color as usize] += 1;
                }
                board.add(Square::from_file_rank(file, rank as u8), color, kind);
                file += 1;
            }
            if file != 8 {
                return Err(format!("rank {} does not fill 8 files", 8 - rank));
            }
        }
        if kings[0] != 1 || kings[1] != 1 {
            return Err(format!(
                "each side needs exactly one king (white {}, black {})",
                kings[0], kings[1]
            ));
        }

        board.side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(format!("invalid side to move {:?}", other)),
        };

        if fields[2] != "-" {
            for ch in fields[2].chars() {
                let flag = match ch {
                    'K' => CASTLE_WE,
                    'Q' => CASTLE_WW,
                    'k' => CASTLE_BE,
                    'q' => CASTLE_BW,
                    other => return Err(format!("invalid castling letter {:?}", other)),
                };
                board.castling_rights |= flag;
            }
        }

        if fields[3] != "-" {
            let capture_sq: Square = fields[3].parse()?;
            let target = match board.side_to_move {
                // Black just double-pushed onto the rank below the capture square.
                Color::White => {
                    if capture_sq.rank() != 2 {
                        return Err(format!("en-passant square {} on the wrong rank", capture_sq));
                    }
                    Square::from_index(capture_sq.index() + 8)
                }
                Color::Black => {
                    if capture_sq.rank() != 5 {
                        return Err(format!("en-passant square {} on the wrong rank", capture_sq));
                    }
                    Square::from_index(capture_sq.index() - 8)
                }
            };
            board.en_passant = Some(target);
        }

        board.halfmove_clock = match fields.get(4) {
            Some(s) => s.parse().map_err(|_| format!("bad halfmove clock {:?}", s))?,
            None => 0,
        };
        board.fullmove_number = match fields.get(5) {
            Some(s) => {
                let n: u32 = s.parse().map_err(|_| format!("bad fullmove number {:?}", s))?;
                if n == 0 {
                    return Err("fullmove number must be positive".to_string());
                }
                n
            }
            None => 1,
        };

        *self = board;
        Ok(())
    }

    pub fn to_fen(&self) -> String {
        let mut out = String::new();

        for rank in 0..8u8 {
            let mut empty = 0;
            for file in 0..8u8 {
                let sq = Square::from_file_rank(file, rank);
                match self.piece_at(sq) {
                    Some((color, kind)) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        let letter = kind.letter();
                        out.push(if color == Color::White {
                            letter.to_ascii_uppercase()
                        } else {
                            letter
                        });
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
            if rank != 7 {
                out.push('/');
            }
        }

        out.push(' ');
        out.push(if self.side_to_move == Color::White { 'w' } else { 'b' });

        out.push(' ');
        if self.castling_rights == 0 {
            out.push('-');
        } else {
            if self.has_castling(CASTLE_WE) {
                out.push('K');
            }
            if self.has_castling(CASTLE_WW) {
                out.push('Q');
            }
            if self.has_castling(CASTLE_BE) {
                out.push('k');
            }
            if self.has_castling(CASTLE_BW) {
                out.push('q');
            }
        }

        out.push(' ');
        match self.en_passant {
            Some(target) => {
                let capture_sq = match self.side_to_move {
                    Color::White => Square::from_index(target.index() - 8),
                    Color::Black => Square::from_index(target.index() + 8),
                };
                out.push_str(&capture_sq.to_string());
            }
            None => out.push('-'),
        }

        out.push_str(&format!(" {} {}", self.halfmove_clock, self.fullmove_number));
        out
    }

    /// ASCII grid with rank and file legends, used by the CLI's `d`.
    pub fn render(&self) -> String {
        let padding = {
            let mut row = String::from("+");
            for _ in 0..8 {
                row.push_str("----+");
            }
            row
        };

        let mut out = String::new();
        for rank in 0..8u8 {
            out.push_str(&padding);
            out.push('\n');
            out.push('|');
            for file in 0..8u8 {
                let sq = Square::from_file_rank(file, rank);
                let ch = match self.piece_at(sq) {
                    Some((Color::White, kind)) => kind.letter().to_ascii_uppercase(),
                    Some((Color::Black, kind)) => kind.letter(),
                    None => ' ',
                };
                out.push_str(&format!(" {}  |", ch));
            }
            out.push_str(&format!("  {}\n", 8 - rank));
        }
        out.push_str(&padding);
        out.push('\n');
        for file in 0..8u8 {
            out.push_str(&format!("  {}  ", (b'a' + file) as char));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn start_position_round_trips() {
        let board = Board::start();
        assert_eq!(board.to_fen(), START_FEN);
        assert_eq!(board.castling_rights, CASTLE_ALL);
        assert_eq!(board.piece_count(Color::White, Piece::Pawn), 8);
        assert_eq!(board.king_square(Color::White).to_string(), "e1");
        assert_eq!(board.king_square(Color::Black).to_string(), "e8");
        board.validate().unwrap();
    }

    #[test]
    fn en_passant_target_is_the_pawn_square() {
        // After 1. e4: FEN says "e3", the pawn itself stands on e4.
        let board = Board::from_str(
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
        )
        .unwrap();
        let target = board.en_passant.unwrap();
        assert_eq!(target.to_string(), "e4");
        assert_eq!(board.piece_at(target), Some((Color::White, Piece::Pawn)));
        assert!(board.to_fen().contains(" e3 "));
    }

    #[test]
    fn optional_clock_fields() {
        let board = Board::from_str("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - -").unwrap();
        assert_eq!(board.halfmove_clock, 0);
        assert_eq!(board.fullmove_number, 1);
    }

    #[test]
    fn rejects_malformed_fens() {
        assert!(Board::from_str("").is_err());
        assert!(Board::from_str("8/8/8/8/8/8/8/8 w - - 0 1").is_err()); // no kings
        assert!(Board::from_str("9/8/8/8/8/8/8/4K2k w - - 0 1").is_err());
        assert!(Board::from_str("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1").is_err());
        assert!(Board::from_str("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KXkq - 0 1").is_err());
    }

    #[test]
    fn render_shows_both_corners() {
        let grid = Board::start().render();
        assert!(grid.contains("| r  | n  | b  | q  | k  | b  | n  | r  |  8"));
        assert!(grid.contains("| R  | N  | B  | Q  | K  | B  | N  | R  |  1"));
    }
}
