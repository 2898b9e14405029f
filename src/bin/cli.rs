use std::io::{self, BufRead};
use tempo::board::START_FEN;
use tempo::book::OpeningBook;
use tempo::engine::{MoveEngine, TerminalStatus};
use tempo::logger::init_logging;
use tempo::moves::perft::{perft, perft_divide};
use tempo::moves::types::Move;
use tempo::search::Engine;
use tracing::info;

struct Cli {
    engine: Engine,
    selected: Vec<Move>,
    gamemode: bool,
    ponder_time: f64,
}

fn main() {
    init_logging("logs/tempo.log", "info");

    let mut cli = Cli {
        engine: Engine::new(MoveEngine::start()),
        selected: Vec::new(),
        gamemode: false,
        ponder_time: 10.0,
    };
    cli.engine.book = match OpeningBook::load("book.bin") {
        Ok(book) => {
            println!("Opening book loaded ({} positions)", book.len());
            Some(book)
        }
        Err(_) => None,
    };

    println!("Welcome to the tempo chess console");
    println!("Type \"help\" for the command list");
    cli.show_board();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l.trim().to_string(),
            Err(_) => break,
        };
        if line.is_empty() {
            continue;
        }
        let (command, args) = match line.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd.to_ascii_lowercase(), rest.trim().to_string()),
            None => (line.to_ascii_lowercase(), String::new()),
        };
        if command == "quit" {
            break;
        }
        cli.dispatch(&command, &args);
    }
}

impl Cli {
    fn dispatch(&mut self, command: &str, args: &str) {
        match command {
            "d" => self.show_board(),
            "fen" => self.do_fen(args),
            "select" => self.do_select(args),
            "move" => self.do_move(args),
            "undo" => self.do_undo(),
            "list" => self.do_list(),
            "perft" => self.do_perft(args),
            "pondertime" => self.do_pondertime(args),
            "cpu" => self.do_cpu(),
            "gamemode" => self.do_gamemode(),
            "cpugame" => self.do_cpugame(),
            "reset" => self.do_fen(START_FEN),
            "help" => self.do_help(),
            _ => println!("Unknown command {:?}; type \"help\"", command),
        }
    }

    fn show_board(&self) {
        let me = &self.engine.move_engine;
        info!(hash = me.current_hash(), fen = %me.board.to_fen(), "display");
        let turn = match me.board.side_to_move {
            tempo::board::Color::White => "White",
            tempo::board::Color::Black => "Black",
        };
        println!("Turn: {}", turn);
        println!("{}", me.board.render());
    }

    fn announce(&self) {
        let me = &self.engine.move_engine;
        match me.terminal_status() {
            TerminalStatus::Ongoing => {
                if me.in_check() {
                    println!("Check!");
                }
            }
            TerminalStatus::Checkmate => println!("Checkmate!"),
            TerminalStatus::Stalemate => println!("Stalemate"),
            TerminalStatus::Draw => println!("Draw"),
        }
    }

    fn do_fen(&mut self, args: &str) {
        if args.is_empty() {
            println!("{}", self.engine.move_engine.board.to_fen());
            return;
        }
        match self.engine.move_engine.set_fen(args) {
            Ok(()) => {
                self.selected.clear();
                self.show_board();
            }
            Err(err) => println!("Invalid FEN: {}", err),
        }
    }

    fn do_select(&mut self, args: &str) {
        let square = match args.parse() {
            Ok(sq) => sq,
            Err(_) => {
                println!("Invalid coordinates {:?}", args);
                return;
            }
        };
        self.selected = self.engine.move_engine.legal_moves_from(square);
        if self.selected.is_empty() {
            println!("No moves from {}", args);
        }
        for (i, mv) in self.selected.iter().enumerate() {
            println!("{}: {:#}", i, mv);
        }
    }

    fn do_move(&mut self, args: &str) {
        let mv = match args.parse::<usize>().ok().and_then(|i| self.selected.get(i)) {
            Some(&mv) => mv,
            None => {
                println!("Invalid move index; use \"select\" first");
                return;
            }
        };
        self.selected.clear();
        self.engine.move_engine.make(mv);
        self.show_board();
        if self.gamemode && self.engine.move_engine.terminal_status() == TerminalStatus::Ongoing {
            self.do_cpu();
        } else {
            self.announce();
        }
    }

    fn do_undo(&mut self) {
        if self.engine.move_engine.move_stack().is_empty() {
            println!("Nothing to undo");
            return;
        }
        self.selected.clear();
        self.engine.move_engine.unmake();
        self.show_board();
    }

    fn do_list(&self) {
        let moves = self.engine.move_engine.legal_moves();
        println!("Moves: {}", moves.len());
        for mv in moves {
            println!("{:#}", mv);
        }
    }

    fn do_perft(&mut self, args: &str) {
        let depth: u32 = match args.parse() {
            Ok(d) if d >= 1 => d,
            _ => {
                println!("Invalid depth {:?}", args);
                return;
            }
        };
        if depth == 1 {
            println!("Nodes: {}", perft(&mut self.engine.move_engine, 1));
            return;
        }
        let (breakdown, total) = perft_divide(&mut self.engine.move_engine, depth);
        for (mv, nodes) in breakdown {
            println!("{}: {}", mv.uci(), nodes);
        }
        println!("Nodes: {}", total);
    }

    fn do_pondertime(&mut self, args: &str) {
        match args.parse::<f64>() {
            Ok(seconds) if seconds > 0.0 => {
                self.ponder_time = seconds;
                println!("Ponder time set to {:.2} (s)", seconds);
            }
            _ => println!("Please enter a positive number of seconds"),
        }
    }

    fn do_cpu(&mut self) {
        if self.engine.move_engine.terminal_status() != TerminalStatus::Ongoing {
            println!("Game over; nothing to play");
            self.announce();
            return;
        }
        let (score, mv) = self.engine.ponder(self.ponder_time);
        if mv.null {
            println!("No move found");
            return;
        }
        println!("Evaluation {}, move: {}", score, mv.uci());
        self.selected.clear();
        self.engine.move_engine.make(mv);
        self.show_board();
        self.announce();
    }

    fn do_gamemode(&mut self) {
        self.gamemode = !self.gamemode;
        println!(
            "Gamemode toggled {}",
            if self.gamemode { "on" } else { "off" }
        );
    }

    fn do_cpugame(&mut self) {
        while self.engine.move_engine.terminal_status() == TerminalStatus::Ongoing {
            self.do_cpu();
        }
    }

    fn do_help(&self) {
        println!("d                 print the board and side to move");
        println!("fen [FEN]         print the FEN, or set the position from one");
        println!("select <sq>       list legal moves from a square");
        println!("move <n>          play the n-th move from the last select");
        println!("undo              take back the last move");
        println!("list              print every legal move");
        println!("perft <n>         divide-perft to depth n");
        println!("pondertime <s>    set the search budget in seconds");
        println!("cpu               search and play the engine's choice");
        println!("gamemode          toggle auto-reply after your moves");
        println!("cpugame           engine vs engine until the game ends");
        println!("reset             back to the starting position");
        println!("quit              exit");
    }
}
