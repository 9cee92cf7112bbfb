/*
 * game.rs
 * Part of the gaddag project
 * Created Date: Tuesday, March 11th 2025
 * Author: Paul Tsouchlos (DeveloperPaul123) (developer.paul.123@gmail.com)
 * -----
 * Last Modified: Mon Jun 9 2025
 * -----
 * Copyright (c) 2025 Paul Tsouchlos (DeveloperPaul123)
 * GNU General Public License v3.0 or later
 * https://www.gnu.org/licenses/gpl-3.0-standalone.html
 *
 */
//! A full game: board, bag, two players, whose turn it is, and the
//! scoreless-turn/end-reason state machine. `play_move`/`unplay_move` keep
//! a journal rather than the source's pre-allocated backup slots: each play
//! pushes one frame, undo pops and reverses it in LIFO order.

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::alphabet::{LetterDistribution, MachineLetter};
use crate::board::{Board, Direction};
use crate::cross_set::{generate_cross_set, CrossSetMode};
use crate::klv::Klv;
use crate::kwg::Kwg;
use crate::moves::{Move, MoveType};
use crate::rack::Rack;

/// Tile bag: the letters not yet on a rack or the board, drawn from the
/// back. The PRNG is reseeded (not advanced) on [`Game::reset`], so a fixed
/// seed reproduces the same shuffle every time.
#[derive(Debug, Clone)]
pub struct Bag {
    tiles: Vec<MachineLetter>,
}

impl Bag {
    pub fn new(ld: &LetterDistribution, seed: u64) -> Self {
        let mut tiles = Vec::with_capacity(ld.bag_capacity() as usize);
        for ml in 0..ld.alphabet_size() as MachineLetter {
            for _ in 0..ld.count(ml) {
                tiles.push(ml);
            }
        }
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        tiles.shuffle(&mut rng);
        Bag { tiles }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Draws up to `n` tiles from the back of the bag.
    pub fn draw(&mut self, n: usize) -> Vec<MachineLetter> {
        let take = n.min(self.tiles.len());
        self.tiles.split_off(self.tiles.len() - take)
    }

    pub fn add_back(&mut self, tiles: &[MachineLetter]) {
        self.tiles.extend_from_slice(tiles);
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    pub rack: Rack,
    pub word_graph: Arc<Kwg>,
    pub klv: Arc<Klv>,
    pub score: i32,
}

impl Player {
    pub fn new(word_graph: Arc<Kwg>, klv: Arc<Klv>, alphabet_size: usize) -> Self {
        Player {
            rack: Rack::new(alphabet_size),
            word_graph,
            klv,
            score: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEndReason {
    None,
    StandardPass,
    RackEmptyBagEmpty,
    TimePenaltyExceeded,
}

const CONSECUTIVE_SCORELESS_LIMIT: u32 = 6;

/// One reversible change recorded by [`Game::play_move`]. Popped and
/// reversed in LIFO order by [`Game::unplay_move`].
#[derive(Clone)]
enum UndoOp {
    SetSquare { row: usize, col: usize, old: MachineLetter },
    SetRack { player: usize, old: Rack },
    SetScore { player: usize, old: i32 },
    SetBag { old: Vec<MachineLetter> },
    SetTurn { old: usize },
    SetScoreless { old: u32 },
    SetEndReason { old: GameEndReason },
}

#[derive(Clone)]
pub struct Game {
    pub board: Board,
    pub bag: Bag,
    pub players: [Player; 2],
    pub ld: Arc<LetterDistribution>,
    pub player_on_turn: usize,
    pub consecutive_scoreless_turns: u32,
    pub game_end_reason: GameEndReason,
    journal: Vec<Vec<UndoOp>>,
}

impl Game {
    pub fn new(ld: Arc<LetterDistribution>, board: Board, bag: Bag, players: [Player; 2]) -> Self {
        Game {
            board,
            bag,
            players,
            ld,
            player_on_turn: 0,
            consecutive_scoreless_turns: 0,
            game_end_reason: GameEndReason::None,
            journal: Vec::new(),
        }
    }

    fn opponent(&self) -> usize {
        1 - self.player_on_turn
    }

    /// Plays `mv` for the player on turn, recording a fresh undo frame.
    /// Does not draw replacement tiles; callers that want the full
    /// play-then-draw cycle call [`Game::draw_to_full_rack`] afterward
    /// (outside the undo journal, since simulation unplay never restores
    /// post-play draws).
    pub fn play_move(&mut self, mv: &Move) {
        let mut frame = Vec::new();
        let player = self.player_on_turn;

        frame.push(UndoOp::SetScore {
            player,
            old: self.players[player].score,
        });
        frame.push(UndoOp::SetRack {
            player,
            old: self.players[player].rack.clone(),
        });
        frame.push(UndoOp::SetScoreless {
            old: self.consecutive_scoreless_turns,
        });
        frame.push(UndoOp::SetEndReason {
            old: self.game_end_reason,
        });
        frame.push(UndoOp::SetTurn { old: player });

        match mv.move_type() {
            MoveType::Pass => {
                self.consecutive_scoreless_turns += 1;
            }
            MoveType::Exchange => {
                frame.push(UndoOp::SetBag {
                    old: self.bag.tiles_snapshot(),
                });
                for &ml in mv.strip() {
                    self.players[player].rack.take_letter(crate::alphabet::unblank(ml));
                }
                let drawn = self.bag.draw(mv.strip().len());
                self.bag.add_back(mv.strip());
                for &ml in &drawn {
                    self.players[player].rack.add_letter(ml);
                }
                self.consecutive_scoreless_turns += 1;
            }
            MoveType::TilePlacement => {
                let (row, col, dir) = (mv.row(), mv.col(), mv.direction());
                for (i, &cell) in mv.strip().iter().enumerate() {
                    if cell == crate::moves::PLAYED_THROUGH {
                        continue;
                    }
                    let (r, c) = match dir {
                        Direction::Horizontal => (row, col + i),
                        Direction::Vertical => (row + i, col),
                    };
                    frame.push(UndoOp::SetSquare {
                        row: r,
                        col: c,
                        old: self.board.square(r, c).letter,
                    });
                    self.board.set_letter(r, c, cell);
                    let rack_letter = if crate::alphabet::is_blanked(cell) {
                        crate::alphabet::BLANK_MACHINE_LETTER
                    } else {
                        cell
                    };
                    self.players[player].rack.take_letter(rack_letter);
                }
                self.players[player].score += mv.score();
                if mv.score() > 0 {
                    self.consecutive_scoreless_turns = 0;
                } else {
                    self.consecutive_scoreless_turns += 1;
                }
            }
        }

        if self.consecutive_scoreless_turns >= CONSECUTIVE_SCORELESS_LIMIT {
            self.game_end_reason = GameEndReason::StandardPass;
        } else if self.players[player].rack.is_empty() && self.bag.is_empty() {
            self.game_end_reason = GameEndReason::RackEmptyBagEmpty;
        }

        self.player_on_turn = self.opponent();
        self.journal.push(frame);
    }

    /// Reverses the most recent [`Game::play_move`] call.
    pub fn unplay_move(&mut self) {
        let frame = self.journal.pop().expect("unplay_move with empty journal");
        for op in frame.into_iter().rev() {
            match op {
                UndoOp::SetSquare { row, col, old } => self.board.set_letter(row, col, old),
                UndoOp::SetRack { player, old } => self.players[player].rack = old,
                UndoOp::SetScore { player, old } => self.players[player].score = old,
                UndoOp::SetBag { old } => self.bag.tiles = old,
                UndoOp::SetTurn { old } => self.player_on_turn = old,
                UndoOp::SetScoreless { old } => self.consecutive_scoreless_turns = old,
                UndoOp::SetEndReason { old } => self.game_end_reason = old,
            }
        }
    }

    /// Draws tiles from the bag until the given player's rack holds
    /// `RACK_SIZE` or the bag runs out, whichever comes first.
    pub fn draw_to_full_rack(&mut self, player: usize) {
        let needed = crate::rack::RACK_SIZE.saturating_sub(self.players[player].rack.total() as usize);
        for ml in self.bag.draw(needed) {
            self.players[player].rack.add_letter(ml);
        }
    }

    /// Empties `player`'s rack back into the bag and deals a specific
    /// replacement rack, used by the simulation engine to seat a known or
    /// sampled opponent rack before rolling out.
    pub fn set_player_rack(&mut self, player: usize, new_rack: Rack) {
        let alphabet_size = self.players[player].rack.alphabet_size();
        let mut returning = Rack::new(alphabet_size);
        std::mem::swap(&mut returning, &mut self.players[player].rack);
        let old_tiles: Vec<MachineLetter> = returning
            .iter_counts()
            .flat_map(|(ml, c)| std::iter::repeat(ml).take(c as usize))
            .collect();
        self.bag.add_back(&old_tiles);

        let new_tiles: Vec<MachineLetter> = new_rack
            .iter_counts()
            .flat_map(|(ml, c)| std::iter::repeat(ml).take(c as usize))
            .collect();
        for &ml in &new_tiles {
            let idx = self.bag.tiles.iter().rposition(|&t| t == ml);
            if let Some(idx) = idx {
                self.bag.tiles.remove(idx);
            }
        }
        self.players[player].rack = new_rack;
    }

    pub fn is_over(&self) -> bool {
        self.game_end_reason != GameEndReason::None
    }

    /// Recomputes every square's cross-set against `kwg`. Cross-sets aren't
    /// part of the undo journal (they're a pure function of the board's
    /// letters), so callers that mutate the board outside a single
    /// `play_move`/`unplay_move` pair — the simulation rollout chains many
    /// of them back to back — must resync once the dust settles rather
    /// than after every individual tile.
    pub fn sync_cross_sets(&mut self, kwg: &Kwg) {
        let dim = self.board.dim();
        for &dir in &[Direction::Horizontal, Direction::Vertical] {
            for line in 0..dim {
                for pos in 0..dim {
                    generate_cross_set(&mut self.board, &self.ld, kwg, dir, line, pos, CrossSetMode::Classic);
                }
            }
        }
    }
}

impl Bag {
    fn tiles_snapshot(&self) -> Vec<MachineLetter> {
        self.tiles.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::EMPTY_SQUARE_MARKER;

    fn two_player_game() -> Game {
        let ld = Arc::new(LetterDistribution::english());
        let kwg = Arc::new(Kwg::from_nodes(vec![0, 0]));
        let klv = Arc::new(Klv::build(&[]));
        let bag = Bag::new(&ld, 42);
        let p0 = Player::new(kwg.clone(), klv.clone(), ld.alphabet_size());
        let p1 = Player::new(kwg, klv, ld.alphabet_size());
        Game::new(ld, Board::standard(), bag, [p0, p1])
    }

    #[test]
    fn bag_draw_and_return_round_trip() {
        let ld = LetterDistribution::english();
        let mut bag = Bag::new(&ld, 7);
        let starting = bag.len();
        let drawn = bag.draw(7);
        assert_eq!(drawn.len(), 7);
        assert_eq!(bag.len(), starting - 7);
        bag.add_back(&drawn);
        assert_eq!(bag.len(), starting);
    }

    #[test]
    fn play_pass_increments_scoreless_and_unplay_restores() {
        let mut game = two_player_game();
        let before_turn = game.player_on_turn;
        game.play_move(&Move::new_pass());
        assert_eq!(game.consecutive_scoreless_turns, 1);
        assert_ne!(game.player_on_turn, before_turn);
        game.unplay_move();
        assert_eq!(game.consecutive_scoreless_turns, 0);
        assert_eq!(game.player_on_turn, before_turn);
    }

    #[test]
    fn six_consecutive_passes_end_the_game() {
        let mut game = two_player_game();
        for _ in 0..CONSECUTIVE_SCORELESS_LIMIT {
            game.play_move(&Move::new_pass());
        }
        assert_eq!(game.game_end_reason, GameEndReason::StandardPass);
    }

    #[test]
    fn tile_placement_round_trips_board_and_score() {
        let mut game = two_player_game();
        let ld = LetterDistribution::english();
        let a = ld.machine_letter('A').unwrap();
        game.players[0].rack.add_letter(a);
        let mv = Move::new_tile_placement(&[a], 1, 7, 7, Direction::Horizontal, 1);
        game.play_move(&mv);
        assert_eq!(game.board.square(7, 7).letter, a);
        assert_eq!(game.players[0].score, 1);
        game.unplay_move();
        assert_eq!(game.board.square(7, 7).letter, EMPTY_SQUARE_MARKER);
        assert_eq!(game.players[0].score, 0);
        assert_eq!(game.players[0].rack.count(a), 1);
    }
}
