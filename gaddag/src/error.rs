/*
 * error.rs
 * Part of the gaddag project
 * Created Date: Monday, March 3rd 2025
 * Author: Paul Tsouchlos (DeveloperPaul123) (developer.paul.123@gmail.com)
 * -----
 * Last Modified: Tue May 6 2025
 * -----
 * Copyright (c) 2025 Paul Tsouchlos (DeveloperPaul123)
 * GNU General Public License v3.0 or later
 * https://www.gnu.org/licenses/gpl-3.0-standalone.html
 *
 */
use thiserror::Error;

/// Errors surfaced by the lexicon, board, and move-generation core.
///
/// Binary and CSV loaders stop at the first bad byte; none of these
/// variants carry partial-recovery information because none is attempted.
#[derive(Debug, Error)]
pub enum GaddagError {
    #[error("letter distribution needs {needed} bit-rack lanes but only {available} are available")]
    IncompatibleLd { needed: u32, available: u32 },

    #[error("no legal moves: move list has zero capacity")]
    NoMoves,

    #[error("word map or word graph format version {found} is older than the minimum supported version {minimum}")]
    UnsupportedVersion { found: u32, minimum: u32 },

    #[error("board dimension mismatch: file was built for dim {found}, runtime expects {expected}")]
    BoardDimMismatch { found: u32, expected: u32 },

    #[error("invalid letter {0:?} is not part of the letter distribution")]
    InvalidLetter(char),

    #[error("word {0:?} is longer than the board dimension")]
    WordTooLong(String),

    #[error("word {0:?} has fewer than two letters")]
    WordTooShort(String),

    #[error("duplicate leave {0:?} in leave CSV")]
    DuplicateLeave(String),

    #[error("malformed leave CSV row: {0:?}")]
    InvalidRow(String),

    #[error("leave CSV line exceeds the {0}-byte maximum")]
    LineExceedsMaxLength(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
