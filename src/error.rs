/*
  Fiddler, a UCI-compatible chess engine.
  Copyright (C) 2022 The Fiddler Authors (see AUTHORS.md file)

  Fiddler is free software: you can redistribute it and/or modify
  it under the terms of the GNU General Public License as published by
  the Free Software Foundation, either version 3 of the License, or
  (at your option) any later version.

  Fiddler is distributed in the hope that it will be useful,
  but WITHOUT ANY WARRANTY; without even the implied warranty of
  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
  GNU General Public License for more details.

  You should have received a copy of the GNU General Public License
  along with this program.  If not, see <http://www.gnu.org/licenses/>.
*/

//! Structured errors surfaced at the boundaries of the engine: FEN parsing and
//! UCI-style move parsing. Internal invariants never produce an `Err`; if they
//! are violated, that is a bug, not a recoverable condition.

use std::fmt;

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
/// Everything that can go wrong while reading a FEN record.
pub enum FenError {
    #[error("reached end of input while parsing the {0} field")]
    /// The string ran out before a field was fully consumed.
    UnexpectedEnd(&'static str),

    #[error("board field does not describe exactly 8 ranks (got {0})")]
    /// The piece-placement field was not split into exactly 8 `/`-separated ranks.
    BoardSize(usize),

    #[error("rank {0} does not contain exactly 8 files (got {1})")]
    /// A single rank's digits and piece letters did not sum to 8 files.
    RankSize(usize, usize),

    #[error("unrecognized piece character '{0}' in board field")]
    /// A character in the board field was neither a piece code nor a digit.
    UnknownPiece(char),

    #[error("expected a space after the {0} field, found '{1:?}'")]
    /// A field separator was missing or wrong.
    MissingSeparator(&'static str, Option<char>),

    #[error("unrecognized side to move '{0}', expected 'w' or 'b'")]
    /// The side-to-move field was neither `w` nor `b`.
    UnknownSide(char),

    #[error("unrecognized castling right character '{0}'")]
    /// A character in the castling field was not one of `KQkq-`.
    UnknownCastleRight(char),

    #[error("'{0}' is not a legal square")]
    /// The en passant field did not parse as a square.
    BadSquare(String),

    #[error("position after parsing is illegal: {0}")]
    /// Parsing succeeded structurally, but the resulting position violates an
    /// invariant (duplicate kings, side not to move in check, and so on).
    IllegalPosition(&'static str),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Everything that can go wrong while parsing a UCI move string such as
/// `e7e8q`.
pub enum UciMoveError {
    /// The string was not 4 or 5 characters long.
    BadLength(usize),
    /// One of the two square fields did not parse.
    BadSquare,
    /// The promotion character (5th byte) was not a valid promotable piece.
    BadPromotion(char),
}

impl fmt::Display for UciMoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UciMoveError::BadLength(n) => {
                write!(f, "UCI move must be 4 or 5 characters, got {n}")
            }
            UciMoveError::BadSquare => write!(f, "could not parse a square in UCI move"),
            UciMoveError::BadPromotion(c) => write!(f, "'{c}' is not a legal promotion piece"),
        }
    }
}

impl std::error::Error for UciMoveError {}

impl From<&'static str> for FenError {
    fn from(s: &'static str) -> FenError {
        FenError::IllegalPosition(s)
    }
}

/// Helper used by square-parsing call sites to wrap a failed lookup into a
/// [`FenError::BadSquare`].
pub(crate) fn bad_square(s: &str) -> FenError {
    FenError::BadSquare(s.to_string())
}
