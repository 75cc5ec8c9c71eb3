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

//! A square-indexed array of optional `(Piece, Color)` pairs, kept in lockstep
//! with a `Position`'s bitboards. Where bitboards answer "which squares hold a
//! knight", the mailbox answers "what's on e4" in O(1) without having to probe
//! six bitboards per piece type.

use super::{Color, Piece, Square};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// One square's worth of mailbox content.
pub struct Occupant {
    /// The piece type on this square.
    pub piece: Piece,
    /// The color of the piece on this square.
    pub color: Color,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// A 64-entry array mapping each square to the piece (if any) sitting on it.
pub struct Mailbox {
    squares: [Option<Occupant>; 64],
}

impl Mailbox {
    /// A mailbox with nothing on any square.
    pub const EMPTY: Mailbox = Mailbox {
        squares: [None; 64],
    };

    #[must_use]
    /// Is there a piece at all at `sq`?
    pub const fn is_piece_at(&self, sq: Square) -> bool {
        self.squares[sq as usize].is_some()
    }

    #[must_use]
    /// Get the occupant of `sq`, if any.
    pub const fn get(&self, sq: Square) -> Option<Occupant> {
        self.squares[sq as usize]
    }

    /// Place `piece`/`color` on `sq`, overwriting whatever was there.
    pub fn set(&mut self, sq: Square, piece: Piece, color: Color) {
        self.squares[sq as usize] = Some(Occupant { piece, color });
    }

    /// Remove whatever occupant was on `sq`, returning it.
    pub fn clear(&mut self, sq: Square) -> Option<Occupant> {
        self.squares[sq as usize].take()
    }

    #[must_use]
    /// Flip this mailbox vertically (rank 1 becomes rank 8, and so on) and
    /// swap the color of every piece on it. The result is the mailbox that
    /// the opponent would see if the board were rotated 180 degrees and the
    /// colors were relabeled, which is useful for evaluating symmetric
    /// features without a separate Black-relative table.
    pub fn flip(&self) -> Mailbox {
        let mut flipped = *self;
        for i in 0..32 {
            flipped.squares.swap(i, i ^ 56);
        }
        for occupant in &mut flipped.squares {
            if let Some(o) = occupant {
                o.color = !o.color;
            }
        }
        flipped
    }
}

impl Default for Mailbox {
    fn default() -> Mailbox {
        Mailbox::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Square;

    #[test]
    fn set_and_get_round_trips() {
        let mut mb = Mailbox::EMPTY;
        mb.set(Square::E4, Piece::Knight, Color::White);
        assert_eq!(
            mb.get(Square::E4),
            Some(Occupant {
                piece: Piece::Knight,
                color: Color::White
            })
        );
        assert!(mb.is_piece_at(Square::E4));
        assert!(!mb.is_piece_at(Square::E5));
    }

    #[test]
    fn clear_removes_occupant() {
        let mut mb = Mailbox::EMPTY;
        mb.set(Square::A1, Piece::Rook, Color::White);
        let removed = mb.clear(Square::A1);
        assert_eq!(
            removed,
            Some(Occupant {
                piece: Piece::Rook,
                color: Color::White
            })
        );
        assert!(!mb.is_piece_at(Square::A1));
    }

    #[test]
    fn flip_swaps_rank_and_color() {
        let mut mb = Mailbox::EMPTY;
        mb.set(Square::E1, Piece::King, Color::White);
        let flipped = mb.flip();
        assert_eq!(
            flipped.get(Square::E8),
            Some(Occupant {
                piece: Piece::King,
                color: Color::Black
            })
        );
        assert!(!flipped.is_piece_at(Square::E1));
    }

    #[test]
    fn flip_is_an_involution() {
        let mut mb = Mailbox::EMPTY;
        mb.set(Square::B2, Piece::Pawn, Color::White);
        mb.set(Square::G7, Piece::Pawn, Color::Black);
        assert_eq!(mb.flip().flip(), mb);
    }
}
