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

//! The `Position` type: piece placement plus the metadata (side to move, en
//! passant square, castling rights, check/pin info) needed to generate and
//! validate moves, plus the undo history that lets a search walk forward and
//! backward through a game tree without copying the whole position at every
//! ply.

use crate::movegen::square_attackers;

use super::{fen, mailbox::Mailbox, zobrist, Bitboard, CastleRights, Color, Move, Piece, Square};

use std::{
    convert::TryFrom,
    default::Default,
    fmt::{Display, Formatter},
    hash::{Hash, Hasher},
    ops::Index,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Everything needed to undo one `apply()` call and return a `Position` to
/// exactly the state it was in beforehand.
pub struct UndoRecord {
    mv: Move,
    /// The piece captured by `mv`, and the square it was captured from. For
    /// an en passant capture this square differs from `mv.to_square()`.
    captured: Option<(Piece, Color, Square)>,
    mover_type: Piece,
    prev_en_passant_square: Option<Square>,
    prev_castle_rights: CastleRights,
    prev_hash: u64,
    prev_checkers: Bitboard,
    prev_pinned: Bitboard,
    prev_king_sqs: [Square; 2],
    prev_halfmove_clock: u16,
    prev_fullmove_number: u32,
}

#[derive(Clone, Debug)]
/// A representation of a chess position: piece placement, side to move, en
/// passant and castling state, and the undo history needed to reverse moves.
pub struct Position {
    /// The squares occupied by White and Black, respectively.
    sides: [Bitboard; 2],
    /// The squares occupied by (in order) knights, bishops, rooks, queens,
    /// pawns, and kings.
    pieces: [Bitboard; Piece::NUM_TYPES],
    /// A square-indexed cache of `(piece, color)`, kept in lockstep with
    /// `sides`/`pieces`.
    mailbox: Mailbox,
    /// The color of the player to move.
    pub player: Color,
    /// The square which can be moved to by a pawn in en passant. `None` when
    /// a pawn did not move two squares on the previous move.
    pub en_passant_square: Option<Square>,
    /// This position's castling rights.
    pub castle_rights: CastleRights,
    /// A Zobrist hash, maintained incrementally. Used only as a cache key; it
    /// is never trusted as the sole identity of a position.
    pub hash: u64,
    /// The squares occupied by pieces currently checking the player to move.
    pub checkers: Bitboard,
    /// The square of the White king, then the Black king.
    pub king_sqs: [Square; 2],
    /// The squares of pieces which are pinned against their own king.
    pub pinned: Bitboard,
    /// Plies since the last pawn move or capture. Reset to 0 by either;
    /// otherwise incremented every apply. Used by the fifty-move rule
    /// (enforcement of which is left to callers).
    pub halfmove_clock: u16,
    /// The number of the full move currently being played, starting at 1 and
    /// incrementing after each Black move.
    pub fullmove_number: u32,
    /// The sequence of moves applied to reach this position from its initial
    /// FEN, paired with enough state to undo each one.
    history: Vec<UndoRecord>,
}

impl Position {
    /// Construct a `Position` from the standard chess starting position.
    #[must_use]
    pub fn new() -> Position {
        let mut pos = Position {
            sides: [
                Bitboard::new(0x0000_0000_0000_FFFF), // white
                Bitboard::new(0xFFFF_0000_0000_0000), // black
            ],
            pieces: [
                Bitboard::new(0x4200_0000_0000_0042), // knight
                Bitboard::new(0x2400_0000_0000_0024), // bishop
                Bitboard::new(0x8100_0000_0000_0081), // rook
                Bitboard::new(0x0800_0000_0000_0008), // queen
                Bitboard::new(0x00FF_0000_0000_FF00), // pawn
                Bitboard::new(0x1000_0000_0000_0010), // king
            ],
            mailbox: Mailbox::EMPTY,
            en_passant_square: None,
            player: Color::White,
            castle_rights: CastleRights::ALL_RIGHTS,
            hash: 0,
            king_sqs: [Square::E1, Square::E8],
            checkers: Bitboard::EMPTY,
            pinned: Bitboard::EMPTY,
            halfmove_clock: 0,
            fullmove_number: 1,
            history: Vec::new(),
        };
        pos.rebuild_mailbox();
        pos.recompute_hash();
        pos
    }

    /// Construct an otherwise-empty `Position`, ready to be populated square
    /// by square by a FEN parser.
    pub(crate) fn blank() -> Position {
        Position {
            sides: [Bitboard::EMPTY; 2],
            pieces: [Bitboard::EMPTY; Piece::NUM_TYPES],
            mailbox: Mailbox::EMPTY,
            en_passant_square: None,
            player: Color::White,
            castle_rights: CastleRights::NO_RIGHTS,
            hash: 0,
            checkers: Bitboard::EMPTY,
            king_sqs: [Square::A1; 2],
            pinned: Bitboard::EMPTY,
            halfmove_clock: 0,
            fullmove_number: 1,
            history: Vec::new(),
        }
    }

    /// Create a `Position` from a FEN record.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `s` is not a well-formed FEN, or if the position it
    /// describes is illegal (missing a king, side not to move in check by
    /// more attackers than is possible, and so on).
    pub fn from_fen(s: &str) -> Result<Position, crate::error::FenError> {
        fen::parse(s)
    }

    #[must_use]
    /// Render this position back out as a FEN record.
    /// `from_fen(&pos.to_fen())` always succeeds and reconstructs a position
    /// identical in every field, including halfmove clock and fullmove
    /// number.
    pub fn to_fen(&self) -> String {
        fen::emit(self)
    }

    #[must_use]
    #[inline(always)]
    /// Get the squares occupied by either player.
    pub fn occupancy(&self) -> Bitboard {
        self[Color::White] | self[Color::Black]
    }

    #[must_use]
    #[inline(always)]
    /// Get the type of piece occupying `sq`, if any.
    pub fn type_at_square(&self, sq: Square) -> Option<Piece> {
        self.mailbox.get(sq).map(|o| o.piece)
    }

    #[must_use]
    #[inline(always)]
    /// Get the color of the piece occupying `sq`, if any.
    pub fn color_at_square(&self, sq: Square) -> Option<Color> {
        self.mailbox.get(sq).map(|o| o.color)
    }

    #[must_use]
    #[inline(always)]
    /// Is `m` a capture in the current position? En passant counts.
    pub fn is_move_capture(&self, m: Move) -> bool {
        self.occupancy().contains(m.to_square()) || m.is_en_passant()
    }

    #[must_use]
    /// How many plies have been applied (and could be undone) on this
    /// position.
    pub fn ply_count(&self) -> usize {
        self.history.len()
    }

    #[must_use]
    /// Determine whether the current state of this position is internally
    /// consistent. Used in tests and debug assertions, never on a hot path.
    pub fn is_valid(&self) -> bool {
        let mut sides_checksum = Bitboard::EMPTY;
        let mut sides_checkor = Bitboard::EMPTY;
        let mut pieces_checksum = Bitboard::EMPTY;
        let mut pieces_checkor = Bitboard::EMPTY;
        for bb in self.sides {
            sides_checksum += bb;
            sides_checkor |= bb;
        }
        for bb in self.pieces {
            pieces_checksum += bb;
            pieces_checkor |= bb;
        }
        if sides_checksum != sides_checkor || pieces_checksum != pieces_checkor {
            return false;
        }
        if sides_checksum != pieces_checksum {
            return false;
        }
        if self.hash != self.fresh_hash() {
            return false;
        }

        let w_king_bb = self[Piece::King] & self[Color::White];
        let b_king_bb = self[Piece::King] & self[Color::Black];
        if w_king_bb != Bitboard::from(self.king_sqs[Color::White as usize])
            || b_king_bb != Bitboard::from(self.king_sqs[Color::Black as usize])
        {
            return false;
        }

        self.checkers == square_attackers(self, self.king_sqs[self.player as usize], !self.player)
    }

    /// Apply `m` to this position, assuming it is legal. Pushes an
    /// `UndoRecord` onto the history stack so that a matching `undo()` call
    /// restores the position byte-for-byte.
    pub fn apply(&mut self, m: Move) {
        let from_sq = m.from_square();
        let to_sq = m.to_square();
        let player = self.player;
        let opponent = !player;
        let is_long_move = from_sq.chebyshev_to(to_sq) > 1;
        let mover_type = self.type_at_square(from_sq).unwrap();
        let is_pawn_move = mover_type == Piece::Pawn;
        let is_king_move = mover_type == Piece::King;

        let record = UndoRecord {
            mv: m,
            captured: None, // filled in below once we know the capture square
            mover_type,
            prev_en_passant_square: self.en_passant_square,
            prev_castle_rights: self.castle_rights,
            prev_hash: self.hash,
            prev_checkers: self.checkers,
            prev_pinned: self.pinned,
            prev_king_sqs: self.king_sqs,
            prev_halfmove_clock: self.halfmove_clock,
            prev_fullmove_number: self.fullmove_number,
        };
        let record_idx = self.history.len();
        self.history.push(record);

        let mut captured = None;
        if m.is_en_passant() {
            let capturee_sq =
                Square::new(from_sq.rank(), self.en_passant_square.unwrap().file()).unwrap();
            captured = Some((Piece::Pawn, opponent, capturee_sq));
            self.remove_piece(capturee_sq, Piece::Pawn, opponent);
        } else if let Some(c) = self.type_at_square(to_sq) {
            captured = Some((c, opponent, to_sq));
            self.remove_piece(to_sq, c, opponent);
        }
        self.history[record_idx].captured = captured;

        self.halfmove_clock = if is_pawn_move || captured.is_some() {
            0
        } else {
            self.halfmove_clock + 1
        };
        if player == Color::Black {
            self.fullmove_number += 1;
        }

        if let Some(p) = m.promote_type() {
            self.add_piece(to_sq, p, player);
        } else {
            self.add_piece(to_sq, mover_type, player);
        }
        self.remove_piece(from_sq, mover_type, player);

        self.hash ^= zobrist::ep_key(self.en_passant_square);
        self.en_passant_square = match is_pawn_move && is_long_move {
            true => Square::new((from_sq.rank() + to_sq.rank()) / 2, from_sq.file()),
            false => None,
        };
        self.hash ^= zobrist::ep_key(self.en_passant_square);

        let rights_to_remove = if is_king_move {
            if is_long_move {
                let is_kingside_castle = to_sq.file() == 6;
                let (rook_from_file, rook_to_file) =
                    if is_kingside_castle { (7, 5) } else { (0, 3) };
                let rook_from_sq = Square::new(from_sq.rank(), rook_from_file).unwrap();
                let rook_to_sq = Square::new(from_sq.rank(), rook_to_file).unwrap();
                self.remove_piece(rook_from_sq, Piece::Rook, player);
                self.add_piece(rook_to_sq, Piece::Rook, player);
            }
            CastleRights::color_rights(player)
        } else {
            let mut rights = castle_rights_lost_from(from_sq);
            rights |= castle_rights_lost_from(to_sq);
            rights
        };
        self.remove_castle_rights(rights_to_remove);

        self.player = !self.player;
        self.hash ^= zobrist::BLACK_TO_MOVE_KEY;

        if is_king_move {
            self.king_sqs[player as usize] = to_sq;
        }

        self.checkers = square_attackers(self, self.king_sqs[self.player as usize], !self.player);
        self.recompute_pinned();
    }

    /// Undo the most recent `apply()` call, restoring this position to
    /// exactly the state it was in beforehand.
    ///
    /// # Panics
    ///
    /// Panics if no move has been applied (the history stack is empty).
    pub fn undo(&mut self) {
        let record = self.history.pop().expect("no move to undo");
        let m = record.mv;
        let from_sq = m.from_square();
        let to_sq = m.to_square();

        self.player = !self.player;
        let player = self.player;

        // remove whatever ended up on to_sq (the promoted piece, or the
        // mover itself) and put the mover back on from_sq
        let landed_type = self.type_at_square(to_sq).unwrap();
        self.remove_piece(to_sq, landed_type, player);
        self.add_piece(from_sq, record.mover_type, player);

        if m.is_castle() {
            let is_kingside_castle = to_sq.file() == 6;
            let (rook_from_file, rook_to_file) = if is_kingside_castle { (7, 5) } else { (0, 3) };
            let rook_from_sq = Square::new(from_sq.rank(), rook_from_file).unwrap();
            let rook_to_sq = Square::new(from_sq.rank(), rook_to_file).unwrap();
            self.remove_piece(rook_to_sq, Piece::Rook, player);
            self.add_piece(rook_from_sq, Piece::Rook, player);
        }

        if let Some((piece, color, sq)) = record.captured {
            self.add_piece(sq, piece, color);
        }

        self.en_passant_square = record.prev_en_passant_square;
        self.castle_rights = record.prev_castle_rights;
        self.hash = record.prev_hash;
        self.checkers = record.prev_checkers;
        self.pinned = record.prev_pinned;
        self.king_sqs = record.prev_king_sqs;
        self.halfmove_clock = record.prev_halfmove_clock;
        self.fullmove_number = record.prev_fullmove_number;
    }

    #[inline(always)]
    /// Add a piece to `sq`. Assumes `sq` is currently empty.
    fn add_piece(&mut self, sq: Square, pt: Piece, color: Color) {
        let mask = Bitboard::from(sq);
        self.pieces[pt as usize] |= mask;
        self.sides[color as usize] |= mask;
        self.mailbox.set(sq, pt, color);
        self.hash ^= zobrist::square_key(sq, Some(pt), color);
    }

    #[inline(always)]
    /// Remove the known piece `pt`/`color` from `sq`.
    fn remove_piece(&mut self, sq: Square, pt: Piece, color: Color) {
        let removal_mask = !Bitboard::from(sq);
        self.hash ^= zobrist::square_key(sq, Some(pt), color);
        self.pieces[pt as usize] &= removal_mask;
        self.sides[color as usize] &= removal_mask;
        self.mailbox.clear(sq);
    }

    /// Remove the given rights from this position's castling rights, keeping
    /// the hash in sync.
    fn remove_castle_rights(&mut self, rights_to_remove: CastleRights) {
        let rights_actually_removed = rights_to_remove & self.castle_rights;
        for i in 0..4 {
            if 1 << i & rights_actually_removed.0 != 0 {
                self.hash ^= zobrist::get_castle_key(i);
            }
        }
        self.castle_rights &= !rights_actually_removed;
    }

    #[inline(always)]
    /// Recompute and store the Zobrist hash of this position from scratch.
    pub(crate) fn recompute_hash(&mut self) {
        self.hash = self.fresh_hash();
    }

    /// Rebuild the mailbox cache from the bitboards. Only needed right after
    /// direct bitboard construction (e.g. in `Position::new()` or the FEN
    /// parser), since `add_piece`/`remove_piece` keep it current otherwise.
    pub(crate) fn rebuild_mailbox(&mut self) {
        self.mailbox = Mailbox::EMPTY;
        for i in 0..64u8 {
            let sq = Square::try_from(i).unwrap();
            if let Some(color) = self.color_at_square_by_bitboard(sq) {
                let pt = Piece::ALL_TYPES
                    .into_iter()
                    .find(|&pt| self.pieces[pt as usize].contains(sq))
                    .unwrap();
                self.mailbox.set(sq, pt, color);
            }
        }
    }

    fn color_at_square_by_bitboard(&self, sq: Square) -> Option<Color> {
        if self.sides[Color::White as usize].contains(sq) {
            Some(Color::White)
        } else if self.sides[Color::Black as usize].contains(sq) {
            Some(Color::Black)
        } else {
            None
        }
    }

    /// Recompute the `pinned` bitboard from scratch.
    pub(crate) fn recompute_pinned(&mut self) {
        self.pinned = Bitboard::EMPTY;
        let king_sq = self.king_sqs[self.player as usize];
        let rook_mask = Bitboard::from(king_sq).rook_attacks(Bitboard::EMPTY);
        let bishop_mask = Bitboard::from(king_sq).bishop_attacks(Bitboard::EMPTY);
        let occupancy = self.occupancy();

        let snipers = self[!self.player]
            & ((rook_mask & (self[Piece::Queen] | self[Piece::Rook]))
                | (bishop_mask & (self[Piece::Queen] | self[Piece::Bishop])));

        for sniper_sq in snipers {
            let between_bb = crate::movegen::between(king_sq, sniper_sq);
            if (between_bb & occupancy).has_single_bit() {
                self.pinned |= between_bb;
            }
        }
    }

    #[must_use]
    /// Is this position a draw by insufficient material under FIDE rules?
    pub fn insufficient_material(&self) -> bool {
        const DARK_SQUARES: Bitboard = Bitboard::new(0xAA55_AA55_AA55_AA55);
        match self.occupancy().len() {
            0 | 1 => unreachable!("a king is always on the board"),
            2 => true,
            3 => !(self[Piece::Knight] | self[Piece::Bishop]).is_empty(),
            4 => {
                self[Piece::Bishop].more_than_one()
                    && !(self[Piece::Bishop] & DARK_SQUARES).has_single_bit()
            }
            _ => false,
        }
    }

    /// Recompute the Zobrist hash from the raw position state. Used to
    /// validate `self.hash` in `is_valid()` and by the FEN parser.
    pub(crate) fn fresh_hash(&self) -> u64 {
        let mut hash = 0;
        for i in 0..64 {
            let sq = Square::try_from(i).unwrap();
            hash ^= match self.color_at_square(sq) {
                Some(c) => zobrist::square_key(sq, self.type_at_square(sq), c),
                None => 0,
            };
        }
        for i in 0..4 {
            if 1 << i & self.castle_rights.0 != 0 {
                hash ^= zobrist::get_castle_key(i);
            }
        }
        hash ^= zobrist::ep_key(self.en_passant_square);
        hash ^= zobrist::player_key(self.player);
        hash
    }

    /// Populate a square with a piece while parsing a FEN. Does not maintain
    /// the hash or mailbox; callers must call `rebuild_mailbox()` and
    /// `recompute_hash()` once the whole board has been loaded.
    pub(crate) fn place_raw(&mut self, sq: Square, pt: Piece, color: Color) {
        let mask = Bitboard::from(sq);
        self.pieces[pt as usize] |= mask;
        self.sides[color as usize] |= mask;
    }
}

/// The castling rights that are forfeited forever if a piece moves from (or
/// is captured on) `sq`. Moving a non-rook off a corner is a no-op here since
/// that corner's right was never held in the first place, so this is safe to
/// call unconditionally for both the origin and destination square of every
/// move.
fn castle_rights_lost_from(sq: Square) -> CastleRights {
    match sq {
        Square::A1 => CastleRights::queen_castle(Color::White),
        Square::H1 => CastleRights::king_castle(Color::White),
        Square::A8 => CastleRights::queen_castle(Color::Black),
        Square::H8 => CastleRights::king_castle(Color::Black),
        _ => CastleRights::NO_RIGHTS,
    }
}

impl Display for Position {
    /// Display this position as 8 ranks, 8th rank first, White pieces
    /// uppercase.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for r in 0..8 {
            for c in 0..8 {
                let i = 64 - (r + 1) * 8 + c;
                let sq = Square::try_from(i).unwrap();
                match self.type_at_square(sq) {
                    Some(p) => match self.color_at_square(sq).unwrap() {
                        Color::White => write!(f, "{p}")?,
                        Color::Black => write!(f, "{}", p.code().to_lowercase())?,
                    },
                    None => write!(f, ".")?,
                }
                write!(f, " ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Hash for Position {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

impl PartialEq for Position {
    /// Two positions are equal if they have the same piece placement, side
    /// to move, en passant square, and castling rights. History is not part
    /// of a position's identity.
    fn eq(&self, other: &Position) -> bool {
        self.sides == other.sides
            && self.pieces == other.pieces
            && self.en_passant_square == other.en_passant_square
            && self.player == other.player
            && self.castle_rights == other.castle_rights
    }
}

impl Eq for Position {}

impl Index<Piece> for Position {
    type Output = Bitboard;
    #[inline(always)]
    fn index(&self, index: Piece) -> &Self::Output {
        // SAFETY: `pieces` has exactly `Piece::NUM_TYPES` entries.
        unsafe { self.pieces.get_unchecked(index as usize) }
    }
}

impl Index<Color> for Position {
    type Output = Bitboard;
    #[inline(always)]
    fn index(&self, index: Color) -> &Self::Output {
        // SAFETY: `sides` has exactly 2 entries.
        unsafe { self.sides.get_unchecked(index as usize) }
    }
}

impl Default for Position {
    fn default() -> Position {
        Position::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Square;

    #[test]
    fn start_fen_round_trips() {
        let pos = Position::new();
        let fen = pos.to_fen();
        let reparsed = Position::from_fen(&fen).unwrap();
        assert_eq!(pos, reparsed);
    }

    #[test]
    fn apply_then_undo_restores_position() {
        let mut pos = Position::new();
        let before = pos.clone();
        pos.apply(Move::normal(Square::E2, Square::E4));
        assert_ne!(pos, before);
        pos.undo();
        assert_eq!(pos, before);
        assert_eq!(pos.hash, before.hash);
        assert_eq!(pos.checkers, before.checkers);
        assert_eq!(pos.pinned, before.pinned);
        assert_eq!(pos.king_sqs, before.king_sqs);
    }

    #[test]
    fn apply_then_undo_restores_en_passant_capture() {
        let mut pos =
            Position::from_fen("rnbqkb1r/ppppp1pp/7n/4Pp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3")
                .unwrap();
        let before = pos.clone();
        pos.apply(Move::en_passant(Square::E5, Square::F6));
        assert!(pos.type_at_square(Square::F5).is_none());
        pos.undo();
        assert_eq!(pos, before);
        assert_eq!(pos.type_at_square(Square::F5), Some(Piece::Pawn));
    }

    #[test]
    fn apply_then_undo_restores_castling_rook() {
        let mut pos =
            Position::from_fen("r1bqk1nr/pppp1ppp/2n5/2b1p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4")
                .unwrap();
        let before = pos.clone();
        pos.apply(Move::castling(Square::E1, Square::G1));
        assert_eq!(pos.type_at_square(Square::F1), Some(Piece::Rook));
        pos.undo();
        assert_eq!(pos, before);
        assert_eq!(pos.type_at_square(Square::H1), Some(Piece::Rook));
    }

    #[test]
    fn capturing_a_rook_removes_castle_rights_and_undo_restores_them() {
        let mut pos =
            Position::from_fen("rnbqk2r/ppppnp1p/4p1pb/8/4P3/1P1P4/PBP2PPP/RN1QKBNR w KQkq - 1 5")
                .unwrap();
        let before = pos.clone();
        pos.apply(Move::normal(Square::B2, Square::H8));
        assert!(!pos.castle_rights.is_kingside_castle_legal(Color::Black));
        pos.undo();
        assert_eq!(pos, before);
        assert!(before.castle_rights.is_kingside_castle_legal(Color::Black));
    }

    #[test]
    fn nested_apply_undo_restores_each_ply() {
        let mut pos = Position::new();
        let gen0 = pos.clone();
        pos.apply(Move::normal(Square::E2, Square::E4));
        let gen1 = pos.clone();
        pos.apply(Move::normal(Square::E7, Square::E5));
        pos.undo();
        assert_eq!(pos, gen1);
        pos.undo();
        assert_eq!(pos, gen0);
    }

    #[test]
    fn halfmove_clock_resets_on_pawn_move_and_capture() {
        let mut pos = Position::new();
        assert_eq!(pos.halfmove_clock, 0);
        pos.apply(Move::normal(Square::G1, Square::F3));
        assert_eq!(pos.halfmove_clock, 1);
        pos.apply(Move::normal(Square::B8, Square::C6));
        assert_eq!(pos.halfmove_clock, 2);
        pos.apply(Move::normal(Square::E2, Square::E4));
        assert_eq!(pos.halfmove_clock, 0);
    }

    #[test]
    fn halfmove_clock_and_fullmove_number_round_trip_through_undo() {
        let mut pos =
            Position::from_fen("rnbqkbnr/pppppppp/8/8/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2")
                .unwrap();
        let before_clock = pos.halfmove_clock;
        let before_fullmove = pos.fullmove_number;
        pos.apply(Move::normal(Square::B8, Square::C6));
        assert_eq!(pos.halfmove_clock, before_clock + 1);
        assert_eq!(pos.fullmove_number, before_fullmove + 1);
        pos.undo();
        assert_eq!(pos.halfmove_clock, before_clock);
        assert_eq!(pos.fullmove_number, before_fullmove);
    }

    #[test]
    fn fullmove_number_increments_only_after_black_moves() {
        let mut pos = Position::new();
        assert_eq!(pos.fullmove_number, 1);
        pos.apply(Move::normal(Square::E2, Square::E4));
        assert_eq!(pos.fullmove_number, 1);
        pos.apply(Move::normal(Square::E7, Square::E5));
        assert_eq!(pos.fullmove_number, 2);
    }
}
