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

//! Generation and verification of legal moves in a position.

use once_cell::sync::Lazy;

use super::{moves::Move, Bitboard, Color, Direction, Piece, Position, Square};

use std::convert::TryFrom;

/// A lookup table for the squares on a line through any two aligned squares,
/// either down a row like a rook or diagonal like a bishop. `LINES[A1][B2]`
/// is the full diagonal A1-H8. Squares which are not aligned map to `EMPTY`.
static LINES: Lazy<[[Bitboard; 64]; 64]> = Lazy::new(|| {
    let mut lines = [[Bitboard::EMPTY; 64]; 64];

    for sq1 in Bitboard::ALL {
        let bishop_1 = Bitboard::from(sq1).bishop_attacks(Bitboard::EMPTY);
        let rook_1 = Bitboard::from(sq1).rook_attacks(Bitboard::EMPTY);
        for sq2 in Bitboard::ALL {
            if bishop_1.contains(sq2) {
                let bishop_2 = Bitboard::from(sq2).bishop_attacks(Bitboard::EMPTY);
                lines[sq1 as usize][sq2 as usize] |= Bitboard::from(sq1) | Bitboard::from(sq2);
                lines[sq1 as usize][sq2 as usize] |= bishop_1 & bishop_2;
            }
            if rook_1.contains(sq2) {
                let rook_2 = Bitboard::from(sq2).rook_attacks(Bitboard::EMPTY);
                lines[sq1 as usize][sq2 as usize] |= Bitboard::from(sq1) | Bitboard::from(sq2);
                lines[sq1 as usize][sq2 as usize] |= rook_1 & rook_2;
            }
        }
    }

    lines
});

/// A lookup table for the squares "between" two other squares, either down a
/// row like a rook or on a diagonal like a bishop. `BETWEEN[A1][A3]` has A2
/// as its only active square.
static BETWEEN: Lazy<[[Bitboard; 64]; 64]> = Lazy::new(|| {
    let mut between = [[Bitboard::EMPTY; 64]; 64];

    for sq1 in Bitboard::ALL {
        let bb1 = Bitboard::from(sq1);
        for sq2 in Bitboard::ALL {
            let bb2 = Bitboard::from(sq2);
            if bb1.bishop_attacks(Bitboard::EMPTY).contains(sq2) {
                let bishop1 = bb1.bishop_attacks(bb2);
                let bishop2 = bb2.bishop_attacks(bb1);
                between[sq1 as usize][sq2 as usize] |= bishop1 & bishop2;
            }
            if bb1.rook_attacks(Bitboard::EMPTY).contains(sq2) {
                let rook1 = bb1.rook_attacks(bb2);
                let rook2 = bb2.rook_attacks(bb1);
                between[sq1 as usize][sq2 as usize] |= rook1 & rook2;
            }
        }
    }

    between
});

/// A bitboard of all the squares a knight can move to, indexed by its
/// current square.
static KNIGHT_MOVES: Lazy<[Bitboard; 64]> =
    Lazy::new(|| create_step_attacks(&Direction::KNIGHT_STEPS, 2));

/// A bitboard of all the squares a king can step to, indexed by his current
/// square.
static KING_MOVES: Lazy<[Bitboard; 64]> =
    Lazy::new(|| create_step_attacks(&Direction::KING_STEPS, 1));

/// A bitboard of the squares a pawn on the given square attacks. The first
/// index is for White's pawn attacks, the second is for Black's.
static PAWN_ATTACKS: Lazy<[[Bitboard; 64]; 2]> = Lazy::new(|| {
    [
        create_step_attacks(&[Direction::NORTHEAST, Direction::NORTHWEST], 1),
        create_step_attacks(&[Direction::SOUTHEAST, Direction::SOUTHWEST], 1),
    ]
});

/// The types of move generation. Used in const generics, since enums cannot
/// appear there.
pub type GenMode = u8;

/// Generate all legal moves.
pub const ALL: GenMode = 0;
/// Generate only captures (including en passant).
pub const CAPTURES: GenMode = 1;
/// Generate only non-capturing moves.
pub const QUIETS: GenMode = 2;

#[must_use]
/// Determine whether `m` is legal to play in `pos`. Requires that `m` is
/// legal on *some* position, but not necessarily this one.
///
/// # Examples
///
/// ```
/// use chess_position::{Position, Move, movegen::is_legal, Square};
///
/// let pos = Position::new();
/// assert!(is_legal(Move::normal(Square::E2, Square::E4), &pos));
/// assert!(!is_legal(Move::normal(Square::E2, Square::D4), &pos));
/// ```
pub fn is_legal(m: Move, pos: &Position) -> bool {
    let from_sq = m.from_square();
    let to_sq = m.to_square();
    let player = pos.player;
    let allies = pos[player];
    let enemies = pos[!player];
    let occupancy = allies | enemies;
    if allies.contains(to_sq) || !allies.contains(from_sq) {
        return false;
    }
    match pos.type_at_square(from_sq) {
        Some(Piece::King) => {
            if m.promote_type().is_some() || m.is_en_passant() {
                return false;
            }

            let mut is_pseudolegal = KING_MOVES[from_sq as usize].contains(to_sq);
            if m.is_castle() && pos.checkers.is_empty() {
                let mut move_buf = Vec::with_capacity(2);
                castles(pos, &mut move_buf);
                is_pseudolegal |= move_buf.contains(&m);
            }

            is_pseudolegal && validate(m, pos)
        }
        Some(pt) => {
            if pos.checkers.more_than_one() {
                return false;
            }
            if pt != Piece::Pawn && m.is_promotion() {
                return false;
            }
            if m.is_castle() {
                return false;
            }

            let is_ep = m.is_en_passant();
            if is_ep && (pt != Piece::Pawn || pos.en_passant_square != Some(to_sq)) {
                return false;
            }

            let pseudolegal = match pt {
                Piece::Pawn => {
                    let pawn_dir = player.pawn_direction();
                    let singlemove_sq = from_sq + pawn_dir;
                    let pattacks = PAWN_ATTACKS[player as usize][from_sq as usize];
                    (!occupancy.contains(singlemove_sq)
                        && (to_sq == singlemove_sq
                            || (to_sq == singlemove_sq + pawn_dir
                                && player.pawn_start_rank().contains(from_sq)
                                && !occupancy.contains(to_sq))))
                        || (is_ep && pos.en_passant_square == Some(to_sq))
                        || (!is_ep && (pattacks & enemies).contains(to_sq))
                }
                Piece::Knight => KNIGHT_MOVES[from_sq as usize].contains(to_sq),
                Piece::Bishop => Bitboard::from(from_sq).bishop_attacks(occupancy).contains(to_sq),
                Piece::Rook => Bitboard::from(from_sq).rook_attacks(occupancy).contains(to_sq),
                Piece::Queen => Bitboard::from(from_sq).queen_attacks(occupancy).contains(to_sq),
                Piece::King => unreachable!(),
            };
            if !pseudolegal {
                return false;
            }

            if !pos.checkers.is_empty() {
                let checker_sq = Square::try_from(pos.checkers).unwrap();
                let player_idx = player as usize;
                let king_idx = pos.king_sqs[player_idx] as usize;
                let mut targets = BETWEEN[king_idx][checker_sq as usize] | Bitboard::from(checker_sq);

                if let Some(ep_sq) = pos.en_passant_square {
                    if pt == Piece::Pawn && checker_sq == ep_sq - player.pawn_direction() {
                        targets.insert(ep_sq);
                    }
                }

                if !targets.contains(to_sq) {
                    return false;
                }
            }

            validate(m, pos)
        }
        None => false,
    }
}

#[inline(always)]
#[must_use]
/// Get the legal moves in a position. `M` selects which subset of legal
/// moves to generate: `ALL`, `CAPTURES`, or `QUIETS`.
///
/// # Examples
///
/// ```
/// use chess_position::{Position, movegen::{ALL, is_legal, get_moves}};
///
/// let pos = Position::new();
/// for m in get_moves::<ALL>(&pos) {
///     assert!(is_legal(m, &pos));
/// }
/// ```
pub fn get_moves<const M: GenMode>(pos: &Position) -> Vec<Move> {
    debug_assert!(M == ALL || M == CAPTURES || M == QUIETS);

    let mut moves;
    let in_check = !pos.checkers.is_empty();

    if in_check {
        // usually 8 or fewer legal evasions when in check
        moves = Vec::with_capacity(8);
        evasions::<M>(pos, &mut moves);
    } else {
        let capacity = match M {
            ALL => 50,
            CAPTURES => 8,
            QUIETS => 40,
            _ => unreachable!(),
        };
        moves = Vec::with_capacity(capacity);
        non_evasions::<M>(pos, &mut moves);
    };

    moves
}

#[must_use]
/// Does the player to move have any legal moves in this position?
///
/// # Examples
///
/// ```
/// use chess_position::{Position, movegen::has_moves};
///
/// let pos = Position::new();
/// assert!(has_moves(&pos));
/// ```
pub fn has_moves(pos: &Position) -> bool {
    let player = pos.player;
    let player_occupancy = pos[player];
    let opponent = !player;
    let occupancy = player_occupancy | pos[opponent];
    let mut legal_targets = !player_occupancy;
    let king_square = pos.king_sqs[player as usize];
    let king_attackers = pos.checkers;
    let king_to_sqs = KING_MOVES[king_square as usize] & !player_occupancy;

    if king_attackers.is_empty() {
        for to_sq in king_to_sqs {
            if validate(Move::normal(king_square, to_sq), pos) {
                return true;
            }
        }
    } else {
        for to_sq in king_to_sqs {
            if validate(Move::normal(king_square, to_sq), pos) {
                return true;
            }
        }
        if king_attackers.more_than_one() {
            return false;
        }

        // SAFETY: we just checked the bitboard is nonempty.
        let checker_sq = unsafe { Square::unsafe_from(pos.checkers) };
        legal_targets &= between(king_square, checker_sq) | pos.checkers;
    }

    for pt in Piece::NON_KING_TYPES {
        for from_sq in pos[pt] & player_occupancy {
            let to_bb = match pt {
                Piece::Pawn => {
                    let result = pawn_moves(pos, from_sq, player);
                    legal_targets
                        & if let Some(ep_sq) = pos.en_passant_square {
                            result | Bitboard::from(ep_sq)
                        } else {
                            result
                        }
                }
                Piece::Bishop => Bitboard::from(from_sq).bishop_attacks(occupancy) & legal_targets,
                Piece::Rook => Bitboard::from(from_sq).rook_attacks(occupancy) & legal_targets,
                Piece::Queen => Bitboard::from(from_sq).queen_attacks(occupancy) & legal_targets,
                Piece::Knight => KNIGHT_MOVES[from_sq as usize] & legal_targets,
                Piece::King => Bitboard::EMPTY,
            };

            for to_sq in to_bb {
                if validate(Move::normal(from_sq, to_sq), pos) {
                    return true;
                }
            }
        }
    }

    false
}

/// Determine whether a pseudolegal move `m` is actually valid in `pos`.
fn validate(m: Move, pos: &Position) -> bool {
    let from_sq = m.from_square();
    let from_bb = Bitboard::from(from_sq);
    let to_sq = m.to_square();
    let to_bb = Bitboard::from(to_sq);

    if m.is_en_passant() {
        let king_sq = pos.king_sqs[pos.player as usize];
        let enemy = pos[!pos.player];
        let capture_bb = match pos.player {
            Color::White => to_bb >> 8,
            Color::Black => to_bb << 8u8,
        };
        let new_occupancy = pos.occupancy() ^ from_bb ^ capture_bb ^ to_bb;

        return (Bitboard::from(king_sq).rook_attacks(new_occupancy)
            & (pos[Piece::Rook] | pos[Piece::Queen])
            & enemy)
            .is_empty()
            && (Bitboard::from(king_sq).bishop_attacks(new_occupancy)
                & (pos[Piece::Bishop] | pos[Piece::Queen])
                & enemy)
                .is_empty();
    }

    if m.is_castle() {
        let is_queen_castle = to_sq.file() == 2;
        let (king_passthru_min, king_passthru_max) = if is_queen_castle { (2, 5) } else { (4, 7) };
        for file in king_passthru_min..king_passthru_max {
            let target_sq = Square::new(from_sq.rank(), file).unwrap();
            if is_square_attacked_by(pos, target_sq, !pos.player) {
                return false;
            }
        }
    }

    let king_sq = pos.king_sqs[pos.player as usize];

    if from_sq == king_sq {
        let new_occupancy = (pos.occupancy() ^ from_bb) | to_bb;
        return square_attackers_occupancy(pos, to_sq, !pos.player, new_occupancy).is_empty();
    }

    (pos.pinned & from_bb).is_empty() || aligned(from_sq, to_sq, king_sq)
}

#[inline(always)]
#[must_use]
/// In `pos`, is `sq` attacked by a piece of `color`? Squares threatened only
/// by a non-capturing move (e.g. a pawn push) do not count.
///
/// # Examples
///
/// ```
/// use chess_position::{Position, Square, Color, movegen::is_square_attacked_by};
///
/// let pos = Position::new();
/// assert!(is_square_attacked_by(&pos, Square::E2, Color::White));
/// ```
pub fn is_square_attacked_by(pos: &Position, sq: Square, color: Color) -> bool {
    !square_attackers(pos, sq, color).is_empty()
}

#[inline(always)]
/// Enumerate the legal moves available when the player to move is not in
/// check.
fn non_evasions<const M: GenMode>(pos: &Position, moves: &mut Vec<Move>) {
    let target_sqs = match M {
        ALL => Bitboard::ALL,
        CAPTURES => pos[!pos.player],
        QUIETS => !pos[!pos.player],
        _ => unreachable!(),
    };

    let mut pawn_targets = target_sqs;
    if M != QUIETS {
        if let Some(ep_sq) = pos.en_passant_square {
            pawn_targets.insert(ep_sq);
        }
    }
    pawn_assistant::<M>(pos, moves, pawn_targets);
    normal_piece_assistant(pos, moves, target_sqs);

    if M != CAPTURES {
        castles(pos, moves);
    }
    king_move_non_castle(pos, moves, target_sqs);
}

/// Compute the legal evasions when the king is in check.
fn evasions<const M: GenMode>(pos: &Position, moves: &mut Vec<Move>) {
    let player = pos.player;
    let king_sq = pos.king_sqs[player as usize];

    if pos.checkers.has_single_bit() {
        // SAFETY: we just checked the bitboard has exactly one bit set.
        let checker_sq = unsafe { Square::unsafe_from(pos.checkers) };
        let mut target_sqs = between(king_sq, checker_sq) | pos.checkers;
        match M {
            ALL => (),
            CAPTURES => target_sqs &= pos[!player],
            QUIETS => target_sqs &= !pos[!player],
            _ => unreachable!(),
        }

        let mut pawn_targets = target_sqs;
        if M != QUIETS {
            if let Some(ep_sq) = pos.en_passant_square {
                let ep_attacker_sq = ep_sq - player.pawn_direction();
                if pos.checkers.contains(ep_attacker_sq) {
                    pawn_targets.insert(ep_sq);
                }
            }
        }

        pawn_assistant::<M>(pos, moves, pawn_targets);
        normal_piece_assistant(pos, moves, target_sqs);
    }

    let king_targets = match M {
        ALL => Bitboard::ALL,
        CAPTURES => pos[!player],
        QUIETS => !pos[!player],
        _ => unreachable!(),
    };
    king_move_non_castle(pos, moves, king_targets);
}

#[inline(always)]
#[must_use]
/// Get the attackers of `color` on `sq`, as a `Bitboard` of their squares.
///
/// # Examples
///
/// ```
/// use chess_position::{Bitboard, Position, Square, Color, movegen::square_attackers};
///
/// let pos = Position::new();
/// let mut attackers = Bitboard::EMPTY;
/// attackers.insert(Square::E1);
/// attackers.insert(Square::D1);
/// attackers.insert(Square::F1);
/// attackers.insert(Square::G1);
/// assert_eq!(square_attackers(&pos, Square::E2, Color::White), attackers);
/// ```
pub fn square_attackers(pos: &Position, sq: Square, color: Color) -> Bitboard {
    square_attackers_occupancy(pos, sq, color, pos.occupancy())
}

/// Like `square_attackers`, but uses `occupancy` instead of `pos`'s actual
/// occupancy. Used to answer "would this square be attacked if the board
/// looked like this" without mutating the position.
fn square_attackers_occupancy(
    pos: &Position,
    sq: Square,
    color: Color,
    occupancy: Bitboard,
) -> Bitboard {
    let mut attackers = Bitboard::EMPTY;
    let color_bb = pos[color];

    let pawn_vision = pawn_captures(pos, sq, !color);
    attackers |= pawn_vision & pos[Piece::Pawn];

    let knight_vision = KNIGHT_MOVES[sq as usize];
    attackers |= knight_vision & pos[Piece::Knight];

    let queens_bb = pos[Piece::Queen];
    let from_sq_bb = Bitboard::from(sq);

    let rook_vision = from_sq_bb.rook_attacks(occupancy);
    attackers |= rook_vision & (queens_bb | pos[Piece::Rook]);

    let bishop_vision = from_sq_bb.bishop_attacks(occupancy);
    attackers |= bishop_vision & (queens_bb | pos[Piece::Bishop]);

    let king_vision = KING_MOVES[sq as usize];
    attackers |= king_vision & pos[Piece::King];

    attackers & color_bb
}

/// Generate every pawn move landing in `target` and push them onto `moves`.
fn pawn_assistant<const M: GenMode>(pos: &Position, moves: &mut Vec<Move>, target: Bitboard) {
    const COL_A: Bitboard = Bitboard::new(0x0101_0101_0101_0101);

    let player = pos.player;
    let allies = pos[player];
    let opponents = pos[!player];
    let occupancy = allies | opponents;
    let unoccupied = !occupancy;
    let pawns = pos[Piece::Pawn] & allies;
    let rank8 = player.pawn_promote_rank();
    let not_rank8 = !rank8;
    let rank3 = match player {
        Color::White => Bitboard::new(0x0000_0000_00FF_0000),
        Color::Black => Bitboard::new(0x0000_FF00_0000_0000),
    };
    let direction = player.pawn_direction();
    let doubledir = 2 * direction;
    let unpinned = !pos.pinned;
    let king_sq = pos.king_sqs[player as usize];
    let king_file_mask = COL_A << king_sq.file();

    if M != QUIETS {
        const NOT_WESTMOST: Bitboard = Bitboard::new(0xFEFE_FEFE_FEFE_FEFE);
        const NOT_EASTMOST: Bitboard = Bitboard::new(0x7F7F_7F7F_7F7F_7F7F);
        const RANK_1: Bitboard = Bitboard::new(0x0000_0000_0000_00FF);

        let king_rank_mask = RANK_1 << (king_sq.rank() << 3);
        let capturers = pawns & (unpinned | pos.pinned & !(king_file_mask | king_rank_mask));
        let capture_mask = opponents & target;

        let west_capturers = capturers & NOT_WESTMOST;
        let east_capturers = capturers & NOT_EASTMOST;
        let (west_targets, west_direction, east_targets, east_direction) = match player {
            Color::White => (
                west_capturers << 7 & capture_mask,
                Direction::NORTHWEST,
                east_capturers << 9 & capture_mask,
                Direction::NORTHEAST,
            ),
            Color::Black => (
                west_capturers >> 9 & capture_mask,
                Direction::SOUTHWEST,
                east_capturers >> 7 & capture_mask,
                Direction::SOUTHEAST,
            ),
        };

        for to_sq in east_targets & rank8 {
            let from_sq = to_sq - east_direction;
            if !pos.pinned.contains(from_sq) || aligned(king_sq, to_sq, from_sq) {
                for pt in Piece::NON_KING_TYPES {
                    if pt == Piece::Pawn {
                        continue;
                    }
                    moves.push(Move::promoting(from_sq, to_sq, pt));
                }
            }
        }
        for to_sq in west_targets & rank8 {
            let from_sq = to_sq - west_direction;
            if !pos.pinned.contains(from_sq) || aligned(king_sq, to_sq, from_sq) {
                for pt in Piece::NON_KING_TYPES {
                    if pt == Piece::Pawn {
                        continue;
                    }
                    moves.push(Move::promoting(from_sq, to_sq, pt));
                }
            }
        }

        for to_sq in east_targets & not_rank8 {
            let from_sq = to_sq - east_direction;
            if !pos.pinned.contains(from_sq) || aligned(king_sq, to_sq, from_sq) {
                moves.push(Move::normal(from_sq, to_sq));
            }
        }
        for to_sq in west_targets & not_rank8 {
            let from_sq = to_sq - west_direction;
            if !pos.pinned.contains(from_sq) || aligned(king_sq, to_sq, from_sq) {
                moves.push(Move::normal(from_sq, to_sq));
            }
        }

        if let Some(ep_square) = pos.en_passant_square {
            if target.contains(ep_square) {
                let king_sq = pos.king_sqs[pos.player as usize];
                let enemy = pos[!pos.player];
                let to_bb = Bitboard::from(ep_square);
                let capture_bb = match player {
                    Color::White => to_bb >> 8,
                    Color::Black => to_bb << 8,
                };
                let from_sqs = PAWN_ATTACKS[!player as usize][ep_square as usize] & pawns;
                for from_sq in from_sqs {
                    let new_occupancy =
                        pos.occupancy() ^ Bitboard::from(from_sq) ^ capture_bb ^ to_bb;
                    if (Bitboard::from(king_sq).rook_attacks(new_occupancy)
                        & (pos[Piece::Rook] | pos[Piece::Queen])
                        & enemy)
                        .is_empty()
                        && (Bitboard::from(king_sq).bishop_attacks(new_occupancy)
                            & (pos[Piece::Bishop] | pos[Piece::Queen])
                            & enemy)
                            .is_empty()
                    {
                        moves.push(Move::en_passant(from_sq, ep_square));
                    }
                }
            }
        }
    }

    if M != CAPTURES {
        let pushers = pawns & (unpinned | king_file_mask);
        let mut singles = match pos.player {
            Color::White => pushers << 8,
            Color::Black => pushers >> 8,
        } & unoccupied;
        let double_candidates = singles & rank3;
        let doubles = match pos.player {
            Color::White => double_candidates << 8,
            Color::Black => double_candidates >> 8,
        } & target
            & unoccupied;
        singles &= target;

        for to_sq in singles & rank8 {
            let from_sq = to_sq - direction;
            for pt in Piece::NON_KING_TYPES {
                if pt == Piece::Pawn {
                    continue;
                }
                moves.push(Move::promoting(from_sq, to_sq, pt));
            }
        }

        for to_sq in doubles {
            moves.push(Move::normal(to_sq - doubledir, to_sq));
        }

        for to_sq in singles & not_rank8 {
            moves.push(Move::normal(to_sq - direction, to_sq));
        }
    }
}

/// Generate the moves for every knight, bishop, rook, or queen landing in
/// `target`.
fn normal_piece_assistant(pos: &Position, moves: &mut Vec<Move>, target: Bitboard) {
    let player = pos.player;
    let allies = pos[player];
    let legal_targets = !allies & target;
    let occupancy = allies | pos[!player];
    let queens = pos[Piece::Queen];
    let rook_movers = (pos[Piece::Rook] | queens) & allies;
    let bishop_movers = (pos[Piece::Bishop] | queens) & allies;
    let king_sq = pos.king_sqs[player as usize];
    let unpinned = !pos.pinned;

    for sq in pos[Piece::Knight] & allies & unpinned {
        append_normal(sq, KNIGHT_MOVES[sq as usize] & legal_targets, moves);
    }
    for sq in bishop_movers & pos.pinned {
        append_normal(
            sq,
            Bitboard::from(sq).bishop_attacks(occupancy) & legal_targets & LINES[king_sq as usize][sq as usize],
            moves,
        );
    }
    for sq in bishop_movers & unpinned {
        append_normal(sq, Bitboard::from(sq).bishop_attacks(occupancy) & legal_targets, moves);
    }
    for sq in rook_movers & pos.pinned {
        append_normal(
            sq,
            Bitboard::from(sq).rook_attacks(occupancy) & legal_targets & LINES[king_sq as usize][sq as usize],
            moves,
        );
    }
    for sq in rook_movers & unpinned {
        append_normal(sq, Bitboard::from(sq).rook_attacks(occupancy) & legal_targets, moves);
    }
}

#[inline(always)]
/// Append one move per target square in `to_bb`, all moving from `from_sq`.
fn append_normal(from_sq: Square, to_bb: Bitboard, moves: &mut Vec<Move>) {
    for to_sq in to_bb {
        moves.push(Move::normal(from_sq, to_sq));
    }
}

/// Get the pseudolegal moves a pawn of `color` on `sq` could make, as a
/// `Bitboard` of target squares.
fn pawn_moves(pos: &Position, sq: Square, color: Color) -> Bitboard {
    let dir = color.pawn_direction();
    let start_rank = color.pawn_start_rank();
    let from_bb = Bitboard::from(sq);
    let occupancy = pos.occupancy();
    let mut target_squares = Bitboard::EMPTY;
    if !occupancy.contains(sq + dir) {
        target_squares.insert(sq + dir);
        if !(start_rank & from_bb).is_empty() && !occupancy.contains(sq + 2 * dir) {
            target_squares.insert(sq + 2 * dir);
        }
    }
    target_squares |= pawn_captures(pos, sq, color);
    target_squares &= !pos[color];

    target_squares
}

#[inline(always)]
/// Get the captures a pawn of `color` on `sq` could make, as a `Bitboard` of
/// target squares. `color` is the color of the piece on `sq`.
fn pawn_captures(pos: &Position, sq: Square, color: Color) -> Bitboard {
    let mut capture_mask = pos[!color];
    if let Some(ep_square) = pos.en_passant_square {
        capture_mask.insert(ep_square);
    }

    PAWN_ATTACKS[color as usize][sq as usize] & capture_mask
}

#[inline(always)]
/// Get the king moves that are not castles, and append them to `moves`.
fn king_move_non_castle(pos: &Position, moves: &mut Vec<Move>, target: Bitboard) {
    let king_sq = pos.king_sqs[pos.player as usize];
    let allies = pos[pos.player];
    let to_bb = KING_MOVES[king_sq as usize] & !allies & target;
    let king_bb = pos[Piece::King] & allies;
    let old_occupancy = pos.occupancy();
    for to_sq in to_bb {
        let new_occupancy = (old_occupancy ^ king_bb) | Bitboard::from(to_sq);
        if square_attackers_occupancy(pos, to_sq, !pos.player, new_occupancy).is_empty() {
            moves.push(Move::normal(king_sq, to_sq));
        }
    }
}

#[inline(always)]
/// Get the castling moves available in this position and append them to
/// `moves`. Assumes the king is not currently in check.
fn castles(pos: &Position, moves: &mut Vec<Move>) {
    let player = pos.player;
    let occ = pos.occupancy();
    let king_sq = pos.king_sqs[player as usize];

    let kingside_castle_passthrough_sqs = match player {
        Color::White => Bitboard::new(0x0000_0000_0000_0060),
        Color::Black => Bitboard::new(0x6000_0000_0000_0000),
    };
    let can_kingside_castle = pos.castle_rights.is_kingside_castle_legal(player)
        && (occ & kingside_castle_passthrough_sqs).is_empty();
    if can_kingside_castle {
        let passthrough_squares = match player {
            Color::White => [Square::F1, Square::G1],
            Color::Black => [Square::F8, Square::G8],
        };
        if !passthrough_squares
            .iter()
            .any(|&sq| is_square_attacked_by(pos, sq, !player))
        {
            moves.push(Move::castling(king_sq, passthrough_squares[1]));
        }
    }

    let queenside_castle_passthrough_sqs = match player {
        Color::White => Bitboard::new(0x0000_0000_0000_000E),
        Color::Black => Bitboard::new(0x0E00_0000_0000_0000),
    };
    let can_queenside_castle = pos.castle_rights.is_queenside_castle_legal(player)
        && (occ & queenside_castle_passthrough_sqs).is_empty();
    if can_queenside_castle {
        let passthrough_squares = match player {
            Color::White => [Square::D1, Square::C1],
            Color::Black => [Square::D8, Square::C8],
        };
        if !passthrough_squares
            .iter()
            .any(|&sq| is_square_attacked_by(pos, sq, !player))
        {
            moves.push(Move::castling(king_sq, passthrough_squares[1]));
        }
    }
}

#[inline(always)]
#[must_use]
/// Get the squares between `sq1` and `sq2` along a rook or bishop ray.
/// `EMPTY` if the squares are not aligned.
pub fn between(sq1: Square, sq2: Square) -> Bitboard {
    BETWEEN[sq1 as usize][sq2 as usize]
}

#[inline(always)]
#[must_use]
/// Are `sq1`, `sq2`, and `sq3` all on one rook or bishop line?
pub fn aligned(sq1: Square, sq2: Square, sq3: Square) -> bool {
    !(LINES[sq1 as usize][sq2 as usize] & Bitboard::from(sq3)).is_empty()
}

/// Get the step attacks reachable by moving in each of `dirs` from every
/// square, excluding steps which travel more than `max_dist` (this prevents
/// wraparound at the edges of the board).
fn create_step_attacks(dirs: &[Direction], max_dist: u8) -> [Bitboard; 64] {
    let mut attacks = [Bitboard::EMPTY; 64];
    for (i, item) in attacks.iter_mut().enumerate() {
        #[allow(clippy::cast_possible_truncation)]
        for dir in dirs {
            let start_sq = Square::try_from(i as u8).unwrap();
            let target_sq = start_sq + *dir;
            if target_sq.chebyshev_to(start_sq) <= max_dist {
                item.insert(target_sq);
            }
        }
    }

    attacks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_queen_fried_liver() {
        let m = Move::normal(Square::D1, Square::F3);
        let pos =
            Position::from_fen("r1bq1b1r/ppp2kpp/2n5/3np3/2B5/8/PPPP1PPP/RNBQK2R w KQ - 0 7")
                .unwrap();
        let moves = get_moves::<ALL>(&pos);
        assert!(moves.contains(&m));
        for m in moves {
            assert!(is_legal(m, &pos));
        }
    }

    #[test]
    fn pawn_capture_generated() {
        let pos =
            Position::from_fen("rnbqkbnr/ppppp1pp/8/5p2/4P3/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 2")
                .unwrap();
        let m = Move::normal(Square::E4, Square::F5);
        for m in get_moves::<ALL>(&pos) {
            assert!(is_legal(m, &pos));
        }
        assert!(get_moves::<ALL>(&pos).contains(&m));
        assert!(get_moves::<CAPTURES>(&pos).contains(&m));
    }

    #[test]
    fn white_mated_has_no_moves() {
        let pos =
            Position::from_fen("r1b2b1r/ppp2kpp/8/4p3/3n4/2Q5/PP1PqPPP/RNB1K2R w KQ - 4 11")
                .unwrap();
        assert!(!has_moves(&pos));
        assert!(get_moves::<ALL>(&pos).is_empty());
    }

    #[test]
    fn king_has_only_one_move() {
        let pos = Position::from_fen("2k5/4R3/8/5K2/3R4/8/8/8 b - - 2 2").unwrap();
        assert!(has_moves(&pos));
        assert_eq!(get_moves::<ALL>(&pos).len(), 1);
        assert!(is_legal(Move::normal(Square::C8, Square::B8), &pos));
    }

    #[test]
    fn queenside_castle() {
        let pos = Position::from_fen(
            "r3kb1r/ppp1p1pp/2nq1n2/1B1p4/3P4/2N2Q2/PPP2PPP/R1B1K2R b KQkq - 0 8",
        )
        .unwrap();
        let m = Move::castling(Square::E8, Square::C8);
        assert!(get_moves::<ALL>(&pos).contains(&m));
        assert!(is_legal(m, &pos));
    }

    #[test]
    fn no_queenside_castle_through_knight() {
        let pos =
            Position::from_fen("rn2kbnr/ppp1pppp/3q4/3p4/6b1/8/PPPPPPPP/RNBQKBNR b KQkq - 5 4")
                .unwrap();
        let m = Move::castling(Square::E8, Square::C8);
        assert!(!get_moves::<ALL>(&pos).contains(&m));
        assert!(!is_legal(m, &pos));
    }

    #[test]
    fn en_passant_generated() {
        let pos =
            Position::from_fen("rnbqkb1r/ppppp1pp/7n/4Pp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3")
                .unwrap();
        let m = Move::en_passant(Square::E5, Square::F6);
        assert!(get_moves::<ALL>(&pos).contains(&m));
        assert!(get_moves::<CAPTURES>(&pos).contains(&m));
        assert!(is_legal(m, &pos));
    }

    #[test]
    fn en_passant_pinned() {
        let pos = Position::from_fen("8/2p5/3p4/KPr5/2R1Pp1k/8/6P1/8 b - e3 0 2").unwrap();
        let moves = get_moves::<ALL>(&pos);
        let m = Move::en_passant(Square::F4, Square::E3);
        assert!(!moves.contains(&m));
        assert!(!is_legal(m, &pos));
    }

    #[test]
    fn en_passant_out_of_check() {
        let pos = Position::from_fen("8/8/8/1Ppp3r/1KR2p1k/8/4P1P1/8 w - c6 0 3").unwrap();
        let m = Move::en_passant(Square::B5, Square::C6);
        assert!(get_moves::<ALL>(&pos).contains(&m));
        assert!(is_legal(m, &pos));
        assert!(has_moves(&pos));
    }

    #[test]
    fn no_wraparound() {
        let pos = Position::from_fen(
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBPPP3/q4N2/Pp4PP/R2Q1RK1 b kq - 0 1",
        )
        .unwrap();
        let m = Move::normal(Square::H7, Square::A7);
        assert!(!get_moves::<ALL>(&pos).contains(&m));
        assert!(!is_legal(m, &pos));
    }

    #[test]
    fn horizontal_rook_mate() {
        let pos = Position::from_fen("r1b2k1R/3n1p2/p7/3P4/6Qp/2P3b1/6P1/4R2K b - - 0 32").unwrap();
        assert!(get_moves::<ALL>(&pos).is_empty());
        assert!(get_moves::<CAPTURES>(&pos).is_empty());
        assert!(get_moves::<QUIETS>(&pos).is_empty());
        assert!(!has_moves(&pos));
    }

    #[test]
    fn startpos_has_moves() {
        assert!(has_moves(&Position::default()));
        assert_eq!(get_moves::<ALL>(&Position::default()).len(), 20);
    }
}
