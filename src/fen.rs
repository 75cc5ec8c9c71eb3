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

//! Forsyth-Edwards Notation: reading and writing the six space-separated
//! fields (piece placement, side to move, castling rights, en passant
//! target, halfmove clock, fullmove number) that describe a position.

use std::convert::TryFrom;

use crate::{
    error::{bad_square, FenError},
    movegen::square_attackers,
    CastleRights, Color, Piece, Position, Square,
};

/// Parse a FEN record into a [`Position`].
///
/// # Errors
///
/// Returns `Err` if `fen` is not well-formed, or if it is structurally valid
/// but describes an illegal position (missing a king, more than two sides in
/// check, and so on).
pub fn parse(fen: &str) -> Result<Position, FenError> {
    let mut fields = fen.split(' ');

    let placement = fields
        .next()
        .ok_or(FenError::UnexpectedEnd("board placement"))?;
    let mut pos = Position::blank();
    for (row_idx, row) in placement.split('/').enumerate() {
        let rank = 7usize.wrapping_sub(row_idx);
        let mut file = 0usize;
        for c in row.chars() {
            if let Some(n) = c.to_digit(10) {
                file += n as usize;
                continue;
            }
            let color = if c.is_uppercase() {
                Color::White
            } else {
                Color::Black
            };
            let pt = c
                .to_uppercase()
                .next()
                .and_then(Piece::from_code)
                .ok_or(FenError::UnknownPiece(c))?;
            let sq = Square::new(rank, file).ok_or(FenError::UnknownPiece(c))?;
            pos.place_raw(sq, pt, color);
            file += 1;
        }
        if file != 8 {
            return Err(FenError::RankSize(row_idx, file));
        }
    }
    if placement.split('/').count() != 8 {
        return Err(FenError::BoardSize(placement.split('/').count()));
    }

    let side_str = fields.next().ok_or(FenError::UnexpectedEnd("side to move"))?;
    pos.player = match side_str {
        "w" => Color::White,
        "b" => Color::Black,
        _ => {
            return Err(FenError::UnknownSide(
                side_str.chars().next().unwrap_or('?'),
            ))
        }
    };

    let castle_str = fields
        .next()
        .ok_or(FenError::UnexpectedEnd("castling rights"))?;
    if castle_str != "-" {
        for c in castle_str.chars() {
            let right = match c {
                'K' => CastleRights::king_castle(Color::White),
                'Q' => CastleRights::queen_castle(Color::White),
                'k' => CastleRights::king_castle(Color::Black),
                'q' => CastleRights::queen_castle(Color::Black),
                _ => return Err(FenError::UnknownCastleRight(c)),
            };
            pos.castle_rights |= right;
        }
    }

    let ep_str = fields
        .next()
        .ok_or(FenError::UnexpectedEnd("en passant target"))?;
    pos.en_passant_square = if ep_str == "-" {
        None
    } else {
        Some(Square::from_algebraic(ep_str).map_err(|_| bad_square(ep_str))?)
    };

    let halfmove_str = fields
        .next()
        .ok_or(FenError::UnexpectedEnd("halfmove clock"))?;
    pos.halfmove_clock = halfmove_str
        .parse()
        .map_err(|_| FenError::IllegalPosition("halfmove clock is not a non-negative integer"))?;

    let fullmove_str = fields
        .next()
        .ok_or(FenError::UnexpectedEnd("fullmove number"))?;
    pos.fullmove_number = fullmove_str
        .parse()
        .map_err(|_| FenError::IllegalPosition("fullmove number is not a positive integer"))?;
    if pos.fullmove_number == 0 {
        return Err(FenError::IllegalPosition(
            "fullmove number must be at least 1",
        ));
    }

    pos.rebuild_mailbox();
    pos.recompute_hash();
    pos.king_sqs = [
        Square::try_from(pos[Piece::King] & pos[Color::White])
            .map_err(|_| FenError::IllegalPosition("white does not have exactly one king"))?,
        Square::try_from(pos[Piece::King] & pos[Color::Black])
            .map_err(|_| FenError::IllegalPosition("black does not have exactly one king"))?,
    ];
    pos.checkers = square_attackers(&pos, pos.king_sqs[pos.player as usize], !pos.player);
    pos.recompute_pinned();

    if !pos.is_valid() {
        return Err(FenError::IllegalPosition(
            "position after parsing is not self-consistent",
        ));
    }
    if !square_attackers(&pos, pos.king_sqs[!pos.player as usize], pos.player).is_empty() {
        return Err(FenError::IllegalPosition(
            "the side not to move is in check",
        ));
    }
    if pos.checkers.len() > 2 {
        return Err(FenError::IllegalPosition(
            "more than two pieces give check simultaneously",
        ));
    }

    Ok(pos)
}

/// Render `pos` as a FEN record. `parse(&emit(pos))` always succeeds and
/// reconstructs a position identical in every field, including halfmove
/// clock and fullmove number.
#[must_use]
pub fn emit(pos: &Position) -> String {
    let mut s = String::new();

    for rank in (0..8).rev() {
        let mut empty_run = 0u8;
        for file in 0..8 {
            let sq = Square::new(rank, file).unwrap();
            match (pos.type_at_square(sq), pos.color_at_square(sq)) {
                (Some(pt), Some(color)) => {
                    if empty_run > 0 {
                        s.push_str(&empty_run.to_string());
                        empty_run = 0;
                    }
                    let code = pt.code();
                    s.push_str(if color == Color::White {
                        code
                    } else {
                        &code.to_lowercase()
                    });
                }
                _ => empty_run += 1,
            }
        }
        if empty_run > 0 {
            s.push_str(&empty_run.to_string());
        }
        if rank > 0 {
            s.push('/');
        }
    }

    s.push(' ');
    s.push(if pos.player == Color::White { 'w' } else { 'b' });

    s.push(' ');
    let mut any_castle = false;
    if pos.castle_rights.is_kingside_castle_legal(Color::White) {
        s.push('K');
        any_castle = true;
    }
    if pos.castle_rights.is_queenside_castle_legal(Color::White) {
        s.push('Q');
        any_castle = true;
    }
    if pos.castle_rights.is_kingside_castle_legal(Color::Black) {
        s.push('k');
        any_castle = true;
    }
    if pos.castle_rights.is_queenside_castle_legal(Color::Black) {
        s.push('q');
        any_castle = true;
    }
    if !any_castle {
        s.push('-');
    }

    s.push(' ');
    match pos.en_passant_square {
        Some(sq) => s.push_str(&sq.to_string()),
        None => s.push('-'),
    }

    s.push(' ');
    s.push_str(&pos.halfmove_clock.to_string());
    s.push(' ');
    s.push_str(&pos.fullmove_number.to_string());

    s
}

#[cfg(test)]
mod tests {
    use super::*;

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn start_position_parses_to_new() {
        let parsed = parse(START_FEN).unwrap();
        assert_eq!(parsed, Position::new());
        assert_eq!(parsed.halfmove_clock, 0);
        assert_eq!(parsed.fullmove_number, 1);
    }

    #[test]
    fn start_position_round_trips() {
        assert_eq!(emit(&Position::new()), START_FEN);
    }

    #[test]
    fn kiwipete_round_trips() {
        let kiwipete =
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let parsed = parse(kiwipete).unwrap();
        assert_eq!(emit(&parsed), kiwipete);
    }

    #[test]
    fn en_passant_square_parses() {
        let fen = "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3";
        let parsed = parse(fen).unwrap();
        assert_eq!(parsed.en_passant_square, Some(Square::D6));
        assert_eq!(emit(&parsed), fen);
    }

    #[test]
    fn move_clocks_parse() {
        let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 3 3";
        let parsed = parse(fen).unwrap();
        assert_eq!(parsed.halfmove_clock, 3);
        assert_eq!(parsed.fullmove_number, 3);
    }

    #[test]
    fn bad_piece_character_is_rejected() {
        let fen = "rnbqkbnx/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
        assert!(matches!(parse(fen), Err(FenError::UnknownPiece('x'))));
    }

    #[test]
    fn wrong_board_size_is_rejected() {
        let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPP/RNBQKBNR w KQkq - 0 1";
        assert!(matches!(parse(fen), Err(FenError::RankSize(_, _))));
    }

    #[test]
    fn wrong_rank_count_is_rejected() {
        let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR/8 w KQkq - 0 1";
        assert!(matches!(parse(fen), Err(FenError::BoardSize(_))));
    }

    #[test]
    fn overflowing_rank_is_rejected() {
        let fen = "9/7/8/8/8/8/8/8 w KQkq - 0 1";
        assert!(matches!(parse(fen), Err(FenError::RankSize(0, 9))));
    }

    #[test]
    fn underflowing_rank_is_rejected() {
        let fen = "8/8/8/8/8/8/8/7 w KQkq - 0 1";
        assert!(matches!(parse(fen), Err(FenError::RankSize(7, 7))));
    }

    #[test]
    fn missing_king_is_illegal() {
        let fen = "rnbq1bnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
        assert!(parse(fen).is_err());
    }

    #[test]
    fn side_not_to_move_in_check_is_illegal() {
        // Black's king is in check from White's queen, but it is White to move.
        let fen = "4k3/4Q3/8/8/8/8/8/4K3 w - - 0 1";
        assert!(parse(fen).is_err());
    }

    #[test]
    fn unrecognized_side_to_move_is_rejected() {
        let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1";
        assert!(matches!(parse(fen), Err(FenError::UnknownSide('x'))));
    }
}
