//! Textual move commands.
//!
//! Grammar: the reserved words `accept_draw`, `refuse_draw` and `abort`,
//! or a long-form move `["x"] [PNBRQK] <from> "-" <to> [NBRQ]` such as
//! `Pe2-e4`, `xNb1-c3` or `e7-e8Q`. The piece letter may be omitted for
//! pawns. The capture marker is advisory input; whether a move really
//! captures is the rules engine's call.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use chess_core::{MoveSpec, PieceKind, Square};

/// Command text that matches neither a reserved word nor the move grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized command: {0:?}")]
pub struct MalformedCommand(pub String);

/// A parsed command, matched exhaustively by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveCommand {
    Move(MoveSpec),
    AcceptDraw,
    RefuseDraw,
    Abort,
}

static MOVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(x)?([PNBRQK])?([a-h][1-8])-([a-h][1-8])([NBRQ])?$")
        .expect("move pattern compiles")
});

impl MoveCommand {
    pub fn parse(input: &str) -> Result<Self, MalformedCommand> {
        let text = input.trim();
        match text {
            "accept_draw" => return Ok(MoveCommand::AcceptDraw),
            "refuse_draw" => return Ok(MoveCommand::RefuseDraw),
            "abort" => return Ok(MoveCommand::Abort),
            _ => {}
        }

        let malformed = || MalformedCommand(input.to_string());
        let caps = MOVE_RE.captures(text).ok_or_else(malformed)?;

        let piece = match caps.get(2) {
            Some(letter) => first_char(letter.as_str())
                .and_then(|c| PieceKind::from_letter(c).ok())
                .ok_or_else(malformed)?,
            None => PieceKind::Pawn,
        };
        let from = caps
            .get(3)
            .and_then(|m| Square::from_coordinate(m.as_str()).ok())
            .ok_or_else(malformed)?;
        let to = caps
            .get(4)
            .and_then(|m| Square::from_coordinate(m.as_str()).ok())
            .ok_or_else(malformed)?;
        let promotion = match caps.get(5) {
            Some(letter) => Some(
                first_char(letter.as_str())
                    .and_then(|c| PieceKind::from_letter(c).ok())
                    .ok_or_else(malformed)?,
            ),
            None => None,
        };

        Ok(MoveCommand::Move(MoveSpec {
            piece,
            from,
            to,
            expects_capture: caps.get(1).is_some(),
            promotion,
        }))
    }
}

fn first_char(s: &str) -> Option<char> {
    s.chars().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_move(text: &str) -> MoveSpec {
        match MoveCommand::parse(text).unwrap() {
            MoveCommand::Move(spec) => spec,
            other => panic!("expected a move, got {other:?}"),
        }
    }

    #[test]
    fn test_reserved_words() {
        assert_eq!(MoveCommand::parse("accept_draw").unwrap(), MoveCommand::AcceptDraw);
        assert_eq!(MoveCommand::parse("refuse_draw").unwrap(), MoveCommand::RefuseDraw);
        assert_eq!(MoveCommand::parse("abort").unwrap(), MoveCommand::Abort);
    }

    #[test]
    fn test_plain_move() {
        let spec = parse_move("Pe2-e4");
        assert_eq!(spec.piece, PieceKind::Pawn);
        assert_eq!(spec.from.to_string(), "e2");
        assert_eq!(spec.to.to_string(), "e4");
        assert!(!spec.expects_capture);
        assert_eq!(spec.promotion, None);
    }

    #[test]
    fn test_pawn_letter_optional() {
        assert_eq!(parse_move("e2-e4"), parse_move("Pe2-e4"));
    }

    #[test]
    fn test_capture_marker_and_promotion() {
        let capture = parse_move("xNb1-c3");
        assert_eq!(capture.piece, PieceKind::Knight);
        assert!(capture.expects_capture);

        let promotion = parse_move("e7-e8Q");
        assert_eq!(promotion.promotion, Some(PieceKind::Queen));

        let under = parse_move("xPb7-a8N");
        assert!(under.expects_capture);
        assert_eq!(under.promotion, Some(PieceKind::Knight));
    }

    #[test]
    fn test_surrounding_whitespace_tolerated() {
        assert_eq!(parse_move(" Pe2-e4 "), parse_move("Pe2-e4"));
    }

    #[test]
    fn test_malformed_commands() {
        for text in [
            "",
            "Pe2e4",
            "Ze2-e4",
            "Pe2-e9",
            "Pi2-e4",
            "O-O",
            "accept draw",
            "Pe2-e4K", // king is not a promotion choice
            "Pe2--e4",
        ] {
            assert!(
                matches!(MoveCommand::parse(text), Err(MalformedCommand(_))),
                "{text:?} should be malformed"
            );
        }
    }
}
