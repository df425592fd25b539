//! Executed moves and parsed move candidates.

use std::fmt;

use crate::piece::{Piece, PieceKind};
use crate::square::Square;

/// How a move rewrites the board beyond the from→to relocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    Normal,
    /// Pawn two-square advance; opens the en-passant window behind it.
    DoublePush,
    /// Pawn capture onto the en-passant square; the captured pawn sits
    /// beside the destination, not on it.
    EnPassant,
    CastleKingside,
    CastleQueenside,
}

/// A fully validated move. Only the rules engine produces these; the board
/// applies them without further checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub piece: Piece,
    pub from: Square,
    pub to: Square,
    pub captures: Option<Piece>,
    pub promotion: Option<PieceKind>,
    pub kind: MoveKind,
}

impl Move {
    pub fn is_capture(&self) -> bool {
        self.captures.is_some()
    }

    /// Long-form notation: `Pe2-e4`, `xPe4-d5`, `Pe7-e8Q`. The capture
    /// marker reflects what actually happened, the piece letter is always
    /// present.
    pub fn notation(&self) -> String {
        let mut out = String::with_capacity(8);
        if self.is_capture() {
            out.push('x');
        }
        out.push(self.piece.kind.letter());
        out.push_str(&self.from.to_string());
        out.push('-');
        out.push_str(&self.to.to_string());
        if let Some(kind) = self.promotion {
            out.push(kind.letter());
        }
        out
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.notation())
    }
}

/// A syntactically valid move command, not yet validated against any board.
/// The capture marker on input is advisory; the rules engine decides whether
/// the move actually captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveSpec {
    /// `Pawn` when the command omitted the piece letter.
    pub piece: PieceKind,
    pub from: Square,
    pub to: Square,
    pub expects_capture: bool,
    pub promotion: Option<PieceKind>,
}

impl fmt::Display for MoveSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.expects_capture {
            write!(f, "x")?;
        }
        write!(f, "{}{}-{}", self.piece.letter(), self.from, self.to)?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.letter())?;
        }
        Ok(())
    }
}
