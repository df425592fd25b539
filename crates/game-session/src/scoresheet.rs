//! The append-only move log.

use serde::{Deserialize, Serialize};

use chess_core::{Color, PieceKind};

/// One executed ply, immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// Full-move number shared by both colors: White's and Black's halves of
    /// move *n* both carry *n*, and the number advances after Black's reply.
    pub number: u32,
    pub color: Color,
    /// Long-form notation, e.g. `xPe4-d5`.
    pub notation: String,
    pub is_check: bool,
    pub is_capture: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PieceKind>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoresheet {
    moves: Vec<MoveRecord>,
}

impl Scoresheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_moves(moves: Vec<MoveRecord>) -> Self {
        Self { moves }
    }

    /// The full-move number the next ply will carry.
    pub fn move_number(&self) -> u32 {
        self.moves.len() as u32 / 2 + 1
    }

    pub fn ply_count(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn moves(&self) -> &[MoveRecord] {
        &self.moves
    }

    pub fn last(&self) -> Option<&MoveRecord> {
        self.moves.last()
    }

    pub(crate) fn append(&mut self, record: MoveRecord) {
        debug_assert_eq!(record.number, self.move_number());
        self.moves.push(record);
    }
}
