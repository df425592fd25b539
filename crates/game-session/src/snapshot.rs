//! Read-only views for the out-of-process collaborators.
//!
//! The persistence collaborator stores and reloads a [`GameRecord`]; the
//! rendering collaborator draws from a [`BoardSnapshot`] plus the
//! legal-destination hints. Neither can mutate the game through these.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chess_core::{rules, Board, Color, InvalidLayout, PieceKind, Square};

use crate::clock::TimeControl;
use crate::game::{GamePlay, GameStatus, PlayerId};
use crate::scoresheet::{MoveRecord, Scoresheet};

/// Everything the persistence collaborator needs to store for one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub white: Option<PlayerId>,
    pub black: Option<PlayerId>,
    /// Board layout descriptor, see `chess_core::Board::from_placement`.
    pub board: String,
    pub turn: Color,
    pub status: GameStatus,
    pub draw_offered_by: Option<Color>,
    pub time_control: TimeControl,
    pub last_move_at: DateTime<Utc>,
    pub moves: Vec<MoveRecord>,
}

/// One square of a rendered board, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SquareView {
    pub coordinate: String,
    pub piece: Option<PieceView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PieceView {
    pub color: Color,
    pub kind: PieceKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardSnapshot {
    /// All 64 squares, rank 8 first, files a to h.
    pub squares: Vec<SquareView>,
    pub turn: Color,
    pub status: GameStatus,
}

impl GamePlay {
    pub fn to_record(&self) -> GameRecord {
        GameRecord {
            white: self.white,
            black: self.black,
            board: self.board.placement(),
            turn: self.turn,
            status: self.status,
            draw_offered_by: self.draw_offered_by,
            time_control: self.time_control,
            last_move_at: self.last_move_at,
            moves: self.scoresheet.moves().to_vec(),
        }
    }

    /// Rebuild a game from storage; the layout is re-validated on the way
    /// in so a corrupted record cannot produce an unplayable board.
    pub fn from_record(record: GameRecord) -> Result<Self, InvalidLayout> {
        let board = Board::from_placement(&record.board)?;
        Ok(Self {
            white: record.white,
            black: record.black,
            board,
            scoresheet: Scoresheet::from_moves(record.moves),
            turn: record.turn,
            status: record.status,
            draw_offered_by: record.draw_offered_by,
            time_control: record.time_control,
            last_move_at: record.last_move_at,
        })
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            squares: Square::all()
                .map(|sq| SquareView {
                    coordinate: sq.to_string(),
                    piece: self.board.piece_at(sq).map(|piece| PieceView {
                        color: piece.color,
                        kind: piece.kind,
                    }),
                })
                .collect(),
            turn: self.turn,
            status: self.status,
        }
    }

    /// Where the player on move may legally go from `from`. Empty for a
    /// game that is not in progress.
    pub fn legal_destinations_from(&self, from: Square) -> Vec<Square> {
        if self.status != GameStatus::InProgress {
            return Vec::new();
        }
        rules::legal_destinations(&self.board, self.turn, from)
    }
}
