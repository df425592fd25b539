//! Chess rules core: board modeling and move legality.
//!
//! Pure and synchronous. Session orchestration (turns, draw protocol,
//! clocks) lives in the `game-session` crate; this one only knows what a
//! legal chess move is.

pub mod board;
pub mod moves;
pub mod piece;
pub mod rules;
pub mod square;

pub use board::{Board, CastlingRights, InvalidLayout, STANDARD_PLACEMENT};
pub use moves::{Move, MoveKind, MoveSpec};
pub use piece::{Color, InvalidPiece, Piece, PieceKind};
pub use rules::IllegalMove;
pub use square::{InvalidSquare, Square};
