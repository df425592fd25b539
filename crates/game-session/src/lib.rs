//! Correspondence-chess session engine.
//!
//! One [`game::GamePlay`] per game: it owns the board and the scoresheet,
//! parses textual commands, enforces legality through `chess-core`, runs
//! the draw/resign/abort protocol and the per-move clock, and reports the
//! authoritative status after every command. Persistence, rendering and
//! statistics are external collaborators fed through [`snapshot`] and
//! [`game::MoveOutcome`].

pub mod clock;
pub mod command;
pub mod error;
pub mod game;
pub mod registry;
pub mod scoresheet;
pub mod snapshot;

pub use clock::{format_time_left, TimeControl};
pub use command::{MalformedCommand, MoveCommand};
pub use error::GameError;
pub use game::{GamePlay, GameResult, GameStatus, MoveOutcome, PlayerId};
pub use registry::{GameId, GameRegistry};
pub use scoresheet::{MoveRecord, Scoresheet};
pub use snapshot::{BoardSnapshot, GameRecord, PieceView, SquareView};
