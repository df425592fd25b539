//! Session-level error taxonomy.
//!
//! Every failure is input rejection: validation completes before any
//! mutation, so a rejected command leaves the game untouched and the same
//! bad command fails the same way twice.

use thiserror::Error;

use chess_core::IllegalMove;

use crate::command::MalformedCommand;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("it is not your turn")]
    NotYourTurn,

    #[error("you are not a participant in this game")]
    NotAParticipant,

    #[error("the game has not started yet")]
    GameNotStarted,

    #[error("the game is already over")]
    GameAlreadyOver,

    #[error("there is no draw offer to answer")]
    NoDrawOffered,

    #[error("a game can only be aborted before the first move")]
    CannotAbort,

    #[error("resigning is only possible once the game is under way")]
    CannotResign,

    #[error("this challenge cannot be accepted: {0}")]
    CannotAccept(String),

    #[error("the player to move still has time left")]
    TimeNotExpired,

    #[error(transparent)]
    Malformed(#[from] MalformedCommand),

    #[error(transparent)]
    Illegal(#[from] IllegalMove),
}
