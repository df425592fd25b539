//! The per-game session state machine.
//!
//! A `GamePlay` owns one board and one scoresheet and is the only writer of
//! either. Commands are validated completely before anything is mutated, so
//! a rejected command leaves the aggregate exactly as it was.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use chess_core::{rules, Board, Color, MoveSpec};

use crate::clock::TimeControl;
use crate::command::MoveCommand;
use crate::error::GameError;
use crate::scoresheet::{MoveRecord, Scoresheet};

pub type PlayerId = i64;

/// Scored outcome, reported to the statistics collaborator exactly once —
/// on the command that ends the game. Aborted games score nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    WhiteWin,
    BlackWin,
    Draw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    #[serde(rename = "awaiting players")]
    AwaitingPlayers,
    #[serde(rename = "in progress")]
    InProgress,
    #[serde(rename = "1-0")]
    WhiteWin,
    #[serde(rename = "0-1")]
    BlackWin,
    #[serde(rename = "1/2-1/2")]
    Draw,
    #[serde(rename = "aborted")]
    Aborted,
}

impl GameStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GameStatus::WhiteWin | GameStatus::BlackWin | GameStatus::Draw | GameStatus::Aborted
        )
    }

    /// The scored result, if this status carries one.
    pub fn result(&self) -> Option<GameResult> {
        match self {
            GameStatus::WhiteWin => Some(GameResult::WhiteWin),
            GameStatus::BlackWin => Some(GameResult::BlackWin),
            GameStatus::Draw => Some(GameResult::Draw),
            _ => None,
        }
    }

    fn win_for(color: Color) -> Self {
        match color {
            Color::White => GameStatus::WhiteWin,
            Color::Black => GameStatus::BlackWin,
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            GameStatus::AwaitingPlayers => "awaiting players",
            GameStatus::InProgress => "in progress",
            GameStatus::WhiteWin => "1-0",
            GameStatus::BlackWin => "0-1",
            GameStatus::Draw => "1/2-1/2",
            GameStatus::Aborted => "aborted",
        };
        write!(f, "{text}")
    }
}

/// What a successful command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub status: GameStatus,
    /// Human-readable summary for the caller to surface.
    pub message: String,
    /// `Some` exactly when this command moved the game into a scored
    /// terminal state.
    pub result: Option<GameResult>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GamePlay {
    pub(crate) white: Option<PlayerId>,
    pub(crate) black: Option<PlayerId>,
    pub(crate) board: Board,
    pub(crate) scoresheet: Scoresheet,
    pub(crate) turn: Color,
    pub(crate) status: GameStatus,
    pub(crate) draw_offered_by: Option<Color>,
    pub(crate) time_control: TimeControl,
    pub(crate) last_move_at: DateTime<Utc>,
}

impl GamePlay {
    /// An open challenge: the creator takes White and waits for an opponent.
    pub fn challenge(
        white: PlayerId,
        time_control: TimeControl,
        board: Board,
        now: DateTime<Utc>,
    ) -> Self {
        tracing::info!(white, %time_control, "challenge created");
        Self {
            white: Some(white),
            black: None,
            board,
            scoresheet: Scoresheet::new(),
            turn: Color::White,
            status: GameStatus::AwaitingPlayers,
            draw_offered_by: None,
            time_control,
            last_move_at: now,
        }
    }

    /// Both players known up front (e.g. a matched random game; the caller
    /// decides who gets which color). Starts from the standard position.
    pub fn start(
        white: PlayerId,
        black: PlayerId,
        time_control: TimeControl,
        now: DateTime<Utc>,
    ) -> Self {
        tracing::info!(white, black, %time_control, "game started");
        Self {
            white: Some(white),
            black: Some(black),
            board: Board::starting(),
            scoresheet: Scoresheet::new(),
            turn: Color::White,
            status: GameStatus::InProgress,
            draw_offered_by: None,
            time_control,
            last_move_at: now,
        }
    }

    /// The accepting player takes Black and the game begins; White's clock
    /// starts now.
    pub fn accept_challenge(
        &mut self,
        black: PlayerId,
        now: DateTime<Utc>,
    ) -> Result<(), GameError> {
        if self.status != GameStatus::AwaitingPlayers {
            return Err(GameError::CannotAccept(
                "the game already has both players".to_string(),
            ));
        }
        if self.white == Some(black) {
            return Err(GameError::CannotAccept(
                "you cannot accept your own challenge".to_string(),
            ));
        }
        self.black = Some(black);
        self.status = GameStatus::InProgress;
        self.last_move_at = now;
        tracing::info!(white = ?self.white, black, "challenge accepted");
        Ok(())
    }

    pub fn white(&self) -> Option<PlayerId> {
        self.white
    }

    pub fn black(&self) -> Option<PlayerId> {
        self.black
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn scoresheet(&self) -> &Scoresheet {
        &self.scoresheet
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn draw_offered_by(&self) -> Option<Color> {
        self.draw_offered_by
    }

    pub fn time_control(&self) -> TimeControl {
        self.time_control
    }

    pub fn last_move_at(&self) -> DateTime<Utc> {
        self.last_move_at
    }

    pub fn is_participant(&self, player: PlayerId) -> bool {
        self.player_color(player).is_some()
    }

    pub fn player_color(&self, player: PlayerId) -> Option<Color> {
        if self.white == Some(player) {
            Some(Color::White)
        } else if self.black == Some(player) {
            Some(Color::Black)
        } else {
            None
        }
    }

    pub fn opponent(&self, player: PlayerId) -> Option<PlayerId> {
        match self.player_color(player)? {
            Color::White => self.black,
            Color::Black => self.white,
        }
    }

    pub fn is_players_move(&self, player: PlayerId) -> bool {
        self.status == GameStatus::InProgress && self.player_color(player) == Some(self.turn)
    }

    /// Parse and execute one command from `actor`.
    pub fn make_move(
        &mut self,
        actor: PlayerId,
        input: &str,
        now: DateTime<Utc>,
    ) -> Result<MoveOutcome, GameError> {
        self.command(actor, input, false, now)
    }

    /// Like [`GamePlay::make_move`], and a successful chess move also puts
    /// the mover's draw offer on the table for the opponent to answer.
    pub fn make_move_offering_draw(
        &mut self,
        actor: PlayerId,
        input: &str,
        now: DateTime<Utc>,
    ) -> Result<MoveOutcome, GameError> {
        self.command(actor, input, true, now)
    }

    fn command(
        &mut self,
        actor: PlayerId,
        input: &str,
        offers_draw: bool,
        now: DateTime<Utc>,
    ) -> Result<MoveOutcome, GameError> {
        // Terminal states are absorbing: no command gets anything else out
        // of a finished game.
        if self.status.is_terminal() {
            return Err(GameError::GameAlreadyOver);
        }

        let parsed = MoveCommand::parse(input)?;

        // Abort has its own rules: it also cancels an unmatched challenge.
        if parsed == MoveCommand::Abort {
            return self.abort(actor);
        }

        self.ensure_in_progress()?;
        let color = self
            .player_color(actor)
            .ok_or(GameError::NotAParticipant)?;

        match parsed {
            MoveCommand::AcceptDraw => self.accept_draw(color),
            MoveCommand::RefuseDraw => self.refuse_draw(color),
            MoveCommand::Move(spec) => self.chess_move(color, spec, offers_draw, now),
            MoveCommand::Abort => unreachable!("handled above"),
        }
    }

    fn accept_draw(&mut self, color: Color) -> Result<MoveOutcome, GameError> {
        if self.turn != color {
            return Err(GameError::NotYourTurn);
        }
        match self.draw_offered_by {
            Some(offerer) if offerer == color.opposite() => {
                self.draw_offered_by = None;
                self.status = GameStatus::Draw;
                tracing::info!(%color, "draw accepted");
                Ok(MoveOutcome {
                    status: self.status,
                    message: "draw agreed".to_string(),
                    result: Some(GameResult::Draw),
                })
            }
            _ => Err(GameError::NoDrawOffered),
        }
    }

    fn refuse_draw(&mut self, color: Color) -> Result<MoveOutcome, GameError> {
        if self.turn != color {
            return Err(GameError::NotYourTurn);
        }
        match self.draw_offered_by {
            Some(offerer) if offerer == color.opposite() => {
                self.draw_offered_by = None;
                tracing::info!(%color, "draw refused");
                Ok(MoveOutcome {
                    status: self.status,
                    message: "draw refused".to_string(),
                    result: None,
                })
            }
            _ => Err(GameError::NoDrawOffered),
        }
    }

    fn chess_move(
        &mut self,
        color: Color,
        spec: MoveSpec,
        offers_draw: bool,
        now: DateTime<Utc>,
    ) -> Result<MoveOutcome, GameError> {
        if self.turn != color {
            return Err(GameError::NotYourTurn);
        }

        // Full validation happens here; everything after this line commits.
        let mv = rules::resolve(&self.board, color, &spec)?;

        let number = self.scoresheet.move_number();
        self.board.apply(&mv);

        let opponent = color.opposite();
        let is_check = rules::is_in_check(&self.board, opponent);
        self.scoresheet.append(MoveRecord {
            number,
            color,
            notation: mv.notation(),
            is_check,
            is_capture: mv.is_capture(),
            promotion: mv.promotion,
        });
        self.turn = opponent;
        self.last_move_at = now;

        let mut message = mv.notation();
        let result;
        if rules::is_checkmate(&self.board, opponent) {
            self.status = GameStatus::win_for(color);
            self.draw_offered_by = None;
            result = self.status.result();
            message = format!("{message}: checkmate, {color} wins");
            tracing::info!(%color, notation = %mv, "checkmate");
        } else if rules::is_stalemate(&self.board, opponent) {
            self.status = GameStatus::Draw;
            self.draw_offered_by = None;
            result = Some(GameResult::Draw);
            message = format!("{message}: stalemate");
            tracing::info!(%color, notation = %mv, "stalemate");
        } else {
            // An unanswered offer from the opponent lapses once a move is
            // played instead of an answer.
            self.draw_offered_by = if offers_draw { Some(color) } else { None };
            result = None;
            if is_check {
                message = format!("{message}: check");
            }
            if offers_draw {
                message = format!("{message} (draw offered)");
            }
            tracing::debug!(%color, notation = %mv, "move played");
        }

        Ok(MoveOutcome {
            status: self.status,
            message,
            result,
        })
    }

    /// Concede the game; the opponent scores the win.
    pub fn resign(&mut self, actor: PlayerId) -> Result<MoveOutcome, GameError> {
        if self.status.is_terminal() {
            return Err(GameError::GameAlreadyOver);
        }
        let color = self
            .player_color(actor)
            .ok_or(GameError::NotAParticipant)?;
        if self.status != GameStatus::InProgress || self.scoresheet.is_empty() {
            return Err(GameError::CannotResign);
        }

        let winner = color.opposite();
        self.status = GameStatus::win_for(winner);
        self.draw_offered_by = None;
        tracing::info!(%color, "resignation");
        Ok(MoveOutcome {
            status: self.status,
            message: format!("{color} resigns, {winner} wins"),
            result: self.status.result(),
        })
    }

    /// Cancel a game nothing has happened in: an unmatched challenge, or a
    /// matched game with an empty scoresheet. Scores nothing.
    pub fn abort(&mut self, actor: PlayerId) -> Result<MoveOutcome, GameError> {
        if self.status.is_terminal() {
            return Err(GameError::GameAlreadyOver);
        }
        if !self.is_participant(actor) {
            return Err(GameError::NotAParticipant);
        }
        if !self.scoresheet.is_empty() {
            return Err(GameError::CannotAbort);
        }

        self.status = GameStatus::Aborted;
        self.draw_offered_by = None;
        tracing::info!(white = ?self.white, black = ?self.black, "game aborted");
        Ok(MoveOutcome {
            status: self.status,
            message: "game aborted".to_string(),
            result: None,
        })
    }

    /// Remaining budget for the player on move, clamped at zero.
    pub fn time_left(&self, now: DateTime<Utc>) -> Duration {
        self.time_control.time_left(self.last_move_at, now)
    }

    /// Read-only classification; turning it into an outcome is
    /// [`GamePlay::forfeit_on_time`]'s job.
    pub fn is_lost_on_time(&self, now: DateTime<Utc>) -> bool {
        self.status == GameStatus::InProgress && self.time_left(now) == Duration::zero()
    }

    /// Explicit transition for a game whose player on move ran out of time:
    /// the opponent scores the win. Invoked by an external poller, never
    /// automatically.
    pub fn forfeit_on_time(&mut self, now: DateTime<Utc>) -> Result<MoveOutcome, GameError> {
        self.ensure_in_progress()?;
        if !self.is_lost_on_time(now) {
            return Err(GameError::TimeNotExpired);
        }

        let loser = self.turn;
        let winner = loser.opposite();
        self.status = GameStatus::win_for(winner);
        self.draw_offered_by = None;
        tracing::info!(%loser, "lost on time");
        Ok(MoveOutcome {
            status: self.status,
            message: format!("{loser} forfeits on time, {winner} wins"),
            result: self.status.result(),
        })
    }

    fn ensure_in_progress(&self) -> Result<(), GameError> {
        match self.status {
            GameStatus::InProgress => Ok(()),
            GameStatus::AwaitingPlayers => Err(GameError::GameNotStarted),
            _ => Err(GameError::GameAlreadyOver),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const ALICE: PlayerId = 1;
    const BOB: PlayerId = 2;
    const EVE: PlayerId = 3;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn started_game() -> GamePlay {
        GamePlay::start(ALICE, BOB, TimeControl::days(3), at(0))
    }

    #[test]
    fn test_challenge_lifecycle() {
        let mut game = GamePlay::challenge(ALICE, TimeControl::days(3), Board::starting(), at(0));
        assert_eq!(game.status(), GameStatus::AwaitingPlayers);
        assert_eq!(
            game.make_move(ALICE, "Pe2-e4", at(1)).unwrap_err(),
            GameError::GameNotStarted
        );
        assert!(matches!(
            game.accept_challenge(ALICE, at(1)).unwrap_err(),
            GameError::CannotAccept(_)
        ));

        game.accept_challenge(BOB, at(2)).unwrap();
        assert_eq!(game.status(), GameStatus::InProgress);
        assert_eq!(game.player_color(BOB), Some(Color::Black));
        assert_eq!(game.last_move_at(), at(2));

        assert!(matches!(
            game.accept_challenge(EVE, at(3)).unwrap_err(),
            GameError::CannotAccept(_)
        ));
    }

    #[test]
    fn test_first_move_flips_turn_and_records() {
        let mut game = started_game();
        let outcome = game.make_move(ALICE, "Pe2-e4", at(60)).unwrap();
        assert_eq!(outcome.status, GameStatus::InProgress);
        assert_eq!(outcome.result, None);
        assert_eq!(game.turn(), Color::Black);
        assert_eq!(game.scoresheet().ply_count(), 1);
        assert_eq!(game.scoresheet().last().unwrap().notation, "Pe2-e4");
        assert_eq!(game.last_move_at(), at(60));

        let e2 = "e2".parse().unwrap();
        let e4 = "e4".parse().unwrap();
        assert_eq!(game.board().piece_at(e2), None);
        assert!(game.board().piece_at(e4).is_some());
    }

    #[test]
    fn test_turn_is_enforced() {
        let mut game = started_game();
        assert_eq!(
            game.make_move(BOB, "Pe7-e5", at(1)).unwrap_err(),
            GameError::NotYourTurn
        );
        assert_eq!(
            game.make_move(EVE, "Pe2-e4", at(1)).unwrap_err(),
            GameError::NotAParticipant
        );
        assert_eq!(game.turn(), Color::White);
        assert!(game.scoresheet().is_empty());
    }

    #[test]
    fn test_rejected_command_mutates_nothing() {
        let mut game = started_game();
        let before = game.clone();
        let first = game.make_move(ALICE, "Ra1-a5", at(5)).unwrap_err();
        let second = game.make_move(ALICE, "Ra1-a5", at(6)).unwrap_err();
        assert_eq!(first, second);
        assert!(matches!(first, GameError::Illegal(_)));
        assert_eq!(game, before);

        assert!(matches!(
            game.make_move(ALICE, "gibberish", at(7)).unwrap_err(),
            GameError::Malformed(_)
        ));
        assert_eq!(game, before);
    }

    #[test]
    fn test_fools_mate_ends_the_game() {
        let mut game = started_game();
        game.make_move(ALICE, "Pf2-f3", at(1)).unwrap();
        game.make_move(BOB, "Pe7-e5", at(2)).unwrap();
        game.make_move(ALICE, "Pg2-g4", at(3)).unwrap();
        let outcome = game.make_move(BOB, "Qd8-h4", at(4)).unwrap();

        assert_eq!(outcome.status, GameStatus::BlackWin);
        assert_eq!(outcome.result, Some(GameResult::BlackWin));
        assert!(outcome.message.contains("checkmate"));

        assert_eq!(
            game.make_move(ALICE, "Pa2-a3", at(5)).unwrap_err(),
            GameError::GameAlreadyOver
        );
        assert_eq!(
            game.resign(ALICE).unwrap_err(),
            GameError::GameAlreadyOver
        );
    }

    #[test]
    fn test_draw_offer_accept_and_refuse() {
        let mut game = started_game();
        let outcome = game
            .make_move_offering_draw(ALICE, "Pe2-e4", at(1))
            .unwrap();
        assert!(outcome.message.contains("draw offered"));
        assert_eq!(game.draw_offered_by(), Some(Color::White));

        // Accepting may only be done by the opponent, on their turn.
        assert_eq!(
            game.make_move(ALICE, "accept_draw", at(2)).unwrap_err(),
            GameError::NotYourTurn
        );

        let mut refused = game.clone();
        let outcome = refused.make_move(BOB, "refuse_draw", at(2)).unwrap();
        assert_eq!(outcome.status, GameStatus::InProgress);
        assert_eq!(outcome.result, None);
        assert_eq!(refused.draw_offered_by(), None);
        // Black still has the move after refusing.
        refused.make_move(BOB, "Pe7-e5", at(3)).unwrap();

        let outcome = game.make_move(BOB, "accept_draw", at(2)).unwrap();
        assert_eq!(outcome.status, GameStatus::Draw);
        assert_eq!(outcome.result, Some(GameResult::Draw));
    }

    #[test]
    fn test_draw_offer_lapses_on_move() {
        let mut game = started_game();
        game.make_move_offering_draw(ALICE, "Pe2-e4", at(1)).unwrap();
        game.make_move(BOB, "Pe7-e5", at(2)).unwrap();
        assert_eq!(game.draw_offered_by(), None);
        assert_eq!(
            game.make_move(ALICE, "accept_draw", at(3)).unwrap_err(),
            GameError::NoDrawOffered
        );
    }

    #[test]
    fn test_accept_without_offer_fails() {
        let mut game = started_game();
        assert_eq!(
            game.make_move(ALICE, "accept_draw", at(1)).unwrap_err(),
            GameError::NoDrawOffered
        );
        assert_eq!(
            game.make_move(ALICE, "refuse_draw", at(1)).unwrap_err(),
            GameError::NoDrawOffered
        );
    }

    #[test]
    fn test_resignation() {
        let mut game = started_game();
        // Nothing played yet: resigning is not available, abort is.
        assert_eq!(game.resign(ALICE).unwrap_err(), GameError::CannotResign);

        game.make_move(ALICE, "Pe2-e4", at(1)).unwrap();
        assert_eq!(game.resign(EVE).unwrap_err(), GameError::NotAParticipant);

        let outcome = game.resign(ALICE).unwrap();
        assert_eq!(outcome.status, GameStatus::BlackWin);
        assert_eq!(outcome.result, Some(GameResult::BlackWin));
    }

    #[test]
    fn test_abort_only_before_first_move() {
        let mut game = started_game();
        let outcome = game.abort(BOB).unwrap();
        assert_eq!(outcome.status, GameStatus::Aborted);
        assert_eq!(outcome.result, None);
        assert_eq!(game.status(), GameStatus::Aborted);

        let mut played = started_game();
        played.make_move(ALICE, "Pe2-e4", at(1)).unwrap();
        assert_eq!(played.abort(BOB).unwrap_err(), GameError::CannotAbort);
        // The abort token routes the same way.
        assert_eq!(
            played.make_move(BOB, "abort", at(2)).unwrap_err(),
            GameError::CannotAbort
        );
    }

    #[test]
    fn test_abort_cancels_unmatched_challenge() {
        let mut game = GamePlay::challenge(ALICE, TimeControl::days(1), Board::starting(), at(0));
        assert_eq!(game.abort(EVE).unwrap_err(), GameError::NotAParticipant);
        let outcome = game.abort(ALICE).unwrap();
        assert_eq!(outcome.status, GameStatus::Aborted);
    }

    #[test]
    fn test_time_forfeit() {
        let mut game = started_game();
        game.make_move(ALICE, "Pe2-e4", at(0)).unwrap();

        let budget = 3 * 86_400;
        assert!(!game.is_lost_on_time(at(budget - 1)));
        assert_eq!(
            game.forfeit_on_time(at(budget - 1)).unwrap_err(),
            GameError::TimeNotExpired
        );

        assert_eq!(game.time_left(at(budget)), Duration::zero());
        assert!(game.is_lost_on_time(at(budget)));

        // Black was on move, so White wins.
        let outcome = game.forfeit_on_time(at(budget)).unwrap();
        assert_eq!(outcome.status, GameStatus::WhiteWin);
        assert_eq!(outcome.result, Some(GameResult::WhiteWin));
        assert_eq!(
            game.forfeit_on_time(at(budget + 1)).unwrap_err(),
            GameError::GameAlreadyOver
        );
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(GameStatus::WhiteWin.to_string(), "1-0");
        assert_eq!(GameStatus::Draw.to_string(), "1/2-1/2");
        assert_eq!(
            serde_json::to_string(&GameStatus::InProgress).unwrap(),
            "\"in progress\""
        );
    }
}
