mod common;

use common::{at, started_game, ALICE, BOB};

use chrono::Duration;
use game_session::{format_time_left, GameError, GameResult, GameStatus};

const THREE_DAYS: i64 = 3 * 86_400;

#[test]
fn test_time_left_counts_down_from_each_move() {
    let mut game = started_game();
    assert_eq!(game.time_left(at(0)), Duration::days(3));
    assert_eq!(game.time_left(at(86_400)), Duration::days(2));

    // Moving resets the budget for the other player.
    game.make_move(ALICE, "Pe2-e4", at(86_400)).unwrap();
    assert_eq!(game.time_left(at(86_400)), Duration::days(3));
}

#[test]
fn test_time_left_clamps_at_zero() {
    let game = started_game();
    assert_eq!(game.time_left(at(THREE_DAYS)), Duration::zero());
    assert_eq!(game.time_left(at(THREE_DAYS * 10)), Duration::zero());
    assert!(game.is_lost_on_time(at(THREE_DAYS)));
    assert!(!game.is_lost_on_time(at(THREE_DAYS - 1)));
}

#[test]
fn test_forfeit_goes_to_the_opponent_of_the_mover() {
    let mut game = started_game();
    game.make_move(ALICE, "Pe2-e4", at(0)).unwrap();
    game.make_move(BOB, "Pe7-e5", at(100)).unwrap();

    // White is on move and lets the clock run out: Black wins.
    let deadline = 100 + THREE_DAYS;
    let outcome = game.forfeit_on_time(at(deadline)).unwrap();
    assert_eq!(outcome.status, GameStatus::BlackWin);
    assert_eq!(outcome.result, Some(GameResult::BlackWin));
}

#[test]
fn test_forfeit_requires_an_expired_clock() {
    let mut game = started_game();
    game.make_move(ALICE, "Pe2-e4", at(0)).unwrap();
    assert_eq!(
        game.forfeit_on_time(at(THREE_DAYS - 1)).unwrap_err(),
        GameError::TimeNotExpired
    );
    assert_eq!(game.status(), GameStatus::InProgress);
}

#[test]
fn test_forfeit_is_not_repeatable() {
    let mut game = started_game();
    game.forfeit_on_time(at(THREE_DAYS)).unwrap();
    assert_eq!(
        game.forfeit_on_time(at(THREE_DAYS + 1)).unwrap_err(),
        GameError::GameAlreadyOver
    );
}

#[test]
fn test_terminal_games_never_forfeit() {
    let mut game = started_game();
    game.make_move(ALICE, "Pe2-e4", at(0)).unwrap();
    game.resign(BOB).unwrap();
    // Long past the budget, but the game already has its result.
    assert_eq!(
        game.forfeit_on_time(at(THREE_DAYS * 2)).unwrap_err(),
        GameError::GameAlreadyOver
    );
    assert_eq!(game.status(), GameStatus::WhiteWin);
}

#[test]
fn test_listing_friendly_remaining_time() {
    let game = started_game();
    let left = game.time_left(at(86_400 + 3_661));
    assert_eq!(format_time_left(left), "1 days 22 hours 58 mins 59 secs");
    assert_eq!(format_time_left(game.time_left(at(THREE_DAYS))), "0 secs");
}
