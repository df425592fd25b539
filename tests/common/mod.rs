#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use game_session::{GamePlay, PlayerId, TimeControl};

pub const ALICE: PlayerId = 1;
pub const BOB: PlayerId = 2;
pub const EVE: PlayerId = 3;

/// Fixed reference instant; scenarios offset from it in seconds.
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_755_000_000 + secs, 0).unwrap()
}

/// A fresh in-progress game: Alice plays White, Bob plays Black, three days
/// per move.
pub fn started_game() -> GamePlay {
    GamePlay::start(ALICE, BOB, TimeControl::days(3), at(0))
}

/// Play a sequence of commands alternating from White; every one must
/// succeed.
pub fn play_all(game: &mut GamePlay, commands: &[&str]) {
    for (i, command) in commands.iter().enumerate() {
        let actor = if i % 2 == 0 { ALICE } else { BOB };
        game.make_move(actor, command, at(i as i64 + 1))
            .unwrap_or_else(|e| panic!("{command} failed: {e}"));
    }
}
