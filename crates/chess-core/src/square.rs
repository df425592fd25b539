//! Board coordinates.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A coordinate or file/rank pair that is not on the board.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid square: {0}")]
pub struct InvalidSquare(pub String);

/// A board coordinate. `file` and `rank` are both in 1..=8; file 1 is the
/// a-file and rank 1 is White's back rank. The string form is the usual
/// two-character coordinate, e.g. "e4".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Square {
    file: u8,
    rank: u8,
}

impl Square {
    pub fn new(file: u8, rank: u8) -> Result<Self, InvalidSquare> {
        if (1..=8).contains(&file) && (1..=8).contains(&rank) {
            Ok(Self { file, rank })
        } else {
            Err(InvalidSquare(format!("file {file}, rank {rank}")))
        }
    }

    /// Parse a coordinate like "e4".
    pub fn from_coordinate(coord: &str) -> Result<Self, InvalidSquare> {
        let bytes = coord.as_bytes();
        if bytes.len() != 2 {
            return Err(InvalidSquare(coord.to_string()));
        }
        let file = match bytes[0] {
            b @ b'a'..=b'h' => b - b'a' + 1,
            _ => return Err(InvalidSquare(coord.to_string())),
        };
        let rank = match bytes[1] {
            b @ b'1'..=b'8' => b - b'0',
            _ => return Err(InvalidSquare(coord.to_string())),
        };
        Ok(Self { file, rank })
    }

    /// Build from an array index, a1 = 0, h1 = 7, a2 = 8, ..., h8 = 63.
    pub fn from_index(index: usize) -> Result<Self, InvalidSquare> {
        if index < 64 {
            Ok(Self {
                file: (index % 8) as u8 + 1,
                rank: (index / 8) as u8 + 1,
            })
        } else {
            Err(InvalidSquare(format!("index {index}")))
        }
    }

    pub fn file(&self) -> u8 {
        self.file
    }

    pub fn rank(&self) -> u8 {
        self.rank
    }

    /// Array index, inverse of [`Square::from_index`].
    pub fn index(&self) -> usize {
        (self.rank as usize - 1) * 8 + (self.file as usize - 1)
    }

    pub fn file_letter(&self) -> char {
        (b'a' + self.file - 1) as char
    }

    /// The square `file_step`/`rank_step` away, if still on the board.
    pub fn offset(&self, file_step: i8, rank_step: i8) -> Option<Square> {
        let file = self.file as i8 + file_step;
        let rank = self.rank as i8 + rank_step;
        if (1..=8).contains(&file) && (1..=8).contains(&rank) {
            Some(Square {
                file: file as u8,
                rank: rank as u8,
            })
        } else {
            None
        }
    }

    /// All 64 squares in display order: rank 8 down to rank 1, files a to h.
    pub fn all() -> impl Iterator<Item = Square> {
        (1..=8u8)
            .rev()
            .flat_map(|rank| (1..=8u8).map(move |file| Square { file, rank }))
    }
}

// Total order matching display order (rank 8 first, then file a to h), so a
// sorted list of squares reads like a board.
impl Ord for Square {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .rank
            .cmp(&self.rank)
            .then_with(|| self.file.cmp(&other.file))
    }
}

impl PartialOrd for Square {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_letter(), self.rank)
    }
}

impl FromStr for Square {
    type Err = InvalidSquare;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Square::from_coordinate(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_round_trip() {
        for coord in ["a1", "e4", "h8", "b7"] {
            let sq = Square::from_coordinate(coord).unwrap();
            assert_eq!(sq.to_string(), coord);
        }
    }

    #[test]
    fn test_index_round_trip() {
        for i in 0..64 {
            assert_eq!(Square::from_index(i).unwrap().index(), i);
        }
        assert_eq!(Square::from_index(0).unwrap().to_string(), "a1");
        assert_eq!(Square::from_index(63).unwrap().to_string(), "h8");
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(Square::new(0, 5).is_err());
        assert!(Square::new(9, 1).is_err());
        assert!(Square::from_coordinate("i3").is_err());
        assert!(Square::from_coordinate("a9").is_err());
        assert!(Square::from_coordinate("e45").is_err());
        assert!(Square::from_coordinate("").is_err());
    }

    #[test]
    fn test_display_order() {
        let all: Vec<Square> = Square::all().collect();
        assert_eq!(all.len(), 64);
        assert_eq!(all[0].to_string(), "a8");
        assert_eq!(all[7].to_string(), "h8");
        assert_eq!(all[63].to_string(), "h1");

        let mut sorted = all.clone();
        sorted.sort();
        assert_eq!(sorted, all);
    }

    #[test]
    fn test_offset_stays_on_board() {
        let e4 = Square::from_coordinate("e4").unwrap();
        assert_eq!(e4.offset(0, 1).unwrap().to_string(), "e5");
        assert_eq!(e4.offset(-1, -1).unwrap().to_string(), "d3");

        let a1 = Square::from_coordinate("a1").unwrap();
        assert!(a1.offset(-1, 0).is_none());
        assert!(a1.offset(0, -1).is_none());
    }
}
