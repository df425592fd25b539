//! Board state: piece placement plus the castling and en-passant facts the
//! rules engine needs to validate special moves.
//!
//! The serialized form is the FEN-style placement string (8 `/`-separated
//! ranks, digits for runs of empty squares), optionally followed by a
//! castling field and an en-passant field. This is the layout descriptor the
//! persistence collaborator stores and loads.

use std::fmt;

use thiserror::Error;

use crate::moves::{Move, MoveKind};
use crate::piece::{Color, Piece, PieceKind};
use crate::square::Square;

/// The standard starting layout.
pub const STANDARD_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

/// A layout descriptor that is malformed or does not describe a playable
/// position (e.g. a king count other than one per color).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid layout: {0}")]
pub struct InvalidLayout(pub String);

/// Which castlings are still available to each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl CastlingRights {
    pub fn all() -> Self {
        Self {
            white_kingside: true,
            white_queenside: true,
            black_kingside: true,
            black_queenside: true,
        }
    }

    pub fn none() -> Self {
        Self {
            white_kingside: false,
            white_queenside: false,
            black_kingside: false,
            black_queenside: false,
        }
    }

    pub fn kingside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_kingside,
            Color::Black => self.black_kingside,
        }
    }

    pub fn queenside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_queenside,
            Color::Black => self.black_queenside,
        }
    }

    fn clear_for(&mut self, color: Color) {
        match color {
            Color::White => {
                self.white_kingside = false;
                self.white_queenside = false;
            }
            Color::Black => {
                self.black_kingside = false;
                self.black_queenside = false;
            }
        }
    }

    fn from_field(field: &str) -> Result<Self, InvalidLayout> {
        let mut rights = Self::none();
        if field == "-" {
            return Ok(rights);
        }
        for c in field.chars() {
            match c {
                'K' => rights.white_kingside = true,
                'Q' => rights.white_queenside = true,
                'k' => rights.black_kingside = true,
                'q' => rights.black_queenside = true,
                other => {
                    return Err(InvalidLayout(format!("bad castling flag {other:?}")));
                }
            }
        }
        Ok(rights)
    }

    fn field(&self) -> String {
        let mut out = String::new();
        if self.white_kingside {
            out.push('K');
        }
        if self.white_queenside {
            out.push('Q');
        }
        if self.black_kingside {
            out.push('k');
        }
        if self.black_queenside {
            out.push('q');
        }
        if out.is_empty() {
            out.push('-');
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    squares: [Option<Piece>; 64],
    castling: CastlingRights,
    en_passant: Option<Square>,
}

impl Board {
    /// The standard starting position.
    pub fn starting() -> Self {
        Self::from_placement(STANDARD_PLACEMENT).expect("standard layout is valid")
    }

    /// Parse a layout descriptor: placement, then optional castling and
    /// en-passant fields. When the castling field is absent the rights are
    /// derived from whether king and rooks still sit on their home squares.
    pub fn from_placement(text: &str) -> Result<Self, InvalidLayout> {
        let fields: Vec<&str> = text.split_whitespace().collect();
        if fields.is_empty() || fields.len() > 3 {
            return Err(InvalidLayout(format!("expected 1 to 3 fields, got {}", fields.len())));
        }

        let mut squares: [Option<Piece>; 64] = [None; 64];
        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(InvalidLayout(format!("expected 8 ranks, got {}", ranks.len())));
        }
        for (i, rank_text) in ranks.iter().enumerate() {
            let rank = 8 - i as u8;
            let mut file = 1u8;
            for c in rank_text.chars() {
                if let Some(run) = c.to_digit(10) {
                    file += run as u8;
                } else {
                    if file > 8 {
                        return Err(InvalidLayout(format!("rank {rank} is too wide")));
                    }
                    let piece = Piece::from_layout_letter(c)
                        .map_err(|e| InvalidLayout(e.to_string()))?;
                    let square = Square::new(file, rank)
                        .map_err(|e| InvalidLayout(e.to_string()))?;
                    squares[square.index()] = Some(piece);
                    file += 1;
                }
            }
            if file != 9 {
                return Err(InvalidLayout(format!("rank {rank} does not span 8 files")));
            }
        }

        let castling = match fields.get(1) {
            Some(field) => CastlingRights::from_field(field)?,
            None => derive_castling(&squares),
        };

        let en_passant = match fields.get(2) {
            Some(&"-") | None => None,
            Some(field) => Some(
                Square::from_coordinate(field).map_err(|e| InvalidLayout(e.to_string()))?,
            ),
        };

        let board = Self {
            squares,
            castling,
            en_passant,
        };
        board.validate_kings()?;
        Ok(board)
    }

    /// Serialize the full layout descriptor, inverse of `from_placement`.
    pub fn placement(&self) -> String {
        let mut out = String::new();
        for rank in (1..=8u8).rev() {
            let mut empty_run = 0u8;
            for file in 1..=8u8 {
                let index = (rank as usize - 1) * 8 + (file as usize - 1);
                match self.squares[index] {
                    Some(piece) => {
                        if empty_run > 0 {
                            out.push(char::from(b'0' + empty_run));
                            empty_run = 0;
                        }
                        out.push(piece.layout_letter());
                    }
                    None => empty_run += 1,
                }
            }
            if empty_run > 0 {
                out.push(char::from(b'0' + empty_run));
            }
            if rank > 1 {
                out.push('/');
            }
        }
        out.push(' ');
        out.push_str(&self.castling.field());
        out.push(' ');
        match self.en_passant {
            Some(sq) => out.push_str(&sq.to_string()),
            None => out.push('-'),
        }
        out
    }

    /// Total: empty squares are `None`.
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.index()]
    }

    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    /// The square a pawn just skipped with a double push, if any.
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    /// All of `color`'s pieces with their squares, in display order.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| match self.piece_at(sq) {
            Some(piece) if piece.color == color => Some((sq, piece)),
            _ => None,
        })
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces(color)
            .find(|(_, piece)| piece.kind == PieceKind::King)
            .map(|(sq, _)| sq)
    }

    /// The king-pair invariant. A failure here on a board that was accepted
    /// earlier is a programming defect, not bad user input.
    pub fn validate_kings(&self) -> Result<(), InvalidLayout> {
        for color in [Color::White, Color::Black] {
            let kings = self
                .pieces(color)
                .filter(|(_, piece)| piece.kind == PieceKind::King)
                .count();
            if kings != 1 {
                return Err(InvalidLayout(format!("{color} has {kings} kings")));
            }
        }
        Ok(())
    }

    /// Apply a *validated* move and return the captured piece, if any.
    ///
    /// Validation is the rules engine's job; the board performs the rewrites
    /// mechanically. Applying a move the rules engine did not produce leaves
    /// the board in an unspecified position.
    pub fn apply(&mut self, mv: &Move) -> Option<Piece> {
        let Some(moved) = self.squares[mv.from.index()].take() else {
            return None;
        };

        let forward: i8 = match moved.color {
            Color::White => 1,
            Color::Black => -1,
        };

        let captured = match mv.kind {
            MoveKind::EnPassant => mv
                .to
                .offset(0, -forward)
                .and_then(|sq| self.squares[sq.index()].take()),
            _ => self.squares[mv.to.index()].take(),
        };

        let placed = match mv.promotion {
            Some(kind) => Piece::new(moved.color, kind),
            None => moved,
        };
        self.squares[mv.to.index()] = Some(placed);

        // The rook hop completing a castle.
        let rook_hop = match mv.kind {
            MoveKind::CastleKingside => Some((mv.to.offset(1, 0), mv.to.offset(-1, 0))),
            MoveKind::CastleQueenside => Some((mv.to.offset(-2, 0), mv.to.offset(1, 0))),
            _ => None,
        };
        if let Some((Some(rook_from), Some(rook_to))) = rook_hop {
            if let Some(rook) = self.squares[rook_from.index()].take() {
                self.squares[rook_to.index()] = Some(rook);
            }
        }

        self.update_castling_rights(moved, mv);

        self.en_passant = match mv.kind {
            MoveKind::DoublePush => mv.from.offset(0, forward),
            _ => None,
        };

        captured
    }

    fn update_castling_rights(&mut self, moved: Piece, mv: &Move) {
        if moved.kind == PieceKind::King {
            self.castling.clear_for(moved.color);
        }
        for (corner, color, kingside) in [
            ("a1", Color::White, false),
            ("h1", Color::White, true),
            ("a8", Color::Black, false),
            ("h8", Color::Black, true),
        ] {
            let Ok(corner) = Square::from_coordinate(corner) else {
                continue;
            };
            // A rook leaving its corner, or anything landing on it, kills
            // that side's castling.
            if mv.from == corner || mv.to == corner {
                match (color, kingside) {
                    (Color::White, true) => self.castling.white_kingside = false,
                    (Color::White, false) => self.castling.white_queenside = false,
                    (Color::Black, true) => self.castling.black_kingside = false,
                    (Color::Black, false) => self.castling.black_queenside = false,
                }
            }
        }
    }
}

/// Rights implied by a bare placement: available iff king and rook are still
/// on their home squares.
fn derive_castling(squares: &[Option<Piece>; 64]) -> CastlingRights {
    let at = |coord: &str| {
        Square::from_coordinate(coord)
            .ok()
            .and_then(|sq| squares[sq.index()])
    };
    let home = |coord: &str, color: Color, kind: PieceKind| {
        at(coord) == Some(Piece::new(color, kind))
    };
    CastlingRights {
        white_kingside: home("e1", Color::White, PieceKind::King)
            && home("h1", Color::White, PieceKind::Rook),
        white_queenside: home("e1", Color::White, PieceKind::King)
            && home("a1", Color::White, PieceKind::Rook),
        black_kingside: home("e8", Color::Black, PieceKind::King)
            && home("h8", Color::Black, PieceKind::Rook),
        black_queenside: home("e8", Color::Black, PieceKind::King)
            && home("a8", Color::Black, PieceKind::Rook),
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (1..=8u8).rev() {
            write!(f, "{rank} ")?;
            for file in 1..=8u8 {
                let index = (rank as usize - 1) * 8 + (file as usize - 1);
                match self.squares[index] {
                    Some(piece) => write!(f, " {}", piece.layout_letter())?,
                    None => write!(f, " .")?,
                }
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}
