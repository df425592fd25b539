//! The rules engine: sole authority on move legality.
//!
//! Everything here is a pure function over `(&Board, Color)`. A submitted
//! command is validated with [`resolve`]; checkmate/stalemate detection and
//! the rendering hints go through [`legal_moves`] / [`legal_destinations`].

use thiserror::Error;

use crate::board::Board;
use crate::moves::{Move, MoveKind, MoveSpec};
use crate::piece::{Color, Piece, PieceKind};
use crate::square::Square;

/// A well-formed command the rules reject, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IllegalMove {
    #[error("there is no piece on {0}")]
    EmptyOrigin(Square),
    #[error("the piece on {0} is not yours")]
    NotYourPiece(Square),
    #[error("the piece on {square} is a {found}, not a {named}")]
    WrongPiece {
        named: PieceKind,
        found: PieceKind,
        square: Square,
    },
    #[error("a {piece} cannot move from {from} to {to}")]
    Unreachable {
        piece: PieceKind,
        from: Square,
        to: Square,
    },
    #[error("the path from {from} to {to} is blocked")]
    Blocked { from: Square, to: Square },
    #[error("there is nothing to capture on {0}")]
    NothingToCapture(Square),
    #[error("your own piece is on {0}")]
    FriendlyCapture(Square),
    #[error("castling that way is not available")]
    CastlingUnavailable,
    #[error("the move would leave your king in check")]
    KingLeftInCheck,
    #[error("promotion is only possible for a pawn reaching the last rank")]
    BadPromotion,
}

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

const ROOK_DIRS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Promotion choices, default first.
const PROMOTION_KINDS: [PieceKind; 4] = [
    PieceKind::Queen,
    PieceKind::Rook,
    PieceKind::Bishop,
    PieceKind::Knight,
];

fn forward(color: Color) -> i8 {
    match color {
        Color::White => 1,
        Color::Black => -1,
    }
}

fn start_rank(color: Color) -> u8 {
    match color {
        Color::White => 2,
        Color::Black => 7,
    }
}

fn promotion_rank(color: Color) -> u8 {
    match color {
        Color::White => 8,
        Color::Black => 1,
    }
}

fn home_rank(color: Color) -> u8 {
    match color {
        Color::White => 1,
        Color::Black => 8,
    }
}

/// Does any piece of `by` attack `target`?
pub fn is_attacked(board: &Board, by: Color, target: Square) -> bool {
    board.pieces(by).any(|(from, piece)| match piece.kind {
        PieceKind::Pawn => [(-1, forward(by)), (1, forward(by))]
            .iter()
            .any(|&(df, dr)| from.offset(df, dr) == Some(target)),
        PieceKind::Knight => KNIGHT_OFFSETS
            .iter()
            .any(|&(df, dr)| from.offset(df, dr) == Some(target)),
        PieceKind::King => KING_OFFSETS
            .iter()
            .any(|&(df, dr)| from.offset(df, dr) == Some(target)),
        PieceKind::Rook => ROOK_DIRS.iter().any(|&dir| ray_hits(board, from, dir, target)),
        PieceKind::Bishop => BISHOP_DIRS
            .iter()
            .any(|&dir| ray_hits(board, from, dir, target)),
        PieceKind::Queen => ROOK_DIRS
            .iter()
            .chain(BISHOP_DIRS.iter())
            .any(|&dir| ray_hits(board, from, dir, target)),
    })
}

/// Walk a ray and report whether `target` is reached before any blocker.
fn ray_hits(board: &Board, from: Square, dir: (i8, i8), target: Square) -> bool {
    let mut sq = from;
    while let Some(next) = sq.offset(dir.0, dir.1) {
        if next == target {
            return true;
        }
        if board.piece_at(next).is_some() {
            return false;
        }
        sq = next;
    }
    false
}

pub fn is_in_check(board: &Board, color: Color) -> bool {
    match board.king_square(color) {
        Some(king) => is_attacked(board, color.opposite(), king),
        None => false,
    }
}

/// Every legal move for `color`: pseudo-legal generation filtered by "own
/// king not in check afterwards".
pub fn legal_moves(board: &Board, color: Color) -> Vec<Move> {
    pseudo_legal_moves(board, color)
        .into_iter()
        .filter(|mv| !leaves_king_in_check(board, color, mv))
        .collect()
}

/// The destinations `color` may legally move to from `from`. Rendering hint
/// for the active player's board.
pub fn legal_destinations(board: &Board, color: Color, from: Square) -> Vec<Square> {
    let mut destinations: Vec<Square> = legal_moves(board, color)
        .into_iter()
        .filter(|mv| mv.from == from)
        .map(|mv| mv.to)
        .collect();
    destinations.sort();
    destinations.dedup();
    destinations
}

pub fn is_checkmate(board: &Board, color: Color) -> bool {
    is_in_check(board, color) && !has_any_legal_move(board, color)
}

pub fn is_stalemate(board: &Board, color: Color) -> bool {
    !is_in_check(board, color) && !has_any_legal_move(board, color)
}

fn has_any_legal_move(board: &Board, color: Color) -> bool {
    pseudo_legal_moves(board, color)
        .iter()
        .any(|mv| !leaves_king_in_check(board, color, mv))
}

fn leaves_king_in_check(board: &Board, color: Color, mv: &Move) -> bool {
    let mut scratch = board.clone();
    scratch.apply(mv);
    is_in_check(&scratch, color)
}

/// Validate one textual candidate into a concrete [`Move`].
///
/// Equivalent to membership in [`legal_moves`] without enumerating the whole
/// set. The command's capture marker is advisory; a pawn reaching the last
/// rank promotes to the named piece, or to a queen when none is named.
pub fn resolve(board: &Board, color: Color, spec: &MoveSpec) -> Result<Move, IllegalMove> {
    let piece = board
        .piece_at(spec.from)
        .ok_or(IllegalMove::EmptyOrigin(spec.from))?;
    if piece.color != color {
        return Err(IllegalMove::NotYourPiece(spec.from));
    }
    if piece.kind != spec.piece {
        return Err(IllegalMove::WrongPiece {
            named: spec.piece,
            found: piece.kind,
            square: spec.from,
        });
    }

    let promoting = piece.kind == PieceKind::Pawn && spec.to.rank() == promotion_rank(color);
    if spec.promotion.is_some() && !promoting {
        return Err(IllegalMove::BadPromotion);
    }
    let wanted_promotion = if promoting {
        Some(spec.promotion.unwrap_or(PieceKind::Queen))
    } else {
        None
    };

    let mut candidates = Vec::new();
    generate_for_piece(board, spec.from, piece, &mut candidates);

    match candidates
        .into_iter()
        .find(|mv| mv.to == spec.to && mv.promotion == wanted_promotion)
    {
        Some(mv) if leaves_king_in_check(board, color, &mv) => {
            Err(IllegalMove::KingLeftInCheck)
        }
        Some(mv) => Ok(mv),
        None => Err(classify_failure(board, piece, spec)),
    }
}

fn pseudo_legal_moves(board: &Board, color: Color) -> Vec<Move> {
    let mut moves = Vec::new();
    for (from, piece) in board.pieces(color) {
        generate_for_piece(board, from, piece, &mut moves);
    }
    moves
}

fn generate_for_piece(board: &Board, from: Square, piece: Piece, out: &mut Vec<Move>) {
    match piece.kind {
        PieceKind::Pawn => pawn_moves(board, from, piece, out),
        PieceKind::Knight => step_moves(board, from, piece, &KNIGHT_OFFSETS, out),
        PieceKind::Bishop => ray_moves(board, from, piece, &BISHOP_DIRS, out),
        PieceKind::Rook => ray_moves(board, from, piece, &ROOK_DIRS, out),
        PieceKind::Queen => {
            ray_moves(board, from, piece, &ROOK_DIRS, out);
            ray_moves(board, from, piece, &BISHOP_DIRS, out);
        }
        PieceKind::King => {
            step_moves(board, from, piece, &KING_OFFSETS, out);
            castle_moves(board, from, piece, out);
        }
    }
}

fn pawn_moves(board: &Board, from: Square, piece: Piece, out: &mut Vec<Move>) {
    let dir = forward(piece.color);

    if let Some(one) = from.offset(0, dir) {
        if board.piece_at(one).is_none() {
            push_pawn_move(piece, from, one, None, MoveKind::Normal, out);
            if from.rank() == start_rank(piece.color) {
                if let Some(two) = from.offset(0, 2 * dir) {
                    if board.piece_at(two).is_none() {
                        out.push(Move {
                            piece,
                            from,
                            to: two,
                            captures: None,
                            promotion: None,
                            kind: MoveKind::DoublePush,
                        });
                    }
                }
            }
        }
    }

    for df in [-1, 1] {
        let Some(diag) = from.offset(df, dir) else {
            continue;
        };
        match board.piece_at(diag) {
            Some(other) if other.color != piece.color => {
                push_pawn_move(piece, from, diag, Some(other), MoveKind::Normal, out);
            }
            None if board.en_passant() == Some(diag) => {
                out.push(Move {
                    piece,
                    from,
                    to: diag,
                    captures: Some(Piece::new(piece.color.opposite(), PieceKind::Pawn)),
                    promotion: None,
                    kind: MoveKind::EnPassant,
                });
            }
            _ => {}
        }
    }
}

/// Push a pawn advance or capture, fanning out over the promotion choices
/// when the destination is the last rank.
fn push_pawn_move(
    piece: Piece,
    from: Square,
    to: Square,
    captures: Option<Piece>,
    kind: MoveKind,
    out: &mut Vec<Move>,
) {
    if to.rank() == promotion_rank(piece.color) {
        for promotion in PROMOTION_KINDS {
            out.push(Move {
                piece,
                from,
                to,
                captures,
                promotion: Some(promotion),
                kind,
            });
        }
    } else {
        out.push(Move {
            piece,
            from,
            to,
            captures,
            promotion: None,
            kind,
        });
    }
}

fn step_moves(
    board: &Board,
    from: Square,
    piece: Piece,
    offsets: &[(i8, i8)],
    out: &mut Vec<Move>,
) {
    for &(df, dr) in offsets {
        let Some(to) = from.offset(df, dr) else {
            continue;
        };
        match board.piece_at(to) {
            Some(other) if other.color == piece.color => {}
            other => out.push(Move {
                piece,
                from,
                to,
                captures: other,
                promotion: None,
                kind: MoveKind::Normal,
            }),
        }
    }
}

fn ray_moves(
    board: &Board,
    from: Square,
    piece: Piece,
    dirs: &[(i8, i8)],
    out: &mut Vec<Move>,
) {
    for &(df, dr) in dirs {
        let mut sq = from;
        while let Some(to) = sq.offset(df, dr) {
            match board.piece_at(to) {
                None => {
                    out.push(Move {
                        piece,
                        from,
                        to,
                        captures: None,
                        promotion: None,
                        kind: MoveKind::Normal,
                    });
                    sq = to;
                }
                Some(other) => {
                    if other.color != piece.color {
                        out.push(Move {
                            piece,
                            from,
                            to,
                            captures: Some(other),
                            promotion: None,
                            kind: MoveKind::Normal,
                        });
                    }
                    break;
                }
            }
        }
    }
}

fn castle_moves(board: &Board, from: Square, piece: Piece, out: &mut Vec<Move>) {
    let home = home_rank(piece.color);
    if from.file() != 5 || from.rank() != home {
        return;
    }
    // Castling out of check is never legal.
    if is_attacked(board, piece.color.opposite(), from) {
        return;
    }
    let enemy = piece.color.opposite();
    let rook = Piece::new(piece.color, PieceKind::Rook);

    if board.castling().kingside(piece.color) {
        let crossings = (from.offset(1, 0), from.offset(2, 0), from.offset(3, 0));
        if let (Some(f), Some(g), Some(h)) = crossings {
            if board.piece_at(f).is_none()
                && board.piece_at(g).is_none()
                && board.piece_at(h) == Some(rook)
                && !is_attacked(board, enemy, f)
                && !is_attacked(board, enemy, g)
            {
                out.push(Move {
                    piece,
                    from,
                    to: g,
                    captures: None,
                    promotion: None,
                    kind: MoveKind::CastleKingside,
                });
            }
        }
    }

    if board.castling().queenside(piece.color) {
        let crossings = (
            from.offset(-1, 0),
            from.offset(-2, 0),
            from.offset(-3, 0),
            from.offset(-4, 0),
        );
        if let (Some(d), Some(c), Some(b), Some(a)) = crossings {
            if board.piece_at(d).is_none()
                && board.piece_at(c).is_none()
                && board.piece_at(b).is_none()
                && board.piece_at(a) == Some(rook)
                && !is_attacked(board, enemy, d)
                && !is_attacked(board, enemy, c)
            {
                out.push(Move {
                    piece,
                    from,
                    to: c,
                    captures: None,
                    promotion: None,
                    kind: MoveKind::CastleQueenside,
                });
            }
        }
    }
}

/// Name the reason a candidate that matched no generated move is illegal.
fn classify_failure(board: &Board, piece: Piece, spec: &MoveSpec) -> IllegalMove {
    let (from, to) = (spec.from, spec.to);

    if piece.kind == PieceKind::King
        && from.rank() == to.rank()
        && (to.file() as i8 - from.file() as i8).abs() == 2
    {
        return IllegalMove::CastlingUnavailable;
    }

    if let Some(other) = board.piece_at(to) {
        if other.color == piece.color {
            return IllegalMove::FriendlyCapture(to);
        }
    }

    if !reachable_on_empty_board(piece, from, to) {
        return IllegalMove::Unreachable {
            piece: piece.kind,
            from,
            to,
        };
    }

    // Pawn diagonals are capture-only; everything else that has the right
    // shape but no generated move is blocked along the way.
    if piece.kind == PieceKind::Pawn
        && from.file() != to.file()
        && board.piece_at(to).is_none()
    {
        return IllegalMove::NothingToCapture(to);
    }
    IllegalMove::Blocked { from, to }
}

/// Pure movement shape, ignoring every other piece.
fn reachable_on_empty_board(piece: Piece, from: Square, to: Square) -> bool {
    let df = to.file() as i8 - from.file() as i8;
    let dr = to.rank() as i8 - from.rank() as i8;
    if (df, dr) == (0, 0) {
        return false;
    }
    match piece.kind {
        PieceKind::Pawn => {
            let dir = forward(piece.color);
            (df == 0 && dr == dir)
                || (df == 0 && dr == 2 * dir && from.rank() == start_rank(piece.color))
                || (df.abs() == 1 && dr == dir)
        }
        PieceKind::Knight => KNIGHT_OFFSETS.contains(&(df, dr)),
        PieceKind::Bishop => df.abs() == dr.abs(),
        PieceKind::Rook => df == 0 || dr == 0,
        PieceKind::Queen => df == 0 || dr == 0 || df.abs() == dr.abs(),
        PieceKind::King => df.abs() <= 1 && dr.abs() <= 1,
    }
}
