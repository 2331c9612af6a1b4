//! Piece, color and square types shared by the board model, the move parser,
//! and the renderer.
use std::fmt;

/// Side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Light,
    Dark,
}

impl Color {
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Color::Light => Color::Dark,
            Color::Dark => Color::Light,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Light => write!(f, "White"),
            Color::Dark => write!(f, "Black"),
        }
    }
}

/// Piece kind (color is carried separately by [`Piece`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Lowercase letter used by board tokens and UCI promotion suffixes.
    #[inline]
    pub const fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }
}

/// A colored piece occupying one square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

impl Piece {
    #[inline]
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Self { color, kind }
    }

    /// Board token: uppercase for Light, lowercase for Dark.
    pub fn token(self) -> char {
        match self.color {
            Color::Light => self.kind.letter().to_ascii_uppercase(),
            Color::Dark => self.kind.letter(),
        }
    }

    pub fn from_token(token: char) -> Option<Self> {
        let kind = PieceKind::from_letter(token)?;
        let color = if token.is_ascii_uppercase() {
            Color::Light
        } else {
            Color::Dark
        };
        Some(Self { color, kind })
    }
}

/// Grid coordinate: row 0 is rank 8, row 7 is rank 1; col 0 is file a.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Square {
    row: u8,
    col: u8,
}

impl Square {
    #[inline]
    pub const fn new(row: u8, col: u8) -> Option<Self> {
        if row < 8 && col < 8 {
            Some(Self { row, col })
        } else {
            None
        }
    }

    #[inline]
    pub const fn row(self) -> usize {
        self.row as usize
    }

    #[inline]
    pub const fn col(self) -> usize {
        self.col as usize
    }

    /// Same row, different column. `col` must already be on the board.
    #[inline]
    pub(crate) const fn with_col(self, col: u8) -> Self {
        Self { row: self.row, col }
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::utils::algebraic::square_to_algebraic(*self))
    }
}
