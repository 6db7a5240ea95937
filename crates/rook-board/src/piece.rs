use core::fmt;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::White, Side::Black];

    pub const fn name(self) -> &'static str {
        match self {
            Side::White => "white",
            Side::Black => "black",
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            PieceKind::Pawn => "pawn",
            PieceKind::Knight => "knight",
            PieceKind::Bishop => "bishop",
            PieceKind::Rook => "rook",
            PieceKind::Queen => "queen",
            PieceKind::King => "king",
        }
    }
}

/// A piece is a kind plus the side that owns it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Piece {
    pub side: Side,
    pub kind: PieceKind,
}

impl Piece {
    /// Number of distinct pieces (kinds × sides).
    pub const COUNT: usize = 12;

    #[inline]
    pub const fn new(side: Side, kind: PieceKind) -> Self {
        Self { side, kind }
    }

    /// Every distinct piece, white first, in [`PieceKind::ALL`] order.
    pub fn all() -> impl Iterator<Item = Piece> {
        Side::ALL
            .into_iter()
            .flat_map(|side| PieceKind::ALL.into_iter().map(move |kind| Piece::new(side, kind)))
    }

    /// Dense index in `[0, Piece::COUNT)`, matching the order of [`Piece::all`].
    #[inline]
    pub const fn index(self) -> usize {
        let side = match self.side {
            Side::White => 0,
            Side::Black => 1,
        };
        side * PieceKind::ALL.len() + self.kind as usize
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.side.name(), self.kind.name())
    }
}
