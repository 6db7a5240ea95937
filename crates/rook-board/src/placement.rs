use crate::grid::{Grid, Tile, TILE_COUNT};
use crate::piece::{Piece, PieceKind, Side};

/// Back rank order from file a to file h.
pub const BACK_RANK: [PieceKind; TILE_COUNT] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// Which piece stands on which tile.
///
/// Only the starting snapshot exists; there is no move application.
#[derive(Debug, Clone, PartialEq)]
pub struct PiecePlacement {
    squares: Grid<Option<Piece>>,
}

impl PiecePlacement {
    /// Board with no pieces.
    pub fn empty() -> Self {
        Self { squares: Grid::filled(None) }
    }

    /// Standard starting position: white on ranks 0 and 1, black on 6 and 7.
    pub fn starting() -> Self {
        let squares = Grid::from_fn(|t| {
            let file = t.x();
            match t.y() {
                0 => Some(Piece::new(Side::White, BACK_RANK[file])),
                1 => Some(Piece::new(Side::White, PieceKind::Pawn)),
                6 => Some(Piece::new(Side::Black, PieceKind::Pawn)),
                7 => Some(Piece::new(Side::Black, BACK_RANK[file])),
                _ => None,
            }
        });
        Self { squares }
    }

    #[inline]
    pub fn piece_at(&self, tile: Tile) -> Option<Piece> {
        self.squares[tile]
    }

    /// Occupied tiles in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = (Tile, Piece)> + '_ {
        self.squares.iter().filter_map(|(t, p)| p.map(|p| (t, p)))
    }
}

impl Default for PiecePlacement {
    fn default() -> Self {
        Self::starting()
    }
}
