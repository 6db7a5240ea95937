//! Board model for the rook viewer.
//!
//! Everything here is a pure function of constants: the tile grid, where each
//! tile sits in normalized device coordinates, which color it is, and which
//! piece starts on it. Nothing in this crate changes after construction.

mod color;
mod grid;
mod layout;
mod piece;
mod placement;

pub use color::{tile_color, TileColor};
pub use grid::{Grid, Tile, CELL_COUNT, TILE_COUNT};
pub use layout::{tile_center, BoardLayout};
pub use piece::{Piece, PieceKind, Side};
pub use placement::{PiecePlacement, BACK_RANK};
