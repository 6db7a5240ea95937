use crate::grid::Tile;

/// Square color.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TileColor {
    Dark,
    Light,
}

/// Color of `tile`.
///
/// The sense of the file parity flips on every rank, so `a1` is dark and no
/// two orthogonally adjacent tiles share a color.
pub fn tile_color(tile: Tile) -> TileColor {
    let even_file = tile.x() % 2 == 0;
    if tile.y() % 2 != 0 {
        if even_file { TileColor::Light } else { TileColor::Dark }
    } else if even_file {
        TileColor::Dark
    } else {
        TileColor::Light
    }
}
