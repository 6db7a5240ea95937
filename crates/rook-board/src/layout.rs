use crate::grid::{Grid, Tile, TILE_COUNT};

/// Center of tile `index` along one axis, in normalized device coordinates.
///
/// The board spans `[-1, 1]` on both axes. `index` counts from the low edge,
/// so `index_offset = index - tile_count / 2` ranges over
/// `[-tile_count / 2, tile_count / 2)` and
///
/// ```text
/// coord = index_offset / (tile_count / 2) + 0.5 / (tile_count / 2)
/// ```
#[inline]
pub fn tile_center(index: usize, tile_count: usize) -> f32 {
    let half = tile_count as f32 / 2.0;
    let offset = index as f32 - half;
    let center = 0.5 / half;
    offset / half + center
}

/// Precomputed tile centers for the whole board.
///
/// The projection is a fixed `[-1, 1]` box, so the layout never depends on the
/// window size and is computed once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardLayout {
    centers: Grid<[f32; 2]>,
    tile_scale: f32,
}

impl BoardLayout {
    pub fn new() -> Self {
        Self {
            centers: Grid::from_fn(|t| {
                [tile_center(t.x(), TILE_COUNT), tile_center(t.y(), TILE_COUNT)]
            }),
            tile_scale: 1.0 / (TILE_COUNT as f32 / 2.0),
        }
    }

    /// NDC position of the center of `tile`.
    #[inline]
    pub fn center(&self, tile: Tile) -> [f32; 2] {
        self.centers[tile]
    }

    /// Uniform scale that maps the unit quad onto one tile.
    #[inline]
    pub fn tile_scale(&self) -> f32 {
        self.tile_scale
    }

    pub fn centers(&self) -> &Grid<[f32; 2]> {
        &self.centers
    }
}

impl Default for BoardLayout {
    fn default() -> Self {
        Self::new()
    }
}
