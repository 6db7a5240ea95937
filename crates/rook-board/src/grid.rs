use core::fmt;
use core::ops::{Index, IndexMut};

/// Tiles per board side.
pub const TILE_COUNT: usize = 8;

/// Total number of tiles on the board.
pub const CELL_COUNT: usize = TILE_COUNT * TILE_COUNT;

// The layout math splits the board in two halves around the origin.
const _: () = assert!(TILE_COUNT > 0 && TILE_COUNT % 2 == 0);

/// One square of the board.
///
/// `x` is the file (0 = a) and `y` is the rank (0 = rank 1). Both are always
/// in `[0, TILE_COUNT)`; the only way to build a `Tile` is through checked
/// constructors.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Tile {
    x: u8,
    y: u8,
}

impl Tile {
    /// Returns the tile at `(x, y)`, or `None` when either index is off the board.
    #[inline]
    pub const fn new(x: usize, y: usize) -> Option<Self> {
        if x < TILE_COUNT && y < TILE_COUNT {
            Some(Self { x: x as u8, y: y as u8 })
        } else {
            None
        }
    }

    /// Inverse of [`Tile::index`].
    #[inline]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < CELL_COUNT {
            Self::new(index % TILE_COUNT, index / TILE_COUNT)
        } else {
            None
        }
    }

    #[inline]
    pub const fn x(self) -> usize {
        self.x as usize
    }

    #[inline]
    pub const fn y(self) -> usize {
        self.y as usize
    }

    /// Flat row-major index: `y * TILE_COUNT + x`.
    #[inline]
    pub const fn index(self) -> usize {
        self.y() * TILE_COUNT + self.x()
    }

    /// Neighbor one file to the right, if any.
    #[inline]
    pub const fn right(self) -> Option<Self> {
        Self::new(self.x() + 1, self.y())
    }

    /// Neighbor one rank up, if any.
    #[inline]
    pub const fn up(self) -> Option<Self> {
        Self::new(self.x(), self.y() + 1)
    }

    /// Iterates every tile rows first (rank 0 files a..h, then rank 1, ...).
    pub fn all() -> impl Iterator<Item = Tile> {
        (0..CELL_COUNT).filter_map(Tile::from_index)
    }
}

impl fmt::Display for Tile {
    /// Algebraic square name, e.g. `a1`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.x) as char, self.y + 1)
    }
}

/// Fixed-size board container backed by one flat array.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    cells: [T; CELL_COUNT],
}

impl<T> Grid<T> {
    /// Builds a grid by evaluating `f` once per tile.
    pub fn from_fn(mut f: impl FnMut(Tile) -> T) -> Self {
        Self {
            cells: core::array::from_fn(|i| {
                let tile = Tile { x: (i % TILE_COUNT) as u8, y: (i / TILE_COUNT) as u8 };
                f(tile)
            }),
        }
    }

    #[inline]
    pub fn get(&self, tile: Tile) -> &T {
        &self.cells[tile.index()]
    }

    /// Iterates `(tile, value)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Tile, &T)> {
        Tile::all().zip(self.cells.iter())
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }
}

impl<T: Copy> Grid<T> {
    #[inline]
    pub fn filled(value: T) -> Self {
        Self { cells: [value; CELL_COUNT] }
    }
}

impl<T> Index<Tile> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, tile: Tile) -> &T {
        self.get(tile)
    }
}

impl<T> IndexMut<Tile> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, tile: Tile) -> &mut T {
        &mut self.cells[tile.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_off_board() {
        assert!(Tile::new(8, 0).is_none());
        assert!(Tile::new(0, 8).is_none());
        assert!(Tile::new(7, 7).is_some());
    }

    #[test]
    fn index_is_row_major() {
        let t = Tile::new(3, 2).unwrap();
        assert_eq!(t.index(), 2 * 8 + 3);
        assert_eq!(Tile::from_index(t.index()), Some(t));
        assert!(Tile::from_index(CELL_COUNT).is_none());
    }

    #[test]
    fn all_visits_rows_then_columns() {
        let tiles: Vec<Tile> = Tile::all().collect();
        assert_eq!(tiles.len(), CELL_COUNT);
        assert_eq!(tiles[0], Tile::new(0, 0).unwrap());
        assert_eq!(tiles[1], Tile::new(1, 0).unwrap());
        assert_eq!(tiles[8], Tile::new(0, 1).unwrap());
        assert_eq!(tiles[63], Tile::new(7, 7).unwrap());
    }

    #[test]
    fn display_uses_square_names() {
        assert_eq!(Tile::new(0, 0).unwrap().to_string(), "a1");
        assert_eq!(Tile::new(4, 3).unwrap().to_string(), "e4");
        assert_eq!(Tile::new(7, 7).unwrap().to_string(), "h8");
    }

    #[test]
    fn neighbors_stop_at_the_edge() {
        let h1 = Tile::new(7, 0).unwrap();
        assert!(h1.right().is_none());
        assert_eq!(h1.up(), Tile::new(7, 1));
        assert!(Tile::new(0, 7).unwrap().up().is_none());
    }

    #[test]
    fn grid_from_fn_matches_index() {
        let grid = Grid::from_fn(|t| t.index());
        for (tile, value) in grid.iter() {
            assert_eq!(*value, tile.index());
            assert_eq!(grid[tile], tile.index());
        }
    }

    #[test]
    fn grid_index_mut_writes_one_cell() {
        let mut grid = Grid::filled(0u8);
        let e4 = Tile::new(4, 3).unwrap();
        grid[e4] = 9;
        assert_eq!(grid.as_slice().iter().filter(|&&v| v == 9).count(), 1);
        assert_eq!(grid[e4], 9);
    }
}
