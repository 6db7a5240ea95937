//! Where every texture comes from and how it is sampled.

use std::path::{Path, PathBuf};

use rook_board::{Piece, TileColor};
use rook_engine::render::Sampling;

#[derive(Debug, Clone, PartialEq)]
pub struct AssetSpec {
    pub label: String,
    pub path: PathBuf,
    pub sampling: Sampling,
}

/// The textures one board needs: two tile colors, plus one image per piece
/// when pieces are shown.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetManifest {
    pub light_tile: AssetSpec,
    pub dark_tile: AssetSpec,
    /// Indexed by [`Piece::index`]. Empty for a board-only manifest.
    pub pieces: Vec<AssetSpec>,
}

impl AssetManifest {
    pub fn new(root: &Path, include_pieces: bool) -> Self {
        let tile = |name: &str| AssetSpec {
            label: name.to_string(),
            path: root.join(format!("{name}.jpg")),
            sampling: Sampling::NEAREST,
        };

        let pieces = if include_pieces {
            Piece::all()
                .map(|piece| AssetSpec {
                    label: piece.to_string(),
                    path: root.join("pieces").join(format!("{piece}.png")),
                    sampling: Sampling::LINEAR,
                })
                .collect()
        } else {
            Vec::new()
        };

        Self {
            light_tile: tile("white_tile"),
            dark_tile: tile("black_tile"),
            pieces,
        }
    }

    pub fn tile(&self, color: TileColor) -> &AssetSpec {
        match color {
            TileColor::Light => &self.light_tile,
            TileColor::Dark => &self.dark_tile,
        }
    }

    /// Number of textures to upload: both tiles plus the pieces.
    pub fn len(&self) -> usize {
        2 + self.pieces.len()
    }
}
