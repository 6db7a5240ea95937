use std::path::PathBuf;

use rook_engine::window::RuntimeConfig;
use winit::dpi::LogicalSize;

use crate::assets::AssetManifest;

/// Viewer settings. There are no CLI flags; `Default` is what `main` runs.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub title: String,
    pub window_size: LogicalSize<f64>,
    /// Directory holding the tile images and the `pieces/` folder.
    pub asset_root: PathBuf,
    /// When false only the two tile textures are loaded and no pieces are drawn.
    pub show_pieces: bool,
    /// Piece quad size relative to its tile.
    pub piece_scale: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "Chess".to_string(),
            window_size: LogicalSize::new(720.0, 720.0),
            asset_root: PathBuf::from("assets"),
            show_pieces: true,
            piece_scale: 0.8,
        }
    }
}

impl ViewerConfig {
    pub fn runtime(&self) -> RuntimeConfig {
        RuntimeConfig {
            title: self.title.clone(),
            initial_size: self.window_size,
            resizable: true,
        }
    }

    pub fn manifest(&self) -> AssetManifest {
        AssetManifest::new(&self.asset_root, self.show_pieces)
    }
}
