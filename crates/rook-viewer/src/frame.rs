//! Per-frame composition: turns the board model into an ordered draw list.

use glam::{Mat4, Vec3};

use rook_board::{tile_color, BoardLayout, PiecePlacement, Tile};
use rook_engine::scene::DrawList;

use crate::resources::BoardResources;

/// Fixed camera box covering `[-1, 1]` on every axis.
pub fn view_projection() -> Mat4 {
    Mat4::orthographic_rh(-1.0, 1.0, -1.0, 1.0, -1.0, 1.0)
}

/// Moves the unit quad onto `tile` and scales it to the tile size.
pub fn tile_model(layout: &BoardLayout, tile: Tile) -> Mat4 {
    let [x, y] = layout.center(tile);
    let scale = Mat4::from_scale(Vec3::splat(layout.tile_scale()));
    Mat4::from_translation(Vec3::new(x, y, 0.0)) * scale
}

/// Tile model shrunk by `piece_scale` around the tile center.
pub fn piece_model(layout: &BoardLayout, tile: Tile, piece_scale: f32) -> Mat4 {
    tile_model(layout, tile) * Mat4::from_scale(Vec3::splat(piece_scale))
}

/// Refills `draws` for one frame.
///
/// Rows first, then columns. Each tile is followed directly by the piece
/// standing on it, if pieces were loaded.
pub fn compose_frame(
    draws: &mut DrawList,
    layout: &BoardLayout,
    placement: &PiecePlacement,
    resources: &BoardResources,
    piece_scale: f32,
) {
    draws.clear();
    for tile in Tile::all() {
        draws.push(resources.tile_texture(tile_color(tile)), tile_model(layout, tile));

        let Some(piece) = placement.piece_at(tile) else {
            continue;
        };
        if let Some(texture) = resources.piece_texture(piece) {
            draws.push(texture, piece_model(layout, tile, piece_scale));
        }
    }
}
