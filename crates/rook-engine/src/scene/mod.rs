//! Scene (draw stream) types.
//!
//! A frame is recorded as an ordered list of textured quads. The list is
//! renderer-agnostic: it names textures by [`TextureId`](crate::render::TextureId)
//! and places quads with a model matrix.

mod list;

pub use list::{DrawList, QuadDraw};
