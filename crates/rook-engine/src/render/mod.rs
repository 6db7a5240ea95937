//! GPU rendering subsystem.
//!
//! Convention:
//! - every draw is the shared unit quad placed by a `model` matrix
//! - `view_projection` is the fixed `[-1, 1]` orthographic box
//! - textures are sampled through group 1 (`texture1`)
//!
//! The viewer talks to the GPU only through the [`Graphics`] trait; the wgpu
//! implementation lives in [`wgpu_graphics`].

mod ctx;
mod graphics;
pub mod mesh;
pub mod shader;
pub mod texture;
pub mod wgpu_graphics;

pub use ctx::RenderTarget;
pub use graphics::{
    FrameOutcome, FrameSubmission, Graphics, GraphicsError, MeshId, ProgramId, TextureId,
};
pub use mesh::{MeshData, Vertex};
pub use shader::{ShaderError, ShaderProgram, ShaderStage};
pub use texture::{FilterMode, ImageData, Sampling, TextureError};
pub use wgpu_graphics::{GpuResources, WgpuGraphics};
