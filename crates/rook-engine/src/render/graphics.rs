use std::fmt;

use glam::Mat4;

use crate::paint::Color;
use crate::scene::DrawList;

use super::mesh::MeshData;
use super::shader::ShaderProgram;
use super::texture::{ImageData, Sampling};

macro_rules! handle {
    ($(#[$doc:meta])* $name:ident, $kind:literal) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($kind, "#{}"), self.0)
            }
        }
    };
}

handle!(
    /// Opaque handle to GPU-resident pixel data.
    TextureId,
    "texture"
);
handle!(
    /// Opaque handle to a linked shader program (a render pipeline under wgpu).
    ProgramId,
    "program"
);
handle!(
    /// Opaque handle to vertex + index buffers.
    MeshId,
    "mesh"
);

/// Everything needed to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameSubmission<'a> {
    pub clear: Color,
    pub program: ProgramId,
    pub mesh: MeshId,
    pub view_projection: Mat4,
    pub draws: &'a DrawList,
    /// Framebuffer size in physical pixels. Zero in either dimension skips
    /// the frame.
    pub viewport: (u32, u32),
}

/// What happened to a submitted frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameOutcome {
    Presented,
    /// Nothing was drawn this time (minimized window, transient surface error).
    Skipped,
    /// The surface cannot recover; the loop should close.
    Fatal,
}

#[derive(Debug, thiserror::Error)]
pub enum GraphicsError {
    #[error("mesh has no {0}")]
    EmptyMesh(&'static str),

    #[error("texture {label} is {width}x{height}, device limit is {limit}")]
    TextureTooLarge { label: String, width: u32, height: u32, limit: u32 },

    #[error("texture {label} has zero size")]
    EmptyTexture { label: String },
}

/// The graphics collaborator.
///
/// Every `create_*` returns a handle that must be released exactly once with
/// the matching `destroy_*`. Handles are plain values; releasing one twice is
/// a caller bug that implementations report through the log.
pub trait Graphics {
    fn create_mesh(&mut self, mesh: &MeshData) -> Result<MeshId, GraphicsError>;

    fn create_program(&mut self, program: &ShaderProgram) -> Result<ProgramId, GraphicsError>;

    /// Uploads `image` with its full mip chain.
    fn create_texture(
        &mut self,
        label: &str,
        image: &ImageData,
        sampling: Sampling,
    ) -> Result<TextureId, GraphicsError>;

    fn destroy_texture(&mut self, id: TextureId);

    fn destroy_program(&mut self, id: ProgramId);

    fn destroy_mesh(&mut self, id: MeshId);

    /// Clears, draws every quad in `frame.draws` in order, and presents.
    fn draw_frame(&mut self, frame: &FrameSubmission<'_>) -> FrameOutcome;
}
