//! Rook engine crate.
//!
//! Owns the platform and GPU runtime pieces used by the viewer: the window
//! loop, the wgpu device and surface, shader and texture creation, and the
//! graphics seam the viewer draws through.

pub mod core;
pub mod device;
pub mod logging;
pub mod paint;
pub mod render;
pub mod scene;
pub mod window;
