//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window, and wires them to the GPU layer.

mod metrics;
mod runtime;

pub use metrics::WindowMetrics;
pub use runtime::{LoopState, Runtime, RuntimeConfig};
