use winit::window::{Window, WindowId};

use crate::device::Gpu;
use crate::render::{GpuResources, WgpuGraphics};
use crate::window::WindowMetrics;

/// Per-window handles and window metadata.
pub struct WindowCtx<'a> {
    pub id: WindowId,
    pub window: &'a Window,
    pub metrics: &'a WindowMetrics,
}

impl WindowCtx<'_> {
    /// Framebuffer size in physical pixels.
    pub fn framebuffer_size(&self) -> (u32, u32) {
        let size = self.metrics.framebuffer_size();
        (size.width, size.height)
    }
}

/// Context passed to every [`App`](super::App) callback.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a mut Gpu<'w>,
    pub resources: &'a mut GpuResources,
}

impl<'w> FrameCtx<'_, 'w> {
    /// Graphics collaborator for this window.
    pub fn graphics(&mut self) -> WgpuGraphics<'_, 'w> {
        self.resources.bind(self.gpu).with_window(self.window.window)
    }
}
