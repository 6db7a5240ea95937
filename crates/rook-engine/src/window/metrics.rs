use winit::dpi::{LogicalSize, PhysicalSize};
use winit::window::Window;

/// Cached window dimensions, updated by the resize handlers.
///
/// The logical size is what the user asked for; the framebuffer size is what
/// the surface is configured with and what the viewport covers.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WindowMetrics {
    framebuffer: PhysicalSize<u32>,
    scale_factor: f64,
}

impl WindowMetrics {
    pub fn new(framebuffer: PhysicalSize<u32>, scale_factor: f64) -> Self {
        Self { framebuffer, scale_factor }
    }

    pub fn from_window(window: &Window) -> Self {
        Self::new(window.inner_size(), window.scale_factor())
    }

    /// Framebuffer changed size.
    pub fn resize(&mut self, framebuffer: PhysicalSize<u32>) {
        self.framebuffer = framebuffer;
    }

    /// Moved to a display with a different scale factor.
    pub fn rescale(&mut self, scale_factor: f64, framebuffer: PhysicalSize<u32>) {
        self.scale_factor = scale_factor;
        self.framebuffer = framebuffer;
    }

    pub fn logical_size(&self) -> LogicalSize<f64> {
        self.framebuffer.to_logical(self.scale_factor)
    }

    pub fn framebuffer_size(&self) -> PhysicalSize<u32> {
        self.framebuffer
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// False while minimized (either dimension is zero).
    pub fn is_drawable(&self) -> bool {
        self.framebuffer.width > 0 && self.framebuffer.height > 0
    }
}
