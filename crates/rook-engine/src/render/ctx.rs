/// Target for drawing (encoder + color view + drawable size).
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
    /// Framebuffer size in physical pixels; drives the pass viewport.
    pub size: (u32, u32),
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(
        encoder: &'a mut wgpu::CommandEncoder,
        color_view: &'a wgpu::TextureView,
        size: (u32, u32),
    ) -> Self {
        Self { encoder, color_view, size }
    }
}
