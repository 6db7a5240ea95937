/// Straight-alpha RGBA color with `f32` channels in `[0, 1]`.
///
/// Used for the framebuffer clear color; textures carry their own pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);

    #[inline]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Clamps every channel to `[0, 1]`.
    #[inline]
    pub fn clamped(self) -> Self {
        Self::rgba(
            self.r.clamp(0.0, 1.0),
            self.g.clamp(0.0, 1.0),
            self.b.clamp(0.0, 1.0),
            self.a.clamp(0.0, 1.0),
        )
    }

    #[inline]
    pub fn to_wgpu(self) -> wgpu::Color {
        let c = self.clamped();
        wgpu::Color { r: c.r as f64, g: c.g as f64, b: c.b as f64, a: c.a as f64 }
    }
}
