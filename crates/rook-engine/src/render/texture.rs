//! Image decoding for texture upload.
//!
//! Images are flipped vertically on load so row 0 is the bottom of the picture,
//! matching the quad's texture coordinates. Pixels are always handed to the
//! GPU as RGBA8; the decoded channel count is kept so callers can tell an
//! opaque RGB asset from one with real alpha.

use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("failed to load texture {}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Texture filter. Wrapping is always repeat.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum FilterMode {
    /// Crisp texels; used for flat board squares.
    Nearest,
    /// Smooth filtering; used for detailed piece art.
    Linear,
}

impl FilterMode {
    pub fn to_wgpu(self) -> wgpu::FilterMode {
        match self {
            FilterMode::Nearest => wgpu::FilterMode::Nearest,
            FilterMode::Linear => wgpu::FilterMode::Linear,
        }
    }
}

/// Sampler settings for one texture.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Sampling {
    pub filter: FilterMode,
}

impl Sampling {
    pub const NEAREST: Self = Self { filter: FilterMode::Nearest };
    pub const LINEAR: Self = Self { filter: FilterMode::Linear };

    #[inline]
    pub fn address_mode(self) -> wgpu::AddressMode {
        wgpu::AddressMode::Repeat
    }
}

/// One level of a mip chain, tightly packed RGBA8.
#[derive(Debug, Clone, PartialEq)]
pub struct MipLevel {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Decoded, vertically flipped RGBA8 pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    width: u32,
    height: u32,
    channels: u8,
    rgba: Vec<u8>,
}

impl ImageData {
    /// Decodes the image at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| {
            log::error!("failed to load texture {}: {source}", path.display());
            TextureError::Decode { path: path.to_path_buf(), source }
        })?;

        let data = Self::from_image(img);
        log::debug!(
            "decoded {} ({}x{}, {} channels)",
            path.display(),
            data.width,
            data.height,
            data.channels
        );
        Ok(data)
    }

    /// Flips `img` vertically and expands it to RGBA8.
    pub fn from_image(img: DynamicImage) -> Self {
        let channels = img.color().channel_count();
        let rgba = img.flipv().into_rgba8();
        let (width, height) = rgba.dimensions();
        Self { width, height, channels, rgba: rgba.into_raw() }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Channel count reported by the decoder (1–4), before RGBA expansion.
    #[inline]
    pub fn channels(&self) -> u8 {
        self.channels
    }

    #[inline]
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// Number of levels down to 1×1.
    pub fn mip_level_count(&self) -> u32 {
        let largest = self.width.max(self.height).max(1);
        u32::BITS - largest.leading_zeros()
    }

    /// Full mip chain, level 0 first. Each level is a box-ish downsample of the
    /// previous one.
    pub fn mip_chain(&self) -> Vec<MipLevel> {
        let count = self.mip_level_count() as usize;
        let mut levels = Vec::with_capacity(count);
        levels.push(MipLevel { width: self.width, height: self.height, rgba: self.rgba.clone() });

        while levels.len() < count {
            let Some(prev) = levels.last() else { break };
            let Some(prev_img) = RgbaImage::from_raw(prev.width, prev.height, prev.rgba.clone())
            else {
                break;
            };
            let w = (prev.width / 2).max(1);
            let h = (prev.height / 2).max(1);
            let next = image::imageops::resize(&prev_img, w, h, FilterType::Triangle);
            levels.push(MipLevel { width: w, height: h, rgba: next.into_raw() });
        }

        levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba};

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 128]);

    fn two_row_png(dir: &Path) -> PathBuf {
        // Top row red, bottom row blue.
        let img = RgbaImage::from_fn(2, 2, |_, y| if y == 0 { RED } else { BLUE });
        let path = dir.join("rows.png");
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn load_flips_rows() {
        let dir = tempfile::tempdir().unwrap();
        let data = ImageData::load(two_row_png(dir.path())).unwrap();

        assert_eq!((data.width(), data.height()), (2, 2));
        assert_eq!(data.channels(), 4);
        // First uploaded row is the bottom of the picture.
        assert_eq!(&data.rgba()[0..4], &BLUE.0);
        assert_eq!(&data.rgba()[8..12], &RED.0);
    }

    #[test]
    fn rgb_images_report_three_channels_and_become_opaque() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tile.png");
        RgbImage::from_pixel(3, 1, Rgb([10, 20, 30])).save(&path).unwrap();

        let data = ImageData::load(&path).unwrap();
        assert_eq!(data.channels(), 3);
        assert_eq!(data.rgba().len(), 3 * 4);
        assert!(data.rgba().chunks(4).all(|px| px == [10, 20, 30, 255]));
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.png");
        let err = ImageData::load(&path).unwrap_err();

        let TextureError::Decode { path: reported, .. } = &err;
        assert_eq!(reported, &path);
        assert!(err.to_string().contains("nope.png"));
    }

    #[test]
    fn corrupt_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        assert!(matches!(ImageData::load(&path), Err(TextureError::Decode { .. })));
    }

    fn solid(width: u32, height: u32) -> ImageData {
        ImageData::from_image(DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, RED)))
    }

    #[test]
    fn mip_chain_halves_down_to_one_pixel() {
        let data = solid(8, 2);
        assert_eq!(data.mip_level_count(), 4);

        let sizes: Vec<(u32, u32)> =
            data.mip_chain().iter().map(|l| (l.width, l.height)).collect();
        assert_eq!(sizes, vec![(8, 2), (4, 1), (2, 1), (1, 1)]);

        for level in data.mip_chain() {
            assert_eq!(level.rgba.len() as u32, level.width * level.height * 4);
        }
    }

    #[test]
    fn single_pixel_has_one_level() {
        let data = solid(1, 1);
        assert_eq!(data.mip_level_count(), 1);
        assert_eq!(data.mip_chain().len(), 1);
    }
}
