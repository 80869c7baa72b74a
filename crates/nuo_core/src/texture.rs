//! Diffuse textures and the sampler state used to read them.
//!
//! Textures hold linear RGBA floats. Texture coordinates follow the GPU
//! convention: (0, 0) is the first texel of the first row and texel centers
//! sit at half-integer positions.

use nuo_math::{Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when building a texture.
#[derive(Error, Debug, PartialEq)]
pub enum TextureError {
    #[error("Texture has zero size ({width}x{height})")]
    Empty { width: u32, height: u32 },

    #[error("Pixel count mismatch: expected {expected}, got {actual}")]
    PixelCountMismatch { expected: usize, actual: usize },
}

pub type TextureResult<T> = Result<T, TextureError>;

/// How coordinates outside [0, 1] are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressMode {
    #[default]
    Repeat,
    ClampToEdge,
}

/// Texel filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    Nearest,
    #[default]
    Linear,
}

/// Sampler state shared by all texture reads of a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Sampler {
    pub address_mode: AddressMode,
    pub filter: Filter,
}

impl Sampler {
    pub fn new(address_mode: AddressMode, filter: Filter) -> Self {
        Self {
            address_mode,
            filter,
        }
    }

    /// Resolve a possibly out-of-range texel index.
    fn texel(&self, i: i64, size: u32) -> u32 {
        let size = size as i64;
        match self.address_mode {
            AddressMode::Repeat => i.rem_euclid(size) as u32,
            AddressMode::ClampToEdge => i.clamp(0, size - 1) as u32,
        }
    }
}

/// A texture with linear RGBA pixel data.
#[derive(Clone, Debug)]
pub struct Texture {
    /// Texture width in pixels
    pub width: u32,

    /// Texture height in pixels
    pub height: u32,

    /// Pixel data in RGBA format (linear), row-major
    pub pixels: Vec<[f32; 4]>,

    /// Name for diagnostics
    pub name: String,
}

impl Texture {
    /// Create a new texture from linear pixel data.
    pub fn new(
        width: u32,
        height: u32,
        pixels: Vec<[f32; 4]>,
        name: impl Into<String>,
    ) -> TextureResult<Self> {
        if width == 0 || height == 0 {
            return Err(TextureError::Empty { width, height });
        }

        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(TextureError::PixelCountMismatch {
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            pixels,
            name: name.into(),
        })
    }

    /// Create a solid color texture (1x1).
    pub fn solid_color(color: Vec3) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![[color.x, color.y, color.z, 1.0]],
            name: "<solid>".to_string(),
        }
    }

    /// Sample the texture at `uv`.
    pub fn sample(&self, sampler: &Sampler, uv: Vec2) -> Vec4 {
        let x = uv.x * self.width as f32;
        let y = uv.y * self.height as f32;

        match sampler.filter {
            Filter::Nearest => {
                let tx = sampler.texel(x.floor() as i64, self.width);
                let ty = sampler.texel(y.floor() as i64, self.height);
                self.pixel(tx, ty)
            }
            Filter::Linear => {
                // Shift so that texel centers land on integers
                let x = x - 0.5;
                let y = y - 0.5;
                let fx = x - x.floor();
                let fy = y - y.floor();
                let x0 = x.floor() as i64;
                let y0 = y.floor() as i64;

                let tx0 = sampler.texel(x0, self.width);
                let tx1 = sampler.texel(x0 + 1, self.width);
                let ty0 = sampler.texel(y0, self.height);
                let ty1 = sampler.texel(y0 + 1, self.height);

                let top = self.pixel(tx0, ty0).lerp(self.pixel(tx1, ty0), fx);
                let bottom = self.pixel(tx0, ty1).lerp(self.pixel(tx1, ty1), fx);
                top.lerp(bottom, fy)
            }
        }
    }

    /// Get pixel at integer coordinates.
    fn pixel(&self, x: u32, y: u32) -> Vec4 {
        Vec4::from_array(self.pixels[(y * self.width + x) as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> Texture {
        // 2x2: black, white / white, black
        Texture::new(
            2,
            2,
            vec![
                [0.0, 0.0, 0.0, 1.0],
                [1.0, 1.0, 1.0, 1.0],
                [1.0, 1.0, 1.0, 1.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
            "checker",
        )
        .unwrap()
    }

    #[test]
    fn test_solid_color_texture() {
        let tex = Texture::solid_color(Vec3::new(1.0, 0.5, 0.0));
        for sampler in [
            Sampler::default(),
            Sampler::new(AddressMode::ClampToEdge, Filter::Nearest),
        ] {
            let sample = tex.sample(&sampler, Vec2::new(0.3, 0.8));
            assert!((sample - Vec4::new(1.0, 0.5, 0.0, 1.0)).length() < 0.001);
        }
    }

    #[test]
    fn test_nearest_hits_texel() {
        let tex = checker();
        let nearest = Sampler::new(AddressMode::Repeat, Filter::Nearest);

        assert_eq!(tex.sample(&nearest, Vec2::new(0.25, 0.25)).x, 0.0);
        assert_eq!(tex.sample(&nearest, Vec2::new(0.75, 0.25)).x, 1.0);
        assert_eq!(tex.sample(&nearest, Vec2::new(0.25, 0.75)).x, 1.0);
        // Repeat wraps
        assert_eq!(tex.sample(&nearest, Vec2::new(1.25, -0.75)).x, 0.0);
    }

    #[test]
    fn test_linear_at_texel_center_is_exact() {
        let tex = checker();
        let linear = Sampler::new(AddressMode::ClampToEdge, Filter::Linear);

        assert!(tex.sample(&linear, Vec2::new(0.75, 0.25)).x > 0.999);
        assert!(tex.sample(&linear, Vec2::new(0.25, 0.25)).x < 0.001);
    }

    #[test]
    fn test_linear_blends_between_texels() {
        let tex = checker();
        let linear = Sampler::new(AddressMode::ClampToEdge, Filter::Linear);

        let mid = tex.sample(&linear, Vec2::new(0.5, 0.25));
        assert!((mid.x - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_texture_validation() {
        assert_eq!(
            Texture::new(0, 4, vec![], "empty").unwrap_err(),
            TextureError::Empty {
                width: 0,
                height: 4
            }
        );
        assert_eq!(
            Texture::new(2, 2, vec![[0.0; 4]; 3], "short").unwrap_err(),
            TextureError::PixelCountMismatch {
                expected: 4,
                actual: 3
            }
        );
    }
}
