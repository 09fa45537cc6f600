//! Wind noise image bound to `_WindNoiseTexture`.

use std::f64::consts::TAU;
use std::path::Path;

use noise::{NoiseFn, Perlin};

use crate::core::types::Result;
use crate::grass::config::GrassSettings;

/// Side length of the procedural fallback tile
pub const DEFAULT_WIND_TEXTURE_SIZE: u32 = 64;

/// RGBA8 wind noise pixels, uploaded once per initialization.
#[derive(Clone, Debug)]
pub struct WindNoise {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl WindNoise {
    /// Decode an image file
    pub fn load(path: &Path) -> Result<Self> {
        let image = image::open(path)?.to_rgba8();
        let (width, height) = image.dimensions();
        log::info!("Loaded wind noise {} ({}x{})", path.display(), width, height);
        Ok(Self { width, height, rgba: image.into_raw() })
    }

    /// Seamlessly tiling Perlin noise, grayscale in all four channels.
    ///
    /// Each texel samples 4D noise on a torus so the tile wraps on both axes.
    pub fn procedural(size: u32, seed: u32) -> Self {
        let size = size.max(1);
        let perlin = Perlin::new(seed);
        let radius = 1.5;
        let mut rgba = Vec::with_capacity((size * size * 4) as usize);

        for y in 0..size {
            let v = y as f64 / size as f64 * TAU;
            for x in 0..size {
                let u = x as f64 / size as f64 * TAU;
                let n = perlin.get([
                    radius * u.cos(),
                    radius * u.sin(),
                    radius * v.cos(),
                    radius * v.sin(),
                ]);
                let value = ((n * 0.5 + 0.5).clamp(0.0, 1.0) * 255.0).round() as u8;
                rgba.extend_from_slice(&[value; 4]);
            }
        }

        Self { width: size, height: size, rgba }
    }

    /// The settings' image if one is configured, else the procedural tile
    pub fn from_settings(settings: &GrassSettings) -> Result<Self> {
        match &settings.wind_noise_texture {
            Some(path) => Self::load(path),
            None => Ok(Self::procedural(DEFAULT_WIND_TEXTURE_SIZE, 0)),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// Upload as a sampled 2D texture
    pub fn create_texture(&self, device: &wgpu::Device, queue: &wgpu::Queue) -> wgpu::Texture {
        let size = wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("grass_wind_noise"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &self.rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * self.width),
                rows_per_image: Some(self.height),
            },
            size,
        );
        texture
    }
}
