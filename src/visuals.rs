//! Visual configuration for particle rendering.
//!
//! Colours, blending and the point material a particle field is drawn with.
//! These are separate from the motion parameters in [`crate::profile`] so the
//! renderer never needs to know about weather.

use glam::Vec3;

/// A 24-bit sRGB colour, stored as `0xRRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb(u32);

impl Rgb {
    pub const WHITE: Rgb = Rgb(0xffffff);
    pub const BLACK: Rgb = Rgb(0x000000);

    /// Create a colour from a `0xRRGGBB` literal. Bits above 24 are ignored.
    pub const fn from_hex(hex: u32) -> Self {
        Rgb(hex & 0x00ff_ffff)
    }

    /// The `0xRRGGBB` value.
    #[inline]
    pub const fn hex(&self) -> u32 {
        self.0
    }

    /// Individual 8-bit channels.
    pub const fn channels(&self) -> [u8; 3] {
        [(self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8]
    }

    /// sRGB components in `0.0..=1.0`.
    pub fn to_vec3(&self) -> Vec3 {
        let [r, g, b] = self.channels();
        Vec3::new(r as f32, g as f32, b as f32) / 255.0
    }

    /// Linear-light components, for clear colours on sRGB render targets.
    pub fn to_linear(&self) -> Vec3 {
        let c = self.to_vec3();
        Vec3::new(srgb_to_linear(c.x), srgb_to_linear(c.y), srgb_to_linear(c.z))
    }
}

impl From<u32> for Rgb {
    fn from(hex: u32) -> Self {
        Rgb::from_hex(hex)
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Blend mode for particle rendering.
///
/// Controls how overlapping particles combine with what is already on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Additive blending.
    ///
    /// Particle colours are added together; dense rain and snow glow where
    /// particles overlap.
    #[default]
    Additive,
}

impl BlendMode {
    /// The matching wgpu blend state.
    pub fn to_blend_state(&self) -> wgpu::BlendState {
        match self {
            BlendMode::Additive => wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::SrcAlpha,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
                alpha: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::One,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
            },
        }
    }
}

/// Point material shared by every particle in a field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Particle colour.
    pub color: Rgb,
    /// Point size in world units.
    pub size: f32,
    /// Opacity applied to every particle.
    pub opacity: f32,
    /// How particles combine with the framebuffer.
    pub blend_mode: BlendMode,
    /// Whether the material is drawn with transparency at all.
    pub transparent: bool,
}

impl Material {
    /// Opacity used for every weather field.
    pub const DEFAULT_OPACITY: f32 = 0.8;

    /// Transparent additive point material.
    pub fn points(color: Rgb, size: f32) -> Self {
        Self {
            color,
            size,
            opacity: Self::DEFAULT_OPACITY,
            blend_mode: BlendMode::Additive,
            transparent: true,
        }
    }
}
