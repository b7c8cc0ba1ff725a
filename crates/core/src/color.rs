//! 8-bit color samples and the procedural HSL color field.
//!
//! The field maps the x axis to hue in [0, 360] degrees and the y axis to
//! lightness in [0, 1], at full saturation. It sweeps every hue from black
//! to white, which makes quantization banding of each channel easy to see
//! once the image is stored at reduced precision.
//!
//! All arithmetic is single-precision and channel values are truncated
//! toward zero, matching the reference conversion the repro was written
//! against.

use serde::{Deserialize, Serialize};

use crate::buffer::ColorBuffer;
use crate::error::ReproError;

/// One RGBA color sample with 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const BLACK: Rgba8 = Rgba8::new(0, 0, 0, 255);
    pub const WHITE: Rgba8 = Rgba8::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Channels in memory order (r, g, b, a).
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub const fn from_array(v: [u8; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<[u8; 4]> for Rgba8 {
    fn from(v: [u8; 4]) -> Self {
        Self::from_array(v)
    }
}

/// Converts a fully saturated HSL color to opaque RGBA8.
///
/// `hue` is in degrees and expected in [0, 360]; `lightness` in [0, 1].
/// The hue circle is split into three 120 degree bands, each channel ramping
/// linearly inside its band. Lightness below 0.5 scales the saturated color
/// toward black, above 0.5 blends it toward white.
pub fn hsl_to_rgba(hue: f32, lightness: f32) -> Rgba8 {
    let h = hue;
    let l = lightness;

    let (sat_r, sat_g, sat_b) = if h < 120.0 {
        ((120.0 - h) / 60.0, h / 60.0, 0.0)
    } else if h < 240.0 {
        (0.0, (240.0 - h) / 60.0, (h - 120.0) / 60.0)
    } else {
        ((h - 240.0) / 60.0, 0.0, (360.0 - h) / 60.0)
    };

    let channel = |sat: f32| -> u8 {
        let ctmp = 2.0 * sat.clamp(0.0, 1.0);
        let c = if l < 0.5 {
            l * ctmp
        } else {
            (1.0 - l) * ctmp + 2.0 * l - 1.0
        };
        // `as` truncates toward zero and saturates, so the clamp only guards
        // against rounding past 1.0.
        (c.clamp(0.0, 1.0) * 255.0) as u8
    };

    Rgba8::new(channel(sat_r), channel(sat_g), channel(sat_b), 255)
}

/// Procedural color field over a fixed `width x height` image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorField {
    width: usize,
    height: usize,
}

impl ColorField {
    /// Creates a field for an image of the given size.
    ///
    /// Returns `ReproError::InvalidDimensions` if either dimension is zero
    /// or if `width * height` overflows `usize`.
    pub fn new(width: usize, height: usize) -> Result<Self, ReproError> {
        if width == 0 || height == 0 {
            return Err(ReproError::InvalidDimensions);
        }
        width
            .checked_mul(height)
            .ok_or(ReproError::InvalidDimensions)?;
        Ok(Self { width, height })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Hue in degrees for column `x`: 0 at the first column, 360 at the last.
    ///
    /// A one-pixel-wide field has a single column at hue 0.
    pub fn hue_at(&self, x: usize) -> f32 {
        let span = (self.width - 1).max(1) as f32;
        x as f32 * 360.0 / span
    }

    /// Lightness for row `y`: 0 at the first row, 1 at the last.
    pub fn lightness_at(&self, y: usize) -> f32 {
        let span = (self.height - 1).max(1) as f32;
        y as f32 / span
    }

    /// Color of pixel `(x, y)`.
    pub fn sample(&self, x: usize, y: usize) -> Rgba8 {
        hsl_to_rgba(self.hue_at(x), self.lightness_at(y))
    }

    /// Generates the full image in row-major order, row 0 first.
    pub fn generate(&self) -> ColorBuffer {
        let pixels = (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| (x, y)))
            .map(|(x, y)| self.sample(x, y))
            .collect();
        ColorBuffer::from_parts(self.width, self.height, pixels)
    }
}
