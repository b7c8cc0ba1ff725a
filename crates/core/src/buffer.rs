//! Full-image buffers: the 8-bit reference and its packed counterpart.
//!
//! Both buffers are row-major with row 0 first, which is also the bottom row
//! once uploaded to GL.

use crate::color::Rgba8;
use crate::error::ReproError;
use crate::format::PackedFormat;
use crate::pack;

fn checked_len(width: usize, height: usize) -> Result<usize, ReproError> {
    if width == 0 || height == 0 {
        return Err(ReproError::InvalidDimensions);
    }
    width
        .checked_mul(height)
        .ok_or(ReproError::InvalidDimensions)
}

/// A `width x height` image of 8-bit RGBA samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgba8>,
}

impl ColorBuffer {
    /// Wraps `pixels` as an image.
    ///
    /// Returns `ReproError::InvalidDimensions` for a zero or overflowing size
    /// and `ReproError::BufferSizeMismatch` if `pixels` is not exactly
    /// `width * height` long.
    pub fn new(width: usize, height: usize, pixels: Vec<Rgba8>) -> Result<Self, ReproError> {
        let expected = checked_len(width, height)?;
        if pixels.len() != expected {
            return Err(ReproError::BufferSizeMismatch {
                expected,
                got: pixels.len(),
            });
        }
        Ok(Self::from_parts(width, height, pixels))
    }

    /// Builds a buffer whose size was already validated by the caller.
    pub(crate) fn from_parts(width: usize, height: usize, pixels: Vec<Rgba8>) -> Self {
        debug_assert_eq!(pixels.len(), width * height);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Parses a tightly packed RGBA8 byte stream.
    pub fn from_rgba_bytes(width: usize, height: usize, bytes: &[u8]) -> Result<Self, ReproError> {
        let expected = checked_len(width, height)?;
        if bytes.len() != expected * 4 {
            return Err(ReproError::BufferSizeMismatch {
                expected: expected * 4,
                got: bytes.len(),
            });
        }
        let pixels = bytes
            .chunks_exact(4)
            .map(|px| Rgba8::new(px[0], px[1], px[2], px[3]))
            .collect();
        Ok(Self::from_parts(width, height, pixels))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[Rgba8] {
        &self.pixels
    }

    /// Pixel at `(x, y)`. Panics if out of bounds.
    pub fn get(&self, x: usize, y: usize) -> Rgba8 {
        assert!(x < self.width && y < self.height, "({x}, {y}) out of bounds");
        self.pixels[y * self.width + x]
    }

    /// Tightly packed RGBA8 bytes, four per pixel.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|c| c.to_array()).collect()
    }
}

/// A `width x height` image stored in one [`PackedFormat`].
///
/// Texels are kept as the exact byte stream the format defines: one byte per
/// texel for 8-bit layouts, native-endian words for 16-bit layouts, and
/// r, g, b, a bytes for the passthrough format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedBuffer {
    format: PackedFormat,
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PackedBuffer {
    /// Packs every pixel of `colors` into `format`.
    pub fn pack(colors: &ColorBuffer, format: PackedFormat) -> Self {
        let spec = format.spec();
        let bytes = spec.bytes_per_texel;
        let mut data = Vec::with_capacity(colors.pixels().len() * bytes);
        for &c in colors.pixels() {
            let word = (spec.encode)(c);
            match bytes {
                1 => data.push(word as u8),
                2 => data.extend_from_slice(&(word as u16).to_ne_bytes()),
                _ => data.extend_from_slice(&word.to_ne_bytes()),
            }
        }
        Self {
            format,
            width: colors.width(),
            height: colors.height(),
            data,
        }
    }

    pub fn format(&self) -> PackedFormat {
        self.format
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// The packed texels as stored.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Packed word at `(x, y)`. Panics if out of bounds.
    pub fn texel(&self, x: usize, y: usize) -> u32 {
        assert!(x < self.width && y < self.height, "({x}, {y}) out of bounds");
        let bytes = self.format.spec().bytes_per_texel;
        let start = (y * self.width + x) * bytes;
        let raw = &self.data[start..start + bytes];
        match raw {
            &[b] => b as u32,
            &[b0, b1] => u16::from_ne_bytes([b0, b1]) as u32,
            &[b0, b1, b2, b3] => u32::from_ne_bytes([b0, b1, b2, b3]),
            _ => unreachable!("texel size is 1, 2 or 4 bytes"),
        }
    }

    /// Bytes handed to the graphics API for the software texture.
    ///
    /// Identical to [`as_bytes`](Self::as_bytes) except for 2-2-2-2, which
    /// has no packed GL pixel type: each texel is spread to four bytes with
    /// every 2-bit field at the top of its channel.
    pub fn upload_bytes(&self) -> Vec<u8> {
        match self.format {
            PackedFormat::Rgba2 => self
                .data
                .iter()
                .flat_map(|&p| pack::spread_rgba2222(p))
                .collect(),
            _ => self.data.clone(),
        }
    }

    /// Expands every texel back to RGBA8 by bit replication: the expected
    /// on-screen appearance of the software texture.
    pub fn decode(&self) -> ColorBuffer {
        let pixels = (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| (x, y)))
            .map(|(x, y)| self.format.decode(self.texel(x, y)))
            .collect();
        ColorBuffer::from_parts(self.width, self.height, pixels)
    }
}
