//! Per-pixel comparison of two images.
//!
//! Used to compare the two halves of the comparison window after readback:
//! a correct driver produces identical halves, so any mismatch is the bug.

use serde::Serialize;

use crate::buffer::ColorBuffer;
use crate::error::ReproError;

/// Summary of the differences between two equally sized images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DiffStats {
    /// Number of pixels compared.
    pub pixels: usize,
    /// Pixels where any channel differs by more than the tolerance.
    pub mismatched: usize,
    /// Largest absolute difference seen on any channel.
    pub max_channel_delta: u8,
    /// Coordinates of the first mismatching pixel in row-major order.
    pub first_mismatch: Option<(usize, usize)>,
}

impl DiffStats {
    /// Compares `a` against `b`.
    ///
    /// A pixel counts as mismatched when any channel differs by more than
    /// `tolerance`. Returns `ReproError::BufferSizeMismatch` if the images
    /// differ in size.
    pub fn compare(a: &ColorBuffer, b: &ColorBuffer, tolerance: u8) -> Result<Self, ReproError> {
        if a.width() != b.width() || a.height() != b.height() {
            return Err(ReproError::BufferSizeMismatch {
                expected: a.pixels().len(),
                got: b.pixels().len(),
            });
        }

        let width = a.width();
        let mut stats = DiffStats {
            pixels: a.pixels().len(),
            ..DiffStats::default()
        };

        for (i, (pa, pb)) in a.pixels().iter().zip(b.pixels()).enumerate() {
            let delta = pa
                .to_array()
                .into_iter()
                .zip(pb.to_array())
                .map(|(ca, cb)| ca.abs_diff(cb))
                .max()
                .unwrap_or(0);
            stats.max_channel_delta = stats.max_channel_delta.max(delta);
            if delta > tolerance {
                stats.mismatched += 1;
                if stats.first_mismatch.is_none() {
                    stats.first_mismatch = Some((i % width, i / width));
                }
            }
        }

        Ok(stats)
    }

    pub fn is_identical(&self) -> bool {
        self.mismatched == 0
    }

    /// Fraction of mismatched pixels in [0, 1].
    pub fn mismatch_ratio(&self) -> f64 {
        if self.pixels == 0 {
            0.0
        } else {
            self.mismatched as f64 / self.pixels as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{ColorField, Rgba8};

    fn solid(width: usize, height: usize, c: Rgba8) -> ColorBuffer {
        ColorBuffer::new(width, height, vec![c; width * height]).unwrap()
    }

    #[test]
    fn identical_images_have_no_mismatch() {
        let a = ColorField::new(32, 16).unwrap().generate();
        let stats = DiffStats::compare(&a, &a.clone(), 0).unwrap();
        assert!(stats.is_identical());
        assert_eq!(stats.pixels, 32 * 16);
        assert_eq!(stats.max_channel_delta, 0);
        assert_eq!(stats.first_mismatch, None);
        assert_eq!(stats.mismatch_ratio(), 0.0);
    }

    #[test]
    fn counts_mismatches_and_records_first_position() {
        let a = solid(4, 2, Rgba8::BLACK);
        let mut pixels = a.pixels().to_vec();
        pixels[6] = Rgba8::new(0, 40, 0, 255);
        pixels[7] = Rgba8::new(9, 0, 0, 255);
        let b = ColorBuffer::new(4, 2, pixels).unwrap();

        let stats = DiffStats::compare(&a, &b, 0).unwrap();
        assert_eq!(stats.mismatched, 2);
        assert_eq!(stats.max_channel_delta, 40);
        assert_eq!(stats.first_mismatch, Some((2, 1)));
        assert!((stats.mismatch_ratio() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn tolerance_absorbs_small_deltas() {
        let a = solid(2, 2, Rgba8::new(100, 100, 100, 255));
        let b = solid(2, 2, Rgba8::new(101, 99, 100, 255));
        let stats = DiffStats::compare(&a, &b, 1).unwrap();
        assert!(stats.is_identical());
        assert_eq!(stats.max_channel_delta, 1);
    }

    #[test]
    fn alpha_differences_count() {
        let a = solid(1, 1, Rgba8::new(0, 0, 0, 255));
        let b = solid(1, 1, Rgba8::new(0, 0, 0, 0));
        let stats = DiffStats::compare(&a, &b, 0).unwrap();
        assert_eq!(stats.mismatched, 1);
        assert_eq!(stats.max_channel_delta, 255);
    }

    #[test]
    fn size_mismatch_is_an_error() {
        let a = solid(2, 2, Rgba8::BLACK);
        let b = solid(4, 1, Rgba8::BLACK);
        assert!(matches!(
            DiffStats::compare(&a, &b, 0),
            Err(ReproError::BufferSizeMismatch { .. })
        ));
    }
}
