#![deny(unsafe_code)]
//! Core of the texfmt texture-format repro.
//!
//! Generates an HSL color field (`ColorField`), packs it into one of the
//! reduced-precision layouts (`PackedFormat`: 3-3-2, 2-2-2-2, 4-4-4-4,
//! 5-5-5-1 or 8-8-8-8 passthrough), and compares images (`DiffStats`).
//! The optional `render` feature uploads both versions as GL textures and
//! draws them one above the other.

pub mod buffer;
pub mod color;
pub mod diff;
pub mod error;
pub mod format;
pub mod pack;

#[cfg(feature = "render")]
pub mod render;

pub use buffer::{ColorBuffer, PackedBuffer};
pub use color::{hsl_to_rgba, ColorField, Rgba8};
pub use diff::DiffStats;
pub use error::ReproError;
pub use format::{FormatSpec, PackedFormat};

/// Image width the repro was written for.
pub const DEFAULT_WIDTH: usize = 512;
/// Image height the repro was written for.
pub const DEFAULT_HEIGHT: usize = 256;
