//! CPU-side PNG snapshots of both halves of the comparison.
//!
//! `reference.png` is the generated 8-bit field and `software.png` is the
//! packed buffer expanded back to 8 bits: what the software half of the
//! window should show on a correct driver. Rows are flipped so the PNGs
//! look like the window, with lightness increasing upward.

use std::path::{Path, PathBuf};

use texfmt_core::{ColorBuffer, PackedBuffer};

use crate::error::CliError;

pub const REFERENCE_FILE: &str = "reference.png";
pub const SOFTWARE_FILE: &str = "software.png";

/// Converts a GL-ordered buffer (row 0 at the bottom) to an image with
/// row 0 at the top.
pub fn to_image(buf: &ColorBuffer) -> Result<image::RgbaImage, CliError> {
    let w = u32::try_from(buf.width()).map_err(|_| CliError::Input("width too large".into()))?;
    let h = u32::try_from(buf.height()).map_err(|_| CliError::Input("height too large".into()))?;
    let mut img = image::RgbaImage::from_raw(w, h, buf.to_rgba_bytes())
        .ok_or_else(|| CliError::Io("RGBA buffer size mismatch".into()))?;
    image::imageops::flip_vertical_in_place(&mut img);
    Ok(img)
}

/// Writes both snapshots into `dir`, creating it if needed, and returns the
/// written paths.
pub fn write_snapshots(
    colors: &ColorBuffer,
    packed: &PackedBuffer,
    dir: &Path,
) -> Result<Vec<PathBuf>, CliError> {
    std::fs::create_dir_all(dir)?;

    let reference = dir.join(REFERENCE_FILE);
    to_image(colors)?.save(&reference)?;
    log::debug!("wrote {}", reference.display());

    let software = dir.join(SOFTWARE_FILE);
    to_image(&packed.decode())?.save(&software)?;
    log::debug!("wrote {}", software.display());

    Ok(vec![reference, software])
}
