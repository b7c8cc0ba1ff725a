//! Texture uploads for the two sides of the comparison.
//!
//! Both textures request the same reduced internal format. They differ only
//! in what is handed to `glTexImage2D`:
//!
//! - the *driver* texture gets the full RGBA8 image and the driver performs
//!   the conversion to the internal format;
//! - the *software* texture gets texels already packed on the CPU, described
//!   with the matching packed pixel type, so the driver has nothing to
//!   convert.
//!
//! | format  | internal   | software upload                        |
//! |---------|------------|----------------------------------------|
//! | 8888    | `RGBA8`    | `RGBA` / `UNSIGNED_BYTE`               |
//! | 3-3-2   | `R3_G3_B2` | `RGB` / `UNSIGNED_BYTE_3_3_2`          |
//! | 2-2-2-2 | `RGBA2`    | `RGBA` / `UNSIGNED_BYTE` (quantized)   |
//! | 4-4-4-4 | `RGBA4`    | `RGBA` / `UNSIGNED_SHORT_4_4_4_4`      |
//! | 5-5-5-1 | `RGB5_A1`  | `RGBA` / `UNSIGNED_SHORT_5_5_5_1`      |

use crate::format::PackedFormat;

/// Everything `glTexImage2D` needs besides the pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureConfig {
    /// Texture width in pixels.
    pub width: u32,
    /// Texture height in pixels.
    pub height: u32,
    /// GL internal format (e.g. `glow::R3_G3_B2`).
    pub internal_format: u32,
    /// Client pixel format (e.g. `glow::RGBA`).
    pub format: u32,
    /// Client pixel type (e.g. `glow::UNSIGNED_SHORT_5_5_5_1`).
    pub pixel_type: u32,
    /// GL texture filter mode, used for both min and mag.
    pub filter: u32,
}

/// Internal format requested for both textures.
pub fn internal_format_for(format: PackedFormat) -> u32 {
    match format {
        PackedFormat::Rgba8 => glow::RGBA8,
        PackedFormat::R3g3b2 => glow::R3_G3_B2,
        PackedFormat::Rgba2 => glow::RGBA2,
        PackedFormat::Rgba4 => glow::RGBA4,
        PackedFormat::Rgb5a1 => glow::RGB5_A1,
    }
}

impl TextureConfig {
    /// Config for the texture the driver converts from RGBA8.
    pub fn driver_converted(format: PackedFormat, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            internal_format: internal_format_for(format),
            format: glow::RGBA,
            pixel_type: glow::UNSIGNED_BYTE,
            filter: glow::LINEAR,
        }
    }

    /// Config for the texture uploaded from pre-packed texels.
    pub fn software_packed(format: PackedFormat, width: u32, height: u32) -> Self {
        let (client_format, pixel_type) = match format {
            PackedFormat::Rgba8 | PackedFormat::Rgba2 => (glow::RGBA, glow::UNSIGNED_BYTE),
            PackedFormat::R3g3b2 => (glow::RGB, glow::UNSIGNED_BYTE_3_3_2),
            PackedFormat::Rgba4 => (glow::RGBA, glow::UNSIGNED_SHORT_4_4_4_4),
            PackedFormat::Rgb5a1 => (glow::RGBA, glow::UNSIGNED_SHORT_5_5_5_1),
        };
        Self {
            width,
            height,
            internal_format: internal_format_for(format),
            format: client_format,
            pixel_type,
            filter: glow::LINEAR,
        }
    }

    /// Bytes per pixel of the client data this config describes.
    pub fn bytes_per_pixel(&self) -> usize {
        match self.pixel_type {
            glow::UNSIGNED_BYTE_3_3_2 => 1,
            glow::UNSIGNED_SHORT_4_4_4_4 | glow::UNSIGNED_SHORT_5_5_5_1 => 2,
            _ => {
                let components = match self.format {
                    glow::RED => 1,
                    glow::RG => 2,
                    glow::RGB => 3,
                    _ => 4,
                };
                let component_size = match self.pixel_type {
                    glow::UNSIGNED_SHORT | glow::HALF_FLOAT => 2,
                    glow::FLOAT => 4,
                    _ => 1,
                };
                components * component_size
            }
        }
    }
}

/// Exact byte length `glTexImage2D` reads for `config` with an unpack
/// alignment of 1.
pub fn expected_upload_len(config: &TextureConfig) -> usize {
    config.width as usize * config.height as usize * config.bytes_per_pixel()
}

/// Creates a texture and uploads `data` described by `config`.
///
/// Sets wrap mode to `CLAMP_TO_EDGE` on both axes, applies the filter for
/// both min and mag, and uploads with an unpack alignment of 1 so rows of
/// one- and two-byte texels need no padding. Leaves no texture bound.
///
/// # Errors
///
/// Returns an error string if `data` has the wrong length or the GL context
/// fails to create the texture.
#[allow(unsafe_code)]
pub fn create_texture(
    gl: &glow::Context,
    config: &TextureConfig,
    data: &[u8],
) -> Result<glow::Texture, String> {
    use glow::HasContext;

    let expected = expected_upload_len(config);
    if data.len() != expected {
        return Err(format!(
            "texture upload needs {expected} bytes, got {}",
            data.len()
        ));
    }

    // SAFETY: glow wraps raw GL calls as unsafe. `data` was checked to hold
    // exactly the bytes glTexImage2D reads for this config.
    let texture = unsafe { gl.create_texture()? };

    unsafe {
        gl.bind_texture(glow::TEXTURE_2D, Some(texture));

        gl.tex_parameter_i32(
            glow::TEXTURE_2D,
            glow::TEXTURE_WRAP_S,
            glow::CLAMP_TO_EDGE as i32,
        );
        gl.tex_parameter_i32(
            glow::TEXTURE_2D,
            glow::TEXTURE_WRAP_T,
            glow::CLAMP_TO_EDGE as i32,
        );
        gl.tex_parameter_i32(
            glow::TEXTURE_2D,
            glow::TEXTURE_MIN_FILTER,
            config.filter as i32,
        );
        gl.tex_parameter_i32(
            glow::TEXTURE_2D,
            glow::TEXTURE_MAG_FILTER,
            config.filter as i32,
        );

        gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
        gl.tex_image_2d(
            glow::TEXTURE_2D,
            0,
            config.internal_format as i32,
            config.width as i32,
            config.height as i32,
            0,
            config.format,
            config.pixel_type,
            glow::PixelUnpackData::Slice(Some(data)),
        );

        gl.bind_texture(glow::TEXTURE_2D, None);
    }

    log::debug!(
        "uploaded {}x{} texture: internal 0x{:04X}, format 0x{:04X}, type 0x{:04X}",
        config.width,
        config.height,
        config.internal_format,
        config.format,
        config.pixel_type
    );

    Ok(texture)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::PackedBuffer;
    use crate::color::ColorField;

    #[test]
    fn both_sides_request_the_same_internal_format() {
        for format in PackedFormat::ALL {
            let driver = TextureConfig::driver_converted(format, 8, 4);
            let software = TextureConfig::software_packed(format, 8, 4);
            assert_eq!(driver.internal_format, software.internal_format, "{format}");
        }
    }

    #[test]
    fn driver_side_always_uploads_rgba8() {
        for format in PackedFormat::ALL {
            let config = TextureConfig::driver_converted(format, 8, 4);
            assert_eq!(config.format, glow::RGBA);
            assert_eq!(config.pixel_type, glow::UNSIGNED_BYTE);
            assert_eq!(config.bytes_per_pixel(), 4);
        }
    }

    #[test]
    fn internal_formats_match_layouts() {
        assert_eq!(internal_format_for(PackedFormat::Rgba8), glow::RGBA8);
        assert_eq!(internal_format_for(PackedFormat::R3g3b2), glow::R3_G3_B2);
        assert_eq!(internal_format_for(PackedFormat::Rgba2), glow::RGBA2);
        assert_eq!(internal_format_for(PackedFormat::Rgba4), glow::RGBA4);
        assert_eq!(internal_format_for(PackedFormat::Rgb5a1), glow::RGB5_A1);
    }

    #[test]
    fn software_side_uses_packed_pixel_types() {
        let c = TextureConfig::software_packed(PackedFormat::R3g3b2, 1, 1);
        assert_eq!((c.format, c.pixel_type), (glow::RGB, glow::UNSIGNED_BYTE_3_3_2));
        let c = TextureConfig::software_packed(PackedFormat::Rgba4, 1, 1);
        assert_eq!(
            (c.format, c.pixel_type),
            (glow::RGBA, glow::UNSIGNED_SHORT_4_4_4_4)
        );
        let c = TextureConfig::software_packed(PackedFormat::Rgb5a1, 1, 1);
        assert_eq!(
            (c.format, c.pixel_type),
            (glow::RGBA, glow::UNSIGNED_SHORT_5_5_5_1)
        );
        let c = TextureConfig::software_packed(PackedFormat::Rgba2, 1, 1);
        assert_eq!((c.format, c.pixel_type), (glow::RGBA, glow::UNSIGNED_BYTE));
    }

    #[test]
    fn upload_bytes_match_expected_length_for_every_format() {
        let colors = ColorField::new(13, 7).unwrap().generate();
        for format in PackedFormat::ALL {
            let packed = PackedBuffer::pack(&colors, format);
            let config = TextureConfig::software_packed(format, 13, 7);
            assert_eq!(
                packed.upload_bytes().len(),
                expected_upload_len(&config),
                "{format}"
            );
        }
        let driver = TextureConfig::driver_converted(PackedFormat::R3g3b2, 13, 7);
        assert_eq!(colors.to_rgba_bytes().len(), expected_upload_len(&driver));
    }

    #[test]
    fn textures_use_linear_filtering() {
        let config = TextureConfig::software_packed(PackedFormat::Rgba4, 2, 2);
        assert_eq!(config.filter, glow::LINEAR);
    }

    #[test]
    #[ignore = "requires GL context"]
    fn create_texture_uploads_packed_data() {
        // Would test: create_texture succeeds for each software_packed config
        // and glGetError stays clean.
    }
}
