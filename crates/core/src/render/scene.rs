//! The comparison scene: both textures, the sampling program and layout.
//!
//! The window is two textures tall. The driver-converted texture fills the
//! top half and the software-packed texture the bottom half, each drawn
//! one texel per pixel so that any difference between the halves is a
//! difference in what the driver stored.

use crate::buffer::{ColorBuffer, PackedBuffer};
use crate::format::PackedFormat;

use super::context::{check_gl_error, RenderError};
use super::fullscreen::{
    FULLSCREEN_VERTEX_COUNT, FULLSCREEN_VERTEX_SHADER, TEXTURE_FRAGMENT_SHADER, TEXTURE_UNIFORM,
};
use super::shader::compile_program;
use super::texture::{create_texture, TextureConfig};

/// The two textures being compared. The discriminant is the texture unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureSlot {
    /// Uploaded as RGBA8, converted by the driver.
    Driver = 0,
    /// Packed on the CPU, uploaded with a packed pixel type.
    Software = 1,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 2] = [TextureSlot::Driver, TextureSlot::Software];
    pub const COUNT: usize = Self::ALL.len();

    /// Texture unit index the slot is bound to.
    pub fn unit(self) -> u32 {
        self as u32
    }

    pub fn label(self) -> &'static str {
        match self {
            TextureSlot::Driver => "driver",
            TextureSlot::Software => "software",
        }
    }
}

/// A viewport rectangle in window pixels, origin bottom-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Where `slot` is drawn for textures of `width x height`.
///
/// Slots stack from the top of the window down in [`TextureSlot::ALL`]
/// order.
pub fn viewport_for(slot: TextureSlot, width: u32, height: u32) -> Viewport {
    let row = (TextureSlot::COUNT - 1 - slot as usize) as i32;
    Viewport {
        x: 0,
        y: height as i32 * row,
        width: width as i32,
        height: height as i32,
    }
}

/// Window size, in physical pixels, that shows every slot at 1:1.
pub fn window_size(width: u32, height: u32) -> (u32, u32) {
    (width, height * TextureSlot::COUNT as u32)
}

fn gl_size(n: usize) -> Result<u32, RenderError> {
    u32::try_from(n)
        .ok()
        .filter(|&v| v <= i32::MAX as u32)
        .ok_or_else(|| RenderError::Resource(format!("dimension {n} exceeds GL limits")))
}

/// Owns every GL object the comparison needs.
///
/// Create it once the context is current, call [`draw`](Self::draw) on
/// every redraw, and [`destroy`](Self::destroy) it before the context goes
/// away.
pub struct ComparisonScene {
    format: PackedFormat,
    width: u32,
    height: u32,
    vertex_array: glow::VertexArray,
    program: glow::Program,
    sampler: Option<glow::UniformLocation>,
    textures: [glow::Texture; TextureSlot::COUNT],
}

impl ComparisonScene {
    /// Uploads `colors` as the driver texture and `packed` as the software
    /// texture, and builds the sampling program.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::Resource` if the buffers differ in size or a GL
    /// object cannot be created, `RenderError::Shader` if the program fails
    /// to build, and `RenderError::Gl` if the driver flagged an error during
    /// setup. Objects created before the failure are released.
    #[allow(unsafe_code)]
    pub fn new(
        gl: &glow::Context,
        colors: &ColorBuffer,
        packed: &PackedBuffer,
    ) -> Result<Self, RenderError> {
        use glow::HasContext;

        if colors.width() != packed.width() || colors.height() != packed.height() {
            return Err(RenderError::Resource(format!(
                "reference is {}x{} but packed buffer is {}x{}",
                colors.width(),
                colors.height(),
                packed.width(),
                packed.height()
            )));
        }
        let width = gl_size(colors.width())?;
        let height = gl_size(colors.height())?;
        let format = packed.format();

        let driver = create_texture(
            gl,
            &TextureConfig::driver_converted(format, width, height),
            &colors.to_rgba_bytes(),
        )
        .map_err(RenderError::Resource)?;

        let software = match create_texture(
            gl,
            &TextureConfig::software_packed(format, width, height),
            &packed.upload_bytes(),
        ) {
            Ok(t) => t,
            Err(e) => {
                // SAFETY: driver is a valid handle from create_texture.
                unsafe { gl.delete_texture(driver) };
                return Err(RenderError::Resource(e));
            }
        };

        let textures = [driver, software];
        let release_textures = |gl: &glow::Context| unsafe {
            for t in textures {
                gl.delete_texture(t);
            }
        };

        let program = match compile_program(gl, FULLSCREEN_VERTEX_SHADER, TEXTURE_FRAGMENT_SHADER)
        {
            Ok(p) => p,
            Err(e) => {
                release_textures(gl);
                return Err(e.into());
            }
        };

        // SAFETY: the program handle is valid; the VAO stays empty because
        // the vertex shader derives positions from gl_VertexID.
        let vertex_array = match unsafe { gl.create_vertex_array() } {
            Ok(v) => v,
            Err(e) => {
                release_textures(gl);
                unsafe { gl.delete_program(program) };
                return Err(RenderError::Resource(e));
            }
        };
        let sampler = unsafe { gl.get_uniform_location(program, TEXTURE_UNIFORM) };

        let scene = Self {
            format,
            width,
            height,
            vertex_array,
            program,
            sampler,
            textures,
        };

        if let Err(e) = check_gl_error(gl, "scene setup") {
            scene.destroy(gl);
            return Err(e);
        }

        log::info!(
            "comparison scene ready: {width}x{height} {format} ({} texture on top)",
            TextureSlot::Driver.label()
        );
        Ok(scene)
    }

    pub fn format(&self) -> PackedFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Draws both textures into their viewports of the bound framebuffer.
    #[allow(unsafe_code)]
    pub fn draw(&self, gl: &glow::Context) {
        use glow::HasContext;

        // SAFETY: every handle was created in new() and is still alive
        // until destroy() consumes the scene.
        unsafe {
            gl.clear_color(0.0, 0.0, 0.0, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT);
            gl.use_program(Some(self.program));
            gl.bind_vertex_array(Some(self.vertex_array));

            for slot in TextureSlot::ALL {
                gl.active_texture(glow::TEXTURE0 + slot.unit());
                gl.bind_texture(glow::TEXTURE_2D, Some(self.textures[slot as usize]));

                let vp = viewport_for(slot, self.width, self.height);
                gl.viewport(vp.x, vp.y, vp.width, vp.height);
                gl.uniform_1_i32(self.sampler.as_ref(), slot.unit() as i32);
                gl.draw_arrays(glow::TRIANGLES, 0, FULLSCREEN_VERTEX_COUNT);
            }

            gl.bind_vertex_array(None);
            gl.use_program(None);
        }
    }

    /// Reads back what [`draw`](Self::draw) put in `slot`'s viewport of the
    /// current read framebuffer.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::Gl` if the readback raised a GL error.
    #[allow(unsafe_code)]
    pub fn read_back(
        &self,
        gl: &glow::Context,
        slot: TextureSlot,
    ) -> Result<ColorBuffer, RenderError> {
        use glow::HasContext;

        let vp = viewport_for(slot, self.width, self.height);
        let mut bytes = vec![0u8; self.width as usize * self.height as usize * 4];

        // SAFETY: `bytes` holds exactly width * height RGBA8 pixels and the
        // pack alignment of 1 means rows are tightly packed.
        unsafe {
            gl.pixel_store_i32(glow::PACK_ALIGNMENT, 1);
            gl.read_pixels(
                vp.x,
                vp.y,
                vp.width,
                vp.height,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelPackData::Slice(Some(&mut bytes)),
            );
        }
        check_gl_error(gl, "readback")?;

        ColorBuffer::from_rgba_bytes(self.width as usize, self.height as usize, &bytes)
            .map_err(|e| RenderError::Resource(e.to_string()))
    }

    /// Deletes the program, vertex array and both textures.
    #[allow(unsafe_code)]
    pub fn destroy(self, gl: &glow::Context) {
        use glow::HasContext;

        // SAFETY: the handles were created in new() and the scene is
        // consumed, so none of them can be used again.
        unsafe {
            gl.delete_vertex_array(self.vertex_array);
            gl.delete_program(self.program);
            for texture in self.textures {
                gl.delete_texture(texture);
            }
        }
        log::debug!("comparison scene destroyed");
    }
}
