//! OpenGL rendering of the side-by-side comparison.
//!
//! This module is only available when the `render` feature is enabled.
//! It owns everything that talks to the driver: context checks and debug
//! output, shader compilation, texture upload in every packed format, and
//! the two-viewport comparison scene.
//!
//! # Module overview
//!
//! - [`context`] -- GPU context wrapper, debug output, GL error names.
//! - [`shader`] -- Shader compilation, linking, and error formatting.
//! - [`fullscreen`] -- Fullscreen triangle and texture sampling shaders.
//! - [`texture`] -- Upload formats per [`PackedFormat`](crate::PackedFormat).
//! - [`scene`] -- The comparison scene: both textures, program, layout.

pub mod context;
pub mod fullscreen;
pub mod scene;
pub mod shader;
pub mod texture;

pub use context::{check_gl_error, gl_error_name, GpuContext, RenderError};
pub use fullscreen::{FULLSCREEN_VERTEX_SHADER, TEXTURE_FRAGMENT_SHADER};
pub use scene::{viewport_for, window_size, ComparisonScene, TextureSlot, Viewport};
pub use shader::{
    compile_program, compile_shader, format_shader_error, link_program, ShaderError, ShaderStage,
};
pub use texture::{create_texture, expected_upload_len, TextureConfig};
