//! GPU context wrapper, driver debug output and GL error reporting.
//!
//! `GpuContext` wraps a `glow::Context`, checks that the driver exposes the
//! GL version the comparison scene needs, and optionally routes the
//! driver's debug messages into the `log` facade. Driver messages are the
//! most direct evidence when a texture upload goes wrong, so they are
//! delivered synchronously, on the call that caused them.

use thiserror::Error;

use super::shader::ShaderError;

/// Minimum desktop GL version: vertex array objects, `gl_VertexID`
/// and GLSL 3.30.
pub const MIN_GL_VERSION: (u32, u32) = (3, 3);

const MAX_STALE_ERRORS: usize = 16;

/// Errors produced while setting up or drawing the comparison.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Shader(#[from] ShaderError),

    /// A GL object could not be created or a size did not fit GL limits.
    #[error("GL resource error: {0}")]
    Resource(String),

    /// `glGetError` reported an error after `stage`.
    #[error("caught {name} (0x{code:04X}) during {stage}")]
    Gl {
        stage: &'static str,
        code: u32,
        name: &'static str,
    },

    /// The driver's GL version is below [`MIN_GL_VERSION`].
    #[error("OpenGL {major}.{minor} is too old, need {}.{} or newer", MIN_GL_VERSION.0, MIN_GL_VERSION.1)]
    UnsupportedVersion { major: u32, minor: u32 },
}

/// Returns the symbolic name of a `glGetError` code.
pub fn gl_error_name(code: u32) -> &'static str {
    match code {
        glow::NO_ERROR => "GL_NO_ERROR",
        glow::INVALID_ENUM => "GL_INVALID_ENUM",
        glow::INVALID_VALUE => "GL_INVALID_VALUE",
        glow::INVALID_OPERATION => "GL_INVALID_OPERATION",
        glow::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
        glow::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
        _ => "unknown code",
    }
}

/// Whether a context of version `major.minor` can run the comparison.
pub fn meets_minimum_version(major: u32, minor: u32) -> bool {
    (major, minor) >= MIN_GL_VERSION
}

/// Polls `glGetError` once and turns a pending error into `RenderError::Gl`.
#[allow(unsafe_code)]
pub fn check_gl_error(gl: &glow::Context, stage: &'static str) -> Result<(), RenderError> {
    use glow::HasContext;

    // SAFETY: glGetError has no preconditions beyond a current context.
    let code = unsafe { gl.get_error() };
    if code == glow::NO_ERROR {
        Ok(())
    } else {
        Err(RenderError::Gl {
            stage,
            code,
            name: gl_error_name(code),
        })
    }
}

/// Wraps a `glow::Context` with what was learned about the driver.
pub struct GpuContext {
    gl: glow::Context,
    debug_output: bool,
    renderer: String,
}

impl GpuContext {
    /// Creates a new `GpuContext` by wrapping the given GL context.
    ///
    /// Clears errors left behind by function loading, then checks the
    /// version. With `debug` set and a driver that supports it, installs a
    /// synchronous debug-message callback that logs every driver message.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::UnsupportedVersion` below GL 3.3.
    #[allow(unsafe_code)]
    pub fn new(mut gl: glow::Context, debug: bool) -> Result<Self, RenderError> {
        use glow::HasContext;

        // SAFETY: all calls below only query state or install a callback
        // on the context we own.
        unsafe {
            // Loaders commonly leave a spurious INVALID_ENUM behind.
            for _ in 0..MAX_STALE_ERRORS {
                if gl.get_error() == glow::NO_ERROR {
                    break;
                }
            }
        }

        let version = gl.version();
        let (major, minor) = (version.major, version.minor);
        if !meets_minimum_version(major, minor) {
            return Err(RenderError::UnsupportedVersion { major, minor });
        }

        let (vendor, renderer) = unsafe {
            (
                gl.get_parameter_string(glow::VENDOR),
                gl.get_parameter_string(glow::RENDERER),
            )
        };
        log::info!("OpenGL {major}.{minor} on {renderer} ({vendor})");

        let debug_output = debug && gl.supports_debug();
        if debug_output {
            unsafe {
                gl.enable(glow::DEBUG_OUTPUT);
                gl.enable(glow::DEBUG_OUTPUT_SYNCHRONOUS);
                gl.debug_message_callback(|_source, kind, id, severity, message| {
                    let line = format!("[DEBUG_OUTPUT] {message} (id {id}, type 0x{kind:04X})");
                    match severity {
                        glow::DEBUG_SEVERITY_HIGH | glow::DEBUG_SEVERITY_MEDIUM => {
                            log::warn!("{line}")
                        }
                        glow::DEBUG_SEVERITY_NOTIFICATION => log::debug!("{line}"),
                        _ => log::info!("{line}"),
                    }
                });
            }
        } else if debug {
            log::warn!("driver does not support debug output; relying on glGetError");
        }

        Ok(Self {
            gl,
            debug_output,
            renderer,
        })
    }

    /// Returns a reference to the underlying `glow::Context`.
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    /// Whether driver debug messages are being logged.
    pub fn debug_output(&self) -> bool {
        self.debug_output
    }

    /// The `GL_RENDERER` string, e.g. the GPU model.
    pub fn renderer(&self) -> &str {
        &self.renderer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gl_error_names_cover_core_codes() {
        assert_eq!(gl_error_name(glow::NO_ERROR), "GL_NO_ERROR");
        assert_eq!(gl_error_name(glow::INVALID_ENUM), "GL_INVALID_ENUM");
        assert_eq!(gl_error_name(glow::INVALID_VALUE), "GL_INVALID_VALUE");
        assert_eq!(gl_error_name(glow::INVALID_OPERATION), "GL_INVALID_OPERATION");
        assert_eq!(
            gl_error_name(glow::INVALID_FRAMEBUFFER_OPERATION),
            "GL_INVALID_FRAMEBUFFER_OPERATION"
        );
        assert_eq!(gl_error_name(glow::OUT_OF_MEMORY), "GL_OUT_OF_MEMORY");
    }

    #[test]
    fn unrecognized_error_code_is_unknown() {
        assert_eq!(gl_error_name(0xDEAD), "unknown code");
    }

    #[test]
    fn minimum_version_check() {
        assert!(meets_minimum_version(3, 3));
        assert!(meets_minimum_version(4, 2));
        assert!(!meets_minimum_version(3, 2));
        assert!(!meets_minimum_version(2, 1));
    }

    #[test]
    fn gl_error_display_names_stage_and_code() {
        let err = RenderError::Gl {
            stage: "texture upload",
            code: glow::INVALID_ENUM,
            name: gl_error_name(glow::INVALID_ENUM),
        };
        let msg = err.to_string();
        assert!(msg.contains("GL_INVALID_ENUM"), "missing name in: {msg}");
        assert!(msg.contains("0x0500"), "missing code in: {msg}");
        assert!(msg.contains("texture upload"), "missing stage in: {msg}");
    }

    #[test]
    fn unsupported_version_display_mentions_both_versions() {
        let msg = RenderError::UnsupportedVersion { major: 2, minor: 1 }.to_string();
        assert!(msg.contains("2.1"), "missing found version in: {msg}");
        assert!(msg.contains("3.3"), "missing required version in: {msg}");
    }

    #[test]
    fn shader_error_converts_into_render_error() {
        let err: RenderError = ShaderError::LinkError("varying mismatch".into()).into();
        assert!(err.to_string().contains("varying mismatch"));
    }

    #[test]
    fn gpu_context_struct_compiles_with_expected_api() {
        fn _assert_api(ctx: &GpuContext) {
            let _gl: &glow::Context = ctx.gl();
            let _flag: bool = ctx.debug_output();
            let _name: &str = ctx.renderer();
        }
    }

    #[test]
    #[ignore = "requires GL context"]
    fn new_succeeds_with_core_profile_context() {
        // Would test: GpuContext::new(gl, true) returns Ok on a 3.3+ context.
    }
}
