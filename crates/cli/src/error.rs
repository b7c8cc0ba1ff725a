//! Structured CLI errors with meaningful exit codes.
//!
//! Exit code scheme:
//! - 0:  success
//! - 2:  clap arg parse error (automatic, before our code runs)
//! - 10: render error (shader build, texture upload, GL error)
//! - 11: I/O error (PNG write, output directory)
//! - 12: input error (bad dimensions, bad format)
//! - 13: serialization error
//! - 14: window or GL context creation error

use std::fmt;

use texfmt_core::render::RenderError;
use texfmt_core::ReproError;

/// Errors produced by CLI operations, each mapped to a distinct exit code.
#[derive(Debug)]
pub enum CliError {
    /// The GL side failed while building or drawing the comparison.
    Render(String),
    /// An I/O error (snapshot write, directory creation).
    Io(String),
    /// A user input error (bad dimensions, unknown format, pixel out of range).
    Input(String),
    /// A serialization error (JSON output failure).
    Serialization(String),
    /// The window, event loop or GL context could not be created.
    Window(String),
}

impl CliError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Render(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
            CliError::Window(_) => 14,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Render(msg) => write!(f, "{msg}"),
            CliError::Io(msg) => write!(f, "{msg}"),
            CliError::Input(msg) => write!(f, "{msg}"),
            CliError::Serialization(msg) => write!(f, "{msg}"),
            CliError::Window(msg) => write!(f, "{msg}"),
        }
    }
}

impl From<ReproError> for CliError {
    fn from(e: ReproError) -> Self {
        CliError::Input(e.to_string())
    }
}

impl From<RenderError> for CliError {
    fn from(e: RenderError) -> Self {
        CliError::Render(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}

impl From<image::ImageError> for CliError {
    fn from(e: image::ImageError) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<winit::error::EventLoopError> for CliError {
    fn from(e: winit::error::EventLoopError) -> Self {
        CliError::Window(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_error_exit_code_is_10() {
        let err = CliError::Render("link failed".into());
        assert_eq!(err.exit_code(), 10);
    }

    #[test]
    fn io_error_exit_code_is_11() {
        assert_eq!(CliError::Io("write failed".into()).exit_code(), 11);
    }

    #[test]
    fn input_error_exit_code_is_12() {
        assert_eq!(CliError::Input("bad format".into()).exit_code(), 12);
    }

    #[test]
    fn serialization_error_exit_code_is_13() {
        assert_eq!(CliError::Serialization("json fail".into()).exit_code(), 13);
    }

    #[test]
    fn window_error_exit_code_is_14() {
        assert_eq!(CliError::Window("no display".into()).exit_code(), 14);
    }

    #[test]
    fn from_repro_error_routes_to_input() {
        let cli_err = CliError::from(ReproError::UnknownFormat("rgb10a2".into()));
        assert_eq!(cli_err.exit_code(), 12);
        assert!(cli_err.to_string().contains("rgb10a2"));
    }

    #[test]
    fn from_render_error_routes_to_render() {
        let cli_err = CliError::from(RenderError::Resource("no texture".into()));
        assert_eq!(cli_err.exit_code(), 10);
        assert!(cli_err.to_string().contains("no texture"));
    }

    #[test]
    fn from_io_error_routes_to_io() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let cli_err = CliError::from(io);
        assert_eq!(cli_err.exit_code(), 11);
        assert!(cli_err.to_string().contains("read-only"));
    }

    #[test]
    fn from_serde_json_error_routes_to_serialization() {
        let bad_json = serde_json::from_str::<serde_json::Value>("{invalid");
        let cli_err = CliError::from(bad_json.unwrap_err());
        assert_eq!(cli_err.exit_code(), 13);
    }
}
