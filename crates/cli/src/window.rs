//! The comparison window: winit event loop plus a glutin GL context.
//!
//! All GL state lives in [`GlState`], created when the application is
//! resumed and released on close or Escape. Input other than Escape is
//! ignored, and resizing only resizes the surface: both textures keep
//! their 1:1 viewports.

use std::num::NonZeroU32;

use glutin::config::{ConfigTemplateBuilder, GlConfig};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentGlContext, PossiblyCurrentContext,
    Version,
};
use glutin::display::{GetGlDisplay, GlDisplay};
use glutin::surface::{GlSurface, Surface, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasWindowHandle;
use texfmt_core::render::{check_gl_error, window_size, ComparisonScene, GpuContext, TextureSlot};
use texfmt_core::{ColorBuffer, DiffStats, PackedBuffer};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowId};

use crate::error::CliError;

/// Runtime switches for the viewer.
#[derive(Debug, Clone, Copy)]
pub struct ViewerOptions {
    /// Request a debug context and log driver debug messages.
    pub debug: bool,
    /// Compare the two halves after the first frame.
    pub readback: bool,
    /// Per-channel difference tolerated by the readback comparison.
    pub tolerance: u8,
}

/// What happened during a viewer session.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewerReport {
    pub frames: u64,
    pub diff: Option<DiffStats>,
}

fn window_error(e: impl std::fmt::Display) -> CliError {
    CliError::Window(e.to_string())
}

/// Everything that only exists while the window is open.
struct GlState {
    scene: ComparisonScene,
    gpu: GpuContext,
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    window: Window,
}

struct ViewerApp<'a> {
    colors: &'a ColorBuffer,
    packed: &'a PackedBuffer,
    options: ViewerOptions,
    state: Option<GlState>,
    report: ViewerReport,
    failure: Option<CliError>,
}

impl<'a> ViewerApp<'a> {
    fn new(colors: &'a ColorBuffer, packed: &'a PackedBuffer, options: ViewerOptions) -> Self {
        Self {
            colors,
            packed,
            options,
            state: None,
            report: ViewerReport::default(),
            failure: None,
        }
    }

    #[allow(unsafe_code)]
    fn create_state(&self, event_loop: &ActiveEventLoop) -> Result<GlState, CliError> {
        let width = u32::try_from(self.colors.width())
            .map_err(|_| CliError::Input("width too large".into()))?;
        let height = u32::try_from(self.colors.height())
            .map_err(|_| CliError::Input("height too large".into()))?;
        let (win_w, win_h) = window_size(width, height);

        let attributes = Window::default_attributes()
            .with_title(format!(
                "texfmt {} (top: driver, bottom: software)",
                self.packed.format()
            ))
            .with_inner_size(PhysicalSize::new(win_w, win_h));

        let template = ConfigTemplateBuilder::new().with_alpha_size(8);
        let (window, config) = DisplayBuilder::new()
            .with_window_attributes(Some(attributes))
            .build(event_loop, template, |configs| {
                configs
                    .min_by_key(|c| c.num_samples())
                    .expect("glutin yields at least one matching config")
            })
            .map_err(window_error)?;
        let window = window.ok_or_else(|| CliError::Window("no window was created".into()))?;

        let raw_handle = window.window_handle().map_err(window_error)?.as_raw();
        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .with_profile(GlProfile::Core)
            .with_debug(self.options.debug)
            .build(Some(raw_handle));

        let display = config.display();
        // SAFETY: the raw window handle belongs to `window`, which outlives
        // both the context and the surface inside GlState.
        let not_current = unsafe { display.create_context(&config, &context_attributes) }
            .map_err(window_error)?;
        let surface_attributes = window
            .build_surface_attributes(Default::default())
            .map_err(window_error)?;
        let surface = unsafe { display.create_window_surface(&config, &surface_attributes) }
            .map_err(window_error)?;
        let context = not_current.make_current(&surface).map_err(window_error)?;

        if let Err(e) = surface.set_swap_interval(&context, SwapInterval::Wait(NonZeroU32::MIN)) {
            log::warn!("could not enable vsync: {e}");
        }

        // SAFETY: the context was just made current on this thread.
        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|name| display.get_proc_address(name))
        };
        let gpu = GpuContext::new(gl, self.options.debug)?;
        let scene = ComparisonScene::new(gpu.gl(), self.colors, self.packed)?;

        Ok(GlState {
            scene,
            gpu,
            surface,
            context,
            window,
        })
    }

    fn redraw(&mut self) -> Result<(), CliError> {
        let Some(state) = &self.state else {
            return Ok(());
        };
        let gl = state.gpu.gl();

        state.scene.draw(gl);
        check_gl_error(gl, "draw")?;
        self.report.frames += 1;

        if self.options.readback && self.report.diff.is_none() {
            let driver = state.scene.read_back(gl, TextureSlot::Driver)?;
            let software = state.scene.read_back(gl, TextureSlot::Software)?;
            let stats = DiffStats::compare(&driver, &software, self.options.tolerance)?;
            if stats.is_identical() {
                log::info!(
                    "halves match: {} pixels, max channel delta {}",
                    stats.pixels,
                    stats.max_channel_delta
                );
            } else {
                log::warn!(
                    "halves differ: {} of {} pixels ({:.2}%), max channel delta {}, first at {:?}",
                    stats.mismatched,
                    stats.pixels,
                    stats.mismatch_ratio() * 100.0,
                    stats.max_channel_delta,
                    stats.first_mismatch
                );
            }
            self.report.diff = Some(stats);
        }

        state
            .surface
            .swap_buffers(&state.context)
            .map_err(window_error)
    }

    /// Deletes the GL objects while the context is still current.
    fn release(&mut self) {
        if let Some(state) = self.state.take() {
            let GlState { scene, gpu, .. } = state;
            scene.destroy(gpu.gl());
        }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.release();
        event_loop.exit();
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: CliError) {
        log::error!("{error}");
        self.failure = Some(error);
        self.shutdown(event_loop);
    }
}

impl ApplicationHandler for ViewerApp<'_> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        match self.create_state(event_loop) {
            Ok(state) => {
                state.window.request_redraw();
                self.state = Some(state);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => self.shutdown(event_loop),
            WindowEvent::Resized(size) => {
                if let (Some(state), Some(w), Some(h)) = (
                    &self.state,
                    NonZeroU32::new(size.width),
                    NonZeroU32::new(size.height),
                ) {
                    state.surface.resize(&state.context, w, h);
                    log::debug!("surface resized to {}x{}", size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw() {
                    self.fail(event_loop, e);
                }
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.release();
    }
}

/// Opens the comparison window and blocks until it is closed.
///
/// # Errors
///
/// Returns `CliError::Window` if the event loop, window or context cannot
/// be created, or the first render error that stopped the session.
pub fn run_viewer(
    colors: &ColorBuffer,
    packed: &PackedBuffer,
    options: ViewerOptions,
) -> Result<ViewerReport, CliError> {
    let event_loop = EventLoop::new()?;
    let mut app = ViewerApp::new(colors, packed, options);
    event_loop.run_app(&mut app)?;

    match app.failure.take() {
        Some(e) => Err(e),
        None => Ok(app.report),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_starts_empty() {
        let report = ViewerReport::default();
        assert_eq!(report.frames, 0);
        assert!(report.diff.is_none());
    }

    #[test]
    fn window_error_maps_to_window_exit_code() {
        let err = window_error("no display");
        assert_eq!(err.exit_code(), 14);
        assert_eq!(err.to_string(), "no display");
    }

    #[test]
    #[ignore = "requires a display and GL context"]
    fn viewer_opens_and_reads_back() {
        // Would test: run_viewer with readback set returns a report with
        // frames >= 1 and Some(diff).
    }
}
