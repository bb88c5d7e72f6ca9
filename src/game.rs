//! Ties device, surfaces and overlays into the init / loop / shutdown
//! lifecycle driven by the window event loop.

use std::sync::Arc;

use winit::window::Window;

use crate::bitmap;
use crate::cli::Cli;
use crate::compositor::{Compositor, FrameOutcome};
use crate::device::DeviceManager;
use crate::error::RenderError;
use crate::fps::FrameRateOverlay;
use crate::line::{LineOverlay, Point};
use crate::surface::SurfaceStore;

pub const SCREEN_WIDTH: u32 = 640;
pub const SCREEN_HEIGHT: u32 = 480;

pub const BACKGROUND_BITMAP: &str = "Background.bmp";
pub const NUMBER_BITMAP: &str = "Number.bmp";

const GLYPH_WIDTH: u32 = 8;
const GLYPH_HEIGHT: u32 = 16;

/// Back-buffer format used when the device is created non-windowed.
const FULLSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Bgra8Unorm;

/// What the caller should do after a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

/// The explicit context everything renders through: device, surface store and
/// the two overlays. Input handling mutates the line state, the event loop
/// calls [`frame`](Game::frame) once per idle slot.
#[derive(Default)]
pub struct Game {
    device: Option<DeviceManager>,
    compositor: Option<Compositor>,
    store: SurfaceStore,
    fps: FrameRateOverlay,
    line: LineOverlay,
    exit_requested: bool,
}

impl Game {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the device, loads and converts the background bitmap, loads
    /// the digit glyphs and starts the timing baseline. Any failure
    /// short-circuits; the caller must still run [`shutdown`](Game::shutdown)
    /// to release whatever was acquired.
    pub async fn init(&mut self, window: Arc<Window>, cli: &Cli) -> Result<(), RenderError> {
        // Idempotent re-init: any previous device goes first.
        self.device = None;
        self.compositor = None;

        let dm = DeviceManager::create(
            window,
            SCREEN_WIDTH,
            SCREEN_HEIGHT,
            !cli.fullscreen,
            FULLSCREEN_FORMAT,
        )
        .await?;
        let compositor = Compositor::new(&dm);
        self.store
            .rebuild_targets(&dm.device, dm.params(), &compositor.target_spec());

        // The scratch surface from the load step is transient; only the
        // converted system-memory copy is kept for the session.
        let scratch = bitmap::load(&cli.background)?;
        self.store.set_bitmap(bitmap::convert(&scratch));
        drop(scratch);

        self.fps.load_glyphs(&cli.glyphs, GLYPH_WIDTH, GLYPH_HEIGHT)?;
        self.fps.reset_timing();

        self.device = Some(dm);
        self.compositor = Some(compositor);
        Ok(())
    }

    /// One loop iteration: advance the frame-rate sample, composite and
    /// present, then observe the polled exit flag. The flag is checked after
    /// rendering, so at most one more frame renders once it is set.
    pub fn frame(&mut self) -> Result<LoopControl, RenderError> {
        self.fps.tick();

        let (Some(dm), Some(compositor)) = (self.device.as_mut(), self.compositor.as_ref())
        else {
            return Err(RenderError::NoDevice);
        };
        let outcome = compositor.render(dm, &mut self.store, &self.fps, &self.line)?;
        if outcome == FrameOutcome::Dropped {
            log::debug!("frame dropped");
        }

        if self.exit_requested {
            Ok(LoopControl::Exit)
        } else {
            Ok(LoopControl::Continue)
        }
    }

    /// Releases everything in dependency order. Every step is guarded and
    /// idempotent; a second call is a no-op.
    pub fn shutdown(&mut self) {
        self.fps.unload();
        self.store.release_bitmap();

        // The device is only released if the back-buffer targets were ever
        // acquired this session, matching the conservative release ordering
        // of the backend.
        let ever_acquired = self.store.ever_acquired();
        self.store.release_targets();
        if ever_acquired {
            self.compositor = None;
            self.device = None;
        }
    }

    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// Button-down starts a fresh segment at the cursor.
    pub fn pointer_pressed(&mut self, p: Point) {
        self.line.set_start(p);
        self.line.set_end(p);
    }

    /// Drag-while-held moves the end point only.
    pub fn pointer_dragged(&mut self, p: Point) {
        self.line.set_end(p);
    }

    pub fn line(&self) -> &LineOverlay {
        &self.line
    }
}
