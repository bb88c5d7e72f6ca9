//! Device creation, per-frame validation and lost-device recovery.

use std::sync::Arc;

use winit::window::Window;

use crate::error::RenderError;
use crate::surface::{SurfaceStore, TargetSpec};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth16Unorm;

/// Consecutive failed reacquire attempts before the loss is treated as a
/// failed reset rather than a transient condition.
const MAX_RESET_ATTEMPTS: u32 = 8;

/// Immutable snapshot of the configuration the device was created with.
/// Retained so the surface can be reconfigured identically after a loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresentationParams {
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
    pub present_mode: wgpu::PresentMode,
    pub alpha_mode: wgpu::CompositeAlphaMode,
    pub windowed: bool,
    pub depth_format: wgpu::TextureFormat,
}

impl PresentationParams {
    pub fn surface_config(&self) -> wgpu::SurfaceConfiguration {
        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: self.format,
            width: self.width,
            height: self.height,
            present_mode: self.present_mode,
            alpha_mode: self.alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        }
    }
}

/// How a failed swapchain acquire should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireFailure {
    /// Drop this frame, try again next iteration.
    Dropped,
    /// The surface must be reconfigured before rendering can continue.
    Reset,
    /// Not recoverable.
    Fatal,
}

pub fn classify_surface_error(e: &wgpu::SurfaceError) -> AcquireFailure {
    match e {
        wgpu::SurfaceError::Timeout => AcquireFailure::Dropped,
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => AcquireFailure::Reset,
        wgpu::SurfaceError::OutOfMemory | wgpu::SurfaceError::Other => AcquireFailure::Fatal,
    }
}

/// The three steps of lost-device recovery, in order. Split out so the
/// release-once / reconfigure-once / rebuild-before-return ordering can be
/// exercised against a recording double as well as the real surface.
pub trait ResetTarget {
    fn release_targets(&mut self);
    fn reconfigure(&mut self, params: &PresentationParams);
    fn rebuild_targets(&mut self, params: &PresentationParams);
}

/// Runs one device reset: release the dependent targets, reconfigure with
/// the retained presentation parameters, rebuild the targets. Each step runs
/// exactly once, and the targets are rebuilt before this returns.
pub fn run_reset<T: ResetTarget>(target: &mut T, params: &PresentationParams) {
    target.release_targets();
    target.reconfigure(params);
    target.rebuild_targets(params);
}

struct SurfaceReset<'a> {
    surface: &'a wgpu::Surface<'static>,
    device: &'a wgpu::Device,
    store: &'a mut SurfaceStore,
    spec: &'a TargetSpec<'a>,
}

impl ResetTarget for SurfaceReset<'_> {
    fn release_targets(&mut self) {
        self.store.release_targets();
    }

    fn reconfigure(&mut self, params: &PresentationParams) {
        self.surface.configure(self.device, &params.surface_config());
    }

    fn rebuild_targets(&mut self, params: &PresentationParams) {
        self.store.rebuild_targets(self.device, params, self.spec);
    }
}

/// Owns the rendering device, its queue and the window surface.
///
/// Exactly one of these exists per running process. Creation captures a
/// [`PresentationParams`] snapshot; when a later acquire reports the surface
/// lost, the next [`validate`](DeviceManager::validate) pass releases the
/// dependent targets, reconfigures the surface with the retained snapshot and
/// rebuilds the targets before rendering resumes.
pub struct DeviceManager {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    params: PresentationParams,
    pending_reset: bool,
    failed_resets: u32,
}

impl DeviceManager {
    /// Creates the device against the window surface.
    ///
    /// The back-buffer format follows the adapter's preferred surface format
    /// when windowed, otherwise the supplied `fullscreen_format`; the
    /// presentation interval is immediate only in fullscreen. No multisampling,
    /// depth at a fixed 16-bit format. Any adapter or device failure yields
    /// `DeviceCreationFailed` and leaves nothing half-built.
    pub async fn create(
        window: Arc<Window>,
        width: u32,
        height: u32,
        windowed: bool,
        fullscreen_format: wgpu::TextureFormat,
    ) -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .map_err(|e| RenderError::DeviceCreationFailed(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| {
                RenderError::DeviceCreationFailed(
                    "could not get display adapter information".into(),
                )
            })?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .map_err(|e| RenderError::DeviceCreationFailed(e.to_string()))?;

        let caps = surface.get_capabilities(&adapter);
        let format = if windowed {
            caps.formats
                .iter()
                .copied()
                .find(|f| f.is_srgb())
                .unwrap_or(caps.formats[0])
        } else if caps.formats.contains(&fullscreen_format) {
            fullscreen_format
        } else {
            return Err(RenderError::DeviceCreationFailed(format!(
                "surface does not support {fullscreen_format:?}"
            )));
        };

        let present_mode = if windowed {
            wgpu::PresentMode::Fifo
        } else if caps.present_modes.contains(&wgpu::PresentMode::Immediate) {
            wgpu::PresentMode::Immediate
        } else {
            log::warn!("immediate presentation unsupported, falling back");
            caps.present_modes[0]
        };

        let params = PresentationParams {
            width,
            height,
            format,
            present_mode,
            alpha_mode: caps.alpha_modes[0],
            windowed,
            depth_format: DEPTH_FORMAT,
        };
        surface.configure(&device, &params.surface_config());

        Ok(Self {
            device,
            queue,
            surface,
            params,
            pending_reset: false,
            failed_resets: 0,
        })
    }

    pub fn params(&self) -> &PresentationParams {
        &self.params
    }

    /// Checks the device is usable and performs recovery when a previous
    /// acquire reported the surface lost: release the targets, reconfigure
    /// with the retained presentation parameters, rebuild the targets
    /// (cleared), then the restore hook — a no-op here, the bitmap surface is
    /// system memory and survives the reset.
    pub fn validate(
        &mut self,
        store: &mut SurfaceStore,
        spec: &TargetSpec<'_>,
    ) -> Result<(), RenderError> {
        if !self.pending_reset {
            return Ok(());
        }
        log::info!("resetting device after surface loss");
        let mut target = SurfaceReset {
            surface: &self.surface,
            device: &self.device,
            store,
            spec,
        };
        run_reset(&mut target, &self.params);
        self.pending_reset = false;
        Ok(())
    }

    /// Acquires the presentable back buffer for this frame.
    ///
    /// Timeouts drop the frame. A lost or outdated surface marks a reset as
    /// pending and drops the frame; repeated losses without a successful
    /// acquire in between escalate to `DeviceResetFailed`.
    pub fn acquire_frame(&mut self) -> Result<wgpu::SurfaceTexture, RenderError> {
        match self.surface.get_current_texture() {
            Ok(frame) => {
                self.failed_resets = 0;
                Ok(frame)
            }
            Err(e) => match classify_surface_error(&e) {
                AcquireFailure::Dropped => Err(RenderError::SurfaceAcquisitionFailed),
                AcquireFailure::Reset => {
                    self.pending_reset = true;
                    self.failed_resets += 1;
                    if self.failed_resets > MAX_RESET_ATTEMPTS {
                        Err(RenderError::DeviceResetFailed)
                    } else {
                        Err(RenderError::DeviceLost)
                    }
                }
                AcquireFailure::Fatal => Err(RenderError::SurfaceFatal(e)),
            },
        }
    }
}
