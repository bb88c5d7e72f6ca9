use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which step of an asset load fell over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetStage {
    Open,
    Header,
    Allocate,
    Decode,
}

impl fmt::Display for AssetStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssetStage::Open => "open",
            AssetStage::Header => "header read",
            AssetStage::Allocate => "surface allocation",
            AssetStage::Decode => "decode",
        };
        f.write_str(s)
    }
}

/// Rendering and lifecycle errors.
///
/// Init-time errors abort startup. `DeviceLost` and `SurfaceAcquisitionFailed`
/// are frame-scoped: the frame is dropped and the loop carries on. Everything
/// else is fatal to the loop.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("could not create the render device: {0}")]
    DeviceCreationFailed(String),

    /// Transient. The device will be reset on the next validate pass.
    #[error("device lost")]
    DeviceLost,

    #[error("could not reset device")]
    DeviceResetFailed,

    /// Frame-scoped: this frame is dropped, no teardown.
    #[error("couldn't get back buffer")]
    SurfaceAcquisitionFailed,

    #[error("unrecoverable surface error: {0}")]
    SurfaceFatal(wgpu::SurfaceError),

    #[error("asset {stage} failed for {}", .path.display())]
    AssetLoad {
        stage: AssetStage,
        path: PathBuf,
        #[source]
        source: Option<image::ImageError>,
    },

    #[error("glyph cells of {0}x{1} do not tile the atlas")]
    InvalidGlyphLayout(u32, u32),

    #[error("cannot render because there is no device")]
    NoDevice,
}

impl RenderError {
    /// True for errors that degrade the current frame instead of ending the loop.
    pub fn is_frame_scoped(&self) -> bool {
        matches!(
            self,
            RenderError::DeviceLost | RenderError::SurfaceAcquisitionFailed
        )
    }
}
