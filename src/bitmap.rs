//! One-shot bitmap loading onto a system-memory surface.

use std::path::Path;

use crate::error::{AssetStage, RenderError};
use crate::surface::PixelSurface;

fn stage_error(stage: AssetStage, path: &Path, source: image::ImageError) -> RenderError {
    RenderError::AssetLoad {
        stage,
        path: path.to_path_buf(),
        source: Some(source),
    }
}

/// Loads an image file into a freshly allocated scratch surface.
///
/// The header is read first for the dimensions, the scratch surface is sized
/// to match, then the pixels are decoded into it in the canonical RGBA8
/// format. Each failure names its stage; nothing is allocated on failure and
/// nothing is retried.
pub fn load(path: &Path) -> Result<PixelSurface, RenderError> {
    let (width, height) = image::image_dimensions(path).map_err(|e| {
        let stage = match &e {
            image::ImageError::IoError(_) => AssetStage::Open,
            _ => AssetStage::Header,
        };
        stage_error(stage, path, e)
    })?;

    if width == 0 || height == 0 {
        return Err(RenderError::AssetLoad {
            stage: AssetStage::Allocate,
            path: path.to_path_buf(),
            source: None,
        });
    }
    let mut scratch = PixelSurface::new(width, height);

    let decoded = image::open(path)
        .map_err(|e| stage_error(AssetStage::Decode, path, e))?
        .to_rgba8();
    if decoded.dimensions() != (width, height) {
        return Err(RenderError::AssetLoad {
            stage: AssetStage::Decode,
            path: path.to_path_buf(),
            source: None,
        });
    }

    scratch.data_mut().copy_from_slice(decoded.as_raw());
    Ok(scratch)
}

/// Copies `src` into a persistent surface in the canonical 32-bit format.
///
/// This is the session bitmap surface: it lives in system memory, survives
/// device resets, and is released only at shutdown. The scratch surface from
/// [`load`] is dropped right after this copy.
pub fn convert(src: &PixelSurface) -> PixelSurface {
    let mut out = PixelSurface::new(src.width(), src.height());
    out.copy_from(src);
    out
}
