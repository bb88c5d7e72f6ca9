//! Pixel surfaces and the store that owns their lifecycle.
//!
//! Two kinds of surface live here: CPU-side [`PixelSurface`] buffers in the
//! canonical 32-bit RGBA format (the loaded bitmap and the staging back
//! buffer the overlays draw into), and the device-dependent render targets
//! (frame texture, depth texture, blit bind group) that must be rebuilt
//! whenever the surface is reconfigured after a loss.

use crate::device::PresentationParams;

pub const BYTES_PER_PIXEL: usize = 4;

/// A fixed-size RGBA8 pixel buffer with a row pitch of `width * 4` bytes.
#[derive(Debug, Clone)]
pub struct PixelSurface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * BYTES_PER_PIXEL],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row stride in bytes.
    pub fn pitch(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    pub fn fill(&mut self, color: [u8; 4]) {
        for px in self.data.chunks_exact_mut(BYTES_PER_PIXEL) {
            px.copy_from_slice(&color);
        }
    }

    /// Copies `src` onto this surface at (0, 0), row by row, without scaling.
    /// When dimensions differ only the overlapping region is written. Returns
    /// whether the dimensions matched exactly.
    pub fn copy_from(&mut self, src: &PixelSurface) -> bool {
        let rows = self.height.min(src.height) as usize;
        let cols = self.width.min(src.width) as usize * BYTES_PER_PIXEL;
        let dst_pitch = self.pitch();
        let src_pitch = src.pitch();
        for y in 0..rows {
            let d = y * dst_pitch;
            let s = y * src_pitch;
            self.data[d..d + cols].copy_from_slice(&src.data[s..s + cols]);
        }
        self.width == src.width && self.height == src.height
    }

    /// Temporary CPU view of the pixel memory for the composite write.
    pub fn lock(&mut self) -> LockedRect<'_> {
        LockedRect {
            width: self.width,
            height: self.height,
            pitch: self.width as usize * BYTES_PER_PIXEL,
            pixels: &mut self.data,
        }
    }
}

/// A locked view over a surface's pixels: raw bytes plus the row pitch.
/// Writes outside the surface bounds are silently skipped.
pub struct LockedRect<'a> {
    pub width: u32,
    pub height: u32,
    pub pitch: usize,
    pub pixels: &'a mut [u8],
}

impl LockedRect<'_> {
    pub fn put_pixel(&mut self, x: i32, y: i32, color: [u8; 4]) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let i = y as usize * self.pitch + x as usize * BYTES_PER_PIXEL;
        self.pixels[i..i + BYTES_PER_PIXEL].copy_from_slice(&color);
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = y as usize * self.pitch + x as usize * BYTES_PER_PIXEL;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }
}

/// Everything the blit pipeline needs to rebuild the per-reset targets.
pub struct TargetSpec<'a> {
    pub layout: &'a wgpu::BindGroupLayout,
    pub sampler: &'a wgpu::Sampler,
}

/// Device-dependent render targets. Released before a reset, rebuilt after.
pub struct RenderTargets {
    pub frame_texture: wgpu::Texture,
    pub depth_view: wgpu::TextureView,
    pub bind_group: wgpu::BindGroup,
    /// CPU staging back buffer the per-frame composite writes into.
    pub staging: PixelSurface,
}

/// Owns the back-buffer targets and the session bitmap, plus their release
/// order: targets go before the device, the bitmap is independent of the
/// reset cycle and lives until shutdown.
#[derive(Default)]
pub struct SurfaceStore {
    targets: Option<RenderTargets>,
    bitmap: Option<PixelSurface>,
    ever_acquired: bool,
}

impl SurfaceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_bitmap(&mut self, bitmap: PixelSurface) {
        self.bitmap = Some(bitmap);
    }

    pub fn bitmap(&self) -> Option<&PixelSurface> {
        self.bitmap.as_ref()
    }

    /// Drops the session bitmap. Safe to call repeatedly.
    pub fn release_bitmap(&mut self) {
        self.bitmap = None;
    }

    pub fn targets_mut(&mut self) -> Option<&mut RenderTargets> {
        self.targets.as_mut()
    }

    /// Split borrow for the composite step: mutable targets, shared bitmap.
    pub fn compose_parts(&mut self) -> (Option<&mut RenderTargets>, Option<&PixelSurface>) {
        (self.targets.as_mut(), self.bitmap.as_ref())
    }

    /// Whether targets were ever successfully built this session. Consulted
    /// by shutdown's conservative device-release guard.
    pub fn ever_acquired(&self) -> bool {
        self.ever_acquired
    }

    /// Drops the device-dependent targets. A no-op when already released.
    pub fn release_targets(&mut self) {
        self.targets = None;
    }

    /// (Re)creates the frame texture, depth buffer, bind group and staging
    /// surface for the given presentation parameters. The staging surface
    /// starts out cleared to black, matching the post-reset clear.
    pub fn rebuild_targets(
        &mut self,
        device: &wgpu::Device,
        params: &PresentationParams,
        spec: &TargetSpec<'_>,
    ) {
        let size = wgpu::Extent3d {
            width: params.width,
            height: params.height,
            depth_or_array_layers: 1,
        };

        let frame_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Frame Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let frame_view = frame_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Buffer"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: params.depth_format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: spec.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&frame_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(spec.sampler),
                },
            ],
            label: Some("blit_bind_group"),
        });

        let mut staging = PixelSurface::new(params.width, params.height);
        staging.fill([0, 0, 0, 255]);

        self.targets = Some(RenderTargets {
            frame_texture,
            depth_view,
            bind_group,
            staging,
        });
        self.ever_acquired = true;
    }
}
