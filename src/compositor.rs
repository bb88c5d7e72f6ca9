//! Per-frame composition: clear, validate, acquire, blit the bitmap, draw
//! the overlays into locked pixel memory, then present.

use crate::device::{DeviceManager, DEPTH_FORMAT};
use crate::error::RenderError;
use crate::fps::FrameRateOverlay;
use crate::line::LineOverlay;
use crate::surface::{SurfaceStore, TargetSpec};

/// Fixed background the target and staging surface are cleared to.
const CLEAR_RGBA: [u8; 4] = [0, 0, 55, 255];
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 55.0 / 255.0,
    a: 1.0,
};

/// Where the frame-rate counter lands, and its transparency key.
const FPS_POS: (i32, i32) = (40, 50);
const FPS_KEY: [u8; 4] = [255, 0, 255, 255];

/// What became of a frame that did not error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Presented,
    /// Device lost or acquire failed; nothing was presented.
    Dropped,
}

/// Owns the device-independent half of the blit pipeline. The bind group,
/// which references the per-reset frame texture, lives with the targets in
/// the [`SurfaceStore`].
pub struct Compositor {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

impl Compositor {
    pub fn new(dm: &DeviceManager) -> Self {
        let device = &dm.device;
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Blit Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("blit.wgsl").into()),
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
            label: Some("blit_bind_group_layout"),
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Blit Pipeline Layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Blit Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: dm.params().format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            layout,
            sampler,
        }
    }

    pub fn target_spec(&self) -> TargetSpec<'_> {
        TargetSpec {
            layout: &self.layout,
            sampler: &self.sampler,
        }
    }

    /// Runs one frame. Frame-scoped failures drop the frame and return
    /// [`FrameOutcome::Dropped`]; fatal errors propagate.
    pub fn render(
        &self,
        dm: &mut DeviceManager,
        store: &mut SurfaceStore,
        fps: &FrameRateOverlay,
        line: &LineOverlay,
    ) -> Result<FrameOutcome, RenderError> {
        dm.validate(store, &self.target_spec())?;

        let frame = match dm.acquire_frame() {
            Ok(frame) => frame,
            Err(e) if e.is_frame_scoped() => {
                log::warn!("dropping frame: {e}");
                return Ok(FrameOutcome::Dropped);
            }
            Err(e) => return Err(e),
        };

        let (targets, bitmap) = store.compose_parts();
        let targets = targets.ok_or(RenderError::NoDevice)?;

        // Clear, then composite the bitmap onto the staging back buffer.
        // A mismatched blit degrades the frame, it never aborts it: the
        // overlays are still drawn.
        targets.staging.fill(CLEAR_RGBA);
        if let Some(bitmap) = bitmap {
            if !targets.staging.copy_from(bitmap) {
                log::warn!(
                    "bitmap is {}x{} but back buffer is {}x{}; partial blit",
                    bitmap.width(),
                    bitmap.height(),
                    targets.staging.width(),
                    targets.staging.height(),
                );
            }
        }

        // Locked-memory composite write. Counter first, line last so the
        // line is never occluded by the digits.
        {
            let mut rect = targets.staging.lock();
            fps.render(FPS_POS.0, FPS_POS.1, &mut rect, FPS_KEY);
            line.draw(&mut rect);
        }

        dm.queue.write_texture(
            targets.frame_texture.as_image_copy(),
            targets.staging.data(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(targets.staging.pitch() as u32),
                rows_per_image: Some(targets.staging.height()),
            },
            wgpu::Extent3d {
                width: targets.staging.width(),
                height: targets.staging.height(),
                depth_or_array_layers: 1,
            },
        );

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = dm
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        // The scene bracket. No 3D content yet, but the pass still has to
        // wrap the blit before present is valid, and it clears the target
        // and depth buffer on load.
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &targets.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &targets.bind_group, &[]);
            pass.draw(0..6, 0..1);
        }

        dm.queue.submit(std::iter::once(encoder.finish()));

        // Full-surface present, no source or destination rectangles.
        frame.present();
        Ok(FrameOutcome::Presented)
    }
}
