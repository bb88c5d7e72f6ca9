//! Frame-rate tracking and the glyph-atlas digit overlay.

use std::path::Path;
use std::time::Instant;

use crate::bitmap;
use crate::error::RenderError;
use crate::surface::{LockedRect, PixelSurface};

/// Seconds of samples folded into one rate estimate.
const RATE_WINDOW: f32 = 1.0;

const DIGITS: u32 = 10;

struct GlyphAtlas {
    strip: PixelSurface,
    glyph_w: u32,
    glyph_h: u32,
}

/// Tracks elapsed time between frames and rasterizes the current rate into
/// the locked back buffer using a fixed digit strip.
#[derive(Default)]
pub struct FrameRateOverlay {
    atlas: Option<GlyphAtlas>,
    last_tick: Option<Instant>,
    frames: u32,
    elapsed: f32,
    rate: u32,
}

impl FrameRateOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Establishes the timing baseline, discarding any accumulated samples.
    pub fn reset_timing(&mut self) {
        self.last_tick = Some(Instant::now());
        self.frames = 0;
        self.elapsed = 0.0;
        self.rate = 0;
    }

    /// Advances the frame sample and returns the current integer rate.
    /// The first call only establishes the baseline and reports zero.
    pub fn tick(&mut self) -> u32 {
        let now = Instant::now();
        if let Some(prev) = self.last_tick {
            self.elapsed += now.duration_since(prev).as_secs_f32();
            self.frames += 1;
            if self.elapsed >= RATE_WINDOW {
                self.rate = (self.frames as f32 / self.elapsed).round() as u32;
                self.frames = 0;
                self.elapsed = 0.0;
            }
        }
        self.last_tick = Some(now);
        self.rate
    }

    pub fn rate(&self) -> u32 {
        self.rate
    }

    /// Loads the digit strip from `path` with the given cell size.
    pub fn load_glyphs(
        &mut self,
        path: &Path,
        glyph_w: u32,
        glyph_h: u32,
    ) -> Result<(), RenderError> {
        let strip = bitmap::load(path)?;
        self.with_atlas(strip, glyph_w, glyph_h)
    }

    /// Adopts an in-memory digit strip. The cell dimensions must evenly
    /// divide the strip and the strip must hold all ten digits.
    pub fn with_atlas(
        &mut self,
        strip: PixelSurface,
        glyph_w: u32,
        glyph_h: u32,
    ) -> Result<(), RenderError> {
        if glyph_w == 0
            || glyph_h == 0
            || strip.width() % glyph_w != 0
            || strip.height() % glyph_h != 0
            || strip.width() / glyph_w < DIGITS
        {
            return Err(RenderError::InvalidGlyphLayout(glyph_w, glyph_h));
        }
        self.atlas = Some(GlyphAtlas {
            strip,
            glyph_w,
            glyph_h,
        });
        Ok(())
    }

    /// Releases the glyph strip. Safe to call more than once.
    pub fn unload(&mut self) {
        self.atlas = None;
    }

    /// Writes the decimal digits of the current rate at (x, y).
    pub fn render(&self, x: i32, y: i32, rect: &mut LockedRect<'_>, key: [u8; 4]) {
        self.draw_value(self.rate, x, y, rect, key);
    }

    /// Blits one atlas cell per decimal digit of `value`, most significant
    /// first, left to right. Atlas pixels matching the transparency `key` are
    /// skipped. No allocation in the blit loop.
    pub fn draw_value(
        &self,
        value: u32,
        x: i32,
        y: i32,
        rect: &mut LockedRect<'_>,
        key: [u8; 4],
    ) {
        let Some(atlas) = &self.atlas else {
            return;
        };

        // u32::MAX has ten decimal digits.
        let mut digits = [0u8; 10];
        let mut n = value;
        let mut count = 0;
        loop {
            digits[count] = (n % 10) as u8;
            count += 1;
            n /= 10;
            if n == 0 {
                break;
            }
        }

        for i in 0..count {
            let digit = digits[count - 1 - i] as u32;
            let src_x = digit * atlas.glyph_w;
            let dst_x = x + (i as u32 * atlas.glyph_w) as i32;
            for row in 0..atlas.glyph_h {
                for col in 0..atlas.glyph_w {
                    let c = atlas.strip.pixel(src_x + col, row);
                    if c[..3] == key[..3] {
                        continue;
                    }
                    rect.put_pixel(dst_x + col as i32, y + row as i32, c);
                }
            }
        }
    }
}
