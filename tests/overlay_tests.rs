use blitline::error::RenderError;
use blitline::fps::FrameRateOverlay;
use blitline::line::{LineOverlay, Point, LINE_COLOR};
use blitline::surface::PixelSurface;

const GLYPH_W: u32 = 2;
const GLYPH_H: u32 = 1;
const KEY: [u8; 4] = [255, 0, 255, 255];

/// Color every pixel of digit `d`'s cell is filled with in the test atlas.
fn digit_color(d: u8) -> [u8; 4] {
    [10 + d, 200, 0, 255]
}

/// A 20x1 strip: ten 2x1 cells, one solid color per digit.
fn test_atlas() -> PixelSurface {
    let mut strip = PixelSurface::new(GLYPH_W * 10, GLYPH_H);
    {
        let mut rect = strip.lock();
        for d in 0..10u8 {
            for col in 0..GLYPH_W {
                rect.put_pixel((d as u32 * GLYPH_W + col) as i32, 0, digit_color(d));
            }
        }
    }
    strip
}

fn overlay_with_atlas(strip: PixelSurface) -> FrameRateOverlay {
    let mut overlay = FrameRateOverlay::new();
    overlay
        .with_atlas(strip, GLYPH_W, GLYPH_H)
        .expect("atlas layout is valid");
    overlay
}

fn count_colored(surface: &PixelSurface, color: [u8; 4]) -> usize {
    let mut n = 0;
    for y in 0..surface.height() {
        for x in 0..surface.width() {
            if surface.pixel(x, y) == color {
                n += 1;
            }
        }
    }
    n
}

// ============================================================================
// LineOverlay
// ============================================================================

#[test]
fn test_degenerate_line_writes_one_pixel() {
    let mut surface = PixelSurface::new(8, 8);
    let mut line = LineOverlay::new();
    line.set_start(Point::new(0, 0));
    line.set_end(Point::new(0, 0));

    line.draw(&mut surface.lock());

    assert_eq!(count_colored(&surface, LINE_COLOR), 1);
    assert_eq!(surface.pixel(0, 0), LINE_COLOR);
}

#[test]
fn test_horizontal_line_writes_row_zero() {
    let mut surface = PixelSurface::new(8, 8);
    let mut line = LineOverlay::new();
    line.set_start(Point::new(0, 0));
    line.set_end(Point::new(3, 0));

    line.draw(&mut surface.lock());

    assert_eq!(count_colored(&surface, LINE_COLOR), 4);
    for x in 0..4 {
        assert_eq!(surface.pixel(x, 0), LINE_COLOR, "column {x} of row 0");
    }
}

#[test]
fn test_diagonal_line_endpoints_written() {
    let mut surface = PixelSurface::new(8, 8);
    let mut line = LineOverlay::new();
    line.set_start(Point::new(1, 1));
    line.set_end(Point::new(6, 4));

    line.draw(&mut surface.lock());

    assert_eq!(surface.pixel(1, 1), LINE_COLOR);
    assert_eq!(surface.pixel(6, 4), LINE_COLOR);
}

#[test]
fn test_off_surface_samples_are_clipped() {
    let mut surface = PixelSurface::new(4, 4);
    let mut line = LineOverlay::new();
    // Off-surface endpoints are accepted at set time and clipped at draw time.
    line.set_start(Point::new(-3, 1));
    line.set_end(Point::new(7, 1));

    line.draw(&mut surface.lock());

    assert_eq!(count_colored(&surface, LINE_COLOR), 4);
    for x in 0..4 {
        assert_eq!(surface.pixel(x, 1), LINE_COLOR);
    }
}

#[test]
fn test_extreme_endpoints_clip_instead_of_faulting() {
    let mut surface = PixelSurface::new(4, 4);
    let mut line = LineOverlay::new();
    // Any integer point is valid at set time; the draw clips it.
    line.set_start(Point::new(i32::MIN, 0));
    line.set_end(Point::new(1, 0));

    line.draw(&mut surface.lock());

    assert_eq!(count_colored(&surface, LINE_COLOR), 2);
    assert_eq!(surface.pixel(0, 0), LINE_COLOR);
    assert_eq!(surface.pixel(1, 0), LINE_COLOR);
}

#[test]
fn test_full_range_diagonal_crosses_the_surface() {
    let mut surface = PixelSurface::new(4, 4);
    let mut line = LineOverlay::new();
    line.set_start(Point::new(i32::MIN, i32::MIN));
    line.set_end(Point::new(i32::MAX, i32::MAX));

    line.draw(&mut surface.lock());

    assert_eq!(count_colored(&surface, LINE_COLOR), 4);
    assert_eq!(surface.pixel(0, 0), LINE_COLOR);
    assert_eq!(surface.pixel(3, 3), LINE_COLOR);
}

#[test]
fn test_fully_off_surface_line_writes_nothing() {
    let mut surface = PixelSurface::new(4, 4);
    let mut line = LineOverlay::new();
    line.set_start(Point::new(-10, -10));
    line.set_end(Point::new(-1, -1));

    line.draw(&mut surface.lock());

    assert_eq!(count_colored(&surface, LINE_COLOR), 0);
}

// ============================================================================
// FrameRateOverlay
// ============================================================================

#[test]
fn test_single_digit_writes_one_glyph_cell() {
    let overlay = overlay_with_atlas(test_atlas());
    let mut surface = PixelSurface::new(16, 4);

    overlay.draw_value(7, 0, 0, &mut surface.lock(), KEY);

    assert_eq!(count_colored(&surface, digit_color(7)), (GLYPH_W * GLYPH_H) as usize);
    assert_eq!(surface.pixel(0, 0), digit_color(7));
    assert_eq!(surface.pixel(1, 0), digit_color(7));
    assert_eq!(surface.pixel(2, 0), [0, 0, 0, 0]);
}

#[test]
fn test_two_digits_adjacent_in_ascending_order() {
    let overlay = overlay_with_atlas(test_atlas());
    let mut surface = PixelSurface::new(16, 4);

    overlay.draw_value(42, 0, 0, &mut surface.lock(), KEY);

    // Most significant digit first, cells adjacent.
    assert_eq!(surface.pixel(0, 0), digit_color(4));
    assert_eq!(surface.pixel(1, 0), digit_color(4));
    assert_eq!(surface.pixel(2, 0), digit_color(2));
    assert_eq!(surface.pixel(3, 0), digit_color(2));
    assert_eq!(surface.pixel(4, 0), [0, 0, 0, 0]);
}

#[test]
fn test_zero_renders_single_zero_glyph() {
    let overlay = overlay_with_atlas(test_atlas());
    let mut surface = PixelSurface::new(16, 4);

    overlay.draw_value(0, 0, 0, &mut surface.lock(), KEY);

    assert_eq!(count_colored(&surface, digit_color(0)), (GLYPH_W * GLYPH_H) as usize);
}

#[test]
fn test_key_colored_atlas_pixels_are_skipped() {
    let mut strip = test_atlas();
    // Second column of digit 7's cell becomes the transparency key.
    strip.lock().put_pixel((7 * GLYPH_W + 1) as i32, 0, KEY);
    let overlay = overlay_with_atlas(strip);
    let mut surface = PixelSurface::new(16, 4);

    overlay.draw_value(7, 0, 0, &mut surface.lock(), KEY);

    assert_eq!(surface.pixel(0, 0), digit_color(7));
    assert_eq!(surface.pixel(1, 0), [0, 0, 0, 0], "key pixel must be skipped");
}

#[test]
fn test_glyphs_clip_at_surface_edge() {
    let overlay = overlay_with_atlas(test_atlas());
    let mut surface = PixelSurface::new(3, 2);

    overlay.draw_value(42, 2, 0, &mut surface.lock(), KEY);

    // Only the first column of the first cell fits.
    assert_eq!(surface.pixel(2, 0), digit_color(4));
    assert_eq!(count_colored(&surface, digit_color(2)), 0);
}

#[test]
fn test_non_dividing_cell_size_is_invalid_layout() {
    let mut overlay = FrameRateOverlay::new();
    let strip = PixelSurface::new(20, 1);
    let err = overlay.with_atlas(strip, 3, 1).unwrap_err();
    assert!(matches!(err, RenderError::InvalidGlyphLayout(3, 1)));
}

#[test]
fn test_strip_without_all_digits_is_invalid_layout() {
    let mut overlay = FrameRateOverlay::new();
    // 9 cells of 2x1: tiles evenly but cannot hold ten digits.
    let strip = PixelSurface::new(18, 1);
    assert!(overlay.with_atlas(strip, 2, 1).is_err());
}

#[test]
fn test_render_without_atlas_is_a_noop() {
    let overlay = FrameRateOverlay::new();
    let mut surface = PixelSurface::new(8, 8);
    overlay.render(0, 0, &mut surface.lock(), KEY);
    assert_eq!(count_colored(&surface, [0, 0, 0, 0]), 64);
}

#[test]
fn test_unload_is_idempotent() {
    let mut overlay = overlay_with_atlas(test_atlas());
    overlay.unload();
    overlay.unload();

    let mut surface = PixelSurface::new(8, 8);
    overlay.draw_value(7, 0, 0, &mut surface.lock(), KEY);
    assert_eq!(count_colored(&surface, digit_color(7)), 0);
}

#[test]
fn test_first_tick_reports_zero() {
    let mut overlay = FrameRateOverlay::new();
    assert_eq!(overlay.tick(), 0);
    assert_eq!(overlay.rate(), 0);
}
