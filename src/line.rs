//! Mouse-drawn line overlay.

use crate::surface::LockedRect;

pub const LINE_COLOR: [u8; 4] = [255, 255, 255, 255];

/// Integer pixel coordinate in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A start/end point pair, written by input handling and rasterized into the
/// locked back buffer each frame. Off-surface points are accepted here and
/// clipped at draw time.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineOverlay {
    start: Point,
    end: Point,
}

impl LineOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_start(&mut self, p: Point) {
        self.start = p;
    }

    pub fn set_end(&mut self, p: Point) {
        self.end = p;
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    /// Bresenham rasterization of the segment into the locked rect.
    ///
    /// The segment is clipped to the rect bounds before stepping, in wide
    /// arithmetic: endpoints anywhere in the i32 range are valid input, and
    /// the walk stays bounded by the surface size. A segment entirely off the
    /// surface writes nothing. A degenerate on-surface segment writes exactly
    /// one pixel.
    pub fn draw(&self, rect: &mut LockedRect<'_>) {
        let Some((mut x, mut y, x1, y1)) = clip_segment(
            i64::from(self.start.x),
            i64::from(self.start.y),
            i64::from(self.end.x),
            i64::from(self.end.y),
            i64::from(rect.width),
            i64::from(rect.height),
        ) else {
            return;
        };

        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx: i64 = if x < x1 { 1 } else { -1 };
        let sy: i64 = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            rect.put_pixel(x as i32, y as i32, LINE_COLOR);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }
}

const CLIP_LEFT: u8 = 1;
const CLIP_RIGHT: u8 = 2;
const CLIP_TOP: u8 = 4;
const CLIP_BOTTOM: u8 = 8;

fn outcode(x: i64, y: i64, xmax: i64, ymax: i64) -> u8 {
    let mut code = 0;
    if x < 0 {
        code |= CLIP_LEFT;
    } else if x > xmax {
        code |= CLIP_RIGHT;
    }
    if y < 0 {
        code |= CLIP_TOP;
    } else if y > ymax {
        code |= CLIP_BOTTOM;
    }
    code
}

/// The intersection products can exceed i64 when both endpoints sit near the
/// i32 extremes, so the multiply runs in i128.
fn mul_div(a: i64, b: i64, d: i64) -> i64 {
    (a as i128 * b as i128 / d as i128) as i64
}

/// Cohen-Sutherland clip of the segment to `[0, w) x [0, h)`. Returns the
/// clipped endpoints, or `None` when the segment misses the rect entirely.
fn clip_segment(
    mut x0: i64,
    mut y0: i64,
    mut x1: i64,
    mut y1: i64,
    w: i64,
    h: i64,
) -> Option<(i64, i64, i64, i64)> {
    if w == 0 || h == 0 {
        return None;
    }
    let (xmax, ymax) = (w - 1, h - 1);
    let mut c0 = outcode(x0, y0, xmax, ymax);
    let mut c1 = outcode(x1, y1, xmax, ymax);

    loop {
        if c0 | c1 == 0 {
            return Some((x0, y0, x1, y1));
        }
        if c0 & c1 != 0 {
            return None;
        }

        // One endpoint is outside; pull it onto the crossed boundary. The
        // divisor is never zero: both endpoints past the same boundary were
        // rejected above.
        let c = if c0 != 0 { c0 } else { c1 };
        let (x, y);
        if c & CLIP_LEFT != 0 {
            y = y0 + mul_div(y1 - y0, -x0, x1 - x0);
            x = 0;
        } else if c & CLIP_RIGHT != 0 {
            y = y0 + mul_div(y1 - y0, xmax - x0, x1 - x0);
            x = xmax;
        } else if c & CLIP_TOP != 0 {
            x = x0 + mul_div(x1 - x0, -y0, y1 - y0);
            y = 0;
        } else {
            x = x0 + mul_div(x1 - x0, ymax - y0, y1 - y0);
            y = ymax;
        }

        if c == c0 {
            x0 = x;
            y0 = y;
            c0 = outcode(x0, y0, xmax, ymax);
        } else {
            x1 = x;
            y1 = y;
            c1 = outcode(x1, y1, xmax, ymax);
        }
    }
}
