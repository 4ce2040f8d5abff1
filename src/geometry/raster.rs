//! Coverage helpers shared by the pixel buffer primitives and the brush
//! effects. Every visitor clips to `[0, width) x [0, height)` before calling
//! back, so callers can index their backing storage without re-checking.

use super::PixelPoint;

/// Visit the in-bounds pixels covered by a segment drawn `thickness` pixels
/// wide with round caps.
///
/// Thickness 1 is a connected Bresenham line; wider strokes cover every pixel
/// whose centre lies within `thickness / 2` of the segment.
pub fn for_each_line_pixel(
    from: PixelPoint,
    to: PixelPoint,
    thickness: i32,
    width: u32,
    height: u32,
    mut visit: impl FnMut(u32, u32),
) {
    if width == 0 || height == 0 {
        return;
    }

    if thickness <= 1 {
        // walk only the visible part; the full segment may span i32
        let Some((from, to)) = clip_segment(from, to, width, height) else {
            return;
        };
        for point in bresenham(from, to) {
            if let Some((x, y)) = clip(point, width, height) {
                visit(x, y);
            }
        }
        return;
    }

    let half = f64::from(thickness) / 2.0;
    let pad = half.ceil() as i64;
    let (min_x, max_x) = clamp_span(from.x.min(to.x), from.x.max(to.x), pad, width);
    let (min_y, max_y) = clamp_span(from.y.min(to.y), from.y.max(to.y), pad, height);

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            if distance_to_segment(x as f64, y as f64, from, to) <= half {
                visit(x as u32, y as u32);
            }
        }
    }
}

/// Visit the in-bounds pixels of a filled disc.
pub fn for_each_disc_pixel(
    center: PixelPoint,
    radius: i32,
    width: u32,
    height: u32,
    mut visit: impl FnMut(u32, u32),
) {
    if radius < 0 || width == 0 || height == 0 {
        return;
    }
    let r2 = i64::from(radius) * i64::from(radius);
    let (min_x, max_x) = clamp_span(center.x, center.x, i64::from(radius), width);
    let (min_y, max_y) = clamp_span(center.y, center.y, i64::from(radius), height);

    for y in min_y..=max_y {
        let dy = y - i64::from(center.y);
        for x in min_x..=max_x {
            let dx = x - i64::from(center.x);
            if dx * dx + dy * dy <= r2 {
                visit(x as u32, y as u32);
            }
        }
    }
}

/// Visit the in-bounds pixels of the filled, inclusive rectangle spanned by
/// two opposite corners.
pub fn for_each_rect_pixel(
    a: PixelPoint,
    b: PixelPoint,
    width: u32,
    height: u32,
    mut visit: impl FnMut(u32, u32),
) {
    if width == 0 || height == 0 {
        return;
    }
    let min_x = a.x.min(b.x).max(0);
    let min_y = a.y.min(b.y).max(0);
    let max_x = a.x.max(b.x).min(width as i32 - 1);
    let max_y = a.y.max(b.y).min(height as i32 - 1);

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            visit(x as u32, y as u32);
        }
    }
}

/// Closed polyline approximating an axis-aligned ellipse, one vertex per
/// degree with consecutive duplicates removed. The first vertex is repeated
/// at the end.
pub fn ellipse_outline(center: PixelPoint, axes: (i32, i32)) -> Vec<PixelPoint> {
    let (a, b) = (axes.0.unsigned_abs(), axes.1.unsigned_abs());
    if a == 0 && b == 0 {
        return vec![center];
    }

    let mut outline: Vec<PixelPoint> = Vec::with_capacity(361);
    for degree in 0..=360 {
        let theta = f64::from(degree).to_radians();
        let point = PixelPoint::new(
            center.x.saturating_add((f64::from(a) * theta.cos()).round() as i32),
            center.y.saturating_add((f64::from(b) * theta.sin()).round() as i32),
        );
        if outline.last() != Some(&point) {
            outline.push(point);
        }
    }
    outline
}

/// Integer points of the Bresenham line from `from` to `to`, both ends
/// included.
pub fn bresenham(from: PixelPoint, to: PixelPoint) -> impl Iterator<Item = PixelPoint> {
    let dx = (i64::from(to.x) - i64::from(from.x)).abs();
    let dy = -(i64::from(to.y) - i64::from(from.y)).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };

    let mut current = from;
    let mut err = dx + dy;
    let mut done = false;

    std::iter::from_fn(move || {
        if done {
            return None;
        }
        let point = current;
        if current == to {
            done = true;
        } else {
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                current.x += sx;
            }
            if e2 <= dx {
                err += dx;
                current.y += sy;
            }
        }
        Some(point)
    })
}

fn clip(point: PixelPoint, width: u32, height: u32) -> Option<(u32, u32)> {
    if point.x < 0 || point.y < 0 || point.x >= width as i32 || point.y >= height as i32 {
        None
    } else {
        Some((point.x as u32, point.y as u32))
    }
}

/// Inclusive pixel range covering `[low - pad, high + pad]`, clipped to
/// `[0, size)`. Empty when the span misses the buffer.
fn clamp_span(low: i32, high: i32, pad: i64, size: u32) -> (i64, i64) {
    (
        (i64::from(low) - pad).max(0),
        (i64::from(high) + pad).min(i64::from(size) - 1),
    )
}

/// Clip a segment to the pixel rectangle `[0, width - 1] x [0, height - 1]`
/// (Liang-Barsky). Segments already inside come back unchanged.
fn clip_segment(
    from: PixelPoint,
    to: PixelPoint,
    width: u32,
    height: u32,
) -> Option<(PixelPoint, PixelPoint)> {
    if clip(from, width, height).is_some() && clip(to, width, height).is_some() {
        return Some((from, to));
    }

    let (x0, y0) = (f64::from(from.x), f64::from(from.y));
    let (dx, dy) = (f64::from(to.x) - x0, f64::from(to.y) - y0);
    let (max_x, max_y) = (f64::from(width - 1), f64::from(height - 1));

    let mut t0: f64 = 0.0;
    let mut t1: f64 = 1.0;
    for (p, q) in [(-dx, x0), (dx, max_x - x0), (-dy, y0), (dy, max_y - y0)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let t = q / p;
            if p < 0.0 {
                t0 = t0.max(t);
            } else {
                t1 = t1.min(t);
            }
        }
    }
    if t0 > t1 {
        return None;
    }

    let at = |t: f64| {
        PixelPoint::new(
            (x0 + t * dx).round().clamp(0.0, max_x) as i32,
            (y0 + t * dy).round().clamp(0.0, max_y) as i32,
        )
    };
    Some((at(t0), at(t1)))
}

fn distance_to_segment(px: f64, py: f64, a: PixelPoint, b: PixelPoint) -> f64 {
    let (ax, ay) = (f64::from(a.x), f64::from(a.y));
    let (bx, by) = (f64::from(b.x), f64::from(b.y));
    let (dx, dy) = (bx - ax, by - ay);
    let len2 = dx * dx + dy * dy;
    let t = if len2 == 0.0 {
        0.0
    } else {
        (((px - ax) * dx + (py - ay) * dy) / len2).clamp(0.0, 1.0)
    };
    let (cx, cy) = (ax + t * dx, ay + t * dy);
    ((px - cx).powi(2) + (py - cy).powi(2)).sqrt()
}
