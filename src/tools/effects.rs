//! Stroke-to-effect algorithms used by the brush family and the blur brush.
//!
//! Every function here works on a scratch buffer handed in by the tool; none
//! of them know about the committed canvas.

use image::Rgb;
use rand::Rng;

use crate::geometry::PixelPoint;
use crate::pixel_buffer::PixelBuffer;

/// Sub-lines drawn per bristle step
pub const BRISTLE_COUNT: usize = 5;
/// Max jitter applied to each bristle endpoint, in pixels
pub const BRISTLE_JITTER: i32 = 3;
/// Kernel used by the soft brush
pub const SOFT_KERNEL: u32 = 21;
/// Side of the square noise tile used by the textured brush
pub const TEXTURE_SIZE: u32 = 20;
/// Weight of the original pixels when blending a blurred patch back
pub const BLUR_KEEP: f32 = 0.7;

/// Draw `BRISTLE_COUNT` jittered thin lines between `from` and `to`.
pub fn bristle_stroke(
    buffer: &mut PixelBuffer,
    from: PixelPoint,
    to: PixelPoint,
    color: Rgb<u8>,
    rng: &mut impl Rng,
) {
    for _ in 0..BRISTLE_COUNT {
        let start = jitter(from, rng);
        let end = jitter(to, rng);
        let width = rng.gen_range(2..=5);
        buffer.draw_line(start, end, color, width);
    }
}

fn jitter(point: PixelPoint, rng: &mut impl Rng) -> PixelPoint {
    point.offset(
        rng.gen_range(-BRISTLE_JITTER..=BRISTLE_JITTER),
        rng.gen_range(-BRISTLE_JITTER..=BRISTLE_JITTER),
    )
}

/// Draw the stroke, then replace the stroke's own pixels with a blurred
/// version of their neighbourhood.
///
/// Only the stroke's bounding box (padded by the kernel radius) is blurred,
/// so the cost tracks the segment length rather than the canvas size.
pub fn soft_stroke(
    buffer: &mut PixelBuffer,
    from: PixelPoint,
    to: PixelPoint,
    color: Rgb<u8>,
    thickness: i32,
) {
    buffer.draw_line(from, to, color, thickness);

    let pad = thickness.max(1) / 2 + 1 + (SOFT_KERNEL / 2) as i32;
    let origin = PixelPoint::new(from.x.min(to.x) - pad, from.y.min(to.y) - pad);
    let width = ((from.x - to.x).unsigned_abs()) + 2 * pad as u32 + 1;
    let height = ((from.y - to.y).unsigned_abs()) + 2 * pad as u32 + 1;

    let blurred = buffer.region(origin, width, height).gaussian_blur(SOFT_KERNEL);
    buffer.shade_line(from, to, thickness, |current, x, y| {
        blurred
            .pixel(x as i32 - origin.x, y as i32 - origin.y)
            .unwrap_or(current)
    });
}

/// Greyscale noise tile, stretched over the whole canvas when sampled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoiseTexture {
    values: Vec<u8>,
}

impl NoiseTexture {
    pub fn random(rng: &mut impl Rng) -> Self {
        let mut values = vec![0u8; (TEXTURE_SIZE * TEXTURE_SIZE) as usize];
        rng.fill(values.as_mut_slice());
        Self { values }
    }

    /// Texture value at canvas position `(x, y)` of a `width x height`
    /// canvas, nearest-neighbour mapped.
    pub fn sample(&self, x: u32, y: u32, width: u32, height: u32) -> u8 {
        let tx = (u64::from(x) * u64::from(TEXTURE_SIZE) / u64::from(width.max(1))) as u32;
        let ty = (u64::from(y) * u64::from(TEXTURE_SIZE) / u64::from(height.max(1))) as u32;
        let tx = tx.min(TEXTURE_SIZE - 1);
        let ty = ty.min(TEXTURE_SIZE - 1);
        self.values[(ty * TEXTURE_SIZE + tx) as usize]
    }
}

/// Mask the existing pixels under the stroke with the noise texture
/// (bitwise AND per channel). No colour is laid down.
pub fn textured_stroke(
    buffer: &mut PixelBuffer,
    from: PixelPoint,
    to: PixelPoint,
    thickness: i32,
    texture: &NoiseTexture,
) {
    let (width, height) = buffer.dimensions();
    buffer.shade_line(from, to, thickness, |current, x, y| {
        let noise = texture.sample(x, y, width, height);
        Rgb(current.0.map(|channel| channel & noise))
    });
}

/// Blur kernel half-size for a segment of `distance` pixels: fast strokes
/// blur less.
pub fn speed_adjusted_strength(base: i32, distance: f32) -> i32 {
    let speed = (distance / 5.0).clamp(1.0, 10.0);
    ((base as f32 / speed) as i32).max(1)
}

/// Blur a square patch centred at `from` and blend it back over the
/// original at `BLUR_KEEP` original weight. Returns the kernel strength used.
pub fn blur_segment(
    buffer: &mut PixelBuffer,
    from: PixelPoint,
    to: PixelPoint,
    thickness: i32,
    base_strength: i32,
) -> i32 {
    let strength = speed_adjusted_strength(base_strength, from.distance(to));
    let side = 2 * (thickness / 2).max(1);
    let origin = from.offset(-side / 2, -side / 2);

    let original = buffer.region(origin, side as u32, side as u32);
    let blurred = original.gaussian_blur((strength * 2 + 1) as u32);
    let blended = blend(&original, &blurred, BLUR_KEEP);
    buffer.blit(&blended, origin);
    strength
}

fn blend(original: &PixelBuffer, blurred: &PixelBuffer, keep: f32) -> PixelBuffer {
    let mut out = original.clone();
    let (width, height) = original.dimensions();
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            if let (Some(a), Some(b)) = (original.pixel(x, y), blurred.pixel(x, y)) {
                let mixed = std::array::from_fn(|c| {
                    (f32::from(a.0[c]) * keep + f32::from(b.0[c]) * (1.0 - keep))
                        .round()
                        .clamp(0.0, 255.0) as u8
                });
                out.put_pixel(x, y, Rgb(mixed));
            }
        }
    }
    out
}
