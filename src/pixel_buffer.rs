use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};

use crate::error::{CanvasError, CanvasResult};
use crate::geometry::PixelPoint;
use crate::geometry::raster;

/// Region filled by `PixelBuffer::fill_region`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// Filled disc of `radius` pixels around `center`
    Disc { center: PixelPoint, radius: i32 },
    /// Filled rectangle spanned by two opposite corners, both inclusive
    Rect { min: PixelPoint, max: PixelPoint },
}

/// Owned RGB raster. The backing storage always holds exactly
/// `width * height * 3` bytes, and no primitive ever reads or writes outside
/// it: all geometry is clipped first.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    image: RgbImage,
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish_non_exhaustive()
    }
}

impl PixelBuffer {
    /// Create a buffer filled with `fill`
    pub fn new(width: u32, height: u32, fill: Rgb<u8>) -> CanvasResult<Self> {
        if width == 0 || height == 0 {
            return Err(CanvasError::InvalidDimensions { width, height });
        }
        Ok(Self {
            image: RgbImage::from_pixel(width, height, fill),
        })
    }

    /// Wrap an existing image
    pub fn from_image(image: RgbImage) -> CanvasResult<Self> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(CanvasError::InvalidDimensions { width, height });
        }
        Ok(Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Tightly packed RGB bytes, row-major
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn as_image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// Pixel at `(x, y)`, or `None` outside the buffer
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgb<u8>> {
        if self.contains(x, y) {
            Some(*self.image.get_pixel(x as u32, y as u32))
        } else {
            None
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width() && (y as u32) < self.height()
    }

    /// Write one pixel. Returns false (and writes nothing) when out of bounds.
    pub fn put_pixel(&mut self, x: i32, y: i32, color: Rgb<u8>) -> bool {
        if self.contains(x, y) {
            self.image.put_pixel(x as u32, y as u32, color);
            true
        } else {
            false
        }
    }

    /// Overwrite every pixel with `color`
    pub fn fill(&mut self, color: Rgb<u8>) {
        for pixel in self.image.pixels_mut() {
            *pixel = color;
        }
    }

    pub fn draw_line(&mut self, from: PixelPoint, to: PixelPoint, color: Rgb<u8>, thickness: i32) {
        let (width, height) = self.dimensions();
        let image = &mut self.image;
        raster::for_each_line_pixel(from, to, thickness, width, height, |x, y| {
            image.put_pixel(x, y, color);
        });
    }

    /// Rectangle outline between two opposite corners
    pub fn draw_rect(&mut self, a: PixelPoint, b: PixelPoint, color: Rgb<u8>, thickness: i32) {
        let top_right = PixelPoint::new(b.x, a.y);
        let bottom_left = PixelPoint::new(a.x, b.y);
        self.draw_line(a, top_right, color, thickness);
        self.draw_line(top_right, b, color, thickness);
        self.draw_line(b, bottom_left, color, thickness);
        self.draw_line(bottom_left, a, color, thickness);
    }

    /// Axis-aligned ellipse outline with semi-axes `axes`
    pub fn draw_ellipse(
        &mut self,
        center: PixelPoint,
        axes: (i32, i32),
        color: Rgb<u8>,
        thickness: i32,
    ) {
        let outline = raster::ellipse_outline(center, axes);
        if let [only] = outline.as_slice() {
            self.draw_line(*only, *only, color, thickness);
            return;
        }
        for segment in outline.windows(2) {
            self.draw_line(segment[0], segment[1], color, thickness);
        }
    }

    pub fn fill_region(&mut self, region: Region, color: Rgb<u8>) {
        let (width, height) = self.dimensions();
        let image = &mut self.image;
        match region {
            Region::Disc { center, radius } => {
                raster::for_each_disc_pixel(center, radius, width, height, |x, y| {
                    image.put_pixel(x, y, color);
                });
            }
            Region::Rect { min, max } => {
                raster::for_each_rect_pixel(min, max, width, height, |x, y| {
                    image.put_pixel(x, y, color);
                });
            }
        }
    }

    /// Rewrite the pixels covered by a stroke through `shade`, which gets the
    /// current colour and the pixel position.
    pub fn shade_line(
        &mut self,
        from: PixelPoint,
        to: PixelPoint,
        thickness: i32,
        mut shade: impl FnMut(Rgb<u8>, u32, u32) -> Rgb<u8>,
    ) {
        let (width, height) = self.dimensions();
        let image = &mut self.image;
        raster::for_each_line_pixel(from, to, thickness, width, height, |x, y| {
            let current = *image.get_pixel(x, y);
            image.put_pixel(x, y, shade(current, x, y));
        });
    }

    /// Independent deep copy; never shares storage with `self`
    pub fn copy(&self) -> PixelBuffer {
        self.clone()
    }

    /// Overwrite `self` with `other`, reusing the allocation when the
    /// dimensions already match.
    pub fn copy_from(&mut self, other: &PixelBuffer) {
        if self.dimensions() == other.dimensions() {
            self.image.copy_from_slice(other.image.as_raw());
        } else {
            self.image = other.image.clone();
        }
    }

    /// Copy `src` into `self` with its top-left corner at `dest_origin`,
    /// clipped to both buffers.
    pub fn blit(&mut self, src: &PixelBuffer, dest_origin: PixelPoint) {
        let (dst_w, dst_h) = (self.width() as i64, self.height() as i64);
        let (src_w, src_h) = (src.width() as i64, src.height() as i64);
        let (ox, oy) = (i64::from(dest_origin.x), i64::from(dest_origin.y));

        let x0 = ox.max(0);
        let x1 = (ox + src_w).min(dst_w);
        let y0 = oy.max(0);
        let y1 = (oy + src_h).min(dst_h);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let row_bytes = ((x1 - x0) * 3) as usize;
        let dst_stride = (dst_w * 3) as usize;
        let src_stride = (src_w * 3) as usize;
        let src_raw = src.image.as_raw();
        let dst_raw: &mut [u8] = &mut self.image;

        for y in y0..y1 {
            let dst_start = y as usize * dst_stride + x0 as usize * 3;
            let src_start = (y - oy) as usize * src_stride + (x0 - ox) as usize * 3;
            dst_raw[dst_start..dst_start + row_bytes]
                .copy_from_slice(&src_raw[src_start..src_start + row_bytes]);
        }
    }

    /// Extract a `width x height` patch whose top-left corner is `origin`.
    /// Samples outside the buffer replicate the nearest edge pixel.
    pub fn region(&self, origin: PixelPoint, width: u32, height: u32) -> PixelBuffer {
        let max_x = self.width() as i32 - 1;
        let max_y = self.height() as i32 - 1;
        let patch = RgbImage::from_fn(width.max(1), height.max(1), |x, y| {
            let sx = (origin.x + x as i32).clamp(0, max_x);
            let sy = (origin.y + y as i32).clamp(0, max_y);
            *self.image.get_pixel(sx as u32, sy as u32)
        });
        Self { image: patch }
    }

    /// The `width x height` window at `(x, y)` of this buffer scaled by
    /// nearest neighbour to `scaled_width x scaled_height`, without building
    /// the full scaled image. Every output pixel is an exact copy of one
    /// source pixel, so hard edges stay hard at any zoom. The window is
    /// clipped to the scaled image.
    pub fn scaled_window(
        &self,
        (scaled_width, scaled_height): (u32, u32),
        (x, y): (u32, u32),
        (width, height): (u32, u32),
    ) -> PixelBuffer {
        let (scaled_width, scaled_height) = (scaled_width.max(1), scaled_height.max(1));
        let x = x.min(scaled_width - 1);
        let y = y.min(scaled_height - 1);
        let width = width.min(scaled_width - x).max(1);
        let height = height.min(scaled_height - y).max(1);

        let (src_w, src_h) = self.dimensions();
        let x_ratio = f64::from(src_w) / f64::from(scaled_width);
        let y_ratio = f64::from(src_h) / f64::from(scaled_height);
        let sample = |scaled: u32, ratio: f64, limit: u32| -> u32 {
            (((f64::from(scaled) + 0.5) * ratio) as u32).min(limit - 1)
        };
        let image = RgbImage::from_fn(width, height, |vx, vy| {
            let sx = sample(x + vx, x_ratio, src_w);
            let sy = sample(y + vy, y_ratio, src_h);
            *self.image.get_pixel(sx, sy)
        });
        Self { image }
    }

    /// Nearest-neighbour resample of the whole buffer
    pub fn resized_nearest(&self, width: u32, height: u32) -> PixelBuffer {
        self.scaled_window((width, height), (0, 0), (width, height))
    }

    /// Resample to new dimensions with one of the `image` crate filters
    pub fn resized(&self, width: u32, height: u32, filter: FilterType) -> PixelBuffer {
        let (width, height) = (width.max(1), height.max(1));
        if (width, height) == self.dimensions() {
            return self.clone();
        }
        Self {
            image: imageops::resize(&self.image, width, height, filter),
        }
    }

    /// Crop to the part of `[x, x + width) x [y, y + height)` that lies inside
    /// the buffer. An empty intersection yields a 1x1 crop of the nearest
    /// corner so the result is always a valid buffer.
    pub fn cropped(&self, x: u32, y: u32, width: u32, height: u32) -> PixelBuffer {
        let x = x.min(self.width() - 1);
        let y = y.min(self.height() - 1);
        let width = width.min(self.width() - x).max(1);
        let height = height.min(self.height() - y).max(1);
        Self {
            image: imageops::crop_imm(&self.image, x, y, width, height).to_image(),
        }
    }

    /// Separable Gaussian blur with an odd `kernel_size`; `sigma` is derived
    /// from the kernel size the way OpenCV does when it is left at zero.
    /// Borders replicate the edge pixel.
    pub fn gaussian_blur(&self, kernel_size: u32) -> PixelBuffer {
        let kernel = gaussian_kernel(kernel_size);
        let radius = (kernel.len() / 2) as i64;
        if radius == 0 {
            return self.clone();
        }

        let (w, h) = (self.width() as i64, self.height() as i64);
        let src = self.image.as_raw();
        let mut horizontal = vec![0.0f32; src.len()];

        for y in 0..h {
            for x in 0..w {
                let mut acc = [0.0f32; 3];
                for (k, weight) in kernel.iter().enumerate() {
                    let sx = (x + k as i64 - radius).clamp(0, w - 1);
                    let idx = ((y * w + sx) * 3) as usize;
                    for c in 0..3 {
                        acc[c] += f32::from(src[idx + c]) * weight;
                    }
                }
                let out = ((y * w + x) * 3) as usize;
                horizontal[out..out + 3].copy_from_slice(&acc);
            }
        }

        let mut out = RgbImage::new(self.width(), self.height());
        for y in 0..h {
            for x in 0..w {
                let mut acc = [0.0f32; 3];
                for (k, weight) in kernel.iter().enumerate() {
                    let sy = (y + k as i64 - radius).clamp(0, h - 1);
                    let idx = ((sy * w + x) * 3) as usize;
                    for c in 0..3 {
                        acc[c] += horizontal[idx + c] * weight;
                    }
                }
                out.put_pixel(
                    x as u32,
                    y as u32,
                    Rgb(acc.map(|v| v.round().clamp(0.0, 255.0) as u8)),
                );
            }
        }
        Self { image: out }
    }
}

/// Normalised 1-D Gaussian weights. Even sizes are bumped to the next odd
/// size.
fn gaussian_kernel(kernel_size: u32) -> Vec<f32> {
    let size = (kernel_size.max(1) | 1) as usize;
    if size == 1 {
        return vec![1.0];
    }
    let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let radius = (size / 2) as f32;
    let s2 = 2.0 * sigma * sigma;

    let mut kernel: Vec<f32> = (0..size)
        .map(|i| {
            let x = i as f32 - radius;
            (-x * x / s2).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    for weight in &mut kernel {
        *weight /= sum;
    }
    kernel
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::pixel;

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    const RED: Rgb<u8> = Rgb([255, 0, 0]);

    fn white(width: u32, height: u32) -> PixelBuffer {
        PixelBuffer::new(width, height, WHITE).unwrap()
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert_eq!(
            PixelBuffer::new(0, 10, WHITE),
            Err(CanvasError::InvalidDimensions { width: 0, height: 10 })
        );
    }

    #[test]
    fn test_backing_store_length() {
        let buffer = white(7, 5);
        assert_eq!(buffer.as_raw().len(), 7 * 5 * 3);
    }

    #[test]
    fn test_copy_does_not_alias() {
        let original = white(4, 4);
        let mut copy = original.copy();
        copy.put_pixel(1, 1, BLACK);
        assert_eq!(original.pixel(1, 1), Some(WHITE));
        assert_eq!(copy.pixel(1, 1), Some(BLACK));
    }

    #[test]
    fn test_off_canvas_line_is_clipped() {
        let mut buffer = white(10, 10);
        buffer.draw_line(pixel(-100, -100), pixel(100, 100), BLACK, 5);
        assert_eq!(buffer.as_raw().len(), 300);
        assert_eq!(buffer.pixel(5, 5), Some(BLACK));
    }

    #[test]
    fn test_rect_outline_leaves_interior() {
        let mut buffer = white(20, 20);
        buffer.draw_rect(pixel(2, 2), pixel(12, 12), RED, 1);
        assert_eq!(buffer.pixel(2, 2), Some(RED));
        assert_eq!(buffer.pixel(12, 7), Some(RED));
        assert_eq!(buffer.pixel(7, 7), Some(WHITE));
    }

    #[test]
    fn test_ellipse_outline_touches_axes() {
        let mut buffer = white(40, 40);
        buffer.draw_ellipse(pixel(20, 20), (10, 5), BLACK, 1);
        assert_eq!(buffer.pixel(30, 20), Some(BLACK));
        assert_eq!(buffer.pixel(20, 25), Some(BLACK));
        assert_eq!(buffer.pixel(20, 20), Some(WHITE));
    }

    #[test]
    fn test_fill_disc_radius() {
        let mut buffer = PixelBuffer::new(50, 50, BLACK).unwrap();
        buffer.fill_region(Region::Disc { center: pixel(25, 25), radius: 10 }, WHITE);
        assert_eq!(buffer.pixel(35, 25), Some(WHITE));
        assert_eq!(buffer.pixel(36, 25), Some(BLACK));
        assert_eq!(buffer.pixel(33, 33), Some(BLACK));
    }

    #[test]
    fn test_blit_clips_to_destination() {
        let mut dest = white(5, 5);
        let src = PixelBuffer::new(3, 3, RED).unwrap();
        dest.blit(&src, pixel(3, -1));
        assert_eq!(dest.pixel(3, 0), Some(RED));
        assert_eq!(dest.pixel(4, 1), Some(RED));
        assert_eq!(dest.pixel(4, 2), Some(WHITE));
        assert_eq!(dest.pixel(2, 0), Some(WHITE));
    }

    #[test]
    fn test_region_replicates_edges() {
        let mut buffer = white(4, 4);
        buffer.put_pixel(0, 0, RED);
        let patch = buffer.region(pixel(-2, -2), 3, 3);
        assert_eq!(patch.pixel(0, 0), Some(RED));
        assert_eq!(patch.pixel(2, 2), Some(RED));
    }

    #[test]
    fn test_blur_of_flat_image_is_identity() {
        let buffer = PixelBuffer::new(8, 8, Rgb([40, 80, 120])).unwrap();
        assert_eq!(buffer.gaussian_blur(5), buffer);
    }

    #[test]
    fn test_blur_spreads_a_dot() {
        let mut buffer = PixelBuffer::new(9, 9, BLACK).unwrap();
        buffer.put_pixel(4, 4, WHITE);
        let blurred = buffer.gaussian_blur(5);
        let center = blurred.pixel(4, 4).unwrap();
        let neighbour = blurred.pixel(5, 4).unwrap();
        assert!(center[0] < 255);
        assert!(neighbour[0] > 0);
    }

    #[test]
    fn test_nearest_upscale_duplicates_pixels() {
        let mut buffer = white(2, 1);
        buffer.put_pixel(1, 0, RED);
        let scaled = buffer.resized_nearest(4, 2);
        assert_eq!(scaled.pixel(1, 1), Some(WHITE));
        assert_eq!(scaled.pixel(2, 0), Some(RED));
        assert_eq!(scaled.pixel(3, 1), Some(RED));
    }

    #[test]
    fn test_scaled_window_matches_full_resample() {
        let mut buffer = white(5, 4);
        buffer.put_pixel(3, 2, RED);
        let full = buffer.resized_nearest(15, 12);
        let window = buffer.scaled_window((15, 12), (6, 3), (8, 8));
        assert_eq!(window.dimensions(), (8, 8));
        for vy in 0..8 {
            for vx in 0..8 {
                assert_eq!(window.pixel(vx, vy), full.pixel(vx + 6, vy + 3));
            }
        }
    }

    #[test]
    fn test_scaled_window_clips_to_scaled_image() {
        let buffer = white(4, 4);
        let window = buffer.scaled_window((8, 8), (6, 7), (10, 10));
        assert_eq!(window.dimensions(), (2, 1));
    }

    #[test]
    fn test_cropped_stays_in_bounds() {
        let buffer = white(10, 10);
        let crop = buffer.cropped(8, 8, 5, 5);
        assert_eq!(crop.dimensions(), (2, 2));
    }

    #[test]
    fn test_copy_from_reuses_dimensions() {
        let mut target = white(3, 3);
        let source = PixelBuffer::new(3, 3, RED).unwrap();
        target.copy_from(&source);
        assert_eq!(target, source);
    }
}
