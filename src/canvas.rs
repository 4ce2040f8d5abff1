use image::Rgb;
use image::imageops::FilterType;

use crate::error::{CanvasError, CanvasResult};
use crate::geometry::PixelPoint;
use crate::history::UndoHistory;
use crate::pixel_buffer::{PixelBuffer, Region};

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;
pub const DEFAULT_BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
pub const DEFAULT_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
pub const DEFAULT_THICKNESS: i32 = 2;

/// A primitive applied to the committed buffer with the canvas' current
/// colour, thickness and opacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawOp {
    Line { from: PixelPoint, to: PixelPoint },
    Rectangle { a: PixelPoint, b: PixelPoint },
    Ellipse { center: PixelPoint, axes: (i32, i32) },
}

impl DrawOp {
    /// Rasterise onto an arbitrary buffer (a preview scratch, typically)
    pub fn draw(&self, buffer: &mut PixelBuffer, color: Rgb<u8>, thickness: i32) {
        match *self {
            DrawOp::Line { from, to } => buffer.draw_line(from, to, color, thickness),
            DrawOp::Rectangle { a, b } => buffer.draw_rect(a, b, color, thickness),
            DrawOp::Ellipse { center, axes } => buffer.draw_ellipse(center, axes, color, thickness),
        }
    }
}

/// Scale each channel by `opacity`, truncating toward zero.
pub fn apply_opacity(color: Rgb<u8>, opacity: f32) -> Rgb<u8> {
    Rgb(color.0.map(|channel| (f32::from(channel) * opacity) as u8))
}

/// The committed image plus the drawing parameters tools commit with.
///
/// Tools never reach into the buffer: every mutation goes through one of the
/// methods below. `drawing_enabled` is the simulated pen-down flag; `commit`
/// is a silent no-op while it is false.
#[derive(Debug, Clone)]
pub struct CanvasState {
    buffer: PixelBuffer,
    color: Rgb<u8>,
    thickness: i32,
    opacity: f32,
    drawing_enabled: bool,
    background: Rgb<u8>,
}

impl CanvasState {
    pub fn new(width: u32, height: u32, background: Rgb<u8>) -> CanvasResult<Self> {
        Ok(Self {
            buffer: PixelBuffer::new(width, height, background)?,
            color: DEFAULT_COLOR,
            thickness: DEFAULT_THICKNESS,
            opacity: 1.0,
            drawing_enabled: false,
            background,
        })
    }

    /// The committed buffer
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn color(&self) -> Rgb<u8> {
        self.color
    }

    pub fn thickness(&self) -> i32 {
        self.thickness
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn background_color(&self) -> Rgb<u8> {
        self.background
    }

    pub fn is_drawing_enabled(&self) -> bool {
        self.drawing_enabled
    }

    /// Colour that `commit` will actually write
    pub fn effective_color(&self) -> Rgb<u8> {
        apply_opacity(self.color, self.opacity)
    }

    pub fn set_color(&mut self, color: Rgb<u8>) {
        self.color = color;
    }

    pub fn set_thickness(&mut self, thickness: i32) -> CanvasResult {
        if thickness < 1 {
            return Err(CanvasError::InvalidThickness(thickness));
        }
        self.thickness = thickness;
        Ok(())
    }

    pub fn set_opacity(&mut self, opacity: f32) -> CanvasResult {
        if !(0.0..=1.0).contains(&opacity) {
            return Err(CanvasError::InvalidOpacity(opacity));
        }
        self.opacity = opacity;
        Ok(())
    }

    pub fn enable_drawing(&mut self) {
        self.drawing_enabled = true;
    }

    pub fn disable_drawing(&mut self) {
        self.drawing_enabled = false;
    }

    /// Reset to a fresh background-filled buffer of the same size. Takes the
    /// undo history so stale snapshots can never restore a pre-clear canvas.
    pub fn clear(&mut self, history: &mut UndoHistory) {
        self.buffer.fill(self.background);
        history.clear();
        log::info!("Canvas cleared ({}x{})", self.width(), self.height());
    }

    /// Apply `op` to the committed buffer if drawing is enabled. Returns
    /// whether anything was drawn.
    pub fn commit(&mut self, op: DrawOp) -> bool {
        if !self.drawing_enabled {
            log::trace!("Drawing disabled, dropping {op:?}");
            return false;
        }
        let color = self.effective_color();
        op.draw(&mut self.buffer, color, self.thickness);
        true
    }

    /// Fill `region` with the background colour, regardless of the pen state
    pub fn erase(&mut self, region: Region) {
        self.buffer.fill_region(region, self.background);
    }

    /// Replace the committed buffer wholesale
    pub fn replace_buffer(&mut self, buffer: PixelBuffer) {
        if buffer.dimensions() == self.buffer.dimensions() {
            self.buffer = buffer;
        } else {
            self.buffer = self.fit_to_canvas(&buffer);
        }
    }

    /// Show an external image as the committed buffer. Matching dimensions
    /// are copied exactly; anything else is resampled to the canvas size.
    pub fn restore_image(&mut self, image: &PixelBuffer) {
        if image.dimensions() == self.buffer.dimensions() {
            self.buffer.copy_from(image);
        } else {
            self.buffer = self.fit_to_canvas(image);
        }
    }

    fn fit_to_canvas(&self, image: &PixelBuffer) -> PixelBuffer {
        let (width, height) = self.buffer.dimensions();
        log::warn!(
            "Resampling {}x{} image to {}x{} canvas",
            image.width(),
            image.height(),
            width,
            height
        );
        image.resized(width, height, FilterType::Triangle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::pixel;

    #[test]
    fn test_zero_sized_canvas_rejected() {
        assert_eq!(
            CanvasState::new(0, 600, DEFAULT_BACKGROUND).unwrap_err(),
            CanvasError::InvalidDimensions { width: 0, height: 600 }
        );
    }

    #[test]
    fn test_default_canvas() {
        let canvas = CanvasState::new(DEFAULT_WIDTH, DEFAULT_HEIGHT, DEFAULT_BACKGROUND).unwrap();
        assert_eq!(canvas.buffer().dimensions(), (800, 600));
        assert_eq!(canvas.buffer().pixel(0, 0), Some(DEFAULT_BACKGROUND));
        assert!(!canvas.is_drawing_enabled());
    }

    #[test]
    fn test_thickness_validation() {
        let mut canvas = CanvasState::new(16, 16, DEFAULT_BACKGROUND).unwrap();
        for t in [1, 3, 30, 500] {
            canvas.set_thickness(t).unwrap();
            assert_eq!(canvas.thickness(), t);
        }
        assert_eq!(canvas.set_thickness(0), Err(CanvasError::InvalidThickness(0)));
        assert_eq!(canvas.set_thickness(-4), Err(CanvasError::InvalidThickness(-4)));
        assert_eq!(canvas.thickness(), 500);
    }

    #[test]
    fn test_opacity_validation() {
        let mut canvas = CanvasState::new(16, 16, DEFAULT_BACKGROUND).unwrap();
        canvas.set_opacity(0.25).unwrap();
        assert!(canvas.set_opacity(1.5).is_err());
        assert!(canvas.set_opacity(-0.1).is_err());
        assert!(canvas.set_opacity(f32::NAN).is_err());
        assert_eq!(canvas.opacity(), 0.25);
    }

    #[test]
    fn test_apply_opacity_truncates() {
        assert_eq!(apply_opacity(Rgb([200, 100, 50]), 0.5), Rgb([100, 50, 25]));
        assert_eq!(apply_opacity(Rgb([255, 255, 255]), 0.7), Rgb([178, 178, 178]));
        assert_eq!(apply_opacity(Rgb([99, 1, 3]), 0.5), Rgb([49, 0, 1]));
    }

    #[test]
    fn test_commit_respects_pen_state() {
        let mut canvas = CanvasState::new(20, 20, DEFAULT_BACKGROUND).unwrap();
        let op = DrawOp::Line { from: pixel(0, 5), to: pixel(19, 5) };

        assert!(!canvas.commit(op));
        assert_eq!(canvas.buffer().pixel(10, 5), Some(DEFAULT_BACKGROUND));

        canvas.enable_drawing();
        canvas.set_color(Rgb([200, 100, 50]));
        canvas.set_opacity(0.5).unwrap();
        assert!(canvas.commit(op));
        assert_eq!(canvas.buffer().pixel(10, 5), Some(Rgb([100, 50, 25])));
    }

    #[test]
    fn test_erase_ignores_pen_state() {
        let mut canvas = CanvasState::new(20, 20, DEFAULT_BACKGROUND).unwrap();
        canvas.enable_drawing();
        canvas.commit(DrawOp::Rectangle { a: pixel(0, 0), b: pixel(19, 19) });
        canvas.disable_drawing();
        canvas.erase(Region::Rect { min: pixel(0, 0), max: pixel(3, 3) });
        assert_eq!(canvas.buffer().pixel(0, 0), Some(DEFAULT_BACKGROUND));
    }

    #[test]
    fn test_clear_empties_history() {
        let mut canvas = CanvasState::new(10, 10, DEFAULT_BACKGROUND).unwrap();
        let mut history = UndoHistory::default();
        history.save_state(&canvas);
        canvas.enable_drawing();
        canvas.commit(DrawOp::Line { from: pixel(0, 0), to: pixel(9, 9) });

        canvas.clear(&mut history);
        assert!(!history.can_undo());
        assert!(canvas.buffer().as_raw().iter().all(|&b| b == 255));
    }

    #[test]
    fn test_restore_resamples_mismatched_image() {
        let mut canvas = CanvasState::new(10, 10, DEFAULT_BACKGROUND).unwrap();
        let small = PixelBuffer::new(5, 5, Rgb([0, 0, 0])).unwrap();
        canvas.restore_image(&small);
        assert_eq!(canvas.buffer().dimensions(), (10, 10));
        assert_eq!(canvas.buffer().pixel(5, 5), Some(Rgb([0, 0, 0])));
    }
}
