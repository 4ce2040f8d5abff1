use serde::{Deserialize, Serialize};

use crate::pixel_buffer::PixelBuffer;

/// Smallest zoom factor a viewport accepts unless configured otherwise
pub const MIN_ZOOM: f32 = 0.1;

/// Screen-space window onto the zoomed canvas.
///
/// The viewport never owns pixels: `present` builds a transient scaled and
/// cropped image from a borrowed buffer. Offsets are in zoomed-image pixels
/// and are re-clamped after every zoom or pan so the crop window always lies
/// inside the zoomed image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    zoom_factor: f32,
    min_zoom: f32,
    offset_x: u32,
    offset_y: u32,
    view_width: u32,
    view_height: u32,
    image_width: u32,
    image_height: u32,
}

impl Viewport {
    /// A 1:1 viewport of `view_width x view_height` onto an image of the
    /// given size
    pub fn new(view_width: u32, view_height: u32, image_width: u32, image_height: u32) -> Self {
        Self {
            zoom_factor: 1.0,
            min_zoom: MIN_ZOOM,
            offset_x: 0,
            offset_y: 0,
            view_width: view_width.max(1),
            view_height: view_height.max(1),
            image_width: image_width.max(1),
            image_height: image_height.max(1),
        }
    }

    pub fn with_min_zoom(mut self, min_zoom: f32) -> Self {
        if min_zoom.is_finite() && min_zoom > 0.0 {
            self.min_zoom = min_zoom;
            self.zoom_factor = self.zoom_factor.max(min_zoom);
        }
        self
    }

    pub fn zoom_factor(&self) -> f32 {
        self.zoom_factor
    }

    pub fn offset(&self) -> (u32, u32) {
        (self.offset_x, self.offset_y)
    }

    pub fn view_size(&self) -> (u32, u32) {
        (self.view_width, self.view_height)
    }

    /// Multiply the zoom factor by `factor`, floor-clamped to the minimum
    /// zoom. Non-positive or non-finite factors are ignored, as is any
    /// product that overflows `f32`.
    pub fn zoom(&mut self, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            log::debug!("Ignoring invalid zoom multiplier {factor}");
            return;
        }
        let zoom = self.zoom_factor * factor;
        if !zoom.is_finite() {
            log::debug!("Ignoring zoom multiplier {factor}: factor would overflow");
            return;
        }
        self.zoom_factor = zoom.max(self.min_zoom);
        self.clamp_offsets();
        log::debug!("Zoom factor now {:.3}", self.zoom_factor);
    }

    /// Shift the crop window by `(dx, dy)` zoomed pixels
    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.offset_x = shift(self.offset_x, dx);
        self.offset_y = shift(self.offset_y, dy);
        self.clamp_offsets();
    }

    /// Size of the image after applying the current zoom
    pub fn zoomed_size(&self) -> (u32, u32) {
        zoomed(self.image_width, self.image_height, self.zoom_factor)
    }

    /// Largest offsets that keep the crop window inside the zoomed image
    pub fn max_offset(&self) -> (u32, u32) {
        let (zw, zh) = self.zoomed_size();
        (
            zw.saturating_sub(self.view_width),
            zh.saturating_sub(self.view_height),
        )
    }

    pub fn set_view_size(&mut self, width: u32, height: u32) {
        self.view_width = width.max(1);
        self.view_height = height.max(1);
        self.clamp_offsets();
    }

    pub fn set_image_size(&mut self, width: u32, height: u32) {
        self.image_width = width.max(1);
        self.image_height = height.max(1);
        self.clamp_offsets();
    }

    /// Scale `buffer` by the zoom factor (nearest neighbour) and crop it to the
    /// view window. Only the visible window is sampled, so the cost follows
    /// the view size whatever the zoom. Pure with respect to `buffer`.
    pub fn present(&self, buffer: &PixelBuffer) -> PixelBuffer {
        let (zw, zh) = zoomed(buffer.width(), buffer.height(), self.zoom_factor);
        let x = self.offset_x.min(zw.saturating_sub(self.view_width));
        let y = self.offset_y.min(zh.saturating_sub(self.view_height));
        buffer.scaled_window((zw, zh), (x, y), (self.view_width, self.view_height))
    }

    /// Map a position inside the view to canvas coordinates
    pub fn screen_to_canvas(&self, screen: egui::Pos2) -> egui::Pos2 {
        egui::pos2(
            (screen.x + self.offset_x as f32) / self.zoom_factor,
            (screen.y + self.offset_y as f32) / self.zoom_factor,
        )
    }

    /// Map a canvas position to a position inside the view
    pub fn canvas_to_screen(&self, canvas: egui::Pos2) -> egui::Pos2 {
        egui::pos2(
            canvas.x * self.zoom_factor - self.offset_x as f32,
            canvas.y * self.zoom_factor - self.offset_y as f32,
        )
    }

    fn clamp_offsets(&mut self) {
        let (max_x, max_y) = self.max_offset();
        self.offset_x = self.offset_x.min(max_x);
        self.offset_y = self.offset_y.min(max_y);
    }
}

fn zoomed(width: u32, height: u32, zoom: f32) -> (u32, u32) {
    (
        ((width as f32 * zoom).round() as u32).max(1),
        ((height as f32 * zoom).round() as u32).max(1),
    )
}

fn shift(offset: u32, delta: i32) -> u32 {
    (i64::from(offset) + i64::from(delta)).clamp(0, i64::from(u32::MAX)) as u32
}
