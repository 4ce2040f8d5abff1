pub mod raster;

use serde::{Deserialize, Serialize};

/// Integer pixel coordinate in canvas (model) space. May lie outside the
/// canvas; every raster operation clips before touching memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

/// Shorthand for `PixelPoint::new`, in the spirit of `egui::pos2`.
pub const fn pixel(x: i32, y: i32) -> PixelPoint {
    PixelPoint::new(x, y)
}

impl PixelPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Euclidean distance to `other`
    pub fn distance(self, other: PixelPoint) -> f32 {
        let dx = (other.x - self.x) as f32;
        let dy = (other.y - self.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }

    /// Component-wise midpoint, rounded toward negative infinity
    pub fn midpoint(self, other: PixelPoint) -> Self {
        Self::new(
            (self.x + other.x).div_euclid(2),
            (self.y + other.y).div_euclid(2),
        )
    }
}

impl From<(i32, i32)> for PixelPoint {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl From<egui::Pos2> for PixelPoint {
    fn from(pos: egui::Pos2) -> Self {
        Self::new(pos.x.floor() as i32, pos.y.floor() as i32)
    }
}

impl From<PixelPoint> for egui::Pos2 {
    fn from(point: PixelPoint) -> Self {
        egui::pos2(point.x as f32, point.y as f32)
    }
}
