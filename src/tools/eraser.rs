use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::canvas::CanvasState;
use crate::error::{CanvasError, CanvasResult};
use crate::geometry::PixelPoint;
use crate::pixel_buffer::Region;
use crate::tools::{Tool, ToolOutcome};

pub const DEFAULT_ERASER_SIZE: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EraserShape {
    #[default]
    Circle,
    Square,
}

impl EraserShape {
    pub const ALL: [EraserShape; 2] = [EraserShape::Circle, EraserShape::Square];

    pub fn as_str(self) -> &'static str {
        match self {
            EraserShape::Circle => "circle",
            EraserShape::Square => "square",
        }
    }
}

impl fmt::Display for EraserShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EraserShape {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "circle" => Ok(EraserShape::Circle),
            "square" => Ok(EraserShape::Square),
            other => Err(CanvasError::UnknownEraserShape(other.to_string())),
        }
    }
}

/// Paints the background colour straight onto the committed buffer on every
/// press and drag. There is no preview stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Eraser {
    shape: EraserShape,
    size: i32,
    last_point: Option<PixelPoint>,
}

impl Default for Eraser {
    fn default() -> Self {
        Self::new(EraserShape::Circle, DEFAULT_ERASER_SIZE)
    }
}

impl Eraser {
    /// A size below one is raised to one
    pub fn new(shape: EraserShape, size: i32) -> Self {
        Self {
            shape,
            size: size.max(1),
            last_point: None,
        }
    }

    pub fn shape(&self) -> EraserShape {
        self.shape
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn set_size(&mut self, size: i32) -> CanvasResult {
        if size < 1 {
            return Err(CanvasError::InvalidEraserSize(size));
        }
        self.size = size;
        Ok(())
    }

    /// Accepts "circle" or "square"
    pub fn set_shape(&mut self, shape: &str) -> CanvasResult {
        self.shape = shape.parse()?;
        Ok(())
    }

    /// Region cleared for a pointer at `point`. Circles use `size` as radius;
    /// squares span `size / 2` either side.
    pub fn footprint(&self, point: PixelPoint) -> Region {
        match self.shape {
            EraserShape::Circle => Region::Disc {
                center: point,
                radius: self.size,
            },
            EraserShape::Square => {
                let half = self.size / 2;
                Region::Rect {
                    min: point.offset(-half, -half),
                    max: point.offset(half, half),
                }
            }
        }
    }
}

impl Tool for Eraser {
    fn name(&self) -> &'static str {
        "Eraser"
    }

    fn on_press(&mut self, point: PixelPoint, canvas: &mut CanvasState) -> ToolOutcome {
        self.last_point = Some(point);
        canvas.erase(self.footprint(point));
        ToolOutcome::Committed
    }

    fn on_drag(&mut self, point: PixelPoint, canvas: &mut CanvasState) -> ToolOutcome {
        if self.last_point.is_none() {
            return ToolOutcome::Ignored;
        }
        canvas.erase(self.footprint(point));
        self.last_point = Some(point);
        ToolOutcome::Committed
    }

    fn on_release(&mut self, _point: PixelPoint, _canvas: &mut CanvasState) -> ToolOutcome {
        self.last_point = None;
        ToolOutcome::Ignored
    }

    fn is_active(&self) -> bool {
        self.last_point.is_some()
    }

    fn cancel(&mut self, _canvas: &mut CanvasState) {
        self.last_point = None;
    }
}
