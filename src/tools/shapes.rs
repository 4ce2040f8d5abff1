use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::canvas::{CanvasState, DrawOp};
use crate::error::CanvasError;
use crate::geometry::PixelPoint;
use crate::pixel_buffer::PixelBuffer;
use crate::tools::{Tool, ToolOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Ellipse,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 2] = [ShapeKind::Rectangle, ShapeKind::Ellipse];
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Ellipse => "ellipse",
        })
    }
}

impl FromStr for ShapeKind {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rectangle" => Ok(ShapeKind::Rectangle),
            "ellipse" => Ok(ShapeKind::Ellipse),
            other => Err(CanvasError::UnknownShapeKind(other.to_string())),
        }
    }
}

/// Which figure a click-drag tool produces from its anchor and the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeMode {
    Line,
    Shapes(ShapeKind),
    /// Centred on the anchor, radius is the distance to the pointer
    Circle,
    /// Grows from the anchor towards +x/+y, side is the smaller axis delta
    Square,
}

impl ShapeMode {
    pub fn draw_op(self, anchor: PixelPoint, end: PixelPoint) -> DrawOp {
        match self {
            ShapeMode::Line => DrawOp::Line { from: anchor, to: end },
            ShapeMode::Shapes(ShapeKind::Rectangle) => DrawOp::Rectangle { a: anchor, b: end },
            ShapeMode::Shapes(ShapeKind::Ellipse) => DrawOp::Ellipse {
                center: anchor.midpoint(end),
                axes: ((anchor.x - end.x).abs() / 2, (anchor.y - end.y).abs() / 2),
            },
            ShapeMode::Circle => {
                let radius = anchor.distance(end) as i32;
                DrawOp::Ellipse {
                    center: anchor,
                    axes: (radius, radius),
                }
            }
            ShapeMode::Square => {
                let side = (end.x - anchor.x).abs().min((end.y - anchor.y).abs());
                DrawOp::Rectangle {
                    a: anchor,
                    b: anchor.offset(side, side),
                }
            }
        }
    }
}

/// Click-drag figure tool: the anchor stays fixed, every drag redraws the
/// figure on a fresh copy of the committed buffer, release commits it.
#[derive(Debug, Clone)]
pub struct ShapeTool {
    mode: ShapeMode,
    anchor: Option<PixelPoint>,
    scratch: Option<PixelBuffer>,
}

impl ShapeTool {
    pub fn new(mode: ShapeMode) -> Self {
        Self {
            mode,
            anchor: None,
            scratch: None,
        }
    }

    pub fn line() -> Self {
        Self::new(ShapeMode::Line)
    }

    pub fn shapes(kind: ShapeKind) -> Self {
        Self::new(ShapeMode::Shapes(kind))
    }

    pub fn circle() -> Self {
        Self::new(ShapeMode::Circle)
    }

    pub fn square() -> Self {
        Self::new(ShapeMode::Square)
    }

    pub fn mode(&self) -> ShapeMode {
        self.mode
    }

    /// Only meaningful for the `Shapes` mode
    pub fn set_shape_kind(&mut self, kind: ShapeKind) {
        if let ShapeMode::Shapes(current) = &mut self.mode {
            *current = kind;
        }
    }
}

impl Tool for ShapeTool {
    fn name(&self) -> &'static str {
        match self.mode {
            ShapeMode::Line => "Line",
            ShapeMode::Shapes(_) => "Shapes",
            ShapeMode::Circle => "Circle",
            ShapeMode::Square => "Square",
        }
    }

    fn on_press(&mut self, point: PixelPoint, _canvas: &mut CanvasState) -> ToolOutcome {
        self.anchor = Some(point);
        ToolOutcome::Ignored
    }

    fn on_drag(&mut self, point: PixelPoint, canvas: &mut CanvasState) -> ToolOutcome {
        let Some(anchor) = self.anchor else {
            return ToolOutcome::Ignored;
        };
        let scratch = self.scratch.get_or_insert_with(|| canvas.buffer().copy());
        scratch.copy_from(canvas.buffer());
        self.mode
            .draw_op(anchor, point)
            .draw(scratch, canvas.effective_color(), canvas.thickness());
        ToolOutcome::Previewed
    }

    fn on_release(&mut self, point: PixelPoint, canvas: &mut CanvasState) -> ToolOutcome {
        let Some(anchor) = self.anchor.take() else {
            return ToolOutcome::Ignored;
        };
        let was_enabled = canvas.is_drawing_enabled();
        canvas.enable_drawing();
        canvas.commit(self.mode.draw_op(anchor, point));
        if !was_enabled {
            canvas.disable_drawing();
        }
        ToolOutcome::Committed
    }

    fn preview(&self) -> Option<&PixelBuffer> {
        self.anchor.and(self.scratch.as_ref())
    }

    fn is_active(&self) -> bool {
        self.anchor.is_some()
    }

    fn cancel(&mut self, _canvas: &mut CanvasState) {
        self.anchor = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::DEFAULT_BACKGROUND;
    use crate::geometry::pixel;
    use image::Rgb;

    const BLACK: Option<Rgb<u8>> = Some(Rgb([0, 0, 0]));
    const WHITE: Option<Rgb<u8>> = Some(DEFAULT_BACKGROUND);

    fn canvas() -> CanvasState {
        let mut canvas = CanvasState::new(100, 100, DEFAULT_BACKGROUND).unwrap();
        canvas.set_thickness(1).unwrap();
        canvas
    }

    #[test]
    fn test_draw_ops() {
        let a = pixel(10, 10);
        assert_eq!(
            ShapeMode::Shapes(ShapeKind::Ellipse).draw_op(a, pixel(31, 20)),
            DrawOp::Ellipse { center: pixel(20, 15), axes: (10, 5) }
        );
        assert_eq!(
            ShapeMode::Circle.draw_op(a, pixel(13, 14)),
            DrawOp::Ellipse { center: a, axes: (5, 5) }
        );
        assert_eq!(
            ShapeMode::Square.draw_op(a, pixel(0, 40)),
            DrawOp::Rectangle { a, b: pixel(20, 20) }
        );
    }

    #[test]
    fn test_preview_does_not_accumulate() {
        let mut canvas = canvas();
        let mut tool = ShapeTool::line();
        tool.on_press(pixel(10, 10), &mut canvas);
        tool.on_drag(pixel(90, 10), &mut canvas);
        assert_eq!(tool.preview().and_then(|p| p.pixel(50, 10)), BLACK);

        tool.on_drag(pixel(10, 90), &mut canvas);
        let preview = tool.preview().unwrap();
        assert_eq!(preview.pixel(50, 10), WHITE);
        assert_eq!(preview.pixel(10, 50), BLACK);
        assert_eq!(canvas.buffer().pixel(10, 50), WHITE);
    }

    #[test]
    fn test_release_commits_even_with_pen_up() {
        let mut canvas = canvas();
        let mut tool = ShapeTool::shapes(ShapeKind::Rectangle);
        tool.on_press(pixel(10, 10), &mut canvas);
        tool.on_drag(pixel(30, 30), &mut canvas);
        assert_eq!(tool.on_release(pixel(40, 40), &mut canvas), ToolOutcome::Committed);

        assert_eq!(canvas.buffer().pixel(25, 10), BLACK);
        assert_eq!(canvas.buffer().pixel(40, 25), BLACK);
        assert_eq!(canvas.buffer().pixel(30, 30), WHITE);
        assert!(!canvas.is_drawing_enabled());
        assert!(tool.preview().is_none());
    }

    #[test]
    fn test_release_without_press_is_ignored() {
        let mut canvas = canvas();
        let before = canvas.buffer().clone();
        let mut tool = ShapeTool::circle();
        assert_eq!(tool.on_release(pixel(5, 5), &mut canvas), ToolOutcome::Ignored);
        assert_eq!(canvas.buffer(), &before);
    }

    #[test]
    fn test_shape_kind_parse() {
        assert_eq!("ellipse".parse::<ShapeKind>(), Ok(ShapeKind::Ellipse));
        assert!("hexagon".parse::<ShapeKind>().is_err());
    }
}
