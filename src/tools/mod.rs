use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::canvas::CanvasState;
use crate::error::CanvasError;
use crate::geometry::PixelPoint;
use crate::pixel_buffer::PixelBuffer;

pub mod effects;

mod blur_brush;
mod brush;
mod eraser;
mod pen;
mod shapes;
mod turtle;

pub use blur_brush::{BlurBrush, DEFAULT_BLUR_STRENGTH};
pub use brush::{BRUSH_OPACITY, Brush, BrushKind, DYNAMIC_THICKNESS};
pub use eraser::{DEFAULT_ERASER_SIZE, Eraser, EraserShape};
pub use pen::Pen;
pub use shapes::{ShapeKind, ShapeMode, ShapeTool};
pub use turtle::{DEFAULT_SPEED, TurtleCommand, TurtleTool};

/// What a pointer event did to the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolOutcome {
    /// Nothing visible changed
    Ignored,
    /// The tool's scratch buffer changed; the committed buffer did not
    Previewed,
    /// The committed buffer changed
    Committed,
}

/// Tool trait defines the three-event pointer protocol every drawing tool
/// implements.
///
/// A stroke is `on_press`, zero or more `on_drag`, then `on_release`. Drag and
/// release without a prior press are no-ops. Tools only touch the canvas
/// through `CanvasState`'s own operations.
pub trait Tool {
    /// Return the name of the tool
    fn name(&self) -> &'static str;

    /// Called when the tool becomes the active tool
    fn activate(&mut self, _canvas: &mut CanvasState) {
        // default: do nothing
    }

    /// Primary button pressed at `point`
    fn on_press(&mut self, point: PixelPoint, canvas: &mut CanvasState) -> ToolOutcome;

    /// Pointer moved to `point` with the primary button held
    fn on_drag(&mut self, point: PixelPoint, canvas: &mut CanvasState) -> ToolOutcome;

    /// Primary button released at `point`
    fn on_release(&mut self, point: PixelPoint, canvas: &mut CanvasState) -> ToolOutcome;

    /// Uncommitted scratch buffer to display instead of the canvas, while a
    /// stroke is in progress
    fn preview(&self) -> Option<&PixelBuffer> {
        None
    }

    /// Whether a stroke is in progress
    fn is_active(&self) -> bool {
        false
    }

    /// Abandon any in-progress stroke without committing it
    fn cancel(&mut self, _canvas: &mut CanvasState) {}
}

/// Tool selection, with the per-variant parameter where there is one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ToolKind {
    #[default]
    Pen,
    Pencil,
    Brush(BrushKind),
    BlurBrush,
    Eraser(EraserShape),
    Line,
    Shapes(ShapeKind),
    Circle,
    Square,
    Turtle,
}

impl ToolKind {
    /// Every selectable tool with its default parameter
    pub const ALL: [ToolKind; 10] = [
        ToolKind::Pen,
        ToolKind::Pencil,
        ToolKind::Brush(BrushKind::Bristle),
        ToolKind::BlurBrush,
        ToolKind::Eraser(EraserShape::Circle),
        ToolKind::Line,
        ToolKind::Shapes(ShapeKind::Rectangle),
        ToolKind::Circle,
        ToolKind::Square,
        ToolKind::Turtle,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ToolKind::Pen => "Pen",
            ToolKind::Pencil => "Pencil",
            ToolKind::Brush(_) => "Brush",
            ToolKind::BlurBrush => "Blur Brush",
            ToolKind::Eraser(_) => "Eraser",
            ToolKind::Line => "Line",
            ToolKind::Shapes(_) => "Shapes",
            ToolKind::Circle => "Circle",
            ToolKind::Square => "Square",
            ToolKind::Turtle => "Turtle",
        }
    }

    /// Same variant, ignoring the parameter
    pub fn same_tool(self, other: ToolKind) -> bool {
        std::mem::discriminant(&self) == std::mem::discriminant(&other)
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolKind::Brush(kind) => write!(f, "brush:{kind}"),
            ToolKind::Eraser(shape) => write!(f, "eraser:{shape}"),
            ToolKind::Shapes(kind) => write!(f, "shapes:{kind}"),
            other => f.write_str(&other.label().to_lowercase().replace(' ', "_")),
        }
    }
}

/// Parses `name` or `name:parameter`, e.g. `pen`, `brush:soft`,
/// `eraser:square`, `shapes:ellipse`.
impl FromStr for ToolKind {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, param) = match s.split_once(':') {
            Some((name, param)) => (name, Some(param)),
            None => (s, None),
        };
        let plain = |kind: ToolKind| match param {
            None => Ok(kind),
            Some(_) => Err(CanvasError::UnknownTool(s.to_string())),
        };
        match name {
            "pen" => plain(ToolKind::Pen),
            "pencil" => plain(ToolKind::Pencil),
            "brush" => Ok(ToolKind::Brush(param.map(str::parse).transpose()?.unwrap_or_default())),
            "blur_brush" => plain(ToolKind::BlurBrush),
            "eraser" => Ok(ToolKind::Eraser(param.map(str::parse).transpose()?.unwrap_or_default())),
            "line" => plain(ToolKind::Line),
            "shapes" => Ok(ToolKind::Shapes(param.map(str::parse).transpose()?.unwrap_or_default())),
            "circle" => plain(ToolKind::Circle),
            "square" => plain(ToolKind::Square),
            "turtle" => plain(ToolKind::Turtle),
            _ => Err(CanvasError::UnknownTool(s.to_string())),
        }
    }
}

/// Construction parameters shared by the tool factory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolSettings {
    pub eraser_size: i32,
    pub blur_strength: i32,
    /// Fixed seed for the brush family; `None` seeds from entropy
    pub brush_seed: Option<u64>,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            eraser_size: DEFAULT_ERASER_SIZE,
            blur_strength: DEFAULT_BLUR_STRENGTH,
            brush_seed: None,
        }
    }
}

/// Enum representing all available tool types.
/// Dispatch is a plain match, so every variant implements every event.
#[derive(Debug, Clone)]
pub enum ToolType {
    Pen(Pen),
    Brush(Brush),
    BlurBrush(BlurBrush),
    Eraser(Eraser),
    Shape(ShapeTool),
    Turtle(TurtleTool),
}

impl ToolType {
    pub fn new(kind: ToolKind, settings: &ToolSettings, canvas: &CanvasState) -> Self {
        match kind {
            ToolKind::Pen => Self::Pen(Pen::new()),
            ToolKind::Pencil => Self::Pen(Pen::pencil()),
            ToolKind::Brush(kind) => Self::Brush(match settings.brush_seed {
                Some(seed) => Brush::with_seed(kind, seed),
                None => Brush::new(kind),
            }),
            ToolKind::BlurBrush => Self::BlurBrush(BlurBrush::new(settings.blur_strength)),
            ToolKind::Eraser(shape) => Self::Eraser(Eraser::new(shape, settings.eraser_size)),
            ToolKind::Line => Self::Shape(ShapeTool::line()),
            ToolKind::Shapes(kind) => Self::Shape(ShapeTool::shapes(kind)),
            ToolKind::Circle => Self::Shape(ShapeTool::circle()),
            ToolKind::Square => Self::Shape(ShapeTool::square()),
            ToolKind::Turtle => Self::Turtle(TurtleTool::new(canvas)),
        }
    }

    /// The selection this tool was built from, with its current parameter
    pub fn kind(&self) -> ToolKind {
        match self {
            Self::Pen(pen) if pen.name() == "Pencil" => ToolKind::Pencil,
            Self::Pen(_) => ToolKind::Pen,
            Self::Brush(brush) => ToolKind::Brush(brush.kind()),
            Self::BlurBrush(_) => ToolKind::BlurBrush,
            Self::Eraser(eraser) => ToolKind::Eraser(eraser.shape()),
            Self::Shape(tool) => match tool.mode() {
                ShapeMode::Line => ToolKind::Line,
                ShapeMode::Shapes(kind) => ToolKind::Shapes(kind),
                ShapeMode::Circle => ToolKind::Circle,
                ShapeMode::Square => ToolKind::Square,
            },
            Self::Turtle(_) => ToolKind::Turtle,
        }
    }

    pub fn as_pen_mut(&mut self) -> Option<&mut Pen> {
        match self {
            Self::Pen(pen) => Some(pen),
            _ => None,
        }
    }

    pub fn as_brush_mut(&mut self) -> Option<&mut Brush> {
        match self {
            Self::Brush(brush) => Some(brush),
            _ => None,
        }
    }

    pub fn as_blur_brush_mut(&mut self) -> Option<&mut BlurBrush> {
        match self {
            Self::BlurBrush(brush) => Some(brush),
            _ => None,
        }
    }

    pub fn as_eraser_mut(&mut self) -> Option<&mut Eraser> {
        match self {
            Self::Eraser(eraser) => Some(eraser),
            _ => None,
        }
    }

    pub fn as_shape_mut(&mut self) -> Option<&mut ShapeTool> {
        match self {
            Self::Shape(tool) => Some(tool),
            _ => None,
        }
    }

    pub fn as_turtle_mut(&mut self) -> Option<&mut TurtleTool> {
        match self {
            Self::Turtle(turtle) => Some(turtle),
            _ => None,
        }
    }
}

impl Tool for ToolType {
    fn name(&self) -> &'static str {
        match self {
            Self::Pen(tool) => tool.name(),
            Self::Brush(tool) => tool.name(),
            Self::BlurBrush(tool) => tool.name(),
            Self::Eraser(tool) => tool.name(),
            Self::Shape(tool) => tool.name(),
            Self::Turtle(tool) => tool.name(),
        }
    }

    fn activate(&mut self, canvas: &mut CanvasState) {
        match self {
            Self::Pen(tool) => tool.activate(canvas),
            Self::Brush(tool) => tool.activate(canvas),
            Self::BlurBrush(tool) => tool.activate(canvas),
            Self::Eraser(tool) => tool.activate(canvas),
            Self::Shape(tool) => tool.activate(canvas),
            Self::Turtle(tool) => tool.activate(canvas),
        }
    }

    fn on_press(&mut self, point: PixelPoint, canvas: &mut CanvasState) -> ToolOutcome {
        match self {
            Self::Pen(tool) => tool.on_press(point, canvas),
            Self::Brush(tool) => tool.on_press(point, canvas),
            Self::BlurBrush(tool) => tool.on_press(point, canvas),
            Self::Eraser(tool) => tool.on_press(point, canvas),
            Self::Shape(tool) => tool.on_press(point, canvas),
            Self::Turtle(tool) => tool.on_press(point, canvas),
        }
    }

    fn on_drag(&mut self, point: PixelPoint, canvas: &mut CanvasState) -> ToolOutcome {
        match self {
            Self::Pen(tool) => tool.on_drag(point, canvas),
            Self::Brush(tool) => tool.on_drag(point, canvas),
            Self::BlurBrush(tool) => tool.on_drag(point, canvas),
            Self::Eraser(tool) => tool.on_drag(point, canvas),
            Self::Shape(tool) => tool.on_drag(point, canvas),
            Self::Turtle(tool) => tool.on_drag(point, canvas),
        }
    }

    fn on_release(&mut self, point: PixelPoint, canvas: &mut CanvasState) -> ToolOutcome {
        match self {
            Self::Pen(tool) => tool.on_release(point, canvas),
            Self::Brush(tool) => tool.on_release(point, canvas),
            Self::BlurBrush(tool) => tool.on_release(point, canvas),
            Self::Eraser(tool) => tool.on_release(point, canvas),
            Self::Shape(tool) => tool.on_release(point, canvas),
            Self::Turtle(tool) => tool.on_release(point, canvas),
        }
    }

    fn preview(&self) -> Option<&PixelBuffer> {
        match self {
            Self::Pen(tool) => tool.preview(),
            Self::Brush(tool) => tool.preview(),
            Self::BlurBrush(tool) => tool.preview(),
            Self::Eraser(tool) => tool.preview(),
            Self::Shape(tool) => tool.preview(),
            Self::Turtle(tool) => tool.preview(),
        }
    }

    fn is_active(&self) -> bool {
        match self {
            Self::Pen(tool) => tool.is_active(),
            Self::Brush(tool) => tool.is_active(),
            Self::BlurBrush(tool) => tool.is_active(),
            Self::Eraser(tool) => tool.is_active(),
            Self::Shape(tool) => tool.is_active(),
            Self::Turtle(tool) => tool.is_active(),
        }
    }

    fn cancel(&mut self, canvas: &mut CanvasState) {
        match self {
            Self::Pen(tool) => tool.cancel(canvas),
            Self::Brush(tool) => tool.cancel(canvas),
            Self::BlurBrush(tool) => tool.cancel(canvas),
            Self::Eraser(tool) => tool.cancel(canvas),
            Self::Shape(tool) => tool.cancel(canvas),
            Self::Turtle(tool) => tool.cancel(canvas),
        }
    }
}

/// Factory function to create a tool from its textual name (see
/// `ToolKind::from_str`)
pub fn new_tool(name: &str, settings: &ToolSettings, canvas: &CanvasState) -> Result<ToolType, CanvasError> {
    let kind: ToolKind = name.parse()?;
    Ok(ToolType::new(kind, settings, canvas))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::DEFAULT_BACKGROUND;

    #[test]
    fn test_parse_tool_kind() {
        assert_eq!("pen".parse::<ToolKind>(), Ok(ToolKind::Pen));
        assert_eq!("brush".parse::<ToolKind>(), Ok(ToolKind::Brush(BrushKind::Bristle)));
        assert_eq!("brush:textured".parse::<ToolKind>(), Ok(ToolKind::Brush(BrushKind::Textured)));
        assert_eq!("eraser:square".parse::<ToolKind>(), Ok(ToolKind::Eraser(EraserShape::Square)));
        assert_eq!(
            "eraser:star".parse::<ToolKind>(),
            Err(CanvasError::UnknownEraserShape("star".into()))
        );
        assert_eq!("pen:fat".parse::<ToolKind>(), Err(CanvasError::UnknownTool("pen:fat".into())));
        assert_eq!("lasso".parse::<ToolKind>(), Err(CanvasError::UnknownTool("lasso".into())));
    }

    #[test]
    fn test_display_parses_back() {
        for kind in ToolKind::ALL {
            assert_eq!(kind.to_string().parse::<ToolKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_factory_builds_every_kind() {
        let canvas = CanvasState::new(40, 40, DEFAULT_BACKGROUND).unwrap();
        let settings = ToolSettings::default();
        for kind in ToolKind::ALL {
            let tool = ToolType::new(kind, &settings, &canvas);
            assert_eq!(tool.kind(), kind);
            assert_eq!(tool.name(), kind.label());
            assert!(!tool.is_active());
        }
    }

    #[test]
    fn test_new_tool_by_name() {
        let canvas = CanvasState::new(40, 40, DEFAULT_BACKGROUND).unwrap();
        let settings = ToolSettings { eraser_size: 4, ..Default::default() };
        let mut tool = new_tool("eraser:square", &settings, &canvas).unwrap();
        assert_eq!(tool.as_eraser_mut().map(|e| e.size()), Some(4));
        assert!(new_tool("spray", &settings, &canvas).is_err());
    }

    #[test]
    fn test_same_tool_ignores_parameter() {
        assert!(ToolKind::Brush(BrushKind::Soft).same_tool(ToolKind::Brush(BrushKind::Bristle)));
        assert!(!ToolKind::Pen.same_tool(ToolKind::Pencil));
    }
}
