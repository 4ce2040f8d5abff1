use crate::canvas::{CanvasState, DrawOp};
use crate::error::{CanvasError, CanvasResult};
use crate::geometry::PixelPoint;
use crate::tools::{Tool, ToolOutcome};

/// Continuous freehand tool that commits every drag segment immediately.
///
/// Its own thickness and opacity override the canvas settings on press.
/// `Pen::pencil()` is the thin, half-transparent preset.
#[derive(Debug, Clone, PartialEq)]
pub struct Pen {
    name: &'static str,
    thickness: i32,
    opacity: f32,
    last_point: Option<PixelPoint>,
}

impl Default for Pen {
    fn default() -> Self {
        Self::new()
    }
}

impl Pen {
    pub fn new() -> Self {
        Self {
            name: "Pen",
            thickness: 2,
            opacity: 1.0,
            last_point: None,
        }
    }

    pub fn pencil() -> Self {
        Self {
            name: "Pencil",
            thickness: 1,
            opacity: 0.5,
            last_point: None,
        }
    }

    pub fn thickness(&self) -> i32 {
        self.thickness
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
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
}

impl Tool for Pen {
    fn name(&self) -> &'static str {
        self.name
    }

    fn on_press(&mut self, point: PixelPoint, canvas: &mut CanvasState) -> ToolOutcome {
        // Both values were validated by our own setters
        let _ = canvas.set_thickness(self.thickness);
        let _ = canvas.set_opacity(self.opacity);
        canvas.enable_drawing();
        self.last_point = Some(point);
        ToolOutcome::Ignored
    }

    fn on_drag(&mut self, point: PixelPoint, canvas: &mut CanvasState) -> ToolOutcome {
        let Some(from) = self.last_point else {
            return ToolOutcome::Ignored;
        };
        self.last_point = Some(point);
        if canvas.commit(DrawOp::Line { from, to: point }) {
            ToolOutcome::Committed
        } else {
            ToolOutcome::Ignored
        }
    }

    fn on_release(&mut self, _point: PixelPoint, canvas: &mut CanvasState) -> ToolOutcome {
        self.last_point = None;
        canvas.disable_drawing();
        ToolOutcome::Ignored
    }

    fn is_active(&self) -> bool {
        self.last_point.is_some()
    }

    fn cancel(&mut self, canvas: &mut CanvasState) {
        if self.last_point.take().is_some() {
            canvas.disable_drawing();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::DEFAULT_BACKGROUND;
    use crate::geometry::pixel;
    use image::Rgb;

    #[test]
    fn test_press_applies_tool_settings() {
        let mut canvas = CanvasState::new(20, 20, DEFAULT_BACKGROUND).unwrap();
        let mut pencil = Pen::pencil();
        pencil.on_press(pixel(1, 1), &mut canvas);
        assert_eq!(canvas.thickness(), 1);
        assert_eq!(canvas.opacity(), 0.5);
        assert!(canvas.is_drawing_enabled());
    }

    #[test]
    fn test_segments_chain() {
        let mut canvas = CanvasState::new(20, 20, DEFAULT_BACKGROUND).unwrap();
        let mut pen = Pen::new();
        pen.set_thickness(1).unwrap();
        pen.on_press(pixel(0, 0), &mut canvas);
        assert_eq!(pen.on_drag(pixel(10, 0), &mut canvas), ToolOutcome::Committed);
        assert_eq!(pen.on_drag(pixel(10, 10), &mut canvas), ToolOutcome::Committed);
        pen.on_release(pixel(10, 10), &mut canvas);

        let black = Some(Rgb([0, 0, 0]));
        assert_eq!(canvas.buffer().pixel(5, 0), black);
        assert_eq!(canvas.buffer().pixel(10, 5), black);
        // the second segment started from (10, 0), not from the press point
        assert_eq!(canvas.buffer().pixel(5, 5), Some(DEFAULT_BACKGROUND));
        assert!(!canvas.is_drawing_enabled());
    }

    #[test]
    fn test_drag_without_press_is_ignored() {
        let mut canvas = CanvasState::new(20, 20, DEFAULT_BACKGROUND).unwrap();
        let before = canvas.buffer().clone();
        let mut pen = Pen::new();
        assert_eq!(pen.on_drag(pixel(5, 5), &mut canvas), ToolOutcome::Ignored);
        assert_eq!(canvas.buffer(), &before);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut pen = Pen::new();
        assert!(pen.set_thickness(0).is_err());
        assert!(pen.set_opacity(2.0).is_err());
        assert_eq!(pen.thickness(), 2);
        assert_eq!(pen.opacity(), 1.0);
    }
}
