use crate::canvas::CanvasState;
use crate::error::{CanvasError, CanvasResult};
use crate::geometry::PixelPoint;
use crate::pixel_buffer::PixelBuffer;
use crate::tools::effects;
use crate::tools::{Tool, ToolOutcome};

pub const DEFAULT_BLUR_STRENGTH: i32 = 5;

/// Smudges the canvas under the pointer. Slow strokes blur more than fast
/// ones.
///
/// Keeps a backup of the buffer as it was before the last stroke, which
/// `undo` restores independently of the global undo history.
#[derive(Debug, Clone)]
pub struct BlurBrush {
    strength: i32,
    last_point: Option<PixelPoint>,
    scratch: Option<PixelBuffer>,
    backup: Option<PixelBuffer>,
}

impl Default for BlurBrush {
    fn default() -> Self {
        Self::new(DEFAULT_BLUR_STRENGTH)
    }
}

impl BlurBrush {
    /// A strength below one is raised to one
    pub fn new(strength: i32) -> Self {
        Self {
            strength: strength.max(1),
            last_point: None,
            scratch: None,
            backup: None,
        }
    }

    pub fn blur_strength(&self) -> i32 {
        self.strength
    }

    pub fn set_blur_strength(&mut self, strength: i32) -> CanvasResult {
        if strength < 1 {
            return Err(CanvasError::InvalidBlurStrength(strength));
        }
        self.strength = strength;
        log::debug!("Blur strength set to {strength}");
        Ok(())
    }

    /// Restore the buffer as it was before the most recent stroke. Returns
    /// false when there is no backup.
    pub fn undo(&mut self, canvas: &mut CanvasState) -> bool {
        match self.backup.take() {
            Some(backup) => {
                canvas.restore_image(&backup);
                true
            }
            None => false,
        }
    }

    pub fn has_backup(&self) -> bool {
        self.backup.is_some()
    }

    fn blur(&mut self, from: PixelPoint, to: PixelPoint, thickness: i32) {
        if let Some(scratch) = self.scratch.as_mut() {
            let used = effects::blur_segment(scratch, from, to, thickness, self.strength);
            log::trace!("Blurred segment {from:?} -> {to:?} with strength {used}");
        }
    }
}

impl Tool for BlurBrush {
    fn name(&self) -> &'static str {
        "Blur Brush"
    }

    fn on_press(&mut self, point: PixelPoint, canvas: &mut CanvasState) -> ToolOutcome {
        canvas.enable_drawing();
        self.scratch = Some(canvas.buffer().copy());
        self.backup = Some(canvas.buffer().copy());
        self.last_point = Some(point);
        ToolOutcome::Ignored
    }

    fn on_drag(&mut self, point: PixelPoint, canvas: &mut CanvasState) -> ToolOutcome {
        let Some(from) = self.last_point else {
            return ToolOutcome::Ignored;
        };
        self.blur(from, point, canvas.thickness());
        self.last_point = Some(point);
        ToolOutcome::Previewed
    }

    fn on_release(&mut self, point: PixelPoint, canvas: &mut CanvasState) -> ToolOutcome {
        let mut outcome = ToolOutcome::Ignored;
        if let Some(from) = self.last_point.take() {
            self.blur(from, point, canvas.thickness());
            if let Some(scratch) = self.scratch.take() {
                canvas.replace_buffer(scratch);
                outcome = ToolOutcome::Committed;
            }
        }
        canvas.disable_drawing();
        outcome
    }

    fn preview(&self) -> Option<&PixelBuffer> {
        self.last_point.and(self.scratch.as_ref())
    }

    fn is_active(&self) -> bool {
        self.last_point.is_some()
    }

    fn cancel(&mut self, canvas: &mut CanvasState) {
        if self.last_point.take().is_some() {
            self.scratch = None;
            canvas.disable_drawing();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DEFAULT_BACKGROUND, DrawOp};
    use crate::geometry::pixel;

    fn striped_canvas() -> CanvasState {
        let mut canvas = CanvasState::new(60, 60, DEFAULT_BACKGROUND).unwrap();
        canvas.set_thickness(1).unwrap();
        canvas.enable_drawing();
        for y in (0..60).step_by(2) {
            canvas.commit(DrawOp::Line { from: pixel(0, y), to: pixel(59, y) });
        }
        canvas.disable_drawing();
        canvas.set_thickness(10).unwrap();
        canvas
    }

    #[test]
    fn test_strength_validation() {
        let mut brush = BlurBrush::default();
        assert_eq!(brush.blur_strength(), 5);
        assert_eq!(brush.set_blur_strength(0), Err(CanvasError::InvalidBlurStrength(0)));
        brush.set_blur_strength(9).unwrap();
        assert_eq!(brush.blur_strength(), 9);
    }

    #[test]
    fn test_stroke_blurs_and_commits_on_release() {
        let mut canvas = striped_canvas();
        let before = canvas.buffer().clone();
        let mut brush = BlurBrush::default();

        brush.on_press(pixel(30, 30), &mut canvas);
        assert_eq!(brush.on_drag(pixel(31, 30), &mut canvas), ToolOutcome::Previewed);
        assert_eq!(canvas.buffer(), &before);
        assert_ne!(brush.preview(), Some(&before));

        assert_eq!(brush.on_release(pixel(32, 30), &mut canvas), ToolOutcome::Committed);
        assert_ne!(canvas.buffer(), &before);
        // far from the stroke nothing changed
        assert_eq!(canvas.buffer().pixel(2, 2), before.pixel(2, 2));
    }

    #[test]
    fn test_own_undo_restores_pre_stroke_buffer() {
        let mut canvas = striped_canvas();
        let before = canvas.buffer().clone();
        let mut brush = BlurBrush::default();

        brush.on_press(pixel(30, 30), &mut canvas);
        brush.on_drag(pixel(31, 31), &mut canvas);
        brush.on_release(pixel(32, 32), &mut canvas);
        assert!(brush.has_backup());

        assert!(brush.undo(&mut canvas));
        assert_eq!(canvas.buffer(), &before);
        assert!(!brush.undo(&mut canvas));
    }
}
