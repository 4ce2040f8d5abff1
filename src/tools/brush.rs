use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::canvas::{CanvasState, apply_opacity};
use crate::error::CanvasError;
use crate::geometry::PixelPoint;
use crate::pixel_buffer::PixelBuffer;
use crate::tools::effects::{self, NoiseTexture};
use crate::tools::{Tool, ToolOutcome};

/// Thickness range picked from on every press
pub const DYNAMIC_THICKNESS: Range<i32> = 5..20;
pub const BRUSH_OPACITY: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrushKind {
    #[default]
    Bristle,
    Soft,
    Textured,
}

impl BrushKind {
    pub const ALL: [BrushKind; 3] = [BrushKind::Bristle, BrushKind::Soft, BrushKind::Textured];

    pub fn as_str(self) -> &'static str {
        match self {
            BrushKind::Bristle => "bristle",
            BrushKind::Soft => "soft",
            BrushKind::Textured => "textured",
        }
    }
}

impl fmt::Display for BrushKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BrushKind {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bristle" => Ok(BrushKind::Bristle),
            "soft" => Ok(BrushKind::Soft),
            "textured" => Ok(BrushKind::Textured),
            other => Err(CanvasError::UnknownBrushKind(other.to_string())),
        }
    }
}

/// Brush family. Drags paint onto a scratch copy of the canvas; release
/// paints the final segment and replaces the committed buffer with the
/// scratch wholesale.
#[derive(Debug, Clone)]
pub struct Brush {
    kind: BrushKind,
    rng: StdRng,
    texture: NoiseTexture,
    last_point: Option<PixelPoint>,
    scratch: Option<PixelBuffer>,
}

impl Brush {
    /// Brush seeded from system entropy
    pub fn new(kind: BrushKind) -> Self {
        Self::with_rng(kind, StdRng::from_entropy())
    }

    /// Brush with a fixed seed, for reproducible strokes
    pub fn with_seed(kind: BrushKind, seed: u64) -> Self {
        Self::with_rng(kind, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(kind: BrushKind, mut rng: StdRng) -> Self {
        let texture = NoiseTexture::random(&mut rng);
        Self {
            kind,
            rng,
            texture,
            last_point: None,
            scratch: None,
        }
    }

    pub fn kind(&self) -> BrushKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: BrushKind) {
        log::debug!("Brush type changed to {kind}");
        self.kind = kind;
    }

    fn paint(&mut self, from: PixelPoint, to: PixelPoint, canvas: &CanvasState) {
        let Some(scratch) = self.scratch.as_mut() else {
            return;
        };
        let color = apply_opacity(canvas.color(), BRUSH_OPACITY);
        let thickness = canvas.thickness();
        match self.kind {
            BrushKind::Bristle => effects::bristle_stroke(scratch, from, to, color, &mut self.rng),
            BrushKind::Soft => effects::soft_stroke(scratch, from, to, color, thickness),
            BrushKind::Textured => {
                effects::textured_stroke(scratch, from, to, thickness, &self.texture)
            }
        }
    }
}

impl Tool for Brush {
    fn name(&self) -> &'static str {
        "Brush"
    }

    fn on_press(&mut self, point: PixelPoint, canvas: &mut CanvasState) -> ToolOutcome {
        let thickness = self.rng.gen_range(DYNAMIC_THICKNESS);
        // Both values are constants inside the accepted ranges
        let _ = canvas.set_thickness(thickness);
        let _ = canvas.set_opacity(BRUSH_OPACITY);
        canvas.enable_drawing();

        match self.scratch.as_mut() {
            Some(scratch) => scratch.copy_from(canvas.buffer()),
            None => self.scratch = Some(canvas.buffer().copy()),
        }
        self.last_point = Some(point);
        log::debug!("{} brush down at {point:?}, thickness {thickness}", self.kind);
        ToolOutcome::Ignored
    }

    fn on_drag(&mut self, point: PixelPoint, canvas: &mut CanvasState) -> ToolOutcome {
        let Some(from) = self.last_point else {
            return ToolOutcome::Ignored;
        };
        self.paint(from, point, canvas);
        self.last_point = Some(point);
        ToolOutcome::Previewed
    }

    fn on_release(&mut self, point: PixelPoint, canvas: &mut CanvasState) -> ToolOutcome {
        let outcome = match self.last_point.take() {
            Some(from) => {
                self.paint(from, point, canvas);
                match self.scratch.take() {
                    Some(scratch) => {
                        canvas.replace_buffer(scratch);
                        ToolOutcome::Committed
                    }
                    None => ToolOutcome::Ignored,
                }
            }
            None => ToolOutcome::Ignored,
        };
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
            canvas.disable_drawing();
        }
    }
}
