use thiserror::Error;

/// Rejected input at a setter or factory. State is left unchanged and the
/// caller is expected to re-prompt.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CanvasError {
    #[error("thickness must be at least 1, got {0}")]
    InvalidThickness(i32),

    #[error("opacity must be between 0.0 and 1.0, got {0}")]
    InvalidOpacity(f32),

    #[error("eraser size must be at least 1, got {0}")]
    InvalidEraserSize(i32),

    #[error("blur strength must be at least 1, got {0}")]
    InvalidBlurStrength(i32),

    #[error("invalid eraser shape '{0}', use 'circle' or 'square'")]
    UnknownEraserShape(String),

    #[error("invalid brush type '{0}', use 'bristle', 'soft' or 'textured'")]
    UnknownBrushKind(String),

    #[error("invalid shape '{0}', use 'rectangle' or 'ellipse'")]
    UnknownShapeKind(String),

    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    #[error("canvas dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("a polygon needs at least 3 sides, got {0}")]
    InvalidPolygon(u32),
}

/// Result type for canvas and tool setters
pub type CanvasResult<T = ()> = Result<T, CanvasError>;
