#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod canvas;
pub mod config;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod history;
pub mod input;
pub mod panels;
pub mod pixel_buffer;
pub mod renderer;
pub mod tools;
pub mod viewport;
pub mod worker;

pub use app::{PaintApp, Preferences};
pub use canvas::{CanvasState, DrawOp};
pub use config::{ConfigError, EditorConfig};
pub use editor::Editor;
pub use error::{CanvasError, CanvasResult};
pub use geometry::{PixelPoint, pixel};
pub use history::UndoHistory;
pub use input::{InputEvent, InputHandler, InputLocation};
pub use pixel_buffer::{PixelBuffer, Region};
pub use renderer::Renderer;
pub use tools::{Tool, ToolKind, ToolOutcome, ToolType, TurtleCommand, new_tool};
pub use viewport::Viewport;
pub use worker::{BackgroundWorker, WorkerEvent};
