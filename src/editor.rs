//! The editing core as seen by the GUI shell.
//!
//! `Editor` owns the canvas, the undo history, the viewport and the active
//! tool, and is the only thing the shell talks to. Toolbar widgets call its
//! setters, the canvas widget feeds it pointer events, and the renderer asks
//! it for the presented image.
//!
//! # Example
//!
//! ```
//! use raster_paint::{Editor, EditorConfig, InputEvent, ToolKind};
//! use image::Rgb;
//!
//! let mut editor = Editor::new(EditorConfig::default()).unwrap();
//! editor.select_tool(ToolKind::Pen);
//! editor.set_color(Rgb([0, 0, 0]));
//! editor.set_thickness(3).unwrap();
//!
//! editor.handle_input(&InputEvent::primary_down(10.0, 10.0));
//! editor.handle_input(&InputEvent::primary_drag(50.0, 10.0));
//! editor.handle_input(&InputEvent::primary_up(50.0, 10.0));
//!
//! assert_eq!(editor.canvas().buffer().pixel(30, 10), Some(Rgb([0, 0, 0])));
//! assert!(editor.undo());
//! assert_eq!(editor.canvas().buffer().pixel(30, 10), Some(Rgb([255, 255, 255])));
//! ```

use image::Rgb;

use crate::canvas::CanvasState;
use crate::config::{ConfigResult, EditorConfig};
use crate::error::CanvasResult;
use crate::geometry::PixelPoint;
use crate::history::UndoHistory;
use crate::input::InputEvent;
use crate::pixel_buffer::PixelBuffer;
use crate::tools::{
    BrushKind, EraserShape, ShapeKind, Tool, ToolKind, ToolOutcome, ToolSettings, ToolType,
    TurtleCommand, TurtleTool,
};
use crate::viewport::Viewport;

#[derive(Debug)]
pub struct Editor {
    canvas: CanvasState,
    history: UndoHistory,
    viewport: Viewport,
    tool: ToolType,
    settings: ToolSettings,
    config: EditorConfig,
    /// Bumped whenever the presented image may have changed
    revision: u64,
}

impl Editor {
    pub fn new(config: EditorConfig) -> ConfigResult<Self> {
        config.validate()?;

        let mut canvas = CanvasState::new(config.width, config.height, config.background_color())?;
        canvas.set_color(config.draw_color());
        canvas.set_thickness(config.thickness)?;
        canvas.set_opacity(config.opacity)?;

        let (view_width, view_height) = config.view_size();
        let viewport = Viewport::new(view_width, view_height, config.width, config.height)
            .with_min_zoom(config.min_zoom);

        let settings = config.tool_settings();
        let mut tool = ToolType::new(ToolKind::Pen, &settings, &canvas);
        if let Some(pen) = tool.as_pen_mut() {
            pen.set_thickness(config.thickness)?;
            pen.set_opacity(config.opacity)?;
        }

        log::info!(
            "Created {}x{} canvas, {}x{} view",
            config.width,
            config.height,
            view_width,
            view_height
        );

        Ok(Self {
            canvas,
            history: UndoHistory::new(config.max_undo_depth),
            viewport,
            tool,
            settings,
            config,
            revision: 0,
        })
    }

    pub fn canvas(&self) -> &CanvasState {
        &self.canvas
    }

    pub fn history(&self) -> &UndoHistory {
        &self.history
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The startup config updated with the live drawing parameters, for
    /// persisting preferences
    pub fn current_config(&self) -> EditorConfig {
        EditorConfig {
            color: self.canvas.color().0,
            thickness: self.canvas.thickness(),
            opacity: self.canvas.opacity(),
            eraser_size: self.settings.eraser_size,
            blur_strength: self.settings.blur_strength,
            ..self.config.clone()
        }
    }

    pub fn tool(&self) -> &ToolType {
        &self.tool
    }

    pub fn tool_kind(&self) -> ToolKind {
        self.tool.kind()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    // --- drawing parameters ---

    pub fn set_color(&mut self, color: Rgb<u8>) {
        self.canvas.set_color(color);
    }

    /// Sets the canvas thickness, and the active pen's own thickness
    pub fn set_thickness(&mut self, thickness: i32) -> CanvasResult {
        self.canvas.set_thickness(thickness)?;
        if let Some(pen) = self.tool.as_pen_mut() {
            pen.set_thickness(thickness)?;
        }
        Ok(())
    }

    /// Sets the canvas opacity, and the active pen's own opacity
    pub fn set_opacity(&mut self, opacity: f32) -> CanvasResult {
        self.canvas.set_opacity(opacity)?;
        if let Some(pen) = self.tool.as_pen_mut() {
            pen.set_opacity(opacity)?;
        }
        Ok(())
    }

    pub fn enable_drawing(&mut self) {
        self.canvas.enable_drawing();
    }

    pub fn disable_drawing(&mut self) {
        self.canvas.disable_drawing();
    }

    /// Reset the canvas to the background colour and drop all undo history
    pub fn clear(&mut self) {
        self.tool.cancel(&mut self.canvas);
        self.canvas.clear(&mut self.history);
        self.touch();
    }

    // --- view ---

    pub fn zoom(&mut self, factor: f32) {
        self.viewport.zoom(factor);
        self.touch();
    }

    pub fn zoom_in(&mut self) {
        self.zoom(self.config.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.zoom(1.0 / self.config.zoom_step);
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
        self.touch();
    }

    pub fn set_view_size(&mut self, width: u32, height: u32) {
        if self.viewport.view_size() != (width.max(1), height.max(1)) {
            self.viewport.set_view_size(width, height);
            self.touch();
        }
    }

    /// Map a view-relative position to the canvas pixel under it
    pub fn canvas_point(&self, view_pos: egui::Pos2) -> PixelPoint {
        PixelPoint::from(self.viewport.screen_to_canvas(view_pos))
    }

    /// The committed buffer, or the active tool's preview while a stroke is
    /// in progress, scaled and cropped by the viewport
    pub fn present(&self) -> PixelBuffer {
        let source = self.tool.preview().unwrap_or_else(|| self.canvas.buffer());
        self.viewport.present(source)
    }

    // --- tools ---

    /// Switch tools. Saves an undo checkpoint and abandons any stroke in
    /// progress on the old tool.
    pub fn select_tool(&mut self, kind: ToolKind) -> &mut ToolType {
        self.save_checkpoint();
        self.tool.cancel(&mut self.canvas);

        let mut tool = ToolType::new(kind, &self.settings, &self.canvas);
        if let Some(pen) = tool.as_pen_mut() {
            if kind == ToolKind::Pen {
                // the pen follows the toolbar settings; the pencil keeps its preset
                let synced = pen
                    .set_thickness(self.canvas.thickness())
                    .and_then(|()| pen.set_opacity(self.canvas.opacity()));
                if let Err(err) = synced {
                    log::warn!("Pen keeps its preset: {err}");
                }
            }
        }
        tool.activate(&mut self.canvas);
        log::info!("Selected tool {kind}");

        self.tool = tool;
        self.touch();
        &mut self.tool
    }

    /// Switch tools by name, e.g. `"eraser:square"`
    pub fn select_tool_by_name(&mut self, name: &str) -> CanvasResult<&mut ToolType> {
        let kind: ToolKind = name.parse()?;
        Ok(self.select_tool(kind))
    }

    /// Install a pre-built tool, e.g. a brush with a fixed seed
    pub fn set_tool(&mut self, mut tool: ToolType) {
        self.save_checkpoint();
        self.tool.cancel(&mut self.canvas);
        tool.activate(&mut self.canvas);
        log::info!("Installed tool {}", tool.name());
        self.tool = tool;
        self.touch();
    }

    /// Seed used for brushes created from now on; `None` seeds from entropy
    pub fn set_brush_seed(&mut self, seed: Option<u64>) {
        self.settings.brush_seed = seed;
    }

    pub fn set_brush_kind(&mut self, kind: &str) -> CanvasResult {
        let kind: BrushKind = kind.parse()?;
        if let Some(brush) = self.tool.as_brush_mut() {
            brush.set_kind(kind);
        }
        Ok(())
    }

    pub fn set_eraser_shape(&mut self, shape: &str) -> CanvasResult {
        let shape: EraserShape = shape.parse()?;
        if let Some(eraser) = self.tool.as_eraser_mut() {
            eraser.set_shape(shape.as_str())?;
        }
        Ok(())
    }

    pub fn set_eraser_size(&mut self, size: i32) -> CanvasResult {
        if let Some(eraser) = self.tool.as_eraser_mut() {
            eraser.set_size(size)?;
        } else if size < 1 {
            return Err(crate::error::CanvasError::InvalidEraserSize(size));
        }
        self.settings.eraser_size = size;
        Ok(())
    }

    pub fn set_blur_strength(&mut self, strength: i32) -> CanvasResult {
        if let Some(brush) = self.tool.as_blur_brush_mut() {
            brush.set_blur_strength(strength)?;
        } else if strength < 1 {
            return Err(crate::error::CanvasError::InvalidBlurStrength(strength));
        }
        self.settings.blur_strength = strength;
        Ok(())
    }

    pub fn set_shape_kind(&mut self, kind: &str) -> CanvasResult {
        let kind: ShapeKind = kind.parse()?;
        if let Some(tool) = self.tool.as_shape_mut() {
            tool.set_shape_kind(kind);
        }
        Ok(())
    }

    /// Undo the blur brush's last stroke from its own backup. Returns false
    /// when the blur brush is not active or has nothing to restore.
    pub fn undo_blur_stroke(&mut self) -> bool {
        let restored = match self.tool.as_blur_brush_mut() {
            Some(brush) => brush.undo(&mut self.canvas),
            None => false,
        };
        if restored {
            self.touch();
        }
        restored
    }

    /// Run turtle commands, switching to the turtle first if needed. Stops
    /// at the first invalid command; earlier commands stay applied.
    pub fn run_turtle(&mut self, commands: &[TurtleCommand]) -> CanvasResult {
        if self.tool.as_turtle_mut().is_none() {
            self.select_tool(ToolKind::Turtle);
        }
        let result = match self.tool.as_turtle_mut() {
            Some(turtle) => run_commands(turtle, commands, &mut self.canvas),
            None => Ok(()),
        };
        self.touch();
        result
    }

    // --- pointer protocol ---

    /// Route a pointer event to the active tool. Only the primary button
    /// drives tools; drags count only while it is held.
    pub fn handle_input(&mut self, event: &InputEvent) -> ToolOutcome {
        match event {
            InputEvent::PointerDown {
                location,
                button: egui::PointerButton::Primary,
            } if location.is_in_canvas => self.press(self.canvas_point(location.position)),
            InputEvent::PointerMove {
                location,
                held_buttons,
            } if held_buttons.contains(&egui::PointerButton::Primary) => {
                self.drag(self.canvas_point(location.position))
            }
            InputEvent::PointerUp {
                location,
                button: egui::PointerButton::Primary,
            } => self.release(self.canvas_point(location.position)),
            other => {
                log::trace!("Ignoring {other:?}");
                ToolOutcome::Ignored
            }
        }
    }

    /// Primary press at a canvas point
    pub fn press(&mut self, point: PixelPoint) -> ToolOutcome {
        if self.config.checkpoint_each_stroke {
            self.save_checkpoint();
        }
        let outcome = self.tool.on_press(point, &mut self.canvas);
        self.after(outcome)
    }

    /// Primary drag to a canvas point
    pub fn drag(&mut self, point: PixelPoint) -> ToolOutcome {
        let outcome = self.tool.on_drag(point, &mut self.canvas);
        self.after(outcome)
    }

    /// Primary release at a canvas point
    pub fn release(&mut self, point: PixelPoint) -> ToolOutcome {
        if !self.tool.is_active() {
            log::debug!("Release at {point:?} without a stroke in progress");
        }
        let outcome = self.tool.on_release(point, &mut self.canvas);
        // a release always ends the preview
        self.touch();
        outcome
    }

    fn after(&mut self, outcome: ToolOutcome) -> ToolOutcome {
        if outcome != ToolOutcome::Ignored {
            self.touch();
        }
        outcome
    }

    // --- undo ---

    pub fn save_checkpoint(&mut self) {
        self.history.save_state(&self.canvas);
    }

    /// Restore the most recent checkpoint, abandoning any stroke in progress.
    /// Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.tool.cancel(&mut self.canvas);
        let undone = self.history.undo(&mut self.canvas);
        if undone {
            log::info!("Undo ({} checkpoint(s) left)", self.history.len());
            self.touch();
        }
        undone
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }
}

fn run_commands(
    turtle: &mut TurtleTool,
    commands: &[TurtleCommand],
    canvas: &mut CanvasState,
) -> CanvasResult {
    for command in commands {
        turtle.execute(command, canvas)?;
    }
    Ok(())
}
