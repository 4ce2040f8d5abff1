use std::time::Duration;

use crate::config::{ConfigResult, EditorConfig};
use crate::editor::Editor;
use crate::input::InputHandler;
use crate::panels::{central_panel, tools_panel};
use crate::renderer::Renderer;
use crate::tools::{ToolKind, TurtleCommand};
use crate::worker::{BackgroundWorker, WorkerEvent};

/// How long the startup background job pretends to work
const BACKGROUND_TASK_DURATION: Duration = Duration::from_secs(5);

/// App preferences restored across restarts through eframe's storage.
/// Only settings are kept; the image itself is never persisted.
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct Preferences {
    pub config: EditorConfig,
    pub tool: ToolKind,
}

pub struct PaintApp {
    editor: Editor,
    // GPU resources only exist once eframe hands us a creation context
    renderer: Option<Renderer>,
    input_handler: InputHandler,
    worker: BackgroundWorker,
    status: Option<String>,
    turtle_program: String,
}

impl PaintApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> ConfigResult<Self> {
        let preferences: Preferences = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();

        let mut app = Self::from_preferences(preferences)?;
        app.renderer = Some(Renderer::new(cc));
        app.start_background_task();
        Ok(app)
    }

    /// Builds the app without any GPU state. Stored preferences that no
    /// longer validate fall back to the defaults.
    pub fn from_preferences(preferences: Preferences) -> ConfigResult<Self> {
        let editor = match Editor::new(preferences.config) {
            Ok(editor) => editor,
            Err(err) => {
                log::warn!("Ignoring stored preferences: {err}");
                Editor::new(EditorConfig::default())?
            }
        };

        let mut app = Self {
            editor,
            renderer: None,
            input_handler: InputHandler::new(egui::Rect::NOTHING),
            worker: BackgroundWorker::new(),
            status: None,
            turtle_program: default_turtle_program(),
        };
        if preferences.tool != ToolKind::Pen {
            app.editor.select_tool(preferences.tool);
        }
        Ok(app)
    }

    pub fn preferences(&self) -> Preferences {
        Preferences {
            config: self.editor.current_config(),
            tool: self.editor.tool_kind(),
        }
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    pub fn renderer(&self) -> Option<&Renderer> {
        self.renderer.as_ref()
    }

    /// Uploads the presented image if it changed and paints it into `rect`
    pub fn paint_canvas(&mut self, painter: &egui::Painter, rect: egui::Rect) {
        if let Some(renderer) = &mut self.renderer {
            renderer.update_texture(&self.editor);
            renderer.render(painter, rect);
        }
    }

    pub fn input_handler_mut(&mut self) -> &mut InputHandler {
        &mut self.input_handler
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    pub fn turtle_program_mut(&mut self) -> &mut String {
        &mut self.turtle_program
    }

    pub fn is_worker_running(&self) -> bool {
        self.worker.is_running()
    }

    /// Starts the simulated long-running job. It shares nothing with the
    /// canvas; its outcome only reaches the status line.
    pub fn start_background_task(&mut self) {
        let result = self.worker.start("background-task", || {
            log::debug!("Worker: simulating task...");
            std::thread::sleep(BACKGROUND_TASK_DURATION);
            Ok::<(), String>(())
        });
        match result {
            Ok(()) => self.set_status("Background task running"),
            Err(err) => self.set_status(err.to_string()),
        }
    }

    /// Collects the background job's outcome, if it has arrived
    pub fn poll_worker(&mut self) {
        match self.worker.poll() {
            Some(WorkerEvent::Finished) => self.set_status("Background task finished"),
            Some(WorkerEvent::Failed(message)) => self.set_status(format!("Background task failed: {message}")),
            None => {}
        }
    }

    /// Parses the turtle program text as a JSON list of commands and runs it
    pub fn run_turtle_program(&mut self) {
        let commands = match serde_json::from_str::<Vec<TurtleCommand>>(&self.turtle_program) {
            Ok(commands) => commands,
            Err(err) => {
                self.set_status(format!("Invalid turtle program: {err}"));
                return;
            }
        };
        match self.editor.run_turtle(&commands) {
            Ok(()) => self.set_status(format!("Ran {} turtle command(s)", commands.len())),
            Err(err) => self.set_status(err.to_string()),
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let undo = ctx.input_mut(|input| input.consume_key(egui::Modifiers::COMMAND, egui::Key::Z));
        if undo && !self.editor.undo() {
            log::debug!("Nothing to undo");
        }
    }
}

fn default_turtle_program() -> String {
    let program = [
        TurtleCommand::Polygon { sides: 6, side: 60 },
        TurtleCommand::Right { degrees: 30.0 },
        TurtleCommand::Forward { distance: Some(40) },
    ];
    serde_json::to_string_pretty(&program).unwrap_or_default()
}

impl eframe::App for PaintApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.preferences());
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_worker();
        self.handle_shortcuts(ctx);

        tools_panel(self, ctx);
        central_panel(self, ctx);

        if self.worker.is_running() {
            // keep polling while the job is out
            ctx.request_repaint_after(Duration::from_millis(250));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_preferences() -> Preferences {
        Preferences {
            config: EditorConfig {
                width: 32,
                height: 24,
                ..EditorConfig::default()
            },
            tool: ToolKind::Line,
        }
    }

    #[test]
    fn test_preferences_restore_tool_and_size() {
        let app = PaintApp::from_preferences(small_preferences()).unwrap();
        assert_eq!(app.editor().tool_kind(), ToolKind::Line);
        assert_eq!(app.editor().canvas().width(), 32);
        assert_eq!(app.preferences(), small_preferences());
    }

    #[test]
    fn test_invalid_preferences_fall_back_to_defaults() {
        let mut preferences = small_preferences();
        preferences.config.thickness = 0;
        let app = PaintApp::from_preferences(preferences).unwrap();
        assert_eq!(app.editor().canvas().width(), 800);
        assert_eq!(app.editor().canvas().thickness(), 2);
    }

    #[test]
    fn test_preferences_serde() {
        let json = serde_json::to_string(&small_preferences()).unwrap();
        let back: Preferences = serde_json::from_str(&json).unwrap();
        assert_eq!(back, small_preferences());
        let partial: Preferences = serde_json::from_str(r#"{"tool": "Circle"}"#).unwrap();
        assert_eq!(partial.tool, ToolKind::Circle);
        assert_eq!(partial.config, EditorConfig::default());
    }

    #[test]
    fn test_default_turtle_program_runs() {
        let mut app = PaintApp::from_preferences(Preferences::default()).unwrap();
        app.run_turtle_program();
        assert_eq!(app.editor().tool_kind(), ToolKind::Turtle);
        assert_eq!(app.status(), Some("Ran 3 turtle command(s)"));
    }

    #[test]
    fn test_bad_turtle_program_reported() {
        let mut app = PaintApp::from_preferences(Preferences::default()).unwrap();
        *app.turtle_program_mut() = "[{\"op\": \"fly\"}]".into();
        app.run_turtle_program();
        assert!(app.status().is_some_and(|s| s.starts_with("Invalid turtle program")));
    }
}
