mod central_panel;
mod tool_button;
mod tools_panel;

pub use central_panel::central_panel;
pub use tool_button::ToolButton;
pub use tools_panel::tools_panel;
