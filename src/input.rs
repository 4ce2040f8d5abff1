use egui::{Context, PointerButton, Pos2, Rect};

/// Represents the location where an input event occurred
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputLocation {
    /// Position relative to the top-left corner of the canvas view
    pub position: Pos2,
    /// Whether this position is within the canvas view
    pub is_in_canvas: bool,
}

impl InputLocation {
    pub fn new(position: Pos2, is_in_canvas: bool) -> Self {
        Self {
            position,
            is_in_canvas,
        }
    }

    /// A location inside the view, for driving the editor without egui
    pub fn in_canvas(x: f32, y: f32) -> Self {
        Self::new(egui::pos2(x, y), true)
    }
}

/// Pointer events the editor understands
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Mouse button was pressed
    PointerDown {
        location: InputLocation,
        button: PointerButton,
    },
    /// Mouse button was released
    PointerUp {
        location: InputLocation,
        button: PointerButton,
    },
    /// Mouse moved (with or without buttons pressed)
    PointerMove {
        location: InputLocation,
        /// Buttons that are currently held down
        held_buttons: Vec<PointerButton>,
    },
    /// Mouse left the application window
    PointerLeave { last_known_location: InputLocation },
}

impl InputEvent {
    pub fn location(&self) -> InputLocation {
        match self {
            InputEvent::PointerDown { location, .. }
            | InputEvent::PointerUp { location, .. }
            | InputEvent::PointerMove { location, .. } => *location,
            InputEvent::PointerLeave {
                last_known_location,
            } => *last_known_location,
        }
    }

    /// Helper to check if an input event occurred within the canvas
    pub fn is_in_canvas(&self) -> bool {
        self.location().is_in_canvas
    }

    /// Primary-button press
    pub fn primary_down(x: f32, y: f32) -> Self {
        InputEvent::PointerDown {
            location: InputLocation::in_canvas(x, y),
            button: PointerButton::Primary,
        }
    }

    /// Move with the primary button held
    pub fn primary_drag(x: f32, y: f32) -> Self {
        InputEvent::PointerMove {
            location: InputLocation::in_canvas(x, y),
            held_buttons: vec![PointerButton::Primary],
        }
    }

    /// Primary-button release
    pub fn primary_up(x: f32, y: f32) -> Self {
        InputEvent::PointerUp {
            location: InputLocation::in_canvas(x, y),
            button: PointerButton::Primary,
        }
    }
}

const BUTTONS: [PointerButton; 3] = [
    PointerButton::Primary,
    PointerButton::Secondary,
    PointerButton::Middle,
];

/// Handles converting raw egui input into InputEvents relative to the
/// canvas view
pub struct InputHandler {
    last_pointer_pos: Option<Pos2>,
    canvas_rect: Rect,
}

impl InputHandler {
    pub fn new(canvas_rect: Rect) -> Self {
        Self {
            last_pointer_pos: None,
            canvas_rect,
        }
    }

    /// Update the canvas rectangle (e.g. if window is resized)
    pub fn set_canvas_rect(&mut self, rect: Rect) {
        self.canvas_rect = rect;
    }

    pub fn canvas_rect(&self) -> Rect {
        self.canvas_rect
    }

    /// Creates an InputLocation from a screen position
    fn make_location(&self, pos: Pos2) -> InputLocation {
        InputLocation {
            position: (pos - self.canvas_rect.min).to_pos2(),
            is_in_canvas: self.canvas_rect.contains(pos),
        }
    }

    /// Process raw egui input and generate InputEvents
    pub fn process_input(&mut self, ctx: &Context) -> Vec<InputEvent> {
        let mut events = Vec::new();

        ctx.input(|input| {
            match (input.pointer.hover_pos(), self.last_pointer_pos) {
                (Some(pos), last) => {
                    if Some(pos) != last {
                        let held_buttons = BUTTONS
                            .into_iter()
                            .filter(|button| input.pointer.button_down(*button))
                            .collect();
                        events.push(InputEvent::PointerMove {
                            location: self.make_location(pos),
                            held_buttons,
                        });
                    }
                    self.last_pointer_pos = Some(pos);
                }
                (None, Some(last)) => {
                    events.push(InputEvent::PointerLeave {
                        last_known_location: self.make_location(last),
                    });
                    self.last_pointer_pos = None;
                }
                (None, None) => {}
            }

            let Some(pos) = input.pointer.interact_pos() else {
                return;
            };
            for button in BUTTONS {
                if input.pointer.button_pressed(button) {
                    events.push(InputEvent::PointerDown {
                        location: self.make_location(pos),
                        button,
                    });
                }
                if input.pointer.button_released(button) {
                    events.push(InputEvent::PointerUp {
                        location: self.make_location(pos),
                        button,
                    });
                }
            }
        });

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locations_are_view_relative() {
        let handler = InputHandler::new(Rect::from_min_size(egui::pos2(100.0, 50.0), egui::vec2(200.0, 100.0)));
        let inside = handler.make_location(egui::pos2(110.0, 60.0));
        assert_eq!(inside.position, egui::pos2(10.0, 10.0));
        assert!(inside.is_in_canvas);

        let outside = handler.make_location(egui::pos2(10.0, 10.0));
        assert_eq!(outside.position, egui::pos2(-90.0, -40.0));
        assert!(!outside.is_in_canvas);
    }

    #[test]
    fn test_event_helpers() {
        let down = InputEvent::primary_down(3.0, 4.0);
        assert!(down.is_in_canvas());
        assert_eq!(down.location().position, egui::pos2(3.0, 4.0));
        assert!(matches!(
            InputEvent::primary_drag(1.0, 1.0),
            InputEvent::PointerMove { ref held_buttons, .. } if held_buttons == &[PointerButton::Primary]
        ));
    }
}
