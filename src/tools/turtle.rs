use serde::{Deserialize, Serialize};

use crate::canvas::{CanvasState, DrawOp};
use crate::error::{CanvasError, CanvasResult};
use crate::geometry::PixelPoint;
use crate::tools::{Tool, ToolOutcome};

pub const DEFAULT_SPEED: i32 = 10;

/// One turtle instruction. A list of these deserialised from JSON is a
/// turtle program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TurtleCommand {
    Forward {
        #[serde(default)]
        distance: Option<i32>,
    },
    Backward {
        #[serde(default)]
        distance: Option<i32>,
    },
    Left {
        degrees: f64,
    },
    Right {
        degrees: f64,
    },
    Square {
        side: i32,
    },
    Polygon {
        sides: u32,
        side: i32,
    },
    Circle {
        radius: i32,
    },
    Teleport {
        x: i32,
        y: i32,
    },
    Home,
    PenUp,
    PenDown,
    Reset,
    SetHeading {
        degrees: f64,
    },
    SetSpeed {
        speed: i32,
    },
}

/// Turtle graphics: a heading and a position independent of the pointer.
///
/// Heading is in degrees, counter-clockwise, 0 pointing along +x. Screen y
/// grows downwards so forward motion subtracts `sin`. Pen up/down map onto
/// the canvas drawing flag, so every line goes through `CanvasState::commit`.
#[derive(Debug, Clone, PartialEq)]
pub struct TurtleTool {
    heading: f64,
    position: PixelPoint,
    speed: i32,
    // pen state to put back once the pointer is released
    pen_before_press: Option<bool>,
}

impl TurtleTool {
    /// A turtle at the centre of `canvas`, heading 0
    pub fn new(canvas: &CanvasState) -> Self {
        Self {
            heading: 0.0,
            position: home_position(canvas),
            speed: DEFAULT_SPEED,
            pen_before_press: None,
        }
    }

    pub fn position(&self) -> PixelPoint {
        self.position
    }

    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn speed(&self) -> i32 {
        self.speed
    }

    /// Move along the heading, drawing if the pen is down. `None` moves by
    /// the current speed.
    pub fn move_forward(&mut self, distance: Option<i32>, canvas: &mut CanvasState) {
        let from = self.position;
        let to = self.advance(distance.unwrap_or(self.speed));
        canvas.commit(DrawOp::Line { from, to });
        self.position = to;
    }

    pub fn move_backward(&mut self, distance: Option<i32>, canvas: &mut CanvasState) {
        self.turn_left(180.0);
        self.move_forward(distance, canvas);
        self.turn_right(180.0);
    }

    pub fn turn_left(&mut self, degrees: f64) {
        self.heading = (self.heading + degrees).rem_euclid(360.0);
    }

    pub fn turn_right(&mut self, degrees: f64) {
        self.heading = (self.heading - degrees).rem_euclid(360.0);
    }

    pub fn set_heading(&mut self, degrees: f64) {
        self.heading = degrees.rem_euclid(360.0);
    }

    /// Speeds below one are raised to one
    pub fn set_speed(&mut self, speed: i32) {
        self.speed = speed.max(1);
    }

    pub fn draw_square(&mut self, side: i32, canvas: &mut CanvasState) {
        for _ in 0..4 {
            self.move_forward(Some(side), canvas);
            self.turn_right(90.0);
        }
    }

    pub fn draw_polygon(&mut self, sides: u32, side: i32, canvas: &mut CanvasState) -> CanvasResult {
        if sides < 3 {
            return Err(CanvasError::InvalidPolygon(sides));
        }
        let exterior = 360.0 / f64::from(sides);
        for _ in 0..sides {
            self.move_forward(Some(side), canvas);
            self.turn_right(exterior);
        }
        Ok(())
    }

    /// Circle centred on the turtle; the turtle does not move
    pub fn draw_circle(&mut self, radius: i32, canvas: &mut CanvasState) {
        let radius = radius.saturating_abs();
        canvas.commit(DrawOp::Ellipse {
            center: self.position,
            axes: (radius, radius),
        });
    }

    /// Jump without drawing
    pub fn teleport(&mut self, point: PixelPoint) {
        self.position = point;
    }

    /// Jump to the canvas centre without drawing
    pub fn home(&mut self, canvas: &CanvasState) {
        self.position = home_position(canvas);
    }

    pub fn pen_up(&self, canvas: &mut CanvasState) {
        canvas.disable_drawing();
    }

    pub fn pen_down(&self, canvas: &mut CanvasState) {
        canvas.enable_drawing();
    }

    /// Back to the canvas centre with heading 0. Speed is kept.
    pub fn reset(&mut self, canvas: &CanvasState) {
        self.heading = 0.0;
        self.home(canvas);
    }

    pub fn execute(&mut self, command: &TurtleCommand, canvas: &mut CanvasState) -> CanvasResult {
        log::trace!("Turtle: {command:?}");
        match *command {
            TurtleCommand::Forward { distance } => self.move_forward(distance, canvas),
            TurtleCommand::Backward { distance } => self.move_backward(distance, canvas),
            TurtleCommand::Left { degrees } => self.turn_left(degrees),
            TurtleCommand::Right { degrees } => self.turn_right(degrees),
            TurtleCommand::Square { side } => self.draw_square(side, canvas),
            TurtleCommand::Polygon { sides, side } => self.draw_polygon(sides, side, canvas)?,
            TurtleCommand::Circle { radius } => self.draw_circle(radius, canvas),
            TurtleCommand::Teleport { x, y } => self.teleport(PixelPoint::new(x, y)),
            TurtleCommand::Home => self.home(canvas),
            TurtleCommand::PenUp => self.pen_up(canvas),
            TurtleCommand::PenDown => self.pen_down(canvas),
            TurtleCommand::Reset => self.reset(canvas),
            TurtleCommand::SetHeading { degrees } => self.set_heading(degrees),
            TurtleCommand::SetSpeed { speed } => self.set_speed(speed),
        }
        Ok(())
    }

    fn advance(&self, distance: i32) -> PixelPoint {
        let radians = self.heading.to_radians();
        let distance = f64::from(distance);
        PixelPoint::new(
            (f64::from(self.position.x) + distance * radians.cos()).round() as i32,
            (f64::from(self.position.y) - distance * radians.sin()).round() as i32,
        )
    }
}

fn home_position(canvas: &CanvasState) -> PixelPoint {
    PixelPoint::new((canvas.width() / 2) as i32, (canvas.height() / 2) as i32)
}

impl Tool for TurtleTool {
    fn name(&self) -> &'static str {
        "Turtle"
    }

    fn activate(&mut self, canvas: &mut CanvasState) {
        canvas.enable_drawing();
    }

    /// Clicking moves the turtle without drawing. The pen is down while the
    /// button is held and goes back to its earlier state on release.
    fn on_press(&mut self, point: PixelPoint, canvas: &mut CanvasState) -> ToolOutcome {
        self.teleport(point);
        self.pen_before_press = Some(canvas.is_drawing_enabled());
        canvas.enable_drawing();
        ToolOutcome::Ignored
    }

    fn on_drag(&mut self, _point: PixelPoint, _canvas: &mut CanvasState) -> ToolOutcome {
        ToolOutcome::Ignored
    }

    fn on_release(&mut self, _point: PixelPoint, canvas: &mut CanvasState) -> ToolOutcome {
        self.cancel(canvas);
        ToolOutcome::Ignored
    }

    fn is_active(&self) -> bool {
        self.pen_before_press.is_some()
    }

    fn cancel(&mut self, canvas: &mut CanvasState) {
        if self.pen_before_press.take() == Some(false) {
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

    const BLACK: Option<Rgb<u8>> = Some(Rgb([0, 0, 0]));

    fn setup() -> (CanvasState, TurtleTool) {
        let mut canvas = CanvasState::new(200, 100, DEFAULT_BACKGROUND).unwrap();
        canvas.set_thickness(1).unwrap();
        let mut turtle = TurtleTool::new(&canvas);
        turtle.activate(&mut canvas);
        (canvas, turtle)
    }

    #[test]
    fn test_starts_at_centre() {
        let (_, turtle) = setup();
        assert_eq!(turtle.position(), pixel(100, 50));
        assert_eq!(turtle.heading(), 0.0);
        assert_eq!(turtle.speed(), DEFAULT_SPEED);
    }

    #[test]
    fn test_forward_uses_screen_orientation() {
        let (mut canvas, mut turtle) = setup();
        turtle.move_forward(None, &mut canvas);
        assert_eq!(turtle.position(), pixel(110, 50));
        assert_eq!(canvas.buffer().pixel(105, 50), BLACK);

        turtle.turn_left(90.0);
        turtle.move_forward(Some(20), &mut canvas);
        // heading 90 points up the screen
        assert_eq!(turtle.position(), pixel(110, 30));
        assert_eq!(canvas.buffer().pixel(110, 40), BLACK);
    }

    #[test]
    fn test_heading_wraps() {
        let (_, mut turtle) = setup();
        turtle.turn_right(90.0);
        assert_eq!(turtle.heading(), 270.0);
        turtle.turn_left(450.0);
        assert_eq!(turtle.heading(), 0.0);
        turtle.set_heading(-45.0);
        assert_eq!(turtle.heading(), 315.0);
    }

    #[test]
    fn test_backward_keeps_heading() {
        let (mut canvas, mut turtle) = setup();
        turtle.move_backward(Some(30), &mut canvas);
        assert_eq!(turtle.position(), pixel(70, 50));
        assert_eq!(turtle.heading(), 0.0);
    }

    #[test]
    fn test_square_returns_to_start() {
        let (mut canvas, mut turtle) = setup();
        turtle.draw_square(20, &mut canvas);
        assert_eq!(turtle.position(), pixel(100, 50));
        assert_eq!(turtle.heading(), 0.0);
        // first side right, then down (turning right from heading 0)
        assert_eq!(canvas.buffer().pixel(110, 50), BLACK);
        assert_eq!(canvas.buffer().pixel(120, 60), BLACK);
    }

    #[test]
    fn test_polygon_needs_three_sides() {
        let (mut canvas, mut turtle) = setup();
        let before = canvas.buffer().clone();
        assert_eq!(
            turtle.draw_polygon(2, 10, &mut canvas),
            Err(CanvasError::InvalidPolygon(2))
        );
        assert_eq!(canvas.buffer(), &before);
        turtle.draw_polygon(6, 10, &mut canvas).unwrap();
        assert_eq!(turtle.position(), pixel(100, 50));
    }

    #[test]
    fn test_pen_up_moves_without_drawing() {
        let (mut canvas, mut turtle) = setup();
        let before = canvas.buffer().clone();
        turtle.pen_up(&mut canvas);
        turtle.move_forward(Some(40), &mut canvas);
        assert_eq!(canvas.buffer(), &before);
        assert_eq!(turtle.position(), pixel(140, 50));
    }

    #[test]
    fn test_teleport_and_home_do_not_draw() {
        let (mut canvas, mut turtle) = setup();
        let before = canvas.buffer().clone();
        turtle.teleport(pixel(5, 5));
        turtle.move_forward(Some(10), &mut canvas);
        assert_eq!(canvas.buffer().pixel(10, 5), BLACK);
        // nothing between the old position and the teleport target
        assert_eq!(canvas.buffer().pixel(50, 30), before.pixel(50, 30));
        turtle.home(&canvas);
        assert_eq!(turtle.position(), pixel(100, 50));
    }

    #[test]
    fn test_speed_floor() {
        let (_, mut turtle) = setup();
        turtle.set_speed(-3);
        assert_eq!(turtle.speed(), 1);
    }

    #[test]
    fn test_click_keeps_pen_up() {
        let (mut canvas, mut turtle) = setup();
        turtle.pen_up(&mut canvas);
        turtle.on_press(pixel(20, 20), &mut canvas);
        assert!(canvas.is_drawing_enabled());
        assert!(turtle.is_active());
        turtle.on_release(pixel(20, 20), &mut canvas);
        assert!(!canvas.is_drawing_enabled());
        assert!(!turtle.is_active());
        assert_eq!(turtle.position(), pixel(20, 20));
    }

    #[test]
    fn test_click_keeps_pen_down() {
        let (mut canvas, mut turtle) = setup();
        turtle.on_press(pixel(20, 20), &mut canvas);
        turtle.on_release(pixel(20, 20), &mut canvas);
        assert!(canvas.is_drawing_enabled());
    }

    #[test]
    fn test_extreme_distances_and_radii() {
        let (mut canvas, mut turtle) = setup();
        turtle.move_forward(Some(i32::MAX), &mut canvas);
        assert_eq!(turtle.position(), pixel(i32::MAX, 50));
        // the visible part of the line runs to the right edge
        assert_eq!(canvas.buffer().pixel(199, 50), BLACK);

        turtle.home(&canvas);
        turtle.draw_circle(i32::MIN, &mut canvas);
        turtle.move_backward(Some(i32::MIN), &mut canvas);
        assert_eq!(turtle.position(), pixel(i32::MAX, 50));
        turtle.draw_square(i32::MAX, &mut canvas);
    }

    #[test]
    fn test_commands_from_json() {
        let program = r#"[
            {"op": "forward", "distance": 20},
            {"op": "right", "degrees": 90},
            {"op": "forward"},
            {"op": "pen_up"},
            {"op": "home"}
        ]"#;
        let commands: Vec<TurtleCommand> = serde_json::from_str(program).unwrap();
        assert_eq!(commands[2], TurtleCommand::Forward { distance: None });

        let (mut canvas, mut turtle) = setup();
        for command in &commands {
            turtle.execute(command, &mut canvas).unwrap();
        }
        assert_eq!(canvas.buffer().pixel(120, 55), BLACK);
        assert!(!canvas.is_drawing_enabled());
        assert_eq!(turtle.position(), pixel(100, 50));
    }
}
