use image::Rgb;
use raster_paint::{CanvasState, Editor, EditorConfig, PixelBuffer, ToolKind, UndoHistory, pixel};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

fn shade(level: u8) -> Rgb<u8> {
    Rgb([level, level, level])
}

fn small_config() -> EditorConfig {
    EditorConfig {
        width: 40,
        height: 30,
        ..EditorConfig::default()
    }
}

#[test]
fn test_undo_restores_exact_snapshot() {
    let mut editor = Editor::new(small_config()).unwrap();
    editor.select_tool(ToolKind::Square);
    let before = editor.canvas().buffer().clone();

    editor.press(pixel(5, 5));
    editor.drag(pixel(25, 20));
    editor.release(pixel(25, 20));
    assert_ne!(editor.canvas().buffer(), &before);

    assert!(editor.undo());
    assert_eq!(editor.canvas().buffer(), &before);
    assert!(!editor.undo());
    assert_eq!(editor.canvas().buffer(), &before);
}

#[test]
fn test_oldest_snapshots_evicted() {
    let mut canvas = CanvasState::new(4, 4, WHITE).unwrap();
    let mut history = UndoHistory::new(3);

    for level in 1..=5 {
        canvas.replace_buffer(PixelBuffer::new(4, 4, shade(level)).unwrap());
        history.save_state(&canvas);
    }
    assert_eq!(history.len(), 3);

    for level in [5, 4, 3] {
        assert!(history.undo(&mut canvas));
        assert_eq!(canvas.buffer().pixel(0, 0), Some(shade(level)));
    }
    assert!(!history.undo(&mut canvas));
    assert_eq!(canvas.buffer().pixel(0, 0), Some(shade(3)));
}

#[test]
fn test_clear_drops_history() {
    let mut editor = Editor::new(small_config()).unwrap();
    for _ in 0..5 {
        editor.save_checkpoint();
    }
    assert!(editor.can_undo());

    editor.clear();
    assert!(!editor.can_undo());
    assert!(!editor.undo());
    let buffer = editor.canvas().buffer();
    assert!(buffer.as_image().pixels().all(|p| *p == WHITE));
}

#[test]
fn test_tool_switch_checkpoints_stack() {
    let mut editor = Editor::new(small_config()).unwrap();
    editor.select_tool(ToolKind::Line);
    editor.select_tool(ToolKind::Circle);
    editor.select_tool(ToolKind::Turtle);
    assert_eq!(editor.history().len(), 3);
}

#[test]
fn test_depth_from_config() {
    let mut editor = Editor::new(EditorConfig {
        max_undo_depth: 2,
        ..small_config()
    })
    .unwrap();
    for _ in 0..6 {
        editor.save_checkpoint();
    }
    assert_eq!(editor.history().len(), 2);
    assert_eq!(editor.history().max_depth(), 2);
}

#[test]
fn test_mismatched_snapshot_is_resampled() {
    let small = CanvasState::new(10, 10, shade(40)).unwrap();
    let mut history = UndoHistory::default();
    history.save_state(&small);

    let mut large = CanvasState::new(20, 20, WHITE).unwrap();
    assert!(history.undo(&mut large));
    assert_eq!(large.buffer().dimensions(), (20, 20));
    assert_eq!(large.buffer().pixel(19, 19), Some(shade(40)));
}
