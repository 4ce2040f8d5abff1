use crate::PaintApp;
use crate::tools::Tool;

pub fn central_panel(app: &mut PaintApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::drag());
        let canvas_rect = response.rect;

        // The view follows the panel, clamped to at least one pixel
        app.editor_mut()
            .set_view_size(canvas_rect.width() as u32, canvas_rect.height() as u32);
        app.input_handler_mut().set_canvas_rect(canvas_rect);

        let events = app.input_handler_mut().process_input(ctx);
        for event in &events {
            app.editor_mut().handle_input(event);
        }

        if response.hovered() {
            let (zoom, scroll) = ctx.input(|input| (input.zoom_delta(), input.smooth_scroll_delta));
            if zoom != 1.0 {
                app.editor_mut().zoom(zoom);
            } else if scroll != egui::Vec2::ZERO {
                app.editor_mut().pan(-scroll.x as i32, -scroll.y as i32);
            }
        }

        app.paint_canvas(&painter, canvas_rect);

        if app.editor().tool().is_active() {
            ctx.request_repaint();
        }
    });
}
