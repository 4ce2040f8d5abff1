use egui::Slider;
use image::Rgb;

use crate::PaintApp;
use crate::error::CanvasResult;
use crate::panels::ToolButton;
use crate::tools::{BrushKind, EraserShape, ShapeKind, ToolKind, ToolType};

pub fn tools_panel(app: &mut PaintApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(true)
        .default_width(220.0)
        .show(ctx, |ui| {
            ui.heading("Tools");

            let active = app.editor().tool_kind();
            ui.horizontal_wrapped(|ui| {
                for kind in ToolKind::ALL {
                    let selected = active.same_tool(kind);
                    if ToolButton::new(kind, selected).show(ui).clicked() && !selected {
                        log::info!("Tool selected from UI: {kind}");
                        app.editor_mut().select_tool(kind);
                    }
                }
            });
            ui.separator();

            drawing_settings(app, ui);
            ui.separator();

            ui.heading("Tool Options");
            tool_options(app, ui);
            ui.separator();

            view_and_history(app, ui);

            if let Some(status) = app.status() {
                ui.separator();
                ui.label(status);
            }
        });
}

fn drawing_settings(app: &mut PaintApp, ui: &mut egui::Ui) {
    let canvas = app.editor().canvas();
    let mut color = canvas.color().0;
    let mut thickness = canvas.thickness();
    let mut opacity = canvas.opacity();

    ui.horizontal(|ui| {
        ui.label("Color:");
        if ui.color_edit_button_srgb(&mut color).changed() {
            app.editor_mut().set_color(Rgb(color));
        }
    });

    ui.horizontal(|ui| {
        ui.label("Thickness:");
        if ui.add(Slider::new(&mut thickness, 1..=50)).changed() {
            let result = app.editor_mut().set_thickness(thickness);
            report(app, result);
        }
    });

    ui.horizontal(|ui| {
        ui.label("Opacity:");
        if ui.add(Slider::new(&mut opacity, 0.0..=1.0)).changed() {
            let result = app.editor_mut().set_opacity(opacity);
            report(app, result);
        }
    });
}

fn tool_options(app: &mut PaintApp, ui: &mut egui::Ui) {
    match app.editor().tool_kind() {
        ToolKind::Brush(current) => {
            ui.horizontal(|ui| {
                for kind in BrushKind::ALL {
                    if ui.selectable_label(current == kind, kind.as_str()).clicked() {
                        let result = app.editor_mut().set_brush_kind(kind.as_str());
                        report(app, result);
                    }
                }
            });
        }
        ToolKind::Eraser(current) => {
            ui.horizontal(|ui| {
                for shape in EraserShape::ALL {
                    if ui.selectable_label(current == shape, shape.as_str()).clicked() {
                        let result = app.editor_mut().set_eraser_shape(shape.as_str());
                        report(app, result);
                    }
                }
            });
            let mut size = match app.editor().tool() {
                ToolType::Eraser(eraser) => eraser.size(),
                _ => app.editor().config().eraser_size,
            };
            ui.horizontal(|ui| {
                ui.label("Size:");
                if ui.add(Slider::new(&mut size, 1..=100)).changed() {
                    let result = app.editor_mut().set_eraser_size(size);
                    report(app, result);
                }
            });
        }
        ToolKind::BlurBrush => {
            let mut strength = match app.editor().tool() {
                ToolType::BlurBrush(brush) => brush.blur_strength(),
                _ => app.editor().config().blur_strength,
            };
            ui.horizontal(|ui| {
                ui.label("Strength:");
                if ui.add(Slider::new(&mut strength, 1..=25)).changed() {
                    let result = app.editor_mut().set_blur_strength(strength);
                    report(app, result);
                }
            });
            if ui.button("Undo blur stroke").clicked() && !app.editor_mut().undo_blur_stroke() {
                app.set_status("No blur stroke to undo");
            }
        }
        ToolKind::Shapes(current) => {
            ui.horizontal(|ui| {
                for kind in ShapeKind::ALL {
                    if ui.selectable_label(current == kind, kind.to_string()).clicked() {
                        let result = app.editor_mut().set_shape_kind(&kind.to_string());
                        report(app, result);
                    }
                }
            });
        }
        ToolKind::Turtle => {
            ui.label("Program (JSON):");
            ui.add(
                egui::TextEdit::multiline(app.turtle_program_mut())
                    .code_editor()
                    .desired_rows(6),
            );
            if ui.button("Run").clicked() {
                app.run_turtle_program();
            }
        }
        ToolKind::Pen
        | ToolKind::Pencil
        | ToolKind::Line
        | ToolKind::Circle
        | ToolKind::Square => {
            ui.label("No options");
        }
    }
}

fn view_and_history(app: &mut PaintApp, ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        if ui.button("−").on_hover_text("Zoom out").clicked() {
            app.editor_mut().zoom_out();
        }
        ui.label(format!("{:.0}%", app.editor().viewport().zoom_factor() * 100.0));
        if ui.button("+").on_hover_text("Zoom in").clicked() {
            app.editor_mut().zoom_in();
        }
    });

    ui.horizontal(|ui| {
        let can_undo = app.editor().can_undo();
        if ui.add_enabled(can_undo, egui::Button::new("Undo")).clicked() {
            app.editor_mut().undo();
        }
        if ui.button("Clear").clicked() {
            app.editor_mut().clear();
        }
    });
    ui.label(format!("Undo stack size: {}", app.editor().history().len()));
}

fn report(app: &mut PaintApp, result: CanvasResult) {
    if let Err(err) = result {
        log::warn!("Rejected setting: {err}");
        app.set_status(err.to_string());
    }
}
