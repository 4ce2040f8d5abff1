use eframe::egui::{self, Color32, ColorImage, TextureHandle, TextureOptions};

use crate::editor::Editor;
use crate::pixel_buffer::PixelBuffer;

/// Uploads the editor's presented image to the GPU and paints it.
///
/// The texture is rebuilt only when the editor's revision moves on, so an
/// idle canvas costs one texture bind per frame.
pub struct Renderer {
    ctx: egui::Context,
    texture: Option<TextureHandle>,
    uploaded_revision: Option<u64>,
}

impl Renderer {
    /// Creates a new renderer bound to the app's egui context
    ///
    /// Args:
    ///     cc (eframe::CreationContext): The creation context handed to the app
    ///
    /// Returns:
    ///     Renderer: A renderer with no texture uploaded yet
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        Self::with_context(cc.egui_ctx.clone())
    }

    pub fn with_context(ctx: egui::Context) -> Self {
        Self {
            ctx,
            texture: None,
            uploaded_revision: None,
        }
    }

    /// Re-uploads the canvas texture if the editor changed since the last
    /// upload
    ///
    /// Args:
    ///     editor (Editor): The editor whose presented image is shown
    pub fn update_texture(&mut self, editor: &Editor) {
        let revision = editor.revision();
        if self.texture.is_some() && self.uploaded_revision == Some(revision) {
            return;
        }

        let image = to_color_image(&editor.present());
        match &mut self.texture {
            Some(texture) => texture.set(image, TextureOptions::NEAREST),
            None => {
                self.texture = Some(self.ctx.load_texture("canvas", image, TextureOptions::NEAREST));
            }
        }
        log::trace!("Uploaded canvas texture for revision {revision}");
        self.uploaded_revision = Some(revision);
    }

    pub fn texture(&self) -> Option<&TextureHandle> {
        self.texture.as_ref()
    }

    /// Paints the canvas texture anchored at the top-left of `rect`
    ///
    /// Args:
    ///     painter (egui::Painter): The painter to draw with
    ///     rect (egui::Rect): The rectangle reserved for the canvas view
    pub fn render(&self, painter: &egui::Painter, rect: egui::Rect) {
        painter.rect_filled(rect, 0.0, Color32::from_gray(60));
        let Some(texture) = &self.texture else {
            return;
        };
        let image_rect = egui::Rect::from_min_size(rect.min, texture.size_vec2());
        painter.image(
            texture.id(),
            image_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            Color32::WHITE,
        );
    }
}

/// Converts a packed RGB buffer into an egui image
pub fn to_color_image(buffer: &PixelBuffer) -> ColorImage {
    let (width, height) = buffer.dimensions();
    ColorImage::from_rgb([width as usize, height as usize], buffer.as_raw())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use image::Rgb;

    fn small_editor() -> Editor {
        let config = EditorConfig {
            width: 16,
            height: 8,
            ..EditorConfig::default()
        };
        Editor::new(config).unwrap()
    }

    #[test]
    fn test_renderer_creation() {
        let renderer = Renderer::with_context(egui::Context::default());
        assert!(renderer.texture().is_none());
    }

    #[test]
    fn test_color_image_matches_buffer() {
        let mut buffer = PixelBuffer::new(3, 2, Rgb([255, 255, 255])).unwrap();
        buffer.put_pixel(2, 1, Rgb([10, 20, 30]));
        let image = to_color_image(&buffer);
        assert_eq!(image.size, [3, 2]);
        assert_eq!(image.pixels[5], Color32::from_rgb(10, 20, 30));
        assert_eq!(image.pixels[0], Color32::WHITE);
    }

    #[test]
    fn test_texture_follows_revision() {
        let mut editor = small_editor();
        let mut renderer = Renderer::with_context(egui::Context::default());

        renderer.update_texture(&editor);
        assert_eq!(renderer.texture().map(|t| t.size()), Some([16, 8]));
        assert_eq!(renderer.uploaded_revision, Some(editor.revision()));

        editor.zoom(2.0);
        renderer.update_texture(&editor);
        assert_eq!(renderer.uploaded_revision, Some(editor.revision()));
    }
}
