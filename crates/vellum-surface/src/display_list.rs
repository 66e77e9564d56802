use std::sync::Arc;

use vellum_core::Rect;

use crate::pen::{Brush, Pen};
use crate::target::{DrawTarget, ImageDraw, PathData, TextDraw};

#[derive(Clone, Debug)]
pub enum Command {
    Clear(Rect),
    /// Path with the pen/brush snapshots active when it was drawn.
    Path {
        path: PathData,
        pen: Option<Arc<Pen>>,
        brush: Option<Arc<Brush>>,
    },
    Image(ImageDraw),
    Text(TextDraw),
}

/// Retained recording of one paint pass. Replays into any other target.
#[derive(Clone, Debug, Default)]
pub struct DisplayList {
    commands: Vec<Command>,
    passes: u32,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of completed paint passes.
    pub fn passes(&self) -> u32 {
        self.passes
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn replay(&self, target: &mut dyn DrawTarget) {
        target.begin_draw();
        for cmd in &self.commands {
            match cmd {
                Command::Clear(rect) => target.clear_rect(*rect),
                Command::Path { path, pen, brush } => target.draw_path(path, pen.as_ref(), brush.as_ref()),
                Command::Image(image) => target.draw_image(image),
                Command::Text(text) => {
                    target.draw_text(text);
                }
            }
        }
        target.end_draw();
    }
}

impl DrawTarget for DisplayList {
    /// Each pass starts a fresh recording.
    fn begin_draw(&mut self) {
        self.commands.clear();
    }

    fn end_draw(&mut self) {
        self.passes += 1;
    }

    fn clear_rect(&mut self, rect: Rect) {
        self.commands.push(Command::Clear(rect));
    }

    fn draw_path(&mut self, path: &PathData, pen: Option<&Arc<Pen>>, brush: Option<&Arc<Brush>>) {
        self.commands.push(Command::Path {
            path: path.clone(),
            pen: pen.cloned(),
            brush: brush.cloned(),
        });
    }

    fn draw_image(&mut self, image: &ImageDraw) {
        self.commands.push(Command::Image(image.clone()));
    }

    fn draw_text(&mut self, text: &TextDraw) -> f32 {
        self.commands.push(Command::Text(text.clone()));
        text.estimated_advance()
    }
}
