use std::sync::Arc;

use vellum_core::{CanvasDrawing, Color, LineStyle, Point, Rect, TextAlign};

use crate::pen::{Brush, Pen, cap_for};
use crate::target::{DrawTarget, ImageDraw, ImageSource, PathData, ResourceLookup, TextDraw};

/// Owns the current pen and brush across paint passes.
///
/// Typical flow:
/// - let mut session = adapter.begin(&mut target, &resources);
/// - engine.draw_all(view, &mut session);
/// - drop(session); // ends the pass
#[derive(Debug, Default)]
pub struct CanvasAdapter {
    pen: Arc<Pen>,
    brush: Option<Arc<Brush>>,
    path: PathData,
}

impl CanvasAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pen(&self) -> &Arc<Pen> {
        &self.pen
    }

    pub fn brush(&self) -> Option<&Arc<Brush>> {
        self.brush.as_ref()
    }

    /// Start a paint pass into `target`. The pass ends when the session drops.
    pub fn begin<'a>(
        &'a mut self,
        target: &'a mut dyn DrawTarget,
        resources: &'a dyn ResourceLookup,
    ) -> DrawSession<'a> {
        target.begin_draw();
        DrawSession {
            adapter: self,
            target,
            resources,
        }
    }

    /// Apply a pen change. Clones the snapshot only while a target still holds it.
    pub fn set_pen(&mut self, argb: u32, width: f32, style: i32, phase: f32) {
        let pen = Arc::make_mut(&mut self.pen);
        if argb != 0 {
            pen.color = Color::from_argb(argb);
        }
        pen.width = if width > 0.0 { width } else { 1.0 };
        pen.dash_phase = phase;
        if style >= 0 {
            // Out-of-range styles keep the dash but still reset the cap.
            if let Ok(style) = LineStyle::try_from(style) {
                pen.style = style;
            }
            pen.cap = cap_for(pen.style);
        }
    }

    pub fn set_brush(&mut self, argb: u32, style: i32) {
        if style != 0 {
            return;
        }
        let color = Color::from_argb(argb);
        if color.is_transparent() {
            self.brush = None;
            return;
        }
        match self.brush.as_mut() {
            Some(brush) => Arc::make_mut(brush).color = color,
            None => self.brush = Some(Arc::new(Brush { color })),
        }
    }

    fn text_color(&self) -> Color {
        self.brush
            .as_ref()
            .map(|b| b.color)
            .unwrap_or(self.pen.color)
    }
}

/// One paint pass over a [`DrawTarget`].
pub struct DrawSession<'a> {
    adapter: &'a mut CanvasAdapter,
    target: &'a mut dyn DrawTarget,
    resources: &'a dyn ResourceLookup,
}

impl DrawSession<'_> {
    fn shape(&mut self, path: &PathData, stroke: bool, fill: bool) {
        let pen = stroke.then_some(&self.adapter.pen);
        let brush = if fill { self.adapter.brush.as_ref() } else { None };
        if pen.is_none() && brush.is_none() {
            return;
        }
        self.target.draw_path(path, pen, brush);
    }
}

impl Drop for DrawSession<'_> {
    fn drop(&mut self) {
        self.target.end_draw();
    }
}

impl CanvasDrawing for DrawSession<'_> {
    fn clear_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.target.clear_rect(Rect::new(x, y, w, h));
    }

    fn set_pen(&mut self, argb: u32, width: f32, style: i32, phase: f32, _orgw: f32) {
        self.adapter.set_pen(argb, width, style, phase);
    }

    fn set_brush(&mut self, argb: u32, style: i32) {
        self.adapter.set_brush(argb, style);
    }

    fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        let path = PathData::line(x1, y1, x2, y2);
        self.shape(&path, true, false);
    }

    fn draw_ellipse(&mut self, x: f32, y: f32, w: f32, h: f32, stroke: bool, fill: bool) {
        if w > 0.0 && h > 0.0 {
            let path = PathData::ellipse(Rect::new(x, y, w, h));
            self.shape(&path, stroke, fill);
        }
    }

    fn draw_rect(&mut self, x: f32, y: f32, w: f32, h: f32, stroke: bool, fill: bool) {
        if w > 0.0 && h > 0.0 {
            let path = PathData::rect(Rect::new(x, y, w, h));
            self.shape(&path, stroke, fill);
        }
    }

    fn begin_path(&mut self) {
        self.adapter.path = PathData::new();
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.adapter.path.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.adapter.path.line_to(x, y);
    }

    fn bezier_to(&mut self, c1x: f32, c1y: f32, c2x: f32, c2y: f32, x: f32, y: f32) {
        self.adapter
            .path
            .cubic_to(Point::new(c1x, c1y), Point::new(c2x, c2y), Point::new(x, y));
    }

    fn quad_to(&mut self, cpx: f32, cpy: f32, x: f32, y: f32) {
        self.adapter.path.quad_to(Point::new(cpx, cpy), Point::new(x, y));
    }

    fn close_path(&mut self) {
        self.adapter.path.close();
    }

    fn draw_path(&mut self, stroke: bool, fill: bool) {
        let path = std::mem::take(&mut self.adapter.path);
        if !path.is_empty() {
            self.shape(&path, stroke, fill);
        }
    }

    fn draw_handle(&mut self, x: f32, y: f32, kind: i32) -> bool {
        let Some(glyph) = self.resources.handle_glyph(kind) else {
            return false;
        };
        let rect = Rect::centered(Point::new(x, y), glyph.size());
        self.target.draw_image(&ImageDraw {
            source: ImageSource::Glyph(glyph),
            rect,
            angle: 0.0,
        });
        true
    }

    fn draw_bitmap(&mut self, name: &str, xc: f32, yc: f32, w: f32, h: f32, angle: f32) -> bool {
        if !(w > 0.0 && h > 0.0) {
            return false;
        }
        self.target.draw_image(&ImageDraw {
            source: ImageSource::File(name.into()),
            rect: Rect::centered(Point::new(xc, yc), vellum_core::Size::new(w, h)),
            angle,
        });
        true
    }

    fn draw_text_at(&mut self, text: &str, x: f32, y: f32, h: f32, align: i32) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        let text = match text.strip_prefix('@') {
            Some(key) => self
                .resources
                .localized(key)
                .unwrap_or_else(|| key.to_string()),
            None => text.to_string(),
        };
        let draw = TextDraw {
            text,
            origin: Point::new(x, y),
            height: h,
            align: TextAlign::from_i32(align),
            color: self.adapter.text_color(),
        };
        self.target.draw_text(&draw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DisplayList;
    use crate::display_list::Command;
    use crate::target::NoResources;

    #[test]
    fn test_pen_width_normalized() {
        let mut adapter = CanvasAdapter::new();
        adapter.set_pen(0xff00ff00, 0.0, 0, 0.0);
        assert_eq!(adapter.pen().width, 1.0);
        adapter.set_pen(0xff00ff00, -4.0, 0, 0.0);
        assert_eq!(adapter.pen().width, 1.0);
        adapter.set_pen(0, 2.5, -1, 0.0);
        assert_eq!(adapter.pen().width, 2.5);
        // argb 0 keeps the previous color
        assert_eq!(adapter.pen().color, Color::rgb(0, 255, 0));
    }

    #[test]
    fn test_negative_style_keeps_dash_and_cap() {
        let mut adapter = CanvasAdapter::new();
        adapter.set_pen(0, 1.0, 2, 0.0);
        adapter.set_pen(0, 1.0, -1, 0.0);
        assert_eq!(adapter.pen().style, LineStyle::Dot);
        assert_eq!(adapter.pen().cap, crate::LineCap::Flat);
        adapter.set_pen(0, 1.0, 5, 0.0);
        assert_eq!(adapter.pen().cap, crate::LineCap::Round);
    }

    #[test]
    fn test_pen_copy_on_write() {
        let mut adapter = CanvasAdapter::new();
        let held = adapter.pen().clone();
        adapter.set_pen(0xffff0000, 3.0, 1, 0.0);
        assert_eq!(held.width, 1.0);
        assert!(!Arc::ptr_eq(&held, adapter.pen()));

        drop(held);
        let before = Arc::as_ptr(adapter.pen());
        adapter.set_pen(0xff0000ff, 3.0, 1, 0.0);
        assert_eq!(before, Arc::as_ptr(adapter.pen()));
    }

    #[test]
    fn test_transparent_brush_removes_fill() {
        let mut adapter = CanvasAdapter::new();
        adapter.set_brush(0x80112233, 0);
        assert!(adapter.brush().is_some());
        adapter.set_brush(0x00112233, 0);
        assert!(adapter.brush().is_none());
    }

    #[test]
    fn test_degenerate_shapes_skipped() {
        let mut adapter = CanvasAdapter::new();
        let mut list = DisplayList::new();
        {
            let mut s = adapter.begin(&mut list, &NoResources);
            s.draw_rect(0.0, 0.0, 0.0, 10.0, true, false);
            s.draw_ellipse(0.0, 0.0, 10.0, -1.0, true, false);
            assert!(!s.draw_bitmap("a.png", 5.0, 5.0, 0.0, 4.0, 0.0));
            s.draw_rect(0.0, 0.0, 4.0, 4.0, true, false);
        }
        let paths = list
            .commands()
            .iter()
            .filter(|c| matches!(c, Command::Path { .. }))
            .count();
        assert_eq!(paths, 1);
    }

    #[test]
    fn test_missing_handle_glyph() {
        let mut adapter = CanvasAdapter::new();
        let mut list = DisplayList::new();
        let mut s = adapter.begin(&mut list, &NoResources);
        assert!(!s.draw_handle(1.0, 1.0, 3));
    }
}
