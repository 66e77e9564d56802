use std::path::PathBuf;
use std::sync::Arc;

use image::RgbaImage;
use vellum_core::{Color, Point, Rect, TextAlign};

use crate::pen::{Brush, Pen};

/// Cubic approximation constant for quarter ellipse arcs.
const KAPPA: f32 = 0.552_284_8;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathSegment {
    MoveTo(Point),
    LineTo(Point),
    CubicTo(Point, Point, Point),
    QuadTo(Point, Point),
    Close,
}

/// Path geometry in surface pixels.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathData {
    pub segments: Vec<PathSegment>,
}

impl PathData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.segments.push(PathSegment::MoveTo(Point::new(x, y)));
    }

    pub fn line_to(&mut self, x: f32, y: f32) {
        self.segments.push(PathSegment::LineTo(Point::new(x, y)));
    }

    pub fn cubic_to(&mut self, c1: Point, c2: Point, to: Point) {
        self.segments.push(PathSegment::CubicTo(c1, c2, to));
    }

    pub fn quad_to(&mut self, c: Point, to: Point) {
        self.segments.push(PathSegment::QuadTo(c, to));
    }

    pub fn close(&mut self) {
        self.segments.push(PathSegment::Close);
    }

    pub fn line(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        let mut p = Self::new();
        p.move_to(x1, y1);
        p.line_to(x2, y2);
        p
    }

    pub fn rect(r: Rect) -> Self {
        let mut p = Self::new();
        p.move_to(r.x, r.y);
        p.line_to(r.right(), r.y);
        p.line_to(r.right(), r.bottom());
        p.line_to(r.x, r.bottom());
        p.close();
        p
    }

    /// Ellipse inscribed in `r`, four cubic arcs clockwise from the right-most point.
    pub fn ellipse(r: Rect) -> Self {
        let c = r.center();
        let (rx, ry) = (r.w / 2.0, r.h / 2.0);
        let (kx, ky) = (rx * KAPPA, ry * KAPPA);
        let mut p = Self::new();
        p.move_to(c.x + rx, c.y);
        p.cubic_to(
            Point::new(c.x + rx, c.y + ky),
            Point::new(c.x + kx, c.y + ry),
            Point::new(c.x, c.y + ry),
        );
        p.cubic_to(
            Point::new(c.x - kx, c.y + ry),
            Point::new(c.x - rx, c.y + ky),
            Point::new(c.x - rx, c.y),
        );
        p.cubic_to(
            Point::new(c.x - rx, c.y - ky),
            Point::new(c.x - kx, c.y - ry),
            Point::new(c.x, c.y - ry),
        );
        p.cubic_to(
            Point::new(c.x + kx, c.y - ry),
            Point::new(c.x + rx, c.y - ky),
            Point::new(c.x + rx, c.y),
        );
        p.close();
        p
    }
}

/// Decoded bitmap resolved from a resource name (handle glyphs, action icons).
#[derive(Clone, Debug)]
pub struct Glyph {
    pub name: String,
    pub width: f32,
    pub height: f32,
    /// Pixel data when decoded; vector targets only need the name.
    pub pixels: Option<Arc<RgbaImage>>,
}

impl Glyph {
    pub fn size(&self) -> vellum_core::Size {
        vellum_core::Size::new(self.width, self.height)
    }
}

#[derive(Clone, Debug)]
pub enum ImageSource {
    File(PathBuf),
    Glyph(Arc<Glyph>),
}

/// Image placed in `rect` (unrotated) and rotated by `angle` degrees around its center.
#[derive(Clone, Debug)]
pub struct ImageDraw {
    pub source: ImageSource,
    pub rect: Rect,
    pub angle: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextDraw {
    pub text: String,
    pub origin: Point,
    pub height: f32,
    pub align: TextAlign,
    pub color: Color,
}

impl TextDraw {
    /// Advance estimate for targets without font metrics.
    pub fn estimated_advance(&self) -> f32 {
        self.text.chars().count() as f32 * self.height * 0.5
    }
}

/// Host-side drawing capability a [`crate::CanvasAdapter`] paints into.
pub trait DrawTarget {
    fn begin_draw(&mut self) {}
    fn end_draw(&mut self) {}
    fn clear_rect(&mut self, rect: Rect);
    /// Stroke with `pen` when present, fill with `brush` when present.
    fn draw_path(&mut self, path: &PathData, pen: Option<&Arc<Pen>>, brush: Option<&Arc<Brush>>);
    fn draw_image(&mut self, image: &ImageDraw);
    /// Returns the advance width.
    fn draw_text(&mut self, text: &TextDraw) -> f32;
}

/// Named resources the adapter resolves while drawing.
pub trait ResourceLookup {
    fn handle_glyph(&self, kind: i32) -> Option<Arc<Glyph>>;
    /// Localized text for `key`, given without its leading `@`.
    fn localized(&self, key: &str) -> Option<String>;
}

/// Lookup with no resources.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoResources;

impl ResourceLookup for NoResources {
    fn handle_glyph(&self, _kind: i32) -> Option<Arc<Glyph>> {
        None
    }

    fn localized(&self, _key: &str) -> Option<String> {
        None
    }
}
