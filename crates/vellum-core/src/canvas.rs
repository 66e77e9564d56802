/// Horizontal text alignment relative to the anchor point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextAlign {
    #[default]
    Left,
    Right,
    Center,
}

impl TextAlign {
    /// Engine wire value: 0 left, 1 right, 2 center; anything else is left.
    pub fn from_i32(value: i32) -> Self {
        match value {
            1 => TextAlign::Right,
            2 => TextAlign::Center,
            _ => TextAlign::Left,
        }
    }
}

/// Number of handle glyph kinds the engine may ask for (vertex dots, snap marks, ...).
pub const HANDLE_GLYPH_COUNT: usize = 17;

/// Primitive drawing protocol the engine replays into.
///
/// All coordinates are surface pixels, y-down. Colors travel in the packed
/// `0xAARRGGBB` form. Path construction is stateful:
/// `begin_path` → `move_to`/`line_to`/`bezier_to`/`quad_to`/`close_path` →
/// `draw_path`.
pub trait CanvasDrawing {
    fn clear_rect(&mut self, x: f32, y: f32, w: f32, h: f32);

    /// `argb == 0` keeps the current color, `width <= 0` means one unit,
    /// `style` is a line style 0..=5 (negative keeps the current dash).
    fn set_pen(&mut self, argb: u32, width: f32, style: i32, phase: f32, orgw: f32);

    /// `style` 0 is a solid fill; alpha 0 removes the fill.
    fn set_brush(&mut self, argb: u32, style: i32);

    fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32);
    fn draw_ellipse(&mut self, x: f32, y: f32, w: f32, h: f32, stroke: bool, fill: bool);
    fn draw_rect(&mut self, x: f32, y: f32, w: f32, h: f32, stroke: bool, fill: bool);

    fn begin_path(&mut self);
    fn move_to(&mut self, x: f32, y: f32);
    fn line_to(&mut self, x: f32, y: f32);
    fn bezier_to(&mut self, c1x: f32, c1y: f32, c2x: f32, c2y: f32, x: f32, y: f32);
    fn quad_to(&mut self, cpx: f32, cpy: f32, x: f32, y: f32);
    fn close_path(&mut self);
    fn draw_path(&mut self, stroke: bool, fill: bool);

    /// Draw a handle glyph centered at `(x, y)`. Returns false when the kind has no glyph.
    fn draw_handle(&mut self, x: f32, y: f32, kind: i32) -> bool;

    /// Draw a named bitmap of size `w`×`h` centered at `(xc, yc)`, rotated by `angle` degrees.
    fn draw_bitmap(&mut self, name: &str, xc: f32, yc: f32, w: f32, h: f32, angle: f32) -> bool;

    /// Draw `text` with its baseline anchor at `(x, y)`. Returns the advance width.
    fn draw_text_at(&mut self, text: &str, x: f32, y: f32, h: f32, align: i32) -> f32;
}
