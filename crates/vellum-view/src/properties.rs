//! Drawing-property encoding between UI units and the engine context.
//!
//! Every edit starts from a fresh copy of the committed context, changes
//! one field, and commits it back with the matching [`ContextMask`].

use vellum_core::{
    ArrowHead, Color, ContextError, ContextMask, CoreEngine, DrawContext, LineStyle, ViewId,
};

/// Stored widths at or below this are not in tenths.
const WIDTH_EPSILON: f32 = 1e-5;

/// One UI-side property change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyEdit {
    /// Width in UI units; positive values are stored in tenths.
    LineWidth(f32),
    /// Width in pixels regardless of zoom.
    StrokeWidth(f32),
    LineColor(Color),
    LineAlpha(u8),
    FillColor(Color),
    FillAlpha(u8),
    LineStyle(i32),
    StartArrow(i32),
    EndArrow(i32),
}

impl PropertyEdit {
    /// Write the edit into `ctx` and return the mask to commit.
    pub fn apply(&self, ctx: &mut DrawContext) -> Result<ContextMask, ContextError> {
        let mask = match *self {
            PropertyEdit::LineWidth(v) => {
                ctx.line_width = if v > 0.0 { v * 10.0 } else { v };
                ctx.auto_scale = true;
                ContextMask::LINE_WIDTH
            }
            PropertyEdit::StrokeWidth(v) => {
                ctx.line_width = -v.abs();
                ctx.auto_scale = true;
                ContextMask::LINE_WIDTH
            }
            PropertyEdit::LineColor(c) => {
                ctx.line_color = c;
                if c.a > 0 {
                    ContextMask::LINE_RGB
                } else {
                    ContextMask::LINE_ARGB
                }
            }
            PropertyEdit::LineAlpha(a) => {
                ctx.line_color = ctx.line_color.with_alpha(a);
                ContextMask::LINE_ALPHA
            }
            PropertyEdit::FillColor(c) => {
                ctx.fill_color = c;
                if c.a > 0 {
                    ContextMask::FILL_RGB
                } else {
                    ContextMask::FILL_ARGB
                }
            }
            PropertyEdit::FillAlpha(a) => {
                ctx.fill_color = ctx.fill_color.with_alpha(a);
                ContextMask::FILL_ALPHA
            }
            PropertyEdit::LineStyle(v) => {
                ctx.line_style = LineStyle::try_from(v)?;
                ContextMask::LINE_STYLE
            }
            PropertyEdit::StartArrow(v) => {
                ctx.start_arrow = ArrowHead::try_from(v)?;
                ContextMask::ARROW_HEAD
            }
            PropertyEdit::EndArrow(v) => {
                ctx.end_arrow = ArrowHead::try_from(v)?;
                ContextMask::ARROW_HEAD
            }
        };
        Ok(mask)
    }

    /// Copy the committed context, apply, and commit with the edit's mask.
    pub fn commit(&self, engine: &mut dyn CoreEngine) -> Result<ContextMask, ContextError> {
        let mut pending = engine.context();
        let mask = self.apply(&mut pending)?;
        engine.set_context(&pending, mask);
        Ok(mask)
    }
}

/// Color as shown in the UI: opaque RGB, or transparent when alpha is 0.
pub fn display_color(c: Color) -> Color {
    if c.a > 0 {
        Color::rgb(c.r, c.g, c.b)
    } else {
        Color::TRANSPARENT
    }
}

/// Stored width back to UI units.
pub fn display_line_width(stored: f32) -> f32 {
    if stored > WIDTH_EPSILON {
        stored / 10.0
    } else {
        stored
    }
}

/// Property values mirrored into the host's property panel.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySnapshot {
    pub line_width: f32,
    pub stroke_width: f32,
    pub line_color: Color,
    pub line_alpha: u8,
    pub fill_color: Color,
    pub fill_alpha: u8,
    pub line_style: LineStyle,
    pub start_arrow: ArrowHead,
    pub end_arrow: ArrowHead,
    pub selected_count: usize,
    pub selected_type: i32,
}

impl PropertySnapshot {
    pub fn read(engine: &dyn CoreEngine, view: ViewId) -> Self {
        let ctx = engine.context();
        Self {
            line_width: display_line_width(ctx.line_width),
            stroke_width: engine.calc_pen_width(view, ctx.line_width),
            line_color: display_color(ctx.line_color),
            line_alpha: ctx.line_color.a,
            fill_color: display_color(ctx.fill_color),
            fill_alpha: ctx.fill_color.a,
            line_style: ctx.line_style,
            start_arrow: ctx.start_arrow,
            end_arrow: ctx.end_arrow,
            selected_count: engine.selected_shape_ids().len(),
            selected_type: engine.selected_shape_type(),
        }
    }
}
