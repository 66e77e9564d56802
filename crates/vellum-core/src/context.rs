//! Pen and fill attributes exchanged with the engine.
//!
//! The UI edits a pending [`DrawContext`] and commits selected fields to the
//! engine with a [`ContextMask`]; the engine applies them with
//! [`DrawContext::copy_from`].

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::ContextError;

/// Line dash style, wire values 0..=5.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum LineStyle {
    #[default]
    Solid = 0,
    Dash = 1,
    Dot = 2,
    DashDot = 3,
    DashDotDot = 4,
    /// Nothing is stroked.
    Null = 5,
}

impl LineStyle {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for LineStyle {
    type Error = ContextError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => LineStyle::Solid,
            1 => LineStyle::Dash,
            2 => LineStyle::Dot,
            3 => LineStyle::DashDot,
            4 => LineStyle::DashDotDot,
            5 => LineStyle::Null,
            other => return Err(ContextError::LineStyle(other)),
        })
    }
}

/// Arrow head drawn at a line end, wire values 0..=6.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum ArrowHead {
    #[default]
    None = 0,
    SharpClosed = 1,
    SharpLine = 2,
    TLine = 3,
    SlashLine = 4,
    ClosedCircle = 5,
    OpenedCircle = 6,
}

impl ArrowHead {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for ArrowHead {
    type Error = ContextError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => ArrowHead::None,
            1 => ArrowHead::SharpClosed,
            2 => ArrowHead::SharpLine,
            3 => ArrowHead::TLine,
            4 => ArrowHead::SlashLine,
            5 => ArrowHead::ClosedCircle,
            6 => ArrowHead::OpenedCircle,
            other => return Err(ContextError::ArrowHead(other)),
        })
    }
}

bitflags! {
    /// Which [`DrawContext`] fields a commit carries.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ContextMask: u32 {
        const LINE_RGB = 0x01;
        const LINE_ALPHA = 0x02;
        const LINE_ARGB = Self::LINE_RGB.bits() | Self::LINE_ALPHA.bits();
        const LINE_WIDTH = 0x04;
        const LINE_STYLE = 0x08;
        const FILL_RGB = 0x10;
        const FILL_ALPHA = 0x20;
        const FILL_ARGB = Self::FILL_RGB.bits() | Self::FILL_ALPHA.bits();
        const ARROW_HEAD = 0x40;
        const ALL = 0xFF;
    }
}

/// Mutable bag of pen and fill attributes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrawContext {
    /// Positive: tenths of a physical unit. Zero: one pixel. Negative: pixels.
    pub line_width: f32,
    /// Whether pixel widths scale with zoom.
    pub auto_scale: bool,
    pub line_color: Color,
    pub line_style: LineStyle,
    /// Alpha 0 means no fill.
    pub fill_color: Color,
    pub start_arrow: ArrowHead,
    pub end_arrow: ArrowHead,
}

impl Default for DrawContext {
    /// 3 px translucent black solid line, no fill.
    fn default() -> Self {
        Self {
            line_width: -3.0,
            auto_scale: false,
            line_color: Color::rgba(0, 0, 0, 168),
            line_style: LineStyle::Solid,
            fill_color: Color::TRANSPARENT,
            start_arrow: ArrowHead::None,
            end_arrow: ArrowHead::None,
        }
    }
}

impl DrawContext {
    /// Copy the fields selected by `mask` from `src`. RGB and alpha of each
    /// color are independent bits, so committing `LINE_RGB` keeps this
    /// context's line alpha.
    pub fn copy_from(&mut self, src: &DrawContext, mask: ContextMask) {
        if mask.contains(ContextMask::LINE_RGB) {
            self.line_color = self.line_color.with_rgb_of(src.line_color);
        }
        if mask.contains(ContextMask::LINE_ALPHA) {
            self.line_color.a = src.line_color.a;
        }
        if mask.contains(ContextMask::LINE_WIDTH) {
            self.line_width = src.line_width;
            self.auto_scale = src.auto_scale;
        }
        if mask.contains(ContextMask::LINE_STYLE) {
            self.line_style = src.line_style;
        }
        if mask.contains(ContextMask::FILL_RGB) {
            self.fill_color = self.fill_color.with_rgb_of(src.fill_color);
        }
        if mask.contains(ContextMask::FILL_ALPHA) {
            self.fill_color.a = src.fill_color.a;
        }
        if mask.contains(ContextMask::ARROW_HEAD) {
            self.start_arrow = src.start_arrow;
            self.end_arrow = src.end_arrow;
        }
    }

    pub fn has_fill(&self) -> bool {
        !self.fill_color.is_transparent()
    }

    /// Null style, or a fully transparent line.
    pub fn is_null_line(&self) -> bool {
        self.line_style == LineStyle::Null || self.line_color.is_transparent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_rgb_keeps_alpha() {
        let mut committed = DrawContext::default();
        committed.line_color = Color::rgba(10, 20, 30, 0);

        let mut pending = committed.clone();
        pending.line_color = Color::rgb(200, 0, 0);
        committed.copy_from(&pending, ContextMask::LINE_RGB);

        assert_eq!(committed.line_color, Color::rgba(200, 0, 0, 0));
    }

    #[test]
    fn test_line_argb_copies_both() {
        let mut committed = DrawContext::default();
        let mut pending = committed.clone();
        pending.line_color = Color::rgba(1, 2, 3, 0);
        committed.copy_from(&pending, ContextMask::LINE_ARGB);
        assert_eq!(committed.line_color, Color::rgba(1, 2, 3, 0));
    }

    #[test]
    fn test_unmasked_fields_untouched() {
        let mut committed = DrawContext::default();
        let mut pending = committed.clone();
        pending.line_width = 25.0;
        pending.line_style = LineStyle::Dot;
        pending.end_arrow = ArrowHead::TLine;

        committed.copy_from(&pending, ContextMask::LINE_STYLE);
        assert_eq!(committed.line_style, LineStyle::Dot);
        assert_eq!(committed.line_width, -3.0);
        assert_eq!(committed.end_arrow, ArrowHead::None);

        committed.copy_from(&pending, ContextMask::ALL);
        assert_eq!(committed, pending);
    }

    #[test]
    fn test_enum_ranges() {
        assert_eq!(LineStyle::try_from(5), Ok(LineStyle::Null));
        assert_eq!(LineStyle::try_from(6), Err(ContextError::LineStyle(6)));
        assert_eq!(ArrowHead::try_from(6), Ok(ArrowHead::OpenedCircle));
        assert!(ArrowHead::try_from(-1).is_err());
    }

    #[test]
    fn test_mask_composition() {
        let mask = ContextMask::LINE_RGB | ContextMask::LINE_ALPHA;
        assert_eq!(mask, ContextMask::LINE_ARGB);
        assert!(ContextMask::ALL.contains(ContextMask::FILL_ARGB));
        assert!(!ContextMask::LINE_RGB.contains(ContextMask::LINE_ARGB));
    }
}
