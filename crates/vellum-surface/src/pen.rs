use vellum_core::{Color, LineStyle};

/// Dash patterns in multiples of the pen width, indexed by line style 0..=4.
const DASH_TABLE: [&[f32]; 5] = [
    &[],
    &[4.0, 2.0],
    &[1.0, 2.0],
    &[4.0, 2.0, 1.0, 2.0],
    &[4.0, 2.0, 1.0, 2.0, 1.0, 2.0],
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineCap {
    #[default]
    Round,
    Flat,
}

/// Stroke attributes. Shared with targets as an `Arc` snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct Pen {
    pub color: Color,
    pub width: f32,
    pub style: LineStyle,
    pub dash_phase: f32,
    pub cap: LineCap,
}

impl Default for Pen {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: 1.0,
            style: LineStyle::Solid,
            dash_phase: 0.0,
            cap: LineCap::Round,
        }
    }
}

impl Pen {
    /// Dash pattern for this pen scaled by its width. Empty means solid.
    pub fn dash_array(&self) -> Vec<f32> {
        dash_pattern(self.style)
            .iter()
            .map(|v| v * self.width)
            .collect()
    }

    pub fn is_dashed(&self) -> bool {
        !dash_pattern(self.style).is_empty()
    }
}

/// Unit dash pattern for `style`. The null style strokes solid.
pub fn dash_pattern(style: LineStyle) -> &'static [f32] {
    match style {
        LineStyle::Null => DASH_TABLE[0],
        other => DASH_TABLE[other.as_i32() as usize],
    }
}

/// Cap used with `style`: flat for dashed styles, round otherwise.
pub fn cap_for(style: LineStyle) -> LineCap {
    match style {
        LineStyle::Dash | LineStyle::Dot | LineStyle::DashDot | LineStyle::DashDotDot => LineCap::Flat,
        LineStyle::Solid | LineStyle::Null => LineCap::Round,
    }
}

/// Solid fill. Absence of a brush means no fill.
#[derive(Clone, Debug, PartialEq)]
pub struct Brush {
    pub color: Color,
}
