use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;
use vellum_core::{Color, Rect, TextAlign};

use crate::pen::{Brush, LineCap, Pen};
use crate::target::{DrawTarget, ImageDraw, ImageSource, PathData, PathSegment, TextDraw};

/// Vector target that serializes drawing into a standalone SVG document.
#[derive(Clone, Debug)]
pub struct SvgTarget {
    width: f32,
    height: f32,
    elements: Vec<String>,
}

impl SvgTarget {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
            elements: Vec::new(),
        }
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Full document. Valid with zero elements.
    pub fn to_svg_string(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = num(self.width),
            h = num(self.height),
        );
        for el in &self.elements {
            out.push_str("  ");
            out.push_str(el);
            out.push('\n');
        }
        out.push_str("</svg>\n");
        out
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_svg_string())
            .with_context(|| format!("failed to write {}", path.display()))?;
        debug!(path = %path.display(), elements = self.elements.len(), "svg written");
        Ok(())
    }
}

fn num(v: f32) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

fn path_d(data: &PathData) -> String {
    let mut d = String::new();
    for seg in &data.segments {
        if !d.is_empty() {
            d.push(' ');
        }
        match *seg {
            PathSegment::MoveTo(p) => {
                let _ = write!(d, "M{} {}", num(p.x), num(p.y));
            }
            PathSegment::LineTo(p) => {
                let _ = write!(d, "L{} {}", num(p.x), num(p.y));
            }
            PathSegment::CubicTo(c1, c2, p) => {
                let _ = write!(
                    d,
                    "C{} {} {} {} {} {}",
                    num(c1.x),
                    num(c1.y),
                    num(c2.x),
                    num(c2.y),
                    num(p.x),
                    num(p.y)
                );
            }
            PathSegment::QuadTo(c, p) => {
                let _ = write!(d, "Q{} {} {} {}", num(c.x), num(c.y), num(p.x), num(p.y));
            }
            PathSegment::Close => d.push('Z'),
        }
    }
    d
}

fn paint_attrs(prefix: &str, color: Color) -> String {
    let mut s = format!(r#" {prefix}="{}""#, color.to_hex_rgb());
    if color.a < 255 {
        let _ = write!(s, r#" {prefix}-opacity="{}""#, num(color.opacity()));
    }
    s
}

impl DrawTarget for SvgTarget {
    /// A clear covering the whole document drops everything drawn so far.
    fn clear_rect(&mut self, rect: Rect) {
        if rect.x <= 0.0 && rect.y <= 0.0 && rect.right() >= self.width && rect.bottom() >= self.height {
            self.elements.clear();
        }
    }

    fn draw_path(&mut self, path: &PathData, pen: Option<&Arc<Pen>>, brush: Option<&Arc<Brush>>) {
        let mut el = format!(r#"<path d="{}""#, path_d(path));
        match brush {
            Some(b) => el.push_str(&paint_attrs("fill", b.color)),
            None => el.push_str(r#" fill="none""#),
        }
        match pen {
            Some(p) => {
                el.push_str(&paint_attrs("stroke", p.color));
                let _ = write!(el, r#" stroke-width="{}""#, num(p.width));
                if p.cap == LineCap::Round {
                    el.push_str(r#" stroke-linecap="round" stroke-linejoin="round""#);
                }
                if p.is_dashed() {
                    let dashes: Vec<String> = p.dash_array().into_iter().map(num).collect();
                    let _ = write!(el, r#" stroke-dasharray="{}""#, dashes.join(","));
                    if p.dash_phase != 0.0 {
                        let _ = write!(el, r#" stroke-dashoffset="{}""#, num(p.dash_phase));
                    }
                }
            }
            None => el.push_str(r#" stroke="none""#),
        }
        el.push_str("/>");
        self.elements.push(el);
    }

    fn draw_image(&mut self, draw: &ImageDraw) {
        let href = match &draw.source {
            ImageSource::File(path) => path.to_string_lossy().into_owned(),
            ImageSource::Glyph(glyph) => glyph.name.clone(),
        };
        let r = draw.rect;
        let mut el = format!(
            r#"<image xlink:href="{}" x="{}" y="{}" width="{}" height="{}""#,
            escape(&href),
            num(r.x),
            num(r.y),
            num(r.w),
            num(r.h)
        );
        if draw.angle != 0.0 {
            let c = r.center();
            let _ = write!(
                el,
                r#" transform="rotate({} {} {})""#,
                num(draw.angle),
                num(c.x),
                num(c.y)
            );
        }
        el.push_str("/>");
        self.elements.push(el);
    }

    fn draw_text(&mut self, text: &TextDraw) -> f32 {
        let anchor = match text.align {
            TextAlign::Left => "start",
            TextAlign::Right => "end",
            TextAlign::Center => "middle",
        };
        let mut el = format!(
            r#"<text x="{}" y="{}" font-size="{}" text-anchor="{}""#,
            num(text.origin.x),
            num(text.origin.y),
            num(text.height),
            anchor
        );
        el.push_str(&paint_attrs("fill", text.color));
        let _ = write!(el, ">{}</text>", escape(&text.text));
        self.elements.push(el);
        text.estimated_advance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_format() {
        assert_eq!(num(10.0), "10");
        assert_eq!(num(2.5), "2.5");
        assert_eq!(num(-0.001), "0");
        assert_eq!(num(1.256), "1.26");
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }

    #[test]
    fn test_translucent_stroke_has_opacity() {
        let mut svg = SvgTarget::new(10.0, 10.0);
        let pen = Arc::new(Pen {
            color: Color::rgba(0, 0, 0, 128),
            ..Pen::default()
        });
        svg.draw_path(&PathData::line(0.0, 0.0, 5.0, 5.0), Some(&pen), None);
        let doc = svg.to_svg_string();
        assert!(doc.contains(r#"stroke-opacity="0.5""#));
        assert!(doc.contains(r#"fill="none""#));
    }

    #[test]
    fn test_full_clear_drops_elements() {
        let mut svg = SvgTarget::new(10.0, 10.0);
        let brush = Arc::new(Brush { color: Color::BLUE });
        svg.draw_path(&PathData::rect(Rect::new(1.0, 1.0, 2.0, 2.0)), None, Some(&brush));
        svg.clear_rect(Rect::new(0.0, 0.0, 4.0, 4.0));
        assert_eq!(svg.element_count(), 1);
        svg.clear_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(svg.element_count(), 0);
    }
}
