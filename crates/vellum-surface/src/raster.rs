use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use image::{DynamicImage, ImageFormat, RgbImage, RgbaImage};
use tiny_skia::{
    BlendMode, ColorU8, FillRule, IntRect, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke,
    StrokeDash, Transform,
};
use tracing::{debug, warn};
use vellum_core::{Color, Rect, TextAlign};

use crate::font::{TextRasterizer, TextRun};
use crate::pen::{Brush, LineCap, Pen};
use crate::target::{DrawTarget, ImageDraw, ImageSource, PathData, PathSegment, TextDraw};

/// Raster encodings a snapshot can be written as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RasterFormat {
    Png,
    Jpeg,
    Gif,
}

impl RasterFormat {
    fn image_format(self) -> ImageFormat {
        match self {
            RasterFormat::Png => ImageFormat::Png,
            RasterFormat::Jpeg => ImageFormat::Jpeg,
            RasterFormat::Gif => ImageFormat::Gif,
        }
    }
}

/// Pick the encoding from the extension; anything unsupported is rewritten to `.png`.
pub fn resolve_raster_path(path: &Path) -> (PathBuf, RasterFormat) {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => (path.to_path_buf(), RasterFormat::Png),
        Some("jpg") | Some("jpeg") => (path.to_path_buf(), RasterFormat::Jpeg),
        Some("gif") => (path.to_path_buf(), RasterFormat::Gif),
        _ => (path.with_extension("png"), RasterFormat::Png),
    }
}

/// Software raster target backed by a tiny-skia pixmap.
pub struct PixmapTarget {
    pixmap: Pixmap,
    font: Option<Arc<TextRasterizer>>,
}

impl PixmapTarget {
    /// Text is drawn with the system font when one is installed.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let pixmap = Pixmap::new(width.max(1), height.max(1))
            .ok_or_else(|| anyhow!("invalid pixmap size {width}x{height}"))?;
        Ok(Self {
            pixmap,
            font: TextRasterizer::system(),
        })
    }

    pub fn with_font(mut self, font: Option<Arc<TextRasterizer>>) -> Self {
        self.font = font;
        self
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn fill(&mut self, color: Color) {
        self.pixmap
            .fill(tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a));
    }

    /// Straight-alpha color at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        let p = self.pixmap.pixel(x, y)?.demultiply();
        Some(Color::rgba(p.red(), p.green(), p.blue(), p.alpha()))
    }

    /// Copy of the pixels under `rect`, snapped outward to whole pixels.
    pub fn crop(&self, rect: Rect) -> Result<PixmapTarget> {
        let left = rect.x.floor().max(0.0) as i32;
        let top = rect.y.floor().max(0.0) as i32;
        let right = (rect.right().ceil() as i32).min(self.width() as i32);
        let bottom = (rect.bottom().ceil() as i32).min(self.height() as i32);
        let area = IntRect::from_ltrb(left, top, right, bottom)
            .ok_or_else(|| anyhow!("crop {rect:?} is outside the pixmap"))?;
        let pixmap = self
            .pixmap
            .clone_rect(area)
            .ok_or_else(|| anyhow!("crop {rect:?} is outside the pixmap"))?;
        Ok(Self {
            pixmap,
            font: self.font.clone(),
        })
    }

    pub fn to_rgba_image(&self) -> Result<RgbaImage> {
        let mut buf = Vec::with_capacity(self.pixmap.pixels().len() * 4);
        for p in self.pixmap.pixels() {
            let c = p.demultiply();
            buf.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        RgbaImage::from_raw(self.width(), self.height(), buf)
            .ok_or_else(|| anyhow!("pixel buffer does not match pixmap size"))
    }

    /// Encode to `path`, choosing the format from its extension. Returns the path written,
    /// which differs from `path` when the extension was rewritten.
    pub fn save(&self, path: &Path) -> Result<PathBuf> {
        let (path, format) = resolve_raster_path(path);
        let rgba = self.to_rgba_image()?;
        let image = match format {
            // No alpha channel: flatten onto white.
            RasterFormat::Jpeg => DynamicImage::ImageRgb8(flatten_on_white(&rgba)),
            _ => DynamicImage::ImageRgba8(rgba),
        };
        image
            .save_with_format(&path, format.image_format())
            .with_context(|| format!("failed to encode {}", path.display()))?;
        debug!(path = %path.display(), ?format, "raster snapshot written");
        Ok(path)
    }

    fn blit(&mut self, src: &Pixmap, draw: &ImageDraw) {
        let r = draw.rect;
        let center = r.center();
        let transform = Transform::from_rotate_at(draw.angle, center.x, center.y)
            .pre_translate(r.x, r.y)
            .pre_scale(r.w / src.width() as f32, r.h / src.height() as f32);
        self.pixmap
            .draw_pixmap(0, 0, src.as_ref(), &PixmapPaint::default(), transform, None);
    }

    /// Composite `run` with its baseline at `baseline`.
    fn blit_text(&mut self, run: &TextRun, left: f32, baseline: f32, color: Color) {
        let top = (baseline - run.ascent).round() as i32;
        let left = left.round() as i32;
        for glyph in &run.glyphs {
            let Some(mut mask) = Pixmap::new(glyph.width, glyph.height) else {
                continue;
            };
            for (dst, &cov) in mask.pixels_mut().iter_mut().zip(&glyph.coverage) {
                let a = (color.a as u32 * cov as u32 / 255) as u8;
                *dst = ColorU8::from_rgba(color.r, color.g, color.b, a).premultiply();
            }
            self.pixmap.draw_pixmap(
                left + glyph.x,
                top + glyph.y,
                mask.as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                None,
            );
        }
    }
}

fn flatten_on_white(rgba: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let blend = |c: u8| ((c as u32 * a as u32 + 255 * (255 - a as u32)) / 255) as u8;
        image::Rgb([blend(r), blend(g), blend(b)])
    })
}

fn pixmap_from_rgba(img: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(img.width(), img.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(img.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

fn build_path(data: &PathData) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for seg in &data.segments {
        match *seg {
            PathSegment::MoveTo(p) => pb.move_to(p.x, p.y),
            PathSegment::LineTo(p) => pb.line_to(p.x, p.y),
            PathSegment::CubicTo(c1, c2, p) => pb.cubic_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y),
            PathSegment::QuadTo(c, p) => pb.quad_to(c.x, c.y, p.x, p.y),
            PathSegment::Close => pb.close(),
        }
    }
    pb.finish()
}

fn paint_for(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

fn stroke_for(pen: &Pen) -> Stroke {
    let dash = if pen.is_dashed() {
        StrokeDash::new(pen.dash_array(), pen.dash_phase)
    } else {
        None
    };
    Stroke {
        width: pen.width,
        line_cap: match pen.cap {
            LineCap::Round => tiny_skia::LineCap::Round,
            LineCap::Flat => tiny_skia::LineCap::Butt,
        },
        dash,
        ..Stroke::default()
    }
}

impl DrawTarget for PixmapTarget {
    fn clear_rect(&mut self, rect: Rect) {
        let Some(r) = tiny_skia::Rect::from_xywh(rect.x, rect.y, rect.w, rect.h) else {
            return;
        };
        let mut paint = Paint::default();
        paint.blend_mode = BlendMode::Clear;
        self.pixmap.fill_rect(r, &paint, Transform::identity(), None);
    }

    fn draw_path(&mut self, path: &PathData, pen: Option<&Arc<Pen>>, brush: Option<&Arc<Brush>>) {
        let Some(path) = build_path(path) else {
            return;
        };
        if let Some(brush) = brush {
            self.pixmap.fill_path(
                &path,
                &paint_for(brush.color),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
        if let Some(pen) = pen {
            self.pixmap.stroke_path(
                &path,
                &paint_for(pen.color),
                &stroke_for(pen),
                Transform::identity(),
                None,
            );
        }
    }

    fn draw_image(&mut self, draw: &ImageDraw) {
        let src = match &draw.source {
            ImageSource::Glyph(glyph) => glyph.pixels.as_deref().and_then(pixmap_from_rgba),
            ImageSource::File(path) => match image::open(path) {
                Ok(img) => pixmap_from_rgba(&img.to_rgba8()),
                Err(error) => {
                    warn!(?error, ?path, "failed to decode bitmap");
                    None
                }
            },
        };
        if let Some(src) = src {
            self.blit(&src, draw);
        }
    }

    /// `origin.y` is the baseline. Without a font only the advance is reported.
    fn draw_text(&mut self, text: &TextDraw) -> f32 {
        let Some(font) = self.font.clone() else {
            return text.estimated_advance();
        };
        let run = font.layout(&text.text, text.height);
        let left = match text.align {
            TextAlign::Left => text.origin.x,
            TextAlign::Center => text.origin.x - run.advance / 2.0,
            TextAlign::Right => text.origin.x - run.advance,
        };
        self.blit_text(&run, left, text.origin.y, text.color);
        run.advance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_raster_path() {
        let (p, f) = resolve_raster_path(Path::new("out/x.bmp"));
        assert_eq!(p, PathBuf::from("out/x.png"));
        assert_eq!(f, RasterFormat::Png);

        let (p, f) = resolve_raster_path(Path::new("x.JPEG"));
        assert_eq!(p, PathBuf::from("x.JPEG"));
        assert_eq!(f, RasterFormat::Jpeg);

        assert_eq!(resolve_raster_path(Path::new("x.gif")).1, RasterFormat::Gif);
        assert_eq!(
            resolve_raster_path(Path::new("noext")).0,
            PathBuf::from("noext.png")
        );
    }

    #[test]
    fn test_fill_rect_path() {
        let mut target = PixmapTarget::new(20, 20).unwrap();
        let brush = Arc::new(Brush { color: Color::RED });
        target.draw_path(&PathData::rect(Rect::new(5.0, 5.0, 10.0, 10.0)), None, Some(&brush));
        assert_eq!(target.pixel(10, 10), Some(Color::RED));
        assert_eq!(target.pixel(1, 1), Some(Color::TRANSPARENT));
    }

    #[test]
    fn test_clear_rect() {
        let mut target = PixmapTarget::new(10, 10).unwrap();
        target.fill(Color::WHITE);
        target.clear_rect(Rect::new(0.0, 0.0, 5.0, 10.0));
        assert_eq!(target.pixel(2, 2), Some(Color::TRANSPARENT));
        assert_eq!(target.pixel(7, 2), Some(Color::WHITE));
    }

    #[test]
    fn test_crop_keeps_pixels_under_rect() {
        let mut target = PixmapTarget::new(20, 20).unwrap();
        let brush = Arc::new(Brush { color: Color::RED });
        target.draw_path(&PathData::rect(Rect::new(5.0, 5.0, 10.0, 10.0)), None, Some(&brush));

        let cropped = target.crop(Rect::new(3.5, 3.0, 14.0, 30.0)).unwrap();
        assert_eq!((cropped.width(), cropped.height()), (15, 17));
        assert_eq!(cropped.pixel(0, 0), Some(Color::TRANSPARENT));
        assert_eq!(cropped.pixel(7, 7), Some(Color::RED));
        assert!(target.crop(Rect::new(40.0, 40.0, 5.0, 5.0)).is_err());
    }

    #[test]
    fn test_text_writes_coverage() {
        let font = TextRasterizer::system().expect("a system font is installed");
        let mut target = PixmapTarget::new(60, 30).unwrap().with_font(Some(font));
        let advance = target.draw_text(&TextDraw {
            text: "Hi".to_string(),
            origin: vellum_core::Point::new(4.0, 22.0),
            height: 18.0,
            align: TextAlign::Left,
            color: Color::BLACK,
        });
        assert!(advance > 0.0);
        let inked = target.pixmap().pixels().iter().filter(|p| p.alpha() > 0).count();
        assert!(inked > 10, "only {inked} pixels inked");
        assert_eq!(target.pixel(59, 29), Some(Color::TRANSPARENT));
    }

    #[test]
    fn test_text_without_font_reports_estimate() {
        let mut target = PixmapTarget::new(20, 20).unwrap().with_font(None);
        let draw = TextDraw {
            text: "abcd".to_string(),
            origin: vellum_core::Point::new(0.0, 10.0),
            height: 10.0,
            align: TextAlign::Left,
            color: Color::BLACK,
        };
        assert_eq!(target.draw_text(&draw), draw.estimated_advance());
        assert!(target.pixmap().pixels().iter().all(|p| p.alpha() == 0));
    }

    #[test]
    fn test_jpeg_flattened_on_white() {
        let img = RgbaImage::from_pixel(1, 1, image::Rgba([0, 0, 0, 0]));
        assert_eq!(flatten_on_white(&img).get_pixel(0, 0).0, [255, 255, 255]);
    }
}
