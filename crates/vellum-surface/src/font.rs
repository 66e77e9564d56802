//! Glyph coverage for raster targets.
//!
//! A [`TextRasterizer`] lays out a single line with fontdue and returns one
//! coverage mask per glyph, positioned relative to the line's top-left.

use std::path::Path;
use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result, anyhow};
use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};
use tracing::{debug, warn};

/// Grayscale coverage of one glyph.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphMask {
    /// Left edge relative to the run origin.
    pub x: i32,
    /// Top edge relative to the line top.
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub coverage: Vec<u8>,
}

/// A laid-out line of text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextRun {
    pub glyphs: Vec<GlyphMask>,
    pub advance: f32,
    /// Distance from the line top to the baseline.
    pub ascent: f32,
}

pub struct TextRasterizer {
    font: fontdue::Font,
}

impl std::fmt::Debug for TextRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextRasterizer").finish_non_exhaustive()
    }
}

impl TextRasterizer {
    pub fn from_bytes(bytes: &[u8], collection_index: u32) -> Result<Self> {
        let settings = fontdue::FontSettings {
            collection_index,
            ..fontdue::FontSettings::default()
        };
        let font = fontdue::Font::from_bytes(bytes, settings).map_err(|e| anyhow!(e))?;
        Ok(Self { font })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("failed to read font {}", path.display()))?;
        Self::from_bytes(&bytes, 0)
    }

    /// Load a sans-serif face from the installed system fonts.
    pub fn from_system_fonts() -> Result<Self> {
        use fontdb::{Database, Family, Query, Stretch, Style, Weight};

        let mut db = Database::new();
        db.load_system_fonts();

        let id = db
            .query(&Query {
                families: &[
                    Family::SansSerif,
                    Family::Name("DejaVu Sans"),
                    Family::Name("Arial"),
                    Family::Name("Segoe UI"),
                ],
                weight: Weight::NORMAL,
                stretch: Stretch::Normal,
                style: Style::Normal,
            })
            .or_else(|| db.faces().next().map(|face| face.id))
            .ok_or_else(|| anyhow!("no system font found"))?;

        db.with_face_data(id, |data, index| Self::from_bytes(data, index))
            .ok_or_else(|| anyhow!("system font data unavailable"))?
    }

    /// Process-wide system font, loaded once. `None` when no font is installed.
    pub fn system() -> Option<Arc<Self>> {
        static SYSTEM: OnceLock<Option<Arc<TextRasterizer>>> = OnceLock::new();
        SYSTEM
            .get_or_init(|| match Self::from_system_fonts() {
                Ok(font) => {
                    debug!("system font loaded for raster text");
                    Some(Arc::new(font))
                }
                Err(error) => {
                    warn!(?error, "raster text disabled");
                    None
                }
            })
            .clone()
    }

    pub fn ascent(&self, size: f32) -> f32 {
        self.font
            .horizontal_line_metrics(size.max(1.0))
            .map(|lm| lm.ascent)
            .unwrap_or(size)
    }

    pub fn layout(&self, text: &str, size: f32) -> TextRun {
        let size = size.max(1.0);
        let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings {
            x: 0.0,
            y: 0.0,
            ..LayoutSettings::default()
        });
        layout.append(&[&self.font], &TextStyle::new(text, size, 0));

        let mut run = TextRun {
            ascent: self.ascent(size),
            ..TextRun::default()
        };
        for g in layout.glyphs() {
            let advance = self
                .font
                .metrics_indexed(g.key.glyph_index, g.key.px)
                .advance_width;
            run.advance = run.advance.max(g.x + advance);
            let (metrics, coverage) = self.font.rasterize_indexed(g.key.glyph_index, g.key.px);
            if metrics.width == 0 || metrics.height == 0 {
                continue;
            }
            run.glyphs.push(GlyphMask {
                x: g.x.round() as i32,
                y: g.y.round() as i32,
                width: metrics.width as u32,
                height: metrics.height as u32,
                coverage,
            });
        }
        run
    }
}
