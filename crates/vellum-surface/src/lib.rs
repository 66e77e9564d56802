//! vellum-surface: host-side drawing for engine primitive replay.
//!
//! [`CanvasAdapter`] turns the engine's `CanvasDrawing` calls into pen/brush
//! snapshots handed to a [`DrawTarget`]: a retained [`DisplayList`], a
//! [`PixmapTarget`] raster, or an [`SvgTarget`] document.

mod canvas;
pub mod display_list;
mod font;
mod pen;
mod raster;
mod svg;
mod target;

pub use canvas::{CanvasAdapter, DrawSession};
pub use display_list::DisplayList;
pub use font::{GlyphMask, TextRasterizer, TextRun};
pub use pen::{Brush, LineCap, Pen, cap_for, dash_pattern};
pub use raster::{PixmapTarget, RasterFormat, resolve_raster_path};
pub use svg::SvgTarget;
pub use target::{
    DrawTarget, Glyph, ImageDraw, ImageSource, NoResources, PathData, PathSegment, ResourceLookup,
    TextDraw,
};
