//! vellum-core: value types and engine contracts shared by the view layer.

mod canvas;
mod color;
mod context;
mod engine;
mod error;
mod geometry;
mod options;

pub use canvas::{CanvasDrawing, HANDLE_GLYPH_COUNT, TextAlign};
pub use color::Color;
pub use context::{ArrowHead, ContextMask, DrawContext, LineStyle};
pub use engine::{CoreEngine, EngineNotice, LogKind, RecordFrame, ViewId};
pub use error::ContextError;
pub use geometry::{Point, Rect, Size};
pub use options::{CommandOptions, OptionValue, ViewOption};
