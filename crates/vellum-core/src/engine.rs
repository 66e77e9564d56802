//! Call contract of the document engine behind a view.
//!
//! The engine owns shapes, hit-testing, serialization and undo internals.
//! The view layer reaches it only through [`CoreEngine`]. Anything the engine
//! wants to tell the view is queued as an [`EngineNotice`] and collected with
//! [`CoreEngine::take_notices`] after each call.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::canvas::CanvasDrawing;
use crate::context::{ContextMask, DrawContext};
use crate::geometry::{Point, Rect};
use crate::options::OptionValue;

/// Identifier of one engine view, returned by [`CoreEngine::create_view`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewId(pub u32);

/// Which tick-stamped log a recording call targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogKind {
    /// Undo/redo history.
    Undo,
    /// Screen-capture playback.
    Playback,
}

impl LogKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LogKind::Undo => "undo",
            LogKind::Playback => "playback",
        }
    }
}

/// One frame offered to a log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFrame {
    /// Milliseconds since the session started.
    pub tick: u64,
    /// Engine change counter, never decreasing within a session.
    pub change_count: u64,
    /// Carries a full document snapshot.
    pub document: bool,
    /// Carries the transient (in-progress) shapes.
    pub dynamic: bool,
}

/// Engine-originated event, delivered in order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EngineNotice {
    /// Committed content changed (or needs a repaint when `changed` is false).
    Regenerate { changed: bool },
    /// A shape was appended; treated as a full regenerate.
    RegenerateAppend { shape_id: i32 },
    /// Transient content changed.
    Redraw { changed: bool },
    CommandChanged,
    SelectionChanged,
    ContentChanged,
    DynamicChanged,
    ZoomChanged,
    /// Action codes with interleaved `x, y` anchors, two floats per code.
    ShowContextActions { actions: Vec<i32>, anchors: Vec<f32> },
    HideContextActions,
    ShapeClicked { shape_id: i32, tag: i32, x: f32, y: f32 },
    ShapeDoubleClicked { shape_id: i32, tag: i32 },
    /// User-facing text; a leading `@` names a localized string.
    Message(String),
}

/// Synchronous engine contract. All methods run to completion on the UI thread.
pub trait CoreEngine {
    // Lifecycle
    fn create_view(&mut self, width: u32, height: u32) -> ViewId;
    /// Extra view over `main`'s document with its own transform. Destroyed
    /// with [`CoreEngine::destroy_view`].
    fn create_magnifier_view(&mut self, main: ViewId, width: u32, height: u32) -> ViewId;
    fn destroy_view(&mut self, view: ViewId);
    fn shutdown(&mut self);
    fn on_size(&mut self, view: ViewId, width: u32, height: u32);
    fn take_notices(&mut self) -> Vec<EngineNotice>;

    // Rendering
    fn submit_static_shapes(&mut self, view: ViewId);
    fn submit_dynamic_shapes(&mut self, view: ViewId);
    /// Replay committed content. Returns the number of shapes drawn.
    fn draw_all(&mut self, view: ViewId, canvas: &mut dyn CanvasDrawing) -> usize;
    /// Replay transient content. Returns the number of shapes drawn.
    fn draw_dynamic(&mut self, view: ViewId, canvas: &mut dyn CanvasDrawing) -> usize;
    fn is_playing(&self) -> bool;
    fn is_undo_loading(&self) -> bool;
    fn change_count(&self) -> u64;
    fn draw_count(&self) -> u64;

    // Drawing context
    fn context(&self) -> DrawContext;
    fn set_context(&mut self, context: &DrawContext, mask: ContextMask);
    fn set_context_editing(&mut self, editing: bool);
    /// Pixel width of a stored line width at the view's current zoom.
    fn calc_pen_width(&self, view: ViewId, line_width: f32) -> f32;

    // Commands and options
    fn command(&self) -> String;
    /// `params` is a JSON object string or empty.
    fn set_command(&mut self, view: ViewId, name: &str, params: &str) -> bool;
    fn switch_command(&mut self, view: ViewId) -> bool;
    fn option(&self, key: &str) -> Option<OptionValue>;
    fn set_option(&mut self, key: &str, value: OptionValue);
    fn reset_options(&mut self);

    // Gestures
    fn press(&mut self, view: ViewId, x: f32, y: f32, ctrl: bool, shift: bool) -> bool;
    fn secondary_press(&mut self, view: ViewId, x: f32, y: f32) -> bool;
    fn pointer_move(&mut self, view: ViewId, x: f32, y: f32, primary: bool, secondary: bool) -> bool;
    fn pointer_release(&mut self, view: ViewId, x: f32, y: f32) -> bool;
    fn double_click(&mut self, view: ViewId, x: f32, y: f32) -> bool;

    // Recording
    fn start_record(&mut self, kind: LogKind, dir: &Path) -> bool;
    fn stop_record(&mut self, kind: LogKind);
    fn is_recording(&self, kind: LogKind) -> bool;
    fn record_frame(&mut self, kind: LogKind, frame: &RecordFrame) -> bool;

    // Documents
    fn load_from_file(&mut self, path: &Path, read_only: bool) -> bool;
    fn save_to_file(&mut self, path: &Path) -> bool;
    fn content(&self) -> String;
    fn set_content(&mut self, content: &str) -> bool;
    fn clear(&mut self);

    // Selection and actions
    fn shape_count(&self) -> usize;
    fn selected_shape_ids(&self) -> Vec<i32>;
    fn set_selected_shape_ids(&mut self, view: ViewId, ids: &[i32]);
    fn selected_shape_type(&self) -> i32;
    /// Returns false when the engine does not handle `code`.
    fn do_context_action(&mut self, view: ViewId, code: i32) -> bool;

    // Geometry queries
    fn display_extent(&self, view: ViewId) -> Rect;
    /// Display bounds of `shape_id`, or of the selection when `shape_id` is 0.
    fn bounding_box(&self, view: ViewId, shape_id: i32) -> Rect;
    fn model_box(&self, shape_id: i32) -> Rect;
    fn display_to_model(&self, view: ViewId, point: Point) -> Point;
    fn view_scale(&self, view: ViewId) -> f32;

    // Zoom
    fn zoom_to_extent(&mut self, view: ViewId) -> bool;
    fn zoom_to_model(&mut self, view: ViewId, rect: Rect) -> bool;
    fn zoom_pan(&mut self, view: ViewId, dx: f32, dy: f32) -> bool;

    // History
    fn undo(&mut self, view: ViewId) -> bool;
    fn redo(&mut self, view: ViewId) -> bool;
    fn can_undo(&self) -> bool;
    fn can_redo(&self) -> bool;
}
