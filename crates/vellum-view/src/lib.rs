//! vellum-view: coordination between a document engine and a host surface.
//!
//! [`GraphView`] owns one engine view and routes host input, resize and paint
//! requests to it. Engine notices drive the dual-surface renderer, the
//! recording sessions, the context-action overlay and the host hooks.

pub mod assets;
mod clock;
mod error;
mod export;
mod gesture;
mod listener;
mod magnifier;
pub mod overlay;
mod properties;
pub mod recorder;
mod renderer;
mod sync;
mod view;

#[cfg(test)]
mod testing;

pub use assets::{AssetStore, DefaultStrings, SharedAssets, StringSource, glyph_from_file};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::ViewError;
pub use export::{ensure_parent, with_default_extension};
pub use gesture::{
    GestureCall, GestureRouter, GestureState, Modifiers, PointerButton, PointerEvent,
};
pub use listener::{ShapeClick, UiBinding, ViewListener};
pub use magnifier::Magnifier;
pub use overlay::{
    ActionCallback, ActionChain, ActionHandler, ContextOverlay, EngineActions, EventResult,
    OverlayControl, OverlayVisual,
};
pub use properties::{PropertyEdit, PropertySnapshot, display_color, display_line_width};
pub use recorder::{RecordingSession, ReplayStep, SessionIndex, SessionRecorder, replay_plan};
pub use renderer::{DualSurfaceRenderer, Surface};
pub use sync::{SyncDirection, SyncGuard, SyncState};
pub use view::GraphView;
