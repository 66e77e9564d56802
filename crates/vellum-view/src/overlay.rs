//! Context-action overlay: placement of action controls and click dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, trace};
use vellum_config::OverlayConfig;
use vellum_core::{CoreEngine, Point, Rect, Size, ViewId};
use vellum_surface::Glyph;

use crate::assets::SharedAssets;

/// How a control is presented.
#[derive(Debug, Clone)]
pub enum OverlayVisual {
    /// Action image from the shared assets.
    Glyph(Arc<Glyph>),
    /// Text button with a localized caption.
    Button { caption: String },
}

#[derive(Debug, Clone)]
pub struct OverlayControl {
    pub code: i32,
    pub anchor: Point,
    pub visual: OverlayVisual,
    /// Centered on `anchor`.
    pub bounds: Rect,
}

/// Caption for an action code. Codes from 40 up come from the `actions40`
/// list, the rest from `basic_actions`. Empty entries have no caption.
pub fn action_caption(assets: &SharedAssets, code: i32) -> Option<String> {
    let (list, index) = if code >= 40 {
        ("actions40", code - 40)
    } else {
        ("basic_actions", code)
    };
    let index = usize::try_from(index).ok()?;
    let table = assets.localized(list);
    table
        .split(',')
        .nth(index)
        .map(str::trim)
        .filter(|caption| !caption.is_empty())
        .map(str::to_string)
}

#[derive(Debug)]
pub struct ContextOverlay {
    config: OverlayConfig,
    controls: Vec<OverlayControl>,
}

impl ContextOverlay {
    pub fn new(config: OverlayConfig) -> Self {
        Self {
            config,
            controls: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Disabling hides the overlay and ignores later show requests.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
        if !enabled {
            self.hide();
        }
    }

    pub fn is_visible(&self) -> bool {
        !self.controls.is_empty()
    }

    pub fn controls(&self) -> &[OverlayControl] {
        &self.controls
    }

    fn button_size(&self, caption: &str) -> Size {
        let chars = caption.chars().count() as f32;
        Size::new(
            chars * self.config.char_width + self.config.button_padding,
            self.config.button_height,
        )
    }

    /// Replace the visible controls. `anchors` holds an `x, y` pair per code.
    /// Returns the number of controls shown.
    pub fn show(&mut self, actions: &[i32], anchors: &[f32], assets: &SharedAssets) -> usize {
        self.hide();
        if !self.config.enabled {
            return 0;
        }
        for (i, &code) in actions.iter().enumerate() {
            let Some(&[x, y]) = anchors.get(i * 2..i * 2 + 2) else {
                trace!(code, "context action without anchor skipped");
                continue;
            };
            let anchor = Point::new(x, y);
            let (visual, size) = if let Some(glyph) = assets.action_image(code) {
                let size = glyph.size();
                (OverlayVisual::Glyph(glyph), size)
            } else if let Some(caption) = action_caption(assets, code) {
                let size = self.button_size(&caption);
                (OverlayVisual::Button { caption }, size)
            } else {
                trace!(code, "context action without image or caption skipped");
                continue;
            };
            self.controls.push(OverlayControl {
                code,
                anchor,
                visual,
                bounds: Rect::centered(anchor, size),
            });
        }
        debug!(count = self.controls.len(), "context actions shown");
        self.controls.len()
    }

    /// Returns false when nothing was visible.
    pub fn hide(&mut self) -> bool {
        if self.controls.is_empty() {
            return false;
        }
        self.controls.clear();
        true
    }

    /// Topmost control under `point`.
    pub fn hit(&self, point: Point) -> Option<i32> {
        self.controls
            .iter()
            .rev()
            .find(|c| c.bounds.contains(point))
            .map(|c| c.code)
    }
}

/// Result of offering a click to a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    Handled,
    Ignored,
}

impl EventResult {
    pub fn is_handled(&self) -> bool {
        matches!(self, EventResult::Handled)
    }
}

pub trait ActionHandler {
    fn handle(&mut self, engine: &mut dyn CoreEngine, view: ViewId, code: i32) -> EventResult;
}

/// Offers the code to the engine's own context actions.
#[derive(Debug, Default)]
pub struct EngineActions;

impl ActionHandler for EngineActions {
    fn handle(&mut self, engine: &mut dyn CoreEngine, view: ViewId, code: i32) -> EventResult {
        if engine.do_context_action(view, code) {
            EventResult::Handled
        } else {
            EventResult::Ignored
        }
    }
}

pub type ActionCallback = Box<dyn FnMut()>;

/// Ordered dispatch: handlers in order, then caller-registered callbacks.
pub struct ActionChain {
    handlers: Vec<Box<dyn ActionHandler>>,
    callbacks: HashMap<i32, ActionCallback>,
}

impl Default for ActionChain {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionChain {
    pub fn new() -> Self {
        Self {
            handlers: vec![Box::new(EngineActions)],
            callbacks: HashMap::new(),
        }
    }

    pub fn push_handler(&mut self, handler: Box<dyn ActionHandler>) {
        self.handlers.push(handler);
    }

    /// `None` removes the callback for `code`.
    pub fn register(&mut self, code: i32, callback: Option<ActionCallback>) {
        match callback {
            Some(cb) => {
                self.callbacks.insert(code, cb);
            }
            None => {
                self.callbacks.remove(&code);
            }
        }
    }

    pub fn has_callback(&self, code: i32) -> bool {
        self.callbacks.contains_key(&code)
    }

    pub fn dispatch(&mut self, engine: &mut dyn CoreEngine, view: ViewId, code: i32) -> EventResult {
        for handler in &mut self.handlers {
            if handler.handle(engine, view, code).is_handled() {
                trace!(code, "context action handled");
                return EventResult::Handled;
            }
        }
        if let Some(cb) = self.callbacks.get_mut(&code) {
            cb();
            trace!(code, "context action handled by callback");
            return EventResult::Handled;
        }
        trace!(code, "context action ignored");
        EventResult::Ignored
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
        self.callbacks.clear();
    }
}
