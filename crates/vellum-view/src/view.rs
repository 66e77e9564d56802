//! `GraphView`: one engine view bound to a host drawing surface.
//!
//! The host forwards pointer events, resize and paint requests. The view
//! turns them into engine calls, drains the engine's notices after every
//! call and routes them to the renderer, the recorder, the overlay and the
//! host hooks.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, trace, warn};
use vellum_config::VellumConfig;
use vellum_core::{
    ArrowHead, Color, CommandOptions, CoreEngine, EngineNotice, LineStyle, LogKind, OptionValue,
    Point, Rect, ViewId, ViewOption,
};
use vellum_surface::DrawTarget;

use crate::assets::SharedAssets;
use crate::clock::{Clock, SystemClock};
use crate::export;
use crate::gesture::{GestureCall, GestureRouter, GestureState, PointerButton, PointerEvent};
use crate::listener::{ShapeClick, UiBinding, ViewListener};
use crate::magnifier::{Magnifier, MagnifierSet};
use crate::overlay::{ActionCallback, ActionChain, ActionHandler, ContextOverlay, OverlayControl};
use crate::properties::{PropertyEdit, PropertySnapshot, display_color, display_line_width};
use crate::recorder::SessionRecorder;
use crate::renderer::DualSurfaceRenderer;
use crate::sync::{SyncDirection, SyncState};

/// Notice batches drained per engine call before giving up.
const MAX_NOTICE_ROUNDS: usize = 64;

pub struct GraphView {
    engine: Option<Box<dyn CoreEngine>>,
    view: ViewId,
    size: (u32, u32),
    renderer: DualSurfaceRenderer,
    magnifiers: MagnifierSet,
    router: GestureRouter,
    /// The overlay took the last press; its release is swallowed.
    overlay_press: bool,
    sync: SyncState,
    overlay: ContextOverlay,
    actions: ActionChain,
    recorder: SessionRecorder,
    assets: Arc<SharedAssets>,
    listener: Option<Box<dyn ViewListener>>,
    binding: Option<Box<dyn UiBinding>>,
    config: VellumConfig,
    disposed: bool,
}

impl GraphView {
    pub fn new(engine: Box<dyn CoreEngine>, width: u32, height: u32, assets: Arc<SharedAssets>) -> Self {
        Self::with_config(
            engine,
            width,
            height,
            assets,
            VellumConfig::default(),
            Arc::new(SystemClock::new()),
        )
    }

    pub fn with_config(
        mut engine: Box<dyn CoreEngine>,
        width: u32,
        height: u32,
        assets: Arc<SharedAssets>,
        config: VellumConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        assets.attach();
        let view = engine.create_view(width, height);
        engine.on_size(view, width, height);
        let mut this = Self {
            engine: Some(engine),
            view,
            size: (width, height),
            renderer: DualSurfaceRenderer::new(width, height),
            magnifiers: MagnifierSet::default(),
            router: GestureRouter::new(width as f32, height as f32, config.input.double_click_ms),
            overlay_press: false,
            sync: SyncState::new(),
            overlay: ContextOverlay::new(config.overlay.clone()),
            actions: ActionChain::new(),
            recorder: SessionRecorder::new(clock),
            assets,
            listener: None,
            binding: None,
            config,
            disposed: false,
        };
        this.process_notices();
        debug!(?view, width, height, "graph view created");
        this
    }

    fn engine_ref(&self) -> &dyn CoreEngine {
        match self.engine.as_deref() {
            Some(engine) => engine,
            None => panic!("GraphView property read after dispose"),
        }
    }

    pub fn view_id(&self) -> ViewId {
        self.view
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn config(&self) -> &VellumConfig {
        &self.config
    }

    pub fn assets(&self) -> &Arc<SharedAssets> {
        &self.assets
    }

    pub fn renderer(&self) -> &DualSurfaceRenderer {
        &self.renderer
    }

    pub fn recorder(&self) -> &SessionRecorder {
        &self.recorder
    }

    pub fn gesture_state(&self) -> GestureState {
        self.router.state()
    }

    pub fn sync_direction(&self) -> SyncDirection {
        self.sync.direction()
    }

    pub fn set_listener(&mut self, listener: Option<Box<dyn ViewListener>>) {
        self.listener = listener;
    }

    pub fn set_binding(&mut self, binding: Option<Box<dyn UiBinding>>) {
        self.binding = binding;
    }

    // ---- notices ----

    fn process_notices(&mut self) {
        for _ in 0..MAX_NOTICE_ROUNDS {
            let Some(engine) = self.engine.as_deref_mut() else {
                return;
            };
            let notices = engine.take_notices();
            if notices.is_empty() {
                return;
            }
            for notice in notices {
                self.handle_notice(notice);
            }
        }
        warn!(rounds = MAX_NOTICE_ROUNDS, "engine notices did not settle");
    }

    fn handle_notice(&mut self, notice: EngineNotice) {
        let view = self.view;
        let Some(engine) = self.engine.as_deref_mut() else {
            return;
        };
        match notice {
            EngineNotice::Regenerate { changed } => {
                self.renderer
                    .regenerate(engine, view, &mut self.recorder, changed);
                self.magnifiers.regenerate();
            }
            EngineNotice::RegenerateAppend { shape_id } => {
                trace!(shape_id, "shape appended");
                self.renderer
                    .regenerate(engine, view, &mut self.recorder, true);
                self.magnifiers.regenerate();
            }
            EngineNotice::Redraw { changed } => {
                self.renderer.redraw(engine, view, &mut self.recorder, changed);
                self.magnifiers.redraw();
            }
            EngineNotice::CommandChanged => self.sync_command_to_ui(),
            EngineNotice::SelectionChanged => {
                self.push_properties();
                if let Some(listener) = self.listener.as_mut() {
                    listener.selection_changed();
                }
            }
            EngineNotice::ContentChanged => {
                if let Some(listener) = self.listener.as_mut() {
                    listener.content_changed();
                }
            }
            EngineNotice::DynamicChanged => {
                if let Some(listener) = self.listener.as_mut() {
                    listener.dynamic_changed();
                }
            }
            EngineNotice::ZoomChanged => {
                if let Some(listener) = self.listener.as_mut() {
                    listener.zoom_changed();
                }
            }
            EngineNotice::ShowContextActions { actions, anchors } => {
                self.overlay.show(&actions, &anchors, &self.assets);
            }
            EngineNotice::HideContextActions => {
                self.overlay.hide();
            }
            EngineNotice::ShapeClicked { shape_id, tag, x, y } => {
                if let Some(listener) = self.listener.as_mut() {
                    listener.shape_clicked(&ShapeClick { shape_id, tag, x, y });
                }
            }
            EngineNotice::ShapeDoubleClicked { shape_id, tag } => {
                if let Some(listener) = self.listener.as_mut() {
                    listener.shape_double_clicked(shape_id, tag);
                }
            }
            EngineNotice::Message(text) => {
                let text = self.localize(&text);
                if let Some(listener) = self.listener.as_mut() {
                    listener.show_message(&text);
                }
            }
        }
    }

    /// `@name` resolves through the shared string table.
    pub fn localize(&self, text: &str) -> String {
        match text.strip_prefix('@') {
            Some(name) => self.assets.localized(name),
            None => text.to_string(),
        }
    }

    // ---- command and property synchronization ----

    /// Mirror the engine command into the UI selector, then refresh properties.
    fn sync_command_to_ui(&mut self) {
        let Some(engine) = self.engine.as_deref() else {
            return;
        };
        let command = engine.command();
        {
            let _guard = self.sync.enter(SyncDirection::EngineToUi);
            if let Some(binding) = self.binding.as_mut()
                && binding.selected_command().as_deref() != Some(command.as_str())
            {
                binding.select_command(&command);
            }
        }
        self.push_properties();
        if let Some(listener) = self.listener.as_mut() {
            listener.command_changed(&command);
        }
    }

    fn push_properties(&mut self) {
        let Some(engine) = self.engine.as_deref() else {
            return;
        };
        let Some(binding) = self.binding.as_mut() else {
            return;
        };
        let snapshot = PropertySnapshot::read(engine, self.view);
        let _guard = self.sync.enter(SyncDirection::EngineToUi);
        binding.show_properties(&snapshot);
    }

    /// Engine command name.
    ///
    /// # Panics
    /// After [`GraphView::dispose`].
    pub fn command(&self) -> String {
        self.engine_ref().command()
    }

    /// False after dispose.
    pub fn is_command(&self, name: &str) -> bool {
        self.engine.as_deref().is_some_and(|e| e.command() == name)
    }

    pub fn set_command(&mut self, name: &str) -> bool {
        self.set_command_with(name, &CommandOptions::new())
    }

    /// Start command `name` with typed options.
    pub fn set_command_with(&mut self, name: &str, options: &CommandOptions) -> bool {
        let view = self.view;
        let Some(engine) = self.engine.as_deref_mut() else {
            return false;
        };
        let params = options.to_json_string();
        let ok = engine.set_command(view, name, &params);
        if !ok {
            warn!(command = name, "engine rejected command");
        }
        self.process_notices();
        ok
    }

    /// Toggle back to the previous command.
    pub fn switch_command(&mut self) -> bool {
        self.engine_action(|e, v| e.switch_command(v))
    }

    /// The UI selector changed. Ignored while any sync pass is running.
    /// Afterwards the selector shows the engine command even when the
    /// engine refused the change.
    pub fn ui_select_command(&mut self, name: &str) -> bool {
        if self.engine.is_none() || !self.sync.is_idle() {
            trace!(command = name, "ui command change suppressed");
            return false;
        }
        let ok = {
            let _guard = self.sync.enter(SyncDirection::UiToEngine);
            self.set_command(name)
        };
        let command = self.engine_ref().command();
        if let Some(binding) = self.binding.as_mut()
            && binding.selected_command().as_deref() != Some(command.as_str())
        {
            let _guard = self.sync.enter(SyncDirection::EngineToUi);
            binding.select_command(&command);
        }
        ok
    }

    /// A property control changed. Ignored while any sync pass is running.
    pub fn ui_set_property(&mut self, edit: PropertyEdit) -> bool {
        if self.engine.is_none() || !self.sync.is_idle() {
            trace!(?edit, "ui property change suppressed");
            return false;
        }
        let _guard = self.sync.enter(SyncDirection::UiToEngine);
        self.set_property(edit)
    }

    /// Commit one property change. Out-of-range values return false.
    pub fn set_property(&mut self, edit: PropertyEdit) -> bool {
        let Some(engine) = self.engine.as_deref_mut() else {
            return false;
        };
        match edit.commit(engine) {
            Ok(mask) => {
                trace!(?edit, mask = mask.bits(), "property committed");
                self.process_notices();
                true
            }
            Err(error) => {
                warn!(%error, "property rejected");
                false
            }
        }
    }

    /// Start or end a batch of property edits (e.g. while a slider drags).
    pub fn set_context_editing(&mut self, editing: bool) {
        if let Some(engine) = self.engine.as_deref_mut() {
            engine.set_context_editing(editing);
        }
    }

    /// # Panics
    /// Every property getter panics after [`GraphView::dispose`].
    pub fn properties(&self) -> PropertySnapshot {
        PropertySnapshot::read(self.engine_ref(), self.view)
    }

    pub fn line_width(&self) -> f32 {
        display_line_width(self.engine_ref().context().line_width)
    }

    pub fn stroke_width(&self) -> f32 {
        let engine = self.engine_ref();
        engine.calc_pen_width(self.view, engine.context().line_width)
    }

    pub fn line_color(&self) -> Color {
        display_color(self.engine_ref().context().line_color)
    }

    pub fn line_alpha(&self) -> u8 {
        self.engine_ref().context().line_color.a
    }

    pub fn fill_color(&self) -> Color {
        display_color(self.engine_ref().context().fill_color)
    }

    pub fn fill_alpha(&self) -> u8 {
        self.engine_ref().context().fill_color.a
    }

    pub fn line_style(&self) -> LineStyle {
        self.engine_ref().context().line_style
    }

    pub fn start_arrow(&self) -> ArrowHead {
        self.engine_ref().context().start_arrow
    }

    pub fn end_arrow(&self) -> ArrowHead {
        self.engine_ref().context().end_arrow
    }

    // ---- options ----

    pub fn option(&self, option: &ViewOption) -> Option<OptionValue> {
        self.engine_ref().option(option.key())
    }

    /// Known options reject values of the wrong kind.
    pub fn set_option(&mut self, option: ViewOption, value: impl Into<OptionValue>) -> bool {
        let value = value.into();
        if let Err(error) = option.check(&value) {
            warn!(%error, "option rejected");
            return false;
        }
        let Some(engine) = self.engine.as_deref_mut() else {
            return false;
        };
        engine.set_option(option.key(), value);
        true
    }

    pub fn reset_options(&mut self) {
        if let Some(engine) = self.engine.as_deref_mut() {
            engine.reset_options();
        }
    }

    // ---- input ----

    /// Pointer pressed on the dynamic surface. A press on an overlay control
    /// is consumed by the overlay.
    pub fn pointer_down(&mut self, ev: &PointerEvent) -> bool {
        if self.engine.is_none() {
            return false;
        }
        if let Some(code) = self.overlay.hit(Point::new(ev.x, ev.y)) {
            trace!(code, "press consumed by overlay");
            self.overlay_press = true;
            return ev.button == PointerButton::Primary && self.click_overlay(code);
        }
        match self.router.pointer_down(ev) {
            Some(call) => self.forward(call),
            None => false,
        }
    }

    pub fn pointer_move(&mut self, ev: &PointerEvent) -> bool {
        if self.engine.is_none() {
            return false;
        }
        match self.router.pointer_move(ev) {
            Some(call) => self.forward(call),
            None => false,
        }
    }

    pub fn pointer_up(&mut self, ev: &PointerEvent) -> bool {
        if self.engine.is_none() {
            return false;
        }
        if std::mem::take(&mut self.overlay_press) {
            trace!("release after overlay press dropped");
            return false;
        }
        let mut handled = false;
        for call in self.router.pointer_up(ev) {
            handled |= self.forward(call);
        }
        handled
    }

    pub fn gestures_enabled(&self) -> bool {
        self.router.gestures_enabled()
    }

    /// Disabled gestures reach neither the engine nor the double-click
    /// timer. Overlay controls stay clickable.
    pub fn set_gestures_enabled(&mut self, enabled: bool) {
        debug!(enabled, "gestures toggled");
        self.router.set_gestures_enabled(enabled);
    }

    pub fn zoom_enabled(&self) -> bool {
        self.router.zoom_enabled()
    }

    /// Disabled zoom refuses `zoom_to_extent`, `zoom_to_model` and `zoom_pan`.
    pub fn set_zoom_enabled(&mut self, enabled: bool) {
        debug!(enabled, "zoom toggled");
        self.router.set_zoom_enabled(enabled);
    }

    fn forward(&mut self, call: GestureCall) -> bool {
        let view = self.view;
        let Some(engine) = self.engine.as_deref_mut() else {
            return false;
        };
        trace!(?call, "gesture");
        let handled = match call {
            GestureCall::Press { x, y, ctrl, shift } => engine.press(view, x, y, ctrl, shift),
            GestureCall::SecondaryPress { x, y } => engine.secondary_press(view, x, y),
            GestureCall::Move {
                x,
                y,
                primary,
                secondary,
            } => engine.pointer_move(view, x, y, primary, secondary),
            GestureCall::Release { x, y } => engine.pointer_release(view, x, y),
            GestureCall::DoubleClick { x, y } => engine.double_click(view, x, y),
        };
        self.process_notices();
        handled
    }

    // ---- context actions ----

    pub fn overlay_controls(&self) -> &[OverlayControl] {
        self.overlay.controls()
    }

    /// Hide the overlay and dispatch `code` through the handler chain.
    pub fn click_overlay(&mut self, code: i32) -> bool {
        let view = self.view;
        let Some(engine) = self.engine.as_deref_mut() else {
            return false;
        };
        self.overlay.hide();
        let result = self.actions.dispatch(engine, view, code);
        self.process_notices();
        result.is_handled()
    }

    pub fn set_context_actions_enabled(&mut self, enabled: bool) {
        self.overlay.set_enabled(enabled);
    }

    /// `None` removes the callback for `code`.
    pub fn register_action_callback(&mut self, code: i32, callback: Option<ActionCallback>) {
        self.actions.register(code, callback);
    }

    /// Appended after the engine and before the callback registry.
    pub fn push_action_handler(&mut self, handler: Box<dyn ActionHandler>) {
        self.actions.push_handler(handler);
    }

    // ---- surfaces ----

    pub fn resize(&mut self, width: u32, height: u32) {
        let view = self.view;
        let Some(engine) = self.engine.as_deref_mut() else {
            return;
        };
        self.size = (width, height);
        self.renderer.resize(width, height);
        self.router.resize(width as f32, height as f32);
        engine.on_size(view, width, height);
        self.overlay.hide();
        self.process_notices();
    }

    /// Replay committed content into `target`. Returns the shapes drawn.
    pub fn paint_static(&mut self, target: &mut dyn DrawTarget) -> usize {
        let view = self.view;
        let Some(engine) = self.engine.as_deref_mut() else {
            return 0;
        };
        self.renderer
            .paint_static(engine, view, target, &*self.assets)
    }

    /// Replay transient content into `target`. Returns the shapes drawn.
    pub fn paint_dynamic(&mut self, target: &mut dyn DrawTarget) -> usize {
        let view = self.view;
        let Some(engine) = self.engine.as_deref_mut() else {
            return 0;
        };
        self.renderer
            .paint_dynamic(engine, view, target, &*self.assets)
    }

    // ---- recording ----

    pub fn start_record(&mut self, kind: LogKind, dir: &Path) -> bool {
        let Some(engine) = self.engine.as_deref_mut() else {
            return false;
        };
        match self.recorder.start(engine, kind, dir) {
            Ok(()) => true,
            Err(error) => {
                warn!(%error, kind = ?kind, ?dir, "failed to start recording");
                false
            }
        }
    }

    /// Start a session in the configured directory for `kind`.
    pub fn start_record_default(&mut self, kind: LogKind) -> bool {
        let dir = match kind {
            LogKind::Undo => self.config.recording.undo_dir.clone(),
            LogKind::Playback => self.config.recording.playback_dir.clone(),
        };
        self.start_record(kind, &dir)
    }

    pub fn stop_record(&mut self, kind: LogKind) -> bool {
        let Some(engine) = self.engine.as_deref_mut() else {
            return false;
        };
        match self.recorder.stop(engine, kind) {
            Ok(_) => true,
            Err(error) => {
                warn!(%error, "failed to stop recording");
                false
            }
        }
    }

    pub fn is_recording(&self, kind: LogKind) -> bool {
        self.recorder.is_running(kind)
    }

    // ---- documents ----

    pub fn load(&mut self, path: &Path, read_only: bool) -> bool {
        let Some(engine) = self.engine.as_deref_mut() else {
            return false;
        };
        let ok = engine.load_from_file(path, read_only);
        if !ok {
            warn!(?path, "failed to load document");
        }
        self.process_notices();
        ok
    }

    /// Creates the parent directory first.
    pub fn save(&mut self, path: &Path) -> bool {
        let Some(engine) = self.engine.as_deref_mut() else {
            return false;
        };
        if let Err(error) = export::ensure_parent(path) {
            warn!(?error, ?path, "failed to prepare save location");
            return false;
        }
        let ok = engine.save_to_file(path);
        if !ok {
            warn!(?path, "failed to save document");
        }
        ok
    }

    /// # Panics
    /// After [`GraphView::dispose`].
    pub fn content(&self) -> String {
        self.engine_ref().content()
    }

    pub fn set_content(&mut self, content: &str) -> bool {
        let Some(engine) = self.engine.as_deref_mut() else {
            return false;
        };
        let ok = engine.set_content(content);
        self.process_notices();
        ok
    }

    pub fn clear(&mut self) -> bool {
        let Some(engine) = self.engine.as_deref_mut() else {
            return false;
        };
        engine.clear();
        self.process_notices();
        true
    }

    // ---- selection and queries ----

    pub fn shape_count(&self) -> usize {
        self.engine_ref().shape_count()
    }

    pub fn change_count(&self) -> u64 {
        self.engine_ref().change_count()
    }

    pub fn draw_count(&self) -> u64 {
        self.engine_ref().draw_count()
    }

    pub fn selected_shape_ids(&self) -> Vec<i32> {
        self.engine_ref().selected_shape_ids()
    }

    pub fn selected_shape_type(&self) -> i32 {
        self.engine_ref().selected_shape_type()
    }

    pub fn set_selected_shape_ids(&mut self, ids: &[i32]) -> bool {
        let view = self.view;
        let Some(engine) = self.engine.as_deref_mut() else {
            return false;
        };
        engine.set_selected_shape_ids(view, ids);
        self.process_notices();
        true
    }

    pub fn display_extent(&self) -> Rect {
        self.engine_ref().display_extent(self.view)
    }

    /// Bounds of `shape_id`, or of the selection when it is 0.
    pub fn bounding_box(&self, shape_id: i32) -> Rect {
        self.engine_ref().bounding_box(self.view, shape_id)
    }

    pub fn model_box(&self, shape_id: i32) -> Rect {
        self.engine_ref().model_box(shape_id)
    }

    pub fn display_to_model(&self, point: Point) -> Point {
        self.engine_ref().display_to_model(self.view, point)
    }

    pub fn view_scale(&self) -> f32 {
        self.engine_ref().view_scale(self.view)
    }

    // ---- zoom and history ----

    fn engine_action(&mut self, f: impl FnOnce(&mut dyn CoreEngine, ViewId) -> bool) -> bool {
        let view = self.view;
        let Some(engine) = self.engine.as_deref_mut() else {
            return false;
        };
        let ok = f(engine, view);
        self.process_notices();
        ok
    }

    fn zoom_action(&mut self, f: impl FnOnce(&mut dyn CoreEngine, ViewId) -> bool) -> bool {
        if !self.router.zoom_enabled() {
            trace!("zoom refused, zoom disabled");
            return false;
        }
        self.engine_action(f)
    }

    pub fn zoom_to_extent(&mut self) -> bool {
        self.zoom_action(|e, v| e.zoom_to_extent(v))
    }

    pub fn zoom_to_model(&mut self, rect: Rect) -> bool {
        self.zoom_action(|e, v| e.zoom_to_model(v, rect))
    }

    pub fn zoom_pan(&mut self, dx: f32, dy: f32) -> bool {
        self.zoom_action(|e, v| e.zoom_pan(v, dx, dy))
    }

    pub fn undo(&mut self) -> bool {
        self.engine_action(|e, v| e.undo(v))
    }

    pub fn redo(&mut self) -> bool {
        self.engine_action(|e, v| e.redo(v))
    }

    pub fn can_undo(&self) -> bool {
        self.engine_ref().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.engine_ref().can_redo()
    }

    // ---- export ----

    /// Render committed content to an SVG file.
    pub fn export_svg(&mut self, path: &Path) -> bool {
        let view = self.view;
        let size = self.size;
        let Some(engine) = self.engine.as_deref_mut() else {
            return false;
        };
        match export::export_svg(engine, view, size, path, &*self.assets) {
            Ok(_) => true,
            Err(error) => {
                warn!(?error, ?path, "svg export failed");
                false
            }
        }
    }

    /// Rasterize committed content at the surface size. Returns the path
    /// written, which has a `.png` extension when the requested one is not
    /// a supported raster format.
    pub fn export_png(&mut self, path: &Path) -> Option<PathBuf> {
        let view = self.view;
        let size = self.size;
        let path = export::with_default_extension(path, &self.config.export.default_extension);
        let engine = self.engine.as_deref_mut()?;
        match export::export_raster(engine, view, size, &path, &*self.assets) {
            Ok(written) => Some(written),
            Err(error) => {
                warn!(?error, ?path, "raster export failed");
                None
            }
        }
    }

    /// Rasterize only the drawn extent plus `spacing` pixels on each side,
    /// clipped to the surface, on a transparent background. `None` when
    /// nothing is visible.
    pub fn export_extent_png(&mut self, path: &Path, spacing: f32) -> Option<PathBuf> {
        let view = self.view;
        let size = self.size;
        let path = export::with_default_extension(path, &self.config.export.default_extension);
        let engine = self.engine.as_deref_mut()?;
        match export::export_extent_raster(engine, view, size, spacing, &path, &*self.assets) {
            Ok(written) => Some(written),
            Err(error) => {
                warn!(?error, ?path, "extent export failed");
                None
            }
        }
    }

    // ---- magnifiers ----

    /// Open a magnifier over this view's document. Returns its engine view.
    pub fn create_magnifier(&mut self, width: u32, height: u32) -> Option<ViewId> {
        let main = self.view;
        let engine = self.engine.as_deref_mut()?;
        let view = engine.create_magnifier_view(main, width, height);
        engine.on_size(view, width, height);
        self.magnifiers.add(Magnifier::new(view, width, height));
        debug!(?view, width, height, "magnifier created");
        self.process_notices();
        Some(view)
    }

    pub fn magnifier(&self, view: ViewId) -> Option<&Magnifier> {
        self.magnifiers.get(view)
    }

    pub fn magnifier_ids(&self) -> Vec<ViewId> {
        self.magnifiers.ids()
    }

    pub fn resize_magnifier(&mut self, view: ViewId, width: u32, height: u32) -> bool {
        let Some(engine) = self.engine.as_deref_mut() else {
            return false;
        };
        let Some(magnifier) = self.magnifiers.get_mut(view) else {
            return false;
        };
        magnifier.renderer_mut().resize(width, height);
        engine.on_size(view, width, height);
        self.process_notices();
        true
    }

    pub fn paint_magnifier_static(&mut self, view: ViewId, target: &mut dyn DrawTarget) -> usize {
        let (Some(engine), Some(magnifier)) =
            (self.engine.as_deref_mut(), self.magnifiers.get_mut(view))
        else {
            return 0;
        };
        magnifier
            .renderer_mut()
            .paint_static(engine, view, target, &*self.assets)
    }

    pub fn paint_magnifier_dynamic(&mut self, view: ViewId, target: &mut dyn DrawTarget) -> usize {
        let (Some(engine), Some(magnifier)) =
            (self.engine.as_deref_mut(), self.magnifiers.get_mut(view))
        else {
            return 0;
        };
        magnifier
            .renderer_mut()
            .paint_dynamic(engine, view, target, &*self.assets)
    }

    /// Tear down the magnifier's surfaces, then its engine view.
    pub fn destroy_magnifier(&mut self, view: ViewId) -> bool {
        let Some(engine) = self.engine.as_deref_mut() else {
            return false;
        };
        if self.magnifiers.remove(view).is_none() {
            return false;
        }
        engine.destroy_view(view);
        debug!(?view, "magnifier destroyed");
        true
    }

    // ---- lifecycle ----

    /// Tear down in order: dynamic surface, static surface, magnifiers,
    /// engine view, host hooks and action handlers, engine, shared assets.
    /// A second call returns false.
    pub fn dispose(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        self.disposed = true;
        self.overlay.hide();
        self.router.reset();
        self.overlay_press = false;
        self.renderer.teardown_dynamic();
        self.renderer.teardown_static();
        let magnifiers = self.magnifiers.drain();
        if let Some(mut engine) = self.engine.take() {
            self.recorder.stop_all(&mut *engine);
            for magnifier in &magnifiers {
                engine.destroy_view(magnifier.view_id());
            }
            engine.destroy_view(self.view);
            self.listener = None;
            self.binding = None;
            self.actions.clear();
            engine.shutdown();
        }
        let released = self.assets.detach();
        debug!(view = ?self.view, released, "graph view disposed");
        true
    }
}

impl Drop for GraphView {
    fn drop(&mut self) {
        self.dispose();
    }
}
