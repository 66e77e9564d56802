//! In-memory engine for coordinator tests.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use vellum_core::{
    CanvasDrawing, ContextMask, CoreEngine, DrawContext, EngineNotice, LogKind, OptionValue,
    Point, Rect, RecordFrame, ViewId,
};

/// State shared between a test and the engine it handed to a view.
#[derive(Debug, Default)]
pub struct MockState {
    pub calls: Vec<String>,
    pub pending: Vec<EngineNotice>,
    pub static_submits: usize,
    pub dynamic_submits: usize,
    pub change_count: u64,
    pub command: String,
    pub last_params: String,
    pub context: DrawContext,
    pub masks: Vec<ContextMask>,
    pub editing: bool,
    pub options: BTreeMap<String, OptionValue>,
    pub recording: Vec<(LogKind, PathBuf)>,
    pub frames: Vec<(LogKind, RecordFrame)>,
    pub playing: bool,
    pub undo_loading: bool,
    /// Action codes the engine accepts.
    pub handled_actions: Vec<i32>,
    pub actions_done: Vec<i32>,
    pub content: String,
    pub selection: Vec<i32>,
    pub shapes: Vec<Rect>,
    pub drag_start: Option<Point>,
    pub dynamic_shape: Option<Rect>,
    pub size: (u32, u32),
    pub magnifiers: Vec<ViewId>,
    pub destroyed_views: Vec<ViewId>,
    /// The main view was destroyed.
    pub destroyed: bool,
    pub shut_down: bool,
}

impl MockState {
    pub fn count(&self, call: &str) -> usize {
        self.calls.iter().filter(|c| c.as_str() == call).count()
    }

    pub fn frames_of(&self, kind: LogKind) -> Vec<RecordFrame> {
        self.frames
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, f)| *f)
            .collect()
    }
}

pub struct MockEngine {
    mock: Rc<RefCell<MockState>>,
}

impl MockEngine {
    pub fn new() -> (Self, Rc<RefCell<MockState>>) {
        let mock = Rc::new(RefCell::new(MockState {
            command: "select".to_string(),
            ..MockState::default()
        }));
        (
            Self {
                mock: mock.clone(),
            },
            mock,
        )
    }

    fn log(&self, call: &str) {
        self.mock.borrow_mut().calls.push(call.to_string());
    }

    fn notify(&self, notice: EngineNotice) {
        self.mock.borrow_mut().pending.push(notice);
    }
}

fn drag_rect(a: Point, b: Point) -> Rect {
    Rect::from_ltrb(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
}

impl CoreEngine for MockEngine {
    fn create_view(&mut self, width: u32, height: u32) -> ViewId {
        self.log("create_view");
        self.mock.borrow_mut().size = (width, height);
        ViewId(1)
    }

    fn create_magnifier_view(&mut self, _main: ViewId, _width: u32, _height: u32) -> ViewId {
        self.log("create_magnifier_view");
        let mut m = self.mock.borrow_mut();
        let view = ViewId(2 + m.magnifiers.len() as u32);
        m.magnifiers.push(view);
        view
    }

    fn destroy_view(&mut self, view: ViewId) {
        self.log("destroy_view");
        let mut m = self.mock.borrow_mut();
        m.destroyed_views.push(view);
        if view == ViewId(1) {
            m.destroyed = true;
        }
    }

    fn shutdown(&mut self) {
        self.log("shutdown");
        self.mock.borrow_mut().shut_down = true;
    }

    fn on_size(&mut self, _view: ViewId, width: u32, height: u32) {
        self.log("on_size");
        self.mock.borrow_mut().size = (width, height);
    }

    fn take_notices(&mut self) -> Vec<EngineNotice> {
        std::mem::take(&mut self.mock.borrow_mut().pending)
    }

    fn submit_static_shapes(&mut self, _view: ViewId) {
        self.mock.borrow_mut().static_submits += 1;
    }

    fn submit_dynamic_shapes(&mut self, _view: ViewId) {
        self.mock.borrow_mut().dynamic_submits += 1;
    }

    fn draw_all(&mut self, _view: ViewId, canvas: &mut dyn CanvasDrawing) -> usize {
        let shapes = self.mock.borrow().shapes.clone();
        canvas.set_pen(0xff00_0000, 2.0, 0, 0.0, 0.0);
        canvas.set_brush(0xff00_00ff, 0);
        for r in &shapes {
            canvas.draw_rect(r.x, r.y, r.w, r.h, true, true);
        }
        shapes.len()
    }

    fn draw_dynamic(&mut self, _view: ViewId, canvas: &mut dyn CanvasDrawing) -> usize {
        let Some(r) = self.mock.borrow().dynamic_shape else {
            return 0;
        };
        canvas.set_pen(0xffff_0000, 1.0, 1, 0.0, 0.0);
        canvas.draw_rect(r.x, r.y, r.w, r.h, true, false);
        1
    }

    fn is_playing(&self) -> bool {
        self.mock.borrow().playing
    }

    fn is_undo_loading(&self) -> bool {
        self.mock.borrow().undo_loading
    }

    fn change_count(&self) -> u64 {
        self.mock.borrow().change_count
    }

    fn draw_count(&self) -> u64 {
        0
    }

    fn context(&self) -> DrawContext {
        self.mock.borrow().context.clone()
    }

    fn set_context(&mut self, context: &DrawContext, mask: ContextMask) {
        let mut p = self.mock.borrow_mut();
        p.context.copy_from(context, mask);
        p.masks.push(mask);
    }

    fn set_context_editing(&mut self, editing: bool) {
        self.mock.borrow_mut().editing = editing;
    }

    fn calc_pen_width(&self, _view: ViewId, line_width: f32) -> f32 {
        if line_width < 0.0 {
            -line_width
        } else {
            (line_width / 10.0).max(1.0)
        }
    }

    fn command(&self) -> String {
        self.mock.borrow().command.clone()
    }

    fn set_command(&mut self, _view: ViewId, name: &str, params: &str) -> bool {
        self.log("set_command");
        if name.is_empty() {
            return false;
        }
        {
            let mut p = self.mock.borrow_mut();
            p.command = name.to_string();
            p.last_params = params.to_string();
        }
        self.notify(EngineNotice::CommandChanged);
        true
    }

    fn switch_command(&mut self, _view: ViewId) -> bool {
        false
    }

    fn option(&self, key: &str) -> Option<OptionValue> {
        self.mock.borrow().options.get(key).cloned()
    }

    fn set_option(&mut self, key: &str, value: OptionValue) {
        self.mock.borrow_mut().options.insert(key.to_string(), value);
    }

    fn reset_options(&mut self) {
        self.mock.borrow_mut().options.clear();
    }

    fn press(&mut self, _view: ViewId, x: f32, y: f32, _ctrl: bool, _shift: bool) -> bool {
        self.log("press");
        let mut p = self.mock.borrow_mut();
        if p.command == "rect" {
            p.drag_start = Some(Point::new(x, y));
        }
        true
    }

    fn secondary_press(&mut self, _view: ViewId, _x: f32, _y: f32) -> bool {
        self.log("secondary_press");
        true
    }

    fn pointer_move(&mut self, _view: ViewId, x: f32, y: f32, _primary: bool, _secondary: bool) -> bool {
        self.log("pointer_move");
        let start = self.mock.borrow().drag_start;
        if let Some(start) = start {
            self.mock.borrow_mut().dynamic_shape = Some(drag_rect(start, Point::new(x, y)));
            self.notify(EngineNotice::Redraw { changed: true });
        }
        true
    }

    fn pointer_release(&mut self, _view: ViewId, x: f32, y: f32) -> bool {
        self.log("pointer_release");
        let start = self.mock.borrow_mut().drag_start.take();
        let Some(start) = start else {
            return true;
        };
        let rect = drag_rect(start, Point::new(x, y));
        {
            let mut p = self.mock.borrow_mut();
            p.dynamic_shape = None;
            if rect.is_empty() {
                return true;
            }
            p.shapes.push(rect);
            p.change_count += 1;
        }
        self.notify(EngineNotice::Regenerate { changed: true });
        self.notify(EngineNotice::ContentChanged);
        true
    }

    fn double_click(&mut self, _view: ViewId, _x: f32, _y: f32) -> bool {
        self.log("double_click");
        true
    }

    fn start_record(&mut self, kind: LogKind, dir: &Path) -> bool {
        self.mock
            .borrow_mut()
            .recording
            .push((kind, dir.to_path_buf()));
        true
    }

    fn stop_record(&mut self, kind: LogKind) {
        self.mock.borrow_mut().recording.retain(|(k, _)| *k != kind);
    }

    fn is_recording(&self, kind: LogKind) -> bool {
        self.mock.borrow().recording.iter().any(|(k, _)| *k == kind)
    }

    fn record_frame(&mut self, kind: LogKind, frame: &RecordFrame) -> bool {
        self.mock.borrow_mut().frames.push((kind, *frame));
        true
    }

    fn load_from_file(&mut self, path: &Path, _read_only: bool) -> bool {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                self.mock.borrow_mut().content = text;
                self.notify(EngineNotice::Regenerate { changed: true });
                true
            }
            Err(_) => false,
        }
    }

    fn save_to_file(&mut self, path: &Path) -> bool {
        std::fs::write(path, &self.mock.borrow().content).is_ok()
    }

    fn content(&self) -> String {
        self.mock.borrow().content.clone()
    }

    fn set_content(&mut self, content: &str) -> bool {
        self.mock.borrow_mut().content = content.to_string();
        self.notify(EngineNotice::Regenerate { changed: true });
        true
    }

    fn clear(&mut self) {
        {
            let mut p = self.mock.borrow_mut();
            p.shapes.clear();
            p.content.clear();
            p.change_count += 1;
        }
        self.notify(EngineNotice::Regenerate { changed: true });
    }

    fn shape_count(&self) -> usize {
        self.mock.borrow().shapes.len()
    }

    fn selected_shape_ids(&self) -> Vec<i32> {
        self.mock.borrow().selection.clone()
    }

    fn set_selected_shape_ids(&mut self, _view: ViewId, ids: &[i32]) {
        self.mock.borrow_mut().selection = ids.to_vec();
        self.notify(EngineNotice::SelectionChanged);
    }

    fn selected_shape_type(&self) -> i32 {
        0
    }

    fn do_context_action(&mut self, _view: ViewId, code: i32) -> bool {
        let mut p = self.mock.borrow_mut();
        if p.handled_actions.contains(&code) {
            p.actions_done.push(code);
            true
        } else {
            false
        }
    }

    fn display_extent(&self, _view: ViewId) -> Rect {
        let p = self.mock.borrow();
        p.shapes.iter().fold(Rect::default(), |acc, r| {
            if acc.is_empty() {
                *r
            } else {
                Rect::from_ltrb(
                    acc.x.min(r.x),
                    acc.y.min(r.y),
                    acc.right().max(r.right()),
                    acc.bottom().max(r.bottom()),
                )
            }
        })
    }

    fn bounding_box(&self, _view: ViewId, shape_id: i32) -> Rect {
        let p = self.mock.borrow();
        usize::try_from(shape_id - 1)
            .ok()
            .and_then(|i| p.shapes.get(i).copied())
            .unwrap_or_default()
    }

    fn model_box(&self, shape_id: i32) -> Rect {
        self.bounding_box(ViewId(1), shape_id)
    }

    fn display_to_model(&self, _view: ViewId, point: Point) -> Point {
        Point::new(point.x / 2.0, point.y / 2.0)
    }

    fn view_scale(&self, _view: ViewId) -> f32 {
        2.0
    }

    fn zoom_to_extent(&mut self, _view: ViewId) -> bool {
        self.notify(EngineNotice::ZoomChanged);
        true
    }

    fn zoom_to_model(&mut self, _view: ViewId, rect: Rect) -> bool {
        if rect.is_empty() {
            return false;
        }
        self.notify(EngineNotice::ZoomChanged);
        true
    }

    fn zoom_pan(&mut self, _view: ViewId, _dx: f32, _dy: f32) -> bool {
        self.notify(EngineNotice::ZoomChanged);
        true
    }

    fn undo(&mut self, _view: ViewId) -> bool {
        let popped = self.mock.borrow_mut().shapes.pop().is_some();
        if popped {
            self.notify(EngineNotice::Regenerate { changed: true });
        }
        popped
    }

    fn redo(&mut self, _view: ViewId) -> bool {
        false
    }

    fn can_undo(&self) -> bool {
        !self.mock.borrow().shapes.is_empty()
    }

    fn can_redo(&self) -> bool {
        false
    }
}
