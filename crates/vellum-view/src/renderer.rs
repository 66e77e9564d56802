//! Static and dynamic surfaces.
//!
//! Committed shapes paint on the static surface, in-progress shapes and
//! handles on the dynamic one layered above it. Each surface owns its own
//! [`CanvasAdapter`] so pen and brush state never leaks between them.

use tracing::trace;
use vellum_core::{CanvasDrawing, CoreEngine, LogKind, ViewId};
use vellum_surface::{CanvasAdapter, DrawTarget, ResourceLookup};

use crate::recorder::SessionRecorder;

#[derive(Debug)]
pub struct Surface {
    adapter: CanvasAdapter,
    width: u32,
    height: u32,
    dirty: bool,
    invalidations: u64,
    repaints: u64,
    alive: bool,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            adapter: CanvasAdapter::new(),
            width,
            height,
            dirty: true,
            invalidations: 0,
            repaints: 0,
            alive: true,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn invalidation_count(&self) -> u64 {
        self.invalidations
    }

    pub fn repaint_count(&self) -> u64 {
        self.repaints
    }

    pub fn invalidate(&mut self) {
        if self.alive {
            self.dirty = true;
            self.invalidations += 1;
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.invalidate();
    }

    /// Run one paint pass. `replay` feeds engine primitives into the canvas.
    pub fn paint(
        &mut self,
        target: &mut dyn DrawTarget,
        resources: &dyn ResourceLookup,
        replay: impl FnOnce(&mut dyn CanvasDrawing) -> usize,
    ) -> usize {
        if !self.alive {
            return 0;
        }
        let drawn = {
            let mut session = self.adapter.begin(target, resources);
            replay(&mut session)
        };
        self.dirty = false;
        self.repaints += 1;
        drawn
    }

    pub fn teardown(&mut self) {
        self.alive = false;
        self.dirty = false;
    }
}

/// Routes engine notices to the two surfaces and the recorder.
#[derive(Debug)]
pub struct DualSurfaceRenderer {
    static_surface: Surface,
    dynamic_surface: Surface,
}

impl DualSurfaceRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            static_surface: Surface::new(width, height),
            dynamic_surface: Surface::new(width, height),
        }
    }

    pub fn static_surface(&self) -> &Surface {
        &self.static_surface
    }

    pub fn dynamic_surface(&self) -> &Surface {
        &self.dynamic_surface
    }

    /// Committed content changed. Both surfaces are invalidated either way.
    pub fn regenerate(
        &mut self,
        engine: &mut dyn CoreEngine,
        view: ViewId,
        recorder: &mut SessionRecorder,
        changed: bool,
    ) {
        if changed {
            if !engine.is_playing() && !engine.is_undo_loading() {
                engine.submit_static_shapes(view);
                engine.submit_dynamic_shapes(view);
                if recorder.is_running(LogKind::Undo) {
                    recorder.append(engine, LogKind::Undo, true, false);
                }
            }
            if recorder.is_running(LogKind::Playback) {
                recorder.append(engine, LogKind::Playback, true, true);
            }
        }
        trace!(changed, "regenerate");
        self.invalidate_all();
    }

    /// Transient content changed. The static surface is left alone.
    pub fn redraw(
        &mut self,
        engine: &mut dyn CoreEngine,
        view: ViewId,
        recorder: &mut SessionRecorder,
        changed: bool,
    ) {
        if changed {
            engine.submit_dynamic_shapes(view);
            if recorder.is_running(LogKind::Playback) {
                recorder.append(engine, LogKind::Playback, false, true);
            }
        }
        trace!(changed, "redraw");
        self.invalidate_dynamic();
    }

    /// Mark both surfaces for repaint without calling the engine.
    pub fn invalidate_all(&mut self) {
        self.static_surface.invalidate();
        self.dynamic_surface.invalidate();
    }

    pub fn invalidate_dynamic(&mut self) {
        self.dynamic_surface.invalidate();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.static_surface.resize(width, height);
        self.dynamic_surface.resize(width, height);
    }

    pub fn paint_static(
        &mut self,
        engine: &mut dyn CoreEngine,
        view: ViewId,
        target: &mut dyn DrawTarget,
        resources: &dyn ResourceLookup,
    ) -> usize {
        self.static_surface
            .paint(target, resources, |canvas| engine.draw_all(view, canvas))
    }

    pub fn paint_dynamic(
        &mut self,
        engine: &mut dyn CoreEngine,
        view: ViewId,
        target: &mut dyn DrawTarget,
        resources: &dyn ResourceLookup,
    ) -> usize {
        self.dynamic_surface
            .paint(target, resources, |canvas| engine.draw_dynamic(view, canvas))
    }

    pub fn teardown_dynamic(&mut self) {
        self.dynamic_surface.teardown();
    }

    pub fn teardown_static(&mut self) {
        self.static_surface.teardown();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::clock::ManualClock;
    use crate::testing::MockEngine;
    use vellum_surface::{DisplayList, NoResources};

    fn recorder() -> SessionRecorder {
        SessionRecorder::new(Arc::new(ManualClock::new(0)))
    }

    #[test]
    fn test_redraw_never_touches_static_surface() {
        let (mut engine, mock) = MockEngine::new();
        let mut rec = recorder();
        let mut renderer = DualSurfaceRenderer::new(100, 100);
        let before = renderer.static_surface().invalidation_count();

        for _ in 0..5 {
            renderer.redraw(&mut engine, ViewId(1), &mut rec, true);
        }
        renderer.redraw(&mut engine, ViewId(1), &mut rec, false);

        assert_eq!(renderer.static_surface().invalidation_count(), before);
        assert_eq!(renderer.dynamic_surface().invalidation_count(), 6);
        assert_eq!(mock.borrow().static_submits, 0);
        assert_eq!(mock.borrow().dynamic_submits, 5);
    }

    #[test]
    fn test_regenerate_skips_submit_while_playing() {
        let tmp = tempfile::tempdir().unwrap();
        let (mut engine, mock) = MockEngine::new();
        let mut rec = recorder();
        rec.start(&mut engine, LogKind::Undo, &tmp.path().join("u")).unwrap();
        rec.start(&mut engine, LogKind::Playback, &tmp.path().join("p")).unwrap();
        let mut renderer = DualSurfaceRenderer::new(100, 100);

        mock.borrow_mut().playing = true;
        renderer.regenerate(&mut engine, ViewId(1), &mut rec, true);
        assert_eq!(mock.borrow().static_submits, 0);
        assert!(mock.borrow().frames_of(LogKind::Undo).is_empty());
        assert_eq!(mock.borrow().frames_of(LogKind::Playback).len(), 1);
        assert_eq!(renderer.static_surface().invalidation_count(), 1);

        mock.borrow_mut().playing = false;
        renderer.regenerate(&mut engine, ViewId(1), &mut rec, true);
        assert_eq!(mock.borrow().static_submits, 1);
        assert_eq!(mock.borrow().dynamic_submits, 1);
        let undo = mock.borrow().frames_of(LogKind::Undo);
        assert_eq!(undo.len(), 1);
        assert!(undo[0].document && !undo[0].dynamic);
    }

    #[test]
    fn test_regenerate_unchanged_only_invalidates() {
        let (mut engine, mock) = MockEngine::new();
        let mut rec = recorder();
        let mut renderer = DualSurfaceRenderer::new(10, 10);
        renderer.regenerate(&mut engine, ViewId(1), &mut rec, false);
        assert_eq!(mock.borrow().static_submits, 0);
        assert_eq!(renderer.static_surface().invalidation_count(), 1);
        assert_eq!(renderer.dynamic_surface().invalidation_count(), 1);
    }

    #[test]
    fn test_paint_clears_dirty_and_dead_surface_skips() {
        let (mut engine, mock) = MockEngine::new();
        mock
            .borrow_mut()
            .shapes
            .push(vellum_core::Rect::new(1.0, 1.0, 5.0, 5.0));
        let mut renderer = DualSurfaceRenderer::new(10, 10);
        let mut list = DisplayList::new();

        assert!(renderer.static_surface().is_dirty());
        let drawn = renderer.paint_static(&mut engine, ViewId(1), &mut list, &NoResources);
        assert_eq!(drawn, 1);
        assert!(!renderer.static_surface().is_dirty());
        assert_eq!(renderer.static_surface().repaint_count(), 1);
        assert!(!list.is_empty());

        renderer.teardown_static();
        renderer.resize(20, 20);
        assert_eq!(
            renderer.paint_static(&mut engine, ViewId(1), &mut list, &NoResources),
            0
        );
        assert!(!renderer.static_surface().is_dirty());
    }
}
