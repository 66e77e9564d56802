//! Magnifier views.
//!
//! A magnifier is a second engine view over the main view's document, with
//! its own transform and its own pair of surfaces. It takes no input; it
//! follows the main view through the regenerate and redraw fan-out.

use tracing::trace;
use vellum_core::ViewId;

use crate::renderer::DualSurfaceRenderer;

#[derive(Debug)]
pub struct Magnifier {
    view: ViewId,
    renderer: DualSurfaceRenderer,
}

impl Magnifier {
    pub fn new(view: ViewId, width: u32, height: u32) -> Self {
        Self {
            view,
            renderer: DualSurfaceRenderer::new(width, height),
        }
    }

    pub fn view_id(&self) -> ViewId {
        self.view
    }

    pub fn renderer(&self) -> &DualSurfaceRenderer {
        &self.renderer
    }

    pub(crate) fn renderer_mut(&mut self) -> &mut DualSurfaceRenderer {
        &mut self.renderer
    }

    fn teardown(&mut self) {
        self.renderer.teardown_dynamic();
        self.renderer.teardown_static();
    }
}

/// Magnifiers attached to one main view.
#[derive(Debug, Default)]
pub(crate) struct MagnifierSet {
    views: Vec<Magnifier>,
}

impl MagnifierSet {
    pub fn add(&mut self, magnifier: Magnifier) {
        self.views.push(magnifier);
    }

    pub fn get(&self, view: ViewId) -> Option<&Magnifier> {
        self.views.iter().find(|m| m.view == view)
    }

    pub fn get_mut(&mut self, view: ViewId) -> Option<&mut Magnifier> {
        self.views.iter_mut().find(|m| m.view == view)
    }

    pub fn ids(&self) -> Vec<ViewId> {
        self.views.iter().map(|m| m.view).collect()
    }

    /// Detach `view`, with its surfaces already torn down.
    pub fn remove(&mut self, view: ViewId) -> Option<Magnifier> {
        let pos = self.views.iter().position(|m| m.view == view)?;
        let mut magnifier = self.views.remove(pos);
        magnifier.teardown();
        Some(magnifier)
    }

    /// Detach every magnifier, surfaces torn down, in creation order.
    pub fn drain(&mut self) -> Vec<Magnifier> {
        let mut all = std::mem::take(&mut self.views);
        for magnifier in &mut all {
            magnifier.teardown();
        }
        all
    }

    /// Committed content changed in the shared document.
    pub fn regenerate(&mut self) {
        for magnifier in &mut self.views {
            trace!(view = ?magnifier.view, "magnifier regenerate");
            magnifier.renderer.invalidate_all();
        }
    }

    pub fn redraw(&mut self) {
        for magnifier in &mut self.views {
            magnifier.renderer.invalidate_dynamic();
        }
    }
}
