//! Sync direction token for two-way UI/engine binding.
//!
//! A pass in one direction holds a [`SyncGuard`]; UI-originated setters are
//! dropped while any pass is in progress. The guard restores the previous
//! direction when it goes out of scope, including on early return.

use std::cell::Cell;
use std::rc::Rc;

use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncDirection {
    #[default]
    Idle,
    UiToEngine,
    EngineToUi,
}

#[derive(Debug, Clone, Default)]
pub struct SyncState {
    direction: Rc<Cell<SyncDirection>>,
}

impl SyncState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn direction(&self) -> SyncDirection {
        self.direction.get()
    }

    pub fn is_idle(&self) -> bool {
        self.direction.get() == SyncDirection::Idle
    }

    pub fn enter(&self, direction: SyncDirection) -> SyncGuard {
        let previous = self.direction.replace(direction);
        trace!(?previous, ?direction, "sync pass");
        SyncGuard {
            direction: self.direction.clone(),
            previous,
        }
    }
}

#[must_use = "the pass ends when the guard is dropped"]
#[derive(Debug)]
pub struct SyncGuard {
    direction: Rc<Cell<SyncDirection>>,
    previous: SyncDirection,
}

impl Drop for SyncGuard {
    fn drop(&mut self) {
        self.direction.set(self.previous);
    }
}
