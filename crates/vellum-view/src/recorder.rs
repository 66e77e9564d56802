//! Undo and playback recording sessions.
//!
//! A session owns a directory that is wiped on start, stamps each frame with
//! the milliseconds elapsed since start, and writes a `frames.json` index on
//! stop. The engine writes the frame payloads itself through
//! [`CoreEngine::record_frame`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};
use vellum_core::{CoreEngine, LogKind, RecordFrame};

use crate::clock::Clock;
use crate::error::ViewError;

pub const INDEX_FILE: &str = "frames.json";

#[derive(Debug, Clone)]
pub struct RecordingSession {
    kind: LogKind,
    dir: PathBuf,
    origin_ms: u64,
    last_change: u64,
    frames: Vec<RecordFrame>,
}

impl RecordingSession {
    pub fn kind(&self) -> LogKind {
        self.kind
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn frames(&self) -> &[RecordFrame] {
        &self.frames
    }

    pub fn last_change(&self) -> u64 {
        self.last_change
    }

    fn next_frame(&mut self, now_ms: u64, change_count: u64, document: bool, dynamic: bool) -> RecordFrame {
        self.last_change = self.last_change.max(change_count);
        RecordFrame {
            tick: now_ms.saturating_sub(self.origin_ms),
            change_count: self.last_change,
            document: document || self.frames.is_empty(),
            dynamic,
        }
    }
}

/// On-disk index written when a session stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionIndex {
    pub kind: LogKind,
    pub frames: Vec<RecordFrame>,
}

pub fn load_index(dir: &Path) -> Result<SessionIndex> {
    let path = dir.join(INDEX_FILE);
    let data = fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
    let index = serde_json::from_slice(&data)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(index)
}

fn write_index(session: &RecordingSession) -> Result<()> {
    let path = session.dir.join(INDEX_FILE);
    let index = SessionIndex {
        kind: session.kind,
        frames: session.frames.clone(),
    };
    let data = serde_json::to_vec_pretty(&index)?;
    fs::write(&path, data).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn reset_dir(dir: &Path) -> Result<(), ViewError> {
    let wrap = |source: std::io::Error| ViewError::Directory {
        path: dir.to_path_buf(),
        source,
    };
    if dir.exists() {
        fs::remove_dir_all(dir).map_err(wrap)?;
    }
    fs::create_dir_all(dir).map_err(wrap)
}

/// Runs at most one undo and one playback session.
pub struct SessionRecorder {
    undo: Option<RecordingSession>,
    playback: Option<RecordingSession>,
    clock: Arc<dyn Clock>,
}

impl SessionRecorder {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            undo: None,
            playback: None,
            clock,
        }
    }

    fn slot(&self, kind: LogKind) -> &Option<RecordingSession> {
        match kind {
            LogKind::Undo => &self.undo,
            LogKind::Playback => &self.playback,
        }
    }

    fn slot_mut(&mut self, kind: LogKind) -> &mut Option<RecordingSession> {
        match kind {
            LogKind::Undo => &mut self.undo,
            LogKind::Playback => &mut self.playback,
        }
    }

    pub fn is_running(&self, kind: LogKind) -> bool {
        self.slot(kind).is_some()
    }

    pub fn session(&self, kind: LogKind) -> Option<&RecordingSession> {
        self.slot(kind).as_ref()
    }

    /// Milliseconds since the session of `kind` started.
    pub fn tick(&self, kind: LogKind) -> Option<u64> {
        let origin = self.slot(kind).as_ref()?.origin_ms;
        Some(self.clock.now_ms().saturating_sub(origin))
    }

    /// Wipe `dir`, hand it to the engine and start stamping frames.
    pub fn start(&mut self, engine: &mut dyn CoreEngine, kind: LogKind, dir: &Path) -> Result<(), ViewError> {
        if self.is_running(kind) {
            return Err(ViewError::SessionRunning(kind));
        }
        reset_dir(dir)?;
        if !engine.start_record(kind, dir) {
            return Err(ViewError::EngineRejected("start_record"));
        }
        let origin_ms = self.clock.now_ms();
        *self.slot_mut(kind) = Some(RecordingSession {
            kind,
            dir: dir.to_path_buf(),
            origin_ms,
            last_change: 0,
            frames: Vec::new(),
        });
        debug!(kind = ?kind, ?dir, "recording session started");
        Ok(())
    }

    /// End the session and write its index. Returns the finished session.
    pub fn stop(&mut self, engine: &mut dyn CoreEngine, kind: LogKind) -> Result<RecordingSession, ViewError> {
        let session = self
            .slot_mut(kind)
            .take()
            .ok_or(ViewError::SessionNotRunning(kind))?;
        engine.stop_record(kind);
        if let Err(error) = write_index(&session) {
            warn!(?error, dir = ?session.dir, "failed to write session index");
        }
        debug!(kind = ?kind, frames = session.frames.len(), "recording session stopped");
        Ok(session)
    }

    /// Offer a frame to the session of `kind`. Returns true when the engine took it.
    pub fn append(&mut self, engine: &mut dyn CoreEngine, kind: LogKind, document: bool, dynamic: bool) -> bool {
        if kind == LogKind::Undo && engine.is_playing() {
            trace!("undo frame suppressed during playback");
            return false;
        }
        let now = self.clock.now_ms();
        let change_count = engine.change_count();
        let Some(session) = self.slot_mut(kind).as_mut() else {
            return false;
        };
        let frame = session.next_frame(now, change_count, document, dynamic);
        if !engine.record_frame(kind, &frame) {
            warn!(kind = ?kind, tick = frame.tick, "engine rejected frame");
            return false;
        }
        trace!(kind = ?kind, tick = frame.tick, change = frame.change_count, "frame recorded");
        session.frames.push(frame);
        true
    }

    /// Stop every running session, reporting nothing.
    pub fn stop_all(&mut self, engine: &mut dyn CoreEngine) {
        for kind in [LogKind::Undo, LogKind::Playback] {
            if self.is_running(kind) {
                let _ = self.stop(engine, kind);
            }
        }
    }
}

/// One replay position: the committed document frame plus an optional
/// transient overlay frame, both as indices into the recorded frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayStep {
    pub tick: u64,
    pub document: usize,
    pub dynamic: Option<usize>,
}

/// Order frames by tick, then change counter. A document frame replaces the
/// committed base; a dynamic-only frame overlays the latest base. Frames seen
/// before any document frame have nothing to overlay and are dropped.
pub fn replay_plan(frames: &[RecordFrame]) -> Vec<ReplayStep> {
    let mut order: Vec<usize> = (0..frames.len()).collect();
    order.sort_by_key(|&i| (frames[i].tick, frames[i].change_count));

    let mut base = None;
    let mut steps = Vec::with_capacity(frames.len());
    for i in order {
        let frame = &frames[i];
        if frame.document {
            base = Some(i);
            steps.push(ReplayStep {
                tick: frame.tick,
                document: i,
                dynamic: frame.dynamic.then_some(i),
            });
        } else if frame.dynamic
            && let Some(document) = base
        {
            steps.push(ReplayStep {
                tick: frame.tick,
                document,
                dynamic: Some(i),
            });
        }
    }
    steps
}
