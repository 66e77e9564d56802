//! Vellum: host-side view coordination for a vector drawing engine.
//!
//! The workspace crates are re-exported under their short names so a host
//! can depend on `vellum` alone.

pub use vellum_config as config;
pub use vellum_core as engine;
pub use vellum_surface as surface;
pub use vellum_view as view;

pub use vellum_config::VellumConfig;
pub use vellum_core::{CoreEngine, EngineNotice, ViewId};
pub use vellum_view::{GraphView, SharedAssets, ViewListener};
