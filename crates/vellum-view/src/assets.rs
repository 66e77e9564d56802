//! Shared rendering assets: action images, handle glyphs, localized strings.
//!
//! One [`SharedAssets`] is created by the host and handed to every
//! `GraphView`. The store is built on first access and released when the
//! last attached view detaches.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use tracing::{debug, trace};
use vellum_core::HANDLE_GLYPH_COUNT;
use vellum_surface::{Glyph, ResourceLookup};

/// Localized string table.
pub trait StringSource: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;
}

/// Built-in English captions.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStrings;

/// Captions indexed by action code 0..=19.
const BASIC_ACTIONS: &str = ",Select All,Reset,Draw,Cancel,Delete,Clone,Fixed Length,Free Length,Lock,Unlock,Edit,Done,Close,Open,Add Point,Delete Point,Group,Ungroup,Overturn";

impl StringSource for DefaultStrings {
    fn get(&self, name: &str) -> Option<String> {
        let text = match name {
            "basic_actions" => BASIC_ACTIONS,
            "actions40" => "",
            "select" => "Select",
            "rect" => "Rectangle",
            "line" => "Line",
            _ => return None,
        };
        Some(text.to_string())
    }
}

/// Fallback consulted when the table has no entry for a name.
pub type StringCallback = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Decode an image file into a glyph usable by every target.
pub fn glyph_from_file(path: &Path) -> Result<Glyph> {
    let img = image::open(path)
        .with_context(|| format!("failed to decode {}", path.display()))?
        .to_rgba8();
    Ok(Glyph {
        name: path.to_string_lossy().into_owned(),
        width: img.width() as f32,
        height: img.height() as f32,
        pixels: Some(Arc::new(img)),
    })
}

/// Asset contents. Built lazily by [`SharedAssets`].
pub struct AssetStore {
    action_images: HashMap<i32, Arc<Glyph>>,
    handle_glyphs: Vec<Option<Arc<Glyph>>>,
    strings: Box<dyn StringSource>,
    fallback: Option<StringCallback>,
}

impl Default for AssetStore {
    fn default() -> Self {
        Self::new(Box::new(DefaultStrings))
    }
}

impl AssetStore {
    pub fn new(strings: Box<dyn StringSource>) -> Self {
        Self {
            action_images: HashMap::new(),
            handle_glyphs: vec![None; HANDLE_GLYPH_COUNT],
            strings,
            fallback: None,
        }
    }

    /// Set or, with `None`, remove the image for an action code.
    pub fn set_action_image(&mut self, code: i32, glyph: Option<Glyph>) {
        match glyph {
            Some(glyph) => {
                self.action_images.insert(code, Arc::new(glyph));
            }
            None => {
                self.action_images.remove(&code);
            }
        }
    }

    pub fn action_image(&self, code: i32) -> Option<Arc<Glyph>> {
        self.action_images.get(&code).cloned()
    }

    /// Kinds outside `0..HANDLE_GLYPH_COUNT` are ignored.
    pub fn set_handle_glyph(&mut self, kind: i32, glyph: Option<Glyph>) {
        if let Some(slot) = usize::try_from(kind)
            .ok()
            .and_then(|i| self.handle_glyphs.get_mut(i))
        {
            *slot = glyph.map(Arc::new);
        }
    }

    pub fn handle_glyph(&self, kind: i32) -> Option<Arc<Glyph>> {
        usize::try_from(kind)
            .ok()
            .and_then(|i| self.handle_glyphs.get(i))
            .and_then(|g| g.clone())
    }

    pub fn set_string_callback(&mut self, callback: Option<StringCallback>) {
        self.fallback = callback;
    }

    /// Table entry, then the fallback callback, then the name itself.
    pub fn localized(&self, name: &str) -> String {
        self.strings
            .get(name)
            .or_else(|| self.fallback.as_ref().and_then(|cb| cb(name)))
            .unwrap_or_else(|| name.to_string())
    }
}

type StoreFactory = Box<dyn Fn() -> AssetStore + Send + Sync>;

struct AssetsInner {
    store: Option<Arc<AssetStore>>,
    views: usize,
    releases: usize,
}

/// Reference-counted asset service shared by views.
pub struct SharedAssets {
    inner: Mutex<AssetsInner>,
    factory: StoreFactory,
}

impl SharedAssets {
    pub fn new() -> Arc<Self> {
        Self::with_factory(AssetStore::default)
    }

    pub fn with_factory(factory: impl Fn() -> AssetStore + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(AssetsInner {
                store: None,
                views: 0,
                releases: 0,
            }),
            factory: Box::new(factory),
        })
    }

    pub fn attach(&self) {
        let mut inner = self.inner.lock();
        inner.views += 1;
        debug!(views = inner.views, "view attached to shared assets");
    }

    /// Returns true when this was the last view and the store was released.
    pub fn detach(&self) -> bool {
        let mut inner = self.inner.lock();
        if inner.views == 0 {
            return false;
        }
        inner.views -= 1;
        if inner.views > 0 {
            return false;
        }
        if inner.store.take().is_some() {
            inner.releases += 1;
            debug!("shared assets released");
        }
        true
    }

    pub fn view_count(&self) -> usize {
        self.inner.lock().views
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.lock().store.is_some()
    }

    /// Number of times a built store has been released.
    pub fn release_count(&self) -> usize {
        self.inner.lock().releases
    }

    /// The cached store, built on first use. With no view attached the
    /// store is built for this call only and not kept.
    pub fn store(&self) -> Arc<AssetStore> {
        if let Some(store) = self.inner.lock().store.clone() {
            return store;
        }
        // Factory runs without the lock held.
        debug!("building shared assets");
        let built = Arc::new((self.factory)());
        let mut inner = self.inner.lock();
        if inner.views == 0 {
            trace!("no view attached, shared assets not cached");
            return built;
        }
        inner.store.get_or_insert(built).clone()
    }

    /// Run `f` against the store without holding the lock.
    pub fn with_store<R>(&self, f: impl FnOnce(&AssetStore) -> R) -> R {
        f(&self.store())
    }

    pub fn action_image(&self, code: i32) -> Option<Arc<Glyph>> {
        self.with_store(|s| s.action_image(code))
    }

    pub fn localized(&self, name: &str) -> String {
        self.with_store(|s| s.localized(name))
    }
}

impl ResourceLookup for SharedAssets {
    fn handle_glyph(&self, kind: i32) -> Option<Arc<Glyph>> {
        self.with_store(|s| s.handle_glyph(kind))
    }

    fn localized(&self, key: &str) -> Option<String> {
        Some(SharedAssets::localized(self, key))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn glyph(name: &str) -> Glyph {
        Glyph {
            name: name.to_string(),
            width: 16.0,
            height: 16.0,
            pixels: None,
        }
    }

    #[test]
    fn test_lazy_build_and_single_release() {
        let assets = SharedAssets::new();
        assets.attach();
        assets.attach();
        assert!(!assets.is_loaded());

        assert_eq!(assets.localized("select"), "Select");
        assert!(assets.is_loaded());

        assert!(!assets.detach());
        assert!(assets.is_loaded());
        assert!(assets.detach());
        assert!(!assets.is_loaded());
        assert_eq!(assets.release_count(), 1);

        // Extra detach is harmless.
        assert!(!assets.detach());
        assert_eq!(assets.release_count(), 1);
    }

    #[test]
    fn test_store_calls_may_reenter() {
        let assets = SharedAssets::new();
        assets.attach();
        let nested = assets.with_store(|store| {
            assert_eq!(store.localized("line"), "Line");
            assets.localized("rect")
        });
        assert_eq!(nested, "Rectangle");
        assert!(Arc::ptr_eq(&assets.store(), &assets.store()));
    }

    #[test]
    fn test_lookup_after_last_detach_not_cached() {
        let builds = Arc::new(AtomicUsize::new(0));
        let counter = builds.clone();
        let assets = SharedAssets::with_factory(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            AssetStore::default()
        });
        assets.attach();
        assets.localized("select");
        assert!(assets.detach());
        assert_eq!(assets.release_count(), 1);

        assert_eq!(assets.localized("select"), "Select");
        assert!(!assets.is_loaded());
        assert!(!assets.detach());
        assert_eq!(assets.release_count(), 1);
        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_localized_fallback_chain() {
        let mut store = AssetStore::default();
        assert_eq!(store.localized("unknown_key"), "unknown_key");
        store.set_string_callback(Some(Box::new(|name| {
            (name == "unknown_key").then(|| "Found".to_string())
        })));
        assert_eq!(store.localized("unknown_key"), "Found");
        assert_eq!(store.localized("rect"), "Rectangle");
    }

    #[test]
    fn test_action_image_removal() {
        let mut store = AssetStore::default();
        store.set_action_image(5, Some(glyph("delete")));
        assert_eq!(store.action_image(5).map(|g| g.name.clone()), Some("delete".into()));
        store.set_action_image(5, None);
        assert!(store.action_image(5).is_none());
    }

    #[test]
    fn test_handle_glyph_range() {
        let mut store = AssetStore::default();
        store.set_handle_glyph(16, Some(glyph("pivot")));
        store.set_handle_glyph(17, Some(glyph("ignored")));
        assert!(store.handle_glyph(16).is_some());
        assert!(store.handle_glyph(17).is_none());
        assert!(store.handle_glyph(-1).is_none());
    }

    #[test]
    fn test_glyph_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dot.png");
        image::RgbaImage::from_pixel(3, 2, image::Rgba([1, 2, 3, 255]))
            .save(&path)
            .unwrap();
        let g = glyph_from_file(&path).unwrap();
        assert_eq!((g.width, g.height), (3.0, 2.0));
        assert!(g.pixels.is_some());
        assert!(glyph_from_file(&dir.path().join("missing.png")).is_err());
    }
}
