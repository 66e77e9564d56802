use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::debug;
use vellum_core::{CoreEngine, Rect, ViewId};
use vellum_surface::{CanvasAdapter, DrawTarget, PixmapTarget, ResourceLookup, SvgTarget};

/// Create the parent directory of `path` when it has one.
pub fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Ok(())
}

/// `path` with `ext` appended when it has no extension.
pub fn with_default_extension(path: &Path, ext: &str) -> PathBuf {
    if path.extension().is_none() && !ext.is_empty() {
        path.with_extension(ext)
    } else {
        path.to_path_buf()
    }
}

/// Replay committed content into `target` with a fresh pen and brush.
fn replay_static(
    engine: &mut dyn CoreEngine,
    view: ViewId,
    target: &mut dyn DrawTarget,
    resources: &dyn ResourceLookup,
) -> usize {
    let mut adapter = CanvasAdapter::new();
    let mut session = adapter.begin(target, resources);
    engine.draw_all(view, &mut session)
}

pub fn export_svg(
    engine: &mut dyn CoreEngine,
    view: ViewId,
    size: (u32, u32),
    path: &Path,
    resources: &dyn ResourceLookup,
) -> Result<usize> {
    ensure_parent(path)?;
    let mut svg = SvgTarget::new(size.0 as f32, size.1 as f32);
    let drawn = replay_static(engine, view, &mut svg, resources);
    svg.save(path)?;
    debug!(?path, drawn, "svg exported");
    Ok(drawn)
}

/// Returns the path actually written; unsupported extensions become `.png`.
pub fn export_raster(
    engine: &mut dyn CoreEngine,
    view: ViewId,
    size: (u32, u32),
    path: &Path,
    resources: &dyn ResourceLookup,
) -> Result<PathBuf> {
    ensure_parent(path)?;
    let mut pixmap = PixmapTarget::new(size.0, size.1)?;
    let drawn = replay_static(engine, view, &mut pixmap, resources);
    let written = pixmap.save(path)?;
    debug!(path = ?written, drawn, "raster exported");
    Ok(written)
}

/// Rasterize at the surface size, then keep only `extent` grown by
/// `spacing` and clipped to the surface. The background stays transparent.
pub fn export_extent_raster(
    engine: &mut dyn CoreEngine,
    view: ViewId,
    size: (u32, u32),
    spacing: f32,
    path: &Path,
    resources: &dyn ResourceLookup,
) -> Result<PathBuf> {
    let bounds = Rect::new(0.0, 0.0, size.0 as f32, size.1 as f32);
    let extent = engine.display_extent(view);
    let area = extent.inflate(spacing.max(0.0)).intersect(&bounds);
    if extent.is_empty() || area.is_empty() {
        bail!("nothing visible to export");
    }
    ensure_parent(path)?;
    let mut pixmap = PixmapTarget::new(size.0, size.1)?;
    let drawn = replay_static(engine, view, &mut pixmap, resources);
    let written = pixmap.crop(area)?.save(path)?;
    debug!(path = ?written, drawn, ?area, "extent exported");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockEngine;
    use vellum_surface::NoResources;

    #[test]
    fn test_default_extension() {
        assert_eq!(
            with_default_extension(Path::new("shot"), "png"),
            PathBuf::from("shot.png")
        );
        assert_eq!(
            with_default_extension(Path::new("shot.gif"), "png"),
            PathBuf::from("shot.gif")
        );
    }

    #[test]
    fn test_raster_export_creates_parent() {
        let tmp = tempfile::tempdir().unwrap();
        let (mut engine, mock) = MockEngine::new();
        mock.borrow_mut().shapes.push(Rect::new(2.0, 2.0, 6.0, 6.0));
        let path = tmp.path().join("nested/out/shot.jpg");
        let written = export_raster(&mut engine, ViewId(1), (16, 16), &path, &NoResources).unwrap();
        assert_eq!(written, path);
        assert!(written.exists());
    }

    #[test]
    fn test_svg_export_contains_shapes() {
        let tmp = tempfile::tempdir().unwrap();
        let (mut engine, mock) = MockEngine::new();
        mock.borrow_mut().shapes.push(Rect::new(2.0, 2.0, 6.0, 6.0));
        let path = tmp.path().join("doc.svg");
        assert_eq!(export_svg(&mut engine, ViewId(1), (20, 20), &path, &NoResources).unwrap(), 1);
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("<path"));
        assert!(text.contains(r##"fill="#0000ff""##));
    }

    #[test]
    fn test_extent_export_crops_to_shapes() {
        let tmp = tempfile::tempdir().unwrap();
        let (mut engine, mock) = MockEngine::new();
        mock.borrow_mut().shapes.push(Rect::new(10.0, 10.0, 20.0, 10.0));
        let path = tmp.path().join("extent.png");

        let written =
            export_extent_raster(&mut engine, ViewId(1), (100, 50), 4.0, &path, &NoResources).unwrap();
        let img = image::open(&written).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (28, 18));
        // Spacing is transparent; the fill starts inside it.
        assert_eq!(img.get_pixel(0, 0).0[3], 0);
        assert_eq!(img.get_pixel(14, 9).0, [0, 0, 255, 255]);
    }

    #[test]
    fn test_extent_export_needs_content() {
        let tmp = tempfile::tempdir().unwrap();
        let (mut engine, _mock) = MockEngine::new();
        let path = tmp.path().join("empty.png");
        assert!(export_extent_raster(&mut engine, ViewId(1), (100, 50), 4.0, &path, &NoResources).is_err());
        assert!(!path.exists());
    }
}
