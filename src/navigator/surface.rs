//! Display surfaces: where opened views end up.

use crate::config::{OverlayConfig, RenderConfig};
use crate::error::Result;
use crate::navigator::{View, ViewId};
use crate::render::{draw_overlay, to_raster, Palette};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// The display collaborator a navigator presents its views on.
pub trait DisplaySurface {
    /// Shows a newly opened view.
    fn present(&mut self, view: &View<'_>) -> Result<()>;

    /// Removes a view that was closed.
    fn dismiss(&mut self, _id: ViewId) -> Result<()> {
        Ok(())
    }
}

/// A surface that displays nothing. Useful for headless traversal.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSurface;

impl DisplaySurface for NullSurface {
    fn present(&mut self, _view: &View<'_>) -> Result<()> {
        Ok(())
    }
}

/// Writes every presented view as a PNG file into a directory.
///
/// Files are named `view-<id>-level<level>.png`. When the overlay draws
/// labels, the legend goes next to the image as
/// `view-<id>-level<level>.legend.json`. Closing a view leaves its files in
/// place.
pub struct PngSurface {
    dir: PathBuf,
    render: RenderConfig,
    overlay: OverlayConfig,
    palette: Palette,
    written: HashMap<ViewId, PathBuf>,
    legends: HashMap<ViewId, PathBuf>,
}

impl PngSurface {
    /// Creates the output directory if needed.
    pub fn new<P: AsRef<Path>>(dir: P, render: RenderConfig, overlay: OverlayConfig) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            render,
            overlay,
            palette: Palette::default(),
            written: HashMap::new(),
            legends: HashMap::new(),
        })
    }

    /// The file written for view `id`, if it was presented.
    pub fn path_of(&self, id: ViewId) -> Option<&Path> {
        self.written.get(&id).map(PathBuf::as_path)
    }

    /// The legend file written for view `id`, if its overlay drew labels.
    pub fn legend_path_of(&self, id: ViewId) -> Option<&Path> {
        self.legends.get(&id).map(PathBuf::as_path)
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DisplaySurface for PngSurface {
    fn present(&mut self, view: &View<'_>) -> Result<()> {
        let scale = self.render.scale.max(1);
        let mut raster = to_raster(view.image(), self.render.colormap, scale);
        let stem = format!("view-{:03}-level{}", view.id(), view.level());

        if self.overlay.enabled {
            if let Some(data) = view.data() {
                let cell_px = view.image().tile() as u32 * scale;
                let legend = draw_overlay(
                    &mut raster,
                    &data.index,
                    &data.dataset,
                    &self.palette,
                    cell_px,
                    self.overlay.marker_scale,
                )?;
                if !legend.is_empty() {
                    let legend_path = self.dir.join(format!("{}.legend.json", stem));
                    fs::write(&legend_path, legend.to_json()?)?;
                    debug!("view {} legend -> {}", view.id(), legend_path.display());
                    self.legends.insert(view.id(), legend_path);
                }
            }
        }

        let path = self.dir.join(format!("{}.png", stem));
        raster.save(&path)?;
        info!("{} -> {}", view.title(), path.display());

        if self.written.insert(view.id(), path).is_some() {
            warn!("view {} presented twice", view.id());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::navigator::HierarchyNavigator;
    use crate::som::{Map, Model};
    use tempfile::tempdir;

    #[test]
    fn test_png_surface_writes_views() {
        let dir = tempdir().unwrap();
        let child = Map::from_weights(1, 1, vec![vec![0.25; 4]]).unwrap();
        let root = Map::from_weights(1, 2, vec![vec![0.0; 4], vec![1.0; 4]])
            .unwrap()
            .with_child(0, 1, child)
            .unwrap();
        let model = Model::new(root).unwrap();
        let dataset = Dataset::with_labels(vec![vec![0.9; 4], vec![0.1; 4]], vec![1, 0]).unwrap();

        let surface = PngSurface::new(dir.path(), RenderConfig::default(), OverlayConfig::default()).unwrap();
        let mut nav = HierarchyNavigator::new(surface);
        let root_id = nav.open_root(&model, Some(dataset)).unwrap();
        nav.click(root_id, 2, 0).unwrap();

        let surface = nav.into_surface();
        let root_png = surface.path_of(root_id).unwrap();
        assert!(root_png.exists());

        let img = image::open(root_png).unwrap();
        // 1x2 grid of 2x2 tiles, upscaled 8x
        assert_eq!((img.width(), img.height()), (32, 16));
        assert!(surface.path_of(1).unwrap().exists());
    }

    #[test]
    fn test_legend_written_next_to_png() {
        let dir = tempdir().unwrap();
        let root = Map::from_weights(1, 2, vec![vec![0.0; 4], vec![1.0; 4]]).unwrap();
        let model = Model::new(root).unwrap();
        let dataset =
            Dataset::with_labels(vec![vec![0.9; 4], vec![0.1; 4], vec![1.0; 4]], vec![3, 0, 3]).unwrap();

        let surface = PngSurface::new(dir.path(), RenderConfig::default(), OverlayConfig::default()).unwrap();
        let mut nav = HierarchyNavigator::new(surface);
        let root_id = nav.open_root(&model, Some(dataset)).unwrap();

        let surface = nav.into_surface();
        let legend_path = surface.legend_path_of(root_id).unwrap();
        assert_eq!(legend_path, dir.path().join("view-000-level1.legend.json"));

        let text = std::fs::read_to_string(legend_path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let labels: Vec<u64> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["label"].as_u64().unwrap())
            .collect();
        assert_eq!(labels, vec![3, 0]);
        assert_eq!(value[0]["marker"], "tri_left");
    }

    #[test]
    fn test_no_legend_without_labels() {
        let dir = tempdir().unwrap();
        let root = Map::from_weights(1, 1, vec![vec![0.0; 4]]).unwrap();
        let model = Model::new(root).unwrap();
        let dataset = Dataset::new(vec![vec![0.5; 4]]).unwrap();

        let surface = PngSurface::new(dir.path(), RenderConfig::default(), OverlayConfig::default()).unwrap();
        let mut nav = HierarchyNavigator::new(surface);
        let root_id = nav.open_root(&model, Some(dataset)).unwrap();

        let surface = nav.into_surface();
        assert!(surface.path_of(root_id).is_some());
        assert!(surface.legend_path_of(root_id).is_none());
    }
}
