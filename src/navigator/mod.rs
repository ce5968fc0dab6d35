//! Interactive drill-down through the map hierarchy.
//!
//! A [`HierarchyNavigator`] keeps every open [`View`] and hands each one to a
//! [`DisplaySurface`]. Clicking a view resolves the pixel to a neuron; if that
//! neuron owns a child map, a new view over the child is opened one level
//! deeper. Clicking a leaf changes nothing.

mod session;
mod surface;
mod view;

pub use session::{run_session, Command};
pub use surface::{DisplaySurface, NullSurface, PngSurface};
pub use view::{child_label, View, ViewData, ViewId, ROOT_LABEL};

use crate::dataset::Dataset;
use crate::error::{InspectError, Result};
use crate::render::{render_weights, LabelAssociationIndex, Legend, Palette};
use crate::som::{Map, Model};
use log::{debug, info};

/// What a click did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The clicked neuron owns a child map; a view over it was opened.
    Opened(ViewId),
    /// The clicked neuron is a leaf; nothing changed.
    Leaf {
        /// Grid row of the clicked neuron.
        row: usize,
        /// Grid column of the clicked neuron.
        col: usize,
    },
    /// The click fell outside the view's image.
    OutsideImage,
}

/// Session state: all open views over one immutable model.
pub struct HierarchyNavigator<'m, S: DisplaySurface> {
    views: Vec<View<'m>>,
    surface: S,
    next_id: ViewId,
}

impl<'m, S: DisplaySurface> HierarchyNavigator<'m, S> {
    /// Starts an empty session that presents views on `surface`.
    pub fn new(surface: S) -> Self {
        Self {
            views: Vec::new(),
            surface,
            next_id: 0,
        }
    }

    /// Opens the level-1 view over the model's top-level map.
    pub fn open_root(&mut self, model: &'m Model, dataset: Option<Dataset>) -> Result<ViewId> {
        match dataset {
            Some(dataset) => self.open_with_data(model.root(), dataset, 1, ROOT_LABEL),
            None => self.open(model.root(), 1, ROOT_LABEL),
        }
    }

    /// Renders `map`, registers a view for it and presents it.
    ///
    /// Fails with [`InspectError::Model`] if `map` is malformed.
    pub fn open(&mut self, map: &'m Map, level: usize, path_label: &str) -> Result<ViewId> {
        self.insert(map, level, path_label, None)
    }

    /// Like [`open`](Self::open), additionally indexing `dataset` against `map`
    /// so the view carries label markers and can hand subsets to child views.
    ///
    /// Labels without a marker style are rejected with
    /// [`InspectError::PaletteOverflow`] whatever the display surface.
    pub fn open_with_data(
        &mut self,
        map: &'m Map,
        dataset: Dataset,
        level: usize,
        path_label: &str,
    ) -> Result<ViewId> {
        self.insert(map, level, path_label, Some(dataset))
    }

    fn insert(
        &mut self,
        map: &'m Map,
        level: usize,
        path_label: &str,
        dataset: Option<Dataset>,
    ) -> Result<ViewId> {
        map.validate_level()?;
        let image = render_weights(map)?;

        let data = match dataset {
            Some(dataset) => {
                if let Some(labels) = dataset.labels() {
                    Legend::from_labels(labels, &Palette::default())?;
                }
                let index = LabelAssociationIndex::build(map, &dataset)?;
                Some(ViewData { dataset, index })
            }
            None => None,
        };

        let view = View {
            id: self.next_id,
            map,
            level,
            path_label: path_label.to_string(),
            image,
            data,
        };

        self.surface.present(&view)?;
        info!("opened view {}: {}", view.id, view.title());

        self.next_id += 1;
        let id = view.id;
        self.views.push(view);
        Ok(id)
    }

    /// Handles a click at pixel `(x, y)` of view `id`'s weight image.
    ///
    /// The cell is `(y / tile, x / tile)` with the view's own tile size.
    pub fn click(&mut self, id: ViewId, x: usize, y: usize) -> Result<ClickOutcome> {
        let view = self.view(id).ok_or(InspectError::UnknownView(id))?;

        let (row, col) = match view.image.grid_cell(x, y) {
            Some(cell) => cell,
            None => {
                debug!("click ({}, {}) outside view {}", x, y, id);
                return Ok(ClickOutcome::OutsideImage);
            }
        };

        let map: &'m Map = view.map;
        let neuron = map.get_at(row, col).ok_or_else(|| {
            InspectError::Model(format!("no neuron at ({}, {}) in view {}", row, col, id))
        })?;
        debug!("click ({}, {}) on view {} resolved to neuron ({}, {})", x, y, id, row, col);

        let child = match neuron.child_map() {
            Some(child) => child,
            None => return Ok(ClickOutcome::Leaf { row, col }),
        };

        let level = view.level + 1;
        let subset = match &view.data {
            Some(data) => Some(data.dataset.subset(data.index.cell(row, col))?),
            None => None,
        };

        let label = child_label(row, col);
        let opened = match subset {
            Some(dataset) => self.open_with_data(child, dataset, level, &label)?,
            None => self.open(child, level, &label)?,
        };
        Ok(ClickOutcome::Opened(opened))
    }

    /// Dismisses view `id`. Other views are untouched.
    pub fn close(&mut self, id: ViewId) -> Result<()> {
        let pos = self
            .views
            .iter()
            .position(|v| v.id == id)
            .ok_or(InspectError::UnknownView(id))?;
        self.views.remove(pos);
        self.surface.dismiss(id)?;
        info!("closed view {}", id);
        Ok(())
    }

    /// Open views in the order they were opened.
    #[inline]
    pub fn views(&self) -> &[View<'m>] {
        &self.views
    }

    /// Looks up an open view.
    pub fn view(&self, id: ViewId) -> Option<&View<'m>> {
        self.views.iter().find(|v| v.id == id)
    }

    /// The display surface.
    #[inline]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Ends the session, returning the surface.
    pub fn into_surface(self) -> S {
        self.surface
    }
}
