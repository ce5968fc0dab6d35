//! One displayed map in an inspection session.

use crate::dataset::Dataset;
use crate::render::{LabelAssociationIndex, WeightImage};
use crate::som::Map;

/// Identifier of an open view, unique within one navigator.
pub type ViewId = usize;

/// Path label of the level-1 view.
pub const ROOT_LABEL: &str = "root";

/// Label data carried by a view: its points and their winner cells.
#[derive(Debug, Clone)]
pub struct ViewData {
    /// Points that reached this map.
    pub dataset: Dataset,
    /// Winner cell of each of those points in this map.
    pub index: LabelAssociationIndex,
}

/// An open view over one map of the hierarchy.
///
/// A view borrows its map from the model, so the model outlives every view
/// and cannot change while any view is open.
#[derive(Debug, Clone)]
pub struct View<'m> {
    pub(crate) id: ViewId,
    pub(crate) map: &'m Map,
    pub(crate) level: usize,
    pub(crate) path_label: String,
    pub(crate) image: WeightImage,
    pub(crate) data: Option<ViewData>,
}

impl<'m> View<'m> {
    /// View identifier.
    #[inline]
    pub fn id(&self) -> ViewId {
        self.id
    }

    /// The displayed map.
    #[inline]
    pub fn map(&self) -> &'m Map {
        self.map
    }

    /// Nesting level; the root map is level 1.
    #[inline]
    pub fn level(&self) -> usize {
        self.level
    }

    /// How this view was reached: `"root"` or the parent's clicked `"(row, col)"`.
    #[inline]
    pub fn path_label(&self) -> &str {
        &self.path_label
    }

    /// The rendered weight image.
    #[inline]
    pub fn image(&self) -> &WeightImage {
        &self.image
    }

    /// Label data, when the view was opened with a dataset.
    #[inline]
    pub fn data(&self) -> Option<&ViewData> {
        self.data.as_ref()
    }

    /// Human-readable title encoding level and parent path.
    pub fn title(&self) -> String {
        format!("level {} -- parent pos {}", self.level, self.path_label)
    }
}

/// Path label for a child view opened from cell `(row, col)`.
pub fn child_label(row: usize, col: usize) -> String {
    format!("({}, {})", row, col)
}
