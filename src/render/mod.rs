//! Rendering of maps as images.
//!
//! - [`tiles`]: prototype vectors tiled into a numeric [`WeightImage`]
//! - [`colormap`]: numeric images to RGB rasters for display
//! - [`overlay`]: per-point label markers and the winner-cell index

pub mod colormap;
pub mod overlay;
pub mod tiles;

pub use colormap::{to_raster, Colormap};
pub use overlay::{draw_overlay, LabelAssociationIndex, Legend, MarkerShape, MarkerStyle, Palette};
pub use tiles::{render_weights, tile_side, WeightImage};
