//! Tiling a map's prototype vectors into a single weight image.

use crate::error::{InspectError, Result};
use crate::som::Map;
use ndarray::{s, Array2, ArrayView2};

/// A map's prototypes laid out as one 2D image.
///
/// Neuron `(r, c)` occupies the `tile x tile` block whose top-left pixel is
/// `(r * tile, c * tile)`, with its prototype reshaped row-major into that
/// block. Indexing is `[y, x]`.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightImage {
    pixels: Array2<f64>,
    tile: usize,
    grid: (usize, usize),
}

impl WeightImage {
    /// Side length of one neuron's tile in pixels.
    #[inline]
    pub fn tile(&self) -> usize {
        self.tile
    }

    /// Grid shape `(rows, cols)` of the rendered map.
    #[inline]
    pub fn grid_shape(&self) -> (usize, usize) {
        self.grid
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.pixels.nrows()
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.pixels.ncols()
    }

    /// The raw pixel values, indexed `[y, x]`.
    #[inline]
    pub fn pixels(&self) -> &Array2<f64> {
        &self.pixels
    }

    /// The tile belonging to the neuron at `(row, col)`.
    pub fn block(&self, row: usize, col: usize) -> Option<ArrayView2<'_, f64>> {
        let (rows, cols) = self.grid;
        if row >= rows || col >= cols {
            return None;
        }
        let t = self.tile;
        Some(self.pixels.slice(s![row * t..(row + 1) * t, col * t..(col + 1) * t]))
    }

    /// Resolves a pixel position to the grid cell under it.
    ///
    /// Returns `None` for positions outside the image.
    pub fn grid_cell(&self, x: usize, y: usize) -> Option<(usize, usize)> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        Some((y / self.tile, x / self.tile))
    }

    /// Smallest and largest finite pixel values.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.pixels
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Side length of the square tile for prototypes of length `weight_len`.
pub fn tile_side(weight_len: usize) -> Result<usize> {
    let side = (weight_len as f64).sqrt().round() as usize;
    if weight_len == 0 || side * side != weight_len {
        return Err(InspectError::Shape { weight_len });
    }
    Ok(side)
}

/// Renders a map's prototypes into a tiled weight image.
///
/// Fails with [`InspectError::Shape`] when the prototype length is not a
/// (non-zero) perfect square. No smoothing is applied.
pub fn render_weights(map: &Map) -> Result<WeightImage> {
    let tile = tile_side(map.weight_dim)?;
    let (rows, cols) = map.shape();
    let mut pixels = Array2::<f64>::zeros((rows * tile, cols * tile));

    for neuron in map.neurons() {
        let block = ArrayView2::from_shape((tile, tile), &neuron.weights[..])
            .map_err(|_| InspectError::Shape { weight_len: neuron.weights.len() })?;
        pixels
            .slice_mut(s![
                neuron.row * tile..(neuron.row + 1) * tile,
                neuron.col * tile..(neuron.col + 1) * tile
            ])
            .assign(&block);
    }

    Ok(WeightImage {
        pixels,
        tile,
        grid: (rows, cols),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn counting_map(rows: usize, cols: usize, dim: usize) -> Map {
        let weights = (0..rows * cols)
            .map(|n| (0..dim).map(|k| (n * 100 + k) as f64).collect())
            .collect();
        Map::from_weights(rows, cols, weights).unwrap()
    }

    #[test]
    fn test_image_size() {
        let image = render_weights(&counting_map(2, 3, 9)).unwrap();
        assert_eq!(image.tile(), 3);
        assert_eq!((image.height(), image.width()), (6, 9));
        assert_eq!(image.grid_shape(), (2, 3));
    }

    #[test]
    fn test_blocks_are_reshaped_prototypes() {
        let map = counting_map(2, 2, 4);
        let image = render_weights(&map).unwrap();

        for neuron in map.neurons() {
            let expected = Array2::from_shape_vec((2, 2), neuron.weights.clone()).unwrap();
            assert_eq!(image.block(neuron.row, neuron.col).unwrap(), expected.view());
        }
        // neuron (1, 0), weight index 1 -> row 0 of its tile, column 1
        assert_eq!(image.pixels()[[2, 1]], 201.0);
    }

    #[test]
    fn test_non_square_weights() {
        let err = render_weights(&counting_map(2, 2, 5)).unwrap_err();
        assert!(matches!(err, InspectError::Shape { weight_len: 5 }));
    }

    #[test]
    fn test_tile_side() {
        assert_eq!(tile_side(64).unwrap(), 8);
        assert_eq!(tile_side(1).unwrap(), 1);
        assert!(tile_side(0).is_err());
        assert!(tile_side(63).is_err());
    }

    #[test]
    fn test_grid_cell() {
        let image = render_weights(&counting_map(2, 3, 16)).unwrap();
        assert_eq!(image.grid_cell(0, 0), Some((0, 0)));
        assert_eq!(image.grid_cell(5, 3), Some((0, 1)));
        assert_eq!(image.grid_cell(11, 7), Some((1, 2)));
        assert_eq!(image.grid_cell(12, 0), None);
        assert_eq!(image.grid_cell(0, 8), None);
    }

    #[test]
    fn test_value_range() {
        let image = render_weights(&counting_map(1, 2, 1)).unwrap();
        assert_eq!(image.value_range(), Some((0.0, 100.0)));
    }
}
