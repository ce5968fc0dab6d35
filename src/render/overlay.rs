//! Label overlays: which data points land on which cell, and how to mark them.

use crate::dataset::Dataset;
use crate::error::{InspectError, Result};
use crate::som::Map;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut};
use serde::Serialize;
use std::f32::consts::PI;

/// Dataset indices bucketed by their winning cell in one map.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelAssociationIndex {
    rows: usize,
    cols: usize,
    /// Row-major cells, each listing dataset indices in ascending order.
    cells: Vec<Vec<usize>>,
    /// Winning `(row, col)` per dataset index.
    winners: Vec<(usize, usize)>,
}

impl LabelAssociationIndex {
    /// Assigns every point of `dataset` to its winner neuron in `map`.
    pub fn build(map: &Map, dataset: &Dataset) -> Result<Self> {
        let (rows, cols) = map.shape();
        let mut cells = vec![Vec::new(); rows * cols];
        let mut winners = Vec::with_capacity(dataset.len());

        for (idx, point) in dataset.points().iter().enumerate() {
            let (r, c) = map.winner_neuron(point)?.position();
            cells[r * cols + c].push(idx);
            winners.push((r, c));
        }

        Ok(Self {
            rows,
            cols,
            cells,
            winners,
        })
    }

    /// Grid shape `(rows, cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Dataset indices whose winner is `(row, col)`; empty outside the grid.
    pub fn cell(&self, row: usize, col: usize) -> &[usize] {
        if row < self.rows && col < self.cols {
            &self.cells[row * self.cols + col]
        } else {
            &[]
        }
    }

    /// Winning cell of the point at `idx`.
    pub fn winner_of(&self, idx: usize) -> Option<(usize, usize)> {
        self.winners.get(idx).copied()
    }

    /// Number of indexed points.
    #[inline]
    pub fn total_points(&self) -> usize {
        self.winners.len()
    }
}

/// Marker shapes, one per palette slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerShape {
    /// Circle.
    Circle,
    /// Triangle pointing down.
    TriangleDown,
    /// Three spokes, one pointing down.
    TriDown,
    /// Three spokes, one pointing left.
    TriLeft,
    /// Octagon.
    Octagon,
    /// Square.
    Square,
    /// Pentagon.
    Pentagon,
    /// Diagonal cross.
    Cross,
    /// Plus sign.
    Plus,
    /// Five-pointed star.
    Star,
}

/// The marker and colour used for one label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerStyle {
    /// Marker outline.
    pub shape: MarkerShape,
    /// Outline colour.
    pub color: Rgb<u8>,
}

/// Fixed label-to-style assignment.
///
/// Label `n` uses slot `n`. Labels beyond the last slot are rejected with
/// [`InspectError::PaletteOverflow`] rather than reusing a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    styles: Vec<MarkerStyle>,
}

impl Default for Palette {
    fn default() -> Self {
        use MarkerShape::*;
        let shapes = [
            Circle,
            TriangleDown,
            TriDown,
            TriLeft,
            Octagon,
            Square,
            Pentagon,
            Cross,
            Plus,
            Star,
        ];
        let colors = [
            Rgb([255, 0, 0]),
            Rgb([0, 128, 0]),
            Rgb([0, 0, 255]),
            Rgb([191, 191, 0]),
            Rgb([0, 191, 191]),
            Rgb([0, 26, 204]),
            Rgb([255, 128, 0]),
            Rgb([255, 255, 77]),
            Rgb([191, 0, 191]),
            Rgb([102, 153, 0]),
        ];
        let styles = shapes
            .iter()
            .zip(colors.iter())
            .map(|(&shape, &color)| MarkerStyle { shape, color })
            .collect();
        Self { styles }
    }
}

impl Palette {
    /// Number of available styles.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.styles.len()
    }

    /// Style for `label`.
    pub fn style(&self, label: u8) -> Result<MarkerStyle> {
        self.styles
            .get(label as usize)
            .copied()
            .ok_or(InspectError::PaletteOverflow {
                label,
                capacity: self.capacity(),
            })
    }
}

/// Labels and their styles, in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Legend {
    entries: Vec<(u8, MarkerStyle)>,
}

impl Legend {
    /// Builds the legend for a label sequence.
    pub fn from_labels(labels: &[u8], palette: &Palette) -> Result<Self> {
        let mut entries: Vec<(u8, MarkerStyle)> = Vec::new();
        for &label in labels {
            if !entries.iter().any(|(l, _)| *l == label) {
                entries.push((label, palette.style(label)?));
            }
        }
        Ok(Self { entries })
    }

    /// The `(label, style)` entries.
    #[inline]
    pub fn entries(&self) -> &[(u8, MarkerStyle)] {
        &self.entries
    }

    /// Returns true if no label is shown.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The legend as a JSON array of `{label, marker, color}` objects, in
    /// first-seen order. Colours are `[r, g, b]`.
    pub fn to_json(&self) -> Result<String> {
        let entries: Vec<LegendEntry> = self
            .entries
            .iter()
            .map(|(label, style)| LegendEntry {
                label: *label,
                marker: style.shape,
                color: style.color.0,
            })
            .collect();
        Ok(serde_json::to_string_pretty(&entries)?)
    }
}

#[derive(Serialize)]
struct LegendEntry {
    label: u8,
    marker: MarkerShape,
    color: [u8; 3],
}

/// Marker size and stroke width for a grid, in percent of the average
/// raster side. Finer grids get smaller markers.
pub fn marker_geometry(rows: usize, cols: usize) -> (f64, f64) {
    let size = (50.0 / rows as f64 + 50.0 / cols as f64) * 0.5;
    let width = (10.0 / rows as f64 + 10.0 / cols as f64) * 0.5;
    (size, width)
}

fn regular_polygon(cx: f32, cy: f32, r: f32, n: usize, start: f32) -> Vec<(f32, f32)> {
    (0..n)
        .map(|k| {
            let a = start + 2.0 * PI * k as f32 / n as f32;
            (cx + r * a.cos(), cy + r * a.sin())
        })
        .collect()
}

fn star(cx: f32, cy: f32, r: f32) -> Vec<(f32, f32)> {
    (0..10)
        .map(|k| {
            let a = -PI / 2.0 + PI * k as f32 / 5.0;
            let rr = if k % 2 == 0 { r } else { r * 0.4 };
            (cx + rr * a.cos(), cy + rr * a.sin())
        })
        .collect()
}

fn draw_closed(raster: &mut RgbImage, vertices: &[(f32, f32)], color: Rgb<u8>) {
    for (i, &start) in vertices.iter().enumerate() {
        let end = vertices[(i + 1) % vertices.len()];
        draw_line_segment_mut(raster, start, end, color);
    }
}

fn draw_spokes(raster: &mut RgbImage, center: (f32, f32), tips: &[(f32, f32)], color: Rgb<u8>) {
    for &tip in tips {
        draw_line_segment_mut(raster, center, tip, color);
    }
}

/// Draws one hollow marker of radius `r` (pixels) centred at `(cx, cy)`.
pub fn draw_marker(raster: &mut RgbImage, style: MarkerStyle, cx: f32, cy: f32, r: f32) {
    let color = style.color;
    match style.shape {
        MarkerShape::Circle => {
            draw_hollow_circle_mut(raster, (cx.round() as i32, cy.round() as i32), r.round() as i32, color)
        }
        MarkerShape::TriangleDown => draw_closed(raster, &regular_polygon(cx, cy, r, 3, PI / 2.0), color),
        MarkerShape::TriDown => {
            draw_spokes(raster, (cx, cy), &regular_polygon(cx, cy, r, 3, PI / 2.0), color)
        }
        MarkerShape::TriLeft => draw_spokes(raster, (cx, cy), &regular_polygon(cx, cy, r, 3, PI), color),
        MarkerShape::Octagon => draw_closed(raster, &regular_polygon(cx, cy, r, 8, PI / 8.0), color),
        MarkerShape::Square => draw_closed(raster, &regular_polygon(cx, cy, r, 4, PI / 4.0), color),
        MarkerShape::Pentagon => draw_closed(raster, &regular_polygon(cx, cy, r, 5, -PI / 2.0), color),
        MarkerShape::Cross => {
            draw_spokes(raster, (cx, cy), &regular_polygon(cx, cy, r, 4, PI / 4.0), color)
        }
        MarkerShape::Plus => draw_spokes(raster, (cx, cy), &regular_polygon(cx, cy, r, 4, 0.0), color),
        MarkerShape::Star => draw_closed(raster, &star(cx, cy, r), color),
    }
}

/// Draws one marker per labelled point at the centre of its winning cell.
///
/// `cell_px` is the side of one grid cell in the raster. Returns the legend
/// of labels drawn; an unlabelled dataset draws nothing. Every label is
/// checked against the palette before anything is drawn.
pub fn draw_overlay(
    raster: &mut RgbImage,
    index: &LabelAssociationIndex,
    dataset: &Dataset,
    palette: &Palette,
    cell_px: u32,
    marker_scale: f64,
) -> Result<Legend> {
    let labels = match dataset.labels() {
        Some(labels) => labels,
        None => return Ok(Legend::default()),
    };
    let legend = Legend::from_labels(labels, palette)?;

    let (rows, cols) = index.shape();
    let (size, width) = marker_geometry(rows, cols);
    let avg_side = (raster.width() + raster.height()) as f64 * 0.5;
    let radius = (size * avg_side / 200.0 * marker_scale).max(1.0) as f32;
    let stroke = (width * avg_side / 100.0 * marker_scale).round().max(1.0) as usize;

    let half = cell_px as f32 * 0.5;
    for (idx, &label) in labels.iter().enumerate() {
        let (r, c) = match index.winner_of(idx) {
            Some(cell) => cell,
            None => continue,
        };
        let style = palette.style(label)?;
        let cx = c as f32 * cell_px as f32 + half;
        let cy = r as f32 * cell_px as f32 + half;
        for k in 0..stroke {
            let rr = radius - k as f32;
            if rr < 1.0 {
                break;
            }
            draw_marker(raster, style, cx, cy, rr);
        }
    }

    Ok(legend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageBuffer;

    fn line_map() -> Map {
        Map::from_weights(2, 2, vec![vec![0.0], vec![10.0], vec![20.0], vec![30.0]]).unwrap()
    }

    #[test]
    fn test_index_buckets_points() {
        let dataset = Dataset::with_labels(
            vec![vec![1.0], vec![29.0], vec![9.0], vec![2.0]],
            vec![0, 1, 2, 0],
        )
        .unwrap();
        let index = LabelAssociationIndex::build(&line_map(), &dataset).unwrap();

        assert_eq!(index.shape(), (2, 2));
        assert_eq!(index.cell(0, 0), &[0, 3]);
        assert_eq!(index.cell(0, 1), &[2]);
        assert!(index.cell(1, 0).is_empty());
        assert_eq!(index.cell(1, 1), &[1]);
        assert!(index.cell(5, 5).is_empty());
        assert_eq!(index.winner_of(1), Some((1, 1)));
        assert_eq!(index.total_points(), 4);
    }

    #[test]
    fn test_palette_overflow() {
        let palette = Palette::default();
        assert_eq!(palette.capacity(), 10);
        assert_eq!(palette.style(9).unwrap().shape, MarkerShape::Star);
        assert!(matches!(
            palette.style(10),
            Err(InspectError::PaletteOverflow { label: 10, capacity: 10 })
        ));
    }

    #[test]
    fn test_legend_first_seen_order() {
        let legend = Legend::from_labels(&[3, 1, 3, 0, 1], &Palette::default()).unwrap();
        let labels: Vec<u8> = legend.entries().iter().map(|(l, _)| *l).collect();
        assert_eq!(labels, vec![3, 1, 0]);
    }

    #[test]
    fn test_legend_json() {
        let legend = Legend::from_labels(&[9, 0, 9], &Palette::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&legend.to_json().unwrap()).unwrap();

        assert_eq!(value[0]["label"], 9);
        assert_eq!(value[0]["marker"], "star");
        assert_eq!(value[1]["label"], 0);
        assert_eq!(value[1]["marker"], "circle");
        assert_eq!(value[1]["color"], serde_json::json!([255, 0, 0]));
        assert_eq!(value.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_marker_geometry() {
        let (size, width) = marker_geometry(10, 10);
        assert!((size - 5.0).abs() < 1e-12);
        assert!((width - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_overlay_draws_in_winning_cell() {
        let dataset = Dataset::with_labels(vec![vec![29.0]], vec![0]).unwrap();
        let index = LabelAssociationIndex::build(&line_map(), &dataset).unwrap();
        let mut raster: RgbImage = ImageBuffer::from_pixel(40, 40, Rgb([255, 255, 255]));

        let legend = draw_overlay(&mut raster, &index, &dataset, &Palette::default(), 20, 1.0).unwrap();
        assert_eq!(legend.entries().len(), 1);

        let red = Rgb([255, 0, 0]);
        let in_cell = |x0: u32, y0: u32| {
            (x0..x0 + 20).any(|x| (y0..y0 + 20).any(|y| raster.get_pixel(x, y) == &red))
        };
        assert!(in_cell(20, 20));
        assert!(!in_cell(0, 0));
    }

    #[test]
    fn test_overlay_rejects_overflowing_label() {
        let dataset = Dataset::with_labels(vec![vec![0.0]], vec![12]).unwrap();
        let index = LabelAssociationIndex::build(&line_map(), &dataset).unwrap();
        let mut raster: RgbImage = ImageBuffer::new(40, 40);
        let result = draw_overlay(&mut raster, &index, &dataset, &Palette::default(), 20, 1.0);
        assert!(matches!(result, Err(InspectError::PaletteOverflow { .. })));
    }

    #[test]
    fn test_unlabelled_overlay_is_empty() {
        let dataset = Dataset::new(vec![vec![0.0]]).unwrap();
        let index = LabelAssociationIndex::build(&line_map(), &dataset).unwrap();
        let mut raster: RgbImage = ImageBuffer::new(40, 40);
        let legend = draw_overlay(&mut raster, &index, &dataset, &Palette::default(), 20, 1.0).unwrap();
        assert!(legend.is_empty());
    }
}
