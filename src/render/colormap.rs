//! Colormaps and conversion of weight images to RGB rasters.

use crate::render::WeightImage;
use image::{ImageBuffer, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

/// Colormap used to display weight images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Colormap {
    /// Reversed "bone": low values white, high values dark blue-grey.
    #[default]
    BoneReversed,
    /// Linear grey ramp, black to white.
    Gray,
    /// Viridis approximation (purple to yellow).
    Viridis,
}

// (x, y) control points of matplotlib's "bone" segment data.
const BONE_RED: &[(f64, f64)] = &[(0.0, 0.0), (0.746032, 0.652778), (1.0, 1.0)];
const BONE_GREEN: &[(f64, f64)] = &[
    (0.0, 0.0),
    (0.365079, 0.319444),
    (0.746032, 0.777778),
    (1.0, 1.0),
];
const BONE_BLUE: &[(f64, f64)] = &[(0.0, 0.0), (0.365079, 0.444444), (1.0, 1.0)];

fn piecewise(points: &[(f64, f64)], t: f64) -> f64 {
    for pair in points.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if t <= x1 {
            return y0 + (t - x0) / (x1 - x0) * (y1 - y0);
        }
    }
    points.last().map(|&(_, y)| y).unwrap_or(0.0)
}

fn to_channel(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

impl Colormap {
    /// Maps a value in `[0, 1]` to a colour. Out-of-range values are clamped.
    pub fn color(self, t: f64) -> Rgb<u8> {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Colormap::BoneReversed => {
                let u = 1.0 - t;
                Rgb([
                    to_channel(piecewise(BONE_RED, u)),
                    to_channel(piecewise(BONE_GREEN, u)),
                    to_channel(piecewise(BONE_BLUE, u)),
                ])
            }
            Colormap::Gray => {
                let v = to_channel(t);
                Rgb([v, v, v])
            }
            Colormap::Viridis => {
                let r = 0.267 + t * (0.329 - 0.267 + t * (0.984 - 0.329));
                let g = 0.005 + t * (0.569 - 0.005 + t * (0.906 - 0.569));
                let b = 0.329 + t * (0.758 - 0.329 - t * (0.758 - 0.121));
                Rgb([to_channel(r), to_channel(g), to_channel(b)])
            }
        }
    }
}

/// Converts a weight image into an RGB raster.
///
/// Values are min-max normalised over the image; a constant image maps to
/// the colormap midpoint. Each weight pixel becomes a `scale x scale` square.
pub fn to_raster(image: &WeightImage, colormap: Colormap, scale: u32) -> RgbImage {
    let scale = scale.max(1);
    let (lo, hi) = image.value_range().unwrap_or((0.0, 0.0));
    let span = hi - lo;
    let pixels = image.pixels();

    let width = image.width() as u32 * scale;
    let height = image.height() as u32 * scale;

    ImageBuffer::from_fn(width, height, |x, y| {
        let v = pixels[[(y / scale) as usize, (x / scale) as usize]];
        let t = if span > f64::EPSILON { (v - lo) / span } else { 0.5 };
        colormap.color(t)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::render_weights;
    use crate::som::Map;

    #[test]
    fn test_bone_reversed_endpoints() {
        assert_eq!(Colormap::BoneReversed.color(0.0), Rgb([255, 255, 255]));
        assert_eq!(Colormap::BoneReversed.color(1.0), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_gray_ramp() {
        assert_eq!(Colormap::Gray.color(0.0), Rgb([0, 0, 0]));
        assert_eq!(Colormap::Gray.color(1.0), Rgb([255, 255, 255]));
        assert_eq!(Colormap::Gray.color(2.0), Rgb([255, 255, 255]));
    }

    #[test]
    fn test_raster_scale_and_contrast() {
        let map = Map::from_weights(1, 2, vec![vec![0.0], vec![1.0]]).unwrap();
        let image = render_weights(&map).unwrap();
        let raster = to_raster(&image, Colormap::Gray, 3);

        assert_eq!(raster.dimensions(), (6, 3));
        assert_eq!(raster.get_pixel(2, 2), &Rgb([0, 0, 0]));
        assert_eq!(raster.get_pixel(3, 0), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_constant_image_uses_midpoint() {
        let map = Map::from_weights(1, 1, vec![vec![4.0; 4]]).unwrap();
        let raster = to_raster(&render_weights(&map).unwrap(), Colormap::Gray, 1);
        assert_eq!(raster.get_pixel(0, 0), &Rgb([128, 128, 128]));
    }
}
