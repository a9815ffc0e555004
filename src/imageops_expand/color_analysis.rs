use crate::imageops_expand::config::Edge;
use crate::Image;
use image::Rgba;
use imageproc::rect::Rect;
use itertools::{iproduct, Itertools};
use std::cmp::Reverse;
use std::collections::HashMap;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Histogram bucket width per channel.
const QUANTIZATION_STEP: u8 = 8;

/// An axis-aligned sampling rectangle.
///
/// The size is signed so that inverted rectangles can be expressed; those
/// select no pixels at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A region with positive width and height.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Intersects the region with an image of the given size.
    ///
    /// Returns `None` for an invalid region, an empty image, or when the
    /// two do not overlap.
    pub fn clip(&self, width: u32, height: u32) -> Option<Rect> {
        if width == 0 || height == 0 {
            return None;
        }

        let max_side = i32::MAX.unsigned_abs();
        let bounds = Rect::at(0, 0).of_size(width.min(max_side), height.min(max_side));
        self.to_rect()?.intersect(bounds)
    }

    /// The region as a `Rect`, with the part left of or above the origin
    /// dropped and the far edge capped so `Rect::right`/`Rect::bottom`
    /// stay within `i32`. Neither trim changes any overlap with an image.
    fn to_rect(&self) -> Option<Rect> {
        if !self.is_valid() {
            return None;
        }

        let axis = |origin: i32, len: i32| {
            let near = origin.max(0);
            let far = (i64::from(origin) + i64::from(len)).min(i64::from(i32::MAX));
            (far > i64::from(near)).then(|| (near, (far - i64::from(near)) as u32))
        };
        let (x, width) = axis(self.x, self.width)?;
        let (y, height) = axis(self.y, self.height)?;
        Some(Rect::at(x, y).of_size(width, height))
    }

    /// The one-pixel-wide strip along `edge` of a `width` x `height` image.
    pub fn edge(edge: Edge, width: u32, height: u32) -> Self {
        let w = i32::try_from(width).unwrap_or(i32::MAX);
        let h = i32::try_from(height).unwrap_or(i32::MAX);
        match edge {
            Edge::Top => Self::new(0, 0, w, 1),
            Edge::Bottom => Self::new(0, h - 1, w, 1),
            Edge::Left => Self::new(0, 0, 1, h),
            Edge::Right => Self::new(w - 1, 0, 1, h),
        }
    }
}

/// Collects the pixels of `region`, row by row.
///
/// `None` selects the whole image. A region that lies outside the image,
/// or an empty image, yields no pixels.
pub fn extract_region(image: &Image<Rgba<u8>>, region: Option<Region>) -> Vec<Rgba<u8>> {
    let (width, height) = image.dimensions();
    let region = region.unwrap_or_else(|| Region::new(0, 0, i32::MAX, i32::MAX));
    let Some(rect) = region.clip(width, height) else {
        return Vec::new();
    };

    let (left, top) = (rect.left() as u32, rect.top() as u32);
    iproduct!(top..top + rect.height(), left..left + rect.width())
        .map(|(y, x)| *image.get_pixel(x, y))
        .collect()
}

/// Most frequent color after quantizing each channel to 32 levels.
///
/// Alpha is ignored and the result is opaque. Ties go to the color seen
/// first. Returns `None` for an empty slice.
pub fn dominant_color(pixels: &[Rgba<u8>]) -> Option<Rgba<u8>> {
    let mut index: HashMap<[u8; 3], usize> = HashMap::new();
    let mut buckets: Vec<([u8; 3], usize)> = Vec::new();

    for &Rgba([r, g, b, _]) in pixels {
        let key = [quantize(r), quantize(g), quantize(b)];
        let slot = *index.entry(key).or_insert_with(|| {
            buckets.push((key, 0));
            buckets.len() - 1
        });
        buckets[slot].1 += 1;
    }

    let best = buckets
        .iter()
        .position_min_by_key(|&&(_, count)| Reverse(count))?;
    let [r, g, b] = buckets[best].0;
    Some(Rgba([r, g, b, u8::MAX]))
}

/// Per-channel arithmetic mean, truncated. Returns `None` for an empty slice.
pub fn average_color(pixels: &[Rgba<u8>]) -> Option<Rgba<u8>> {
    if pixels.is_empty() {
        return None;
    }

    let totals = channel_totals(pixels);
    let count = pixels.len() as u64;
    let [r, g, b, a] = totals.map(|total| (total / count) as u8);
    Some(Rgba([r, g, b, a]))
}

/// Average color of the outermost row or column on `edge`.
pub fn edge_color(image: &Image<Rgba<u8>>, edge: Edge) -> Option<Rgba<u8>> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return None;
    }
    average_color(&extract_region(image, Some(Region::edge(edge, width, height))))
}

fn quantize(channel: u8) -> u8 {
    (channel / QUANTIZATION_STEP) * QUANTIZATION_STEP
}

fn add_pixel(mut totals: [u64; 4], pixel: &Rgba<u8>) -> [u64; 4] {
    for (total, &channel) in totals.iter_mut().zip(pixel.0.iter()) {
        *total += u64::from(channel);
    }
    totals
}

#[cfg(not(feature = "rayon"))]
fn channel_totals(pixels: &[Rgba<u8>]) -> [u64; 4] {
    pixels.iter().fold([0; 4], add_pixel)
}

#[cfg(feature = "rayon")]
fn channel_totals(pixels: &[Rgba<u8>]) -> [u64; 4] {
    pixels
        .par_iter()
        .fold(|| [0; 4], add_pixel)
        .reduce(
            || [0; 4],
            |mut a, b| {
                for (x, y) in a.iter_mut().zip(b) {
                    *x += y;
                }
                a
            },
        )
}

/// Color sampling on RGBA images.
pub trait ColorAnalysis {
    /// Dominant color of `region`, or of the whole image for `None`.
    fn dominant_color(&self, region: Option<Region>) -> Option<Rgba<u8>>;

    /// Average color of `region`, or of the whole image for `None`.
    fn average_color(&self, region: Option<Region>) -> Option<Rgba<u8>>;

    /// Average color of the one-pixel strip along `edge`.
    fn edge_color(&self, edge: Edge) -> Option<Rgba<u8>>;
}

impl ColorAnalysis for Image<Rgba<u8>> {
    fn dominant_color(&self, region: Option<Region>) -> Option<Rgba<u8>> {
        dominant_color(&extract_region(self, region))
    }

    fn average_color(&self, region: Option<Region>) -> Option<Rgba<u8>> {
        average_color(&extract_region(self, region))
    }

    fn edge_color(&self, edge: Edge) -> Option<Rgba<u8>> {
        edge_color(self, edge)
    }
}
