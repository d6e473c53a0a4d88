//! Rasterized station map.
//!
//! An equirectangular projection fitted to the plotted stations, a light
//! graticule as background, and one disc per station colored by its
//! availability ratio.

use image::{Rgb, RgbImage};

use crate::domain::StationRecord;

use super::color::ratio_color;

/// Extent shown when there is nothing to plot (central Paris).
const DEFAULT_CENTER: (f64, f64) = (48.8566, 2.3522);
const DEFAULT_HALF_SPAN: (f64, f64) = (0.12, 0.18);

/// Smallest extent in degrees, so a single station does not zoom forever.
const MIN_SPAN_DEG: f64 = 0.01;

const MARGIN_PX: f64 = 40.0;
const MARKER_RADIUS_PX: f64 = 6.0;
const GRATICULE_STEP_DEG: f64 = 0.05;
const MAX_GRATICULE_LINES: f64 = 400.0;

const LAND: Rgb<u8> = Rgb([232, 229, 224]);
const GRATICULE: Rgb<u8> = Rgb([212, 208, 202]);
const MARKER_OUTLINE: Rgb<u8> = Rgb([70, 70, 70]);

/// Geographic bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Extent {
    /// Smallest extent containing `points` (lat, lon), widened to at least
    /// [`MIN_SPAN_DEG`] on each axis. Falls back to a fixed extent when
    /// there are no points.
    pub fn around(points: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let mut extent: Option<Extent> = None;

        for (lat, lon) in points {
            extent = Some(match extent {
                None => Extent {
                    min_lat: lat,
                    max_lat: lat,
                    min_lon: lon,
                    max_lon: lon,
                },
                Some(e) => Extent {
                    min_lat: e.min_lat.min(lat),
                    max_lat: e.max_lat.max(lat),
                    min_lon: e.min_lon.min(lon),
                    max_lon: e.max_lon.max(lon),
                },
            });
        }

        let Some(mut extent) = extent else {
            let (lat, lon) = DEFAULT_CENTER;
            let (half_lat, half_lon) = DEFAULT_HALF_SPAN;
            return Extent {
                min_lat: lat - half_lat,
                max_lat: lat + half_lat,
                min_lon: lon - half_lon,
                max_lon: lon + half_lon,
            };
        };

        widen(&mut extent.min_lat, &mut extent.max_lat);
        widen(&mut extent.min_lon, &mut extent.max_lon);
        extent
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }
}

fn widen(min: &mut f64, max: &mut f64) {
    let span = *max - *min;
    if span < MIN_SPAN_DEG {
        let pad = (MIN_SPAN_DEG - span) / 2.0;
        *min -= pad;
        *max += pad;
    }
}

/// Maps (lat, lon) to pixel coordinates for a fixed image size.
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    center_lat: f64,
    center_lon: f64,
    cos_lat: f64,
    /// Pixels per (longitude-corrected) degree.
    scale: f64,
    width: f64,
    height: f64,
}

impl Projection {
    /// Fit `extent` inside an image, keeping a margin and the aspect ratio.
    pub fn fit(extent: &Extent, width: u32, height: u32) -> Self {
        let (center_lat, center_lon) = extent.center();
        let cos_lat = center_lat.to_radians().cos().abs().max(0.01);

        let span_x = (extent.max_lon - extent.min_lon) * cos_lat;
        let span_y = extent.max_lat - extent.min_lat;
        let avail_w = (width as f64 - 2.0 * MARGIN_PX).max(1.0);
        let avail_h = (height as f64 - 2.0 * MARGIN_PX).max(1.0);
        let scale = (avail_w / span_x).min(avail_h / span_y);

        Self {
            center_lat,
            center_lon,
            cos_lat,
            scale,
            width: width as f64,
            height: height as f64,
        }
    }

    /// Pixel position of a coordinate; may fall outside the image.
    pub fn project(&self, lat: f64, lon: f64) -> (f64, f64) {
        let x = self.width / 2.0 + (lon - self.center_lon) * self.cos_lat * self.scale;
        let y = self.height / 2.0 - (lat - self.center_lat) * self.scale;
        (x, y)
    }

    /// Latitude and longitude ranges visible in the image.
    fn visible(&self) -> Extent {
        let half_lat = self.height / 2.0 / self.scale;
        let half_lon = self.width / 2.0 / (self.scale * self.cos_lat);
        Extent {
            min_lat: self.center_lat - half_lat,
            max_lat: self.center_lat + half_lat,
            min_lon: self.center_lon - half_lon,
            max_lon: self.center_lon + half_lon,
        }
    }
}

/// Render stations onto a fresh image of the given size.
///
/// Records without coordinates are skipped. Markers share one radius,
/// multiplied by each record's `size_weight`.
pub fn draw_map(records: &[StationRecord], width: u32, height: u32) -> RgbImage {
    let mut img = RgbImage::from_pixel(width, height, LAND);

    let extent = Extent::around(records.iter().filter_map(StationRecord::position));
    let projection = Projection::fit(&extent, width, height);

    draw_graticule(&mut img, &projection);

    for record in records {
        let Some((lat, lon)) = record.position() else {
            continue;
        };
        let (x, y) = projection.project(lat, lon);
        let radius = MARKER_RADIUS_PX * record.size_weight as f64;
        draw_marker(&mut img, x, y, radius, ratio_color(record.available_bikes_ratio));
    }

    img
}

fn draw_graticule(img: &mut RgbImage, projection: &Projection) {
    let visible = projection.visible();

    let lat_lines = (visible.max_lat - visible.min_lat) / GRATICULE_STEP_DEG;
    let lon_lines = (visible.max_lon - visible.min_lon) / GRATICULE_STEP_DEG;
    if lat_lines > MAX_GRATICULE_LINES || lon_lines > MAX_GRATICULE_LINES {
        return;
    }

    let mut lat = (visible.min_lat / GRATICULE_STEP_DEG).ceil() * GRATICULE_STEP_DEG;
    while lat <= visible.max_lat {
        let (_, y) = projection.project(lat, projection.center_lon);
        let y = y.round();
        if y >= 0.0 && y < img.height() as f64 {
            for x in 0..img.width() {
                img.put_pixel(x, y as u32, GRATICULE);
            }
        }
        lat += GRATICULE_STEP_DEG;
    }

    let mut lon = (visible.min_lon / GRATICULE_STEP_DEG).ceil() * GRATICULE_STEP_DEG;
    while lon <= visible.max_lon {
        let (x, _) = projection.project(projection.center_lat, lon);
        let x = x.round();
        if x >= 0.0 && x < img.width() as f64 {
            for y in 0..img.height() {
                img.put_pixel(x as u32, y, GRATICULE);
            }
        }
        lon += GRATICULE_STEP_DEG;
    }
}

/// Filled disc with a one-pixel outline.
fn draw_marker(img: &mut RgbImage, cx: f64, cy: f64, radius: f64, fill: Rgb<u8>) {
    let r = radius.ceil() as i64;
    let (cx_i, cy_i) = (cx.round() as i64, cy.round() as i64);
    let outer = radius * radius;
    let inner = (radius - 1.0).max(0.0).powi(2);

    for dy in -r..=r {
        for dx in -r..=r {
            let d2 = (dx * dx + dy * dy) as f64;
            if d2 > outer {
                continue;
            }
            let (x, y) = (cx_i + dx, cy_i + dy);
            if x < 0 || y < 0 || x >= img.width() as i64 || y >= img.height() as i64 {
                continue;
            }
            let color = if d2 > inner { MARKER_OUTLINE } else { fill };
            img.put_pixel(x as u32, y as u32, color);
        }
    }
}
