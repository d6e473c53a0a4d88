//! Continuous red → yellow → green color scale.

use image::Rgb;

/// ColorBrewer RdYlGn, 11 classes, low to high.
const RD_YL_GN: [[u8; 3]; 11] = [
    [165, 0, 38],
    [215, 48, 39],
    [244, 109, 67],
    [253, 174, 97],
    [254, 224, 139],
    [255, 255, 191],
    [217, 239, 139],
    [166, 217, 106],
    [102, 189, 99],
    [26, 152, 80],
    [0, 104, 55],
];

/// Color for an availability ratio on the fixed `[0, 1]` range.
///
/// Values outside the range saturate to the end colors; this affects the
/// marker color only, never the ratio itself.
pub fn ratio_color(ratio: f64) -> Rgb<u8> {
    let t = if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) };

    let last = RD_YL_GN.len() - 1;
    let pos = t * last as f64;
    let lower = (pos.floor() as usize).min(last);
    let upper = (lower + 1).min(last);
    let frac = pos - lower as f64;

    let lo = RD_YL_GN[lower];
    let hi = RD_YL_GN[upper];
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;

    Rgb([mix(lo[0], hi[0]), mix(lo[1], hi[1]), mix(lo[2], hi[2])])
}
