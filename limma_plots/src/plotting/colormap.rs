use plotters::style::RGBColor;

const GIST_RAINBOW: [(f64, [f64; 3]); 8] = [
    (0.000, [1.00, 0.00, 0.16]),
    (0.030, [1.00, 0.00, 0.00]),
    (0.215, [1.00, 1.00, 0.00]),
    (0.400, [0.00, 1.00, 0.00]),
    (0.586, [0.00, 1.00, 1.00]),
    (0.770, [0.00, 0.00, 1.00]),
    (0.954, [1.00, 0.00, 1.00]),
    (1.000, [1.00, 0.00, 0.75]),
];

// ColorBrewer YlGnBu, 9 classes
const YL_GN_BU: [(f64, [f64; 3]); 9] = [
    (0.000, [1.000, 1.000, 0.851]),
    (0.125, [0.929, 0.973, 0.694]),
    (0.250, [0.780, 0.914, 0.706]),
    (0.375, [0.498, 0.804, 0.733]),
    (0.500, [0.255, 0.714, 0.769]),
    (0.625, [0.114, 0.569, 0.753]),
    (0.750, [0.133, 0.369, 0.659]),
    (0.875, [0.145, 0.204, 0.580]),
    (1.000, [0.031, 0.114, 0.345]),
];

pub const MISSING: RGBColor = RGBColor(211, 211, 211);

fn interpolate(stops: &[(f64, [f64; 3])], x: f64) -> RGBColor {
    let x = if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) };
    let upper = stops
        .iter()
        .position(|(pos, _)| *pos >= x)
        .unwrap_or(stops.len() - 1)
        .max(1);
    let (p0, c0) = stops[upper - 1];
    let (p1, c1) = stops[upper];
    let t = if p1 > p0 { (x - p0) / (p1 - p0) } else { 0.0 };

    let channel = |i: usize| ((c0[i] + (c1[i] - c0[i]) * t) * 255.0).round() as u8;
    RGBColor(channel(0), channel(1), channel(2))
}

pub fn gist_rainbow(x: f64) -> RGBColor {
    interpolate(&GIST_RAINBOW, x)
}

pub fn yl_gn_bu(x: f64) -> RGBColor {
    interpolate(&YL_GN_BU, x)
}

/// One colour per bar walking the rainbow in equal steps, last bar first.
pub fn reversed_rainbow(n: usize) -> Vec<RGBColor> {
    let step = if n == 0 { 0.0 } else { 1.0 / n as f64 };
    (0..n).rev().map(|i| gist_rainbow(i as f64 * step)).collect()
}

/// Maps `value` from `[lo, hi]` onto the heatmap colour scale.
pub fn heat(value: Option<f64>, lo: f64, hi: f64) -> RGBColor {
    match value {
        None => MISSING,
        Some(v) if hi > lo => yl_gn_bu((v - lo) / (hi - lo)),
        Some(_) => yl_gn_bu(0.5),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_endpoints() {
        assert_eq!(gist_rainbow(0.0), RGBColor(255, 0, 41));
        assert_eq!(gist_rainbow(1.0), RGBColor(255, 0, 191));
        assert_eq!(yl_gn_bu(0.0), RGBColor(255, 255, 217));
        assert_eq!(yl_gn_bu(1.0), RGBColor(8, 29, 88));
    }

    #[test]
    fn out_of_range_is_clamped() {
        assert_eq!(yl_gn_bu(-3.0), yl_gn_bu(0.0));
        assert_eq!(yl_gn_bu(7.0), yl_gn_bu(1.0));
    }

    #[test]
    fn palette_is_reversed() {
        let p = reversed_rainbow(4);
        assert_eq!(p.len(), 4);
        assert_eq!(p[3], gist_rainbow(0.0));
        assert_eq!(p[0], gist_rainbow(0.75));
        assert!(reversed_rainbow(0).is_empty());
    }

    #[test]
    fn absent_cells_are_grey() {
        assert_eq!(heat(None, 0.0, 100.0), MISSING);
        assert_eq!(heat(Some(100.0), 0.0, 100.0), yl_gn_bu(1.0));
    }
}
