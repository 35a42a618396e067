//! Interpolation helpers and color-stop lookup

pub fn clamp01(x: f32) -> f32 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

/// Linear interpolation between two floats
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Linear interpolation between two RGB triples, `t` clamped to [0, 1]
pub fn lerp_rgb(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    let t = clamp01(t);
    [
        lerp_f32(a[0], b[0], t),
        lerp_f32(a[1], b[1], t),
        lerp_f32(a[2], b[2], t),
    ]
}

/// Find the pair of stops bracketing `t` and the local blend factor between them.
///
/// `stops` must be sorted by `position`. Values outside the stop range clamp
/// to the first/last stop. Returns `None` for an empty slice.
pub fn bracket<T>(stops: &[T], position: impl Fn(&T) -> f32, t: f32) -> Option<(&T, &T, f32)> {
    let first = stops.first()?;
    let last = stops.last()?;
    if t <= position(first) {
        return Some((first, first, 0.0));
    }
    if t >= position(last) {
        return Some((last, last, 0.0));
    }
    for pair in stops.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let (pa, pb) = (position(a), position(b));
        if t <= pb {
            let span = pb - pa;
            let local = if span > 1e-6 { (t - pa) / span } else { 1.0 };
            return Some((a, b, clamp01(local)));
        }
    }
    Some((last, last, 0.0))
}

/// Sample an RGB gradient defined by `(position, color)` stops
pub fn sample_rgb(stops: &[(f32, [f32; 3])], t: f32) -> [f32; 3] {
    match bracket(stops, |s| s.0, t) {
        Some((a, b, local)) => lerp_rgb(a.1, b.1, local),
        None => [0.0; 3],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_f32_endpoints() {
        assert!((lerp_f32(0.0, 10.0, 0.0) - 0.0).abs() < 1e-6);
        assert!((lerp_f32(0.0, 10.0, 1.0) - 10.0).abs() < 1e-6);
        assert!((lerp_f32(0.0, 10.0, 0.5) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn lerp_rgb_clamps_t() {
        let white = [1.0, 1.0, 1.0];
        let black = [0.0, 0.0, 0.0];
        assert_eq!(lerp_rgb(white, black, 2.0), black);
        assert_eq!(lerp_rgb(white, black, -1.0), white);
        let mid = lerp_rgb(white, black, 0.5);
        for c in &mid {
            assert!((*c - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn gradient_samples_between_stops() {
        let stops = [
            (0.0, [1.0, 0.0, 0.0]),
            (0.5, [0.0, 1.0, 0.0]),
            (1.0, [0.0, 0.0, 1.0]),
        ];
        assert_eq!(sample_rgb(&stops, 0.0), [1.0, 0.0, 0.0]);
        assert_eq!(sample_rgb(&stops, 0.5), [0.0, 1.0, 0.0]);
        assert_eq!(sample_rgb(&stops, 1.0), [0.0, 0.0, 1.0]);
        let q = sample_rgb(&stops, 0.75);
        assert!((q[1] - 0.5).abs() < 1e-6 && (q[2] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn gradient_clamps_outside_range() {
        let stops = [(0.2, [0.2; 3]), (0.8, [0.8; 3])];
        assert_eq!(sample_rgb(&stops, -5.0), [0.2; 3]);
        assert_eq!(sample_rgb(&stops, 5.0), [0.8; 3]);
        assert_eq!(sample_rgb(&[], 0.5), [0.0; 3]);
    }

    #[test]
    fn single_stop_is_constant() {
        let stops = [(0.5, [0.3, 0.4, 0.5])];
        assert_eq!(sample_rgb(&stops, 0.0), [0.3, 0.4, 0.5]);
        assert_eq!(sample_rgb(&stops, 1.0), [0.3, 0.4, 0.5]);
    }
}
