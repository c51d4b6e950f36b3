use std::ops::Neg;

// ---------------------------------------------------------------------------
// Quarter-turn rotation
// ---------------------------------------------------------------------------

/// Rotate `(x, y)` counter-clockwise by `90 * k` degrees about the origin.
///
/// Uses the closed-form quadrant mapping, so integer inputs come back
/// exactly and `k = 4` is the identity.
pub fn rotate90<T>(x: T, y: T, k: i32) -> (T, T)
where
    T: Copy + Neg<Output = T>,
{
    match k.rem_euclid(4) {
        0 => (x, y),
        1 => (-y, x),
        2 => (-x, -y),
        _ => (y, -x),
    }
}

// ---------------------------------------------------------------------------
// Liang–Barsky clipping
// ---------------------------------------------------------------------------

/// Axis-aligned clip rectangle, bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipRect {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl ClipRect {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }
}

/// A straight piece of a polyline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: [f64; 2],
    pub end: [f64; 2],
}

/// Clip the segment `a → b` against `rect`.
///
/// Returns `None` when no part of the segment lies inside. Endpoints that
/// are already inside are returned bit-for-bit.
pub fn clip_segment(a: [f64; 2], b: [f64; 2], rect: &ClipRect) -> Option<Segment> {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];

    let p = [-dx, dx, -dy, dy];
    let q = [
        a[0] - rect.x_min,
        rect.x_max - a[0],
        a[1] - rect.y_min,
        rect.y_max - a[1],
    ];

    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;

    for (&pi, &qi) in p.iter().zip(q.iter()) {
        if pi == 0.0 {
            // Parallel to this edge: outside means nothing survives.
            if qi < 0.0 {
                return None;
            }
            continue;
        }
        let r = qi / pi;
        if pi < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let start = if t0 == 0.0 {
        a
    } else {
        [a[0] + t0 * dx, a[1] + t0 * dy]
    };
    let end = if t1 == 1.0 {
        b
    } else {
        [a[0] + t1 * dx, a[1] + t1 * dy]
    };
    Some(Segment { start, end })
}

/// Clip every segment of `points` against `rect`, dropping the ones that
/// are entirely outside.
pub fn clip_polyline(points: &[[f64; 2]], rect: &ClipRect) -> Vec<Segment> {
    points
        .windows(2)
        .filter_map(|w| clip_segment(w[0], w[1], rect))
        .collect()
}
