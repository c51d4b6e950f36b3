use rand::Rng;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Simulated k-space filling for Cartesian LUTs
// ---------------------------------------------------------------------------

/// Normalized histogram of how often each k-line gets acquired when views
/// are drawn uniformly at random from the LUT (retrospective gating).
#[derive(Debug, Clone)]
pub struct FillingProfile {
    /// Fraction of draws per k-line, index 0 ↔ line `-size/2`.
    pub density: Vec<f64>,
    pub samples: usize,
}

/// Summary statistics of a [`FillingProfile`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FillingSummary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub std: f64,
    /// Mean centre filling over mean edge filling. `None` when either
    /// region is empty or the edges were never hit.
    pub center_edge_ratio: Option<f64>,
}

/// Draw `n_samples` random views from `order` and histogram the k-lines.
pub fn simulate<R: Rng + ?Sized>(
    order: &[i32],
    target_size: usize,
    n_samples: usize,
    rng: &mut R,
) -> FillingProfile {
    let mut counts = vec![0usize; target_size];
    if !order.is_empty() {
        let half = (target_size / 2) as i64;
        for _ in 0..n_samples {
            let view = order[rng.random_range(0..order.len())];
            let index = view as i64 + half;
            if (0..target_size as i64).contains(&index) {
                counts[index as usize] += 1;
            }
        }
    }

    let total: usize = counts.iter().sum();
    let density = if total == 0 {
        vec![0.0; target_size]
    } else {
        counts.iter().map(|&c| c as f64 / total as f64).collect()
    };
    FillingProfile {
        density,
        samples: n_samples,
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

impl FillingProfile {
    pub fn summary(&self) -> FillingSummary {
        let d = &self.density;
        let size = d.len();
        let mean_all = mean(d.iter().copied()).unwrap_or(0.0);
        let min = d.iter().copied().fold(f64::INFINITY, f64::min);
        let max = d.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let var = mean(d.iter().map(|v| (v - mean_all).powi(2))).unwrap_or(0.0);

        // Centre: the middle 20 % of lines. Edges: the outer 10 % on each side.
        let center_width = (0.2 * size as f64) as usize;
        let center_start = size / 2 - center_width / 2;
        let center = mean(d[center_start..center_start + center_width].iter().copied());

        let edge_width = (0.1 * size as f64) as usize;
        let edge_tail = (0.9 * size as f64) as usize;
        let edge = mean(d[..edge_width].iter().chain(&d[edge_tail..]).copied());

        let center_edge_ratio = match (center, edge) {
            (Some(c), Some(e)) if e > 0.0 => Some(c / e),
            _ => None,
        };

        FillingSummary {
            mean: mean_all,
            min: if size == 0 { 0.0 } else { min },
            max: if size == 0 { 0.0 } else { max },
            std: var.sqrt(),
            center_edge_ratio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn density_is_normalized() {
        let mut rng = StdRng::seed_from_u64(11);
        let order: Vec<i32> = (-8..8).collect();
        let fill = simulate(&order, 16, 5_000, &mut rng);
        assert_eq!(fill.density.len(), 16);
        assert_relative_eq!(fill.density.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert!(fill.density.iter().all(|&v| v > 0.0));
    }

    #[test]
    fn repeated_lines_fill_faster() {
        let mut rng = StdRng::seed_from_u64(5);
        // Line 0 appears nine times, every other line once.
        let mut order: Vec<i32> = (-10..10).collect();
        order.extend(std::iter::repeat(0).take(8));
        let fill = simulate(&order, 20, 50_000, &mut rng);
        let s = fill.summary();
        assert_eq!(s.max, fill.density[10]);
        assert!(s.center_edge_ratio.unwrap() > 1.5);
    }

    #[test]
    fn no_samples_gives_flat_zero() {
        let mut rng = StdRng::seed_from_u64(0);
        let fill = simulate(&[0, 1], 4, 0, &mut rng);
        assert_eq!(fill.density, vec![0.0; 4]);
        let s = fill.summary();
        assert_eq!(s.mean, 0.0);
        assert_eq!(s.center_edge_ratio, None);
    }
}
