use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use rusty_kspace::trajectory::coverage::hit_counts;
use rusty_kspace::trajectory::GridPoint;

/// Most distinct colour levels shown; higher counts share the last one.
const MAX_LEVELS: usize = 12;

// ---------------------------------------------------------------------------
// Color ramp generator
// ---------------------------------------------------------------------------

/// `n` colours running from cold (blue, few samples) to hot (red).
pub fn generate_ramp(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let frac = if n == 1 { 0.0 } else { i as f32 / (n - 1) as f32 };
            let hue = 240.0 * (1.0 - frac);
            let hsl = Hsl::new(hue, 0.8, 0.5);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Heat map: samples per position → Color32
// ---------------------------------------------------------------------------

/// Maps a per-position sample count to a colour level.
#[derive(Debug, Clone)]
pub struct HeatMap {
    max_count: usize,
    ramp: Vec<Color32>,
}

impl HeatMap {
    /// Scale the ramp to the busiest position of the finished cloud.
    pub fn for_points(points: &[GridPoint]) -> Self {
        let max_count = hit_counts(points).into_values().max().unwrap_or(1);
        Self {
            max_count,
            ramp: generate_ramp(max_count.min(MAX_LEVELS)),
        }
    }

    pub fn levels(&self) -> usize {
        self.ramp.len()
    }

    /// Level index (0-based) for `count ≥ 1` samples.
    pub fn level_for(&self, count: usize) -> usize {
        let levels = self.levels();
        if levels <= 1 || self.max_count <= 1 {
            return 0;
        }
        let frac = (count.saturating_sub(1)) as f64 / (self.max_count - 1) as f64;
        ((frac * (levels - 1) as f64).round() as usize).min(levels - 1)
    }

    pub fn color_for_level(&self, level: usize) -> Color32 {
        self.ramp.get(level).copied().unwrap_or(Color32::GRAY)
    }

    /// Legend label of a level, e.g. `"3 samples"` or `"5-7 samples"`.
    pub fn level_label(&self, level: usize) -> String {
        let counts: Vec<usize> = (1..=self.max_count)
            .filter(|&c| self.level_for(c) == level)
            .collect();
        match (counts.first().copied(), counts.last().copied()) {
            (Some(1), Some(1)) => "1 sample".to_string(),
            (Some(lo), Some(hi)) if lo == hi => format!("{lo} samples"),
            (Some(lo), Some(hi)) => format!("{lo}-{hi} samples"),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_runs_blue_to_red() {
        let ramp = generate_ramp(3);
        assert_eq!(ramp.len(), 3);
        assert!(ramp[0].b() > ramp[0].r());
        assert!(ramp[2].r() > ramp[2].b());
    }

    #[test]
    fn levels_cover_all_counts() {
        let mut pts = vec![GridPoint::new(0, 0); 30];
        pts.push(GridPoint::new(1, 1));
        let heat = HeatMap::for_points(&pts);
        assert_eq!(heat.levels(), MAX_LEVELS);
        assert_eq!(heat.level_for(1), 0);
        assert_eq!(heat.level_for(30), MAX_LEVELS - 1);
        assert_eq!(heat.level_label(0), "1-2 samples");
    }

    #[test]
    fn single_sample_cloud_has_one_level() {
        let heat = HeatMap::for_points(&[GridPoint::new(0, 0), GridPoint::new(1, 0)]);
        assert_eq!(heat.levels(), 1);
        assert_eq!(heat.level_for(1), 0);
        assert_eq!(heat.level_label(0), "1 sample");
    }
}
