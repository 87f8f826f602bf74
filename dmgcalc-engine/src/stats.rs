//! Reduction of per-round damage samples into summary statistics.
use serde::{Deserialize, Serialize};

use crate::constants::{P25, P50, P75, P90, P95};
use crate::numbers::{ceil_to_index, floor_to_index, usize_to_f64};

/// Mean and reported percentiles of one sorted sample set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleSummary {
    pub average: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
}

/// Per-level simulation output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelStats {
    pub level_number: u32,
    pub average: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
    /// Iterations that actually ran; lower than requested when a deadline hit.
    #[serde(default)]
    pub iterations: u32,
}

impl LevelStats {
    /// Sort the raw samples in place and summarize them.
    #[must_use]
    pub fn from_samples(level_number: u32, iterations: u32, samples: &mut [f64]) -> Self {
        samples.sort_unstable_by(f64::total_cmp);
        Self::from_summary(level_number, iterations, summarize(samples))
    }

    #[must_use]
    pub const fn from_summary(level_number: u32, iterations: u32, summary: SampleSummary) -> Self {
        Self {
            level_number,
            average: summary.average,
            p25: summary.p25,
            p50: summary.p50,
            p75: summary.p75,
            p90: summary.p90,
            p95: summary.p95,
            iterations,
        }
    }

    #[must_use]
    pub const fn summary(&self) -> SampleSummary {
        SampleSummary {
            average: self.average,
            p25: self.p25,
            p50: self.p50,
            p75: self.p75,
            p90: self.p90,
            p95: self.p95,
        }
    }
}

/// Summarize an ascending sample slice. Empty input yields all zeros.
#[must_use]
pub fn summarize(sorted: &[f64]) -> SampleSummary {
    SampleSummary {
        average: mean(sorted),
        p25: percentile(sorted, P25),
        p50: percentile(sorted, P50),
        p75: percentile(sorted, P75),
        p90: percentile(sorted, P90),
        p95: percentile(sorted, P95),
    }
}

/// Arithmetic mean, 0 for an empty slice.
#[must_use]
pub fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / usize_to_f64(samples.len())
}

/// Linearly interpolated percentile at fractional rank `p * (n - 1)`.
#[must_use]
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted {
        [] => 0.0,
        [single] => *single,
        _ => {
            let last = sorted.len() - 1;
            let rank = p.clamp(0.0, 1.0) * usize_to_f64(last);
            let lower = floor_to_index(rank).min(last);
            let upper = ceil_to_index(rank).min(last);
            if lower == upper {
                return sorted[lower];
            }
            let fraction = rank - usize_to_f64(lower);
            sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
        }
    }
}
