//! Per-minute arrival curve of an attendance peak.
//!
//! The curve is a Gaussian centred on the peak time,
//!
//! ```text
//! rate(m) = size / (width·√(2π)) · exp(-½·((m + ½ - peak) / width)²)
//! ```
//!
//! sampled at the middle of every minute of the event window, then scaled
//! to integers that sum to exactly `size` by the largest-remainder method.

use metro_core::{SimTime, TimeWindow};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RateCurve {
    per_minute: Vec<u32>,
}

impl RateCurve {
    pub fn gaussian(window: TimeWindow, peak: SimTime, size: u32, width_minutes: f64) -> Self {
        let minutes = ((window.duration_secs() + 59) / 60).max(1) as usize;
        let peak_minute = (peak - window.start) as f64 / 60.0;
        let height = size as f64 / (width_minutes * (2.0 * std::f64::consts::PI).sqrt());

        let raw: Vec<f64> = (0..minutes)
            .map(|m| {
                let z = (m as f64 + 0.5 - peak_minute) / width_minutes;
                let r = height * (-0.5 * z * z).exp();
                if r.is_finite() { r } else { 0.0 }
            })
            .collect();

        let total: f64 = raw.iter().sum();
        if !(total > 0.0) {
            // Degenerate width or a peak far outside the window.
            let at = (peak_minute.floor().max(0.0) as usize).min(minutes - 1);
            let mut per_minute = vec![0; minutes];
            per_minute[at] = size;
            return Self { per_minute };
        }

        let scaled: Vec<f64> = raw.iter().map(|r| r * size as f64 / total).collect();
        let mut per_minute: Vec<u32> = scaled.iter().map(|s| s.floor() as u32).collect();
        let assigned: u32 = per_minute.iter().sum();

        let mut order: Vec<usize> = (0..minutes).collect();
        order.sort_by(|&a, &b| {
            let fa = scaled[a] - scaled[a].floor();
            let fb = scaled[b] - scaled[b].floor();
            fb.total_cmp(&fa).then(a.cmp(&b))
        });
        for &m in order.iter().take(size.saturating_sub(assigned) as usize) {
            per_minute[m] += 1;
        }
        Self { per_minute }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.per_minute.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.per_minute.is_empty()
    }

    #[inline]
    pub fn per_minute(&self) -> &[u32] {
        &self.per_minute
    }

    pub fn total(&self) -> u32 {
        self.per_minute.iter().sum()
    }

    /// Sum of minutes `from..to`.
    pub fn sum_range(&self, from: usize, to: usize) -> u32 {
        let to = to.min(self.per_minute.len());
        if from >= to {
            return 0;
        }
        self.per_minute[from..to].iter().sum()
    }
}
