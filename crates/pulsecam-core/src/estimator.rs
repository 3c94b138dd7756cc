//! Sliding-window heart-rate estimation.
//!
//! While a finger is present, each frame's averaged red value passes
//! through a two-sample smoother and lands in a fixed-capacity window of
//! `(value, timestamp)` pairs. Once enough history exists, and no more than
//! once per cooldown interval, the estimator mean-centers the window and
//! converts the spacing of threshold-qualified local maxima into beats per
//! minute. Estimates outside the plausible band are discarded as
//! measurement artifacts rather than surfaced as errors; every failure path
//! is a quiet "no result this call".

use crate::config::EstimatorConfig;
use crate::sample::dt_sec;
use ndarray::Array1;

/// Sliding-window rate estimator.
///
/// Peak timing uses real timestamps rather than sample indices, so
/// variable inter-frame intervals do not bias the estimate.
#[derive(Debug, Clone, Default)]
pub struct RateEstimator {
    config: EstimatorConfig,
    /// Smoothed red values, oldest first. Same length as `timestamps_us`.
    values: Vec<f32>,
    timestamps_us: Vec<i64>,
    last_bpm_update_us: Option<i64>,
}

impl RateEstimator {
    /// Create with default config.
    pub fn new() -> Self {
        Self::with_config(EstimatorConfig::default())
    }

    /// Create with custom config.
    pub fn with_config(config: EstimatorConfig) -> Self {
        Self {
            values: Vec::with_capacity(config.max_samples),
            timestamps_us: Vec::with_capacity(config.max_samples),
            config,
            last_bpm_update_us: None,
        }
    }

    /// Number of buffered samples.
    pub fn sample_count(&self) -> usize {
        self.values.len()
    }

    /// Whether the minimum analysis window has been filled.
    pub fn is_warmed_up(&self) -> bool {
        self.values.len() >= self.config.min_samples
    }

    /// Clear the window, the smoother seed, and the cooldown clock.
    pub fn reset(&mut self) {
        self.values.clear();
        self.timestamps_us.clear();
        self.last_bpm_update_us = None;
    }

    /// Ingest one red-channel reading taken at `ts_us`.
    ///
    /// Returns a validated BPM when the window is warm, the cooldown has
    /// elapsed, and the waveform yields a plausible rate; `None` otherwise.
    pub fn ingest(&mut self, red: f32, ts_us: i64) -> Option<u32> {
        // Two-sample smoother seeded with the raw value on an empty window.
        let previous = self.values.last().copied().unwrap_or(red);
        let smoothed = (red + previous) / 2.0;

        self.values.push(smoothed);
        self.timestamps_us.push(ts_us);
        if self.values.len() > self.config.max_samples {
            self.values.remove(0);
            self.timestamps_us.remove(0);
        }

        if self.values.len() < self.config.min_samples {
            return None;
        }

        if let Some(last) = self.last_bpm_update_us {
            if dt_sec(ts_us, last) < self.config.bpm_cooldown_sec {
                return None;
            }
        }

        let bpm = self.compute_bpm()?;
        self.last_bpm_update_us = Some(ts_us);
        Some(bpm)
    }

    /// Analyze the current window.
    ///
    /// The final division is rounded half-away-from-zero (`f64::round`),
    /// so a raw 70.5 reports as 71.
    fn compute_bpm(&self) -> Option<u32> {
        let signal = Array1::from(self.values.clone());
        let mean = signal.mean().unwrap_or(0.0);
        let centered = signal.mapv(|v| v - mean);

        let max_val = centered.fold(f32::NEG_INFINITY, |acc, &v| acc.max(v));
        if max_val <= self.config.min_peak_amplitude {
            log::debug!("window too flat for peak detection (max {:.3})", max_val);
            return None;
        }

        // Interior local maxima strictly above both neighbors and above a
        // fraction of the window maximum.
        let threshold = self.config.peak_threshold_ratio * max_val;
        let mut peak_times_us: Vec<i64> = Vec::new();
        for i in 1..centered.len() - 1 {
            if centered[i] > threshold && centered[i] > centered[i - 1] && centered[i] > centered[i + 1]
            {
                peak_times_us.push(self.timestamps_us[i]);
            }
        }

        if peak_times_us.len() < 2 {
            return None;
        }

        let duration = dt_sec(*peak_times_us.last().unwrap(), peak_times_us[0]);
        if duration <= 0.0 {
            return None;
        }

        let beats = (peak_times_us.len() - 1) as f64;
        let bpm = (beats / duration * 60.0).round();

        if bpm < self.config.min_bpm as f64 || bpm > self.config.max_bpm as f64 {
            log::debug!(
                "discarding implausible rate: {} bpm over {:.2}s",
                bpm,
                duration
            );
            return None;
        }

        Some(bpm as u32)
    }
}
