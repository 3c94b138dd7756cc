//! The pulse engine: presence classification plus rate estimation.
//!
//! One `process` call per video frame, one complete `DecisionRecord` back.
//! The two sub-algorithms are deliberately coupled here: losing presence
//! clears the estimator's window on the exact transition frame, and an
//! external `reset` clears both at once. Callers own the threading
//! discipline; `&mut self` guarantees a call runs to completion before the
//! next one is accepted.

use crate::config::EngineConfig;
use crate::estimator::RateEstimator;
use crate::presence::PresenceClassifier;
use crate::sample::{ColorSample, DecisionRecord};

/// Stateful per-frame pulse detector.
///
/// ```
/// use pulsecam_core::{ColorSample, PulseEngine};
///
/// let mut engine = PulseEngine::new();
/// let record = engine.process(ColorSample::new(80.0, 40.0, 40.0), 0);
/// assert!(!record.finger_detected); // debounce needs more frames
/// ```
#[derive(Debug, Clone, Default)]
pub struct PulseEngine {
    classifier: PresenceClassifier,
    estimator: RateEstimator,
}

impl PulseEngine {
    /// Create with default config.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create with custom config.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            classifier: PresenceClassifier::with_config(config.presence),
            estimator: RateEstimator::with_config(config.estimator),
        }
    }

    /// Ingest one averaged frame color taken at `ts_us` microseconds.
    pub fn process(&mut self, sample: ColorSample, ts_us: i64) -> DecisionRecord {
        let status = self.classifier.update(&sample);

        if status.should_reset {
            log::debug!("finger removed, clearing signal history");
            self.reset();
            return DecisionRecord {
                finger_detected: false,
                bpm: None,
            };
        }

        let bpm = if status.finger_detected {
            self.estimator.ingest(sample.r, ts_us)
        } else {
            None
        };

        DecisionRecord {
            finger_detected: status.finger_detected,
            bpm,
        }
    }

    /// Clear all engine state: confidence counters, the signal window, and
    /// the estimate cooldown clock. Idempotent.
    pub fn reset(&mut self) {
        self.classifier.reset();
        self.estimator.reset();
    }

    /// Current debounced presence decision.
    pub fn finger_detected(&self) -> bool {
        self.classifier.finger_detected()
    }

    /// Number of samples currently buffered by the estimator.
    pub fn buffered_samples(&self) -> usize {
        self.estimator.sample_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on_sample() -> ColorSample {
        ColorSample::new(80.0, 40.0, 40.0)
    }

    fn off_sample() -> ColorSample {
        ColorSample::new(30.0, 40.0, 40.0)
    }

    #[test]
    fn test_estimator_only_fed_while_detected() {
        let mut engine = PulseEngine::new();
        for i in 0..4 {
            engine.process(on_sample(), i * 33_333);
        }
        assert_eq!(engine.buffered_samples(), 0);

        engine.process(on_sample(), 5 * 33_333);
        assert_eq!(engine.buffered_samples(), 1);
    }

    #[test]
    fn test_presence_loss_clears_buffer() {
        let mut engine = PulseEngine::new();
        let mut ts = 0;
        for _ in 0..20 {
            engine.process(on_sample(), ts);
            ts += 33_333;
        }
        assert!(engine.finger_detected());
        assert!(engine.buffered_samples() > 0);

        for _ in 0..4 {
            let record = engine.process(off_sample(), ts);
            ts += 33_333;
            assert!(record.finger_detected);
        }
        let record = engine.process(off_sample(), ts);
        assert!(!record.finger_detected);
        assert_eq!(engine.buffered_samples(), 0);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut engine = PulseEngine::new();
        let mut ts = 0;
        for _ in 0..10 {
            engine.process(on_sample(), ts);
            ts += 33_333;
        }

        engine.reset();
        let once = (engine.finger_detected(), engine.buffered_samples());
        engine.reset();
        let twice = (engine.finger_detected(), engine.buffered_samples());
        assert_eq!(once, twice);
        assert_eq!(twice, (false, 0));

        // A fresh detection run behaves exactly like a new engine.
        for i in 0..4 {
            assert!(!engine.process(on_sample(), ts + i * 33_333).finger_detected);
        }
        assert!(engine.process(on_sample(), ts + 5 * 33_333).finger_detected);
    }
}
