//! Finger-presence classification with confidence debouncing.
//!
//! A single frame qualifies as finger contact when its averaged red channel
//! is bright and dominant over green and blue, the signature of
//! blood-illuminated tissue pressed against the lens. Single-frame
//! classifications are noisy, so two consecutive-frame counters debounce
//! the outcome: the detected boolean only flips once a counter strictly
//! exceeds the configured threshold, and transient occlusion or motion
//! never flickers it.
//!
//! Losing presence is the one transition with a side effect: on the exact
//! frame the removal counter crosses the threshold, the classifier asks the
//! engine to discard all signal history, so samples from a prior contact
//! never leak into the next one.

use crate::config::PresenceConfig;
use crate::sample::ColorSample;

/// Counter state of the classifier.
///
/// At most one counter is non-zero after any update: a qualifying frame
/// zeroes the removal counter and a failing frame zeroes the detection
/// counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresenceState {
    pub detection_confidence: u32,
    pub removal_confidence: u32,
    pub finger_detected: bool,
}

impl PresenceState {
    /// Advance the state by one frame classification.
    ///
    /// Pure function of `(rule_held, previous state, threshold)`. Returns
    /// the successor state and whether this frame is the presence-loss
    /// transition that must reset the engine.
    pub fn step(&self, rule_held: bool, threshold: u32) -> (PresenceState, bool) {
        let mut next = *self;
        let mut should_reset = false;

        if rule_held {
            next.detection_confidence = next.detection_confidence.saturating_add(1);
            next.removal_confidence = 0;
            if next.detection_confidence > threshold {
                next.finger_detected = true;
            }
        } else {
            next.detection_confidence = 0;
            next.removal_confidence = next.removal_confidence.saturating_add(1);
            if next.removal_confidence > threshold {
                next.finger_detected = false;
                should_reset = next.removal_confidence == threshold + 1;
            }
        }

        (next, should_reset)
    }
}

/// Classifier result for one frame.
#[derive(Debug, Clone, Copy)]
pub struct PresenceStatus {
    /// Debounced presence decision for this frame.
    pub finger_detected: bool,
    /// Consecutive qualifying frames so far.
    pub detection_confidence: u32,
    /// Consecutive failing frames so far.
    pub removal_confidence: u32,
    /// Set on the exact frame presence is lost. The engine must clear all
    /// signal history before ingesting another sample.
    pub should_reset: bool,
}

/// Debounced finger-presence classifier.
#[derive(Debug, Clone, Default)]
pub struct PresenceClassifier {
    config: PresenceConfig,
    state: PresenceState,
}

impl PresenceClassifier {
    /// Create with default config.
    pub fn new() -> Self {
        Self::with_config(PresenceConfig::default())
    }

    /// Create with custom config.
    pub fn with_config(config: PresenceConfig) -> Self {
        Self {
            config,
            state: PresenceState::default(),
        }
    }

    /// Single-frame rule: red channel bright and dominant.
    pub fn frame_rule(&self, sample: &ColorSample) -> bool {
        sample.r > self.config.min_red
            && sample.r > sample.g + self.config.red_over_green
            && sample.r > sample.b + self.config.red_over_blue
    }

    /// Classify one frame and advance the debounce counters.
    pub fn update(&mut self, sample: &ColorSample) -> PresenceStatus {
        let rule_held = self.frame_rule(sample);
        let was_detected = self.state.finger_detected;
        let (next, should_reset) = self.state.step(rule_held, self.config.confidence_threshold);
        self.state = next;

        if was_detected != next.finger_detected {
            log::debug!(
                "finger presence changed: {} (detection={}, removal={})",
                next.finger_detected,
                next.detection_confidence,
                next.removal_confidence
            );
        }

        PresenceStatus {
            finger_detected: next.finger_detected,
            detection_confidence: next.detection_confidence,
            removal_confidence: next.removal_confidence,
            should_reset,
        }
    }

    /// Current debounced decision.
    pub fn finger_detected(&self) -> bool {
        self.state.finger_detected
    }

    /// Current counter state.
    pub fn state(&self) -> PresenceState {
        self.state
    }

    /// Clear counters and the detected boolean.
    pub fn reset(&mut self) {
        self.state = PresenceState::default();
    }

    /// Get configuration.
    pub fn config(&self) -> &PresenceConfig {
        &self.config
    }
}
