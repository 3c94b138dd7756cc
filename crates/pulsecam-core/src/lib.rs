//! # pulsecam-core
//!
//! Fingertip photoplethysmography engine: estimates heart rate from a live
//! stream of averaged camera-frame colors while a fingertip covers the
//! lens with the light source active.
//!
//! This crate provides:
//! - **Presence classification**: confidence-counter debouncing of the
//!   "is a finger on the lens" decision
//! - **Rate estimation**: sliding-window smoothing, adaptive peak
//!   detection, and rate-limited BPM computation with plausibility
//!   validation
//!
//! ## Example
//!
//! ```ignore
//! use pulsecam_core::{ColorSample, PulseEngine};
//!
//! let mut engine = PulseEngine::new();
//!
//! // One averaged color sample per camera frame
//! for (sample, ts_us) in frames {
//!     let record = engine.process(sample, ts_us);
//!     if let Some(bpm) = record.bpm {
//!         println!("Heart rate: {} BPM", bpm);
//!     }
//! }
//! ```

pub mod config;
pub mod engine;
pub mod estimator;
pub mod presence;
pub mod sample;

#[cfg(test)]
mod tests_proptest;

pub use config::{ConfigError, EngineConfig, EstimatorConfig, PresenceConfig};
pub use engine::PulseEngine;
pub use estimator::RateEstimator;
pub use presence::{PresenceClassifier, PresenceState, PresenceStatus};
pub use sample::{ColorSample, DecisionRecord};
