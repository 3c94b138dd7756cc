use pulsecam_core::{ColorSample, EngineConfig, PulseEngine};
use std::f64::consts::PI;

const FRAME_US: i64 = 33_333; // ~30 fps

fn on_sample() -> ColorSample {
    ColorSample::new(80.0, 40.0, 40.0)
}

fn off_sample() -> ColorSample {
    ColorSample::new(30.0, 40.0, 40.0)
}

/// Detection flips exactly on the 5th qualifying frame, loss exactly on
/// the 5th failing frame, and the loss transition empties the window.
#[test]
fn presence_transition_timing() {
    let mut engine = PulseEngine::new();
    let mut ts = 0i64;

    for i in 1..=5 {
        let record = engine.process(on_sample(), ts);
        ts += FRAME_US;
        assert_eq!(record.finger_detected, i == 5, "wrong decision at frame {}", i);
    }

    for i in 1..=5 {
        let record = engine.process(off_sample(), ts);
        ts += FRAME_US;
        assert_eq!(record.finger_detected, i < 5, "wrong decision at failing frame {}", i);
    }

    // The call after the loss observes an empty window no matter what the
    // next sample looks like.
    assert_eq!(engine.buffered_samples(), 0);
    engine.process(on_sample(), ts);
    assert_eq!(engine.buffered_samples(), 0);
}

/// A clean periodic waveform yields at most one estimate per cooldown
/// second even when processed at full frame rate.
#[test]
fn estimate_rate_is_cooldown_limited() {
    let mut engine = PulseEngine::new();
    let mut updates = Vec::new();

    // 75 BPM sine: peak every 0.8s, i.e. every 24 frames at 30 fps.
    for i in 0..150 {
        let t = i as f64 * FRAME_US as f64 / 1_000_000.0;
        let red = 85.0 + 8.0 * (2.0 * PI * 1.25 * t).sin() as f32;
        let record = engine.process(ColorSample::new(red, 40.0, 40.0), i * FRAME_US);
        if let Some(bpm) = record.bpm {
            updates.push(bpm);
        }
    }

    assert!(!updates.is_empty());
    assert!(updates.len() <= 5, "expected at most 5 updates, got {:?}", updates);
    for bpm in updates {
        assert!((70..=80).contains(&bpm), "implausible estimate {}", bpm);
    }
}

/// Two synthetic peaks 0.86s apart inside the first full window produce a
/// rate near 70 BPM on the first qualifying call.
#[test]
fn end_to_end_seventy_bpm() {
    let frame_us = 20_000i64; // 20ms intervals
    let mut engine = PulseEngine::new();
    let mut first_estimate = None;

    // 5 warm-up frames to pass the debounce, then 60 buffered samples with
    // pulse peaks at buffered indices 10 and 53 (43 frames = 0.86s apart).
    for i in 0..65i64 {
        let buffered_index = i - 4;
        let sample = if buffered_index == 10 || buffered_index == 53 {
            ColorSample::new(85.0, 42.0, 41.0)
        } else {
            ColorSample::new(80.0, 40.0, 40.0)
        };
        let record = engine.process(sample, i * frame_us);
        if i >= 4 {
            assert!(record.finger_detected, "presence lost at frame {}", i);
        }
        if first_estimate.is_none() {
            first_estimate = record.bpm;
        }
    }

    let bpm = first_estimate.expect("no estimate produced");
    assert!((65..=75).contains(&bpm), "expected ~70 BPM, got {}", bpm);
}

/// A perfectly flat signal never produces an estimate.
#[test]
fn flat_signal_never_estimates() {
    let mut engine = PulseEngine::new();
    for i in 0..100 {
        let record = engine.process(ColorSample::new(90.0, 40.0, 40.0), i * FRAME_US);
        assert_eq!(record.bpm, None, "estimate from flat signal at frame {}", i);
    }
    assert!(engine.finger_detected());
}

/// Band edges: spacing implying 40 BPM is accepted, 39 BPM is rejected.
#[test]
fn band_edge_validation() {
    let accepted = run_spike_train(45);
    assert!(!accepted.is_empty());
    assert!(accepted.iter().all(|&bpm| bpm == 40), "{:?}", accepted);

    let rejected = run_spike_train(46);
    assert!(rejected.is_empty(), "{:?}", rejected);
}

/// Engine-level reset matches a freshly constructed engine.
#[test]
fn reset_idempotence() {
    let mut dirty = PulseEngine::with_config(EngineConfig::default());
    for i in 0..30 {
        dirty.process(on_sample(), i * FRAME_US);
    }
    dirty.reset();
    dirty.reset();

    let mut fresh = PulseEngine::new();
    for i in 0..10i64 {
        let a = dirty.process(on_sample(), i * FRAME_US);
        let b = fresh.process(on_sample(), i * FRAME_US);
        assert_eq!(a, b, "divergence at frame {}", i);
    }
}

fn run_spike_train(spike_every: i64) -> Vec<u32> {
    let mut engine = PulseEngine::new();
    let mut updates = Vec::new();
    for i in 0..245i64 {
        let buffered_index = i - 4;
        let red = if buffered_index >= 0 && buffered_index % spike_every == 0 {
            100.0
        } else {
            80.0
        };
        let record = engine.process(ColorSample::new(red, 40.0, 40.0), i * FRAME_US);
        if let Some(bpm) = record.bpm {
            updates.push(bpm);
        }
    }
    updates
}
