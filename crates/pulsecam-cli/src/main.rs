use clap::{Parser, Subcommand};
use pulsecam_core::{ColorSample, EngineConfig, PulseEngine};
use serde::Deserialize;
use std::f64::consts::PI;
use std::fs::File;

#[derive(Parser)]
#[command(name = "pulsecam-cli")]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the engine against a synthetic fingertip waveform.
    Simulate {
        /// Simulated heart rate.
        #[arg(long, default_value_t = 72.0)]
        bpm: f64,
        /// Length of the simulated capture.
        #[arg(long, default_value_t = 15.0)]
        seconds: f64,
        /// Camera frame rate.
        #[arg(long, default_value_t = 30.0)]
        fps: f64,
    },
    /// Replay recorded color samples from a JSON fixture.
    Replay { file: String },
}

/// One recorded sample: averaged frame color plus capture timestamp.
#[derive(Deserialize)]
struct RecordedSample {
    r: f32,
    g: f32,
    b: f32,
    ts_us: i64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    match cli.cmd {
        Commands::Simulate { bpm, seconds, fps } => {
            let mut engine = PulseEngine::with_config(EngineConfig::from_env_or_default());
            let frames = (seconds * fps) as i64;
            let freq_hz = bpm / 60.0;

            println!("simulating {:.0} BPM at {:.0} fps for {:.0}s", bpm, fps, seconds);
            for i in 0..frames {
                let t = i as f64 / fps;
                let red = 85.0 + 8.0 * (2.0 * PI * freq_hz * t).sin();
                let sample = ColorSample::new(red as f32, 40.0, 41.0);
                report(&mut engine, sample, (t * 1_000_000.0) as i64, t);
            }
        }
        Commands::Replay { file } => {
            let samples: Vec<RecordedSample> = serde_json::from_reader(File::open(&file)?)?;
            println!("replaying {} samples from {}", samples.len(), file);

            let mut engine = PulseEngine::with_config(EngineConfig::from_env_or_default());
            for rec in samples {
                let t = rec.ts_us as f64 / 1_000_000.0;
                let sample = ColorSample::new(rec.r, rec.g, rec.b);
                report(&mut engine, sample, rec.ts_us, t);
            }
        }
    }
    Ok(())
}

fn report(engine: &mut PulseEngine, sample: ColorSample, ts_us: i64, t: f64) {
    let was_detected = engine.finger_detected();
    let record = engine.process(sample, ts_us);

    if record.finger_detected != was_detected {
        if record.finger_detected {
            println!("[{:6.2}s] finger detected", t);
        } else {
            println!("[{:6.2}s] finger removed", t);
        }
    }
    if let Some(bpm) = record.bpm {
        println!("[{:6.2}s] {} bpm", t, bpm);
    }
}
