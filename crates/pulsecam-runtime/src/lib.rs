//! # pulsecam-runtime
//!
//! Capture-session plumbing around [`pulsecam_core`]: raw-frame color
//! reduction, the camera/torch device boundary, and a worker thread that
//! serializes session lifecycle against frame processing.
//!
//! ```text
//! Platform capture callback          Observer context
//!     │ submit_frame(Frame)              ▲ DecisionRecord
//!     ▼                                  │
//! ┌──────────────────────────────────────┴──┐
//! │ CaptureSession worker                   │
//! │   Frame -> mean RGB -> PulseEngine      │
//! │   start/stop -> device acquire/release  │
//! └─────────────────────────────────────────┘
//! ```

pub mod device;
pub mod frame;
pub mod session;

pub use device::{CaptureDevice, DeviceError, NullDevice};
pub use frame::Frame;
pub use session::{
    CaptureSession, MetricsSnapshot, Observer, SessionError, SessionMetrics, SessionSummary,
};
