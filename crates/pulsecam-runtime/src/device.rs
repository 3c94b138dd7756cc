//! Camera and light-source abstraction.
//!
//! The capture hardware lives behind this trait so the session worker can
//! be tested without a device and platform bindings stay outside the
//! crate. Implementations are driven from a single worker thread; they do
//! not need to be re-entrant.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("camera unavailable: {0}")]
    Unavailable(String),
    #[error("torch control failed: {0}")]
    Torch(String),
}

/// The camera plus its light source, as one exclusively-held resource.
pub trait CaptureDevice: Send {
    /// Acquire the camera and begin frame delivery.
    fn acquire(&mut self) -> Result<(), DeviceError>;

    /// Stop frame delivery and release the camera.
    fn release(&mut self) -> Result<(), DeviceError>;

    /// Toggle the illumination used to transilluminate the fingertip.
    fn set_torch(&mut self, on: bool) -> Result<(), DeviceError>;
}

/// A device that always succeeds and does nothing, for offline replay and
/// demos.
#[derive(Debug, Default)]
pub struct NullDevice;

impl CaptureDevice for NullDevice {
    fn acquire(&mut self) -> Result<(), DeviceError> {
        Ok(())
    }

    fn release(&mut self) -> Result<(), DeviceError> {
        Ok(())
    }

    fn set_torch(&mut self, _on: bool) -> Result<(), DeviceError> {
        Ok(())
    }
}
