//! Raw frame container and color reduction.
//!
//! The engine never sees pixels, only one averaged color per frame. The
//! reduction here is the reference implementation of that contract for
//! packed RGB data; platform bindings with hardware-accelerated averaging
//! can bypass it and feed `ColorSample`s directly.

use pulsecam_core::ColorSample;

/// One captured video frame, packed RGB, 3 bytes per pixel, row-major.
#[derive(Debug, Clone)]
pub struct Frame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Capture timestamp in microseconds.
    pub timestamp_us: i64,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, timestamp_us: i64) -> Self {
        Self {
            data,
            width,
            height,
            timestamp_us,
        }
    }

    /// Arithmetic mean of each channel over all pixels.
    ///
    /// Returns `None` for an unreadable frame (empty, or a data length
    /// that does not match the stated dimensions), in which case the
    /// caller skips the tick without touching any state.
    pub fn mean_rgb(&self) -> Option<ColorSample> {
        let pixel_count = self.width as usize * self.height as usize;
        if pixel_count == 0 || self.data.len() != pixel_count * 3 {
            return None;
        }

        let mut sums = [0u64; 3];
        for pixel in self.data.chunks_exact(3) {
            sums[0] += pixel[0] as u64;
            sums[1] += pixel[1] as u64;
            sums[2] += pixel[2] as u64;
        }

        let n = pixel_count as f32;
        Some(ColorSample::new(
            sums[0] as f32 / n,
            sums[1] as f32 / n,
            sums[2] as f32 / n,
        ))
    }
}
