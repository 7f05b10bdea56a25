//! Low-light heuristic.
//!
//! A frame is "low light" when its mean 8-bit grey level, scaled to `[0, 1]`,
//! is below the configured threshold. The enhancer that runs on such frames
//! lives outside this crate; the core only reports the flag.

use eyes_types::LumaFrame;

/// Mean brightness of `frame` in `[0, 1]`. An empty frame is black.
pub fn mean_brightness(frame: &LumaFrame) -> f32 {
    let pixels = frame.pixels();
    if pixels.is_empty() {
        return 0.0;
    }
    let sum: u64 = pixels.iter().map(|&p| p as u64).sum();
    (sum as f64 / pixels.len() as f64 / 255.0) as f32
}

/// True when the mean brightness is strictly below `threshold`.
pub fn is_low_light(frame: &LumaFrame, threshold: f32) -> bool {
    mean_brightness(frame) < threshold
}
