pub mod bitmap;
pub mod source;
pub mod still;
pub mod stream;
pub mod video;

use crate::composition::model::Composition;

/// Factors within 1% of unity are treated as exactly 1.0 so near-full-size
/// variants keep the original resolution instead of resampling.
pub(crate) const FACTOR_UNITY_THRESHOLD: f32 = 0.99;

/// Shrink `factor` so the shorter canvas edge stays within `max_resolution`.
pub(crate) fn capped_factor(mut factor: f32, comp: &Composition, max_resolution: Option<i32>) -> f32 {
    if let Some(max) = max_resolution {
        let min_line = comp.width.min(comp.height);
        if max > 0 && min_line > max {
            factor *= max as f32 / min_line as f32;
        }
    }
    factor
}

/// Duration of the resampled timeline in frames, rounded up so the tail of
/// the composition is never dropped.
pub(crate) fn resampled_duration(comp: &Composition, frame_rate: f32) -> i64 {
    (comp.duration as f64 * f64::from(frame_rate) / f64::from(comp.frame_rate)).ceil() as i64
}

/// One canvas extent scaled by `factor`, rounded up.
pub(crate) fn scaled_extent(extent: i32, factor: f32) -> i32 {
    (f64::from(extent) * f64::from(factor)).ceil() as i32
}
