use std::sync::Arc;

use crate::foundation::core::TimeRange;

/// Stable identifier of a composition inside one project/file.
pub type CompositionId = u32;

/// A timeline composition as seen by the sequence encoders.
///
/// This is a pure data model: rendering a composition's frames is delegated
/// to the host application through [`crate::FrameSource`]. The encoders only
/// need dimensions, timing, and the nesting structure used for
/// visibility-range clipping.
#[derive(Clone, Debug)]
pub struct Composition {
    /// Stable id, unique within the owning file.
    pub id: CompositionId,
    /// Canvas width in pixels.
    pub width: i32,
    /// Canvas height in pixels.
    pub height: i32,
    /// Timeline frame rate.
    pub frame_rate: f32,
    /// Total duration in frames of the local timeline.
    pub duration: i64,
    /// What the composition contains.
    pub content: CompositionContent,
}

/// Content discriminant of a [`Composition`].
#[derive(Clone, Debug)]
pub enum CompositionContent {
    /// Rendered into an H.264 video sequence.
    Video,
    /// Rendered into a delta-encoded bitmap sequence.
    Bitmap,
    /// A vector composition embedding other compositions via layers.
    Vector(Vec<PreComposeLayer>),
}

/// A layer embedding a nested composition into its parent's timeline.
#[derive(Clone, Debug)]
pub struct PreComposeLayer {
    /// First frame (in the parent's timeline) at which the layer is active.
    pub start_time: i64,
    /// Active span of the layer in frames.
    pub duration: i64,
    /// Offset of the nested composition's frame 0 relative to the parent
    /// timeline (the nested local time is parent time minus this).
    pub composition_start_time: i64,
    /// The embedded composition.
    pub composition: Arc<Composition>,
}

/// Collect the time intervals of `target`'s local timeline that are actually
/// displayed somewhere under `composition`.
///
/// Walks the nesting ancestry recursively: a layer embedding the target only
/// contributes the overlap of its own active span, translated into the
/// target's local time. `start_frame`/`end_frame` carry the span visible so
/// far, expressed in `composition`'s local timeline.
fn collect_visible_ranges(
    ranges: &mut Vec<TimeRange>,
    target: CompositionId,
    composition: &Composition,
    start_frame: i64,
    end_frame: i64,
) {
    if composition.id == target {
        let range = TimeRange::new(start_frame.max(0), end_frame.min(composition.duration));
        if range.end >= range.start {
            ranges.push(range);
        }
        return;
    }

    let CompositionContent::Vector(layers) = &composition.content else {
        return;
    };

    for layer in layers {
        let new_start = start_frame.max(layer.start_time);
        let new_end = end_frame
            .min(composition.duration)
            .min(layer.start_time + layer.duration);
        collect_visible_ranges(
            ranges,
            target,
            &layer.composition,
            new_start - layer.composition_start_time,
            new_end - layer.composition_start_time,
        );
    }
}

/// Visibility windows of composition `target` under the main composition
/// `root`, in `target`'s local timeline (frames at `root`'s frame rate).
pub fn visible_ranges(root: &Composition, target: CompositionId) -> Vec<TimeRange> {
    let mut ranges = Vec::new();
    collect_visible_ranges(&mut ranges, target, root, 0, root.duration);
    ranges
}

/// `true` when sequence frame index `frame` falls inside any visibility
/// window.
///
/// `frame_rate_factor` converts from the sequence's (possibly resampled)
/// timebase back to the reference timeline the ranges were computed in; both
/// the floor and ceiling of the converted index are probed so boundary frames
/// on either side of a fractional resample stay visible.
pub fn is_visible(ranges: &[TimeRange], frame: i64, frame_rate_factor: f64) -> bool {
    let exact = frame as f64 * frame_rate_factor;
    let floor = exact.floor() as i64;
    let ceil = exact.ceil() as i64;
    ranges
        .iter()
        .any(|range| range.contains(floor) || range.contains(ceil))
}

#[cfg(test)]
#[path = "../../tests/unit/composition/model.rs"]
mod tests;
