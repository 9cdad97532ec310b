use crate::composition::model::Composition;
use crate::foundation::error::FramepackResult;
use crate::raster::frame::RasterFrame;

/// The render collaborator: the host application's "render frame at time T"
/// capability.
///
/// Implementations rasterize `comp` at its nominal size into `dst` and
/// return the dimensions actually produced. Returning dimensions that do not
/// match the composition's nominal size is a recoverable condition: the
/// calling encoder surfaces a warning and skips the frame, it does not abort
/// the sequence.
pub trait FrameSource {
    /// Render frame `frame` of `comp`, sampled at `frame_rate`, into `dst`.
    ///
    /// `frame_rate` may be lower than the composition's own rate when the
    /// sequence is resampled; the source maps `frame / frame_rate` to its
    /// internal time representation.
    fn render_into(
        &mut self,
        comp: &Composition,
        frame: i64,
        frame_rate: f32,
        dst: &mut RasterFrame,
    ) -> FramepackResult<(i32, i32)>;
}
