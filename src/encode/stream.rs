use crate::foundation::error::FramepackResult;
use crate::raster::frame::RasterFrame;

/// Configuration handed to a [`StreamEncoderFactory`] for one encoding pass.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamConfig {
    /// Frame width in pixels; always even (odd-padded by the caller).
    pub width: i32,
    /// Frame height in pixels; always even.
    pub height: i32,
    /// Target frame rate.
    pub frame_rate: f32,
    /// Whether the stream carries an auxiliary alpha plane.
    pub has_alpha: bool,
    /// Maximum distance between forced keyframes.
    pub keyframe_interval: i32,
    /// Encoder quality in `[0, 100]`.
    pub quality: u8,
    /// Prefer a hardware encoder when available.
    pub hardware: bool,
}

/// Frame-type request passed to [`StreamEncoder::encode`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameTypeHint {
    /// Let the encoder decide.
    Auto,
    /// Force an IDR/I frame (fresh reference).
    I,
    /// Force a predicted frame (no fresh reference while content is hidden).
    P,
}

/// Frame type actually produced by the encoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameType {
    /// Intra frame.
    I,
    /// Predicted frame.
    P,
}

/// SPS/PPS pair emitted once per stream, Annex-B with 4-byte start codes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamHeaders {
    /// Sequence parameter set.
    pub sps: Vec<u8>,
    /// Picture parameter set.
    pub pps: Vec<u8>,
}

/// One encoded access unit returned by [`StreamEncoder::encode`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedChunk {
    /// Access-unit bytes, Annex-B with 4-byte start code.
    pub bytes: Vec<u8>,
    /// Frame type the encoder actually produced.
    pub frame_type: FrameType,
    /// Timestamp in the stream's own timebase.
    pub timestamp: i64,
}

/// The H.264 stream encoder collaborator.
///
/// An instance is created, used, and destroyed within a single encoding
/// pass; it is never reused across compositions. The encoder may buffer
/// frames internally: a submission can return `None`, and the delay buffer
/// is drained after the frame loop by calling [`StreamEncoder::encode`] with
/// no input until it reports no more output.
pub trait StreamEncoder {
    /// The stream's SPS/PPS headers.
    fn headers(&mut self) -> FramepackResult<StreamHeaders>;

    /// Position of the auxiliary alpha plane below the color plane, or
    /// `(0, 0)` when the stream carries no alpha.
    fn alpha_start(&self) -> (i32, i32);

    /// Submit one frame (`Some`) or drain the delay buffer (`None`).
    ///
    /// Dimensions must be even; callers enforce this via
    /// [`crate::raster::ops::odd_padding_rgba`] before submission.
    fn encode(
        &mut self,
        frame: Option<&RasterFrame>,
        hint: FrameTypeHint,
    ) -> FramepackResult<Option<EncodedChunk>>;
}

/// Creates one [`StreamEncoder`] per encoding pass.
///
/// The video sequence encoder may run two passes when its alpha hypothesis
/// is refuted, so construction is factored out of the pass itself.
pub trait StreamEncoderFactory {
    /// Build an encoder for `config`.
    fn create(&self, config: &StreamConfig) -> FramepackResult<Box<dyn StreamEncoder>>;
}
