//! Write-once sequence values produced by the encoders and persisted by the
//! container codec.

use crate::foundation::core::TimeRange;

/// An encoded still image covering a sub-rectangle of the frame canvas.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitmapRect {
    /// Left edge of the covered rect on the canvas.
    pub x: i32,
    /// Top edge of the covered rect on the canvas.
    pub y: i32,
    /// Encoded still-image bytes. Empty when the still encoder produced no
    /// output for this frame (recoverable, surfaced as a warning).
    pub bytes: Vec<u8>,
}

/// One frame of a [`BitmapSequence`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BitmapFrame {
    /// `true` when the frame re-encodes its full visible content
    /// independently of prior frames.
    pub is_keyframe: bool,
    /// Zero or one sub-rectangle updates; empty when the frame is
    /// pixel-identical to its predecessor.
    pub bitmaps: Vec<BitmapRect>,
}

/// A delta-encoded still-image sequence for one composition at one
/// scale/frame-rate variant. Created once, never mutated after assembly.
#[derive(Clone, Debug, PartialEq)]
pub struct BitmapSequence {
    /// Canvas width in pixels.
    pub width: i32,
    /// Canvas height in pixels.
    pub height: i32,
    /// Playback frame rate.
    pub frame_rate: f32,
    /// Ordered frame list, one entry per timeline frame.
    pub frames: Vec<BitmapFrame>,
}

/// One encoded elementary-stream access unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoFrame {
    /// `true` when the underlying encoder produced an IDR/I frame.
    pub is_keyframe: bool,
    /// Decode/presentation time in the stream's own timebase, assigned by
    /// the underlying encoder (may reorder relative to submission order).
    pub timestamp: i64,
    /// Access-unit bytes including the 4-byte Annex-B start code.
    pub bytes: Vec<u8>,
}

/// An H.264 video sequence with alpha side-channel and static-range
/// metadata, for one composition at one scale/frame-rate variant.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoSequence {
    /// Canvas width in pixels.
    pub width: i32,
    /// Canvas height in pixels.
    pub height: i32,
    /// Playback frame rate.
    pub frame_rate: f32,
    /// X offset of the auxiliary luma-only alpha plane packed below the
    /// color plane. Zero together with `alpha_start_y` means no alpha plane.
    pub alpha_start_x: i32,
    /// Y offset of the auxiliary alpha plane.
    pub alpha_start_y: i32,
    /// Sequence parameter set, Annex-B with start code.
    pub sps: Vec<u8>,
    /// Picture parameter set, Annex-B with start code.
    pub pps: Vec<u8>,
    /// Ordered access units.
    pub frames: Vec<VideoFrame>,
    /// Spans of consecutive pixel-identical frames, an optimization hint for
    /// players to freeze instead of decoding. `None` when decoded from a
    /// container written before the field existed.
    pub static_time_ranges: Option<Vec<TimeRange>>,
    /// Optional host-supplied MP4 container header for this variant.
    pub mp4_header: Option<Vec<u8>>,
}

impl VideoSequence {
    /// `true` when the stream carries an auxiliary transparency plane.
    pub fn has_alpha(&self) -> bool {
        self.alpha_start_x != 0 || self.alpha_start_y != 0
    }
}

/// One still-image blob in an [`ImageTables`] set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageBytes {
    /// Stable id, never a positional index: zero-length entries are skipped
    /// during serialization, so serialized order differs from memory order.
    pub id: u32,
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
}

/// An ordered list of still-image byte blobs shared by bitmap compositions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageTables {
    /// Image entries; entries with empty `bytes` are never serialized.
    pub images: Vec<ImageBytes>,
}
