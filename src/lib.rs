//! Framepack turns rendered RGBA frame sequences into compact, seekable
//! sequence containers.
//!
//! A composition timeline is exported as one of two sequence families:
//!
//! 1. **Bitmap sequences**: per-frame dirty-rect deltas, each rect encoded as
//!    a lossless WebP still. Keyframes crop to visible content; unchanged
//!    frames carry no payload.
//! 2. **Video sequences**: H.264 streams produced through a pluggable
//!    [`StreamEncoder`], with transparency carried in an alpha side-channel
//!    region and frozen spans recorded as static time ranges.
//!
//! Both families serialize into the same versioned tag container: length-
//!    prefixed tags with escape framing, LEB128 varints, and LSB-first bit
//!    packing, readable by decoders that skip tags they do not know.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Renderer-agnostic**: pixels come from a [`FrameSource`] collaborator;
//!   this crate never renders.
//! - **Codec-agnostic**: H.264 bitstreams come from a [`StreamEncoderFactory`]
//!   collaborator; this crate never links an encoder.
//! - **Recoverable by default**: per-frame failures become [`Warning`]s, not
//!   errors; cancellation yields partial output for the caller to discard.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod codec;
mod composition;
mod encode;
mod foundation;
mod pipeline;
mod raster;
mod sequence;

pub use codec::bitmap_sequence::{
    read_bitmap_sequence_body, write_bitmap_sequence_body, write_bitmap_sequence_tag,
};
pub use codec::composition_block::{
    BitmapCompositionBlock, VideoCompositionBlock, read_bitmap_composition_block,
    read_video_composition_block, write_bitmap_composition_block, write_video_composition_block,
};
pub use codec::image_tables::{read_image_tables_body, write_image_tables_body, write_image_tables_tag};
pub use codec::stream::{ByteReader, ByteWriter};
pub use codec::tags::{TagCode, TagHeader, read_tag_body, read_tag_header, write_end_tag, write_tag};
pub use codec::video_sequence::{
    read_video_sequence_body, write_video_sequence_body, write_video_sequence_tag,
};
pub use composition::model::{
    Composition, CompositionContent, CompositionId, PreComposeLayer, is_visible, visible_ranges,
};
pub use encode::bitmap::encode_bitmap_sequence;
pub use encode::source::FrameSource;
pub use encode::still::{StillEncoder, WebpStillEncoder};
pub use encode::stream::{
    EncodedChunk, FrameType, FrameTypeHint, StreamConfig, StreamEncoder, StreamEncoderFactory,
    StreamHeaders,
};
pub use encode::video::{AlphaState, encode_video_sequence, measure_content_rect};
pub use foundation::core::{CancelFlag, PixelRect, TimeRange};
pub use foundation::error::{FramepackError, FramepackResult};
pub use pipeline::{
    ExportConfig, ExportContext, ScaleAndFps, Warning, export_bitmap_composition,
    export_video_composition,
};
pub use raster::frame::RasterFrame;
pub use raster::ops::{
    OpaqueBounds, clip_transparent_edge, copy_rect, detect_alpha, diff_rect, expand_rect_range,
    is_static, odd_padding_rgba, scale_bilinear,
};
pub use sequence::model::{
    BitmapFrame, BitmapRect, BitmapSequence, ImageBytes, ImageTables, VideoFrame, VideoSequence,
};
