//! Binary layout of one `VideoSequence` tag.
//!
//! Layout, in order: width/height varints; `f32` frame rate; alpha plane
//! offsets (only when the enclosing block's `has_alpha` flag is set); SPS
//! and PPS with their 4-byte Annex-B start codes stripped; frame count; all
//! keyframe flags packed one bit per frame; then all
//! `(timestamp, payload-minus-start-code)` pairs. The two-pass columnar
//! layout lets a reader load just the keyframe bitmap without touching
//! payloads. A static-time-range list may follow; containers written before
//! that field existed simply end here, so presence is detected by remaining
//! bytes, never by a flag.

use crate::codec::stream::{ByteReader, ByteWriter};
use crate::codec::tags::{TagCode, write_tag};
use crate::foundation::core::TimeRange;
use crate::foundation::error::{FramepackError, FramepackResult};
use crate::sequence::model::{VideoFrame, VideoSequence};

const START_CODE: [u8; 4] = [0, 0, 0, 1];

fn write_bytes_without_start_code(writer: &mut ByteWriter, bytes: &[u8]) -> FramepackResult<()> {
    if bytes.len() < 4 || bytes[..4] != START_CODE {
        return Err(FramepackError::validation(
            "elementary-stream payload must begin with a 4-byte Annex-B start code",
        ));
    }
    writer.write_encoded_u32((bytes.len() - 4) as u32);
    writer.write_bytes(&bytes[4..]);
    Ok(())
}

fn read_bytes_with_start_code(reader: &mut ByteReader<'_>) -> FramepackResult<Vec<u8>> {
    let length = reader.read_encoded_u32()? as usize;
    let body = reader.read_bytes(length)?;
    let mut bytes = Vec::with_capacity(length + 4);
    bytes.extend_from_slice(&START_CODE);
    bytes.extend_from_slice(body);
    Ok(bytes)
}

/// Serialize the unframed body of one `VideoSequence` tag.
pub fn write_video_sequence_body(
    writer: &mut ByteWriter,
    sequence: &VideoSequence,
    has_alpha: bool,
) -> FramepackResult<()> {
    writer.write_encoded_u32(sequence.width as u32);
    writer.write_encoded_u32(sequence.height as u32);
    writer.write_f32_le(sequence.frame_rate);
    if has_alpha {
        writer.write_encoded_u32(sequence.alpha_start_x as u32);
        writer.write_encoded_u32(sequence.alpha_start_y as u32);
    }
    write_bytes_without_start_code(writer, &sequence.sps)?;
    write_bytes_without_start_code(writer, &sequence.pps)?;

    writer.write_encoded_u32(sequence.frames.len() as u32);
    for frame in &sequence.frames {
        writer.write_bit(frame.is_keyframe);
    }
    for frame in &sequence.frames {
        writer.write_encoded_i64(frame.timestamp);
        write_bytes_without_start_code(writer, &frame.bytes)?;
    }

    if let Some(ranges) = &sequence.static_time_ranges {
        writer.write_encoded_u32(ranges.len() as u32);
        for range in ranges {
            writer.write_encoded_i64(range.start);
            writer.write_encoded_i64(range.end);
        }
    }
    Ok(())
}

/// Serialize one framed `VideoSequence` tag.
pub fn write_video_sequence_tag(
    writer: &mut ByteWriter,
    sequence: &VideoSequence,
    has_alpha: bool,
) -> FramepackResult<()> {
    write_tag(writer, TagCode::VideoSequence, |w| {
        write_video_sequence_body(w, sequence, has_alpha)
    })
}

/// Parse the unframed body of one `VideoSequence` tag.
pub fn read_video_sequence_body(
    reader: &mut ByteReader<'_>,
    has_alpha: bool,
) -> FramepackResult<VideoSequence> {
    let width = reader.read_encoded_u32()? as i32;
    let height = reader.read_encoded_u32()? as i32;
    let frame_rate = reader.read_f32_le()?;
    let (alpha_start_x, alpha_start_y) = if has_alpha {
        (
            reader.read_encoded_u32()? as i32,
            reader.read_encoded_u32()? as i32,
        )
    } else {
        (0, 0)
    };
    let sps = read_bytes_with_start_code(reader)?;
    let pps = read_bytes_with_start_code(reader)?;

    let count = reader.read_encoded_u32()? as usize;
    let mut keyframes = Vec::with_capacity(count);
    for _ in 0..count {
        keyframes.push(reader.read_bit()?);
    }
    let mut frames = Vec::with_capacity(count);
    for is_keyframe in keyframes {
        let timestamp = reader.read_encoded_i64()?;
        let bytes = read_bytes_with_start_code(reader)?;
        frames.push(VideoFrame {
            is_keyframe,
            timestamp,
            bytes,
        });
    }

    // Older containers end here; the trailing section has no presence flag.
    let static_time_ranges = if reader.bytes_available() > 0 {
        let range_count = reader.read_encoded_u32()? as usize;
        let mut ranges = Vec::with_capacity(range_count);
        for _ in 0..range_count {
            let start = reader.read_encoded_i64()?;
            let end = reader.read_encoded_i64()?;
            ranges.push(TimeRange::new(start, end));
        }
        Some(ranges)
    } else {
        None
    };

    Ok(VideoSequence {
        width,
        height,
        frame_rate,
        alpha_start_x,
        alpha_start_y,
        sps,
        pps,
        frames,
        static_time_ranges,
        mp4_header: None,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/codec/video_sequence.rs"]
mod tests;
