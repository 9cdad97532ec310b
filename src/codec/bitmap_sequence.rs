//! Binary layout of one `BitmapSequence` tag.
//!
//! Same columnar discipline as the video tag: dimensions and frame rate,
//! frame count, all keyframe flags packed one bit per frame, then per-frame
//! bitmap-rect lists. Still-image payloads are self-contained (no start
//! codes); empty payloads round-trip as empty.

use crate::codec::stream::{ByteReader, ByteWriter};
use crate::codec::tags::{TagCode, write_tag};
use crate::foundation::error::FramepackResult;
use crate::sequence::model::{BitmapFrame, BitmapRect, BitmapSequence};

/// Serialize the unframed body of one `BitmapSequence` tag.
pub fn write_bitmap_sequence_body(
    writer: &mut ByteWriter,
    sequence: &BitmapSequence,
) -> FramepackResult<()> {
    writer.write_encoded_u32(sequence.width as u32);
    writer.write_encoded_u32(sequence.height as u32);
    writer.write_f32_le(sequence.frame_rate);

    writer.write_encoded_u32(sequence.frames.len() as u32);
    for frame in &sequence.frames {
        writer.write_bit(frame.is_keyframe);
    }
    for frame in &sequence.frames {
        writer.write_encoded_u32(frame.bitmaps.len() as u32);
        for bitmap in &frame.bitmaps {
            writer.write_encoded_i32(bitmap.x);
            writer.write_encoded_i32(bitmap.y);
            writer.write_encoded_u32(bitmap.bytes.len() as u32);
            writer.write_bytes(&bitmap.bytes);
        }
    }
    Ok(())
}

/// Serialize one framed `BitmapSequence` tag.
pub fn write_bitmap_sequence_tag(
    writer: &mut ByteWriter,
    sequence: &BitmapSequence,
) -> FramepackResult<()> {
    write_tag(writer, TagCode::BitmapSequence, |w| {
        write_bitmap_sequence_body(w, sequence)
    })
}

/// Parse the unframed body of one `BitmapSequence` tag.
pub fn read_bitmap_sequence_body(
    reader: &mut ByteReader<'_>,
) -> FramepackResult<BitmapSequence> {
    let width = reader.read_encoded_u32()? as i32;
    let height = reader.read_encoded_u32()? as i32;
    let frame_rate = reader.read_f32_le()?;

    let count = reader.read_encoded_u32()? as usize;
    let mut keyframes = Vec::with_capacity(count);
    for _ in 0..count {
        keyframes.push(reader.read_bit()?);
    }
    let mut frames = Vec::with_capacity(count);
    for is_keyframe in keyframes {
        let bitmap_count = reader.read_encoded_u32()? as usize;
        let mut bitmaps = Vec::with_capacity(bitmap_count);
        for _ in 0..bitmap_count {
            let x = reader.read_encoded_i32()?;
            let y = reader.read_encoded_i32()?;
            let length = reader.read_encoded_u32()? as usize;
            let bytes = reader.read_bytes(length)?.to_vec();
            bitmaps.push(BitmapRect { x, y, bytes });
        }
        frames.push(BitmapFrame {
            is_keyframe,
            bitmaps,
        });
    }

    Ok(BitmapSequence {
        width,
        height,
        frame_rate,
        frames,
    })
}
