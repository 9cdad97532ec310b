//! Composition-level container blocks.
//!
//! A video composition block carries: the composition id, a single
//! `has_alpha` flag derived from the smallest-width variant (the canonical
//! representative), one `VideoSequence` tag per scale variant sorted
//! ascending by width (so readers can pick the smallest that satisfies their
//! requirements), one `Mp4Header` tag per variant that has one, and an end
//! sentinel. Mp4 header tags lead with the owning variant's width (variant
//! widths are unique), so decode re-associates them without positional
//! coupling.

use crate::codec::bitmap_sequence::{read_bitmap_sequence_body, write_bitmap_sequence_tag};
use crate::codec::stream::{ByteReader, ByteWriter};
use crate::codec::tags::{TagCode, read_tag_body, read_tag_header, write_end_tag, write_tag};
use crate::codec::video_sequence::{read_video_sequence_body, write_video_sequence_tag};
use crate::composition::model::CompositionId;
use crate::foundation::error::{FramepackError, FramepackResult};
use crate::sequence::model::{BitmapSequence, VideoSequence};

/// One video composition's serialized sequence variants.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoCompositionBlock {
    /// Owning composition id.
    pub id: CompositionId,
    /// Scale variants, ascending by width.
    pub sequences: Vec<VideoSequence>,
}

/// One bitmap composition's serialized sequence variants.
#[derive(Clone, Debug, PartialEq)]
pub struct BitmapCompositionBlock {
    /// Owning composition id.
    pub id: CompositionId,
    /// Scale variants, ascending by width.
    pub sequences: Vec<BitmapSequence>,
}

/// Serialize one video composition block.
pub fn write_video_composition_block(
    writer: &mut ByteWriter,
    id: CompositionId,
    sequences: &[VideoSequence],
) -> FramepackResult<()> {
    if sequences.is_empty() {
        return Err(FramepackError::validation(
            "a video composition block requires at least one sequence variant",
        ));
    }
    let mut ordered: Vec<&VideoSequence> = sequences.iter().collect();
    ordered.sort_by_key(|s| s.width);
    let has_alpha = ordered[0].has_alpha();

    write_tag(writer, TagCode::VideoCompositionBlock, |w| {
        w.write_encoded_u32(id);
        w.write_u8(u8::from(has_alpha));
        for sequence in &ordered {
            write_video_sequence_tag(w, sequence, has_alpha)?;
        }
        for sequence in &ordered {
            if let Some(header) = &sequence.mp4_header {
                write_tag(w, TagCode::Mp4Header, |w| {
                    w.write_encoded_u32(sequence.width as u32);
                    w.write_bytes(header);
                    Ok(())
                })?;
            }
        }
        write_end_tag(w)
    })
}

/// Decode one video composition block.
pub fn read_video_composition_block(
    reader: &mut ByteReader<'_>,
) -> FramepackResult<VideoCompositionBlock> {
    let header = read_tag_header(reader)?;
    if header.code() != Some(TagCode::VideoCompositionBlock) {
        return Err(FramepackError::codec(
            "expected a video composition block tag",
        ));
    }
    let body = read_tag_body(reader, header)?;
    let mut body_reader = ByteReader::new(body);

    let id = body_reader.read_encoded_u32()?;
    let has_alpha = body_reader.read_u8()? != 0;
    let mut sequences: Vec<VideoSequence> = Vec::new();
    loop {
        let tag = read_tag_header(&mut body_reader)?;
        match tag.code() {
            Some(TagCode::End) => break,
            Some(TagCode::VideoSequence) => {
                let tag_body = read_tag_body(&mut body_reader, tag)?;
                sequences.push(read_video_sequence_body(
                    &mut ByteReader::new(tag_body),
                    has_alpha,
                )?);
            }
            Some(TagCode::Mp4Header) => {
                let tag_body = read_tag_body(&mut body_reader, tag)?;
                let mut tag_reader = ByteReader::new(tag_body);
                let width = tag_reader.read_encoded_u32()? as i32;
                let bytes = tag_reader.read_bytes(tag_reader.bytes_available())?.to_vec();
                let owner = sequences
                    .iter_mut()
                    .find(|s| s.width == width)
                    .ok_or_else(|| {
                        FramepackError::codec(format!(
                            "mp4 header references unknown sequence width {width}"
                        ))
                    })?;
                owner.mp4_header = Some(bytes);
            }
            _ => {
                // Unknown tag from a newer writer: skip by length.
                read_tag_body(&mut body_reader, tag)?;
            }
        }
    }
    Ok(VideoCompositionBlock { id, sequences })
}

/// Serialize one bitmap composition block.
pub fn write_bitmap_composition_block(
    writer: &mut ByteWriter,
    id: CompositionId,
    sequences: &[BitmapSequence],
) -> FramepackResult<()> {
    if sequences.is_empty() {
        return Err(FramepackError::validation(
            "a bitmap composition block requires at least one sequence variant",
        ));
    }
    let mut ordered: Vec<&BitmapSequence> = sequences.iter().collect();
    ordered.sort_by_key(|s| s.width);

    write_tag(writer, TagCode::BitmapCompositionBlock, |w| {
        w.write_encoded_u32(id);
        for sequence in &ordered {
            write_bitmap_sequence_tag(w, sequence)?;
        }
        write_end_tag(w)
    })
}

/// Decode one bitmap composition block.
pub fn read_bitmap_composition_block(
    reader: &mut ByteReader<'_>,
) -> FramepackResult<BitmapCompositionBlock> {
    let header = read_tag_header(reader)?;
    if header.code() != Some(TagCode::BitmapCompositionBlock) {
        return Err(FramepackError::codec(
            "expected a bitmap composition block tag",
        ));
    }
    let body = read_tag_body(reader, header)?;
    let mut body_reader = ByteReader::new(body);

    let id = body_reader.read_encoded_u32()?;
    let mut sequences = Vec::new();
    loop {
        let tag = read_tag_header(&mut body_reader)?;
        match tag.code() {
            Some(TagCode::End) => break,
            Some(TagCode::BitmapSequence) => {
                let tag_body = read_tag_body(&mut body_reader, tag)?;
                sequences.push(read_bitmap_sequence_body(&mut ByteReader::new(tag_body))?);
            }
            _ => {
                read_tag_body(&mut body_reader, tag)?;
            }
        }
    }
    Ok(BitmapCompositionBlock { id, sequences })
}

#[cfg(test)]
#[path = "../../tests/unit/codec/composition_block.rs"]
mod tests;
