//! Self-describing tag framing for the sequence container.
//!
//! A tag header is a little-endian `u16` packing a tag code in the upper 10
//! bits and the body length in the lower 6; lengths of `0x3F` or more escape
//! to an explicit `u32`. Readers skip unknown codes by length, which is what
//! keeps old readers compatible with new tag types.

use crate::codec::stream::{ByteReader, ByteWriter};
use crate::foundation::error::{FramepackError, FramepackResult};

const LENGTH_ESCAPE: u32 = 0x3F;

/// Tag codes used by the sequence container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagCode {
    /// Terminates a block's tag list.
    End,
    /// Ordered still-image blob table.
    ImageTables,
    /// Container block for one bitmap composition's sequence variants.
    BitmapCompositionBlock,
    /// One bitmap sequence variant.
    BitmapSequence,
    /// Container block for one video composition's sequence variants.
    VideoCompositionBlock,
    /// One video sequence variant.
    VideoSequence,
    /// Host-supplied MP4 container header for one video variant.
    Mp4Header,
}

impl TagCode {
    fn to_u16(self) -> u16 {
        match self {
            TagCode::End => 0,
            TagCode::ImageTables => 1,
            TagCode::BitmapCompositionBlock => 2,
            TagCode::BitmapSequence => 3,
            TagCode::VideoCompositionBlock => 4,
            TagCode::VideoSequence => 5,
            TagCode::Mp4Header => 6,
        }
    }

    fn from_u16(value: u16) -> Option<Self> {
        match value {
            0 => Some(TagCode::End),
            1 => Some(TagCode::ImageTables),
            2 => Some(TagCode::BitmapCompositionBlock),
            3 => Some(TagCode::BitmapSequence),
            4 => Some(TagCode::VideoCompositionBlock),
            5 => Some(TagCode::VideoSequence),
            6 => Some(TagCode::Mp4Header),
            _ => None,
        }
    }
}

/// A decoded tag header: the raw code and the body length in bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TagHeader {
    /// Raw tag code; [`TagHeader::code`] resolves it to a known [`TagCode`].
    pub raw_code: u16,
    /// Body length in bytes.
    pub length: u32,
}

impl TagHeader {
    /// The known tag code, or `None` for codes this reader should skip.
    pub fn code(self) -> Option<TagCode> {
        TagCode::from_u16(self.raw_code)
    }
}

/// Serialize one tag: body is produced by `body`, then framed with the
/// header carrying its final length.
pub fn write_tag(
    writer: &mut ByteWriter,
    code: TagCode,
    body: impl FnOnce(&mut ByteWriter) -> FramepackResult<()>,
) -> FramepackResult<()> {
    let mut body_writer = ByteWriter::new();
    body(&mut body_writer)?;
    let data = body_writer.finish();

    let length = data.len() as u32;
    if length < LENGTH_ESCAPE {
        writer.write_u16_le((code.to_u16() << 6) | length as u16);
    } else {
        writer.write_u16_le((code.to_u16() << 6) | LENGTH_ESCAPE as u16);
        writer.write_u32_le(length);
    }
    writer.write_bytes(&data);
    Ok(())
}

/// Write the end-of-block sentinel tag.
pub fn write_end_tag(writer: &mut ByteWriter) -> FramepackResult<()> {
    write_tag(writer, TagCode::End, |_| Ok(()))
}

/// Read one tag header.
pub fn read_tag_header(reader: &mut ByteReader<'_>) -> FramepackResult<TagHeader> {
    let packed = reader.read_u16_le()?;
    let raw_code = packed >> 6;
    let mut length = u32::from(packed & LENGTH_ESCAPE as u16);
    if length == LENGTH_ESCAPE {
        length = reader.read_u32_le()?;
    }
    Ok(TagHeader { raw_code, length })
}

/// Read one tag's body, bounds-checked against the remaining stream.
pub fn read_tag_body<'a>(
    reader: &mut ByteReader<'a>,
    header: TagHeader,
) -> FramepackResult<&'a [u8]> {
    reader.read_bytes(header.length as usize).map_err(|_| {
        FramepackError::codec(format!(
            "tag {} body overruns the stream ({} bytes declared)",
            header.raw_code, header.length
        ))
    })
}
