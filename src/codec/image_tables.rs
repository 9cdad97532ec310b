//! Binary layout of the `ImageTables` tag.
//!
//! Entries with zero-length bytes are never serialized, so the serialized
//! index does not match the in-memory index; entries carry their own stable
//! id for exactly that reason.

use crate::codec::stream::{ByteReader, ByteWriter};
use crate::codec::tags::{TagCode, write_tag};
use crate::foundation::error::FramepackResult;
use crate::sequence::model::{ImageBytes, ImageTables};

/// Serialize the unframed body of one `ImageTables` tag.
pub fn write_image_tables_body(
    writer: &mut ByteWriter,
    tables: &ImageTables,
) -> FramepackResult<()> {
    let present = tables.images.iter().filter(|i| !i.bytes.is_empty());
    writer.write_encoded_u32(present.clone().count() as u32);
    for image in present {
        writer.write_encoded_u32(image.id);
        writer.write_encoded_u32(image.bytes.len() as u32);
        writer.write_bytes(&image.bytes);
    }
    Ok(())
}

/// Serialize one framed `ImageTables` tag.
pub fn write_image_tables_tag(
    writer: &mut ByteWriter,
    tables: &ImageTables,
) -> FramepackResult<()> {
    write_tag(writer, TagCode::ImageTables, |w| {
        write_image_tables_body(w, tables)
    })
}

/// Parse the unframed body of one `ImageTables` tag.
pub fn read_image_tables_body(reader: &mut ByteReader<'_>) -> FramepackResult<ImageTables> {
    let count = reader.read_encoded_u32()? as usize;
    let mut images = Vec::with_capacity(count);
    for _ in 0..count {
        let id = reader.read_encoded_u32()?;
        let length = reader.read_encoded_u32()? as usize;
        let bytes = reader.read_bytes(length)?.to_vec();
        images.push(ImageBytes { id, bytes });
    }
    Ok(ImageTables { images })
}

#[cfg(test)]
#[path = "../../tests/unit/codec/image_tables.rs"]
mod tests;
