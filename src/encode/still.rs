use std::io::Cursor;

use crate::foundation::core::PixelRect;
use crate::foundation::error::{FramepackError, FramepackResult};
use crate::raster::frame::RasterFrame;

/// The still-image encoder collaborator.
///
/// Encodes a sub-rectangle of an RGBA frame into a self-contained image
/// payload. An empty return value is allowed and treated by callers as a
/// recoverable per-frame failure (warning, frame emitted with null payload).
pub trait StillEncoder {
    /// Encode `rect` of `frame` at `quality` in `[0, 100]`.
    fn encode_rgba(
        &mut self,
        frame: &RasterFrame,
        rect: PixelRect,
        quality: u8,
    ) -> FramepackResult<Vec<u8>>;
}

/// Default [`StillEncoder`] backed by the `image` crate's WebP encoder.
///
/// The encoder is lossless, so `quality` is accepted for interface parity
/// and not consulted. Scratch row storage is reused across calls.
#[derive(Debug, Default)]
pub struct WebpStillEncoder {
    scratch: Vec<u8>,
}

impl WebpStillEncoder {
    /// Create an encoder with an empty scratch buffer.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StillEncoder for WebpStillEncoder {
    fn encode_rgba(
        &mut self,
        frame: &RasterFrame,
        rect: PixelRect,
        _quality: u8,
    ) -> FramepackResult<Vec<u8>> {
        if rect.is_empty() || !PixelRect::full(frame.width(), frame.height()).contains_rect(rect) {
            return Err(FramepackError::validation(
                "still encode rect must be non-empty and inside the frame",
            ));
        }

        // The webp encoder wants tightly packed rows; gather the sub-rect.
        let row_bytes = rect.width as usize * 4;
        self.scratch.clear();
        self.scratch.reserve(row_bytes * rect.height as usize);
        let x_off = rect.x as usize * 4;
        for y in rect.y..rect.y + rect.height {
            self.scratch
                .extend_from_slice(&frame.row(y)[x_off..x_off + row_bytes]);
        }

        let mut out = Cursor::new(Vec::new());
        image::codecs::webp::WebPEncoder::new_lossless(&mut out)
            .encode(
                &self.scratch,
                rect.width as u32,
                rect.height as u32,
                image::ExtendedColorType::Rgba8,
            )
            .map_err(|e| FramepackError::encode(format!("webp encode failed: {e}")))?;
        Ok(out.into_inner())
    }
}
