use crate::foundation::error::{FramepackError, FramepackResult};

/// An owned RGBA8888 raster buffer with row stride.
///
/// The stride is rounded up to an even pixel count and two rows of slack are
/// allocated past the logical height, so [`crate::raster::ops::odd_padding_rgba`]
/// can duplicate the last column/row in place without resizing. Encoders own
/// exactly two rolling frames (current and previous) and swap them each
/// iteration; a `RasterFrame` is never shared across passes.
#[derive(Clone, Debug)]
pub struct RasterFrame {
    width: i32,
    height: i32,
    stride: usize,
    data: Vec<u8>,
}

impl RasterFrame {
    /// Allocate a zeroed frame for a `width x height` canvas.
    pub fn new(width: i32, height: i32) -> FramepackResult<Self> {
        if width <= 0 || height <= 0 {
            return Err(FramepackError::validation(
                "raster frame dimensions must be positive",
            ));
        }
        let stride = (width as usize + (width as usize & 1)) * 4;
        let rows = height as usize + 2;
        Ok(Self {
            width,
            height,
            stride,
            data: vec![0u8; stride * rows],
        })
    }

    /// Logical width in pixels.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Logical height in pixels.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Width rounded up to even, the size seen by stream encoders after padding.
    pub fn even_width(&self) -> i32 {
        self.width + (self.width & 1)
    }

    /// Height rounded up to even, the size seen by stream encoders after padding.
    pub fn even_height(&self) -> i32 {
        self.height + (self.height & 1)
    }

    /// Row stride in bytes (may exceed `width * 4`).
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Full backing storage, including stride and padding slack.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Mutable full backing storage.
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// One row of pixel data, `stride` bytes long. `y` may address the
    /// padding row directly below the logical height.
    pub fn row(&self, y: i32) -> &[u8] {
        let start = y as usize * self.stride;
        &self.data[start..start + self.stride]
    }

    /// Mutable access to one row.
    pub fn row_mut(&mut self, y: i32) -> &mut [u8] {
        let start = y as usize * self.stride;
        &mut self.data[start..start + self.stride]
    }

    /// Read one RGBA pixel.
    pub fn pixel(&self, x: i32, y: i32) -> [u8; 4] {
        let row = self.row(y);
        let off = x as usize * 4;
        [row[off], row[off + 1], row[off + 2], row[off + 3]]
    }

    /// Write one RGBA pixel.
    pub fn put_pixel(&mut self, x: i32, y: i32, rgba: [u8; 4]) {
        let row = self.row_mut(y);
        let off = x as usize * 4;
        row[off..off + 4].copy_from_slice(&rgba);
    }

    /// Fill the entire backing buffer (padding slack included) with one byte
    /// value. Used to blank invisible frames to mid-gray.
    pub fn fill(&mut self, value: u8) {
        self.data.fill(value);
    }
}
