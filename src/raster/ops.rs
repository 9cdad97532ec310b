//! Pure rect algebra over raw RGBA buffers.
//!
//! Stateless scans used by both sequence encoders: transparent-edge clipping,
//! two-buffer diffing, rect-history-aware expansion, alpha detection,
//! odd-dimension padding and opaque-bounds accumulation. No allocation beyond
//! the returned [`PixelRect`].

use crate::foundation::core::PixelRect;
use crate::raster::frame::RasterFrame;

/// Minimal bounding box of pixels with non-zero alpha.
///
/// A fully transparent buffer yields a 1x1 rect at the origin, never an empty
/// rect: downstream still encoders require at least one pixel to encode.
pub fn clip_transparent_edge(frame: &RasterFrame) -> PixelRect {
    let width = frame.width();
    let height = frame.height();
    let mut min_x = width - 1;
    let mut min_y = height - 1;
    let mut max_x = 0;
    let mut max_y = 0;

    for y in 0..height {
        let row = frame.row(y);
        for x in 0..width as usize {
            if row[x * 4 + 3] != 0 {
                let x = x as i32;
                min_x = min_x.min(x);
                max_x = max_x.max(x);
                min_y = min_y.min(y);
                max_y = max_y.max(y);
            }
        }
    }

    if min_x <= max_x {
        PixelRect::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1)
    } else {
        PixelRect::new(0, 0, 1, 1)
    }
}

/// Minimal bounding box of pixels whose full 32-bit RGBA value differs
/// between `cur` and `prev`. Pixel-identical buffers yield the zero-size rect.
pub fn diff_rect(cur: &RasterFrame, prev: &RasterFrame) -> PixelRect {
    let width = cur.width();
    let height = cur.height();
    let mut min_x = width - 1;
    let mut min_y = height - 1;
    let mut max_x = 0;
    let mut max_y = 0;

    for y in 0..height {
        let row_bytes = width as usize * 4;
        let cur_row = &cur.row(y)[..row_bytes];
        let prev_row = &prev.row(y)[..row_bytes];
        for (x, (a, b)) in cur_row
            .chunks_exact(4)
            .zip(prev_row.chunks_exact(4))
            .enumerate()
        {
            if a != b {
                let x = x as i32;
                min_x = min_x.min(x);
                max_x = max_x.max(x);
                min_y = min_y.min(y);
                max_y = max_y.max(y);
            }
        }
    }

    if min_x <= max_x {
        PixelRect::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1)
    } else {
        PixelRect::zero()
    }
}

/// `true` iff every pixel matches exactly. Cheaper than [`diff_rect`] when
/// only the boolean is needed: bails out at the first differing pixel.
pub fn is_static(cur: &RasterFrame, prev: &RasterFrame) -> bool {
    let row_bytes = cur.width() as usize * 4;
    for y in 0..cur.height() {
        if cur.row(y)[..row_bytes] != prev.row(y)[..row_bytes] {
            return false;
        }
    }
    true
}

fn in_range(val: i32, pos: i32, extent: i32) -> bool {
    val >= pos && val <= pos + extent
}

/// Grow `src` by up to `expand` pixels per side, but only on sides that were
/// themselves touching `last`'s corresponding span.
///
/// Stabilizes a diff rect's edges across frames so 1-pixel jitter does not
/// make the rect oscillate and churn the still encoder at rect boundaries.
/// The result always contains `src` and never exceeds the canvas.
pub fn expand_rect_range(
    src: PixelRect,
    last: PixelRect,
    canvas_width: i32,
    canvas_height: i32,
    expand: i32,
) -> PixelRect {
    let mut left = 0;
    let mut top = 0;
    let mut right = 0;
    let mut bottom = 0;

    if in_range(src.x, last.x, last.width) {
        left = expand.min(src.x);
    }
    if in_range(src.x + src.width, last.x, last.width) {
        right = expand.min(canvas_width - (src.x + src.width));
    }
    if in_range(src.y, last.y, last.height) {
        top = expand.min(src.y);
    }
    if in_range(src.y + src.height, last.y, last.height) {
        bottom = expand.min(canvas_height - (src.y + src.height));
    }

    PixelRect::new(
        src.x - left,
        src.y - top,
        src.width + left + right,
        src.height + top + bottom,
    )
}

/// `true` iff any pixel's alpha byte is not 255.
pub fn detect_alpha(frame: &RasterFrame) -> bool {
    for y in 0..frame.height() {
        let row = frame.row(y);
        let mut sum = 0xFFu8;
        for x in 0..frame.width() as usize {
            sum &= row[x * 4 + 3];
        }
        if sum != 0xFF {
            return true;
        }
    }
    false
}

/// Duplicate the last valid column/row in place when width or height is odd.
///
/// Stream encoders require even dimensions; the frame's stride and row slack
/// guarantee the duplicated pixels fit without resizing.
pub fn odd_padding_rgba(frame: &mut RasterFrame) {
    let width = frame.width();
    let height = frame.height();
    let stride = frame.stride();
    let mut padded_width = width;

    if width & 1 == 1 && stride >= (width as usize + 1) * 4 {
        for y in 0..height {
            let row = frame.row_mut(y);
            let off = width as usize * 4;
            let (prev, next) = row.split_at_mut(off);
            next[..4].copy_from_slice(&prev[off - 4..off]);
        }
        padded_width = width + 1;
    }

    if height & 1 == 1 {
        let row_bytes = padded_width as usize * 4;
        let last = height as usize * stride;
        let bytes = frame.bytes_mut();
        bytes.copy_within(last - stride..last - stride + row_bytes, last);
    }
}

/// Running min/max bounding box of non-zero-alpha pixels across repeated
/// [`OpaqueBounds::accumulate`] calls.
///
/// Used to discover the tightest common crop window across the entire
/// timeline of a composition before video encoding begins.
#[derive(Clone, Copy, Debug)]
pub struct OpaqueBounds {
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
}

impl OpaqueBounds {
    /// An empty accumulator.
    pub fn new() -> Self {
        Self {
            left: i32::MAX,
            top: i32::MAX,
            right: -1,
            bottom: -1,
        }
    }

    /// Fold one frame's non-transparent pixels into the bounds. Skips the
    /// scan once the bounds already cover the frame.
    pub fn accumulate(&mut self, frame: &RasterFrame) {
        let width = frame.width();
        let height = frame.height();
        if self.covers(width, height) {
            return;
        }
        for y in 0..height {
            let row = frame.row(y);
            for x in 0..width as usize {
                if row[x * 4 + 3] != 0 {
                    let x = x as i32;
                    self.left = self.left.min(x);
                    self.right = self.right.max(x + 1);
                    self.top = self.top.min(y);
                    self.bottom = self.bottom.max(y + 1);
                }
            }
        }
    }

    /// `true` once the accumulated bounds span the whole `width x height`
    /// canvas, at which point further accumulation is a no-op.
    pub fn covers(&self, width: i32, height: i32) -> bool {
        self.right - self.left >= width && self.bottom - self.top >= height
    }

    /// The accumulated bounding box, or `None` when every scanned pixel was
    /// transparent.
    pub fn to_rect(&self) -> Option<PixelRect> {
        if self.right - self.left <= 0 || self.bottom - self.top <= 0 {
            return None;
        }
        Some(PixelRect::new(
            self.left,
            self.top,
            self.right - self.left,
            self.bottom - self.top,
        ))
    }
}

impl Default for OpaqueBounds {
    fn default() -> Self {
        Self::new()
    }
}

/// Copy `src_rect` of `src` to the origin of `dst`. The rect dimensions must
/// equal the destination's logical dimensions.
pub fn copy_rect(dst: &mut RasterFrame, src: &RasterFrame, src_rect: PixelRect) {
    debug_assert_eq!(dst.width(), src_rect.width);
    debug_assert_eq!(dst.height(), src_rect.height);
    let row_bytes = src_rect.width as usize * 4;
    let src_off = src_rect.x as usize * 4;
    for y in 0..src_rect.height {
        let src_row = &src.row(src_rect.y + y)[src_off..src_off + row_bytes];
        dst.row_mut(y)[..row_bytes].copy_from_slice(src_row);
    }
}

/// Bilinear downscale/upscale of `src_rect` in `src` onto the full canvas of
/// `dst`.
pub fn scale_bilinear(dst: &mut RasterFrame, src: &RasterFrame, src_rect: PixelRect) {
    let dst_width = dst.width();
    let dst_height = dst.height();
    let src_width = src_rect.width;
    let src_height = src_rect.height;
    let x_factor = f64::from(src_width) / f64::from(dst_width);
    let y_factor = f64::from(src_height) / f64::from(dst_height);

    for j in 0..dst_height {
        let sj = ((f64::from(j) * y_factor) as i32).min(src_height - 1);
        let sj1 = (sj + 1).min(src_height - 1);
        let y1 = f64::from(j) * y_factor - f64::from(sj);
        let y0 = 1.0 - y1;

        let src0 = src.row(src_rect.y + sj);
        let src1 = src.row(src_rect.y + sj1);

        let dst_row = dst.row_mut(j);
        for i in 0..dst_width {
            let si = ((f64::from(i) * x_factor) as i32).min(src_width - 1);
            let si1 = (si + 1).min(src_width - 1);
            let x1 = f64::from(i) * x_factor - f64::from(si);
            let x0 = 1.0 - x1;

            let o00 = (src_rect.x + si) as usize * 4;
            let o01 = (src_rect.x + si1) as usize * 4;
            let d = i as usize * 4;
            for c in 0..4 {
                let v = f64::from(src0[o00 + c]) * x0 * y0
                    + f64::from(src0[o01 + c]) * x1 * y0
                    + f64::from(src1[o00 + c]) * x0 * y1
                    + f64::from(src1[o01 + c]) * x1 * y1;
                dst_row[d + c] = v.round() as u8;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/ops.rs"]
mod tests;
