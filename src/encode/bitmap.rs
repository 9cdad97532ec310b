//! Delta-encoded bitmap sequence encoding.
//!
//! Drives a frame loop over a composition, computing per-frame diff rects,
//! applying the keyframe policy, and invoking the still encoder on
//! sub-rects. Keyframes crop to visible content; delta frames carry the
//! stabilized diff rect; pixel-identical frames carry no payload at all.

use std::mem;

use crate::composition::model::Composition;
use crate::encode::source::FrameSource;
use crate::encode::still::StillEncoder;
use crate::encode::{FACTOR_UNITY_THRESHOLD, capped_factor, resampled_duration, scaled_extent};
use crate::foundation::core::PixelRect;
use crate::foundation::error::FramepackResult;
use crate::pipeline::{ExportContext, Warning};
use crate::raster::frame::RasterFrame;
use crate::raster::ops::{clip_transparent_edge, diff_rect, expand_rect_range, scale_bilinear};
use crate::sequence::model::{BitmapFrame, BitmapRect, BitmapSequence};

/// Diff coverage (percent of canvas) above which a keyframe is forced once
/// [`LARGE_DIFF_MIN_ELAPSED`] frames have passed since the last one.
const LARGE_DIFF_PERCENT: i64 = 90;
const LARGE_DIFF_MIN_ELAPSED: i64 = 5;

/// Lower coverage threshold used only with long keyframe intervals, once
/// half the interval has elapsed.
const MEDIUM_DIFF_PERCENT: i64 = 75;
const MEDIUM_DIFF_MIN_INTERVAL: i32 = 20;

/// Margin for [`expand_rect_range`] stabilizing delta-rect edges between
/// frames, reducing still-encoder churn at rect boundaries.
const RECT_EXPAND_MARGIN: i32 = 4;

/// Keyframe policy, evaluated in priority order; first match wins.
///
/// The thresholds are empirically tuned; behavioral parity with existing
/// containers matters more than re-derived values.
fn decide_is_keyframe(
    frame: i64,
    last_keyframe: i64,
    diff_area: i64,
    full_area: i64,
    interval: i32,
) -> bool {
    let elapsed = frame - last_keyframe;
    if frame == 0 {
        true
    } else if diff_area == full_area {
        true
    } else if diff_area > full_area * LARGE_DIFF_PERCENT / 100 && elapsed > LARGE_DIFF_MIN_ELAPSED {
        true
    } else if diff_area > full_area * MEDIUM_DIFF_PERCENT / 100
        && interval > MEDIUM_DIFF_MIN_INTERVAL
        && elapsed > i64::from(interval / 2)
    {
        true
    } else if diff_area == 0 {
        // Pixel-identical frame: never a keyframe, no payload either.
        false
    } else {
        // Interval 0 means only frame 0 is ever a keyframe.
        interval > 0 && elapsed >= i64::from(interval)
    }
}

/// Produce one [`BitmapSequence`] for `comp` at the given scale factor and
/// target frame rate.
///
/// Recoverable per-frame failures (render dimension mismatch, empty still
/// payload) are surfaced as warnings on `ctx` and never abort the sequence.
/// Cancellation leaves a partial sequence for the caller to discard.
#[tracing::instrument(skip_all, fields(composition = comp.id, factor, frame_rate))]
pub fn encode_bitmap_sequence(
    ctx: &mut ExportContext,
    source: &mut dyn FrameSource,
    still: &mut dyn StillEncoder,
    comp: &Composition,
    factor: f32,
    frame_rate: f32,
) -> FramepackResult<BitmapSequence> {
    let frame_rate = frame_rate.min(comp.frame_rate);
    let duration = resampled_duration(comp, frame_rate);
    let factor = capped_factor(factor, comp, ctx.config.max_resolution);

    let (seq_width, seq_height, scaled) = if factor > FACTOR_UNITY_THRESHOLD {
        (comp.width, comp.height, false)
    } else {
        (
            scaled_extent(comp.width, factor),
            scaled_extent(comp.height, factor),
            true,
        )
    };
    let full_area = i64::from(seq_width) * i64::from(seq_height);
    let interval = ctx.config.keyframe_interval;
    let quality = ctx.config.image_quality;

    let mut cur = RasterFrame::new(seq_width, seq_height)?;
    let mut prev = RasterFrame::new(seq_width, seq_height)?;
    let mut render_buf = if scaled {
        Some(RasterFrame::new(comp.width, comp.height)?)
    } else {
        None
    };

    let mut frames = Vec::with_capacity(duration as usize);
    let mut last_keyframe = 0i64;
    let mut last_rect = PixelRect::full(seq_width, seq_height);

    let mut frame = 0i64;
    while frame < duration && !ctx.cancel.is_cancelled() {
        let dims = match render_buf.as_mut() {
            Some(buf) => source.render_into(comp, frame, frame_rate, buf)?,
            None => source.render_into(comp, frame, frame_rate, &mut cur)?,
        };
        if dims != (comp.width, comp.height) {
            ctx.push_warning(Warning::RenderMismatch {
                frame,
                got: dims,
                expected: (comp.width, comp.height),
            });
            // Keep the frame count aligned with the declared duration, but
            // do not rotate the rolling buffers onto a bad render.
            frames.push(BitmapFrame::default());
            frame += 1;
            continue;
        }
        if let Some(buf) = &render_buf {
            scale_bilinear(&mut cur, buf, PixelRect::full(comp.width, comp.height));
        }

        let mut org_rect = PixelRect::full(seq_width, seq_height);
        if frame > 0 {
            org_rect = diff_rect(&cur, &prev);
        }

        let is_keyframe =
            decide_is_keyframe(frame, last_keyframe, org_rect.area(), full_area, interval);

        let mut encode_rect = org_rect;
        if is_keyframe {
            // Keyframes crop to the visible content, not the previous diff.
            org_rect = clip_transparent_edge(&cur);
            last_keyframe = frame;
            encode_rect = org_rect;
        } else if !org_rect.is_empty() {
            encode_rect =
                expand_rect_range(org_rect, last_rect, seq_width, seq_height, RECT_EXPAND_MARGIN);
        }
        last_rect = org_rect;

        let mut bitmaps = Vec::new();
        if !org_rect.is_empty() {
            let bytes = still
                .encode_rgba(&cur, encode_rect, quality)
                .unwrap_or_default();
            if bytes.is_empty() {
                ctx.push_warning(Warning::StillEncodeEmpty { frame });
            }
            bitmaps.push(BitmapRect {
                x: encode_rect.x,
                y: encode_rect.y,
                bytes,
            });
        }
        frames.push(BitmapFrame {
            is_keyframe,
            bitmaps,
        });

        mem::swap(&mut cur, &mut prev);
        frame += 1;
    }

    Ok(BitmapSequence {
        width: seq_width,
        height: seq_height,
        frame_rate,
        frames,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/encode/bitmap.rs"]
mod tests;
