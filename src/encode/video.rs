//! H.264 video sequence encoding.
//!
//! Drives a frame loop with resampling and crop, visibility-range clipping
//! against the owning composition's reference timeline, static-run
//! detection, alpha-channel detection with a bounded full re-encode
//! fallback, per-frame type decisions, and a tail flush for encoder-internal
//! delay.

use std::mem;

use crate::composition::model::{Composition, is_visible, visible_ranges};
use crate::encode::source::FrameSource;
use crate::encode::stream::{
    FrameType, FrameTypeHint, StreamConfig, StreamEncoderFactory, StreamHeaders,
};
use crate::encode::{FACTOR_UNITY_THRESHOLD, capped_factor, resampled_duration, scaled_extent};
use crate::foundation::core::{PixelRect, TimeRange};
use crate::foundation::error::{FramepackError, FramepackResult};
use crate::pipeline::{ExportContext, Warning};
use crate::raster::frame::RasterFrame;
use crate::raster::ops::{OpaqueBounds, copy_rect, detect_alpha, is_static, odd_padding_rgba, scale_bilinear};
use crate::sequence::model::{VideoFrame, VideoSequence};

/// Fill byte for frames outside their visibility window: unencoded motion,
/// but the frame slot still exists so the timebase stays aligned.
const INVISIBLE_FILL: u8 = 128;

/// Content covering at least this share of the canvas is treated as full
/// canvas when measuring the crop window.
const FULL_CONTENT_PERCENT: i64 = 90;

/// Fallback crop extent for compositions with no visible content at all.
const NO_CONTENT_FALLBACK: i32 = 16;

/// The alpha hypothesis shared across the scale variants of one
/// composition: detection runs once, the first variant paying for a wrong
/// guess with exactly one discarded pass.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlphaState {
    /// `true` once a full pass has settled the question.
    pub detected: bool,
    /// Current working assumption.
    pub has_alpha: bool,
}

/// Frame-type decision, in priority order: force a fresh reference when
/// motion resumes after a freeze or when visibility toggles; force
/// non-reference-quality encoding while content is deliberately hidden;
/// otherwise let the encoder decide.
fn decide_frame_type(
    is_static: bool,
    last_static: bool,
    visible: bool,
    last_visible: bool,
) -> FrameTypeHint {
    if !is_static && last_static {
        FrameTypeHint::I
    } else if visible != last_visible {
        FrameTypeHint::I
    } else if !visible {
        FrameTypeHint::P
    } else {
        FrameTypeHint::Auto
    }
}

/// Discover the tightest crop window across the entire timeline of `comp`
/// before encoding begins.
///
/// Accumulates opaque bounds over visible frames only, bailing out early
/// once the bounds cover the canvas. A composition with no visible content
/// yields a small fallback window plus a warning; near-full content snaps to
/// the full canvas.
#[tracing::instrument(skip_all, fields(composition = comp.id))]
pub fn measure_content_rect(
    ctx: &mut ExportContext,
    source: &mut dyn FrameSource,
    comp: &Composition,
    root: &Composition,
) -> FramepackResult<PixelRect> {
    let ranges = visible_ranges(root, comp.id);
    let rate_factor = f64::from(root.frame_rate) / f64::from(comp.frame_rate);
    let mut buf = RasterFrame::new(comp.width, comp.height)?;
    let mut bounds = OpaqueBounds::new();

    let mut frame = 0i64;
    while frame < comp.duration && !ctx.cancel.is_cancelled() {
        let dims = source.render_into(comp, frame, comp.frame_rate, &mut buf)?;
        if dims != (comp.width, comp.height) {
            ctx.push_warning(Warning::RenderMismatch {
                frame,
                got: dims,
                expected: (comp.width, comp.height),
            });
            frame += 1;
            continue;
        }
        if is_visible(&ranges, frame, rate_factor) {
            bounds.accumulate(&buf);
            if bounds.covers(comp.width, comp.height) {
                break;
            }
        }
        frame += 1;
    }

    let full = PixelRect::full(comp.width, comp.height);
    Ok(match bounds.to_rect() {
        None => {
            ctx.push_warning(Warning::NoContent {
                composition: comp.id,
            });
            PixelRect::new(
                0,
                0,
                NO_CONTENT_FALLBACK.min(comp.width),
                NO_CONTENT_FALLBACK.min(comp.height),
            )
        }
        Some(rect) if rect.area() * 100 >= full.area() * FULL_CONTENT_PERCENT => full,
        Some(rect) => rect,
    })
}

/// Produce one [`VideoSequence`] for `comp` at the given scale factor and
/// target frame rate, cropped to `content_rect`.
///
/// Runs at most two passes: when the alpha hypothesis is refuted (alpha
/// found under a no-alpha assumption mid-pass, or an alpha assumption that
/// never saw alpha by end of pass), all frames encoded so far are discarded,
/// the hypothesis flips, and the pass restarts once. Cancellation yields the
/// partial sequence for the caller to discard.
#[tracing::instrument(skip_all, fields(composition = comp.id, factor, frame_rate))]
#[allow(clippy::too_many_arguments)]
pub fn encode_video_sequence(
    ctx: &mut ExportContext,
    alpha: &mut AlphaState,
    source: &mut dyn FrameSource,
    factory: &dyn StreamEncoderFactory,
    comp: &Composition,
    root: &Composition,
    factor: f32,
    frame_rate: f32,
    content_rect: PixelRect,
) -> FramepackResult<VideoSequence> {
    let frame_rate = frame_rate.min(comp.frame_rate);
    let duration = resampled_duration(comp, frame_rate);
    let factor = capped_factor(factor, comp, ctx.config.max_resolution);

    let (seq_width, seq_height, scaled) = if factor > FACTOR_UNITY_THRESHOLD {
        (content_rect.width, content_rect.height, false)
    } else {
        (
            scaled_extent(content_rect.width, factor),
            scaled_extent(content_rect.height, factor),
            true,
        )
    };
    // Render straight into the rolling buffer when neither crop nor scale
    // applies; otherwise go through a nominal-size staging buffer.
    let direct_render = !scaled && content_rect == PixelRect::full(comp.width, comp.height);

    let ranges = visible_ranges(root, comp.id);
    let rate_factor = f64::from(root.frame_rate) / f64::from(frame_rate);

    for _attempt in 0..2 {
        let has_alpha = alpha.has_alpha;
        let mut encoder = factory.create(&StreamConfig {
            width: seq_width + (seq_width & 1),
            height: seq_height + (seq_height & 1),
            frame_rate,
            has_alpha,
            keyframe_interval: ctx.config.keyframe_interval,
            quality: ctx.config.sequence_quality,
            hardware: ctx.config.hardware,
        })?;
        let StreamHeaders { sps, pps } = encoder.headers()?;
        let (alpha_start_x, alpha_start_y) = encoder.alpha_start();

        let mut cur = RasterFrame::new(seq_width, seq_height)?;
        let mut prev = RasterFrame::new(seq_width, seq_height)?;
        let mut render_buf = if direct_render {
            None
        } else {
            Some(RasterFrame::new(comp.width, comp.height)?)
        };

        let mut frames: Vec<VideoFrame> = Vec::new();
        let mut static_ranges: Vec<TimeRange> = Vec::new();
        let mut run_start = 0i64;
        let mut last_static = true;
        let mut last_visible = false;
        let mut alpha_seen = false;
        let mut restart = false;

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
                frame += 1;
                continue;
            }

            let visible = is_visible(&ranges, frame, rate_factor);
            if !visible {
                cur.fill(INVISIBLE_FILL);
            } else {
                if let Some(buf) = &render_buf {
                    if scaled {
                        scale_bilinear(&mut cur, buf, content_rect);
                    } else {
                        copy_rect(&mut cur, buf, content_rect);
                    }
                }
                if !alpha.detected && detect_alpha(&cur) {
                    alpha_seen = true;
                    if !has_alpha {
                        // Hypothesis refuted: discard this pass and re-encode
                        // with an alpha plane.
                        alpha.has_alpha = true;
                        restart = true;
                        break;
                    }
                }
                odd_padding_rgba(&mut cur);
            }

            let frame_static = frame > 0 && is_static(&cur, &prev);
            let hint = decide_frame_type(frame_static, last_static, visible, last_visible);
            if let Some(chunk) = encoder.encode(Some(&cur), hint)? {
                frames.push(VideoFrame {
                    is_keyframe: chunk.frame_type == FrameType::I,
                    timestamp: chunk.timestamp,
                    bytes: chunk.bytes,
                });
            }

            if frame_static {
                if !last_static {
                    run_start = frame;
                }
                if frame == duration - 1 {
                    static_ranges.push(TimeRange::new(run_start, frame));
                }
            } else if last_static && frame > 0 {
                static_ranges.push(TimeRange::new(run_start, frame - 1));
            }
            last_static = frame_static;
            last_visible = visible;

            mem::swap(&mut cur, &mut prev);
            frame += 1;
        }

        let cancelled = ctx.cancel.is_cancelled();
        if !cancelled {
            if restart {
                alpha.detected = true;
                continue;
            }
            if !alpha.detected && has_alpha && !alpha_seen {
                // The reverse refutation: an alpha plane was assumed but the
                // content is fully opaque throughout.
                alpha.has_alpha = false;
                alpha.detected = true;
                continue;
            }
        }
        alpha.detected = true;

        if !cancelled {
            // Drain the encoder's internal delay buffer.
            while !ctx.cancel.is_cancelled() {
                match encoder.encode(None, FrameTypeHint::Auto)? {
                    Some(chunk) => frames.push(VideoFrame {
                        is_keyframe: chunk.frame_type == FrameType::I,
                        timestamp: chunk.timestamp,
                        bytes: chunk.bytes,
                    }),
                    None => break,
                }
            }
        }

        return Ok(VideoSequence {
            width: seq_width,
            height: seq_height,
            frame_rate,
            alpha_start_x,
            alpha_start_y,
            sps,
            pps,
            frames,
            static_time_ranges: Some(static_ranges),
            mp4_header: None,
        });
    }

    Err(FramepackError::encode(
        "alpha hypothesis failed to converge after one retry",
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/video.rs"]
mod tests;
