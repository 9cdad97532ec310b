use super::*;

use crate::composition::model::CompositionContent;
use crate::pipeline::ExportConfig;

fn comp(width: i32, height: i32, duration: i64) -> Composition {
    Composition {
        id: 1,
        width,
        height,
        frame_rate: 30.0,
        duration,
        content: CompositionContent::Bitmap,
    }
}

fn context(keyframe_interval: i32) -> ExportContext {
    ExportContext::new(ExportConfig {
        keyframe_interval,
        ..ExportConfig::default()
    })
}

/// Renders via a per-frame painter; frames listed in `bad_frames` report
/// wrong output dimensions instead.
struct ScriptedSource {
    painter: fn(i64, &mut RasterFrame),
    bad_frames: Vec<i64>,
}

impl ScriptedSource {
    fn new(painter: fn(i64, &mut RasterFrame)) -> Self {
        Self {
            painter,
            bad_frames: Vec::new(),
        }
    }
}

impl FrameSource for ScriptedSource {
    fn render_into(
        &mut self,
        comp: &Composition,
        frame: i64,
        _frame_rate: f32,
        dst: &mut RasterFrame,
    ) -> FramepackResult<(i32, i32)> {
        if self.bad_frames.contains(&frame) {
            return Ok((comp.width + 1, comp.height));
        }
        dst.fill(0);
        (self.painter)(frame, dst);
        Ok((comp.width, comp.height))
    }
}

/// Records every encode rect and returns a fixed payload.
#[derive(Default)]
struct RecordingStill {
    rects: Vec<PixelRect>,
}

impl StillEncoder for RecordingStill {
    fn encode_rgba(
        &mut self,
        _frame: &RasterFrame,
        rect: PixelRect,
        _quality: u8,
    ) -> FramepackResult<Vec<u8>> {
        self.rects.push(rect);
        Ok(vec![0xAB; 4])
    }
}

fn paint_square(frame: &mut RasterFrame, rect: PixelRect) {
    for y in rect.y..rect.y + rect.height {
        for x in rect.x..rect.x + rect.width {
            frame.put_pixel(x, y, [200, 100, 50, 255]);
        }
    }
}

#[test]
fn keyframe_policy_priorities() {
    // Frame 0 is always a keyframe.
    assert!(decide_is_keyframe(0, 0, 0, 1000, 60));
    // A full-canvas diff always forces one.
    assert!(decide_is_keyframe(3, 0, 1000, 1000, 60));
    // A >90% diff needs more than 5 frames since the last keyframe.
    assert!(decide_is_keyframe(10, 0, 950, 1000, 60));
    assert!(!decide_is_keyframe(5, 0, 950, 1000, 60));
    // A >75% diff applies only with long intervals, past their half-way point.
    assert!(decide_is_keyframe(20, 0, 800, 1000, 30));
    assert!(!decide_is_keyframe(10, 0, 800, 1000, 30));
    assert!(!decide_is_keyframe(19, 0, 800, 1000, 20));
    // No diff never produces a keyframe, even past the interval.
    assert!(!decide_is_keyframe(100, 0, 0, 1000, 60));
    // Small diffs fall through to the interval rule.
    assert!(decide_is_keyframe(60, 0, 10, 1000, 60));
    assert!(!decide_is_keyframe(59, 0, 10, 1000, 60));
}

#[test]
fn zero_interval_disables_periodic_keyframes() {
    assert!(decide_is_keyframe(0, 0, 10, 1000, 0));
    assert!(!decide_is_keyframe(500, 0, 10, 1000, 0));
}

#[test]
fn static_composition_encodes_one_payload() {
    let comp = comp(32, 32, 10);
    let mut ctx = context(60);
    let mut source = ScriptedSource::new(|_, dst| {
        paint_square(dst, PixelRect::new(4, 6, 8, 8));
    });
    let mut still = RecordingStill::default();

    let sequence =
        encode_bitmap_sequence(&mut ctx, &mut source, &mut still, &comp, 1.0, 30.0).unwrap();

    assert_eq!(sequence.frames.len(), 10);
    assert!(sequence.frames[0].is_keyframe);
    assert_eq!(sequence.frames[0].bitmaps.len(), 1);
    // The keyframe crops to visible content.
    assert_eq!(still.rects, vec![PixelRect::new(4, 6, 8, 8)]);
    // Every later frame is pixel-identical: no keyframe, no payload.
    for frame in &sequence.frames[1..] {
        assert!(!frame.is_keyframe);
        assert!(frame.bitmaps.is_empty());
    }
    assert!(ctx.warnings().is_empty());
}

#[test]
fn moving_content_yields_deltas_only_at_zero_interval() {
    let comp = comp(64, 16, 8);
    let mut ctx = context(0);
    let mut source = ScriptedSource::new(|frame, dst| {
        paint_square(dst, PixelRect::new(frame as i32 * 2, 4, 4, 4));
    });
    let mut still = RecordingStill::default();

    let sequence =
        encode_bitmap_sequence(&mut ctx, &mut source, &mut still, &comp, 1.0, 30.0).unwrap();

    assert_eq!(sequence.frames.len(), 8);
    assert!(sequence.frames[0].is_keyframe);
    for frame in &sequence.frames[1..] {
        assert!(!frame.is_keyframe);
        assert_eq!(frame.bitmaps.len(), 1);
    }
    // Delta rects carry the still payload at the recorded position.
    assert_eq!(sequence.frames[1].bitmaps[0].x, still.rects[1].x);
    assert_eq!(sequence.frames[1].bitmaps[0].bytes, vec![0xAB; 4]);
}

#[test]
fn delta_rects_cover_the_actual_diff() {
    let comp = comp(64, 16, 2);
    let mut ctx = context(60);
    let mut source = ScriptedSource::new(|frame, dst| {
        paint_square(dst, PixelRect::new(frame as i32 * 2, 4, 4, 4));
    });
    let mut still = RecordingStill::default();

    encode_bitmap_sequence(&mut ctx, &mut source, &mut still, &comp, 1.0, 30.0).unwrap();

    // Frame 1 moved the square from x=0 to x=2: the diff spans x in [0, 6).
    let diff = PixelRect::new(0, 4, 6, 4);
    assert!(still.rects[1].contains_rect(diff));
    assert!(PixelRect::full(64, 16).contains_rect(still.rects[1]));
}

#[test]
fn render_mismatch_becomes_a_warning_and_an_empty_frame() {
    // Warnings are also logged; route them through a test subscriber.
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let comp = comp(32, 32, 5);
    let mut ctx = context(60);
    let mut source = ScriptedSource::new(|_, dst| {
        paint_square(dst, PixelRect::new(0, 0, 8, 8));
    });
    source.bad_frames = vec![2];
    let mut still = RecordingStill::default();

    let sequence =
        encode_bitmap_sequence(&mut ctx, &mut source, &mut still, &comp, 1.0, 30.0).unwrap();

    assert_eq!(sequence.frames.len(), 5);
    assert_eq!(sequence.frames[2], BitmapFrame::default());
    assert_eq!(
        ctx.warnings(),
        &[Warning::RenderMismatch {
            frame: 2,
            got: (33, 32),
            expected: (32, 32),
        }]
    );
}

#[test]
fn resampling_shortens_the_frame_count() {
    let comp = comp(16, 16, 30);
    let mut ctx = context(60);
    let mut source = ScriptedSource::new(|_, dst| {
        paint_square(dst, PixelRect::new(0, 0, 4, 4));
    });
    let mut still = RecordingStill::default();

    let sequence =
        encode_bitmap_sequence(&mut ctx, &mut source, &mut still, &comp, 1.0, 15.0).unwrap();
    assert_eq!(sequence.frame_rate, 15.0);
    assert_eq!(sequence.frames.len(), 15);

    // A rate above the composition's own is capped, not upsampled.
    let sequence =
        encode_bitmap_sequence(&mut ctx, &mut source, &mut still, &comp, 1.0, 60.0).unwrap();
    assert_eq!(sequence.frame_rate, 30.0);
    assert_eq!(sequence.frames.len(), 30);
}

#[test]
fn scaling_halves_the_sequence_dimensions() {
    let comp = comp(64, 48, 3);
    let mut ctx = context(60);
    let mut source = ScriptedSource::new(|_, dst| {
        paint_square(dst, PixelRect::full(64, 48));
    });
    let mut still = RecordingStill::default();

    let sequence =
        encode_bitmap_sequence(&mut ctx, &mut source, &mut still, &comp, 0.5, 30.0).unwrap();
    assert_eq!((sequence.width, sequence.height), (32, 24));
    assert_eq!(still.rects[0], PixelRect::full(32, 24));
}

#[test]
fn cancellation_yields_a_partial_sequence() {
    let comp = comp(16, 16, 100);
    let mut ctx = context(60);
    ctx.cancel.cancel();
    let mut source = ScriptedSource::new(|_, dst| {
        paint_square(dst, PixelRect::new(0, 0, 4, 4));
    });
    let mut still = RecordingStill::default();

    let sequence =
        encode_bitmap_sequence(&mut ctx, &mut source, &mut still, &comp, 1.0, 30.0).unwrap();
    assert!(sequence.frames.is_empty());
}
