//! Orchestration: per-composition export of sequence variants.
//!
//! Thin glue between the render collaborator and the two sequence encoders.
//! One sequence is produced per (composition x scale factor x target frame
//! rate) combination listed in [`ExportConfig::scale_and_fps`]; the results
//! are write-once values handed to the container codec.

use crate::composition::model::{Composition, CompositionId};
use crate::encode::bitmap::encode_bitmap_sequence;
use crate::encode::source::FrameSource;
use crate::encode::still::StillEncoder;
use crate::encode::stream::StreamEncoderFactory;
use crate::encode::video::{AlphaState, encode_video_sequence, measure_content_rect};
use crate::foundation::core::CancelFlag;
use crate::foundation::error::FramepackResult;
use crate::sequence::model::{BitmapSequence, VideoSequence};

/// One scale/frame-rate variant to export.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScaleAndFps {
    /// Downsampling factor applied to the composition's nominal size;
    /// values above 0.99 are treated as exactly 1.0.
    pub factor: f32,
    /// Target frame rate, capped at the composition's own rate.
    pub frame_rate: f32,
}

/// Export configuration, persistable as JSON by host applications.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExportConfig {
    /// Still-image quality in `[0, 100]` for bitmap sequences.
    #[serde(default = "default_quality")]
    pub image_quality: u8,
    /// Stream-encoder quality in `[0, 100]` for video sequences.
    #[serde(default = "default_quality")]
    pub sequence_quality: u8,
    /// Keyframe interval in frames; `0` means only frame 0 is a keyframe.
    #[serde(default = "default_keyframe_interval")]
    pub keyframe_interval: i32,
    /// Prefer a hardware stream encoder when available.
    #[serde(default)]
    pub hardware: bool,
    /// Cap on the shorter canvas edge; larger compositions are downscaled.
    #[serde(default)]
    pub max_resolution: Option<i32>,
    /// Variants to export per composition.
    #[serde(default = "default_scale_and_fps")]
    pub scale_and_fps: Vec<ScaleAndFps>,
}

fn default_quality() -> u8 {
    80
}

fn default_keyframe_interval() -> i32 {
    60
}

fn default_scale_and_fps() -> Vec<ScaleAndFps> {
    vec![ScaleAndFps {
        factor: 1.0,
        frame_rate: 60.0,
    }]
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            image_quality: default_quality(),
            sequence_quality: default_quality(),
            keyframe_interval: default_keyframe_interval(),
            hardware: false,
            max_resolution: None,
            scale_and_fps: default_scale_and_fps(),
        }
    }
}

/// A recoverable per-frame or per-composition condition surfaced to the
/// caller. Nothing in this crate is fatal to the host process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Warning {
    /// The render collaborator produced dimensions other than the
    /// composition's nominal size; the frame was skipped.
    RenderMismatch {
        /// Frame index of the failed render.
        frame: i64,
        /// Dimensions actually produced.
        got: (i32, i32),
        /// Dimensions the composition declares.
        expected: (i32, i32),
    },
    /// The still encoder produced no bytes; the frame carries a null payload.
    StillEncodeEmpty {
        /// Frame index of the empty payload.
        frame: i64,
    },
    /// Every visible frame of the composition was fully transparent.
    NoContent {
        /// The affected composition.
        composition: CompositionId,
    },
}

/// Shared per-export state: configuration, cancellation, and the warning
/// ledger.
#[derive(Debug, Default)]
pub struct ExportContext {
    /// Export configuration.
    pub config: ExportConfig,
    /// Cooperative cancellation flag polled by all frame loops.
    pub cancel: CancelFlag,
    warnings: Vec<Warning>,
}

impl ExportContext {
    /// Build a context for `config` with a fresh cancel flag.
    pub fn new(config: ExportConfig) -> Self {
        Self {
            config,
            cancel: CancelFlag::new(),
            warnings: Vec::new(),
        }
    }

    /// Record a recoverable condition and log it.
    pub fn push_warning(&mut self, warning: Warning) {
        tracing::warn!(?warning, "recoverable export condition");
        self.warnings.push(warning);
    }

    /// Warnings accumulated so far.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }
}

/// Export one `VideoSequence` per configured variant for `comp`.
///
/// The content rect is measured once over the whole timeline; the alpha
/// hypothesis and its detection state are shared across variants, so at most
/// one variant pays the cost of a discarded pass.
#[tracing::instrument(skip_all, fields(composition = comp.id))]
pub fn export_video_composition(
    ctx: &mut ExportContext,
    source: &mut dyn FrameSource,
    factory: &dyn StreamEncoderFactory,
    comp: &Composition,
    root: &Composition,
) -> FramepackResult<Vec<VideoSequence>> {
    let content_rect = measure_content_rect(ctx, source, comp, root)?;
    let mut alpha = AlphaState::default();
    let variants = ctx.config.scale_and_fps.clone();

    let mut sequences = Vec::with_capacity(variants.len());
    for variant in variants {
        if ctx.cancel.is_cancelled() {
            break;
        }
        sequences.push(encode_video_sequence(
            ctx,
            &mut alpha,
            source,
            factory,
            comp,
            root,
            variant.factor,
            variant.frame_rate,
            content_rect,
        )?);
    }
    Ok(sequences)
}

/// Export one `BitmapSequence` per configured variant for `comp`.
#[tracing::instrument(skip_all, fields(composition = comp.id))]
pub fn export_bitmap_composition(
    ctx: &mut ExportContext,
    source: &mut dyn FrameSource,
    still: &mut dyn StillEncoder,
    comp: &Composition,
) -> FramepackResult<Vec<BitmapSequence>> {
    let variants = ctx.config.scale_and_fps.clone();
    let mut sequences = Vec::with_capacity(variants.len());
    for variant in variants {
        if ctx.cancel.is_cancelled() {
            break;
        }
        sequences.push(encode_bitmap_sequence(
            ctx,
            source,
            still,
            comp,
            variant.factor,
            variant.frame_rate,
        )?);
    }
    Ok(sequences)
}
