use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// An axis-aligned integer rectangle on a raster buffer.
///
/// Always expressed in pixel coordinates of the owning canvas. A zero-size
/// rect denotes "no change" (see [`PixelRect::is_empty`]); encoders never
/// produce negative dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PixelRect {
    /// Left edge in pixels.
    pub x: i32,
    /// Top edge in pixels.
    pub y: i32,
    /// Width in pixels, `>= 0`.
    pub width: i32,
    /// Height in pixels, `>= 0`.
    pub height: i32,
}

impl PixelRect {
    /// Build a rect from position and size.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The full-canvas rect for a `width x height` buffer.
    pub fn full(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// A degenerate rect denoting "no change".
    pub fn zero() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// `true` when the rect covers no pixels.
    pub fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Covered area in pixels.
    pub fn area(self) -> i64 {
        i64::from(self.width) * i64::from(self.height)
    }

    /// `true` when `other` lies fully inside `self`.
    pub fn contains_rect(self, other: PixelRect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.x + other.width <= self.x + self.width
            && other.y + other.height <= self.y + self.height
    }
}

/// An inclusive frame-index interval on a composition's local timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TimeRange {
    /// First frame of the interval.
    pub start: i64,
    /// Last frame of the interval (inclusive).
    pub end: i64,
}

impl TimeRange {
    /// Build a range from inclusive endpoints.
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// `true` when `frame` lies inside the interval.
    pub fn contains(self, frame: i64) -> bool {
        self.start <= frame && frame <= self.end
    }
}

/// Cooperative cancellation handle for long-running frame loops.
///
/// Encoders poll the flag once per iteration and break out cleanly, leaving
/// whatever has been assembled so far discardable by the caller. There is no
/// timeout; cancellation is caller-initiated only.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// A fresh, unset flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Takes effect at the next poll.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// `true` once [`CancelFlag::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
