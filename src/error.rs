//! Error type for contract violations at the public API boundary.
//!
//! Per-point tracking failures are not errors; they are reported through
//! [`FeatureStatus`](crate::types::FeatureStatus). `FlowError` is reserved for
//! malformed inputs (mismatched frames, invalid parameters, wrong lengths) and
//! for misuse of a [`PyrLkStorage`](crate::flow::PyrLkStorage) session.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("invalid parameter(s): {0}")]
    InvalidParams(String),
    #[error("frame is empty ({width}x{height}, {channels} channel(s))")]
    EmptyImage {
        width: usize,
        height: usize,
        channels: usize,
    },
    #[error(
        "frames differ in shape: previous {prev_w}x{prev_h}x{prev_c}, current {curr_w}x{curr_h}x{curr_c}"
    )]
    ImageMismatch {
        prev_w: usize,
        prev_h: usize,
        prev_c: usize,
        curr_w: usize,
        curr_h: usize,
        curr_c: usize,
    },
    #[error("raster buffer holds {actual} samples, expected at least {expected}")]
    RasterSize { expected: usize, actual: usize },
    #[error("{what} has {actual} entries, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("pyramid storage has not processed a frame pair")]
    StorageNotProcessed,
    #[error("pyramid level {level} requested, storage holds levels 0..={max_level}")]
    LevelOutOfRange { level: usize, max_level: usize },
    #[error("sampling window at ({x}, {y}) size {width}x{height} exceeds the {image_w}x{image_h} raster")]
    WindowOutOfBounds {
        x: f32,
        y: f32,
        width: usize,
        height: usize,
        image_w: usize,
        image_h: usize,
    },
    #[error(transparent)]
    Config(#[from] serde_json::Error),
}

pub type FlowResult<T> = Result<T, FlowError>;
