//! Merge per-leg LED micro-operation streams into one composite device stream.
//!
//! Each leg of the controller is described by its own stream of 7-byte leg
//! records. legmux expands every record by its repeat count and merges the
//! legs in lock-step into composite frames of `6 × N + 1` bytes.
//!
//! # Crate Structure
//!
//! - [`record`]: leg record and composite frame codecs, readers and writer
//! - [`pipeline`]: per-channel expanders, the merger and the merge driver

/// Re-export record types.
pub mod record {
    pub use legmux_record::*;
}

/// Re-export pipeline types.
pub mod pipeline {
    pub use legmux_pipeline::*;
}
