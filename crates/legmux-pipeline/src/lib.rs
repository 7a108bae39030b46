//! Concurrent per-channel expansion and lock-step merge of leg record streams.
//!
//! One expander thread per channel reads leg records, replays each payload
//! according to its repeat count and hands copies over a rendezvous channel.
//! The merger visits the channels in index order once per cycle and emits one
//! composite frame per cycle until every channel is done.
//!
//! # Example
//!
//! ```no_run
//! use legmux_pipeline::{merge_files, MergeConfig};
//!
//! let report = merge_files(
//!     &["leg0.bin", "leg1.bin", "leg2.bin"],
//!     std::io::stdout().lock(),
//!     &MergeConfig::default(),
//! )?;
//! eprintln!("{} frames", report.frames);
//! # Ok::<(), legmux_pipeline::PipelineError>(())
//! ```

pub mod config;
pub mod error;
pub mod expander;
pub mod merger;
pub mod pipeline;
pub mod source;

pub use config::{DonePolicy, MergeConfig, RepeatPolicy};
pub use error::{CloseErrors, CloseFailure, PipelineError, Result};
pub use expander::{Expander, ExpanderStats, Handoff};
pub use merger::Merger;
pub use pipeline::{merge, merge_files, ChannelReport, MergeReport};
pub use source::{ChannelSet, ChannelSource, FileSource};
