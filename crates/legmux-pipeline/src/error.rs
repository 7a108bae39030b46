use std::fmt;
use std::path::PathBuf;

use legmux_record::RecordError;

/// Errors that can occur while running the merge pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Record-level error outside any specific channel (layout, output sink).
    #[error("record error: {0}")]
    Record(#[from] RecordError),

    /// A channel's source failed while being read.
    #[error("channel {channel}: {source}")]
    Channel {
        channel: usize,
        #[source]
        source: RecordError,
    },

    /// A channel source could not be opened.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// One or more channel sources failed to close.
    #[error(transparent)]
    Close(CloseErrors),

    /// The pipeline was given no channels.
    #[error("at least one channel source is required")]
    NoChannels,

    /// An expander thread could not be started.
    #[error("failed to spawn expander for channel {channel}: {source}")]
    Spawn {
        channel: usize,
        source: std::io::Error,
    },

    /// An expander thread panicked.
    #[error("expander for channel {channel} panicked")]
    WorkerPanicked { channel: usize },
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// A single source that failed to close.
#[derive(Debug)]
pub struct CloseFailure {
    pub label: String,
    pub error: std::io::Error,
}

/// Every close failure from one `ChannelSet::close` call.
#[derive(Debug)]
pub struct CloseErrors {
    failures: Vec<CloseFailure>,
}

impl CloseErrors {
    pub(crate) fn new(failures: Vec<CloseFailure>) -> Self {
        Self { failures }
    }

    pub fn failures(&self) -> &[CloseFailure] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for CloseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "errors while closing channel sources:")?;
        for failure in &self.failures {
            write!(f, "\n  - {}: {}", failure.label, failure.error)?;
        }
        Ok(())
    }
}

impl std::error::Error for CloseErrors {}
