/// Errors that can occur while reading records or writing composite frames.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// The source ended in the middle of a fixed-size unit.
    #[error("truncated trailing record ({len} of {expected} bytes)")]
    Truncated { len: usize, expected: usize },

    /// A channel index does not map to a section of the composite frame.
    #[error("channel index {index} is out of range (frame has {channels} channels)")]
    ChannelOutOfRange { index: usize, channels: usize },

    /// A composite frame needs at least one channel.
    #[error("composite frame layout needs at least one channel")]
    ZeroChannels,

    /// The frame length for this channel count does not fit in `usize`.
    #[error("{channels} channels exceed the maximum composite frame size")]
    TooManyChannels { channels: usize },

    /// The payload count handed to the encoder does not match the layout.
    #[error("expected {expected} channel payloads, got {actual}")]
    PayloadCount { expected: usize, actual: usize },

    /// The sink accepted zero bytes for a non-empty write.
    #[error("output sink accepted no bytes")]
    WriteZero,

    /// An I/O error occurred while reading or writing.
    #[error("record I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RecordError>;
