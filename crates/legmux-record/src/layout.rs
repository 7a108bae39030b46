//! Mapping from channel index to byte offset inside a composite frame.
//!
//! Channel `i` always occupies bytes `[6i, 6i + 6)`. The delay byte is the
//! last byte of the frame.

use std::ops::Range;

use crate::codec::PAYLOAD_SIZE;
use crate::error::{RecordError, Result};

/// Layout of a composite frame for a fixed channel count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    channels: usize,
}

impl FrameLayout {
    /// Create a layout for `channels` legs.
    ///
    /// Zero channels is rejected, as is any count whose frame length would
    /// overflow `usize`.
    pub fn new(channels: usize) -> Result<Self> {
        if channels == 0 {
            return Err(RecordError::ZeroChannels);
        }
        if channels
            .checked_mul(PAYLOAD_SIZE)
            .and_then(|len| len.checked_add(1))
            .is_none()
        {
            return Err(RecordError::TooManyChannels { channels });
        }
        Ok(Self { channels })
    }

    /// Number of channel sections in the frame.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Total frame length: one section per channel plus the delay byte.
    pub fn frame_len(&self) -> usize {
        self.channels * PAYLOAD_SIZE + 1
    }

    /// Offset of the trailing delay byte.
    pub fn delay_offset(&self) -> usize {
        self.channels * PAYLOAD_SIZE
    }

    /// Byte range of channel `index` inside the frame.
    pub fn section(&self, index: usize) -> Result<Range<usize>> {
        if index >= self.channels {
            return Err(RecordError::ChannelOutOfRange {
                index,
                channels: self.channels,
            });
        }
        let begin = index * PAYLOAD_SIZE;
        Ok(begin..begin + PAYLOAD_SIZE)
    }
}
