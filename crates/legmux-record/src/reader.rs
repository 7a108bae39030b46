use std::io::{ErrorKind, Read};

use bytes::BytesMut;

use crate::codec::{decode_composite, decode_record, CompositeFrame, LegRecord, RECORD_SIZE};
use crate::error::{RecordError, Result};
use crate::layout::FrameLayout;

const INITIAL_BUFFER_CAPACITY: usize = 4 * 1024;
const READ_CHUNK_SIZE: usize = 4 * 1024;

/// Buffered source that hands out fixed-size units and tells a clean EOF
/// apart from a truncated one.
struct FixedUnitBuffer<T> {
    inner: T,
    buf: BytesMut,
    eof: bool,
}

impl<T: Read> FixedUnitBuffer<T> {
    fn new(inner: T) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            eof: false,
        }
    }

    /// Fill until `unit` bytes are buffered.
    ///
    /// `Ok(false)` means the source is exhausted and fewer bytes remain.
    fn fill(&mut self, unit: usize) -> Result<bool> {
        while self.buf.len() < unit {
            if self.eof {
                return Ok(false);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(RecordError::Io(err)),
            };

            if read == 0 {
                self.eof = true;
            } else {
                self.buf.extend_from_slice(&chunk[..read]);
            }
        }
        Ok(true)
    }

    /// Check the leftover bytes once the source is exhausted.
    fn finish(&mut self, unit: usize) -> Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let len = self.buf.len();
        // Drop the fragment so a retry reports clean EOF instead of looping.
        self.buf.clear();
        Err(RecordError::Truncated {
            len,
            expected: unit,
        })
    }
}

/// Reads complete leg records from any `Read` source.
///
/// Handles short reads internally. A source that ends on a record boundary
/// yields `Ok(None)`; one that ends mid-record yields
/// `Err(RecordError::Truncated)`.
pub struct RecordReader<T> {
    source: FixedUnitBuffer<T>,
    records: u64,
}

impl<T: Read> RecordReader<T> {
    pub fn new(inner: T) -> Self {
        Self {
            source: FixedUnitBuffer::new(inner),
            records: 0,
        }
    }

    /// Read the next complete record (blocking).
    pub fn read_record(&mut self) -> Result<Option<LegRecord>> {
        if !self.source.fill(RECORD_SIZE)? {
            self.source.finish(RECORD_SIZE)?;
            return Ok(None);
        }

        let record = decode_record(&mut self.source.buf);
        if record.is_some() {
            self.records += 1;
        }
        Ok(record)
    }

    /// Number of records decoded so far.
    pub fn records_read(&self) -> u64 {
        self.records
    }

}

impl<T: Read> Iterator for RecordReader<T> {
    type Item = Result<LegRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_record().transpose()
    }
}

/// Reads composite frames back out of a merged stream.
pub struct CompositeReader<T> {
    source: FixedUnitBuffer<T>,
    layout: FrameLayout,
}

impl<T: Read> CompositeReader<T> {
    pub fn new(inner: T, layout: FrameLayout) -> Self {
        Self {
            source: FixedUnitBuffer::new(inner),
            layout,
        }
    }

    /// Read the next complete frame (blocking).
    pub fn read_frame(&mut self) -> Result<Option<CompositeFrame>> {
        let frame_len = self.layout.frame_len();
        if !self.source.fill(frame_len)? {
            self.source.finish(frame_len)?;
            return Ok(None);
        }
        Ok(decode_composite(&mut self.source.buf, &self.layout))
    }
}

impl<T: Read> Iterator for CompositeReader<T> {
    type Item = Result<CompositeFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_frame().transpose()
    }
}
