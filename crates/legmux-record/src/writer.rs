use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use tracing::trace;

use crate::codec::{encode_composite, CompositeFrame, Payload};
use crate::error::{RecordError, Result};
use crate::layout::FrameLayout;

/// Writes composite frames, byte-exact and in order, to any `Write` sink.
///
/// Each frame is encoded into a reused buffer that is cleared first, then
/// written in full and flushed before the call returns.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    layout: FrameLayout,
    frames: u64,
}

impl<T: Write> FrameWriter<T> {
    pub fn new(inner: T, layout: FrameLayout) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(layout.frame_len()),
            layout,
            frames: 0,
        }
    }

    /// Write a complete frame (blocking).
    pub fn write_frame(&mut self, frame: &CompositeFrame) -> Result<()> {
        self.send(&frame.payloads, frame.delay)
    }

    /// Encode and write one frame from per-channel payloads and a delay byte.
    pub fn send(&mut self, payloads: &[Payload], delay: u8) -> Result<()> {
        self.buf.clear();
        encode_composite(&self.layout, payloads, delay, &mut self.buf)?;

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(RecordError::WriteZero),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(RecordError::Io(err)),
            }
        }

        self.flush()?;
        self.frames += 1;
        trace!(frame = self.frames, len = self.buf.len(), "composite frame written");
        Ok(())
    }

    /// Flush the underlying sink.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(RecordError::Io(err)),
            }
        }
    }

    /// Number of frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.frames
    }

    /// Borrow the underlying sink.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the writer, returning the underlying sink.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::reader::CompositeReader;

    fn three() -> FrameLayout {
        FrameLayout::new(3).unwrap()
    }

    #[test]
    fn write_single_frame() {
        let mut writer = FrameWriter::new(Vec::new(), three());
        writer
            .send(
                &[
                    Payload::new([0xAA; 6]),
                    Payload::new([0xBB; 6]),
                    Payload::new([0xCC; 6]),
                ],
                5,
            )
            .unwrap();

        let out = writer.into_inner();
        assert_eq!(out.len(), 19);
        assert_eq!(&out[..6], &[0xAA; 6]);
        assert_eq!(&out[6..12], &[0xBB; 6]);
        assert_eq!(&out[12..18], &[0xCC; 6]);
        assert_eq!(out[18], 5);
    }

    #[test]
    fn consecutive_frames_do_not_leak_bytes() {
        let layout = FrameLayout::new(2).unwrap();
        let mut writer = FrameWriter::new(Vec::new(), layout);

        writer
            .send(&[Payload::new([0xFF; 6]), Payload::new([0xEE; 6])], 1)
            .unwrap();
        writer.send(&[Payload::ZERO, Payload::ZERO], 2).unwrap();

        let out = writer.into_inner();
        assert_eq!(out.len(), 26);
        assert_eq!(&out[13..25], &[0u8; 12]);
        assert_eq!(out[25], 2);
    }

    #[test]
    fn write_frame_method() {
        let layout = FrameLayout::new(1).unwrap();
        let mut writer = FrameWriter::new(Cursor::new(Vec::new()), layout);
        let frame = CompositeFrame::new(vec![Payload::new([3; 6])], 9);

        writer.write_frame(&frame).unwrap();
        assert_eq!(writer.frames_written(), 1);

        let wire = writer.into_inner().into_inner();
        let mut reader = CompositeReader::new(Cursor::new(wire), layout);
        assert_eq!(reader.read_frame().unwrap(), Some(frame));
    }

    #[test]
    fn payload_count_mismatch_writes_nothing() {
        let mut writer = FrameWriter::new(Vec::new(), three());
        let err = writer.send(&[Payload::ZERO], 5).unwrap_err();

        assert!(matches!(err, RecordError::PayloadCount { .. }));
        assert!(writer.get_ref().is_empty());
        assert_eq!(writer.frames_written(), 0);
    }

    #[test]
    fn flushes_every_frame() {
        let sink = FlushCountingWriter::default();
        let flushes = Arc::clone(&sink.flushes);
        let mut writer = FrameWriter::new(sink, FrameLayout::new(1).unwrap());

        writer.send(&[Payload::ZERO], 5).unwrap();
        writer.send(&[Payload::ZERO], 5).unwrap();

        assert_eq!(flushes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn handles_short_and_interrupted_writes() {
        let sink = ChoppyWriter {
            interrupted: false,
            data: Vec::new(),
        };
        let mut writer = FrameWriter::new(sink, three());
        writer.send(&[Payload::new([7; 6]); 3], 5).unwrap();

        let inner = writer.into_inner();
        assert_eq!(inner.data.len(), 19);
        assert_eq!(&inner.data[..18], &[7u8; 18]);
    }

    #[test]
    fn zero_write_is_an_error() {
        let mut writer = FrameWriter::new(ZeroWriter, three());
        let err = writer.send(&[Payload::ZERO; 3], 5).unwrap_err();
        assert!(matches!(err, RecordError::WriteZero));
    }

    #[test]
    fn io_error_propagates() {
        let mut writer = FrameWriter::new(BrokenWriter, three());
        let err = writer.send(&[Payload::ZERO; 3], 5).unwrap_err();
        assert!(matches!(err, RecordError::Io(e) if e.kind() == ErrorKind::BrokenPipe));
    }

    #[derive(Default)]
    struct FlushCountingWriter {
        flushes: Arc<AtomicUsize>,
    }

    impl Write for FlushCountingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Interrupts once, then accepts at most 4 bytes per call.
    struct ChoppyWriter {
        interrupted: bool,
        data: Vec<u8>,
    }

    impl Write for ChoppyWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            let n = buf.len().min(4);
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
