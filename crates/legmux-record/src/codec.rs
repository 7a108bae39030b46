use bytes::{Buf, BufMut, BytesMut};

use crate::error::{RecordError, Result};
use crate::layout::FrameLayout;

/// Payload bytes per leg record.
pub const PAYLOAD_SIZE: usize = 6;

/// Leg record: payload (6) + repeat count (1) = 7 bytes.
pub const RECORD_SIZE: usize = PAYLOAD_SIZE + 1;

/// Delay byte appended to every composite frame unless configured otherwise.
pub const DEFAULT_DELAY: u8 = 5;

/// The six payload bytes of a leg record, repeat count stripped.
///
/// `Payload` is `Copy`: every handoff gets its own value, so no buffer is
/// ever shared between a producer and the merger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Payload([u8; PAYLOAD_SIZE]);

impl Payload {
    /// All-zero payload, used for channels that have not produced anything.
    pub const ZERO: Payload = Payload([0; PAYLOAD_SIZE]);

    pub const fn new(bytes: [u8; PAYLOAD_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PAYLOAD_SIZE] {
        &self.0
    }
}

impl From<[u8; PAYLOAD_SIZE]> for Payload {
    fn from(bytes: [u8; PAYLOAD_SIZE]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Payload {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// One decoded leg record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegRecord {
    /// Leg content.
    pub payload: Payload,
    /// Raw trailing repeat-count byte.
    pub repeat: u8,
}

impl LegRecord {
    pub fn new(payload: impl Into<Payload>, repeat: u8) -> Self {
        Self {
            payload: payload.into(),
            repeat,
        }
    }
}

/// Encode a leg record into the wire format.
///
/// ```text
/// ┌──────────────────────┬─────────────┐
/// │ Payload (6B)         │ Repeat (1B) │
/// └──────────────────────┴─────────────┘
/// ```
pub fn encode_record(record: &LegRecord, dst: &mut BytesMut) {
    dst.reserve(RECORD_SIZE);
    dst.put_slice(record.payload.as_bytes());
    dst.put_u8(record.repeat);
}

/// Decode a leg record from a buffer.
///
/// Returns `None` if the buffer doesn't hold a complete record yet. On
/// success, consumes the record bytes from the buffer.
pub fn decode_record(src: &mut BytesMut) -> Option<LegRecord> {
    if src.len() < RECORD_SIZE {
        return None;
    }

    let mut payload = [0u8; PAYLOAD_SIZE];
    src.copy_to_slice(&mut payload);
    let repeat = src.get_u8();

    Some(LegRecord {
        payload: Payload(payload),
        repeat,
    })
}

/// A merged output unit: one payload per channel plus the delay byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeFrame {
    /// Channel payloads in channel-index order.
    pub payloads: Vec<Payload>,
    /// Global delay byte.
    pub delay: u8,
}

impl CompositeFrame {
    pub fn new(payloads: Vec<Payload>, delay: u8) -> Self {
        Self { payloads, delay }
    }

    /// The total wire size of this frame.
    pub fn wire_size(&self) -> usize {
        self.payloads.len() * PAYLOAD_SIZE + 1
    }
}

/// Encode a composite frame.
///
/// Channel `i` lands at `layout.section(i)`; the delay byte is last.
/// ```text
/// ┌────────────┬────────────┬─────┬──────────────┬───────────┐
/// │ Chan 0 (6B)│ Chan 1 (6B)│ ... │ Chan N-1 (6B)│ Delay (1B)│
/// └────────────┴────────────┴─────┴──────────────┴───────────┘
/// ```
pub fn encode_composite(
    layout: &FrameLayout,
    payloads: &[Payload],
    delay: u8,
    dst: &mut BytesMut,
) -> Result<()> {
    if payloads.len() != layout.channels() {
        return Err(RecordError::PayloadCount {
            expected: layout.channels(),
            actual: payloads.len(),
        });
    }

    let start = dst.len();
    dst.resize(start + layout.frame_len(), 0);
    for (index, payload) in payloads.iter().enumerate() {
        let section = layout.section(index)?;
        dst[start + section.start..start + section.end].copy_from_slice(payload.as_bytes());
    }
    dst[start + layout.delay_offset()] = delay;
    Ok(())
}

/// Decode a composite frame from a buffer.
///
/// Returns `None` if the buffer doesn't hold a complete frame yet.
pub fn decode_composite(src: &mut BytesMut, layout: &FrameLayout) -> Option<CompositeFrame> {
    if src.len() < layout.frame_len() {
        return None;
    }

    let mut payloads = Vec::with_capacity(layout.channels());
    for _ in 0..layout.channels() {
        let mut section = [0u8; PAYLOAD_SIZE];
        src.copy_to_slice(&mut section);
        payloads.push(Payload(section));
    }
    let delay = src.get_u8();

    Some(CompositeFrame { payloads, delay })
}
