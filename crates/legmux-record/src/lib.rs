//! Fixed-size leg record framing and composite frame encoding.
//!
//! This is the wire layer of legmux. Every input stream is a concatenation of
//! 7-byte leg records:
//! - 6 payload bytes for one leg of the controller
//! - 1 trailing repeat-count byte
//!
//! The output stream is a concatenation of composite frames: one 6-byte
//! section per channel, in channel order, followed by a single delay byte.

pub mod codec;
pub mod error;
pub mod layout;
pub mod reader;
pub mod writer;

pub use codec::{
    decode_composite, decode_record, encode_composite, encode_record, CompositeFrame, LegRecord,
    Payload, DEFAULT_DELAY, PAYLOAD_SIZE, RECORD_SIZE,
};
pub use error::{RecordError, Result};
pub use layout::FrameLayout;
pub use reader::{CompositeReader, RecordReader};
pub use writer::FrameWriter;
