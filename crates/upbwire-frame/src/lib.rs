//! UPB frame layout for the powerline lighting bus.
//!
//! Every UPB frame is laid out as:
//! - A 2-byte big-endian control word (link flag, repeater request, length,
//!   ack request, transmit count, transmit sequence)
//! - Network id, destination id, source id, message type (1 byte each)
//! - 0-24 payload bytes
//! - A trailing checksum byte that makes the byte sum zero modulo 256
//!
//! On the PIM serial line frames travel as uppercase ASCII hex.

pub mod checksum;
pub mod codec;
pub mod control;
pub mod error;

pub use checksum::{checksum, verify_checksum};
pub use codec::{
    decode, encode_frame, encode_hex_frame, increment_tx_count, strip_frame, FrameHeader, Message,
    HEADER_SIZE, MAX_FRAME_LEN, MAX_PAYLOAD, MIN_FRAME_LEN,
};
pub use control::ControlWord;
pub use error::{FrameError, Result};
