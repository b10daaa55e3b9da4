use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, trace};

use crate::checksum::{checksum, update_checksum, verify_checksum};
use crate::control::{ControlWord, MAX_TX_COUNT_FIELD};
use crate::error::{FrameError, Result};

/// Fixed header: control word (2) + network (1) + destination (1) + source (1) + type (1).
pub const HEADER_SIZE: usize = 6;

/// Smallest complete frame: header plus checksum byte.
pub const MIN_FRAME_LEN: usize = HEADER_SIZE + 1;

/// Largest frame the 5-bit length field can describe.
pub const MAX_FRAME_LEN: usize = 31;

/// Largest payload that still fits in [`MAX_FRAME_LEN`].
pub const MAX_PAYLOAD: usize = MAX_FRAME_LEN - MIN_FRAME_LEN;

/// A decoded UPB message.
///
/// Produced from a frame whose checksum has already been verified and removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Addressed to a link rather than a device.
    pub link: bool,
    pub repeater_req: u8,
    /// Total frame length as declared by the sender, checksum included.
    pub length: u8,
    pub ack_req: u8,
    /// Declared transmit count minus one.
    pub tx_count: u8,
    /// Which attempt this frame is.
    pub tx_seq: u8,
    pub network_id: u8,
    pub dest_id: u8,
    pub src_id: u8,
    /// Message type (command code).
    pub msg_id: u8,
    /// Everything after the header.
    pub data: Bytes,
}

impl Message {
    /// The declared number of transmissions (1-4).
    pub fn declared_transmits(&self) -> u8 {
        self.tx_count + 1
    }

    /// Reassemble the control word the message was decoded from.
    pub fn control_word(&self) -> ControlWord {
        ControlWord::default()
            .with_link(self.link)
            .with_repeater_request(self.repeater_req)
            .with_length(self.length)
            .with_ack_request(self.ack_req)
            .with_tx_count(self.tx_count)
            .with_tx_seq(self.tx_seq)
    }
}

/// Header fields for an outbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Control word; its length field is overwritten during encoding.
    pub control: ControlWord,
    pub network_id: u8,
    pub dest_id: u8,
    pub src_id: u8,
    pub msg_id: u8,
}

/// Decode a UPB frame whose checksum has already been stripped.
///
/// Any frame of at least [`HEADER_SIZE`] bytes decodes; the payload is not
/// inspected.
pub fn decode(raw: &[u8]) -> Result<Message> {
    if raw.len() < HEADER_SIZE {
        return Err(FrameError::MalformedFrame {
            len: raw.len(),
            min: HEADER_SIZE,
        });
    }

    let control = ControlWord::from_be_bytes([raw[0], raw[1]]);
    let message = Message {
        link: control.link(),
        repeater_req: control.repeater_request(),
        length: control.length(),
        ack_req: control.ack_request(),
        tx_count: control.tx_count(),
        tx_seq: control.tx_seq(),
        network_id: raw[2],
        dest_id: raw[3],
        src_id: raw[4],
        msg_id: raw[5],
        data: Bytes::copy_from_slice(&raw[HEADER_SIZE..]),
    };

    trace!(
        network = message.network_id,
        dest = message.dest_id,
        src = message.src_id,
        msg_id = message.msg_id,
        data_len = message.data.len(),
        "decoded upb message"
    );

    Ok(message)
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────┬─────┬──────┬─────┬──────┬───────────┬──────────┐
/// │ Control  │ Net │ Dest │ Src │ Type │ Payload   │ Checksum │
/// │ (2B BE)  │ 1B  │ 1B   │ 1B  │ 1B   │ (0-24B)   │ 1B       │
/// └──────────┴─────┴──────┴─────┴──────┴───────────┴──────────┘
/// ```
///
/// The control word's length field is replaced with the total frame length.
pub fn encode_frame(header: &FrameHeader, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    let len = MIN_FRAME_LEN + payload.len();
    if len > MAX_FRAME_LEN {
        return Err(FrameError::FrameTooLong {
            len,
            max: MAX_FRAME_LEN,
        });
    }

    let control = header.control.with_length(len as u8);
    let start = dst.len();
    dst.reserve(len);
    dst.put_u16(control.bits());
    dst.put_u8(header.network_id);
    dst.put_u8(header.dest_id);
    dst.put_u8(header.src_id);
    dst.put_u8(header.msg_id);
    dst.put_slice(payload);
    let sum = checksum(&dst[start..]);
    dst.put_u8(sum);
    Ok(())
}

/// Encode a frame and serialize it as uppercase hex.
pub fn encode_hex_frame(header: &FrameHeader, payload: &[u8]) -> Result<String> {
    let mut buf = BytesMut::new();
    encode_frame(header, payload, &mut buf)?;
    Ok(hex::encode_upper(&buf))
}

/// Bump the declared transmit count of a hex frame and refresh its checksum.
///
/// A frame already declaring the maximum count is returned unchanged.
pub fn increment_tx_count(hex_frame: &str) -> Result<String> {
    let mut frame = parse_hex(hex_frame)?;
    if frame.len() < MIN_FRAME_LEN {
        return Err(FrameError::MalformedFrame {
            len: frame.len(),
            min: MIN_FRAME_LEN,
        });
    }

    let control = ControlWord::from_be_bytes([frame[0], frame[1]]);
    let tx_count = control.tx_count();
    if tx_count == MAX_TX_COUNT_FIELD {
        debug!(tx_count, "transmit count already saturated");
        return Ok(hex_frame.to_string());
    }

    let control = control.with_tx_count(tx_count + 1);
    frame[1] = control.to_be_bytes()[1];
    update_checksum(&mut frame);
    Ok(hex::encode_upper(&frame))
}

/// Parse a hex frame, verify its checksum, and return it without the checksum.
///
/// The result is ready for [`decode`].
pub fn strip_frame(hex_frame: &str) -> Result<Bytes> {
    let mut frame = parse_hex(hex_frame)?;
    if frame.len() < MIN_FRAME_LEN {
        return Err(FrameError::MalformedFrame {
            len: frame.len(),
            min: MIN_FRAME_LEN,
        });
    }

    let body_len = frame.len() - 1;
    if !verify_checksum(&frame) {
        return Err(FrameError::ChecksumMismatch {
            expected: checksum(&frame[..body_len]),
            actual: frame[body_len],
        });
    }

    frame.truncate(body_len);
    Ok(Bytes::from(frame))
}

fn parse_hex(text: &str) -> Result<Vec<u8>> {
    hex::decode(text.trim()).map_err(|err| FrameError::InvalidHex(err.to_string()))
}
