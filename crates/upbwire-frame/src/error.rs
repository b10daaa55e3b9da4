/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The frame is shorter than the fixed header (or header plus checksum).
    #[error("malformed frame ({len} bytes, need at least {min})")]
    MalformedFrame { len: usize, min: usize },

    /// The payload pushes the frame past what the 5-bit length field can carry.
    #[error("frame too long ({len} bytes, max {max})")]
    FrameTooLong { len: usize, max: usize },

    /// The frame text is not valid hexadecimal.
    #[error("invalid hex frame: {0}")]
    InvalidHex(String),

    /// The trailing checksum byte does not zero the frame sum.
    #[error("checksum mismatch (expected 0x{expected:02X}, got 0x{actual:02X})")]
    ChecksumMismatch { expected: u8, actual: u8 },
}

pub type Result<T> = std::result::Result<T, FrameError>;
