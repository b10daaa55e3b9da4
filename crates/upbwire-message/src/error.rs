use upbwire_frame::FrameError;

use crate::decoder::HandlerError;

/// Errors that can occur while decoding, dispatching, or encoding messages.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// A registered handler failed; dispatch stopped at that handler.
    #[error("handler for command 0x{command:02X} failed: {source}")]
    Handler {
        command: u8,
        #[source]
        source: HandlerError,
    },

    /// The payload does not have the shape its message type requires.
    #[error("invalid payload for command 0x{command:02X}: {reason}")]
    InvalidPayload { command: u8, reason: String },

    /// The byte is not in the command table.
    #[error("unknown command code 0x{0:02X}")]
    UnknownCommand(u8),
}

pub type Result<T> = std::result::Result<T, MessageError>;
