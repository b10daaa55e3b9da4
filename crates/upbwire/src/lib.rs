//! Encode and decode UPB powerline lighting messages.
//!
//! upbwire turns raw UPB frames into structured messages and structured
//! commands into transmit-ready hex frames. Serial I/O, device registries,
//! and retransmission policy stay with the caller.
//!
//! # Crate Structure
//!
//! - [`frame`]: Control word bitfields, checksums, header decode, hex frames
//! - [`message`]: Command table, addresses, handler dispatch, command encoders

/// Re-export frame types.
pub mod frame {
    pub use upbwire_frame::*;
}

/// Re-export message types.
pub mod message {
    pub use upbwire_message::*;
}
