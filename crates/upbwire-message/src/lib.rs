//! UPB message semantics on top of `upbwire-frame`.
//!
//! - [`UpbCommand`]: the canonical command code table shared by both directions
//! - [`MessageDecoder`]: decodes stripped frames and dispatches them to handlers
//!   registered per command code
//! - [`MessageEncoder`]: builds transmit-ready hex frames for device and link
//!   commands, asking a [`TxCountSource`] how many transmits to declare
//! - [`payload`]: typed views over the payload of selected message types
//!
//! Nothing here performs I/O. Serial framing and retransmission policy belong
//! to the caller.

pub mod address;
pub mod command;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod payload;

pub use address::{Address, AddressKind};
pub use command::{command_name, UpbCommand};
pub use decoder::{Handler, HandlerError, MessageDecoder, Transmission};
pub use encoder::{Control, EncoderConfig, FixedTxCount, MessageEncoder, TxCountSource, PIM_ID};
pub use error::{MessageError, Result};
pub use payload::{DeviceStateReport, GotoPayload, NameBlock, RegisterValuesReport};
pub use upbwire_frame::{ControlWord, Message};
