//! Typed views over the payloads of selected message types.
//!
//! Decoding never looks inside `data`; these views are for consumers that
//! know which message type they registered for.

use bytes::Bytes;
use upbwire_frame::Message;

use crate::command::UpbCommand;
use crate::encoder::DEFAULT_RATE;
use crate::error::{MessageError, Result};

const REGISTER_BLOCK_LEN: usize = 16;

fn expect_command(message: &Message, allowed: &[UpbCommand]) -> Result<()> {
    if allowed.iter().any(|command| command.code() == message.msg_id) {
        return Ok(());
    }
    Err(invalid(message, "unexpected message type"))
}

fn invalid(message: &Message, reason: impl Into<String>) -> MessageError {
    MessageError::InvalidPayload {
        command: message.msg_id,
        reason: reason.into(),
    }
}

/// Level, rate, and channel carried by GOTO and FADE_START.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GotoPayload {
    pub level: u8,
    /// `None` when absent or sent as the "default rate" marker.
    pub rate: Option<u8>,
    /// Channel byte as carried on the wire (1-based).
    pub channel: Option<u8>,
}

impl GotoPayload {
    pub fn parse(message: &Message) -> Result<Self> {
        expect_command(message, &[UpbCommand::Goto, UpbCommand::FadeStart])?;
        match message.data.as_ref() {
            [] => Err(invalid(message, "missing level")),
            [level] => Ok(Self {
                level: *level,
                rate: None,
                channel: None,
            }),
            [level, rate] => Ok(Self {
                level: *level,
                rate: Some(*rate),
                channel: None,
            }),
            [level, rate, channel, ..] => Ok(Self {
                level: *level,
                rate: (*rate != DEFAULT_RATE).then_some(*rate),
                channel: Some(*channel),
            }),
        }
    }

    /// 0-based channel index, the inverse of what the encoder writes.
    pub fn channel_index(&self) -> Option<u8> {
        self.channel.map(|channel| channel.saturating_sub(1))
    }
}

/// Per-channel levels reported by a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceStateReport {
    levels: Bytes,
}

impl DeviceStateReport {
    pub fn parse(message: &Message) -> Result<Self> {
        expect_command(message, &[UpbCommand::DeviceStateReport])?;
        Ok(Self {
            levels: message.data.clone(),
        })
    }

    /// Levels indexed by 0-based channel.
    pub fn levels(&self) -> &[u8] {
        &self.levels
    }

    pub fn level(&self, channel: usize) -> Option<u8> {
        self.levels.get(channel).copied()
    }
}

/// Which name a register block holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameBlock {
    Network,
    Room,
    Device,
}

impl NameBlock {
    fn from_start_register(register: u8) -> Option<Self> {
        match register {
            16 => Some(NameBlock::Network),
            32 => Some(NameBlock::Room),
            48 => Some(NameBlock::Device),
            _ => None,
        }
    }
}

/// A block of 16 register values starting at `start_register`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterValuesReport {
    pub start_register: u8,
    pub values: [u8; REGISTER_BLOCK_LEN],
}

impl RegisterValuesReport {
    pub fn parse(message: &Message) -> Result<Self> {
        expect_command(message, &[UpbCommand::RegisterValuesReport])?;
        let data = message.data.as_ref();
        let Some((start_register, rest)) = data.split_first() else {
            return Err(invalid(message, "empty register report"));
        };
        let values: [u8; REGISTER_BLOCK_LEN] = rest.try_into().map_err(|_| {
            invalid(
                message,
                format!(
                    "expected {REGISTER_BLOCK_LEN} register values, got {}",
                    rest.len()
                ),
            )
        })?;

        Ok(Self {
            start_register: *start_register,
            values,
        })
    }

    /// The name held in this block, if it is one of the name blocks.
    pub fn name(&self) -> Option<(NameBlock, String)> {
        let block = NameBlock::from_start_register(self.start_register)?;
        let text = String::from_utf8_lossy(&self.values);
        Some((block, text.trim().to_string()))
    }
}
