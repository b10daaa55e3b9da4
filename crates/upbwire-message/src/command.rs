//! UPB command codes.
//!
//! Codes 0x00-0x1F are core commands, 0x20-0x3F device control commands,
//! and 0x80-0x9F report messages sent back by devices.

use std::fmt;

use crate::error::MessageError;

/// Message type byte carried in every UPB frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum UpbCommand {
    Null = 0x00,
    WriteEnable = 0x01,
    WriteProtect = 0x02,
    StartSetup = 0x03,
    StopSetup = 0x04,
    GetSetupTime = 0x05,
    AutoAddress = 0x06,
    GetDeviceStatus = 0x07,
    SetDeviceControl = 0x08,
    AddLink = 0x0B,
    DeleteLink = 0x0C,
    TransmitMessage = 0x0D,
    DeviceReset = 0x0E,
    GetDeviceSignature = 0x0F,
    GetRegisterValue = 0x10,
    SetRegisterValue = 0x11,

    Activate = 0x20,
    Deactivate = 0x21,
    Goto = 0x22,
    FadeStart = 0x23,
    FadeStop = 0x24,
    Blink = 0x25,
    Indicate = 0x26,
    Toggle = 0x27,
    ReportState = 0x30,
    StoreState = 0x31,

    AckResponse = 0x80,
    SetupTimeReport = 0x85,
    DeviceStateReport = 0x86,
    DeviceStatusReport = 0x87,
    DeviceSignatureReport = 0x8F,
    RegisterValuesReport = 0x90,
    RamValuesReport = 0x91,
    RawDataReport = 0x92,
    HeartbeatReport = 0x93,
}

impl UpbCommand {
    /// Every command in the table, in code order.
    pub const ALL: [UpbCommand; 35] = [
        UpbCommand::Null,
        UpbCommand::WriteEnable,
        UpbCommand::WriteProtect,
        UpbCommand::StartSetup,
        UpbCommand::StopSetup,
        UpbCommand::GetSetupTime,
        UpbCommand::AutoAddress,
        UpbCommand::GetDeviceStatus,
        UpbCommand::SetDeviceControl,
        UpbCommand::AddLink,
        UpbCommand::DeleteLink,
        UpbCommand::TransmitMessage,
        UpbCommand::DeviceReset,
        UpbCommand::GetDeviceSignature,
        UpbCommand::GetRegisterValue,
        UpbCommand::SetRegisterValue,
        UpbCommand::Activate,
        UpbCommand::Deactivate,
        UpbCommand::Goto,
        UpbCommand::FadeStart,
        UpbCommand::FadeStop,
        UpbCommand::Blink,
        UpbCommand::Indicate,
        UpbCommand::Toggle,
        UpbCommand::ReportState,
        UpbCommand::StoreState,
        UpbCommand::AckResponse,
        UpbCommand::SetupTimeReport,
        UpbCommand::DeviceStateReport,
        UpbCommand::DeviceStatusReport,
        UpbCommand::DeviceSignatureReport,
        UpbCommand::RegisterValuesReport,
        UpbCommand::RamValuesReport,
        UpbCommand::RawDataReport,
        UpbCommand::HeartbeatReport,
    ];

    /// Wire value.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Look up a wire value. Returns `None` for codes outside the table.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|command| command.code() == code)
    }

    /// Canonical upper-case name.
    pub const fn name(self) -> &'static str {
        match self {
            UpbCommand::Null => "NULL",
            UpbCommand::WriteEnable => "WRITE_ENABLE",
            UpbCommand::WriteProtect => "WRITE_PROTECT",
            UpbCommand::StartSetup => "START_SETUP",
            UpbCommand::StopSetup => "STOP_SETUP",
            UpbCommand::GetSetupTime => "GET_SETUP_TIME",
            UpbCommand::AutoAddress => "AUTO_ADDRESS",
            UpbCommand::GetDeviceStatus => "GET_DEVICE_STATUS",
            UpbCommand::SetDeviceControl => "SET_DEVICE_CONTROL",
            UpbCommand::AddLink => "ADD_LINK",
            UpbCommand::DeleteLink => "DELETE_LINK",
            UpbCommand::TransmitMessage => "TRANSMIT_MESSAGE",
            UpbCommand::DeviceReset => "DEVICE_RESET",
            UpbCommand::GetDeviceSignature => "GET_DEVICE_SIGNATURE",
            UpbCommand::GetRegisterValue => "GET_REGISTER_VALUE",
            UpbCommand::SetRegisterValue => "SET_REGISTER_VALUE",
            UpbCommand::Activate => "ACTIVATE",
            UpbCommand::Deactivate => "DEACTIVATE",
            UpbCommand::Goto => "GOTO",
            UpbCommand::FadeStart => "FADE_START",
            UpbCommand::FadeStop => "FADE_STOP",
            UpbCommand::Blink => "BLINK",
            UpbCommand::Indicate => "INDICATE",
            UpbCommand::Toggle => "TOGGLE",
            UpbCommand::ReportState => "REPORT_STATE",
            UpbCommand::StoreState => "STORE_STATE",
            UpbCommand::AckResponse => "ACK_RESPONSE",
            UpbCommand::SetupTimeReport => "SETUP_TIME_REPORT",
            UpbCommand::DeviceStateReport => "DEVICE_STATE_REPORT",
            UpbCommand::DeviceStatusReport => "DEVICE_STATUS_REPORT",
            UpbCommand::DeviceSignatureReport => "DEVICE_SIGNATURE_REPORT",
            UpbCommand::RegisterValuesReport => "REGISTER_VALUES_REPORT",
            UpbCommand::RamValuesReport => "RAM_VALUES_REPORT",
            UpbCommand::RawDataReport => "RAW_DATA_REPORT",
            UpbCommand::HeartbeatReport => "HEARTBEAT_REPORT",
        }
    }

    /// Returns true for messages devices send back (0x80 and up).
    pub const fn is_report(self) -> bool {
        self.code() >= 0x80
    }
}

impl From<UpbCommand> for u8 {
    fn from(command: UpbCommand) -> Self {
        command.code()
    }
}

impl TryFrom<u8> for UpbCommand {
    type Error = MessageError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or(MessageError::UnknownCommand(code))
    }
}

impl fmt::Display for UpbCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns a human-readable name for a command code.
pub fn command_name(code: u8) -> &'static str {
    match UpbCommand::from_code(code) {
        Some(command) => command.name(),
        None => "UNKNOWN",
    }
}
