use clap::{Args, Subcommand, ValueEnum};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod retransmit;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode a UPB frame and print its fields.
    Decode(DecodeArgs),
    /// Encode a device or link command as a hex frame.
    Encode(EncodeArgs),
    /// Bump the declared transmit count of a hex frame.
    Retransmit(RetransmitArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, format),
        Command::Encode(args) => encode::run(args, format),
        Command::Retransmit(args) => retransmit::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Frame as hex, checksum included.
    pub frame: String,
    /// The frame has no trailing checksum byte.
    #[arg(long)]
    pub raw: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum EncodeCommand {
    Activate,
    Deactivate,
    Goto,
    FadeStart,
    FadeStop,
    Blink,
    ReportState,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Command to encode.
    #[arg(value_enum)]
    pub command: EncodeCommand,
    /// Network id.
    #[arg(long, short = 'n', env = "UPBWIRE_NETWORK")]
    pub network: u8,
    /// Device or link id.
    #[arg(long, short = 't')]
    pub target: u8,
    /// Address a link instead of a device.
    #[arg(long, conflicts_with_all = ["channel", "multi_channel"])]
    pub link: bool,
    /// Device channel (0-based).
    #[arg(long)]
    pub channel: Option<u8>,
    /// The device has several channels and needs the channel in the payload.
    #[arg(long)]
    pub multi_channel: bool,
    /// Target level for goto/fade-start (0-100).
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub level: Option<u8>,
    /// Rate byte; omit for the device default. Required for blink.
    #[arg(long)]
    pub rate: Option<u8>,
    /// Declared transmit count (1-4).
    #[arg(
        long,
        default_value = "1",
        env = "UPBWIRE_TX_COUNT",
        value_parser = clap::value_parser!(u8).range(1..=4)
    )]
    pub tx_count: u8,
    /// Source id.
    #[arg(long, default_value = "255")]
    pub source: u8,
    /// Repeater request (0-3).
    #[arg(long, default_value = "0", value_parser = clap::value_parser!(u8).range(0..=3))]
    pub repeater: u8,
    /// Ack request flags (0-7).
    #[arg(long, default_value = "0", value_parser = clap::value_parser!(u8).range(0..=7))]
    pub ack: u8,
}

#[derive(Args, Debug)]
pub struct RetransmitArgs {
    /// Frame as hex, checksum included.
    pub frame: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
