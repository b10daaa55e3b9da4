use upbwire_message::{Address, Control, EncoderConfig, FixedTxCount, MessageEncoder, UpbCommand};

use crate::cmd::{EncodeArgs, EncodeCommand};
use crate::exit::{message_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let addr = resolve_address(&args);
    let encoder = MessageEncoder::with_config(
        FixedTxCount(args.tx_count),
        EncoderConfig {
            source_id: args.source,
            repeater_request: args.repeater,
            ack_request: args.ack,
        },
    );

    let (command, frame) = encode(&encoder, &args, &addr)?;
    tracing::debug!(%addr, command = command.name(), %frame, "encoded command");
    print_frame(&frame, command.name(), format);
    Ok(SUCCESS)
}

fn resolve_address(args: &EncodeArgs) -> Address {
    if args.link {
        return Address::link(args.network, args.target);
    }
    Address::device_channel(
        args.network,
        args.target,
        args.channel.unwrap_or(0),
        args.multi_channel,
    )
}

fn encode(
    encoder: &MessageEncoder<FixedTxCount>,
    args: &EncodeArgs,
    addr: &Address,
) -> CliResult<(UpbCommand, String)> {
    let control = Control::Auto;
    let (command, result) = match args.command {
        EncodeCommand::Activate => (
            UpbCommand::Activate,
            encoder.activate_link(addr, control),
        ),
        EncodeCommand::Deactivate => (
            UpbCommand::Deactivate,
            encoder.deactivate_link(addr, control),
        ),
        EncodeCommand::Goto => (
            UpbCommand::Goto,
            encoder.goto(addr, require_level(args)?, args.rate, control),
        ),
        EncodeCommand::FadeStart => (
            UpbCommand::FadeStart,
            encoder.fade_start(addr, require_level(args)?, args.rate, control),
        ),
        EncodeCommand::FadeStop => (UpbCommand::FadeStop, encoder.fade_stop(addr, control)),
        EncodeCommand::Blink => {
            let rate = args
                .rate
                .ok_or_else(|| CliError::new(USAGE, "blink requires --rate"))?;
            (UpbCommand::Blink, encoder.blink(addr, rate, control))
        }
        EncodeCommand::ReportState => (
            UpbCommand::ReportState,
            encoder.report_state(addr, control),
        ),
    };

    let frame = result.map_err(|err| message_error("encode failed", err))?;
    Ok((command, frame))
}

fn require_level(args: &EncodeArgs) -> CliResult<u8> {
    args.level.ok_or_else(|| {
        CliError::new(
            USAGE,
            format!("{} requires --level", command_flag(args.command)),
        )
    })
}

fn command_flag(command: EncodeCommand) -> &'static str {
    match command {
        EncodeCommand::FadeStart => "fade-start",
        _ => "goto",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(command: EncodeCommand) -> EncodeArgs {
        EncodeArgs {
            command,
            network: 1,
            target: 5,
            link: false,
            channel: None,
            multi_channel: false,
            level: None,
            rate: None,
            tx_count: 1,
            source: 0xFF,
            repeater: 0,
            ack: 0,
        }
    }

    fn encode_args(args: &EncodeArgs) -> CliResult<(UpbCommand, String)> {
        let encoder = MessageEncoder::new(FixedTxCount(args.tx_count));
        encode(&encoder, args, &resolve_address(args))
    }

    #[test]
    fn report_state_for_device() {
        let (command, frame) = encode_args(&args(EncodeCommand::ReportState)).unwrap();
        assert_eq!(command, UpbCommand::ReportState);
        assert_eq!(frame, "07000105FF30C4");
    }

    #[test]
    fn goto_requires_level() {
        let err = encode_args(&args(EncodeCommand::Goto)).unwrap_err();
        assert_eq!(err.code, USAGE);
        assert_eq!(err.message, "goto requires --level");

        let err = encode_args(&args(EncodeCommand::FadeStart)).unwrap_err();
        assert_eq!(err.message, "fade-start requires --level");
    }

    #[test]
    fn blink_requires_rate() {
        let err = encode_args(&args(EncodeCommand::Blink)).unwrap_err();
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn link_flag_builds_link_address() {
        let mut link_args = args(EncodeCommand::Activate);
        link_args.link = true;
        let addr = resolve_address(&link_args);
        assert!(addr.is_link());
        assert_eq!(addr.upb_id(), 5);
    }

    #[test]
    fn multi_channel_goto_payload() {
        let mut goto = args(EncodeCommand::Goto);
        goto.channel = Some(2);
        goto.multi_channel = true;
        goto.level = Some(50);

        let (_, frame) = encode_args(&goto).unwrap();
        // 0A00 01 05 FF 22 | 32 FF 03 | checksum
        assert!(frame.starts_with("0A000105FF2232FF03"));
        assert_eq!(frame.len(), 20);
    }
}
