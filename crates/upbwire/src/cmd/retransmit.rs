use upbwire_frame::{decode, increment_tx_count, strip_frame};
use upbwire_message::command_name;

use crate::cmd::RetransmitArgs;
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: RetransmitArgs, format: OutputFormat) -> CliResult<i32> {
    strip_frame(&args.frame).map_err(|err| frame_error("invalid frame", err))?;
    let frame = increment_tx_count(&args.frame)
        .map_err(|err| frame_error("retransmit failed", err))?;
    let message = strip_frame(&frame)
        .and_then(|raw| decode(&raw))
        .map_err(|err| frame_error("retransmit failed", err))?;

    tracing::debug!(
        transmits = message.declared_transmits(),
        "updated declared transmit count"
    );
    print_frame(&frame, command_name(message.msg_id), format);
    Ok(SUCCESS)
}
