use std::sync::{Arc, Mutex};

use upbwire_frame::strip_frame;
use upbwire_message::{
    command_name, DeviceStateReport, GotoPayload, Handler, Message, MessageDecoder,
    RegisterValuesReport, UpbCommand,
};

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, message_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_message, OutputFormat, PayloadDetail};

type DetailSlot = Arc<Mutex<Option<PayloadDetail>>>;

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let raw = read_frame(&args)?;
    let slot = DetailSlot::default();
    let decoder = detail_decoder(&slot);

    let message = decoder
        .decode(&raw)
        .map_err(|err| message_error("decode failed", err))?;
    let summary = decoder
        .dispatch(&message)
        .map_err(|err| message_error("decode failed", err))?;

    let detail = slot.lock().ok().and_then(|mut slot| slot.take());
    print_message(&message, &summary, detail.as_ref(), format);
    Ok(SUCCESS)
}

fn read_frame(args: &DecodeArgs) -> CliResult<Vec<u8>> {
    if args.raw {
        return hex::decode(args.frame.trim()).map_err(|err| {
            CliError::new(DATA_INVALID, format!("invalid frame: invalid hex: {err}"))
        });
    }
    strip_frame(&args.frame)
        .map(|raw| raw.to_vec())
        .map_err(|err| frame_error("invalid frame", err))
}

/// Decoder whose handlers capture a typed view of the payload.
///
/// A payload the view cannot parse leaves the slot empty; the message itself
/// still decodes.
fn detail_decoder(slot: &DetailSlot) -> MessageDecoder {
    let mut decoder = MessageDecoder::new();

    let level = store(slot, |message| {
        GotoPayload::parse(message).map(|payload| PayloadDetail::from_goto(&payload))
    });
    decoder.add_handler(UpbCommand::Goto, level.clone());
    decoder.add_handler(UpbCommand::FadeStart, level);
    decoder.add_handler(
        UpbCommand::DeviceStateReport,
        store(slot, |message| {
            DeviceStateReport::parse(message).map(|report| PayloadDetail::from_device_state(&report))
        }),
    );
    decoder.add_handler(
        UpbCommand::RegisterValuesReport,
        store(slot, |message| {
            RegisterValuesReport::parse(message).map(|report| PayloadDetail::from_registers(&report))
        }),
    );

    decoder
}

fn store<F>(slot: &DetailSlot, parse: F) -> Handler
where
    F: Fn(&Message) -> upbwire_message::Result<PayloadDetail> + Send + Sync + 'static,
{
    let slot = Arc::clone(slot);
    Handler::new(move |message| {
        match parse(message) {
            Ok(detail) => {
                if let Ok(mut slot) = slot.lock() {
                    *slot = Some(detail);
                }
            }
            Err(err) => {
                tracing::debug!(
                    command = command_name(message.msg_id),
                    error = %err,
                    "payload view skipped"
                );
            }
        }
        Ok(())
    })
}
