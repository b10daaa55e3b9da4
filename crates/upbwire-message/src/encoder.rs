use tracing::trace;
use upbwire_frame::{encode_hex_frame, ControlWord, FrameHeader};

use crate::address::Address;
use crate::command::UpbCommand;
use crate::error::{MessageError, Result};

/// Source id the PIM uses for frames it originates.
pub const PIM_ID: u8 = 0xFF;

/// Rate byte meaning "use the device's default rate" in the multi-channel form.
pub(crate) const DEFAULT_RATE: u8 = 0xFF;

/// Looks up how many times a frame to a given network/target will be sent.
///
/// The counter lives with the caller; the encoder only asks.
pub trait TxCountSource {
    /// Declared transmit count, 1-4.
    fn tx_count(&self, network_id: u8, upb_id: u8) -> u8;
}

impl<F> TxCountSource for F
where
    F: Fn(u8, u8) -> u8,
{
    fn tx_count(&self, network_id: u8, upb_id: u8) -> u8 {
        self(network_id, upb_id)
    }
}

/// Declares the same transmit count for every target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedTxCount(pub u8);

impl Default for FixedTxCount {
    fn default() -> Self {
        Self(1)
    }
}

impl TxCountSource for FixedTxCount {
    fn tx_count(&self, _network_id: u8, _upb_id: u8) -> u8 {
        self.0
    }
}

/// Control word selection for an outbound frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Control {
    /// Build one from the address and the encoder configuration.
    #[default]
    Auto,
    /// Use this word as given; only its length field is replaced.
    Word(ControlWord),
}

impl From<ControlWord> for Control {
    fn from(word: ControlWord) -> Self {
        Control::Word(word)
    }
}

/// Configuration for the message encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Source id written into every frame. Default: [`PIM_ID`].
    pub source_id: u8,
    /// Repeater request (0-3) for automatically built control words. Default: 0.
    pub repeater_request: u8,
    /// Ack request flags (0-7) for automatically built control words. Default: 0.
    pub ack_request: u8,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            source_id: PIM_ID,
            repeater_request: 0,
            ack_request: 0,
        }
    }
}

/// Encodes UPB commands into transmit-ready hex frames.
#[derive(Debug, Clone)]
pub struct MessageEncoder<T> {
    tx_counts: T,
    config: EncoderConfig,
}

impl<T: TxCountSource> MessageEncoder<T> {
    /// Create an encoder with default configuration.
    pub fn new(tx_counts: T) -> Self {
        Self::with_config(tx_counts, EncoderConfig::default())
    }

    /// Create an encoder with explicit configuration.
    pub fn with_config(tx_counts: T, config: EncoderConfig) -> Self {
        Self { tx_counts, config }
    }

    /// Current encoder configuration.
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Build a control word for `addr`. The length field is left at zero.
    ///
    /// Transmit counts outside 1-4 are a caller error and are truncated to
    /// the 2-bit field.
    pub fn control_word(
        &self,
        addr: &Address,
        repeater_request: u8,
        ack_request: u8,
    ) -> ControlWord {
        let tx_count = self.tx_counts.tx_count(addr.network_id(), addr.upb_id());
        ControlWord::default()
            .with_link(addr.is_link())
            .with_repeater_request(repeater_request)
            .with_ack_request(ack_request)
            .with_tx_count(tx_count.wrapping_sub(1))
    }

    /// Encode a message with an already formatted payload.
    pub fn encode_message(
        &self,
        control: Control,
        addr: &Address,
        src_id: u8,
        command: impl Into<u8>,
        payload: &[u8],
    ) -> Result<String> {
        let control = match control {
            Control::Auto => self.control_word(
                addr,
                self.config.repeater_request,
                self.config.ack_request,
            ),
            Control::Word(word) => word,
        };
        let header = FrameHeader {
            control,
            network_id: addr.network_id(),
            dest_id: addr.upb_id(),
            src_id,
            msg_id: command.into(),
        };

        let frame = encode_hex_frame(&header, payload)?;
        trace!(%addr, msg_id = header.msg_id, %frame, "encoded upb message");
        Ok(frame)
    }

    /// Activate a link.
    pub fn activate_link(&self, addr: &Address, control: Control) -> Result<String> {
        self.encode_command(control, addr, UpbCommand::Activate, &[])
    }

    /// Deactivate a link.
    pub fn deactivate_link(&self, addr: &Address, control: Control) -> Result<String> {
        self.encode_command(control, addr, UpbCommand::Deactivate, &[])
    }

    /// Go to `level`, device or link. `rate: None` uses the device default.
    pub fn goto(
        &self,
        addr: &Address,
        level: u8,
        rate: Option<u8>,
        control: Control,
    ) -> Result<String> {
        self.encode_level(control, addr, UpbCommand::Goto, level, rate)
    }

    /// Start fading toward `level`, device or link.
    pub fn fade_start(
        &self,
        addr: &Address,
        level: u8,
        rate: Option<u8>,
        control: Control,
    ) -> Result<String> {
        self.encode_level(control, addr, UpbCommand::FadeStart, level, rate)
    }

    /// Stop a fade in progress, device or link.
    pub fn fade_stop(&self, addr: &Address, control: Control) -> Result<String> {
        self.encode_command(control, addr, UpbCommand::FadeStop, &[])
    }

    /// Blink at `rate`, device or link.
    pub fn blink(&self, addr: &Address, rate: u8, control: Control) -> Result<String> {
        self.encode_command(control, addr, UpbCommand::Blink, &[rate])
    }

    /// Ask a device to report its state.
    pub fn report_state(&self, addr: &Address, control: Control) -> Result<String> {
        self.encode_command(control, addr, UpbCommand::ReportState, &[])
    }

    fn encode_command(
        &self,
        control: Control,
        addr: &Address,
        command: UpbCommand,
        payload: &[u8],
    ) -> Result<String> {
        self.encode_message(control, addr, self.config.source_id, command, payload)
    }

    fn encode_level(
        &self,
        control: Control,
        addr: &Address,
        command: UpbCommand,
        level: u8,
        rate: Option<u8>,
    ) -> Result<String> {
        let payload = level_payload(addr, command, level, rate)?;
        self.encode_command(control, addr, command, &payload)
    }
}

/// Level/rate payload shared by GOTO and FADE_START.
///
/// Multi-channel devices always carry a rate byte and a 1-based channel byte;
/// everything else carries the rate only when one is given. Channel 255 has
/// no wire encoding.
fn level_payload(
    addr: &Address,
    command: UpbCommand,
    level: u8,
    rate: Option<u8>,
) -> Result<Vec<u8>> {
    let mut payload = vec![level];
    if addr.is_device() && addr.multi_channel() {
        let channel = addr.channel().unwrap_or(0);
        let wire_channel = channel
            .checked_add(1)
            .ok_or_else(|| MessageError::InvalidPayload {
                command: command.code(),
                reason: format!("channel {channel} out of range"),
            })?;
        payload.push(rate.unwrap_or(DEFAULT_RATE));
        payload.push(wire_channel);
    } else if let Some(rate) = rate {
        payload.push(rate);
    }
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use upbwire_frame::{decode, strip_frame, verify_checksum, FrameError, MAX_PAYLOAD};

    use super::*;

    fn encoder() -> MessageEncoder<FixedTxCount> {
        MessageEncoder::new(FixedTxCount::default())
    }

    fn payload_of(hex_frame: &str) -> Vec<u8> {
        decode(&strip_frame(hex_frame).unwrap()).unwrap().data.to_vec()
    }

    #[test]
    fn control_word_bit_packing() {
        let encoder = MessageEncoder::new(FixedTxCount(3));
        let word = encoder.control_word(&Address::link(1, 2), 2, 5);

        // link=1 rep=10 len=00000 ack=0101 tc=10 ts=00
        assert_eq!(word.to_be_bytes(), [0b1100_0000, 0b0101_1000]);
        assert!(word.link());
        assert_eq!(word.repeater_request(), 2);
        assert_eq!(word.ack_request(), 5);
        assert_eq!(word.tx_count(), 2);
        assert_eq!(word.tx_seq(), 0);
        assert_eq!(word.length(), 0);
    }

    #[test]
    fn control_word_for_device_clears_link_bit() {
        let word = encoder().control_word(&Address::device(1, 2), 0, 0);
        assert_eq!(word.bits(), 0);
    }

    #[test]
    fn tx_count_is_looked_up_per_target() {
        let calls = RefCell::new(Vec::new());
        let lookup = |network_id: u8, upb_id: u8| -> u8 {
            calls.borrow_mut().push((network_id, upb_id));
            if upb_id == 7 {
                4
            } else {
                1
            }
        };
        let encoder = MessageEncoder::new(lookup);

        let frame = encoder
            .report_state(&Address::device(3, 7), Control::Auto)
            .unwrap();
        let message = decode(&strip_frame(&frame).unwrap()).unwrap();
        assert_eq!(message.tx_count, 3);
        assert_eq!(*calls.borrow(), vec![(3, 7)]);
    }

    #[test]
    fn report_state_frame() {
        let frame = encoder()
            .report_state(&Address::device(1, 5), Control::Auto)
            .unwrap();
        assert_eq!(frame, "07000105FF30C4");
    }

    #[test]
    fn link_commands_set_link_bit() {
        let link = Address::link(1, 9);
        for frame in [
            encoder().activate_link(&link, Control::Auto).unwrap(),
            encoder().deactivate_link(&link, Control::Auto).unwrap(),
        ] {
            let message = decode(&strip_frame(&frame).unwrap()).unwrap();
            assert!(message.link);
            assert_eq!(message.dest_id, 9);
            assert_eq!(message.src_id, PIM_ID);
            assert!(message.data.is_empty());
        }
    }

    #[test]
    fn goto_multi_channel_default_rate() {
        let addr = Address::device_channel(1, 5, 2, true);
        let frame = encoder().goto(&addr, 50, None, Control::Auto).unwrap();
        assert_eq!(payload_of(&frame), vec![50, 0xFF, 3]);
    }

    #[test]
    fn goto_multi_channel_explicit_rate() {
        let addr = Address::device_channel(1, 5, 0, true);
        let frame = encoder().fade_start(&addr, 80, Some(4), Control::Auto).unwrap();
        assert_eq!(payload_of(&frame), vec![80, 4, 1]);
    }

    #[test]
    fn goto_rejects_channel_without_wire_encoding() {
        let addr = Address::device_channel(1, 5, 255, true);
        let err = encoder().goto(&addr, 50, None, Control::Auto).unwrap_err();
        assert!(matches!(
            err,
            MessageError::InvalidPayload { command: 0x22, .. }
        ));
        assert!(err.to_string().contains("channel 255 out of range"));

        let single = Address::device_channel(1, 5, 255, false);
        assert!(encoder().goto(&single, 50, None, Control::Auto).is_ok());
    }

    #[test]
    fn goto_single_channel_with_rate() {
        let frame = encoder()
            .goto(&Address::device(1, 5), 50, Some(10), Control::Auto)
            .unwrap();
        assert_eq!(payload_of(&frame), vec![50, 10]);
    }

    #[test]
    fn goto_single_channel_default_rate() {
        let frame = encoder()
            .goto(&Address::device(1, 5), 100, None, Control::Auto)
            .unwrap();
        assert_eq!(payload_of(&frame), vec![100]);
    }

    #[test]
    fn goto_link_never_carries_channel() {
        let frame = encoder()
            .goto(&Address::link(1, 5), 0, Some(3), Control::Auto)
            .unwrap();
        assert_eq!(payload_of(&frame), vec![0, 3]);
    }

    #[test]
    fn blink_and_fade_stop() {
        let addr = Address::device(1, 5);
        let blink = encoder().blink(&addr, 30, Control::Auto).unwrap();
        assert_eq!(payload_of(&blink), vec![30]);

        let stop = encoder().fade_stop(&addr, Control::Auto).unwrap();
        let message = decode(&strip_frame(&stop).unwrap()).unwrap();
        assert_eq!(message.msg_id, UpbCommand::FadeStop.code());
        assert!(message.data.is_empty());
    }

    #[test]
    fn explicit_control_word_is_kept() {
        let word = ControlWord::default()
            .with_repeater_request(1)
            .with_ack_request(4)
            .with_tx_seq(2)
            .with_length(0x1F);
        let frame = encoder()
            .report_state(&Address::device(1, 5), Control::Word(word))
            .unwrap();
        let message = decode(&strip_frame(&frame).unwrap()).unwrap();
        assert_eq!(message.repeater_req, 1);
        assert_eq!(message.ack_req, 4);
        assert_eq!(message.tx_seq, 2);
        assert_eq!(message.length, 7);
    }

    #[test]
    fn config_controls_source_and_auto_flags() {
        let config = EncoderConfig {
            source_id: 0x42,
            repeater_request: 1,
            ack_request: 2,
        };
        let encoder = MessageEncoder::with_config(FixedTxCount(2), config);
        let frame = encoder
            .report_state(&Address::device(1, 5), Control::Auto)
            .unwrap();
        let message = decode(&strip_frame(&frame).unwrap()).unwrap();
        assert_eq!(message.src_id, 0x42);
        assert_eq!(message.repeater_req, 1);
        assert_eq!(message.ack_req, 2);
        assert_eq!(message.tx_count, 1);
    }

    #[test]
    fn every_frame_sums_to_zero() {
        let encoder = MessageEncoder::new(FixedTxCount(4));
        let device = Address::device_channel(9, 200, 1, true);
        let frames = [
            encoder.goto(&device, 37, Some(250), Control::Auto).unwrap(),
            encoder.fade_start(&device, 100, None, Control::Auto).unwrap(),
            encoder.blink(&device, 255, Control::Auto).unwrap(),
            encoder
                .activate_link(&Address::link(9, 250), Control::Auto)
                .unwrap(),
        ];
        for frame in frames {
            assert!(verify_checksum(&hex::decode(&frame).unwrap()));
            assert!(strip_frame(&frame).is_ok());
        }
    }

    #[test]
    fn round_trip_recovers_header() {
        let addr = Address::device(4, 77);
        let frame = encoder()
            .encode_message(Control::Auto, &addr, 0x10, UpbCommand::StoreState, &[1, 2])
            .unwrap();
        let message = decode(&strip_frame(&frame).unwrap()).unwrap();
        assert_eq!(message.network_id, 4);
        assert_eq!(message.dest_id, 77);
        assert_eq!(message.src_id, 0x10);
        assert_eq!(message.msg_id, UpbCommand::StoreState.code());
        assert_eq!(message.data.as_ref(), &[1, 2]);
    }

    #[test]
    fn payload_length_limit() {
        let addr = Address::device(1, 5);
        let fits = vec![0u8; MAX_PAYLOAD];
        let frame = encoder()
            .encode_message(Control::Auto, &addr, PIM_ID, UpbCommand::RawDataReport, &fits)
            .unwrap();
        assert_eq!(frame.len(), 31 * 2);

        let too_long = vec![0u8; MAX_PAYLOAD + 1];
        let err = encoder()
            .encode_message(Control::Auto, &addr, PIM_ID, UpbCommand::RawDataReport, &too_long)
            .unwrap_err();
        assert!(matches!(
            err,
            MessageError::Frame(FrameError::FrameTooLong { len: 32, max: 31 })
        ));
    }
}
