//! The 16-bit UPB control word.
//!
//! ```text
//!  15  14 13  12 .. 8  7 .. 4  3 2  1 0
//! ┌───┬─────┬────────┬───────┬────┬────┐
//! │LNK│ REP │ LENGTH │  ACK  │ TC │ TS │
//! └───┴─────┴────────┴───────┴────┴────┘
//! ```
//!
//! `TC` holds the declared transmit count minus one, `TS` the attempt
//! number of this particular transmission.

const LINK_BIT: u16 = 0x8000;
const REPEATER_SHIFT: u32 = 13;
const REPEATER_MASK: u16 = 0x3;
const LENGTH_SHIFT: u32 = 8;
const LENGTH_MASK: u16 = 0x1F;
const ACK_SHIFT: u32 = 4;
const ACK_MASK: u16 = 0x7;
const TX_COUNT_SHIFT: u32 = 2;
const TX_COUNT_MASK: u16 = 0x3;
const TX_SEQ_MASK: u16 = 0x3;

/// Largest value the 2-bit transmit count field can hold.
pub const MAX_TX_COUNT_FIELD: u8 = TX_COUNT_MASK as u8;

/// Packed UPB control word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ControlWord(u16);

impl ControlWord {
    /// Wrap raw control word bits.
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Raw control word bits.
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Read a control word from its big-endian wire bytes.
    pub const fn from_be_bytes(bytes: [u8; 2]) -> Self {
        Self(u16::from_be_bytes(bytes))
    }

    /// Big-endian wire bytes.
    pub const fn to_be_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }

    /// True when the frame is addressed to a link rather than a device.
    pub const fn link(self) -> bool {
        self.0 & LINK_BIT != 0
    }

    pub const fn repeater_request(self) -> u8 {
        self.field(REPEATER_SHIFT, REPEATER_MASK)
    }

    /// Total frame length in bytes, checksum included.
    pub const fn length(self) -> u8 {
        self.field(LENGTH_SHIFT, LENGTH_MASK)
    }

    pub const fn ack_request(self) -> u8 {
        self.field(ACK_SHIFT, ACK_MASK)
    }

    /// Declared transmit count minus one (0-3 encodes 1-4 transmits).
    pub const fn tx_count(self) -> u8 {
        self.field(TX_COUNT_SHIFT, TX_COUNT_MASK)
    }

    pub const fn tx_seq(self) -> u8 {
        self.field(0, TX_SEQ_MASK)
    }

    pub const fn with_link(self, link: bool) -> Self {
        if link {
            Self(self.0 | LINK_BIT)
        } else {
            Self(self.0 & !LINK_BIT)
        }
    }

    pub const fn with_repeater_request(self, value: u8) -> Self {
        self.with_field(REPEATER_SHIFT, REPEATER_MASK, value)
    }

    pub const fn with_length(self, value: u8) -> Self {
        self.with_field(LENGTH_SHIFT, LENGTH_MASK, value)
    }

    pub const fn with_ack_request(self, value: u8) -> Self {
        self.with_field(ACK_SHIFT, ACK_MASK, value)
    }

    /// Set the transmit count field (declared count minus one).
    pub const fn with_tx_count(self, value: u8) -> Self {
        self.with_field(TX_COUNT_SHIFT, TX_COUNT_MASK, value)
    }

    pub const fn with_tx_seq(self, value: u8) -> Self {
        self.with_field(0, TX_SEQ_MASK, value)
    }

    const fn field(self, shift: u32, mask: u16) -> u8 {
        ((self.0 >> shift) & mask) as u8
    }

    // Values wider than the field are truncated to its width.
    const fn with_field(self, shift: u32, mask: u16, value: u8) -> Self {
        let cleared = self.0 & !(mask << shift);
        Self(cleared | ((value as u16 & mask) << shift))
    }
}

impl From<u16> for ControlWord {
    fn from(bits: u16) -> Self {
        Self(bits)
    }
}

impl From<ControlWord> for u16 {
    fn from(word: ControlWord) -> Self {
        word.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_every_field() {
        let word = ControlWord::default()
            .with_link(true)
            .with_repeater_request(2)
            .with_length(9)
            .with_ack_request(5)
            .with_tx_count(2)
            .with_tx_seq(1);

        // 1 10 01001 0101 10 01
        assert_eq!(word.bits(), 0b1100_1001_0101_1001);
        assert_eq!(word.to_be_bytes(), [0xC9, 0x59]);
    }

    #[test]
    fn unpacks_every_field() {
        let word = ControlWord::from_be_bytes([0xC9, 0x59]);
        assert!(word.link());
        assert_eq!(word.repeater_request(), 2);
        assert_eq!(word.length(), 9);
        assert_eq!(word.ack_request(), 5);
        assert_eq!(word.tx_count(), 2);
        assert_eq!(word.tx_seq(), 1);
    }

    #[test]
    fn setters_replace_previous_value() {
        let word = ControlWord::from_bits(0xFFFF).with_length(7).with_tx_count(0);
        assert_eq!(word.length(), 7);
        assert_eq!(word.tx_count(), 0);
        assert_eq!(word.tx_seq(), 3);
        assert!(!word.with_link(false).link());
    }

    #[test]
    fn oversized_values_are_truncated_to_field_width() {
        let word = ControlWord::default().with_tx_count(5).with_length(0x3F);
        assert_eq!(word.tx_count(), 1);
        assert_eq!(word.length(), 0x1F);
        assert_eq!(word.repeater_request(), 0);
        assert!(!word.link());
    }
}
