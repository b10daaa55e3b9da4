//! UPB checksum: the sum of every byte in a frame is zero modulo 256.

/// Checksum byte for the given bytes: `(256 - sum) mod 256`.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes
        .iter()
        .fold(0u8, |sum, byte| sum.wrapping_add(*byte))
        .wrapping_neg()
}

/// Returns true if the frame, checksum byte included, sums to zero.
pub fn verify_checksum(frame: &[u8]) -> bool {
    frame.iter().fold(0u8, |sum, byte| sum.wrapping_add(*byte)) == 0
}

/// Rewrite the last byte of `frame` as the checksum of everything before it.
pub(crate) fn update_checksum(frame: &mut [u8]) {
    if let Some((last, rest)) = frame.split_last_mut() {
        *last = checksum(rest);
    }
}
