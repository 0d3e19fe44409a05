//! Internet checksum ([RFC 1071](https://tools.ietf.org/html/rfc1071))
//!
//! Words are read little-endian and the checksum is stored little-endian. The one's-complement sum
//! is byte-order independent, so the stored bytes are identical to what a big-endian
//! implementation would write in network order.

use crate::error::PacketError;

/// Compute the checksum over `buffer` and write it into the field at `offset`
///
/// The checksum field is zeroed before summing, so it does not contribute to its own value. Returns
/// the finalized buffer together with the two checksum bytes as they were stored.
///
/// # Errors
///
/// Returns `PacketError::BufferTooShort` if the buffer is shorter than 2 bytes or cannot hold the
/// field at `offset`. The buffer is not touched in that case.
pub fn compute_and_insert(
    mut buffer: Vec<u8>,
    offset: usize,
) -> Result<(Vec<u8>, [u8; 2]), PacketError> {
    let len = buffer.len();
    if len < 2 || offset.checked_add(2).map_or(true, |end| len < end) {
        return Err(PacketError::BufferTooShort { len, offset });
    }

    buffer[offset] = 0;
    buffer[offset + 1] = 0;

    let checksum = (!ones_complement_sum(&buffer)).to_le_bytes();
    buffer[offset..offset + 2].copy_from_slice(&checksum);

    Ok((buffer, checksum))
}

/// Folded 16-bit one's-complement sum of `data`
///
/// An odd trailing byte counts as the low byte of a final word.
pub fn ones_complement_sum(data: &[u8]) -> u16 {
    let mut chunks = data.chunks_exact(2);
    let mut sum = chunks
        .by_ref()
        .map(|word| u32::from(u16::from_le_bytes([word[0], word[1]])))
        .fold(0u32, add_with_carry);

    if let [last] = chunks.remainder() {
        sum = add_with_carry(sum, u32::from(*last));
    }

    while sum >> 16 != 0 {
        sum = (sum & 0xffff) + (sum >> 16);
    }
    sum as u16
}

/// End-around carry after every word, so the accumulator stays within 17 bits for any length
fn add_with_carry(sum: u32, word: u32) -> u32 {
    let sum = sum + word;
    (sum & 0xffff) + (sum >> 16)
}

/// Return `true` if a finalized buffer carries a valid checksum
pub fn verify(data: &[u8]) -> bool {
    ones_complement_sum(data) == 0xffff
}
