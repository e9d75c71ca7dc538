//! 16-bit image checksum and the end record that carries it.
//!
//! The checksum is the ones' complement of the ones' complement sum of the
//! data read as little-endian 16-bit words, the same routine the driver runs
//! over the PROM before accepting it. A trailing odd byte is added as the
//! high half of a word.

use super::END_TAG;
use thiserror::Error;

/// Size of the stored checksum.
pub const CHECKSUM_SIZE: usize = 2;

/// Compute the checksum of `data`.
pub fn checksum16(data: &[u8]) -> u16 {
    let mut chunks = data.chunks_exact(2);
    let mut sum: u32 = chunks
        .by_ref()
        .map(|w| u16::from_le_bytes([w[0], w[1]]) as u32)
        .fold(0u32, u32::wrapping_add);
    if let [last] = chunks.remainder() {
        sum = sum.wrapping_add((*last as u32) << 8);
    }
    sum = (sum & 0xffff) + (sum >> 16);
    sum = (sum & 0xffff) + (sum >> 16);
    !(sum as u16)
}

/// Return `data` followed by its checksum (little-endian).
pub fn append_checksum(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + CHECKSUM_SIZE);
    out.extend_from_slice(data);
    out.extend_from_slice(&checksum16(data).to_le_bytes());
    out
}

/// Encode the end record that terminates an image starting with `prefix`.
///
/// The record is the end tag, a length byte, an optional zero pad and the
/// checksum. The pad keeps the checksum on an even offset so the driver's
/// word-wise sum over the whole image comes out as zero.
pub fn dump_end_record(prefix: &[u8]) -> Vec<u8> {
    let padded = prefix.len() % 2 == 1;
    let length = CHECKSUM_SIZE + padded as usize;

    let mut record = vec![END_TAG, length as u8];
    if padded {
        record.push(0);
    }

    let mut covered = Vec::with_capacity(prefix.len() + record.len());
    covered.extend_from_slice(prefix);
    covered.extend_from_slice(&record);
    let checksum = checksum16(&covered);
    record.extend_from_slice(&checksum.to_le_bytes());

    tracing::debug!(checksum = format_args!("{:#06x}", checksum), padded, "encoded end record");
    record
}

/// Verify the checksum stored in the last two bytes of `blob`.
pub fn check_checksum(blob: &[u8]) -> Result<(), ChecksumError> {
    if blob.len() < CHECKSUM_SIZE {
        return Err(ChecksumError::TooShort(blob.len()));
    }
    let (data, trailer) = blob.split_at(blob.len() - CHECKSUM_SIZE);
    let stored = u16::from_le_bytes([trailer[0], trailer[1]]);
    let computed = checksum16(data);
    if computed != stored {
        return Err(ChecksumError::Mismatch { computed, stored });
    }
    Ok(())
}

/// Boolean form of [`check_checksum`].
pub fn is_checksum_valid(blob: &[u8]) -> bool {
    check_checksum(blob).is_ok()
}

/// Errors reported by checksum verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChecksumError {
    #[error("blob of {0} bytes is too short to hold a checksum")]
    TooShort(usize),

    #[error("checksum mismatch: computed {computed:#06x}, stored {stored:#06x}")]
    Mismatch { computed: u16, stored: u16 },
}
