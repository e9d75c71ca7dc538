//! COE (Coefficient) export for FPGA memory initialization.
//!
//! Bytes are grouped into words of `group_size` bytes. Each word is written
//! most significant byte first, i.e. the group is read as little-endian. A
//! short trailing group is zero-padded at its high end.

use thiserror::Error;

const RADIX_LINE: &str = "memory_initialization_radix=16;\n";
const VECTOR_LINE: &str = "memory_initialization_vector=\n";

/// Render `data` as a COE file.
pub fn dump_coe(data: &[u8], group_size: usize) -> Result<String, CoeError> {
    if group_size == 0 {
        return Err(CoeError::ZeroGroupSize);
    }

    let words = data.len().div_ceil(group_size);
    let mut out = String::with_capacity(
        RADIX_LINE.len() + VECTOR_LINE.len() + words * (group_size * 2 + 2) + 2,
    );
    out.push_str(RADIX_LINE);
    out.push_str(VECTOR_LINE);

    for (i, group) in data.chunks(group_size).enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        for _ in group.len()..group_size {
            out.push_str("00");
        }
        for byte in group.iter().rev() {
            out.push_str(&format!("{:02x}", byte));
        }
    }
    out.push_str(";\n");

    tracing::debug!(bytes = data.len(), words, group_size, "rendered COE");
    Ok(out)
}

/// Errors that can occur during COE rendering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoeError {
    #[error("group size must be at least one byte")]
    ZeroGroupSize,
}
