//! PROM blob encoding for the AMC525 driver.
//!
//! A PROM image is a flat sequence of records:
//! - a 5-byte header (`DIAG` magic + format version)
//! - one device description record
//! - zero or more memory description records
//! - an end record carrying a 16-bit checksum
//!
//! Every record after the header starts with a tag byte and a length byte
//! covering the rest of the record. The format is write-only here: apart from
//! checksum verification there is no decoder.

pub mod checksum;
pub mod image;
pub mod record;

pub use checksum::{
    append_checksum, check_checksum, checksum16, dump_end_record, is_checksum_valid, ChecksumError,
};
pub use image::PromImage;
pub use record::{
    dump_device_description, dump_header, dump_memory_description, MemoryDescription,
    MemoryRange, Permission,
};

use thiserror::Error;

/// Magic tag at the start of every image.
pub const MAGIC: [u8; 4] = *b"DIAG";

/// Format version understood by the driver.
pub const VERSION: u8 = 1;

/// Tag of the end record that carries the checksum.
pub const END_TAG: u8 = 0x00;
/// Tag of the device description record.
pub const DEVICE_TAG: u8 = 0x01;
/// Tag of a memory description with a 48-bit base and 32-bit size.
pub const DMA_TAG: u8 = 0x02;
/// Tag of a memory description with 64-bit base and size.
pub const DMA_EXT_TAG: u8 = 0x03;

/// Region may be written by the host.
pub const WRITE_PERM: u8 = 0x02;
/// Region may be read by the host.
pub const READ_PERM: u8 = 0x04;

/// Size of the PROM window the driver reads. Images must be strictly shorter.
pub const PROM_MAX_LENGTH: usize = 4096;

/// Errors raised while encoding PROM records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromError {
    #[error("{field} needs {length} bytes but the length field holds at most {max}")]
    EncodingOverflow {
        field: &'static str,
        length: usize,
        max: usize,
    },

    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("image size {size} exceeds the PROM window (must be below {max})")]
    ImageTooLarge { size: usize, max: usize },
}
