//! # PROM data creator
//!
//! Builds the descriptor blob that the AMC525 driver reads from the board
//! PROM, and exports arbitrary bytes as a COE memory-initialization file.
//!
//! The encoders are pure functions; file handling lives in the binary.

pub mod coe;
pub mod config;
pub mod prom;

// Re-export commonly used types
pub use coe::{dump_coe, CoeError};
pub use config::{ConfigError, PromConfig};
pub use prom::{
    append_checksum, check_checksum, checksum16, dump_device_description, dump_end_record,
    dump_header, dump_memory_description, is_checksum_valid, ChecksumError, MemoryDescription,
    MemoryRange, Permission, PromError, PromImage, READ_PERM, WRITE_PERM,
};
