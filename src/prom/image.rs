//! Whole-image assembly.

use super::checksum::dump_end_record;
use super::record::{dump_device_description, dump_header, MemoryDescription, Permission};
use super::{PromError, PROM_MAX_LENGTH};

/// A PROM image: one device and the memory regions it exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromImage {
    /// Device name, reported by the driver as the board type.
    pub device: String,
    /// Memory regions in the order they are encoded.
    pub memories: Vec<MemoryDescription>,
}

impl PromImage {
    /// Create an image with no memory regions.
    pub fn new(device: &str) -> Self {
        Self {
            device: device.to_string(),
            memories: Vec::new(),
        }
    }

    /// Append an already validated memory region.
    pub fn push(&mut self, memory: MemoryDescription) {
        self.memories.push(memory);
    }

    /// Append a memory region built from raw values.
    pub fn add_memory(
        &mut self,
        name: &str,
        base: u64,
        size: u64,
        permission: Permission,
    ) -> Result<&mut Self, PromError> {
        self.push(MemoryDescription::new(name, base, size, permission)?);
        Ok(self)
    }

    /// Number of records before the end record.
    pub fn record_count(&self) -> usize {
        1 + self.memories.len()
    }

    /// Encode the complete image, end record and checksum included.
    pub fn to_bytes(&self) -> Result<Vec<u8>, PromError> {
        let mut out = dump_header().to_vec();
        out.extend(dump_device_description(&self.device)?);
        for memory in &self.memories {
            out.extend(memory.to_bytes()?);
        }
        let end = dump_end_record(&out);
        out.extend(end);

        if out.len() >= PROM_MAX_LENGTH {
            return Err(PromError::ImageTooLarge {
                size: out.len(),
                max: PROM_MAX_LENGTH,
            });
        }

        tracing::info!(
            device = %self.device,
            memories = self.memories.len(),
            bytes = out.len(),
            "built PROM image"
        );
        tracing::trace!(?out, "image bytes");
        Ok(out)
    }
}
