//! Record encoders: header, device description and memory descriptions.

use super::{PromError, DEVICE_TAG, DMA_EXT_TAG, DMA_TAG, MAGIC, READ_PERM, VERSION, WRITE_PERM};
use std::fmt;
use std::ops::BitOr;

/// Largest value a record length byte can hold.
const MAX_RECORD_LENGTH: usize = u8::MAX as usize;

/// Largest base address a narrow memory record can carry (48 bits).
const NARROW_BASE_LIMIT: u64 = 1 << 48;

/// Encode the fixed image header.
pub fn dump_header() -> [u8; 5] {
    let mut header = [0u8; 5];
    header[..4].copy_from_slice(&MAGIC);
    header[4] = VERSION;
    header
}

/// Encode the device description record.
///
/// Layout: tag, length (`name + terminator`), name, `0x00`.
pub fn dump_device_description(name: &str) -> Result<Vec<u8>, PromError> {
    check_name(name)?;
    let length = record_length("device name", name.len() + 1)?;

    let mut out = Vec::with_capacity(2 + length as usize);
    out.push(DEVICE_TAG);
    out.push(length);
    out.extend_from_slice(name.as_bytes());
    out.push(0);

    tracing::debug!(name, length, "encoded device description");
    Ok(out)
}

/// Encode a memory description record from raw values.
///
/// `permission` is a bitwise OR of [`READ_PERM`] and [`WRITE_PERM`]; zero is
/// accepted and describes a reserved region.
pub fn dump_memory_description(
    name: &str,
    base: u64,
    size: u64,
    permission: u8,
) -> Result<Vec<u8>, PromError> {
    let permission = Permission::from_bits(permission)?;
    MemoryDescription::new(name, base, size, permission)?.to_bytes()
}

/// Access rights of a memory region.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Permission(u8);

impl Permission {
    pub const NONE: Permission = Permission(0);
    pub const READ: Permission = Permission(READ_PERM);
    pub const WRITE: Permission = Permission(WRITE_PERM);
    pub const READ_WRITE: Permission = Permission(READ_PERM | WRITE_PERM);

    /// Validate a raw permission byte.
    pub fn from_bits(bits: u8) -> Result<Self, PromError> {
        if bits & !Self::READ_WRITE.0 != 0 {
            return Err(PromError::MalformedInput(format!(
                "permission 0x{:02x} has bits outside 0x{:02x}",
                bits,
                Self::READ_WRITE.0
            )));
        }
        Ok(Permission(bits))
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_readable(self) -> bool {
        self.0 & READ_PERM != 0
    }

    pub fn is_writable(self) -> bool {
        self.0 & WRITE_PERM != 0
    }
}

impl BitOr for Permission {
    type Output = Permission;

    fn bitor(self, rhs: Permission) -> Permission {
        Permission(self.0 | rhs.0)
    }
}

impl fmt::Debug for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Permission({})", self)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = if self.is_readable() { 'r' } else { '-' };
        let w = if self.is_writable() { 'w' } else { '-' };
        write!(f, "{}{}", r, w)
    }
}

/// Address range of a memory region, sized by the record it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryRange {
    /// 48-bit base and 32-bit size, encoded under [`DMA_TAG`].
    Narrow { base: u64, size: u32 },
    /// 64-bit base and size, encoded under [`DMA_EXT_TAG`].
    Wide { base: u64, size: u64 },
}

impl MemoryRange {
    /// Pick the smallest encoding that holds both values.
    pub fn new(base: u64, size: u64) -> Self {
        match u32::try_from(size) {
            Ok(size) if base < NARROW_BASE_LIMIT => MemoryRange::Narrow { base, size },
            _ => MemoryRange::Wide { base, size },
        }
    }

    pub fn base(&self) -> u64 {
        match *self {
            MemoryRange::Narrow { base, .. } | MemoryRange::Wide { base, .. } => base,
        }
    }

    pub fn size(&self) -> u64 {
        match *self {
            MemoryRange::Narrow { size, .. } => size as u64,
            MemoryRange::Wide { size, .. } => size,
        }
    }

    /// Record tag matching this encoding.
    pub fn tag(&self) -> u8 {
        match self {
            MemoryRange::Narrow { .. } => DMA_TAG,
            MemoryRange::Wide { .. } => DMA_EXT_TAG,
        }
    }

    /// Number of bytes taken by base and size together.
    pub fn encoded_len(&self) -> usize {
        match self {
            MemoryRange::Narrow { .. } => 6 + 4,
            MemoryRange::Wide { .. } => 8 + 8,
        }
    }

    fn write_to(&self, out: &mut Vec<u8>) -> Result<(), PromError> {
        match *self {
            MemoryRange::Narrow { base, .. } if base >= NARROW_BASE_LIMIT => {
                return Err(PromError::MalformedInput(format!(
                    "base {:#x} does not fit the 48-bit field of a narrow record",
                    base
                )));
            }
            MemoryRange::Narrow { base, size } => {
                out.extend_from_slice(&base.to_le_bytes()[..6]);
                out.extend_from_slice(&size.to_le_bytes());
            }
            MemoryRange::Wide { base, size } => {
                out.extend_from_slice(&base.to_le_bytes());
                out.extend_from_slice(&size.to_le_bytes());
            }
        }
        Ok(())
    }
}

/// A memory region exposed by the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryDescription {
    name: String,
    range: MemoryRange,
    permission: Permission,
}

impl MemoryDescription {
    /// Build a description, checking that it fits in a single record.
    pub fn new(
        name: &str,
        base: u64,
        size: u64,
        permission: Permission,
    ) -> Result<Self, PromError> {
        check_name(name)?;
        let desc = Self {
            name: name.to_string(),
            range: MemoryRange::new(base, size),
            permission,
        };
        record_length("memory description", desc.payload_len())?;
        Ok(desc)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn range(&self) -> MemoryRange {
        self.range
    }

    pub fn permission(&self) -> Permission {
        self.permission
    }

    /// Bytes covered by the length field.
    fn payload_len(&self) -> usize {
        self.range.encoded_len() + 1 + self.name.len() + 1
    }

    /// Encode the record.
    ///
    /// Layout: tag, length, base, size, permission, name, `0x00`.
    pub fn to_bytes(&self) -> Result<Vec<u8>, PromError> {
        check_name(&self.name)?;
        let length = record_length("memory description", self.payload_len())?;

        let mut out = Vec::with_capacity(2 + length as usize);
        out.push(self.range.tag());
        out.push(length);
        self.range.write_to(&mut out)?;
        out.push(self.permission.bits());
        out.extend_from_slice(self.name.as_bytes());
        out.push(0);

        tracing::debug!(
            name = %self.name,
            base = format_args!("{:#x}", self.range.base()),
            size = format_args!("{:#x}", self.range.size()),
            perm = %self.permission,
            tag = self.range.tag(),
            "encoded memory description"
        );
        Ok(out)
    }
}

/// Names are stored null-terminated, so they cannot carry a NUL themselves.
fn check_name(name: &str) -> Result<(), PromError> {
    if name.bytes().any(|b| b == 0) {
        return Err(PromError::MalformedInput(format!(
            "name {:?} contains a NUL byte",
            name
        )));
    }
    Ok(())
}

fn record_length(field: &'static str, length: usize) -> Result<u8, PromError> {
    u8::try_from(length).map_err(|_| PromError::EncodingOverflow {
        field,
        length,
        max: MAX_RECORD_LENGTH,
    })
}
