//! JSON layout files describing a device and its memory regions.
//!
//! ```json
//! {
//!     "device": "amc525_mbf",
//!     "memories": [
//!         { "name": "ddr0", "base": "0x800000000000", "size": "0x80000000", "access": ["read"] },
//!         { "name": "regs", "base": 0, "size": 4096, "access": ["read", "write"] }
//!     ]
//! }
//! ```

use crate::prom::{MemoryDescription, Permission, PromError, PromImage};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// A device layout as written by the user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PromConfig {
    /// Device name written into the device description record.
    pub device: String,
    #[serde(default)]
    pub memories: Vec<MemoryConfig>,
}

/// One memory region of the layout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    pub name: String,
    pub base: Number,
    pub size: Number,
    /// Missing or empty means a reserved region with no host access.
    #[serde(default)]
    pub access: Vec<Access>,
}

/// Host access right of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Read,
    Write,
}

impl Access {
    fn permission(self) -> Permission {
        match self {
            Access::Read => Permission::READ,
            Access::Write => Permission::WRITE,
        }
    }
}

/// An integer given either as a JSON number or as a string (`"0x..."` or decimal).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Number {
    Int(u64),
    Text(String),
}

impl Number {
    pub fn value(&self) -> Result<u64, ConfigError> {
        match self {
            Number::Int(v) => Ok(*v),
            Number::Text(s) => parse_u64(s),
        }
    }
}

fn parse_u64(text: &str) -> Result<u64, ConfigError> {
    let t = text.trim().replace('_', "");
    let parsed = match t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => t.parse(),
    };
    parsed.map_err(|e| ConfigError::Parse(format!("invalid number {:?}: {}", text, e)))
}

impl MemoryConfig {
    pub fn permission(&self) -> Permission {
        self.access
            .iter()
            .fold(Permission::NONE, |acc, a| acc | a.permission())
    }

    pub fn to_description(&self) -> Result<MemoryDescription, ConfigError> {
        let base = self.base.value()?;
        let size = self.size.value()?;
        Ok(MemoryDescription::new(&self.name, base, size, self.permission())?)
    }
}

impl PromConfig {
    /// Parse a layout from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load a layout file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        tracing::debug!(path = %path.display(), "loaded layout");
        Self::from_json(&text)
    }

    /// Validate every region and assemble the image.
    pub fn to_image(&self) -> Result<PromImage, ConfigError> {
        let mut image = PromImage::new(&self.device);
        for memory in &self.memories {
            image.push(memory.to_description()?);
        }
        Ok(image)
    }
}

/// Errors that can occur while reading a layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Prom(#[from] PromError),
}
