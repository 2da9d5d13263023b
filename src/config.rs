//! Per-open driver configuration

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::types::{Address, IoCoordination};

/// Settings fixed for the lifetime of a [`DriverHandle`](crate::DriverHandle)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Offset added to every logical address before it reaches the backend
    pub base_address: Address,
    /// Zero-size I/O handling, see [`IoCoordination`]
    pub coordination: IoCoordination,
}

impl DriverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base address (size of a leading user block)
    pub fn with_base_address(mut self, base_address: Address) -> Self {
        self.base_address = base_address;
        self
    }

    /// Marks the handle as taking part in collective I/O
    pub fn collective(mut self) -> Self {
        self.coordination = IoCoordination::Collective;
        self
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}
