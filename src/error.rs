use std::io;
use thiserror::Error;

use crate::transfer::PropertyClass;
use crate::types::{Address, MemoryKind};

/// Errors reported by a concrete backend through the [`FileDriver`](crate::FileDriver) trait
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Driver could not report a defined address for {op}")]
    UndefinedAddress { op: &'static str },

    #[error("Access of {size} bytes at {addr:#x} exceeds driver limit {limit:#x}")]
    OutOfBounds { addr: Address, size: u64, limit: Address },

    #[error("Driver error: {0}")]
    Other(String),
}

/// Errors surfaced by the dispatch layer and the signature locator
#[derive(Error, Debug)]
pub enum VfdError {
    #[error("Initialization failed: {0}")]
    Init(String),

    #[error("Address overflow for {kind} access: addr = {addr:#x}, size = {size}, eoa = {eoa:#x}")]
    OutOfRange {
        kind: MemoryKind,
        addr: Address,
        size: u64,
        eoa: Address,
    },

    #[error("Invalid address {addr:#x} (max: {max:#x})")]
    InvalidAddress { addr: Address, max: Address },

    #[error("Driver {op} request failed: {source}")]
    DispatchFailed {
        op: &'static str,
        #[source]
        source: DriverError,
    },

    #[error("Driver read request failed for {kind} at {addr:#x} ({size} bytes): {source}")]
    Read {
        kind: MemoryKind,
        addr: Address,
        size: u64,
        #[source]
        source: DriverError,
    },

    #[error("Driver write request failed for {kind} at {addr:#x} ({size} bytes): {source}")]
    Write {
        kind: MemoryKind,
        addr: Address,
        size: u64,
        #[source]
        source: DriverError,
    },

    #[error("Transfer context of class {class} is not a data transfer configuration")]
    InvalidTransferContext { class: PropertyClass },

    #[error("Signature search failed, {message}: {source}")]
    Locate {
        message: &'static str,
        #[source]
        source: Box<VfdError>,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Unknown driver: {0}")]
    UnknownDriver(String),
}

impl VfdError {
    pub(crate) fn dispatch(op: &'static str, source: DriverError) -> Self {
        VfdError::DispatchFailed { op, source }
    }

    pub(crate) fn locate(message: &'static str, source: VfdError) -> Self {
        VfdError::Locate {
            message,
            source: Box::new(source),
        }
    }

    /// True when the request was rejected before reaching the backend
    /// because it lies outside the allocated or addressable space.
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            VfdError::OutOfRange { .. } | VfdError::InvalidAddress { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, VfdError>;

pub type DriverResult<T> = std::result::Result<T, DriverError>;
