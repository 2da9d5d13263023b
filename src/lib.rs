//! Virtual file driver dispatch layer.
//!
//! Sits between the logical addresses used by a storage engine and a
//! concrete I/O backend. A [`DriverHandle`] binds one backend
//! ([`FileDriver`]) to a fixed base address; the functions in [`dispatch`]
//! translate addresses, enforce the end-of-allocation bound and forward to
//! the backend; [`locate_signature`] finds where the format signature
//! starts in a file that may carry a user block.

pub mod config;
pub mod dispatch;
mod error;
pub mod handle;
pub mod registry;
pub mod signature;
mod traits;
pub mod transfer;
pub mod types;

pub use config::DriverConfig;
pub use error::{DriverError, DriverResult, Result, VfdError};
pub use handle::DriverHandle;
pub use registry::{DriverFactory, DriverRegistry};
pub use signature::{FORMAT_SIGNATURE, SignatureLocation, locate_signature, locate_signature_with};
pub use traits::FileDriver;
pub use transfer::{PropertyClass, TransferContext};
pub use types::{ADDR_UNDEF, Address, IoCoordination, MemoryKind, addr_defined};
