//! Backend interface for the dispatch layer.
//!
//! A concrete driver (local file, memory buffer, network block store, file
//! family, ...) implements [`FileDriver`] and is bound to a
//! [`DriverHandle`](crate::DriverHandle) at open time.

use crate::error::DriverResult;
use crate::transfer::TransferContext;
use crate::types::{Address, MemoryKind};

/// Operation table of a concrete backend.
///
/// All addresses passed to and returned from these methods are absolute,
/// i.e. they already include the handle's base address. Returning
/// `Ok(ADDR_UNDEF)` from an address query is treated the same as an error.
///
/// # Example
///
/// ```ignore
/// struct NullDriver { eoa: Address }
///
/// impl FileDriver for NullDriver {
///     fn name(&self) -> &str { "null" }
///     fn max_address(&self) -> Address { u32::MAX as Address }
///     fn read(&mut self, _: MemoryKind, _: &TransferContext, _: Address, buf: &mut [u8]) -> DriverResult<()> {
///         buf.fill(0);
///         Ok(())
///     }
///     fn write(&mut self, _: MemoryKind, _: &TransferContext, _: Address, _: &[u8]) -> DriverResult<()> {
///         Ok(())
///     }
///     fn get_eoa(&self, _: MemoryKind) -> DriverResult<Address> { Ok(self.eoa) }
///     fn set_eoa(&mut self, _: MemoryKind, addr: Address) -> DriverResult<()> {
///         self.eoa = addr;
///         Ok(())
///     }
/// }
/// ```
pub trait FileDriver: Send {
    /// Short name of the driver class
    fn name(&self) -> &str;

    /// Largest address the backend can represent
    fn max_address(&self) -> Address;

    /// Fills `buf` with the bytes stored at `addr`
    fn read(
        &mut self,
        kind: MemoryKind,
        ctx: &TransferContext,
        addr: Address,
        buf: &mut [u8],
    ) -> DriverResult<()>;

    /// Stores `buf` at `addr`
    fn write(
        &mut self,
        kind: MemoryKind,
        ctx: &TransferContext,
        addr: Address,
        buf: &[u8],
    ) -> DriverResult<()>;

    /// Current end-of-allocation for `kind`
    fn get_eoa(&self, kind: MemoryKind) -> DriverResult<Address>;

    /// Moves the end-of-allocation for `kind`. Does not allocate storage.
    fn set_eoa(&mut self, kind: MemoryKind, addr: Address) -> DriverResult<()>;

    /// Physical end of file, if the backend tracks one.
    ///
    /// `None` means the backend has no notion of physical extent; the
    /// dispatch layer then reports the maximum address instead.
    fn get_eof(&self) -> Option<DriverResult<Address>> {
        None
    }

    /// Releases backend resources. Called once when the handle closes.
    fn close(&mut self) -> DriverResult<()> {
        Ok(())
    }
}
