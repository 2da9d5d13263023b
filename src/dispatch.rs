//! Address-space dispatch.
//!
//! Thin free functions over a borrowed [`DriverHandle`]. Each one validates
//! its arguments, adds the handle's base address on the way in, calls the
//! bound backend and subtracts the base address on the way out. Nothing is
//! retried or clamped: a backend failure is returned to the caller as-is,
//! tagged with the operation that failed.

use tracing::{debug, trace, warn};

use crate::error::{DriverError, Result, VfdError};
use crate::handle::DriverHandle;
use crate::transfer::TransferContext;
use crate::types::{Address, MemoryKind, addr_defined};

/// Reads `buf.len()` bytes at the file-relative address `addr`.
///
/// The request must end at or before the current end-of-allocation for
/// `kind`. A zero-length read returns immediately unless the handle does
/// collective I/O, in which case it is still forwarded to the backend.
pub fn read(
    handle: &mut DriverHandle,
    ctx: &TransferContext,
    kind: MemoryKind,
    addr: Address,
    buf: &mut [u8],
) -> Result<()> {
    check_transfer(ctx)?;
    check_defined(handle, addr)?;

    let size = buf.len() as u64;
    if size == 0 && !handle.coordination().is_collective() {
        debug!(%kind, addr, "Zero-size read, nothing to dispatch");
        return Ok(());
    }

    let abs = checked_span(handle, kind, addr, size)?;
    trace!(%kind, addr = abs, size, "Dispatching read");

    handle
        .driver_mut()
        .read(kind, ctx, abs, buf)
        .map_err(|source| {
            warn!(%kind, addr = abs, size, error = %source, "Driver read failed");
            VfdError::Read {
                kind,
                addr: abs,
                size,
                source,
            }
        })
}

/// Writes `buf` at the file-relative address `addr`.
///
/// Same bounds and zero-length rules as [`read`].
pub fn write(
    handle: &mut DriverHandle,
    ctx: &TransferContext,
    kind: MemoryKind,
    addr: Address,
    buf: &[u8],
) -> Result<()> {
    check_transfer(ctx)?;
    check_defined(handle, addr)?;

    let size = buf.len() as u64;
    if size == 0 && !handle.coordination().is_collective() {
        debug!(%kind, addr, "Zero-size write, nothing to dispatch");
        return Ok(());
    }

    let abs = checked_span(handle, kind, addr, size)?;
    trace!(%kind, addr = abs, size, "Dispatching write");

    handle
        .driver_mut()
        .write(kind, ctx, abs, buf)
        .map_err(|source| {
            warn!(%kind, addr = abs, size, error = %source, "Driver write failed");
            VfdError::Write {
                kind,
                addr: abs,
                size,
                source,
            }
        })
}

/// Sets the end-of-allocation for `kind` to the file-relative address `addr`.
///
/// This only moves the logical high-water mark; no storage is allocated.
pub fn set_eoa(handle: &mut DriverHandle, kind: MemoryKind, addr: Address) -> Result<()> {
    if !addr_defined(addr) || addr > handle.max_address() {
        return Err(VfdError::InvalidAddress {
            addr,
            max: handle.max_address(),
        });
    }

    let abs = handle.to_absolute(addr)?;
    trace!(%kind, addr = abs, "Dispatching set_eoa");

    handle.driver_mut().set_eoa(kind, abs).map_err(|source| {
        warn!(%kind, addr = abs, error = %source, "Driver set_eoa failed");
        VfdError::dispatch("set_eoa", source)
    })
}

/// Returns the end-of-allocation for `kind`, relative to the base address.
pub fn get_eoa(handle: &DriverHandle, kind: MemoryKind) -> Result<Address> {
    let eoa = driver_eoa(handle, kind)?;
    Ok(handle.to_relative(eoa))
}

/// Returns the end-of-file, relative to the base address.
///
/// A backend that does not track its physical extent is treated as if its
/// whole address space already exists: the handle's maximum address stands
/// in for the end of file, and is made relative like any backend value.
pub fn get_eof(handle: &DriverHandle) -> Result<Address> {
    match handle.driver().get_eof() {
        None => Ok(handle.to_relative(handle.max_address())),
        Some(Ok(eof)) if addr_defined(eof) => Ok(handle.to_relative(eof)),
        Some(Ok(_)) => Err(undefined("get_eof")),
        Some(Err(source)) => {
            warn!(error = %source, "Driver get_eof failed");
            Err(VfdError::dispatch("get_eof", source))
        }
    }
}

fn check_transfer(ctx: &TransferContext) -> Result<()> {
    if ctx.is_data_transfer() {
        Ok(())
    } else {
        Err(VfdError::InvalidTransferContext { class: ctx.class() })
    }
}

fn check_defined(handle: &DriverHandle, addr: Address) -> Result<()> {
    if addr_defined(addr) {
        Ok(())
    } else {
        Err(VfdError::InvalidAddress {
            addr,
            max: handle.max_address(),
        })
    }
}

/// Absolute end-of-allocation straight from the backend
fn driver_eoa(handle: &DriverHandle, kind: MemoryKind) -> Result<Address> {
    match handle.driver().get_eoa(kind) {
        Ok(eoa) if addr_defined(eoa) => Ok(eoa),
        Ok(_) => Err(undefined("get_eoa")),
        Err(source) => {
            warn!(%kind, error = %source, "Driver get_eoa failed");
            Err(VfdError::dispatch("get_eoa", source))
        }
    }
}

/// Bounds-checks `[addr, addr + size)` against the current end-of-allocation
/// and returns the absolute start address.
fn checked_span(
    handle: &DriverHandle,
    kind: MemoryKind,
    addr: Address,
    size: u64,
) -> Result<Address> {
    let eoa = driver_eoa(handle, kind)?;
    let abs = addr.saturating_add(handle.base_address());

    match abs.checked_add(size) {
        Some(end) if end <= eoa => Ok(abs),
        _ => Err(VfdError::OutOfRange {
            kind,
            addr: abs,
            size,
            eoa,
        }),
    }
}

fn undefined(op: &'static str) -> VfdError {
    warn!(op, "Driver returned an undefined address");
    VfdError::dispatch(op, DriverError::UndefinedAddress { op })
}
