//! Locating the format signature behind an optional user block.
//!
//! A file may start with a user block whose size is zero or a power of two
//! no smaller than 512 bytes. The signature therefore sits at offset 0 or
//! at some `2^n` with `n >= 9`, and the locator checks exactly those
//! offsets, in increasing order, up to the end of file.
//!
//! # End-of-allocation side effect
//!
//! Each candidate read first raises the superblock end-of-allocation to
//! cover the bytes it reads. When the signature is found the
//! end-of-allocation is **left** at `offset + signature.len()`; callers
//! must set it to its final value afterwards. Only when every candidate
//! misses is the original value restored.

use tracing::{debug, info};

use crate::dispatch;
use crate::error::{Result, VfdError};
use crate::handle::DriverHandle;
use crate::transfer::TransferContext;
use crate::types::{ADDR_UNDEF, Address, MemoryKind};

/// Magic bytes at the start of every file in the recognized format
pub const FORMAT_SIGNATURE: [u8; 8] = [0x89, b'H', b'D', b'F', b'\r', b'\n', 0x1a, b'\n'];

/// The exponent whose candidate stands for "no user block" (offset 0)
const FIRST_CANDIDATE_EXPONENT: u32 = 8;

/// Smallest user block is 2^9 = 512 bytes; always search at least that far
const MIN_SEARCH_EXPONENT: u32 = 9;

/// Outcome of a signature search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureLocation {
    Found(Address),
    /// No candidate offset held the signature. Not an error: the file is
    /// simply not in the recognized format.
    NotFound,
}

impl SignatureLocation {
    pub fn is_found(&self) -> bool {
        matches!(self, SignatureLocation::Found(_))
    }

    /// The signature offset, or [`ADDR_UNDEF`] when not found
    pub fn address(&self) -> Address {
        match self {
            SignatureLocation::Found(addr) => *addr,
            SignatureLocation::NotFound => ADDR_UNDEF,
        }
    }
}

/// Exclusive upper bound on candidate exponents: the least `N` with
/// `2^N > eof`, but never below 9.
pub fn search_limit(eof: Address) -> u32 {
    (Address::BITS - eof.leading_zeros()).max(MIN_SEARCH_EXPONENT)
}

#[inline]
fn candidate_address(exponent: u32) -> Address {
    if exponent == FIRST_CANDIDATE_EXPONENT {
        0
    } else {
        1 << exponent
    }
}

/// Searches for [`FORMAT_SIGNATURE`]. See [`locate_signature_with`].
pub fn locate_signature(
    handle: &mut DriverHandle,
    ctx: &TransferContext,
) -> Result<SignatureLocation> {
    locate_signature_with(handle, ctx, &FORMAT_SIGNATURE)
}

/// Searches for `signature` at offset 0 and at each power of two from 512
/// up to the end of file.
///
/// Errors are reserved for failures: undefined EOF/EOA is
/// [`VfdError::Init`], and a failed candidate read is [`VfdError::Locate`].
/// A file without the signature yields `Ok(SignatureLocation::NotFound)`.
pub fn locate_signature_with(
    handle: &mut DriverHandle,
    ctx: &TransferContext,
    signature: &[u8],
) -> Result<SignatureLocation> {
    if signature.is_empty() {
        return Err(VfdError::Init("signature must not be empty".to_string()));
    }

    let eof = dispatch::get_eof(handle)
        .map_err(|e| VfdError::Init(format!("unable to obtain EOF value: {e}")))?;
    let eoa = dispatch::get_eoa(handle, MemoryKind::Super)
        .map_err(|e| VfdError::Init(format!("unable to obtain EOA value: {e}")))?;

    let max_power = search_limit(eof);
    let sig_len = signature.len() as Address;
    let mut buf = vec![0u8; signature.len()];

    for exponent in FIRST_CANDIDATE_EXPONENT..max_power {
        let addr = candidate_address(exponent);

        dispatch::set_eoa(handle, MemoryKind::Super, addr.saturating_add(sig_len))
            .map_err(|e| VfdError::locate("unable to set EOA value for file signature", e))?;
        dispatch::read(handle, ctx, MemoryKind::Super, addr, &mut buf)
            .map_err(|e| VfdError::locate("unable to read file signature", e))?;

        if buf.as_slice() == signature {
            info!(addr, eof, "Found file signature");
            return Ok(SignatureLocation::Found(addr));
        }
        debug!(addr, bytes = %hex::encode(&buf), "Signature candidate missed");
    }

    dispatch::set_eoa(handle, MemoryKind::Super, eoa)
        .map_err(|e| VfdError::locate("unable to reset EOA value", e))?;
    debug!(eof, candidates = max_power - FIRST_CANDIDATE_EXPONENT, "File signature not found");

    Ok(SignatureLocation::NotFound)
}
