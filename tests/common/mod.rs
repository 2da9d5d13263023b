//! Shared test backend
//!
//! `MemDriver` keeps file contents in a `Vec<u8>` indexed by absolute
//! address and records every call it receives, so tests can check what the
//! dispatch layer actually forwarded.

#![allow(dead_code)]

use parking_lot::Mutex;
use std::io;
use std::sync::Arc;

use vfd::{
    Address, DriverConfig, DriverError, DriverHandle, DriverResult, FORMAT_SIGNATURE, FileDriver,
    MemoryKind, TransferContext,
};

pub const MEM_MAX_ADDRESS: Address = (1 << 32) - 1;

const KIND_COUNT: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Read {
        kind: MemoryKind,
        addr: Address,
        size: usize,
        ctx: u64,
    },
    Write {
        kind: MemoryKind,
        addr: Address,
        size: usize,
        ctx: u64,
    },
    SetEoa {
        kind: MemoryKind,
        addr: Address,
    },
    Close,
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

/// How `MemDriver` answers `get_eof`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EofMode {
    Tracked,
    Absent,
    Undefined,
    Failing,
}

#[derive(Debug)]
pub struct MemDriver {
    data: Vec<u8>,
    eoa: [Address; KIND_COUNT],
    max_addr: Address,
    eof_mode: EofMode,
    fail_reads: bool,
    fail_writes: bool,
    /// Remaining successful set_eoa calls before every further one fails
    set_eoa_budget: Option<usize>,
    undefined_eoa: bool,
    log: CallLog,
}

impl MemDriver {
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            eoa: [0; KIND_COUNT],
            max_addr: MEM_MAX_ADDRESS,
            eof_mode: EofMode::Tracked,
            fail_reads: false,
            fail_writes: false,
            set_eoa_budget: None,
            undefined_eoa: false,
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_contents(mut self, data: Vec<u8>) -> Self {
        self.data = data;
        self
    }

    pub fn with_eoa(mut self, kind: MemoryKind, addr: Address) -> Self {
        self.eoa[kind.index()] = addr;
        self
    }

    pub fn with_eoa_all(mut self, addr: Address) -> Self {
        self.eoa = [addr; KIND_COUNT];
        self
    }

    pub fn with_max_address(mut self, max_addr: Address) -> Self {
        self.max_addr = max_addr;
        self
    }

    pub fn without_eof(mut self) -> Self {
        self.eof_mode = EofMode::Absent;
        self
    }

    pub fn with_eof_mode(mut self, mode: EofMode) -> Self {
        self.eof_mode = mode;
        self
    }

    pub fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn failing_set_eoa(mut self) -> Self {
        self.set_eoa_budget = Some(0);
        self
    }

    /// Lets the first `calls` set_eoa requests succeed, then fails the rest
    pub fn failing_set_eoa_after(mut self, calls: usize) -> Self {
        self.set_eoa_budget = Some(calls);
        self
    }

    pub fn undefined_eoa(mut self) -> Self {
        self.undefined_eoa = true;
        self
    }

    pub fn log(&self) -> CallLog {
        Arc::clone(&self.log)
    }

    fn record(&self, call: Call) {
        self.log.lock().push(call);
    }
}

impl FileDriver for MemDriver {
    fn name(&self) -> &str {
        "mem"
    }

    fn max_address(&self) -> Address {
        self.max_addr
    }

    fn read(
        &mut self,
        kind: MemoryKind,
        ctx: &TransferContext,
        addr: Address,
        buf: &mut [u8],
    ) -> DriverResult<()> {
        self.record(Call::Read {
            kind,
            addr,
            size: buf.len(),
            ctx: ctx.id(),
        });
        if self.fail_reads {
            return Err(DriverError::Io(io::Error::other("injected read failure")));
        }

        // Past the stored bytes the file reads as zeros.
        buf.fill(0);
        let start = addr as usize;
        if start < self.data.len() {
            let end = (start + buf.len()).min(self.data.len());
            buf[..end - start].copy_from_slice(&self.data[start..end]);
        }
        Ok(())
    }

    fn write(
        &mut self,
        kind: MemoryKind,
        ctx: &TransferContext,
        addr: Address,
        buf: &[u8],
    ) -> DriverResult<()> {
        self.record(Call::Write {
            kind,
            addr,
            size: buf.len(),
            ctx: ctx.id(),
        });
        if self.fail_writes {
            return Err(DriverError::Other("injected write failure".to_string()));
        }

        let start = addr as usize;
        let end = start + buf.len();
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[start..end].copy_from_slice(buf);
        Ok(())
    }

    fn get_eoa(&self, kind: MemoryKind) -> DriverResult<Address> {
        if self.undefined_eoa {
            return Ok(vfd::ADDR_UNDEF);
        }
        Ok(self.eoa[kind.index()])
    }

    fn set_eoa(&mut self, kind: MemoryKind, addr: Address) -> DriverResult<()> {
        self.record(Call::SetEoa { kind, addr });
        match self.set_eoa_budget {
            Some(0) => {
                return Err(DriverError::Other("injected set_eoa failure".to_string()));
            }
            Some(n) => self.set_eoa_budget = Some(n - 1),
            None => {}
        }
        self.eoa[kind.index()] = addr;
        Ok(())
    }

    fn get_eof(&self) -> Option<DriverResult<Address>> {
        match self.eof_mode {
            EofMode::Tracked => Some(Ok(self.data.len() as Address)),
            EofMode::Absent => None,
            EofMode::Undefined => Some(Ok(vfd::ADDR_UNDEF)),
            EofMode::Failing => Some(Err(DriverError::Other("injected get_eof failure".to_string()))),
        }
    }

    fn close(&mut self) -> DriverResult<()> {
        self.record(Call::Close);
        Ok(())
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

/// Opens a handle over `driver` and returns it with the driver's call log
pub fn open(driver: MemDriver, config: &DriverConfig) -> (DriverHandle, CallLog) {
    init_tracing();
    let log = driver.log();
    let handle = DriverHandle::open(Box::new(driver), config).unwrap();
    (handle, log)
}

/// `len` bytes of filler with the format signature written at `offset`
pub fn image_with_signature_at(offset: usize, len: usize) -> Vec<u8> {
    let mut data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
    data[offset..offset + FORMAT_SIGNATURE.len()].copy_from_slice(&FORMAT_SIGNATURE);
    data
}

/// `len` bytes of filler that never contain the format signature
pub fn image_without_signature(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
