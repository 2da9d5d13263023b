//! Driver handle: one open connection to a concrete backend

use std::fmt;
use tracing::{debug, warn};

use crate::config::DriverConfig;
use crate::error::{Result, VfdError};
use crate::traits::FileDriver;
use crate::types::{Address, IoCoordination, addr_defined};

/// A backend bound at open time together with the file's base address and
/// the backend's maximum address.
///
/// The dispatch functions in [`crate::dispatch`] and the signature locator
/// borrow a handle for the duration of a single call. Base and maximum
/// address never change after [`DriverHandle::open`].
pub struct DriverHandle {
    driver: Box<dyn FileDriver>,
    base_addr: Address,
    max_addr: Address,
    coordination: IoCoordination,
}

impl DriverHandle {
    /// Binds `driver` to a new handle using the settings in `config`
    pub fn open(driver: Box<dyn FileDriver>, config: &DriverConfig) -> Result<Self> {
        let max_addr = driver.max_address();
        if max_addr == 0 || !addr_defined(max_addr) {
            return Err(VfdError::InvalidConfig(format!(
                "driver '{}' reports an unusable maximum address {:#x}",
                driver.name(),
                max_addr
            )));
        }

        let base_addr = config.base_address;
        if !addr_defined(base_addr) || base_addr > max_addr {
            return Err(VfdError::InvalidAddress {
                addr: base_addr,
                max: max_addr,
            });
        }

        // An empty file is being created and may grow past its user block;
        // a non-empty file shorter than the base address cannot hold one.
        if let Some(Ok(eof)) = driver.get_eof() {
            if addr_defined(eof) && eof > 0 && base_addr > eof {
                return Err(VfdError::InvalidAddress {
                    addr: base_addr,
                    max: eof,
                });
            }
        }

        debug!(
            driver = driver.name(),
            base_addr,
            max_addr,
            coordination = ?config.coordination,
            "Opened driver handle"
        );

        Ok(Self {
            driver,
            base_addr,
            max_addr,
            coordination: config.coordination,
        })
    }

    /// Closes the backend connection
    pub fn close(mut self) -> Result<()> {
        let name = self.driver.name().to_string();
        self.driver.close().map_err(|e| {
            warn!(driver = %name, error = %e, "Driver close failed");
            VfdError::dispatch("close", e)
        })?;
        debug!(driver = %name, "Closed driver handle");
        Ok(())
    }

    #[inline]
    pub fn base_address(&self) -> Address {
        self.base_addr
    }

    #[inline]
    pub fn max_address(&self) -> Address {
        self.max_addr
    }

    #[inline]
    pub fn coordination(&self) -> IoCoordination {
        self.coordination
    }

    pub fn driver_name(&self) -> &str {
        self.driver.name()
    }

    pub(crate) fn driver(&self) -> &dyn FileDriver {
        self.driver.as_ref()
    }

    pub(crate) fn driver_mut(&mut self) -> &mut dyn FileDriver {
        self.driver.as_mut()
    }

    /// Converts a file-relative address into the backend's absolute space
    pub fn to_absolute(&self, addr: Address) -> Result<Address> {
        match addr.checked_add(self.base_addr) {
            Some(abs) if addr_defined(abs) => Ok(abs),
            _ => Err(VfdError::InvalidAddress {
                addr,
                max: self.max_addr,
            }),
        }
    }

    /// Converts a backend absolute address into a file-relative one.
    ///
    /// # Panics
    ///
    /// Panics if `abs` lies below the base address. Backends never report
    /// such values for a correctly opened handle.
    pub fn to_relative(&self, abs: Address) -> Address {
        assert!(
            abs >= self.base_addr,
            "backend address {:#x} is below base address {:#x}",
            abs,
            self.base_addr
        );
        abs - self.base_addr
    }
}

impl fmt::Debug for DriverHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverHandle")
            .field("driver", &self.driver.name())
            .field("base_addr", &self.base_addr)
            .field("max_addr", &self.max_addr)
            .field("coordination", &self.coordination)
            .finish()
    }
}
