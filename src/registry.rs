//! Driver registry
//!
//! Maps driver class names to factories that build a backend for a given
//! [`DriverConfig`]. A registry is an ordinary value created at startup;
//! there is no process-wide state. Registration is idempotent, so setup
//! code may run more than once.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::DriverConfig;
use crate::error::{DriverResult, Result, VfdError};
use crate::handle::DriverHandle;
use crate::traits::FileDriver;

pub type DriverFactory =
    Arc<dyn Fn(&DriverConfig) -> DriverResult<Box<dyn FileDriver>> + Send + Sync>;

#[derive(Default)]
pub struct DriverRegistry {
    factories: RwLock<HashMap<String, DriverFactory>>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` under `name`.
    ///
    /// Returns `false` and keeps the existing factory if `name` is already
    /// registered.
    pub fn register<F>(&self, name: &str, factory: F) -> bool
    where
        F: Fn(&DriverConfig) -> DriverResult<Box<dyn FileDriver>> + Send + Sync + 'static,
    {
        let mut factories = self.factories.write();
        if factories.contains_key(name) {
            debug!(driver = name, "Driver already registered");
            return false;
        }
        factories.insert(name.to_string(), Arc::new(factory));
        debug!(driver = name, "Registered driver");
        true
    }

    pub fn unregister(&self, name: &str) -> bool {
        self.factories.write().remove(name).is_some()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.factories.read().contains_key(name)
    }

    /// Registered driver names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Builds the named backend and binds it to a new [`DriverHandle`]
    pub fn open(&self, name: &str, config: &DriverConfig) -> Result<DriverHandle> {
        // Clone the factory out so the lock is not held while it runs.
        let factory = self
            .factories
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| VfdError::UnknownDriver(name.to_string()))?;

        let driver = factory(config).map_err(|e| {
            warn!(driver = name, error = %e, "Driver factory failed");
            VfdError::dispatch("open", e)
        })?;

        DriverHandle::open(driver, config)
    }
}

impl fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverRegistry")
            .field("drivers", &self.names())
            .finish()
    }
}
