//! Driver Registry
//!
//! Catalog of the offload drivers currently available to the common layer.
//! Drivers register themselves when they load and unregister before they
//! unload; connection owners resolve a driver by name, or let the registry
//! pick the highest-priority one, and receive a connection from its factory.
//!
//! Traversal order is newest-first. Name lookup returns the first match in
//! that order, and auto-selection breaks priority ties the same way, so the
//! most recently registered driver wins a tie.

use std::collections::VecDeque;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::engine::error::{EngineError, EngineResult};
use crate::engine::traits::{Connection, OffloadDriver};
use crate::engine::types::{ConnLock, DriverInfo};

/// One registered driver
struct DriverRecord {
    name: String,
    priority: i32,
    driver: Arc<dyn OffloadDriver>,
    registered_at: DateTime<Utc>,
}

/// Registry that holds all available offload drivers
///
/// Lookups, listing and factory dispatch share the lock; register and
/// unregister take it exclusively.
pub struct DriverRegistry {
    drivers: RwLock<VecDeque<DriverRecord>>,
}

/// Finds a driver by case-insensitive name, or the highest-priority one
/// when `name` is absent or empty.
fn find<'a>(drivers: &'a VecDeque<DriverRecord>, name: Option<&str>) -> Option<&'a DriverRecord> {
    match name {
        None | Some("") => drivers.iter().fold(None, |best, record| match best {
            Some(current) if record.priority <= current.priority => Some(current),
            _ => Some(record),
        }),
        Some(name) => drivers
            .iter()
            .find(|record| record.name.eq_ignore_ascii_case(name)),
    }
}

impl DriverRegistry {
    /// Creates a new empty registry
    pub fn new() -> Self {
        Self {
            drivers: RwLock::new(VecDeque::new()),
        }
    }

    // Every mutation is a single push or remove under the write guard, so a
    // poisoned lock never hides a half-updated catalog.
    fn read(&self) -> RwLockReadGuard<'_, VecDeque<DriverRecord>> {
        self.drivers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, VecDeque<DriverRecord>> {
        self.drivers.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a driver under `name`
    ///
    /// Fails with `AlreadyRegistered` if a driver with the same name,
    /// ignoring ASCII case, is present. The registry is left unchanged on
    /// failure.
    pub fn register(
        &self,
        name: &str,
        priority: i32,
        driver: Arc<dyn OffloadDriver>,
    ) -> EngineResult<()> {
        if name.is_empty() {
            warn!("refusing to register offload with empty name");
            return Err(EngineError::invalid_name("name must not be empty"));
        }

        {
            let mut drivers = self.write();
            if find(&drivers, Some(name)).is_some() {
                warn!(offload = %name, "offload \"{}\" already registered", name);
                return Err(EngineError::already_registered(name));
            }

            drivers.push_front(DriverRecord {
                name: name.to_string(),
                priority,
                driver,
                registered_at: Utc::now(),
            });
        }

        debug!(offload = %name, priority, "offload \"{}\" registered", name);
        Ok(())
    }

    /// Removes the driver registered under `name`
    ///
    /// Connections already created by that driver are not affected.
    pub fn unregister(&self, name: &str) -> EngineResult<()> {
        let removed = {
            let mut drivers = self.write();
            let position = drivers
                .iter()
                .position(|record| !name.is_empty() && record.name.eq_ignore_ascii_case(name));

            match position {
                Some(index) => drivers.remove(index),
                None => {
                    warn!(offload = %name, "offload \"{}\" not registered", name);
                    return Err(EngineError::driver_not_found(name));
                }
            }
        };

        // Release the record outside the lock.
        drop(removed);

        debug!(offload = %name, "offload \"{}\" unregistered", name);
        Ok(())
    }

    /// Resolves a driver by name, or by highest priority when `name` is
    /// `None` or empty
    pub fn resolve(&self, name: Option<&str>) -> EngineResult<Arc<dyn OffloadDriver>> {
        let drivers = self.read();
        find(&drivers, name)
            .map(|record| Arc::clone(&record.driver))
            .ok_or_else(|| EngineError::driver_not_found(name.unwrap_or_default()))
    }

    /// Creates a connection through the resolved driver's factory
    ///
    /// The registry lock covers the lookup only. Returns `None` when no
    /// driver matches, or when the driver itself fails to create one.
    pub fn new_connection(
        &self,
        offload: Option<&str>,
        name: &str,
        lock: ConnLock,
    ) -> Option<Box<dyn Connection>> {
        let driver = match self.resolve(offload) {
            Ok(driver) => driver,
            Err(_) => {
                let offload = offload.unwrap_or_default();
                warn!(offload = %offload, "offload \"{}\" not found", offload);
                return None;
            }
        };

        driver.new_conn(name, lock)
    }

    /// Queries the resolved driver's limits
    ///
    /// Returns `DriverNotFound` (ENXIO) without calling any driver when
    /// nothing matches; otherwise forwards the driver's own answer.
    pub fn limits(&self, offload: Option<&str>) -> EngineResult<usize> {
        let driver = self.resolve(offload).inspect_err(|_| {
            let offload = offload.unwrap_or_default();
            warn!(offload = %offload, "offload \"{}\" not found", offload);
        })?;

        driver.limits()
    }

    /// Lists registered driver names, space separated, newest first
    pub fn list_names(&self) -> String {
        let drivers = self.read();
        drivers
            .iter()
            .map(|record| record.name.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Snapshots registered drivers in traversal order
    pub fn drivers(&self) -> Vec<DriverInfo> {
        let drivers = self.read();
        drivers
            .iter()
            .map(|record| DriverInfo {
                name: record.name.clone(),
                priority: record.priority,
                registered_at: record.registered_at,
            })
            .collect()
    }

    /// Returns the number of registered drivers
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true if no drivers are registered
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Tears the registry down
    ///
    /// # Panics
    ///
    /// Panics if any driver is still registered. Drivers must unregister
    /// before they unload.
    pub fn shutdown(self) {
        let drivers = self
            .drivers
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);

        assert!(
            drivers.is_empty(),
            "still have drivers: {}",
            drivers
                .iter()
                .map(|record| record.name.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        );
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::new()
    }
}
