// ICL - iSCSI common layer
// Offload driver registry

pub mod commands;
pub mod config;
pub mod engine;
pub mod observability;

use std::sync::Arc;

use tracing::{debug, warn};

use config::IclConfig;
use engine::drivers::soft::{SoftDriver, SOFT_DRIVER_NAME, SOFT_DRIVER_PRIORITY};
use engine::{DriverRegistry, EngineResult};

/// Subsystem state, alive between `load` and `unload`
pub struct IclState {
    pub registry: Arc<DriverRegistry>,
    pub config: IclConfig,
}

impl IclState {
    /// Brings the common layer up with the per-user config
    pub fn load_default() -> EngineResult<Self> {
        Self::load(IclConfig::load())
    }

    /// Brings the common layer up and registers the built-in drivers
    ///
    /// Logging is initialised from `config` first; a subscriber installed
    /// earlier by the host takes precedence.
    pub fn load(config: IclConfig) -> EngineResult<Self> {
        observability::init_tracing(&config);

        let registry = Arc::new(DriverRegistry::new());
        registry.register(
            SOFT_DRIVER_NAME,
            SOFT_DRIVER_PRIORITY,
            Arc::new(SoftDriver::new()),
        )?;

        debug!(
            drivers = %registry.list_names(),
            debug_level = config.debug,
            "icl loaded"
        );
        Ok(Self { registry, config })
    }

    /// Tears the common layer down
    ///
    /// # Panics
    ///
    /// Panics if an external driver is still registered, or if another
    /// handle to the registry is still alive.
    pub fn unload(self) {
        if let Err(e) = self.registry.unregister(SOFT_DRIVER_NAME) {
            warn!(error = %e, "built-in offload missing at unload");
        }

        let registry = Arc::into_inner(self.registry)
            .unwrap_or_else(|| panic!("registry still shared at unload"));
        registry.shutdown();
        debug!("icl unloaded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::engine::error::EngineError;
    use crate::engine::types::new_conn_lock;

    #[test]
    fn load_registers_soft_driver() {
        let state = IclState::load(IclConfig::default()).expect("load");

        assert_eq!(state.registry.list_names(), SOFT_DRIVER_NAME);
        assert_eq!(
            state.registry.limits(None),
            Ok(engine::drivers::soft::SOFT_MAX_DATA_SEGMENT_LENGTH)
        );
        state.unload();
    }

    #[test]
    fn soft_driver_cannot_be_registered_twice() {
        let state = IclState::load(IclConfig::default()).expect("load");

        let err = state
            .registry
            .register("Soft", 5, Arc::new(SoftDriver::new()))
            .expect_err("duplicate");
        assert!(matches!(err, EngineError::AlreadyRegistered { .. }));
        state.unload();
    }

    #[test]
    fn auto_selected_connection_comes_from_soft_driver() {
        let state = IclState::load(IclConfig::default()).expect("load");

        let conn = state
            .registry
            .new_connection(None, "iqn.2012-06.com.example:target0", new_conn_lock())
            .expect("connection");
        assert_eq!(conn.offload(), SOFT_DRIVER_NAME);
        state.unload();
    }

    #[test]
    fn load_keeps_the_config_it_was_given() {
        let config = IclConfig {
            debug: 2,
            log_dir: None,
        };
        let state = IclState::load(config.clone()).expect("load");

        assert_eq!(state.config, config);
        assert_eq!(state.config.filter_directive(), "icl_lib=debug");
        state.unload();
    }

    #[test]
    fn load_default_uses_user_config() {
        let state = IclState::load_default().expect("load");

        assert_eq!(state.config, IclConfig::load());
        assert_eq!(state.registry.list_names(), SOFT_DRIVER_NAME);
        state.unload();
    }

    #[test]
    fn unload_survives_missing_builtin_driver() {
        let state = IclState::load(IclConfig::default()).expect("load");
        state
            .registry
            .unregister(SOFT_DRIVER_NAME)
            .expect("unregister");

        state.unload();
    }

    #[test]
    #[should_panic(expected = "still have drivers: hw")]
    fn unload_with_external_driver_panics() {
        let state = IclState::load(IclConfig::default()).expect("load");
        state
            .registry
            .register("hw", 10, Arc::new(SoftDriver::new()))
            .expect("register");
        state.unload();
    }
}
