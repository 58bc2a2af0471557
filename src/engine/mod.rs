// Offload Engine Module
// Driver registry and the SPI offload backends implement

pub mod drivers;
pub mod error;
pub mod registry;
pub mod traits;
pub mod types;

pub use error::{EngineError, EngineResult};
pub use registry::DriverRegistry;
pub use traits::{Connection, OffloadDriver};
pub use types::*;
