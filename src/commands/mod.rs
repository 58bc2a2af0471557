//! Management commands
//!
//! Entry points for administrative tooling: driver inspection, limit
//! queries and connection setup on behalf of a connection owner.

pub mod connection;
pub mod drivers;
