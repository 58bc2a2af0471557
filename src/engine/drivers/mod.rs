//! Built-in offload drivers

pub mod soft;

pub use soft::SoftDriver;
