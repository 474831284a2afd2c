//! Data models

pub mod device;

pub use device::*;
