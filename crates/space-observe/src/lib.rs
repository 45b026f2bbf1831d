//! Logging setup shared by the driver binaries.
mod logger;
pub use logger::*;
