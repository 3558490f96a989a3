//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the generator core and the outside
//! world. Each port is a trait implemented by an adapter in the
//! infrastructure layer.

mod file_system;

pub use file_system::{FileSystem, FileSystemError};
