//! # Built-in Providers
//!
//! - [`StaticProvider`]: in-memory registry, typically placed first to
//!   override or supply built-in entries
//! - [`DirectoryProvider`]: one search path on disk; the config layer builds
//!   one per configured search path

pub mod directory;
pub mod static_mapping;

pub use directory::DirectoryProvider;
pub use static_mapping::StaticProvider;
