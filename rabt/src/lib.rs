//! # Rabt — tag-driven dependency injection for Rust
//!
//! A runtime DI container: register shared singleton instances, declare
//! injection points on your types, and let the container wire the whole
//! graph in one recursive, cycle-safe pass.

pub use rabt_container::*;
pub use rabt_container::injectable;
pub use rabt_support::*;
