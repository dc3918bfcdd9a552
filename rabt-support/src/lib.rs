//! # Rabt Support
//!
//! Shared utilities for the Rabt DI container.
//!
//! This crate provides:
//! - Text rendering for error messages
//! - Common utilities shared between rabt crates

pub mod rendering;
