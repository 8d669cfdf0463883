//! Marché Core - Shared types and access rules.
//!
//! This crate provides the types used across all Marché components:
//! - `storefront` - The marketplace web application
//! - `cli` - Command-line tools for migrations, seeding and accounts
//!
//! # Architecture
//!
//! The core crate contains only types and pure decision logic - no I/O, no
//! database access, no HTTP clients. Everything here can be tested without a
//! runtime.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, categories and statuses
//! - [`access`] - Role derivation, navigation composition and route guarding

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod access;
pub mod types;

pub use types::*;
