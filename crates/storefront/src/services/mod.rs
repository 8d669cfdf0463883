//! Business logic services for the marketplace.
//!
//! # Services
//!
//! - `auth` - Password accounts and signed ID tokens
//! - `actions` - Validated, authorized mutations (server actions)
//! - `ai` - Generative-AI prompt flows
//! - `cache` - Read-through cache of catalog views
//! - `live` - Live-session broadcast hub
//! - `storage` - Product image storage

pub mod actions;
pub mod ai;
pub mod auth;
pub mod cache;
pub mod live;
pub mod storage;
