//! Core types for Marché.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod ai;
pub mod category;
pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use ai::{AdPlatform, Sentiment};
pub use category::{CategoryError, ProductCategory};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{MAX_PRICE, Price, PriceError, format_amount};
pub use status::*;
