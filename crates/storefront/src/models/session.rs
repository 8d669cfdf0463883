//! Session-related types.
//!
//! Types stored in the server-side session for identity and cart state.

use serde::{Deserialize, Serialize};

use marche_core::access::Viewer;
use marche_core::{Email, Uid};

/// Session-stored identity.
///
/// Every visitor gets one: an anonymous identity is minted on the first
/// request and replaced by an account identity on login or signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub uid: Uid,
    pub email: Option<Email>,
    pub display_name: Option<String>,
    pub is_anonymous: bool,
}

impl CurrentUser {
    /// A fresh anonymous identity.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            uid: Uid::generate(),
            email: None,
            display_name: None,
            is_anonymous: true,
        }
    }

    #[must_use]
    pub const fn viewer(&self) -> Viewer {
        Viewer {
            uid: self.uid,
            is_anonymous: self.is_anonymous,
        }
    }

    /// Name shown in the header and next to chat messages.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if let Some(name) = self.display_name.as_deref().filter(|n| !n.is_empty()) {
            return name;
        }
        match &self.email {
            Some(email) => email.local_part(),
            None => "Invité",
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for the current identity.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the shopping cart.
    pub const CART: &str = "cart";
}
