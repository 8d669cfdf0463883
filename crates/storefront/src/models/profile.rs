//! User profiles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use marche_core::{Email, Uid};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

/// Public profile of a real account.
///
/// Updates merge: editing contact fields keeps `is_pro`, upgrading keeps the
/// contact fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub uid: Uid,
    pub name: String,
    pub email: Option<Email>,
    pub phone: String,
    pub address: Address,
    pub is_pro: bool,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Empty profile, as created when an upgrade precedes any edit.
    #[must_use]
    pub fn empty(uid: Uid) -> Self {
        Self {
            uid,
            name: String::new(),
            email: None,
            phone: String::new(),
            address: Address::default(),
            is_pro: false,
            updated_at: Utc::now(),
        }
    }

    /// Merge edited contact fields into this profile.
    pub fn merge(&mut self, fields: ProfileFields) {
        self.name = fields.name;
        self.email = Some(fields.email);
        self.phone = fields.phone;
        self.address = fields.address;
        self.updated_at = Utc::now();
    }
}

/// Validated profile edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileFields {
    pub name: String,
    pub email: Email,
    pub phone: String,
    pub address: Address,
}
