//! User notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use marche_core::{NotificationId, NotificationKind, Uid};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: Uid,
    pub title: String,
    pub description: String,
    pub kind: NotificationKind,
    pub is_read: bool,
    /// Page the notification points to, if any.
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Unread notification created now.
    #[must_use]
    pub fn new(
        user_id: Uid,
        kind: NotificationKind,
        title: impl Into<String>,
        description: impl Into<String>,
        link: Option<String>,
    ) -> Self {
        Self {
            id: NotificationId::generate(),
            user_id,
            title: title.into(),
            description: description.into(),
            kind,
            is_read: false,
            link,
            created_at: Utc::now(),
        }
    }
}
