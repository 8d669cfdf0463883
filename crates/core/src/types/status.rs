//! Status enums for orders and notifications.

use serde::{Deserialize, Serialize};

/// Order status.
///
/// Orders are created `Pending` by checkout; nothing in the marketplace moves
/// them further yet, the other states exist for seeded and imported data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "marche.order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
}

impl OrderStatus {
    /// French label shown to buyers.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "En attente",
            Self::Processing => "En traitement",
            Self::Shipped => "Expédiée",
            Self::Delivered => "Livrée",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "marche.notification_kind", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Order,
    Shipping,
    Promo,
    System,
}

impl NotificationKind {
    /// Icon name used by the notification list.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Order => "shopping-bag",
            Self::Shipping => "truck",
            Self::Promo => "tag",
            Self::System => "bell",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Order => write!(f, "order"),
            Self::Shipping => write!(f, "shipping"),
            Self::Promo => write!(f, "promo"),
            Self::System => write!(f, "system"),
        }
    }
}

impl std::str::FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "order" => Ok(Self::Order),
            "shipping" => Ok(Self::Shipping),
            "promo" => Ok(Self::Promo),
            "system" => Ok(Self::System),
            _ => Err(format!("invalid notification kind: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_labels() {
        assert_eq!(OrderStatus::default().label(), "En attente");
        assert_eq!(OrderStatus::Shipped.to_string(), "Expédiée");
    }

    #[test]
    fn test_notification_kind_from_str() {
        assert_eq!("promo".parse::<NotificationKind>().unwrap(), NotificationKind::Promo);
        assert!("email".parse::<NotificationKind>().is_err());
    }
}
