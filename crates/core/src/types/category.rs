//! Closed set of product categories.

use core::fmt;

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown product category: {0}")]
pub struct CategoryError(pub String);

/// Product category.
///
/// Serialized with its French display label, which is what forms submit and
/// what the seed files contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "marche.product_category", rename_all = "snake_case")
)]
pub enum ProductCategory {
    #[serde(rename = "Légumes")]
    Vegetables,
    #[serde(rename = "Fruits")]
    Fruits,
    #[serde(rename = "Viande")]
    Meat,
    #[serde(rename = "Produits laitiers")]
    Dairy,
    #[serde(rename = "Épices")]
    Spices,
    #[serde(rename = "Électronique")]
    Electronics,
    #[serde(rename = "Vêtements")]
    Clothing,
    #[serde(rename = "Boulangerie")]
    Bakery,
    #[serde(rename = "Sacs")]
    Bags,
}

impl ProductCategory {
    /// Every category, in the order forms list them.
    pub const ALL: [Self; 9] = [
        Self::Vegetables,
        Self::Fruits,
        Self::Meat,
        Self::Dairy,
        Self::Spices,
        Self::Electronics,
        Self::Clothing,
        Self::Bakery,
        Self::Bags,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Vegetables => "Légumes",
            Self::Fruits => "Fruits",
            Self::Meat => "Viande",
            Self::Dairy => "Produits laitiers",
            Self::Spices => "Épices",
            Self::Electronics => "Électronique",
            Self::Clothing => "Vêtements",
            Self::Bakery => "Boulangerie",
            Self::Bags => "Sacs",
        }
    }

    /// Look a category up by its label.
    ///
    /// # Errors
    ///
    /// Returns [`CategoryError`] when the label is not one of [`Self::ALL`].
    pub fn from_label(label: &str) -> Result<Self, CategoryError> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label() == label)
            .ok_or_else(|| CategoryError(label.to_owned()))
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for ProductCategory {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_roundtrip() {
        for category in ProductCategory::ALL {
            assert_eq!(ProductCategory::from_label(category.label()).unwrap(), category);
        }
    }

    #[test]
    fn test_unknown_label() {
        assert!(ProductCategory::from_label("Jouets").is_err());
        assert!(ProductCategory::from_label("légumes").is_err());
    }

    #[test]
    fn test_serde_uses_label() {
        let json = serde_json::to_string(&ProductCategory::Dairy).unwrap();
        assert_eq!(json, "\"Produits laitiers\"");
        let parsed: ProductCategory = serde_json::from_str("\"Épices\"").unwrap();
        assert_eq!(parsed, ProductCategory::Spices);
    }
}
