//! Seed the catalog from a YAML file.
//!
//! ```yaml
//! seller_email: awa@example.com
//! products:
//!   - name: Mangues Kent
//!     description: Mangues mûres à point, cueillies cette semaine.
//!     price: "4.50"
//!     category: Fruits
//!     image_url: https://picsum.photos/seed/mangue/600/400
//!     image_hint: mango fruit
//! ```
//!
//! The seller account must already exist (see `marche-cli user create`).
//! Products whose name the seller already uses are skipped, so the command
//! can be run again after editing the file.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use marche_core::Email;
use marche_storefront::db::{MarketStore, PgStore, RepositoryError};
use marche_storefront::models::{Product, ProductFields};
use marche_storefront::services::actions::forms::ProductForm;
use marche_storefront::services::storage::ImageStorage;

use super::{CommandError, connect};

/// Contents of a seed file, products as the product form accepts them.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    /// Default owner of the products.
    #[serde(default)]
    pub seller_email: Option<String>,
    pub products: Vec<ProductForm>,
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Connect(#[from] CommandError),

    #[error("Could not read {0}: {1}")]
    Read(String, std::io::Error),

    #[error("Invalid seed file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("No seller given: pass --seller-email or set seller_email in the file")]
    MissingSeller,

    #[error("Invalid seller email: {0}")]
    InvalidEmail(String),

    #[error("No account with email {0}, create it with `marche-cli user create`")]
    UnknownSeller(String),

    #[error("Invalid product #{0}: {1}")]
    InvalidProduct(usize, String),

    #[error("Store error: {0}")]
    Store(#[from] RepositoryError),
}

/// Parse a seed file and validate every product with the product form
/// rules. Products without an image get a placeholder.
pub fn parse(content: &str) -> Result<(Option<String>, Vec<ProductFields>), SeedError> {
    let seed: SeedFile = serde_yaml::from_str(content)?;
    let products = seed
        .products
        .iter()
        .enumerate()
        .map(|(index, form)| {
            form.validate()
                .map(|valid| valid.into_fields(|| ImageStorage::placeholder().into()))
                .map_err(|errors| SeedError::InvalidProduct(index + 1, errors.summary()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok((seed.seller_email, products))
}

/// Insert the products of `file_path` for the seller.
pub async fn products(file_path: &str, seller_email: Option<&str>) -> Result<(), SeedError> {
    let path = Path::new(file_path);
    info!(path = %file_path, "Loading seed file");

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SeedError::Read(file_path.to_owned(), e))?;
    let (file_seller, products) = parse(&content)?;
    info!(products = products.len(), "Parsed seed file");

    let seller_email = seller_email
        .map(ToOwned::to_owned)
        .or(file_seller)
        .ok_or(SeedError::MissingSeller)?;
    let email =
        Email::parse(&seller_email).map_err(|_| SeedError::InvalidEmail(seller_email.clone()))?;

    let store = PgStore::new(connect().await?);
    let seller = store
        .account_by_email(&email)
        .await?
        .ok_or(SeedError::UnknownSeller(seller_email))?;

    let existing: HashSet<String> = store
        .products_by_seller(seller.uid)
        .await?
        .into_iter()
        .map(|p| p.name)
        .collect();

    let mut inserted = 0_usize;
    let mut skipped = 0_usize;
    for fields in products {
        if existing.contains(&fields.name) {
            warn!(name = %fields.name, "Product already exists, skipping");
            skipped += 1;
            continue;
        }
        store.insert_product(&Product::new(seller.uid, fields)).await?;
        inserted += 1;
    }

    info!("Seeding complete!");
    info!("  Products inserted: {inserted}");
    info!("  Products skipped (already exist): {skipped}");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use marche_core::ProductCategory;

    use super::*;

    const SEED: &str = r#"
seller_email: awa@example.com
products:
  - name: Mangues Kent
    description: Mangues mûres à point, cueillies cette semaine.
    price: "4.50"
    category: Fruits
    image_url: https://picsum.photos/seed/mangue/600/400
    image_hint: mango fruit
"#;

    #[test]
    fn test_parse_seed_file() {
        let (seller, products) = parse(SEED).unwrap();
        assert_eq!(seller.as_deref(), Some("awa@example.com"));
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].category, ProductCategory::Fruits);
        assert_eq!(products[0].price.display(), "$4.50");
        assert_eq!(products[0].image_hint, "mango fruit");
    }

    #[test]
    fn test_missing_image_gets_placeholder() {
        let without_image = SEED
            .replace("    image_url: https://picsum.photos/seed/mangue/600/400\n", "")
            .replace("    image_hint: mango fruit\n", "");
        let (_, products) = parse(&without_image).unwrap();
        assert!(products[0].image_url.starts_with("https://picsum.photos/"));
    }

    #[test]
    fn test_unknown_category_rejected() {
        let bad = SEED.replace("category: Fruits", "category: Jouets");
        assert!(matches!(parse(&bad), Err(SeedError::InvalidProduct(1, _))));
    }

    #[test]
    fn test_short_description_rejected() {
        let bad = SEED.replace(
            "description: Mangues mûres à point, cueillies cette semaine.",
            "description: Mangues",
        );
        assert!(matches!(parse(&bad), Err(SeedError::InvalidProduct(1, _))));
    }
}
