//! Action request shapes and their validation.
//!
//! Requests arrive as loosely typed JSON; `validate` turns them into the
//! typed values the store accepts or collects one French message per
//! invalid field.

use serde::{Deserialize, Serialize};

use marche_core::{Email, Price, PriceError, ProductCategory};

use crate::models::{Address, ProductFields, ProfileFields};
use crate::services::ai::AdPlatformInput;
use crate::services::storage::{PlaceholderImage, UPLOADS_ROUTE};

const MIN_PRODUCT_NAME: usize = 3;
const MIN_DESCRIPTION: usize = 10;
const MIN_PROFILE_NAME: usize = 2;
const MIN_AD_DETAILS: usize = 10;

/// Maximum chat message length, in characters.
pub const MAX_CHAT_MESSAGE: usize = 500;

/// A message attached to one request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Collected field errors; never empty when returned as an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    #[must_use]
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// Message for the envelope's `error` key: the first field message.
    #[must_use]
    pub fn summary(&self) -> String {
        self.0
            .first()
            .map_or_else(|| "Données invalides.".to_string(), |e| e.message.clone())
    }

    fn into_result<T>(self, value: Option<T>) -> Result<T, Self> {
        match value {
            Some(value) if self.0.is_empty() => Ok(value),
            _ => Err(self),
        }
    }
}

/// A price as posted: a JSON number or a string (form fields).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawPrice {
    Number(serde_json::Number),
    Text(String),
}

impl Default for RawPrice {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl RawPrice {
    fn parse(&self) -> Result<Price, PriceError> {
        match self {
            Self::Number(n) => Price::parse(&n.to_string()),
            Self::Text(s) => Price::parse(s),
        }
    }
}

const fn price_message(error: &PriceError) -> &'static str {
    match error {
        PriceError::NotANumber | PriceError::NotPositive => "Le prix doit être un nombre positif.",
        PriceError::TooPrecise => "Le prix ne peut pas avoir plus de deux décimales.",
        PriceError::TooLarge => "Le prix ne peut pas dépasser 9 999 999 999,99.",
    }
}

/// Product form, for both creation and edits.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: RawPrice,
    pub category: String,
    pub image_url: Option<String>,
    pub image_hint: Option<String>,
}

/// An image chosen by the seller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageChoice {
    pub url: String,
    pub hint: String,
}

impl From<PlaceholderImage> for ImageChoice {
    fn from(placeholder: PlaceholderImage) -> Self {
        Self {
            url: placeholder.url.to_string(),
            hint: placeholder.hint.to_string(),
        }
    }
}

/// Validated product form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidProduct {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category: ProductCategory,
    /// `None` keeps the current image (edit) or picks a placeholder (creation).
    pub image: Option<ImageChoice>,
}

impl ValidProduct {
    /// Store fields, using `fallback` when no image was chosen.
    #[must_use]
    pub fn into_fields(self, fallback: impl FnOnce() -> ImageChoice) -> ProductFields {
        let image = self.image.unwrap_or_else(fallback);
        ProductFields {
            name: self.name,
            description: self.description,
            price: self.price,
            category: self.category,
            image_url: image.url,
            image_hint: image.hint,
        }
    }
}

impl ProductForm {
    /// # Errors
    ///
    /// Returns every invalid field with its message.
    pub fn validate(&self) -> Result<ValidProduct, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = self.name.trim();
        if name.chars().count() < MIN_PRODUCT_NAME {
            errors.add("name", "Le nom doit contenir au moins 3 caractères.");
        }

        let description = self.description.trim();
        if description.chars().count() < MIN_DESCRIPTION {
            errors.add(
                "description",
                "La description doit contenir au moins 10 caractères.",
            );
        }

        let price = self
            .price
            .parse()
            .inspect_err(|e| errors.add("price", price_message(e)))
            .ok();

        let category = match self.category.trim() {
            "" => {
                errors.add("category", "La catégorie est requise.");
                None
            }
            label => {
                let parsed = ProductCategory::from_label(label).ok();
                if parsed.is_none() {
                    errors.add("category", "Catégorie inconnue.");
                }
                parsed
            }
        };

        let image = match self.image_url.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(url) if is_acceptable_image_url(url) => Some(ImageChoice {
                url: url.to_string(),
                hint: self
                    .image_hint
                    .as_deref()
                    .map(str::trim)
                    .filter(|h| !h.is_empty())
                    .unwrap_or(name)
                    .to_string(),
            }),
            Some(_) => {
                errors.add("image_url", "L'URL de l'image est invalide.");
                None
            }
        };

        let valid = match (price, category) {
            (Some(price), Some(category)) => Some(ValidProduct {
                name: name.to_string(),
                description: description.to_string(),
                price,
                category,
                image,
            }),
            _ => None,
        };
        errors.into_result(valid)
    }
}

/// Uploaded files or absolute http(s) URLs.
fn is_acceptable_image_url(url: &str) -> bool {
    if let Some(path) = url.strip_prefix(UPLOADS_ROUTE) {
        return path.starts_with('/') && !path.contains("..");
    }
    url::Url::parse(url).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

/// Profile edit form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

impl ProfileForm {
    /// # Errors
    ///
    /// Returns every invalid field with its message.
    pub fn validate(&self) -> Result<ProfileFields, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = self.name.trim();
        if name.chars().count() < MIN_PROFILE_NAME {
            errors.add("name", "Le nom doit contenir au moins 2 caractères.");
        }

        let email = Email::parse(&self.email).ok();
        if email.is_none() {
            errors.add("email", "Adresse e-mail invalide.");
        }

        let fields = email.map(|email| ProfileFields {
            name: name.to_string(),
            email,
            phone: self.phone.trim().to_string(),
            address: Address {
                street: self.street.trim().to_string(),
                city: self.city.trim().to_string(),
                state: self.state.trim().to_string(),
                zip: self.zip.trim().to_string(),
                country: self.country.trim().to_string(),
            },
        });
        errors.into_result(fields)
    }
}

/// Chat message form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChatForm {
    pub text: String,
}

impl ChatForm {
    /// Trimmed text of 1 to 500 characters.
    ///
    /// # Errors
    ///
    /// Returns a `text` field error otherwise.
    pub fn validate(&self) -> Result<String, ValidationErrors> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(ValidationErrors::single(
                "text",
                "Le message ne peut pas être vide.",
            ));
        }
        if text.chars().count() > MAX_CHAT_MESSAGE {
            return Err(ValidationErrors::single(
                "text",
                "Le message ne doit pas dépasser 500 caractères.",
            ));
        }
        Ok(text.to_string())
    }
}

/// Ad optimizer form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdOptimizerForm {
    pub customer_preferences: String,
    pub sales_data: String,
}

impl AdOptimizerForm {
    /// # Errors
    ///
    /// Returns every field shorter than 10 characters.
    pub fn validate(&self) -> Result<AdPlatformInput, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let customer_preferences = self.customer_preferences.trim();
        let sales_data = self.sales_data.trim();

        if customer_preferences.chars().count() < MIN_AD_DETAILS {
            errors.add(
                "customerPreferences",
                "Veuillez fournir plus de détails sur les préférences des clients.",
            );
        }
        if sales_data.chars().count() < MIN_AD_DETAILS {
            errors.add(
                "salesData",
                "Veuillez fournir plus de détails sur les données de vente.",
            );
        }

        errors.into_result(Some(AdPlatformInput {
            customer_preferences: customer_preferences.to_string(),
            sales_data: sales_data.to_string(),
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn product_json(price: serde_json::Value) -> ProductForm {
        serde_json::from_value(serde_json::json!({
            "name": "Tomates fraîches",
            "description": "Tomates cultivées sans pesticides",
            "price": price,
            "category": "Légumes"
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_product() {
        let valid = product_json(serde_json::json!(2.5)).validate().unwrap();
        assert_eq!(valid.price.amount(), Decimal::new(25, 1));
        assert_eq!(valid.category, ProductCategory::Vegetables);
        assert!(valid.image.is_none());
    }

    #[test]
    fn test_price_as_string_with_comma() {
        let valid = product_json(serde_json::json!("2,50")).validate().unwrap();
        assert_eq!(valid.price.amount(), Decimal::new(250, 2));
    }

    #[test]
    fn test_zero_price_rejected() {
        let errors = product_json(serde_json::json!(0)).validate().unwrap_err();
        assert!(errors.has("price"));
        assert_eq!(errors.summary(), "Le prix doit être un nombre positif.");
    }

    #[test]
    fn test_price_precision_and_bound() {
        let errors = product_json(serde_json::json!("0.001")).validate().unwrap_err();
        assert_eq!(
            errors.summary(),
            "Le prix ne peut pas avoir plus de deux décimales."
        );

        let errors = product_json(serde_json::json!("1000000000000000000000000000"))
            .validate()
            .unwrap_err();
        assert!(errors.has("price"));
        assert_eq!(errors.fields().len(), 1);

        let valid = product_json(serde_json::json!("9999999999.99")).validate().unwrap();
        assert_eq!(valid.price.amount(), marche_core::MAX_PRICE);
    }

    #[test]
    fn test_collects_every_field() {
        let errors = ProductForm {
            name: "ab".to_string(),
            description: "court".to_string(),
            price: RawPrice::Text("abc".to_string()),
            category: "Bijoux".to_string(),
            image_url: Some("javascript:alert(1)".to_string()),
            image_hint: None,
        }
        .validate()
        .unwrap_err();
        for field in ["name", "description", "price", "category", "image_url"] {
            assert!(errors.has(field), "missing {field}");
        }
    }

    #[test]
    fn test_missing_category() {
        let mut form = product_json(serde_json::json!(1));
        form.category = String::new();
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.fields()[0].message, "La catégorie est requise.");
    }

    #[test]
    fn test_image_hint_defaults_to_name() {
        let mut form = product_json(serde_json::json!(1));
        form.image_url = Some("/uploads/abc/photo.png".to_string());
        let image = form.validate().unwrap().image.unwrap();
        assert_eq!(image.hint, "Tomates fraîches");
    }

    #[test]
    fn test_upload_path_traversal_rejected() {
        assert!(!is_acceptable_image_url("/uploads/../secret"));
        assert!(is_acceptable_image_url("https://picsum.photos/seed/a/600/400"));
        assert!(!is_acceptable_image_url("ftp://example.org/a.png"));
    }

    #[test]
    fn test_profile_validation() {
        let form = ProfileForm {
            name: "A".to_string(),
            email: "pas-un-email".to_string(),
            ..ProfileForm::default()
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.has("name"));
        assert!(errors.has("email"));

        let form = ProfileForm {
            name: "Aminata".to_string(),
            email: "aminata@marche.sn".to_string(),
            city: " Dakar ".to_string(),
            ..ProfileForm::default()
        };
        assert_eq!(form.validate().unwrap().address.city, "Dakar");
    }

    #[test]
    fn test_chat_message_bounds() {
        assert!(ChatForm { text: "   ".to_string() }.validate().is_err());
        assert!(ChatForm { text: "x".repeat(501) }.validate().is_err());
        assert_eq!(
            ChatForm { text: " Bonjour ".to_string() }.validate().unwrap(),
            "Bonjour"
        );
    }

    #[test]
    fn test_ad_optimizer_requires_details() {
        let errors = AdOptimizerForm::default().validate().unwrap_err();
        assert_eq!(errors.fields().len(), 2);
    }
}
