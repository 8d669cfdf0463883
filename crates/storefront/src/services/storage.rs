//! Product image storage.
//!
//! Sellers either upload a photo or get an image from a fixed placeholder
//! catalog. Uploads are written under `<uploads_dir>/<seller uid>/` and
//! served at `/uploads/...`.

use std::path::{Path, PathBuf};

use rand::seq::IndexedRandom;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use marche_core::Uid;

/// Maximum upload size (5 MiB).
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// URL prefix uploads are served under.
pub const UPLOADS_ROUTE: &str = "/uploads";

/// An image URL with the short hint used for its alt text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderImage {
    pub url: &'static str,
    pub hint: &'static str,
}

const PLACEHOLDERS: &[PlaceholderImage] = &[
    PlaceholderImage {
        url: "https://picsum.photos/seed/marche-legumes/600/400",
        hint: "légumes frais",
    },
    PlaceholderImage {
        url: "https://picsum.photos/seed/marche-fruits/600/400",
        hint: "fruits tropicaux",
    },
    PlaceholderImage {
        url: "https://picsum.photos/seed/marche-epices/600/400",
        hint: "épices colorées",
    },
    PlaceholderImage {
        url: "https://picsum.photos/seed/marche-pain/600/400",
        hint: "pain artisanal",
    },
    PlaceholderImage {
        url: "https://picsum.photos/seed/marche-tissu/600/400",
        hint: "tissu wax",
    },
    PlaceholderImage {
        url: "https://picsum.photos/seed/marche-sac/600/400",
        hint: "sac en cuir",
    },
];

const FALLBACK: PlaceholderImage = PlaceholderImage {
    url: "https://picsum.photos/seed/marche/600/400",
    hint: "produit du marché",
};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("file exceeds {max} bytes")]
    TooLarge { max: usize },

    #[error("unsupported image type")]
    UnsupportedType,

    #[error("empty file")]
    Empty,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::TooLarge { .. } => "L'image ne doit pas dépasser 5 Mo.",
            Self::UnsupportedType => "Formats acceptés : JPEG, PNG ou WebP.",
            Self::Empty => "L'image du produit est requise.",
            Self::Io(_) => "Impossible d'enregistrer l'image.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImageFormat {
    Jpeg,
    Png,
    Webp,
}

impl ImageFormat {
    /// Detect the format from the file's magic bytes.
    fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(Self::Png)
        } else if bytes.starts_with(b"RIFF") && bytes.get(8..12) == Some(b"WEBP".as_slice()) {
            Some(Self::Webp)
        } else {
            None
        }
    }

    const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }
}

/// File storage rooted at the uploads directory.
#[derive(Debug, Clone)]
pub struct ImageStorage {
    root: PathBuf,
}

impl ImageStorage {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Pick a random image from the placeholder catalog.
    #[must_use]
    pub fn placeholder() -> PlaceholderImage {
        PLACEHOLDERS
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(FALLBACK)
    }

    /// Store an uploaded image owned by `seller_id` and return its public URL.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the file is empty, too large, not a JPEG,
    /// PNG or WebP image, or cannot be written.
    pub async fn save_upload(&self, seller_id: Uid, bytes: &[u8]) -> Result<String, StorageError> {
        if bytes.is_empty() {
            return Err(StorageError::Empty);
        }
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(StorageError::TooLarge {
                max: MAX_UPLOAD_BYTES,
            });
        }
        let format = ImageFormat::sniff(bytes).ok_or(StorageError::UnsupportedType)?;

        let dir = self.root.join(seller_id.to_string());
        tokio::fs::create_dir_all(&dir).await?;

        let file_name = format!("{}.{}", Uuid::new_v4(), format.extension());
        tokio::fs::write(dir.join(&file_name), bytes).await?;

        info!(%seller_id, file = %file_name, size = bytes.len(), "Image uploaded");
        Ok(format!("{UPLOADS_ROUTE}/{seller_id}/{file_name}"))
    }
}
