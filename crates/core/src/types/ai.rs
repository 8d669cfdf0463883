//! Closed output vocabularies of the two AI flows.

use serde::{Deserialize, Serialize};

/// Advertising platform the ad optimizer may recommend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdPlatform {
    WhatsApp,
    Instagram,
    Facebook,
}

impl AdPlatform {
    pub const ALL: [Self; 3] = [Self::WhatsApp, Self::Instagram, Self::Facebook];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WhatsApp => "WhatsApp",
            Self::Instagram => "Instagram",
            Self::Facebook => "Facebook",
        }
    }
}

impl std::fmt::Display for AdPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall mood of a live chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Sentiment {
    #[serde(rename = "Positif")]
    Positive,
    #[default]
    #[serde(rename = "Neutre")]
    Neutral,
    #[serde(rename = "Négatif")]
    Negative,
}

impl Sentiment {
    pub const ALL: [Self; 3] = [Self::Positive, Self::Neutral, Self::Negative];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Positive => "Positif",
            Self::Neutral => "Neutre",
            Self::Negative => "Négatif",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_wire_names() {
        assert_eq!(serde_json::to_string(&Sentiment::Negative).unwrap(), "\"Négatif\"");
        let parsed: Sentiment = serde_json::from_str("\"Positif\"").unwrap();
        assert_eq!(parsed, Sentiment::Positive);
    }

    #[test]
    fn test_platform_rejects_unknown() {
        assert!(serde_json::from_str::<AdPlatform>("\"TikTok\"").is_err());
        assert_eq!(
            serde_json::from_str::<AdPlatform>("\"WhatsApp\"").unwrap(),
            AdPlatform::WhatsApp
        );
    }
}
