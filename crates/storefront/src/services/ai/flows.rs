//! The two prompt flows.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument};

use marche_core::{AdPlatform, Sentiment};

use super::types::Tool;
use super::{AiError, GenerativeModel, StructuredPrompt};

/// Keyword returned for a transcript with nothing to analyze.
pub const EMPTY_TRANSCRIPT_KEYWORD: &str = "Pas assez de messages pour analyser.";

/// Product suggestion meaning "no suggestion".
pub const NO_SUGGESTION: &str = "Aucune";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdPlatformInput {
    pub customer_preferences: String,
    pub sales_data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdPlatformRecommendation {
    pub recommended_platform: AdPlatform,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSummaryInput {
    pub chat_transcription: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSummary {
    pub sentiment: Sentiment,
    pub key_questions: Vec<String>,
    pub popular_keywords: Vec<String>,
    pub product_suggestion: String,
}

impl ChatSummary {
    /// Summary of a chat with no messages.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            sentiment: Sentiment::Neutral,
            key_questions: Vec::new(),
            popular_keywords: vec![EMPTY_TRANSCRIPT_KEYWORD.to_string()],
            product_suggestion: NO_SUGGESTION.to_string(),
        }
    }
}

/// Recommend the advertising platform best suited to a seller's audience.
///
/// # Errors
///
/// Returns `AiError` if the model call fails or its answer does not match
/// the output schema.
#[instrument(skip_all)]
pub async fn recommend_ad_platform(
    model: &dyn GenerativeModel,
    input: &AdPlatformInput,
) -> Result<AdPlatformRecommendation, AiError> {
    let prompt = StructuredPrompt {
        system: "Vous êtes un expert en marketing digital pour les vendeurs d'une place de \
                 marché en ligne. Répondez en français."
            .to_string(),
        user: format!(
            "En vous basant sur les préférences clients suivantes : {}\n\n\
             et les données de ventes : {}\n\n\
             déterminez la plateforme publicitaire optimale (WhatsApp, Instagram ou Facebook) \
             pour une campagne publicitaire ciblée et expliquez votre raisonnement. \
             La recommandation DOIT être l'une des suivantes : WhatsApp, Instagram ou Facebook.",
            input.customer_preferences.trim(),
            input.sales_data.trim()
        ),
        tool: Tool {
            name: "recommander_plateforme".to_string(),
            description: "Enregistre la plateforme publicitaire recommandée.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "recommendedPlatform": {
                        "type": "string",
                        "enum": AdPlatform::ALL.map(AdPlatform::as_str),
                        "description": "La plateforme publicitaire recommandée."
                    },
                    "reasoning": {
                        "type": "string",
                        "description": "Le raisonnement derrière la recommandation, basé sur \
                                        les préférences des clients et les données de vente."
                    }
                },
                "required": ["recommendedPlatform", "reasoning"]
            }),
        },
    };

    let output = model.generate(prompt).await?;
    let recommendation: AdPlatformRecommendation = serde_json::from_value(output)
        .map_err(|e| AiError::Parse(format!("invalid recommendation: {e}")))?;

    info!(platform = %recommendation.recommended_platform, "Ad platform recommended");
    Ok(recommendation)
}

/// Summarize a live chat transcript for the seller.
///
/// A blank transcript returns [`ChatSummary::empty`] without calling the
/// model.
///
/// # Errors
///
/// Returns `AiError` if the model call fails or its answer does not match
/// the output schema.
#[instrument(skip_all, fields(transcript_len = input.chat_transcription.len()))]
pub async fn summarize_live_chat(
    model: &dyn GenerativeModel,
    input: &ChatSummaryInput,
) -> Result<ChatSummary, AiError> {
    if input.chat_transcription.trim().is_empty() {
        return Ok(ChatSummary::empty());
    }

    let prompt = StructuredPrompt {
        system: "Vous êtes un assistant de vente expert pour une session de shopping en direct. \
                 Répondez en français."
            .to_string(),
        user: format!(
            "Analysez la transcription du chat suivante :\n\n{}\n\n\
             Fournissez un résumé concis pour le vendeur :\n\
             1. Déterminez le sentiment général des spectateurs.\n\
             2. Extrayez les questions les plus importantes et récurrentes.\n\
             3. Identifiez les mots-clés ou les sujets les plus discutés.\n\
             4. Suggérez un type de produit à présenter ensuite.",
            input.chat_transcription
        ),
        tool: Tool {
            name: "resumer_chat".to_string(),
            description: "Enregistre l'analyse du chat en direct.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "sentiment": {
                        "type": "string",
                        "enum": Sentiment::ALL.map(Sentiment::label),
                        "description": "Le sentiment général des spectateurs dans le chat."
                    },
                    "keyQuestions": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Les questions les plus fréquemment posées."
                    },
                    "popularKeywords": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Les mots-clés ou sujets les plus populaires."
                    },
                    "productSuggestion": {
                        "type": "string",
                        "description": "Le type de produit à présenter ensuite, ou 'Aucune'."
                    }
                },
                "required": ["sentiment", "keyQuestions", "popularKeywords", "productSuggestion"]
            }),
        },
    };

    let output = model.generate(prompt).await?;
    let summary: ChatSummary = serde_json::from_value(output)
        .map_err(|e| AiError::Parse(format!("invalid chat summary: {e}")))?;

    info!(sentiment = %summary.sentiment, "Live chat summarized");
    Ok(summary)
}
