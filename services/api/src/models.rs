//! API Models
//!
//! Request and response bodies for the HTTP layer, documented for OpenAPI with
//! `utoipa`. Conversation turns are the core types serialized as-is.

use assessor_core::{
    catalog::Recommendation,
    session::{FinalizationOutcome, SessionTurnRequest, SessionTurnResult},
    turn::ConversationHistory,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema, Debug)]
pub struct MessagePayload {
    /// The learner's answer. Required; kept optional here so that a missing
    /// field is reported as a validation error.
    #[schema(example = "Bonjour")]
    #[serde(default)]
    pub message: Option<String>,
    /// Where to send the summary when `end` is true.
    #[schema(example = "learner@example.com")]
    #[serde(default)]
    pub email: Option<String>,
    #[schema(value_type = Vec<Object>)]
    #[serde(default)]
    pub history: ConversationHistory,
    #[serde(default)]
    pub end: bool,
}

impl From<MessagePayload> for SessionTurnRequest {
    fn from(payload: MessagePayload) -> Self {
        Self {
            user_message: payload.message,
            email: payload.email,
            history: payload.history,
            end: payload.end,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FinalizationReport {
    Sent { status_code: u16 },
    Failed { error: String },
}

impl From<FinalizationOutcome> for FinalizationReport {
    fn from(outcome: FinalizationOutcome) -> Self {
        match outcome {
            FinalizationOutcome::Sent { status_code } => Self::Sent { status_code },
            FinalizationOutcome::Failed { error } => Self::Failed {
                error: error.to_string(),
            },
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct MessageResponse {
    pub reply: String,
    #[schema(value_type = Vec<Object>)]
    pub history: ConversationHistory,
    /// Present only when the session ended with a recipient.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finalization: Option<FinalizationReport>,
}

impl From<SessionTurnResult> for MessageResponse {
    fn from(result: SessionTurnResult) -> Self {
        Self {
            reply: result.reply,
            history: result.history,
            finalization: result.finalization.map(Into::into),
        }
    }
}

#[derive(Serialize, ToSchema, Debug)]
pub struct RecommendationEntry {
    pub title: String,
    pub keywords: Vec<String>,
    pub url: String,
}

impl From<&Recommendation> for RecommendationEntry {
    fn from(r: &Recommendation) -> Self {
        Self {
            title: r.title.to_string(),
            keywords: r.keywords.iter().map(|k| k.to_string()).collect(),
            url: r.url.to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct RecommendationQuery {
    pub keyword: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}
