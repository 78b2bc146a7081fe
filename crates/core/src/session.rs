//! Turn handling for an assessment session.
//!
//! The orchestrator is stateless between calls: the caller sends the history
//! it holds, and receives it back with exactly two turns appended.

use crate::{
    error::AssessmentError,
    finalizer::SummaryFinalizer,
    llm_client::{CompletionClient, GenerationParams},
    prompts::PromptBuilder,
    turn::{ConversationHistory, ConversationTurn},
};
use std::{str::FromStr, sync::Arc};
use tracing::{info, instrument, warn};

/// One incoming turn.
#[derive(Debug, Clone, Default)]
pub struct SessionTurnRequest {
    pub user_message: Option<String>,
    pub email: Option<String>,
    pub history: ConversationHistory,
    pub end: bool,
}

/// What happened to the end-of-session summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalizationOutcome {
    Sent { status_code: u16 },
    Failed { error: AssessmentError },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionTurnResult {
    pub reply: String,
    pub history: ConversationHistory,
    /// `None` when finalization was not requested.
    pub finalization: Option<FinalizationOutcome>,
}

/// How a failed finalization affects the turn it belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FinalizationPolicy {
    /// Return the turn result and record the failure in it.
    #[default]
    Report,
    /// Fail the whole request.
    Propagate,
}

impl FromStr for FinalizationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "report" => Ok(Self::Report),
            "propagate" => Ok(Self::Propagate),
            other => Err(format!("'{}' is not 'report' or 'propagate'", other)),
        }
    }
}

pub struct SessionOrchestrator {
    prompts: Arc<PromptBuilder>,
    completion: Arc<dyn CompletionClient>,
    finalizer: SummaryFinalizer,
    params: GenerationParams,
    policy: FinalizationPolicy,
}

impl SessionOrchestrator {
    pub fn new(
        prompts: Arc<PromptBuilder>,
        completion: Arc<dyn CompletionClient>,
        finalizer: SummaryFinalizer,
        params: GenerationParams,
        policy: FinalizationPolicy,
    ) -> Self {
        Self {
            prompts,
            completion,
            finalizer,
            params,
            policy,
        }
    }

    /// Produces the next assistant turn and, when the session ends, the summary.
    #[instrument(name = "turn", skip_all, fields(history_len = request.history.len(), end = request.end))]
    pub async fn handle_turn(
        &self,
        request: SessionTurnRequest,
    ) -> Result<SessionTurnResult, AssessmentError> {
        let SessionTurnRequest {
            user_message,
            email,
            mut history,
            end,
        } = request;

        let user_message = user_message
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| AssessmentError::Validation("message is required".to_string()))?;

        let messages = self.prompts.build_evaluation_messages(&history, &user_message);
        let reply = self.completion.complete(messages, self.params).await?;

        history.push(ConversationTurn::user(user_message));
        history.push(ConversationTurn::assistant(reply.clone()));
        info!(history_len = history.len(), "Turn handled");

        let recipient = email.filter(|e| !e.trim().is_empty());
        let finalization = match (end, recipient) {
            (true, Some(recipient)) => Some(self.finalize(&history, &recipient).await?),
            _ => None,
        };

        Ok(SessionTurnResult {
            reply,
            history,
            finalization,
        })
    }

    async fn finalize(
        &self,
        history: &ConversationHistory,
        recipient: &str,
    ) -> Result<FinalizationOutcome, AssessmentError> {
        match self.finalizer.finalize(history, recipient).await {
            Ok(status_code) => Ok(FinalizationOutcome::Sent { status_code }),
            Err(error) if self.policy == FinalizationPolicy::Report => {
                warn!(error = %error, "Finalization failed; returning the turn anyway");
                Ok(FinalizationOutcome::Failed { error })
            }
            Err(error) => Err(error),
        }
    }
}
