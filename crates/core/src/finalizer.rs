//! End-of-session summary generation and delivery.

use crate::{
    email::{EmailClient, EmailMessage, SUMMARY_SUBJECT, format_html_body},
    error::AssessmentError,
    llm_client::{CompletionClient, GenerationParams},
    prompts::PromptBuilder,
    turn::ConversationHistory,
};
use std::sync::Arc;
use tracing::{info, instrument};

/// Summarises a finished session and emails the result.
pub struct SummaryFinalizer {
    prompts: Arc<PromptBuilder>,
    completion: Arc<dyn CompletionClient>,
    email: Option<Arc<dyn EmailClient>>,
    params: GenerationParams,
}

impl SummaryFinalizer {
    /// `email` is `None` when no delivery credential is configured; every
    /// finalization then fails with [`AssessmentError::Configuration`].
    pub fn new(
        prompts: Arc<PromptBuilder>,
        completion: Arc<dyn CompletionClient>,
        email: Option<Arc<dyn EmailClient>>,
        params: GenerationParams,
    ) -> Self {
        Self {
            prompts,
            completion,
            email,
            params,
        }
    }

    /// Generates the summary of `history` and sends it to `recipient`.
    ///
    /// Returns the delivery status code reported by the email provider.
    #[instrument(name = "finalize", skip_all, fields(history_len = history.len()))]
    pub async fn finalize(
        &self,
        history: &ConversationHistory,
        recipient: &str,
    ) -> Result<u16, AssessmentError> {
        let email = self.email.as_ref().ok_or_else(|| {
            AssessmentError::Configuration("SENDGRID_API_KEY not configured".to_string())
        })?;

        let messages = self.prompts.build_summary_messages(history);
        let summary = self.completion.complete(messages, self.params).await?;

        let status_code = email
            .send(EmailMessage {
                to: recipient.to_string(),
                subject: SUMMARY_SUBJECT.to_string(),
                html_body: format_html_body(&summary),
            })
            .await?;

        info!(status_code, "Session summary sent");
        Ok(status_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        email::MockEmailClient, llm_client::MockCompletionClient, turn::ConversationTurn,
    };
    use mockall::predicate::eq;

    fn history() -> ConversationHistory {
        ConversationHistory::from(vec![
            ConversationTurn::user("Bonjour"),
            ConversationTurn::assistant("Parlez-moi de Figma."),
        ])
    }

    #[tokio::test]
    async fn test_finalize_summarises_then_sends() {
        let prompts = Arc::new(PromptBuilder::default());
        let expected_messages = prompts.build_summary_messages(&history());

        let mut completion = MockCompletionClient::new();
        completion
            .expect_complete()
            .withf(move |messages, _| *messages == expected_messages)
            .times(1)
            .returning(|_, _| Ok("Bon niveau.\n1. Figma".to_string()));

        let mut email = MockEmailClient::new();
        email
            .expect_send()
            .with(eq(EmailMessage {
                to: "a@b.com".to_string(),
                subject: SUMMARY_SUBJECT.to_string(),
                html_body: "Bon niveau.<br>1. Figma".to_string(),
            }))
            .times(1)
            .returning(|_| Ok(202));

        let finalizer = SummaryFinalizer::new(
            prompts,
            Arc::new(completion),
            Some(Arc::new(email)),
            GenerationParams::default(),
        );

        assert_eq!(finalizer.finalize(&history(), "a@b.com").await, Ok(202));
    }

    #[tokio::test]
    async fn test_missing_email_client_fails_before_any_call() {
        let mut completion = MockCompletionClient::new();
        completion.expect_complete().never();

        let finalizer = SummaryFinalizer::new(
            Arc::new(PromptBuilder::default()),
            Arc::new(completion),
            None,
            GenerationParams::default(),
        );

        let err = finalizer.finalize(&history(), "a@b.com").await.unwrap_err();
        assert!(matches!(err, AssessmentError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_summary_failure_skips_the_send() {
        let mut completion = MockCompletionClient::new();
        completion
            .expect_complete()
            .returning(|_, _| Err(AssessmentError::UpstreamCompletion("timeout".into())));
        let mut email = MockEmailClient::new();
        email.expect_send().never();

        let finalizer = SummaryFinalizer::new(
            Arc::new(PromptBuilder::default()),
            Arc::new(completion),
            Some(Arc::new(email)),
            GenerationParams::default(),
        );

        let err = finalizer.finalize(&history(), "a@b.com").await.unwrap_err();
        assert_eq!(err, AssessmentError::UpstreamCompletion("timeout".into()));
    }

    #[tokio::test]
    async fn test_delivery_failure_is_an_email_error() {
        let mut completion = MockCompletionClient::new();
        completion
            .expect_complete()
            .returning(|_, _| Ok("Résumé".to_string()));
        let mut email = MockEmailClient::new();
        email
            .expect_send()
            .returning(|_| Err(AssessmentError::UpstreamEmail("401 Unauthorized".into())));

        let finalizer = SummaryFinalizer::new(
            Arc::new(PromptBuilder::default()),
            Arc::new(completion),
            Some(Arc::new(email)),
            GenerationParams::default(),
        );

        let err = finalizer.finalize(&history(), "a@b.com").await.unwrap_err();
        assert!(matches!(err, AssessmentError::UpstreamEmail(_)));
    }
}
