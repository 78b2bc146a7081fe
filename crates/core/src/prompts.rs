//! Persona prompts and message assembly.
//!
//! Every message sequence sent to the completion service starts with exactly one
//! persona turn, followed by the caller's history untouched.

use crate::turn::{ConversationHistory, ConversationTurn};
use std::collections::HashMap;

/// Prompt key overriding the evaluator persona.
pub const EVALUATOR_PROMPT_KEY: &str = "evaluator_persona";
/// Prompt key overriding the summarizer persona.
pub const SUMMARIZER_PROMPT_KEY: &str = "summarizer_persona";

const DEFAULT_EVALUATOR_PERSONA: &str = "Tu es un évaluateur expert en Design (UX/UI, typographie, couleurs, prototypage). \
Pose des questions progressives pour évaluer le niveau de l'apprenant. \
Réponds en français, de façon bienveillante, une seule question à la fois. \
Si l'apprenant répond de façon vague, pose des questions de relance.";

const DEFAULT_SUMMARIZER_PERSONA: &str = "Tu es un tuteur pédagogique en Design. Tu viens de terminer une session \
d'évaluation des connaissances avec l'apprenant. Rédige :\n\
1. Un paragraphe résumant ses points forts et faibles.\n\
2. Une liste concise de 3 recommandations vidéo (titres seulement).";

/// Builds the message sequences for evaluation and summary calls.
///
/// Constructed once at startup and shared; it holds no mutable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptBuilder {
    evaluator: ConversationTurn,
    summarizer: ConversationTurn,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_EVALUATOR_PERSONA, DEFAULT_SUMMARIZER_PERSONA)
    }
}

impl PromptBuilder {
    pub fn new(evaluator: impl Into<String>, summarizer: impl Into<String>) -> Self {
        Self {
            evaluator: ConversationTurn::system(evaluator),
            summarizer: ConversationTurn::system(summarizer),
        }
    }

    /// Builds the personas from a map of prompt templates.
    ///
    /// Missing or blank entries fall back to the built-in personas.
    pub fn from_prompts(prompts: &HashMap<String, String>) -> Self {
        let pick = |key: &str, fallback: &str| {
            prompts
                .get(key)
                .map(|p| p.trim())
                .filter(|p| !p.is_empty())
                .unwrap_or(fallback)
                .to_string()
        };
        Self::new(
            pick(EVALUATOR_PROMPT_KEY, DEFAULT_EVALUATOR_PERSONA),
            pick(SUMMARIZER_PROMPT_KEY, DEFAULT_SUMMARIZER_PERSONA),
        )
    }

    pub fn evaluator_persona(&self) -> &ConversationTurn {
        &self.evaluator
    }

    pub fn summarizer_persona(&self) -> &ConversationTurn {
        &self.summarizer
    }

    /// `[evaluator] ++ history ++ [user(user_message)]`
    pub fn build_evaluation_messages(
        &self,
        history: &ConversationHistory,
        user_message: &str,
    ) -> Vec<ConversationTurn> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(self.evaluator.clone());
        messages.extend(history.iter().cloned());
        messages.push(ConversationTurn::user(user_message));
        messages
    }

    /// `[summarizer] ++ history`, with no synthetic user turn.
    pub fn build_summary_messages(&self, history: &ConversationHistory) -> Vec<ConversationTurn> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(self.summarizer.clone());
        messages.extend(history.iter().cloned());
        messages
    }
}
