use serde::{Deserialize, Serialize};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message in a conversation, tagged with its role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// The ordered turns of a session.
///
/// The caller owns the history: it is sent in with every request and handed
/// back, extended, in the response. Entries can only be appended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationHistory(Vec<ConversationTurn>);

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: ConversationTurn) {
        self.0.push(turn);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConversationTurn> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[ConversationTurn] {
        &self.0
    }
}

impl From<Vec<ConversationTurn>> for ConversationHistory {
    fn from(turns: Vec<ConversationTurn>) -> Self {
        Self(turns)
    }
}

impl<'a> IntoIterator for &'a ConversationHistory {
    type Item = &'a ConversationTurn;
    type IntoIter = std::slice::Iter<'a, ConversationTurn>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::System).unwrap(), "\"system\"");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let result: Result<Role, _> = serde_json::from_str("\"tool\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_history_is_a_plain_json_array() {
        let json = r#"[{"role":"user","content":"Bonjour"},{"role":"assistant","content":"Salut !"}]"#;
        let history: ConversationHistory = serde_json::from_str(json).unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history.as_slice()[0], ConversationTurn::user("Bonjour"));
        assert_eq!(history.as_slice()[1], ConversationTurn::assistant("Salut !"));
        assert_eq!(serde_json::to_string(&history).unwrap(), json);
    }

    #[test]
    fn test_push_appends_at_the_end() {
        let mut history = ConversationHistory::from(vec![ConversationTurn::user("a")]);
        history.push(ConversationTurn::assistant("b"));

        let roles: Vec<Role> = history.iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
    }
}
