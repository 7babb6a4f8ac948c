//! Chat-completion request entities

use crate::core::model::Model;
use crate::session::params::ModelParameters;
use serde::{Deserialize, Serialize};

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A message in a conversation (Entity)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One streaming chat-completion call (Entity)
///
/// Carries everything the backend needs except transport concerns
/// (authentication, endpoint, metadata headers), which the gateway adapter
/// injects.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    model: Model,
    messages: Vec<Message>,
    parameters: ModelParameters,
}

impl ChatRequest {
    pub fn new(model: Model) -> Self {
        Self {
            model,
            messages: Vec::new(),
            parameters: ModelParameters::default(),
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.messages.push(Message::system(system_prompt));
        self
    }

    /// Append prior conversation turns
    pub fn with_history(mut self, history: &[Message]) -> Self {
        self.messages.extend_from_slice(history);
        self
    }

    pub fn with_user_message(mut self, content: impl Into<String>) -> Self {
        self.messages.push(Message::user(content));
        self
    }

    pub fn with_parameters(mut self, parameters: ModelParameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn parameters(&self) -> &ModelParameters {
        &self.parameters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_message_order() {
        let history = vec![Message::user("hi"), Message::assistant("hello")];
        let request = ChatRequest::new(Model::Gpt4o)
            .with_system_prompt("be brief")
            .with_history(&history)
            .with_user_message("what now?");

        let roles: Vec<Role> = request.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::Assistant, Role::User]
        );
        assert_eq!(request.messages()[3].content, "what now?");
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Message::assistant("x")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"x"}"#);
    }
}
