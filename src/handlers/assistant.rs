//! `ai-assistant`: multi-turn business Q&A.

use serde::{Deserialize, Serialize};

use super::{BufferedTask, ChatTask, require_text};
use crate::error::HandlerError;
use crate::gateway::{ChatMessage, Provider};
use crate::prompts::{ASSISTANT_SYSTEM, PromptLibrary};

#[derive(Debug, Deserialize)]
pub struct AssistantRequest {
    #[serde(default)]
    pub message: Option<String>,
    /// Prior turns, oldest first.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub conversation: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct AssistantResponse {
    pub response: String,
    /// The input conversation extended with this exchange.
    pub conversation: Vec<ChatMessage>,
}

pub struct Assistant;

impl ChatTask for Assistant {
    const NAME: &'static str = "ai-assistant";
    const PROVIDER: Provider = Provider::Gateway;

    type Request = AssistantRequest;

    fn validate(request: &AssistantRequest) -> Result<(), HandlerError> {
        require_text(request.message.as_deref(), "message")
    }

    fn messages(
        request: &AssistantRequest,
        _prompts: &PromptLibrary,
    ) -> Result<Vec<ChatMessage>, HandlerError> {
        let mut messages = Vec::with_capacity(request.conversation.len() + 2);
        messages.push(ChatMessage::system(ASSISTANT_SYSTEM));
        messages.extend(request.conversation.iter().cloned());
        messages.push(ChatMessage::user(request.message.clone().unwrap_or_default()));
        Ok(messages)
    }
}

impl BufferedTask for Assistant {
    type Output = AssistantResponse;

    fn respond(request: AssistantRequest, content: String) -> AssistantResponse {
        let mut conversation = request.conversation;
        conversation.push(ChatMessage::user(request.message.unwrap_or_default()));
        conversation.push(ChatMessage::assistant(content.clone()));
        AssistantResponse {
            response: content,
            conversation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::Role;
    use serde_json::json;

    fn request(value: serde_json::Value) -> AssistantRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn history_sits_between_system_and_new_turn() {
        let prompts = PromptLibrary::new().unwrap();
        let request = request(json!({
            "message": "And in winter?",
            "conversation": [
                {"role": "user", "content": "Best months for a bakery?"},
                {"role": "assistant", "content": "Autumn."}
            ]
        }));

        let messages = Assistant::messages(&request, &prompts).unwrap();
        let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::Assistant, Role::User]
        );
        assert_eq!(messages[3].content, "And in winter?");
    }

    #[test]
    fn response_appends_both_turns() {
        let request = request(json!({ "message": "Hi" }));
        let response = Assistant::respond(request, "Hello!".to_string());

        assert_eq!(response.response, "Hello!");
        assert_eq!(
            response.conversation,
            vec![ChatMessage::user("Hi"), ChatMessage::assistant("Hello!")]
        );
    }

    #[test]
    fn blank_message_is_rejected() {
        let request = request(json!({ "message": "  " }));
        assert!(matches!(
            Assistant::validate(&request),
            Err(HandlerError::Validation(_))
        ));
    }
}
