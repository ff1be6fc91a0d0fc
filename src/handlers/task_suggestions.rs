//! `ai-task-suggestions`: what the owner should work on next.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tera::Context;

use super::{BufferedTask, ChatTask};
use crate::error::HandlerError;
use crate::extract::array_or_empty;
use crate::gateway::{ChatMessage, Provider};
use crate::prompts::{PromptLibrary, TASK_SUGGESTIONS_SYSTEM, names, value_text};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskSuggestionsRequest {
    /// Dashboard snapshot: appointments, customers, revenue, whatever the caller has.
    pub business_data: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct TaskSuggestionsResponse {
    pub tasks: Vec<Value>,
}

pub struct TaskSuggestions;

impl ChatTask for TaskSuggestions {
    const NAME: &'static str = "ai-task-suggestions";
    const PROVIDER: Provider = Provider::Gateway;

    type Request = TaskSuggestionsRequest;

    fn messages(
        request: &TaskSuggestionsRequest,
        prompts: &PromptLibrary,
    ) -> Result<Vec<ChatMessage>, HandlerError> {
        let mut context = Context::new();
        context.insert(
            "business_data",
            &value_text(
                request.business_data.as_ref(),
                "No business data available yet.",
            ),
        );
        let user = prompts.render(names::TASK_SUGGESTIONS, &context)?;
        Ok(vec![
            ChatMessage::system(TASK_SUGGESTIONS_SYSTEM),
            ChatMessage::user(user),
        ])
    }
}

impl BufferedTask for TaskSuggestions {
    type Output = TaskSuggestionsResponse;

    fn respond(_request: TaskSuggestionsRequest, content: String) -> TaskSuggestionsResponse {
        TaskSuggestionsResponse {
            tasks: array_or_empty(&content),
        }
    }
}
