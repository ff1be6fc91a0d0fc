//! `generate-business-plan`: the eight plan sections from a title and notes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tera::Context;

use super::{BufferedTask, ChatTask, require_text};
use crate::error::HandlerError;
use crate::extract::extract_object;
use crate::gateway::{ChatMessage, Provider};
use crate::model::PlanSections;
use crate::prompts::{BUSINESS_PLAN_SYSTEM, PromptLibrary, names, value_text};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BusinessPlanRequest {
    pub title: Option<String>,
    /// Owner's notes: free text or a structured questionnaire.
    pub context: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct BusinessPlanResponse {
    pub plan: PlanSections,
}

pub struct BusinessPlanGenerator;

impl ChatTask for BusinessPlanGenerator {
    const NAME: &'static str = "generate-business-plan";
    const PROVIDER: Provider = Provider::OpenAi;

    type Request = BusinessPlanRequest;

    fn validate(request: &BusinessPlanRequest) -> Result<(), HandlerError> {
        require_text(request.title.as_deref(), "title")
    }

    fn messages(
        request: &BusinessPlanRequest,
        prompts: &PromptLibrary,
    ) -> Result<Vec<ChatMessage>, HandlerError> {
        let mut context = Context::new();
        context.insert("title", request.title.as_deref().unwrap_or_default().trim());
        context.insert(
            "context",
            &value_text(request.context.as_ref(), "None provided"),
        );
        let user = prompts.render(names::BUSINESS_PLAN, &context)?;
        Ok(vec![
            ChatMessage::system(BUSINESS_PLAN_SYSTEM),
            ChatMessage::user(user),
        ])
    }
}

impl BufferedTask for BusinessPlanGenerator {
    type Output = BusinessPlanResponse;

    fn respond(_request: BusinessPlanRequest, content: String) -> BusinessPlanResponse {
        let plan = match extract_object(&content) {
            Ok(map) => PlanSections::from_model_output(&map),
            Err(error) => {
                tracing::warn!(%error, "business plan not parseable, returning empty sections");
                PlanSections::default()
            }
        };
        BusinessPlanResponse { plan }
    }
}
