//! `ai-marketing-ideas`: a list of campaign ideas for a budget and audience.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tera::Context;

use super::{BufferedTask, ChatTask};
use crate::error::HandlerError;
use crate::extract::array_or_empty;
use crate::gateway::{ChatMessage, Provider};
use crate::model::BusinessInfo;
use crate::prompts::{MARKETING_IDEAS_SYSTEM, PromptLibrary, names, or_fallback, value_text};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarketingIdeasRequest {
    #[serde(deserialize_with = "super::null_as_default")]
    pub business_info: BusinessInfo,
    /// Free text or a number.
    pub budget: Option<Value>,
    pub target_audience: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MarketingIdeasResponse {
    pub ideas: Vec<Value>,
}

pub struct MarketingIdeas;

impl ChatTask for MarketingIdeas {
    const NAME: &'static str = "ai-marketing-ideas";
    const PROVIDER: Provider = Provider::Gateway;

    type Request = MarketingIdeasRequest;

    fn messages(
        request: &MarketingIdeasRequest,
        prompts: &PromptLibrary,
    ) -> Result<Vec<ChatMessage>, HandlerError> {
        let business = &request.business_info;
        let mut context = Context::new();
        context.insert(
            "business_name",
            &or_fallback(business.name.as_deref(), "Our Business"),
        );
        context.insert(
            "industry",
            &or_fallback(business.industry.as_deref(), "General"),
        );
        context.insert(
            "description",
            &or_fallback(business.description.as_deref(), "Not provided"),
        );
        context.insert(
            "location",
            &or_fallback(business.location.as_deref(), "Not specified"),
        );
        context.insert(
            "target_audience",
            &or_fallback(request.target_audience.as_deref(), "General audience"),
        );
        context.insert(
            "budget",
            &value_text(request.budget.as_ref(), "Not specified"),
        );

        let user = prompts.render(names::MARKETING_IDEAS, &context)?;
        Ok(vec![
            ChatMessage::system(MARKETING_IDEAS_SYSTEM),
            ChatMessage::user(user),
        ])
    }
}

impl BufferedTask for MarketingIdeas {
    type Output = MarketingIdeasResponse;

    fn respond(_request: MarketingIdeasRequest, content: String) -> MarketingIdeasResponse {
        MarketingIdeasResponse {
            ideas: array_or_empty(&content),
        }
    }
}
