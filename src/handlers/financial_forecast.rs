//! `ai-financial-forecast`: a 12-month projection as structured JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tera::Context;

use super::{BufferedTask, ChatTask};
use crate::error::HandlerError;
use crate::extract::object_or_raw;
use crate::gateway::{ChatMessage, Provider};
use crate::model::BusinessInfo;
use crate::prompts::{FINANCIAL_FORECAST_SYSTEM, PromptLibrary, names, or_fallback, value_text};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ForecastRequest {
    #[serde(deserialize_with = "super::null_as_default")]
    pub business_info: BusinessInfo,
    pub financial_data: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    /// Parsed forecast object, or `{ "raw": <model text> }`.
    pub forecast: Value,
}

pub struct FinancialForecast;

impl ChatTask for FinancialForecast {
    const NAME: &'static str = "ai-financial-forecast";
    const PROVIDER: Provider = Provider::Gateway;

    type Request = ForecastRequest;

    fn messages(
        request: &ForecastRequest,
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
            "financial_data",
            &value_text(
                request.financial_data.as_ref(),
                "No financial data provided; use typical figures for this industry.",
            ),
        );

        let user = prompts.render(names::FINANCIAL_FORECAST, &context)?;
        Ok(vec![
            ChatMessage::system(FINANCIAL_FORECAST_SYSTEM),
            ChatMessage::user(user),
        ])
    }
}

impl BufferedTask for FinancialForecast {
    type Output = ForecastResponse;

    fn respond(_request: ForecastRequest, content: String) -> ForecastResponse {
        ForecastResponse {
            forecast: object_or_raw(&content),
        }
    }
}
