use axum::{
    Router,
    http::{HeaderValue, StatusCode, header},
    middleware,
    response::Response,
    routing::{MethodRouter, get, post},
};
use std::sync::Arc;

use crate::handlers::{
    self, BufferedTask, ChatTask, appointment_reminders::AppointmentReminders,
    assistant::Assistant, business_plan::BusinessPlanGenerator, content::GenerateContent,
    content::StreamingChat, customer_messaging::CustomerMessaging,
    financial_forecast::FinancialForecast, marketing_ideas::MarketingIdeas,
    task_suggestions::TaskSuggestions,
};
use crate::health::{self, HealthChecker};
use crate::metrics;
use crate::state::AppState;

pub const FUNCTIONS_PATH: &str = "/functions/v1";

pub const ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";
pub const ALLOW_METHODS: &str = "POST, OPTIONS";

/// Every handler route, as `(name, method router)`.
fn function_routes() -> Vec<(&'static str, MethodRouter<Arc<AppState>>)> {
    vec![
        buffered_route::<Assistant>(),
        buffered_route::<CustomerMessaging>(),
        buffered_route::<FinancialForecast>(),
        buffered_route::<MarketingIdeas>(),
        buffered_route::<TaskSuggestions>(),
        buffered_route::<AppointmentReminders>(),
        buffered_route::<BusinessPlanGenerator>(),
        streamed_route::<GenerateContent>(),
        streamed_route::<StreamingChat>(),
        (
            handlers::email::NAME,
            post(handlers::email::send_email).options(handlers::preflight),
        ),
    ]
}

fn buffered_route<T: BufferedTask>() -> (&'static str, MethodRouter<Arc<AppState>>) {
    (
        T::NAME,
        post(handlers::buffered::<T>).options(handlers::preflight),
    )
}

fn streamed_route<T: ChatTask>() -> (&'static str, MethodRouter<Arc<AppState>>) {
    (
        T::NAME,
        post(handlers::streamed::<T>).options(handlers::preflight),
    )
}

/// Names of every mounted handler.
pub fn function_names() -> Vec<&'static str> {
    function_routes().into_iter().map(|(name, _)| name).collect()
}

/// Builds the full application router: handlers, health, metrics, CORS.
pub fn build_router(state: Arc<AppState>) -> Router {
    let functions = function_routes()
        .into_iter()
        .fold(Router::new(), |router, (name, route)| {
            router.route(&format!("/{name}"), route)
        })
        .with_state(state.clone());

    let health_checker = Arc::new(HealthChecker::new(
        state.config().clone(),
        state.secrets().clone(),
    ));
    let operational = Router::new()
        .route("/health", get(health::liveness_handler))
        .route("/ready", get(health::readiness_handler))
        .route("/health/components", get(health::components_handler))
        .with_state(health_checker)
        .route("/metrics", get(metrics_handler));

    Router::new()
        .nest(FUNCTIONS_PATH, functions)
        .merge(operational)
        .layer(middleware::map_response(with_cors))
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> (StatusCode, String) {
    (StatusCode::OK, metrics::METRICS.encode())
}

async fn with_cors(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    response
}
