//! Prometheus metrics for the handler endpoints.
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use prometheus_client::encoding::{EncodeLabelSet, text::encode};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::{Histogram, exponential_buckets};
use prometheus_client::registry::Registry;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Global metrics registry instance
pub static METRICS: Lazy<Arc<MetricsCollector>> = Lazy::new(|| Arc::new(MetricsCollector::new()));

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RequestLabels {
    pub handler: String,
    /// "success" or "error"
    pub status: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ErrorLabels {
    pub handler: String,
    pub error_type: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct HandlerLabels {
    pub handler: String,
}

pub struct MetricsCollector {
    registry: RwLock<Registry>,

    pub handler_requests_total: Family<RequestLabels, Counter>,

    pub handler_request_duration_seconds: Family<HandlerLabels, Histogram>,

    pub handler_active_requests: Family<HandlerLabels, Gauge>,

    pub handler_errors_total: Family<ErrorLabels, Counter>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let handler_requests_total = Family::<RequestLabels, Counter>::default();
        registry.register(
            "handler_requests_total",
            "Total number of handler invocations",
            handler_requests_total.clone(),
        );

        let handler_request_duration_seconds =
            Family::<HandlerLabels, Histogram>::new_with_constructor(|| {
                // Model calls are slow: 100ms up to roughly 50s.
                Histogram::new(exponential_buckets(0.1, 2.0, 10))
            });
        registry.register(
            "handler_request_duration_seconds",
            "Handler latency histogram in seconds",
            handler_request_duration_seconds.clone(),
        );

        let handler_active_requests = Family::<HandlerLabels, Gauge>::default();
        registry.register(
            "handler_active_requests",
            "Number of invocations currently being processed",
            handler_active_requests.clone(),
        );

        let handler_errors_total = Family::<ErrorLabels, Counter>::default();
        registry.register(
            "handler_errors_total",
            "Total number of handler errors by error type",
            handler_errors_total.clone(),
        );

        Self {
            registry: RwLock::new(registry),
            handler_requests_total,
            handler_request_duration_seconds,
            handler_active_requests,
            handler_errors_total,
        }
    }

    /// Encode metrics in Prometheus text format
    pub fn encode(&self) -> String {
        let mut buffer = String::new();
        let registry = self.registry.read();
        if let Err(error) = encode(&mut buffer, &registry) {
            tracing::error!(%error, "failed to encode metrics");
        }
        buffer
    }

    pub fn record_success(&self, handler: &str, duration: Duration) {
        self.handler_requests_total
            .get_or_create(&RequestLabels {
                handler: handler.to_string(),
                status: "success".to_string(),
            })
            .inc();
        self.observe_duration(handler, duration);
    }

    pub fn record_error(&self, handler: &str, duration: Duration, error_type: &str) {
        self.handler_requests_total
            .get_or_create(&RequestLabels {
                handler: handler.to_string(),
                status: "error".to_string(),
            })
            .inc();
        self.observe_duration(handler, duration);
        self.handler_errors_total
            .get_or_create(&ErrorLabels {
                handler: handler.to_string(),
                error_type: error_type.to_string(),
            })
            .inc();
    }

    fn observe_duration(&self, handler: &str, duration: Duration) {
        self.handler_request_duration_seconds
            .get_or_create(&HandlerLabels {
                handler: handler.to_string(),
            })
            .observe(duration.as_secs_f64());
    }

    fn active(&self, handler: &str) -> Gauge {
        self.handler_active_requests
            .get_or_create(&HandlerLabels {
                handler: handler.to_string(),
            })
            .clone()
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard timing one handler invocation.
///
/// Dropping the guard without calling [`success`](Self::success) or
/// [`error`](Self::error) counts the invocation as an error of type
/// `"dropped"`, which is what happens when a client disconnects mid-call.
pub struct RequestMetrics {
    collector: Arc<MetricsCollector>,
    handler: &'static str,
    start: Instant,
    completed: bool,
}

impl RequestMetrics {
    pub fn new(handler: &'static str) -> Self {
        Self::with_collector(METRICS.clone(), handler)
    }

    pub fn with_collector(collector: Arc<MetricsCollector>, handler: &'static str) -> Self {
        collector.active(handler).inc();
        Self {
            collector,
            handler,
            start: Instant::now(),
            completed: false,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn success(mut self) {
        self.collector
            .record_success(self.handler, self.start.elapsed());
        self.finish();
    }

    pub fn error(mut self, error_type: &str) {
        self.collector
            .record_error(self.handler, self.start.elapsed(), error_type);
        self.finish();
    }

    fn finish(&mut self) {
        self.completed = true;
        self.collector.active(self.handler).dec();
    }
}

impl Drop for RequestMetrics {
    fn drop(&mut self) {
        if !self.completed {
            self.collector
                .record_error(self.handler, self.start.elapsed(), "dropped");
            self.finish();
        }
    }
}
