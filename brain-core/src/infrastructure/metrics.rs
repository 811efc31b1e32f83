//! In-process Prometheus metrics rendered in the text exposition format.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

const DURATION_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

type Labels = Vec<String>;

#[derive(Debug, Default)]
pub struct Metrics {
    inner: Mutex<MetricsInner>,
}

#[derive(Debug, Default)]
struct MetricsInner {
    http_requests: BTreeMap<Labels, u64>,
    http_request_duration: BTreeMap<Labels, DurationHistogram>,
    chat_requests: BTreeMap<Labels, u64>,
    chat_duration: BTreeMap<Labels, DurationHistogram>,
    chat_errors: BTreeMap<Labels, u64>,
    tool_calls: BTreeMap<Labels, u64>,
    tool_duration: BTreeMap<Labels, DurationHistogram>,
    servers_connected: u64,
    model_calls: BTreeMap<Labels, u64>,
    model_duration: BTreeMap<Labels, DurationHistogram>,
    redis_operations: BTreeMap<Labels, u64>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MetricsInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record_http_request(&self, method: &str, endpoint: &str, status: u16, elapsed: Duration) {
        let mut inner = self.lock();
        *inner
            .http_requests
            .entry(labels(&[method, endpoint, &status.to_string()]))
            .or_default() += 1;
        inner
            .http_request_duration
            .entry(labels(&[method, endpoint]))
            .or_default()
            .observe(elapsed);
    }

    pub fn record_chat(&self, interface: &str, language: &str, elapsed: Duration) {
        let mut inner = self.lock();
        *inner
            .chat_requests
            .entry(labels(&[interface, language]))
            .or_default() += 1;
        inner
            .chat_duration
            .entry(labels(&[interface]))
            .or_default()
            .observe(elapsed);
    }

    pub fn record_chat_error(&self, interface: &str, error_type: &str) {
        let mut inner = self.lock();
        *inner
            .chat_errors
            .entry(labels(&[interface, error_type]))
            .or_default() += 1;
    }

    pub fn record_tool_call(&self, server: &str, tool: &str, status: &str, elapsed: Duration) {
        let mut inner = self.lock();
        *inner
            .tool_calls
            .entry(labels(&[server, tool, status]))
            .or_default() += 1;
        inner
            .tool_duration
            .entry(labels(&[server, tool]))
            .or_default()
            .observe(elapsed);
    }

    pub fn set_servers_connected(&self, count: u64) {
        self.lock().servers_connected = count;
    }

    pub fn record_model_call(&self, model: &str, elapsed: Duration) {
        let mut inner = self.lock();
        *inner.model_calls.entry(labels(&[model])).or_default() += 1;
        inner
            .model_duration
            .entry(labels(&[model]))
            .or_default()
            .observe(elapsed);
    }

    pub fn record_redis_operation(&self, operation: &str, status: &str) {
        let mut inner = self.lock();
        *inner
            .redis_operations
            .entry(labels(&[operation, status]))
            .or_default() += 1;
    }

    pub fn servers_connected(&self) -> u64 {
        self.lock().servers_connected
    }

    /// Count recorded for `mcp_tool_calls_total` with the given labels.
    pub fn tool_call_count(&self, server: &str, tool: &str, status: &str) -> u64 {
        self.lock()
            .tool_calls
            .get(&labels(&[server, tool, status]))
            .copied()
            .unwrap_or(0)
    }

    pub fn render(&self) -> String {
        let inner = self.lock();
        let mut out = String::new();

        write_counter_map(
            &mut out,
            "http_requests_total",
            "Total HTTP requests",
            &["method", "endpoint", "status"],
            &inner.http_requests,
        );
        write_histogram_map(
            &mut out,
            "http_request_duration_seconds",
            "HTTP request duration in seconds",
            &["method", "endpoint"],
            &inner.http_request_duration,
        );
        write_counter_map(
            &mut out,
            "chat_requests_total",
            "Total chat requests",
            &["interface", "language"],
            &inner.chat_requests,
        );
        write_histogram_map(
            &mut out,
            "chat_duration_seconds",
            "Chat processing duration in seconds",
            &["interface"],
            &inner.chat_duration,
        );
        write_counter_map(
            &mut out,
            "chat_errors_total",
            "Total chat errors",
            &["interface", "error_type"],
            &inner.chat_errors,
        );
        write_counter_map(
            &mut out,
            "mcp_tool_calls_total",
            "Total MCP tool calls",
            &["server", "tool", "status"],
            &inner.tool_calls,
        );
        write_histogram_map(
            &mut out,
            "mcp_tool_duration_seconds",
            "MCP tool call duration in seconds",
            &["server", "tool"],
            &inner.tool_duration,
        );

        out.push_str("# HELP mcp_servers_connected Number of connected MCP servers\n");
        out.push_str("# TYPE mcp_servers_connected gauge\n");
        out.push_str(&format!("mcp_servers_connected {}\n", inner.servers_connected));

        write_counter_map(
            &mut out,
            "model_api_calls_total",
            "Total model API calls",
            &["model"],
            &inner.model_calls,
        );
        write_histogram_map(
            &mut out,
            "model_api_duration_seconds",
            "Model API call duration in seconds",
            &["model"],
            &inner.model_duration,
        );
        write_counter_map(
            &mut out,
            "redis_operations_total",
            "Total Redis operations",
            &["operation", "status"],
            &inner.redis_operations,
        );

        out
    }
}

fn labels(values: &[&str]) -> Labels {
    values.iter().map(|value| value.to_string()).collect()
}

fn format_labels(names: &[&str], values: &[String]) -> String {
    names
        .iter()
        .zip(values)
        .map(|(name, value)| format!("{name}=\"{}\"", escape_label_value(value)))
        .collect::<Vec<_>>()
        .join(",")
}

fn write_counter_map(
    out: &mut String,
    metric: &str,
    help: &str,
    names: &[&str],
    map: &BTreeMap<Labels, u64>,
) {
    out.push_str(&format!("# HELP {metric} {help}\n"));
    out.push_str(&format!("# TYPE {metric} counter\n"));
    for (values, count) in map {
        out.push_str(&format!(
            "{metric}{{{}}} {count}\n",
            format_labels(names, values)
        ));
    }
}

fn write_histogram_map(
    out: &mut String,
    metric: &str,
    help: &str,
    names: &[&str],
    map: &BTreeMap<Labels, DurationHistogram>,
) {
    out.push_str(&format!("# HELP {metric} {help}\n"));
    out.push_str(&format!("# TYPE {metric} histogram\n"));
    for (values, hist) in map {
        let labels = format_labels(names, values);
        for (idx, bound) in DURATION_BUCKETS.iter().enumerate() {
            out.push_str(&format!(
                "{metric}_bucket{{{labels},le=\"{bound}\"}} {}\n",
                hist.bucket_counts[idx]
            ));
        }
        out.push_str(&format!(
            "{metric}_bucket{{{labels},le=\"+Inf\"}} {}\n",
            hist.count
        ));
        out.push_str(&format!("{metric}_sum{{{labels}}} {}\n", hist.sum_seconds));
        out.push_str(&format!("{metric}_count{{{labels}}} {}\n", hist.count));
    }
}

fn escape_label_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '"' => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    out
}

#[derive(Clone, Debug, Default)]
struct DurationHistogram {
    bucket_counts: [u64; 11],
    sum_seconds: f64,
    count: u64,
}

impl DurationHistogram {
    fn observe(&mut self, duration: Duration) {
        let seconds = duration.as_secs_f64();
        self.count += 1;
        self.sum_seconds += seconds;
        for (idx, bound) in DURATION_BUCKETS.iter().enumerate() {
            if seconds <= *bound {
                self.bucket_counts[idx] += 1;
            }
        }
    }
}
