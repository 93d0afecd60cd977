use serde::Serialize;

/// The outcome of one probe invocation against one node/interface
/// combination. Immutable once produced; reporters only ever read these.
///
/// `metric` is the probe's kind-specific scalar (latency in milliseconds for
/// a ping). It is absent when the probe failed or when the output carried no
/// parseable value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResult {
    pub node: String,
    pub interface: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric: Option<f64>,
}
