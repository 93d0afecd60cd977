//! Runs bound probes strictly one after another.

use async_trait::async_trait;
use tracing::warn;

use meshprobe_common::capability::{ConfigMap, Manager, Probe};
use meshprobe_common::model::{ExecutionResult, Node};

pub const NAME: &str = "SequentialManager";

pub struct SequentialManager {
    probes: Vec<Box<dyn Probe>>,
}

pub fn factory(
    _config: &ConfigMap,
    probes: Vec<Box<dyn Probe>>,
    _nodes: &[Node],
) -> anyhow::Result<Box<dyn Manager>> {
    Ok(Box::new(SequentialManager { probes }))
}

#[async_trait]
impl Manager for SequentialManager {
    async fn run(&self) -> Vec<ExecutionResult> {
        let mut results = Vec::new();
        for probe in &self.probes {
            match probe.run().await {
                Ok(probe_results) => results.extend(probe_results),
                // Degrade gracefully: one invalid probe must not abort the
                // remaining ones.
                Err(e) => warn!("probe failed validation, skipping: {e}"),
            }
        }
        results
    }
}
