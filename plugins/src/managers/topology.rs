//! Topology-aware connectivity test managers.
//!
//! Each policy computes its pair set through the pairing engine, then stamps
//! out one probe per pair via [`Probe::rebind`] and aggregates results in
//! pair order. With `parallel = true` the pairs execute concurrently, but
//! tasks are joined in spawn order so the aggregation order never changes.

use async_trait::async_trait;
use pnet::util::MacAddr;
use tracing::{debug, warn};

use meshprobe_common::capability::{ConfigMap, Manager, Probe};
use meshprobe_common::config;
use meshprobe_common::model::{ExecutionResult, NetworkInterface, Node};
use meshprobe_common::pairing;

pub const ALL_TO_ALL: &str = "AllToAllConnectivityTestManager";
pub const INTER_SWITCH: &str = "InterSwitchConnectivityTestManager";
pub const INTRA_SWITCH: &str = "IntraSwitchConnectivityTestManager";

#[derive(Debug, Clone, Copy)]
enum Policy {
    AllToAll,
    InterSwitch,
    IntraSwitch,
}

impl Policy {
    fn pairs(&self, nodes: &[Node]) -> Vec<(usize, usize)> {
        match self {
            Policy::AllToAll => pairing::all_to_all(nodes),
            Policy::InterSwitch => pairing::inter_group(nodes),
            Policy::IntraSwitch => pairing::intra_group(nodes),
        }
    }
}

pub struct TopologyManager {
    policy: Policy,
    nodes: Vec<Node>,
    probes: Vec<Box<dyn Probe>>,
    /// Declared interface for pair tests, looked up on the source node.
    interface: Option<MacAddr>,
    parallel: bool,
}

fn build(
    policy: Policy,
    config: &ConfigMap,
    probes: Vec<Box<dyn Probe>>,
    nodes: &[Node],
) -> anyhow::Result<Box<dyn Manager>> {
    let interface = match config::str_opt(config, "interface") {
        Some(raw) => Some(
            raw.parse::<MacAddr>()
                .map_err(|_| anyhow::anyhow!("invalid interface MAC address: '{raw}'"))?,
        ),
        None => None,
    };
    Ok(Box::new(TopologyManager {
        policy,
        nodes: nodes.to_vec(),
        probes,
        interface,
        parallel: config::bool_or(config, "parallel", false),
    }))
}

pub fn all_to_all_factory(
    config: &ConfigMap,
    probes: Vec<Box<dyn Probe>>,
    nodes: &[Node],
) -> anyhow::Result<Box<dyn Manager>> {
    build(Policy::AllToAll, config, probes, nodes)
}

pub fn inter_switch_factory(
    config: &ConfigMap,
    probes: Vec<Box<dyn Probe>>,
    nodes: &[Node],
) -> anyhow::Result<Box<dyn Manager>> {
    build(Policy::InterSwitch, config, probes, nodes)
}

pub fn intra_switch_factory(
    config: &ConfigMap,
    probes: Vec<Box<dyn Probe>>,
    nodes: &[Node],
) -> anyhow::Result<Box<dyn Manager>> {
    build(Policy::IntraSwitch, config, probes, nodes)
}

impl TopologyManager {
    /// Picks the interface a pair test runs over: the declared MAC if the
    /// source node carries it, otherwise the source's first active
    /// interface.
    fn pair_interface(&self, source: &Node) -> Option<NetworkInterface> {
        if let Some(mac) = self.interface {
            if let Some(found) = source
                .network_interfaces
                .iter()
                .find(|i| i.mac_address == mac)
            {
                return Some(found.clone());
            }
            warn!(
                "node '{}' has no interface {mac}, falling back to its first active interface",
                source.hostname
            );
        }
        source.first_active_interface().cloned()
    }

    fn bind_pair(&self, a: usize, b: usize) -> Vec<Box<dyn Probe>> {
        let source = &self.nodes[a];
        let target = &self.nodes[b];
        let interface = self.pair_interface(source);
        self.probes
            .iter()
            .map(|p| p.rebind(vec![source.clone(), target.clone()], interface.clone()))
            .collect()
    }

    async fn run_sequential(&self, pairs: &[(usize, usize)]) -> Vec<ExecutionResult> {
        let mut results = Vec::new();
        for &(a, b) in pairs {
            for probe in self.bind_pair(a, b) {
                match probe.run().await {
                    Ok(probe_results) => results.extend(probe_results),
                    Err(e) => warn!(
                        "pair ({}, {}): probe skipped: {e}",
                        self.nodes[a].hostname, self.nodes[b].hostname
                    ),
                }
            }
        }
        results
    }

    async fn run_parallel(&self, pairs: &[(usize, usize)]) -> Vec<ExecutionResult> {
        let mut handles = Vec::with_capacity(pairs.len());
        for &(a, b) in pairs {
            let probes = self.bind_pair(a, b);
            let pair_label = format!("({}, {})", self.nodes[a].hostname, self.nodes[b].hostname);
            handles.push(tokio::spawn(async move {
                let mut out = Vec::new();
                for probe in &probes {
                    match probe.run().await {
                        Ok(probe_results) => out.extend(probe_results),
                        Err(e) => warn!("pair {pair_label}: probe skipped: {e}"),
                    }
                }
                out
            }));
        }

        // Joining in spawn order re-sequences results into pair order no
        // matter how execution interleaved.
        let mut results = Vec::new();
        for handle in handles {
            match handle.await {
                Ok(pair_results) => results.extend(pair_results),
                Err(e) => warn!("pair task failed: {e}"),
            }
        }
        results
    }
}

#[async_trait]
impl Manager for TopologyManager {
    async fn run(&self) -> Vec<ExecutionResult> {
        let pairs = self.policy.pairs(&self.nodes);
        debug!("{:?} policy produced {} pairs", self.policy, pairs.len());
        if self.parallel {
            self.run_parallel(&pairs).await
        } else {
            self.run_sequential(&pairs).await
        }
    }
}
