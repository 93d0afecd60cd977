//! Latency probe wrapping the system `ping` command.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex_lite::Regex;

use meshprobe_common::capability::{ConfigMap, Observation, Probe};
use meshprobe_common::config;
use meshprobe_common::exec::run_command;
use meshprobe_common::model::{ExecutionResult, NetworkInterface, Node};

pub const NAME: &str = "PingProbe";

const DEFAULT_COMMAND: &str = "ping -c 1";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

fn time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"time=(\d+\.?\d*) ms").expect("valid regex"))
}

#[derive(Clone)]
pub struct PingProbe {
    nodes: Vec<Node>,
    interface: Option<NetworkInterface>,
    command: String,
    timeout: Duration,
}

pub fn factory(config: &ConfigMap, nodes: &[Node]) -> anyhow::Result<Box<dyn Probe>> {
    Ok(Box::new(PingProbe {
        nodes: nodes.to_vec(),
        interface: None,
        command: config::str_or(config, "command", DEFAULT_COMMAND),
        timeout: Duration::from_secs(config::u64_or(
            config,
            "timeout_secs",
            DEFAULT_TIMEOUT_SECS,
        )),
    }))
}

#[async_trait]
impl Probe for PingProbe {
    fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    fn interface(&self) -> Option<&NetworkInterface> {
        self.interface.as_ref()
    }

    fn command(&self) -> &str {
        &self.command
    }

    async fn execute(&self) -> Vec<Observation> {
        let mut observations = Vec::new();
        for node in &self.nodes {
            for interface in &node.network_interfaces {
                let mac = interface.mac_address.to_string();
                let observation = match interface.ip_address {
                    Some(ip) => {
                        let command = format!("{} {ip}", self.command);
                        let result = run_command(&command, Some(self.timeout)).await;
                        Observation {
                            node: node.label().to_owned(),
                            interface: mac,
                            output: result.output,
                            command_ok: result.ok,
                        }
                    }
                    None => Observation {
                        node: node.label().to_owned(),
                        interface: mac,
                        output: "no IP address assigned".into(),
                        command_ok: false,
                    },
                };
                observations.push(observation);
            }
        }
        observations
    }

    fn parse(&self, observations: Vec<Observation>) -> Vec<ExecutionResult> {
        observations
            .into_iter()
            .map(|obs| {
                let success = obs.command_ok
                    && (obs.output.contains("1 received")
                        || obs.output.contains("1 packets received"));
                // A successful ping without a parseable time still counts;
                // the metric is simply absent.
                let metric = if success {
                    time_pattern()
                        .captures(&obs.output)
                        .and_then(|c| c[1].parse().ok())
                } else {
                    None
                };
                ExecutionResult {
                    node: obs.node,
                    interface: obs.interface,
                    success,
                    metric,
                }
            })
            .collect()
    }

    fn rebind(&self, nodes: Vec<Node>, interface: Option<NetworkInterface>) -> Box<dyn Probe> {
        Box::new(PingProbe {
            nodes,
            interface,
            command: self.command.clone(),
            timeout: self.timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use meshprobe_common::error::ProbeError;

    use super::*;

    fn node_with_iface(hostname: &str, mac: &str, ip: Option<&str>) -> Node {
        let mut node = Node::new(hostname);
        node.network_interfaces
            .push(NetworkInterface::parse(mac, ip).unwrap());
        node
    }

    fn probe(nodes: Vec<Node>, interface: Option<NetworkInterface>) -> PingProbe {
        PingProbe {
            nodes,
            interface,
            command: DEFAULT_COMMAND.into(),
            timeout: Duration::from_secs(1),
        }
    }

    fn observation(output: &str, command_ok: bool) -> Observation {
        Observation {
            node: "n1".into(),
            interface: "aa:bb:cc:dd:ee:01".into(),
            output: output.into(),
            command_ok,
        }
    }

    #[test]
    fn node_arity_is_enforced() {
        let empty = probe(Vec::new(), None);
        assert_eq!(empty.validate_nodes(), Err(ProbeError::NodeArity(0)));

        let three: Vec<Node> = (0..3)
            .map(|i| node_with_iface(&format!("n{i}"), "aa:bb:cc:dd:ee:ff", None))
            .collect();
        let too_many = probe(three, None);
        assert_eq!(too_many.validate_nodes(), Err(ProbeError::NodeArity(3)));

        let one = probe(
            vec![node_with_iface("n1", "aa:bb:cc:dd:ee:01", None)],
            None,
        );
        assert!(one.validate_nodes().is_ok());
        assert!(one.validate_interface().is_ok());
    }

    #[test]
    fn two_nodes_require_an_interface() {
        let pair = vec![
            node_with_iface("n1", "aa:bb:cc:dd:ee:01", None),
            node_with_iface("n2", "aa:bb:cc:dd:ee:02", None),
        ];
        let without = probe(pair.clone(), None);
        assert_eq!(
            without.validate_interface(),
            Err(ProbeError::MissingInterface)
        );

        let iface = NetworkInterface::parse("aa:bb:cc:dd:ee:01", None).unwrap();
        let with = probe(pair, Some(iface));
        assert!(with.validate_nodes().is_ok());
        assert!(with.validate_interface().is_ok());
    }

    #[test]
    fn parse_extracts_latency_on_success() {
        let p = probe(Vec::new(), None);
        let output = "64 bytes from 10.0.0.1: icmp_seq=1 ttl=64 time=0.042 ms\n\
                      1 packets transmitted, 1 received, 0% packet loss";
        let results = p.parse(vec![observation(output, true)]);
        assert_eq!(results.len(), 1);
        assert!(results[0].success);
        assert_eq!(results[0].metric, Some(0.042));
    }

    #[test]
    fn parse_without_time_is_success_without_metric() {
        let p = probe(Vec::new(), None);
        let output = "1 packets transmitted, 1 received, 0% packet loss";
        let results = p.parse(vec![observation(output, true)]);
        assert!(results[0].success);
        assert_eq!(results[0].metric, None);
    }

    #[test]
    fn parse_failed_command_is_failed_data() {
        let p = probe(Vec::new(), None);
        let results = p.parse(vec![observation("Destination Host Unreachable", false)]);
        assert!(!results[0].success);
        assert_eq!(results[0].metric, None);
    }

    #[tokio::test]
    async fn missing_ip_is_a_failed_combination() {
        let p = probe(
            vec![node_with_iface("n1", "aa:bb:cc:dd:ee:01", None)],
            None,
        );
        let observations = p.execute().await;
        assert_eq!(observations.len(), 1);
        assert!(!observations[0].command_ok);
    }
}
