//! Discovery scanner wrapping the external `arp-scan` tool.
//!
//! Discovered nodes get their MAC as id and their IP as hostname until
//! something downstream assigns better identities.

use std::ffi::OsStr;
use std::net::IpAddr;
use std::time::Duration;

use anyhow::bail;
use async_trait::async_trait;

use meshprobe_common::capability::{ConfigMap, Scanner};
use meshprobe_common::config;
use meshprobe_common::exec::run_command;
use meshprobe_common::model::{NetworkInterface, Node};

pub const NAME: &str = "ARPScanner";

const SCAN_TIMEOUT: Duration = Duration::from_secs(120);

pub struct ArpScanner {
    interface: String,
    target_range: String,
}

/// Filesystem-only PATH lookup. `validate()` is called from async context,
/// so it must not spawn a blocking child process just to check for the tool.
fn binary_on_path(name: &str, path_var: &OsStr) -> bool {
    std::env::split_paths(path_var).any(|dir| dir.join(name).is_file())
}

pub fn factory(config: &ConfigMap) -> anyhow::Result<Box<dyn Scanner>> {
    Ok(Box::new(ArpScanner {
        interface: config::str_required(config, "interface")?.to_owned(),
        target_range: config::str_required(config, "target_range")?.to_owned(),
    }))
}

impl ArpScanner {
    fn parse(&self, output: &str) -> Vec<Node> {
        let mut nodes = Vec::new();
        for line in output.lines() {
            if line.is_empty()
                || line.starts_with("Interface:")
                || line.starts_with("Starting")
                || line.starts_with("Ending")
            {
                continue;
            }
            let mut parts = line.split_whitespace();
            let (Some(ip), Some(mac)) = (parts.next(), parts.next()) else {
                continue;
            };
            if ip.parse::<IpAddr>().is_err() {
                continue;
            }
            let Ok(interface) = NetworkInterface::parse(mac, Some(ip)) else {
                continue;
            };
            let mut node = Node::new(ip);
            node.id = Some(mac.to_owned());
            node.network_interfaces.push(interface);
            nodes.push(node);
        }
        nodes
    }
}

#[async_trait]
impl Scanner for ArpScanner {
    fn validate(&self) -> anyhow::Result<()> {
        let path = std::env::var_os("PATH").unwrap_or_default();
        if !binary_on_path("arp-scan", &path) {
            bail!("arp-scan is not installed or not found in PATH");
        }
        Ok(())
    }

    async fn scan(&self) -> anyhow::Result<Vec<Node>> {
        let command = format!(
            "arp-scan --interface={} {}",
            self.interface, self.target_range
        );
        let result = run_command(&command, Some(SCAN_TIMEOUT)).await;
        if !result.ok {
            bail!(
                "arp-scan failed on interface '{}': {}",
                self.interface,
                result.output
            );
        }
        Ok(self.parse(&result.output))
    }
}
