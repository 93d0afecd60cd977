//! Inventory scanner reading nodes from a CSV file or an inline string.
//!
//! Rows aggregate into one node per `node_name` in first-seen order. The
//! optional `switch_id`/`switch_ip` columns attach a shared switch record,
//! one allocation per distinct id.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use async_trait::async_trait;
use indexmap::IndexMap;
use tracing::warn;

use meshprobe_common::capability::{ConfigMap, Scanner};
use meshprobe_common::config;
use meshprobe_common::model::{NetworkInterface, NetworkSwitch, Node};

pub const NAME: &str = "CSVScanner";

const NODE_NAME_FIELD: &str = "node_name";
const INTERFACE_NAME_FIELD: &str = "interface_name";
const MAC_ADDRESS_FIELD: &str = "mac_address";
const IP_ADDRESS_FIELD: &str = "ip_address";
const SWITCH_ID_FIELD: &str = "switch_id";
const SWITCH_IP_FIELD: &str = "switch_ip";

const EXPECTED_HEADERS: [&str; 4] = [
    NODE_NAME_FIELD,
    INTERFACE_NAME_FIELD,
    MAC_ADDRESS_FIELD,
    IP_ADDRESS_FIELD,
];

pub struct CsvScanner {
    csv_file: Option<PathBuf>,
    csv_data: Option<String>,
}

pub fn factory(config: &ConfigMap) -> anyhow::Result<Box<dyn Scanner>> {
    let scanner = CsvScanner {
        csv_file: config::str_opt(config, "csv_file").map(PathBuf::from),
        csv_data: config::str_opt(config, "csv_data").map(str::to_owned),
    };
    if scanner.csv_file.is_none() && scanner.csv_data.is_none() {
        bail!("either 'csv_file' or 'csv_data' must be provided");
    }
    Ok(Box::new(scanner))
}

impl CsvScanner {
    fn load(&self) -> anyhow::Result<String> {
        if let Some(data) = &self.csv_data {
            return Ok(data.clone());
        }
        let Some(path) = self.csv_file.as_ref() else {
            bail!("no CSV source configured");
        };
        fs::read_to_string(path)
            .with_context(|| format!("failed to read CSV file '{}'", path.display()))
    }

    fn parse(&self, text: &str) -> anyhow::Result<Vec<Node>> {
        let mut lines = text.lines();
        let Some(header_line) = lines.next() else {
            bail!("CSV input is empty");
        };
        let headers: Vec<&str> = header_line.split(',').map(str::trim).collect();
        let column = |name: &str| headers.iter().position(|h| *h == name);

        let missing: Vec<&str> = EXPECTED_HEADERS
            .iter()
            .filter(|h| column(h).is_none())
            .copied()
            .collect();
        if !missing.is_empty() {
            bail!("CSV headers are missing required fields: {}", missing.join(", "));
        }
        for header in &headers {
            if !EXPECTED_HEADERS.contains(header)
                && *header != SWITCH_ID_FIELD
                && *header != SWITCH_IP_FIELD
            {
                warn!("CSV header '{header}' is not recognized and will be ignored");
            }
        }

        // The missing-header check above guarantees these resolve.
        let column_or_zero = |name: &str| column(name).unwrap_or_default();
        let node_col = column_or_zero(NODE_NAME_FIELD);
        let mac_col = column_or_zero(MAC_ADDRESS_FIELD);
        let ip_col = column_or_zero(IP_ADDRESS_FIELD);
        let switch_id_col = column(SWITCH_ID_FIELD);
        let switch_ip_col = column(SWITCH_IP_FIELD);

        let mut nodes: IndexMap<String, Node> = IndexMap::new();
        let mut switches: IndexMap<String, Arc<NetworkSwitch>> = IndexMap::new();

        for (line_no, line) in lines.enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            let field = |idx: usize| fields.get(idx).copied().unwrap_or_default();

            let node_name = field(node_col);
            if node_name.is_empty() {
                bail!("CSV row {}: empty {NODE_NAME_FIELD}", line_no + 2);
            }

            let ip = Some(field(ip_col)).filter(|s| !s.is_empty());
            let interface = NetworkInterface::parse(field(mac_col), ip)
                .with_context(|| format!("CSV row {}", line_no + 2))?;

            let node = nodes.entry(node_name.to_owned()).or_insert_with(|| {
                let mut node = Node::new(node_name);
                node.id = Some(node_name.to_owned());
                node
            });
            node.network_interfaces.push(interface);

            if let Some(id_col) = switch_id_col {
                let switch_id = field(id_col);
                if !switch_id.is_empty() {
                    let switch = match switches.get(switch_id) {
                        Some(existing) => existing.clone(),
                        None => {
                            let raw_ip = switch_ip_col.map(field).unwrap_or_default();
                            let ip = raw_ip.parse().with_context(|| {
                                format!(
                                    "CSV row {}: switch '{switch_id}' needs a valid {SWITCH_IP_FIELD}",
                                    line_no + 2
                                )
                            })?;
                            let switch = Arc::new(NetworkSwitch::new(switch_id, "", ip));
                            switches.insert(switch_id.to_owned(), switch.clone());
                            switch
                        }
                    };
                    node.network_switch = Some(switch);
                }
            }
        }

        Ok(nodes.into_values().collect())
    }
}

#[async_trait]
impl Scanner for CsvScanner {
    fn validate(&self) -> anyhow::Result<()> {
        if let Some(path) = &self.csv_file {
            if !path.is_file() {
                bail!("CSV file '{}' does not exist", path.display());
            }
        }
        Ok(())
    }

    async fn scan(&self) -> anyhow::Result<Vec<Node>> {
        let text = self.load()?;
        self.parse(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
node_name,interface_name,mac_address,ip_address,switch_id,switch_ip
n1,eth0,aa:bb:cc:00:00:01,10.0.0.1,A,10.0.100.1
n1,ib0,00:02:c9:00:00:01,10.1.0.1,A,10.0.100.1
n2,eth0,aa:bb:cc:00:00:02,10.0.0.2,B,10.0.100.2
";

    fn scanner(data: &str) -> CsvScanner {
        CsvScanner {
            csv_file: None,
            csv_data: Some(data.to_owned()),
        }
    }

    #[tokio::test]
    async fn aggregates_rows_into_nodes() {
        let nodes = scanner(SAMPLE).scan().await.unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].network_interfaces.len(), 2);
        assert_eq!(nodes[0].id.as_deref(), Some("n1"));
        assert_eq!(nodes[0].switch_id(), Some("A"));
        assert_eq!(nodes[1].switch_id(), Some("B"));
    }

    #[tokio::test]
    async fn infiniband_interfaces_are_typed_by_prefix() {
        use meshprobe_common::model::InterfaceType;

        let nodes = scanner(SAMPLE).scan().await.unwrap();
        let types: Vec<_> = nodes[0]
            .network_interfaces
            .iter()
            .map(|i| i.interface_type)
            .collect();
        assert_eq!(types, vec![InterfaceType::Ethernet, InterfaceType::Infiniband]);
    }

    #[tokio::test]
    async fn same_switch_id_shares_one_record() {
        let data = "\
node_name,interface_name,mac_address,ip_address,switch_id,switch_ip
n1,eth0,aa:bb:cc:00:00:01,10.0.0.1,A,10.0.100.1
n2,eth0,aa:bb:cc:00:00:02,10.0.0.2,A,10.0.100.1
";
        let nodes = scanner(data).scan().await.unwrap();
        let a = nodes[0].network_switch.as_ref().unwrap();
        let b = nodes[1].network_switch.as_ref().unwrap();
        assert!(Arc::ptr_eq(a, b));
    }

    #[tokio::test]
    async fn missing_required_header_fails() {
        let data = "node_name,mac_address\nn1,aa:bb:cc:00:00:01\n";
        let err = scanner(data).scan().await.unwrap_err();
        assert!(err.to_string().contains("ip_address"));
    }

    #[test]
    fn factory_requires_a_source() {
        let empty = ConfigMap::new();
        assert!(factory(&empty).is_err());
    }
}
