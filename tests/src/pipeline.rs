use std::fs;
use std::path::Path;

use async_trait::async_trait;

use meshprobe_common::capability::{ConfigMap, Observation, Probe};
use meshprobe_common::error::ConfigError;
use meshprobe_common::model::{ExecutionResult, NetworkInterface, Node};
use meshprobe_core::pipeline::Pipeline;
use meshprobe_core::registry::Registry;

/// A probe that reports which pair it was bound to instead of touching the
/// network. Results carry "source->target" in the node field.
struct EchoProbe {
    nodes: Vec<Node>,
    interface: Option<NetworkInterface>,
}

#[async_trait]
impl Probe for EchoProbe {
    fn nodes(&self) -> &[Node] {
        &self.nodes
    }
    fn interface(&self) -> Option<&NetworkInterface> {
        self.interface.as_ref()
    }
    fn command(&self) -> &str {
        "echo"
    }
    async fn execute(&self) -> Vec<Observation> {
        Vec::new()
    }
    fn parse(&self, _observations: Vec<Observation>) -> Vec<ExecutionResult> {
        vec![ExecutionResult {
            node: format!("{}->{}", self.nodes[0].hostname, self.nodes[1].hostname),
            interface: self
                .interface
                .as_ref()
                .map(|i| i.mac_address.to_string())
                .unwrap_or_default(),
            success: true,
            metric: None,
        }]
    }
    fn rebind(&self, nodes: Vec<Node>, interface: Option<NetworkInterface>) -> Box<dyn Probe> {
        Box::new(EchoProbe { nodes, interface })
    }
}

fn echo_factory(_config: &ConfigMap, nodes: &[Node]) -> anyhow::Result<Box<dyn Probe>> {
    Ok(Box::new(EchoProbe {
        nodes: nodes.to_vec(),
        interface: None,
    }))
}

fn registry_with_echo_probe() -> Registry {
    let mut registry = Registry::builtin();
    registry.register_probe("EchoProbe", echo_factory);
    registry
}

/// Two nodes on switch A, two on switch B.
const FOUR_NODE_CSV: &str = "\
node_name,interface_name,mac_address,ip_address,switch_id,switch_ip
a1,eth0,aa:00:00:00:00:01,10.0.0.1,A,10.0.100.1
a2,eth0,aa:00:00:00:00:02,10.0.0.2,A,10.0.100.1
b1,eth0,aa:00:00:00:00:03,10.0.0.3,B,10.0.100.2
b2,eth0,aa:00:00:00:00:04,10.0.0.4,B,10.0.100.2
";

fn write_spec(dir: &Path, manager_type: &str, csv_path: &Path, report_path: &Path) -> std::path::PathBuf {
    let spec = format!(
        r#"
[[scanners]]
type = "CSVScanner"
config = {{ csv_file = "{csv}" }}

[[managers]]
type = "{manager_type}"
[[managers.probes]]
type = "EchoProbe"

[[reporters]]
type = "JSONReporter"
config = {{ output_file = "{report}" }}
"#,
        csv = csv_path.display(),
        report = report_path.display(),
    );
    let path = dir.join("spec.toml");
    fs::write(&path, spec).unwrap();
    path
}

async fn run_scenario(manager_type: &str, csv_data: &str) -> (Vec<ExecutionResult>, serde_json::Value) {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("nodes.csv");
    fs::write(&csv_path, csv_data).unwrap();
    let report_path = dir.path().join("report.json");
    let spec_path = write_spec(dir.path(), manager_type, &csv_path, &report_path);

    let pipeline = Pipeline::load(&spec_path, registry_with_echo_probe()).unwrap();
    let results = pipeline.run().await.unwrap();

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    (results, report)
}

#[tokio::test]
async fn intra_switch_tests_exactly_one_pair_per_switch() {
    let (results, report) = run_scenario("IntraSwitchConnectivityTestManager", FOUR_NODE_CSV).await;

    let pairs: Vec<&str> = results.iter().map(|r| r.node.as_str()).collect();
    assert_eq!(pairs, vec!["a1->a2", "b1->b2"]);

    // The report mirrors the aggregated results.
    assert_eq!(report["results"].as_array().unwrap().len(), 2);
    assert_eq!(report["results"][0]["node"], "a1->a2");
}

#[tokio::test]
async fn inter_switch_never_pairs_within_a_switch() {
    let (results, _) = run_scenario("InterSwitchConnectivityTestManager", FOUR_NODE_CSV).await;

    assert_eq!(results.len(), 2 * 2 * 2);
    for result in &results {
        let (src, dst) = result.node.split_once("->").unwrap();
        assert_ne!(src.as_bytes()[0], dst.as_bytes()[0], "same-switch pair {src}->{dst}");
    }
}

fn sixteen_node_csv() -> String {
    let mut csv =
        String::from("node_name,interface_name,mac_address,ip_address,switch_id,switch_ip\n");
    for i in 0..16 {
        let switch = if i < 8 { "A" } else { "B" };
        csv.push_str(&format!(
            "n{i},eth0,aa:00:00:00:01:{i:02x},10.0.1.{},{switch},10.0.100.{}\n",
            i + 1,
            if i < 8 { 1 } else { 2 },
        ));
    }
    csv
}

#[tokio::test]
async fn sixteen_nodes_two_switches_inter_pair_count() {
    let (results, _) = run_scenario("InterSwitchConnectivityTestManager", &sixteen_node_csv()).await;
    // 8 nodes per side, both directions across the two groups.
    assert_eq!(results.len(), 8 * 8 * 2);
}

#[tokio::test]
async fn sixteen_nodes_all_to_all_pair_count() {
    let (results, _) = run_scenario("AllToAllConnectivityTestManager", &sixteen_node_csv()).await;
    assert_eq!(results.len(), 16 * 15);
}

#[tokio::test]
async fn unknown_manager_type_fails_before_any_stage() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("nodes.csv");
    fs::write(&csv_path, FOUR_NODE_CSV).unwrap();
    let report_path = dir.path().join("report.json");
    let spec_path = write_spec(dir.path(), "NoSuchManager", &csv_path, &report_path);

    let err = Pipeline::load(&spec_path, registry_with_echo_probe()).unwrap_err();
    match err {
        ConfigError::UnknownType { name, valid, .. } => {
            assert_eq!(name, "NoSuchManager");
            assert!(valid.contains(&"AllToAllConnectivityTestManager".to_owned()));
        }
        other => panic!("expected UnknownType, got {other}"),
    }
    // Nothing ran, nothing was reported.
    assert!(!report_path.exists());
}

#[tokio::test]
async fn missing_spec_file_is_fatal() {
    let err = Pipeline::load(Path::new("/nonexistent/spec.toml"), Registry::builtin()).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[tokio::test]
async fn reporter_io_error_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("nodes.csv");
    fs::write(&csv_path, FOUR_NODE_CSV).unwrap();
    let spec_path = write_spec(
        dir.path(),
        "IntraSwitchConnectivityTestManager",
        &csv_path,
        Path::new("/nonexistent-dir/report.json"),
    );

    let pipeline = Pipeline::load(&spec_path, registry_with_echo_probe()).unwrap();
    let err = pipeline.run().await.unwrap_err();
    assert!(err.to_string().contains("JSONReporter"));
}
