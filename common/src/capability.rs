//! The four pluggable roles of the pipeline.
//!
//! High-level stages depend only on these traits; concrete scanners, probes,
//! managers and reporters are resolved by name through the registry and
//! constructed from free-form config tables. This keeps the orchestration
//! logic decoupled from any particular implementation.

use std::fmt;

use async_trait::async_trait;
use tracing::debug;

use crate::error::ProbeError;
use crate::model::{ExecutionResult, NetworkInterface, Node};

/// Free-form `config` map attached to every capability declaration.
pub type ConfigMap = toml::value::Table;

/// The closed set of capability roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityKind {
    Scanner,
    Probe,
    Manager,
    Reporter,
}

impl CapabilityKind {
    /// Extension directory subfolder holding this kind's plugin manifests.
    pub fn subdir(&self) -> &'static str {
        match self {
            CapabilityKind::Scanner => "scanners",
            CapabilityKind::Probe => "probes",
            CapabilityKind::Manager => "managers",
            CapabilityKind::Reporter => "reporters",
        }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityKind::Scanner => write!(f, "scanner"),
            CapabilityKind::Probe => write!(f, "probe"),
            CapabilityKind::Manager => write!(f, "manager"),
            CapabilityKind::Reporter => write!(f, "reporter"),
        }
    }
}

/// Produces the node inventory.
#[async_trait]
pub trait Scanner: Send + Sync {
    /// Checks the scanner's own preconditions (required external tools,
    /// readable inputs). Called once before any scan runs; an error here is
    /// fatal to the whole run.
    fn validate(&self) -> anyhow::Result<()>;

    async fn scan(&self) -> anyhow::Result<Vec<Node>>;
}

impl fmt::Debug for dyn Scanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dyn Scanner")
    }
}

/// Raw capture from one (node, interface) combination of a probe's Execute
/// step, before parsing.
#[derive(Debug, Clone)]
pub struct Observation {
    pub node: String,
    pub interface: String,
    pub output: String,
    /// Whether the external command exited cleanly. A failed command is
    /// data, not an error.
    pub command_ok: bool,
}

/// One diagnostic action against one or two bound nodes.
///
/// The lifecycle is fixed: Validate-Nodes, Validate-Interface, Execute,
/// Parse. Implementations supply the accessors plus [`execute`](Probe::execute)
/// and [`parse`](Probe::parse); the validation steps and the driver are
/// provided here so every probe enforces the same arity rules.
#[async_trait]
pub trait Probe: Send + Sync {
    fn nodes(&self) -> &[Node];
    fn interface(&self) -> Option<&NetworkInterface>;
    /// The command template this probe wraps, for logging.
    fn command(&self) -> &str;

    /// A probe acts on exactly one or two nodes.
    fn validate_nodes(&self) -> Result<(), ProbeError> {
        let count = self.nodes().len();
        if !(1..=2).contains(&count) {
            return Err(ProbeError::NodeArity(count));
        }
        Ok(())
    }

    /// A two-endpoint test must be unambiguous about the physical path.
    fn validate_interface(&self) -> Result<(), ProbeError> {
        if self.nodes().len() == 2 && self.interface().is_none() {
            return Err(ProbeError::MissingInterface);
        }
        Ok(())
    }

    /// Runs the external command for every (node, interface) combination,
    /// capturing each outcome independently. One combination failing must
    /// not abort the others.
    async fn execute(&self) -> Vec<Observation>;

    /// Turns raw observations into structured results.
    fn parse(&self, observations: Vec<Observation>) -> Vec<ExecutionResult>;

    /// Drives the full lifecycle. Validation failures abort this invocation;
    /// command failures surface as `success = false` results.
    async fn run(&self) -> Result<Vec<ExecutionResult>, ProbeError> {
        debug!("running probe with command template: {}", self.command());
        self.validate_nodes()?;
        self.validate_interface()?;
        let observations = self.execute().await;
        Ok(self.parse(observations))
    }

    /// Clones this probe bound to a different node set and interface.
    /// Topology-aware managers use this to stamp out one probe per pair.
    fn rebind(&self, nodes: Vec<Node>, interface: Option<NetworkInterface>) -> Box<dyn Probe>;
}

/// Orchestrates probes over a node set or pair set.
#[async_trait]
pub trait Manager: Send + Sync {
    /// Runs every bound probe and aggregates results in a deterministic
    /// order. Probe validation errors are logged and excluded, never
    /// propagated.
    async fn run(&self) -> Vec<ExecutionResult>;
}

/// Persists or emits aggregated results. I/O errors propagate: a report that
/// silently fails to write is a correctness problem for the operator.
pub trait Reporter: Send + Sync {
    fn report(&self, results: &[ExecutionResult]) -> anyhow::Result<()>;

    fn report_one(&self, result: &ExecutionResult) -> anyhow::Result<()> {
        self.report(std::slice::from_ref(result))
    }
}

// Factory entry points the registry resolves by name. Plain fn pointers keep
// registration explicit and the tables trivially clonable.

pub type ScannerFactory = fn(&ConfigMap) -> anyhow::Result<Box<dyn Scanner>>;

/// Probes receive the node inventory produced by the scan stage.
pub type ProbeFactory = fn(&ConfigMap, &[Node]) -> anyhow::Result<Box<dyn Probe>>;

/// Managers receive their already-constructed probes plus the inventory
/// (topology-aware managers compute pair sets from it).
pub type ManagerFactory =
    fn(&ConfigMap, Vec<Box<dyn Probe>>, &[Node]) -> anyhow::Result<Box<dyn Manager>>;

pub type ReporterFactory = fn(&ConfigMap) -> anyhow::Result<Box<dyn Reporter>>;
