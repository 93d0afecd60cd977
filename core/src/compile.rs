//! The config compiler: parses the declarative spec, validates every
//! declared type against the registry, and builds the executable object
//! graph.
//!
//! Stages are strictly ordered: Parse -> Validate -> Instantiate-Scanners ->
//! (the caller runs the scan) -> Instantiate-Managers/Reporters. Any error is
//! fatal; a partially built graph is never executed.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use meshprobe_common::capability::{CapabilityKind, ConfigMap, Manager, Reporter, Scanner};
use meshprobe_common::error::ConfigError;
use meshprobe_common::model::Node;

use crate::registry::Registry;

/// One `{ type, config }` capability declaration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CapabilityDecl {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub config: ConfigMap,
}

/// A manager declaration additionally nests its probes.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManagerDecl {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub config: ConfigMap,
    pub probes: Vec<CapabilityDecl>,
}

/// The parsed declarative spec. All three sections are required; an unknown
/// top-level key is a structural error.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Spec {
    pub scanners: Vec<CapabilityDecl>,
    pub managers: Vec<ManagerDecl>,
    pub reporters: Vec<CapabilityDecl>,
}

impl Spec {
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(&text)
    }
}

pub struct Compiler<'a> {
    registry: &'a Registry,
}

impl<'a> Compiler<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Checks every declared type against the registry before anything is
    /// instantiated. The error names the offending value and the full set of
    /// valid choices for that kind.
    pub fn validate(&self, spec: &Spec) -> Result<(), ConfigError> {
        let scanners = self.registry.discover_scanners();
        for decl in &spec.scanners {
            if !scanners.contains_key(&decl.type_name) {
                return Err(self.unknown(CapabilityKind::Scanner, &decl.type_name));
            }
        }

        let managers = self.registry.discover_managers();
        let probes = self.registry.discover_probes();
        for decl in &spec.managers {
            if !managers.contains_key(&decl.type_name) {
                return Err(self.unknown(CapabilityKind::Manager, &decl.type_name));
            }
            for probe_decl in &decl.probes {
                if !probes.contains_key(&probe_decl.type_name) {
                    return Err(self.unknown(CapabilityKind::Probe, &probe_decl.type_name));
                }
            }
        }

        let reporters = self.registry.discover_reporters();
        for decl in &spec.reporters {
            if !reporters.contains_key(&decl.type_name) {
                return Err(self.unknown(CapabilityKind::Reporter, &decl.type_name));
            }
        }

        debug!(
            "validated spec: {} scanners, {} managers, {} reporters",
            spec.scanners.len(),
            spec.managers.len(),
            spec.reporters.len()
        );
        Ok(())
    }

    /// Scanners have no dependency on the node inventory.
    pub fn scanners(&self, spec: &Spec) -> Result<Vec<Box<dyn Scanner>>, ConfigError> {
        let table = self.registry.discover_scanners();
        spec.scanners
            .iter()
            .map(|decl| {
                let factory = table
                    .get(&decl.type_name)
                    .ok_or_else(|| self.unknown(CapabilityKind::Scanner, &decl.type_name))?;
                factory(&decl.config).map_err(|source| ConfigError::Instantiate {
                    kind: CapabilityKind::Scanner,
                    name: decl.type_name.clone(),
                    source,
                })
            })
            .collect()
    }

    /// Managers are built after the scan: their probes take the inventory as
    /// a constructor input.
    pub fn managers(
        &self,
        spec: &Spec,
        inventory: &[Node],
    ) -> Result<Vec<Box<dyn Manager>>, ConfigError> {
        let manager_table = self.registry.discover_managers();
        let probe_table = self.registry.discover_probes();

        spec.managers
            .iter()
            .map(|decl| {
                let probes = decl
                    .probes
                    .iter()
                    .map(|probe_decl| {
                        let factory = probe_table.get(&probe_decl.type_name).ok_or_else(|| {
                            self.unknown(CapabilityKind::Probe, &probe_decl.type_name)
                        })?;
                        factory(&probe_decl.config, inventory).map_err(|source| {
                            ConfigError::Instantiate {
                                kind: CapabilityKind::Probe,
                                name: probe_decl.type_name.clone(),
                                source,
                            }
                        })
                    })
                    .collect::<Result<Vec<_>, ConfigError>>()?;

                let factory = manager_table
                    .get(&decl.type_name)
                    .ok_or_else(|| self.unknown(CapabilityKind::Manager, &decl.type_name))?;
                factory(&decl.config, probes, inventory).map_err(|source| {
                    ConfigError::Instantiate {
                        kind: CapabilityKind::Manager,
                        name: decl.type_name.clone(),
                        source,
                    }
                })
            })
            .collect()
    }

    /// Reporters are independent of the inventory.
    pub fn reporters(&self, spec: &Spec) -> Result<Vec<Box<dyn Reporter>>, ConfigError> {
        let table = self.registry.discover_reporters();
        spec.reporters
            .iter()
            .map(|decl| {
                let factory = table
                    .get(&decl.type_name)
                    .ok_or_else(|| self.unknown(CapabilityKind::Reporter, &decl.type_name))?;
                factory(&decl.config).map_err(|source| ConfigError::Instantiate {
                    kind: CapabilityKind::Reporter,
                    name: decl.type_name.clone(),
                    source,
                })
            })
            .collect()
    }

    fn unknown(&self, kind: CapabilityKind, name: &str) -> ConfigError {
        let mut valid = self.registry.names(kind);
        valid.sort();
        ConfigError::UnknownType {
            kind,
            name: name.to_owned(),
            valid,
        }
    }
}
