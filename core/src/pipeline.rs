//! Staged run orchestration: scan -> build test units -> execute -> report.

use std::path::Path;

use anyhow::Context;
use tracing::info;

use meshprobe_common::error::ConfigError;
use meshprobe_common::model::{ExecutionResult, Node};

use crate::compile::{Compiler, Spec};
use crate::registry::Registry;

pub struct Pipeline {
    registry: Registry,
    spec: Spec,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Parse and Validate stages. Fails fast, before anything executes.
    pub fn load(spec_path: &Path, registry: Registry) -> Result<Self, ConfigError> {
        let spec = Spec::load(spec_path)?;
        Compiler::new(&registry).validate(&spec)?;
        Ok(Self { registry, spec })
    }

    /// Runs the remaining stages in order. Scanner misconfiguration, graph
    /// instantiation errors, and reporter I/O errors are all fatal; probe
    /// failures surface as `success = false` entries in the results instead.
    pub async fn run(&self) -> anyhow::Result<Vec<ExecutionResult>> {
        let compiler = Compiler::new(&self.registry);

        let scanners = compiler.scanners(&self.spec)?;
        for (scanner, decl) in scanners.iter().zip(&self.spec.scanners) {
            scanner
                .validate()
                .with_context(|| format!("scanner '{}' failed validation", decl.type_name))?;
        }

        let mut inventory: Vec<Node> = Vec::new();
        for (scanner, decl) in scanners.iter().zip(&self.spec.scanners) {
            info!("running scanner: {}", decl.type_name);
            let nodes = scanner
                .scan()
                .await
                .with_context(|| format!("scanner '{}' failed", decl.type_name))?;
            info!("scanner '{}' discovered {} nodes", decl.type_name, nodes.len());
            inventory.extend(nodes);
        }

        // The inventory is read-only from here on; managers and probes only
        // ever clone out of it.
        let managers = compiler.managers(&self.spec, &inventory)?;
        let reporters = compiler.reporters(&self.spec)?;

        let mut results = Vec::new();
        for (manager, decl) in managers.iter().zip(&self.spec.managers) {
            info!("running manager: {}", decl.type_name);
            results.extend(manager.run().await);
        }
        info!("collected {} results", results.len());

        for (reporter, decl) in reporters.iter().zip(&self.spec.reporters) {
            reporter
                .report(&results)
                .with_context(|| format!("reporter '{}' failed", decl.type_name))?;
        }

        Ok(results)
    }
}
