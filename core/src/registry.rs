//! The capability registry: name -> factory tables for the four pluggable
//! roles.
//!
//! Registration is explicit. The built-in tables come from the plugins crate;
//! callers can register additional factories directly. An optional extension
//! directory of `*_plugin.toml` manifests selects which compiled-in
//! implementations a deployment exposes, one subdirectory per capability
//! kind. A manifest declares the symbols its file provides and, when there is
//! more than one candidate, an explicit `export` hint naming the one that
//! counts:
//!
//! ```toml
//! provides = ["PingProbe", "FloodPingProbe"]
//! export = "PingProbe"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::warn;

use meshprobe_common::capability::{
    CapabilityKind, ManagerFactory, ProbeFactory, ReporterFactory, ScannerFactory,
};

const MANIFEST_SUFFIX: &str = "_plugin.toml";

/// Explicit registry configuration; there is no process-wide state.
#[derive(Debug, Clone, Default)]
pub struct RegistryConfig {
    /// Root of the extension directory. When unset, the built-in tables are
    /// exposed as-is.
    pub extension_dir: Option<PathBuf>,
}

#[derive(Deserialize)]
struct Manifest {
    provides: Vec<String>,
    #[serde(default)]
    export: Option<String>,
}

pub struct Registry {
    config: RegistryConfig,
    scanners: IndexMap<String, ScannerFactory>,
    probes: IndexMap<String, ProbeFactory>,
    managers: IndexMap<String, ManagerFactory>,
    reporters: IndexMap<String, ReporterFactory>,
}

impl Registry {
    /// All built-in implementations, no extension directory.
    pub fn builtin() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        let mut registry = Self {
            config,
            scanners: IndexMap::new(),
            probes: IndexMap::new(),
            managers: IndexMap::new(),
            reporters: IndexMap::new(),
        };
        for (name, factory) in meshprobe_plugins::builtin_scanners() {
            registry.register_scanner(name, factory);
        }
        for (name, factory) in meshprobe_plugins::builtin_probes() {
            registry.register_probe(name, factory);
        }
        for (name, factory) in meshprobe_plugins::builtin_managers() {
            registry.register_manager(name, factory);
        }
        for (name, factory) in meshprobe_plugins::builtin_reporters() {
            registry.register_reporter(name, factory);
        }
        registry
    }

    pub fn register_scanner(&mut self, name: impl Into<String>, factory: ScannerFactory) {
        self.scanners.insert(name.into(), factory);
    }

    pub fn register_probe(&mut self, name: impl Into<String>, factory: ProbeFactory) {
        self.probes.insert(name.into(), factory);
    }

    pub fn register_manager(&mut self, name: impl Into<String>, factory: ManagerFactory) {
        self.managers.insert(name.into(), factory);
    }

    pub fn register_reporter(&mut self, name: impl Into<String>, factory: ReporterFactory) {
        self.reporters.insert(name.into(), factory);
    }

    pub fn discover_scanners(&self) -> IndexMap<String, ScannerFactory> {
        self.discover(CapabilityKind::Scanner, &self.scanners)
    }

    pub fn discover_probes(&self) -> IndexMap<String, ProbeFactory> {
        self.discover(CapabilityKind::Probe, &self.probes)
    }

    pub fn discover_managers(&self) -> IndexMap<String, ManagerFactory> {
        self.discover(CapabilityKind::Manager, &self.managers)
    }

    pub fn discover_reporters(&self) -> IndexMap<String, ReporterFactory> {
        self.discover(CapabilityKind::Reporter, &self.reporters)
    }

    /// Names currently visible for `kind`, for validation error messages.
    pub fn names(&self, kind: CapabilityKind) -> Vec<String> {
        match kind {
            CapabilityKind::Scanner => self.discover_scanners().keys().cloned().collect(),
            CapabilityKind::Probe => self.discover_probes().keys().cloned().collect(),
            CapabilityKind::Manager => self.discover_managers().keys().cloned().collect(),
            CapabilityKind::Reporter => self.discover_reporters().keys().cloned().collect(),
        }
    }

    /// Resolves the visible mapping for one kind.
    ///
    /// A pure function of the tables and the directory contents: repeated
    /// calls against an unchanged filesystem return identical mappings.
    fn discover<F: Copy>(
        &self,
        kind: CapabilityKind,
        table: &IndexMap<String, F>,
    ) -> IndexMap<String, F> {
        let Some(root) = &self.config.extension_dir else {
            return table.clone();
        };
        let dir = root.join(kind.subdir());

        let mut files: Vec<PathBuf> = match fs::read_dir(&dir) {
            Ok(entries) => entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| {
                    path.file_name()
                        .and_then(|name| name.to_str())
                        .is_some_and(|name| name.ends_with(MANIFEST_SUFFIX))
                })
                .collect(),
            Err(e) => {
                warn!(
                    "cannot read {kind} extension directory '{}': {e}",
                    dir.display()
                );
                return IndexMap::new();
            }
        };
        // Directory enumeration order is filesystem-dependent; sort so the
        // last-file-wins rule is reproducible.
        files.sort();

        let mut discovered = IndexMap::new();
        for file in files {
            if let Some((name, factory)) = resolve_manifest(&file, table) {
                // Last file wins for a repeated name.
                discovered.insert(name, factory);
            }
        }
        discovered
    }
}

/// Resolves one manifest to a (name, factory) entry, or skips it with a
/// warning. A broken file never aborts discovery.
fn resolve_manifest<F: Copy>(path: &Path, table: &IndexMap<String, F>) -> Option<(String, F)> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            warn!("skipping plugin file '{}': {e}", path.display());
            return None;
        }
    };
    let manifest: Manifest = match toml::from_str(&text) {
        Ok(manifest) => manifest,
        Err(e) => {
            warn!("skipping plugin file '{}': {e}", path.display());
            return None;
        }
    };

    // The export hint decides when more than one candidate exists; otherwise
    // the first known symbol in the file wins.
    let candidates: Vec<&String> = match &manifest.export {
        Some(symbol) => vec![symbol],
        None => manifest.provides.iter().collect(),
    };
    for symbol in candidates {
        if let Some(factory) = table.get(symbol.as_str()) {
            return Some((symbol.clone(), *factory));
        }
    }
    warn!(
        "skipping plugin file '{}': no known implementation among {:?}",
        path.display(),
        manifest.provides
    );
    None
}
