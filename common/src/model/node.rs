use std::sync::Arc;

use super::{Gpu, NetworkInterface, NetworkSwitch};

/// A discovered network endpoint.
///
/// The id may stay unset until a scanner assigns one (discovery scanners use
/// the first MAC they see). The switch reference is a weak association: many
/// nodes may point at the same [`NetworkSwitch`], hence the [`Arc`].
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: Option<String>,
    pub hostname: String,
    pub network_interfaces: Vec<NetworkInterface>,
    pub gpus: Vec<Gpu>,
    pub network_switch: Option<Arc<NetworkSwitch>>,
}

impl Node {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            id: None,
            hostname: hostname.into(),
            network_interfaces: Vec::new(),
            gpus: Vec::new(),
            network_switch: None,
        }
    }

    /// The switch grouping key. `None` means "no switch assigned", which is
    /// itself a valid group shared by every unattached node.
    pub fn switch_id(&self) -> Option<&str> {
        self.network_switch.as_deref().map(|s| s.id.as_str())
    }

    pub fn first_active_interface(&self) -> Option<&NetworkInterface> {
        self.network_interfaces.iter().find(|i| i.is_active)
    }

    /// Identifier used in results: the assigned id, else the hostname.
    pub fn label(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.hostname)
    }
}
