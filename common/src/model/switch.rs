use std::net::IpAddr;

/// A network switch nodes attach to.
///
/// Switch identity is the grouping key for topology-aware managers. A switch
/// is shared across every node attached to it and owns none of them.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkSwitch {
    pub id: String,
    pub model: String,
    pub ip_address: IpAddr,
}

impl NetworkSwitch {
    pub fn new(id: impl Into<String>, model: impl Into<String>, ip_address: IpAddr) -> Self {
        Self {
            id: id.into(),
            model: model.into(),
            ip_address,
        }
    }
}
