//! Typed accessors over the free-form `config` tables attached to capability
//! declarations.

use anyhow::{Context, bail};

use crate::capability::ConfigMap;

pub fn str_opt<'a>(config: &'a ConfigMap, key: &str) -> Option<&'a str> {
    config.get(key).and_then(|v| v.as_str())
}

/// Fetches a required string key, with a config-shaped error message.
pub fn str_required<'a>(config: &'a ConfigMap, key: &str) -> anyhow::Result<&'a str> {
    let value = config
        .get(key)
        .with_context(|| format!("missing required config key '{key}'"))?;
    match value.as_str() {
        Some(s) => Ok(s),
        None => bail!("config key '{key}' must be a string"),
    }
}

pub fn str_or(config: &ConfigMap, key: &str, default: &str) -> String {
    str_opt(config, key).unwrap_or(default).to_owned()
}

/// A negative value is treated as absent, not wrapped into a huge unsigned.
pub fn u64_or(config: &ConfigMap, key: &str, default: u64) -> u64 {
    config
        .get(key)
        .and_then(|v| v.as_integer())
        .and_then(|v| v.try_into().ok())
        .unwrap_or(default)
}

pub fn bool_or(config: &ConfigMap, key: &str, default: bool) -> bool {
    config.get(key).and_then(|v| v.as_bool()).unwrap_or(default)
}
