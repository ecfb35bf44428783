//! Serializable summary of a registry for tooling and logs.
//!
//! Entries keep declaration order so two reports of the same descriptor diff
//! cleanly. Disabled entries report no load mode.

use crate::catalog::{CapabilityRegistry, LoadMode};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CapabilityReport {
    pub release: String,
    pub abi: String,
    pub soname_version: String,
    pub oldest_compatible_current: u32,
    pub deprecated_api: bool,
    pub enabled_count: usize,
    pub disabled_count: usize,
    pub features: Vec<FeatureReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureReport {
    pub name: String,
    pub enabled: bool,
    pub library: Option<String>,
    pub load_mode: Option<LoadMode>,
}

impl CapabilityReport {
    pub fn from_registry(registry: &CapabilityRegistry) -> Self {
        let features: Vec<FeatureReport> = registry
            .entries()
            .iter()
            .map(|entry| FeatureReport {
                name: entry.name().to_string(),
                enabled: entry.is_enabled(),
                library: entry.backing_library().map(str::to_string),
                load_mode: entry.effective_load_mode(),
            })
            .collect();
        let enabled_count = features.iter().filter(|f| f.enabled).count();

        Self {
            release: registry.release().to_string(),
            abi: registry.abi().to_string(),
            soname_version: registry.abi().soname_version(),
            oldest_compatible_current: registry.abi().oldest_supported(),
            deprecated_api: registry.is_deprecated_api_enabled(),
            enabled_count,
            disabled_count: features.len() - enabled_count,
            features,
        }
    }
}
