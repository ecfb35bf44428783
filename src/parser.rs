//! Turns a raw `DescriptorSource` into a `CapabilityRegistry`.
//!
//! The parser is strict: duplicate names and malformed versions abort the
//! whole descriptor instead of producing a partially populated registry.
//! Disabled features are kept so the registry can tell "known but unavailable"
//! apart from "never heard of it".

use crate::catalog::CapabilityRegistry;
use crate::catalog::identity::{FeatureName, LoadMode};
use crate::catalog::model::{CapabilityEntry, DescriptorSource, FeatureTuple, RawTriple};
use crate::error::ParseError;
use crate::version::{AbiVersion, ReleaseVersion};
use std::collections::BTreeSet;

/// Stateless entry point for descriptor parsing.
#[derive(Clone, Copy, Debug, Default)]
pub struct DescriptorParser;

impl DescriptorParser {
    #[tracing::instrument(level = "debug", skip(source), fields(features = source.features.len()))]
    pub fn parse(source: &DescriptorSource) -> Result<CapabilityRegistry, ParseError> {
        let release = parse_release(source.release)?;
        let abi = parse_abi(source.abi)?;
        let entries = build_entries(&source.features)?;

        let registry = CapabilityRegistry::new(release, abi, source.deprecated_api, entries);
        tracing::debug!(
            %release,
            %abi,
            entries = registry.len(),
            enabled = registry.list_enabled().count(),
            deprecated_api = registry.is_deprecated_api_enabled(),
            "capability registry built"
        );
        Ok(registry)
    }
}

fn parse_release(raw: RawTriple) -> Result<ReleaseVersion, ParseError> {
    let RawTriple(major, minor, micro) = raw;
    ReleaseVersion::from_components(major, minor, micro)
        .map_err(|err| ParseError::malformed_version("release", err))
}

fn parse_abi(raw: RawTriple) -> Result<AbiVersion, ParseError> {
    let RawTriple(current, revision, age) = raw;
    AbiVersion::from_components(current, revision, age)
        .map_err(|err| ParseError::malformed_version("abi", err))
}

fn build_entries(features: &[FeatureTuple]) -> Result<Vec<CapabilityEntry>, ParseError> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut entries = Vec::with_capacity(features.len());
    for (index, tuple) in features.iter().enumerate() {
        let name = tuple.name.trim();
        if name.is_empty() {
            return Err(ParseError::EmptyFeatureName { index });
        }
        if !seen.insert(name) {
            return Err(ParseError::DuplicateFeature(name.to_string()));
        }
        entries.push(CapabilityEntry::new(
            FeatureName(name.to_string()),
            tuple.enabled,
            tuple.library.clone(),
            LoadMode::from_dynamic_flag(tuple.dynamic_module),
        ));
    }
    Ok(entries)
}
