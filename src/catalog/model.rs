//! Capability entries and the descriptor shapes they are built from.
//!
//! `DescriptorSource` is what the build system hands over: raw integers and
//! feature tuples, not yet validated. `DescriptorFile` is its on-disk JSON form
//! (`descriptors/*.json`), which may also carry the textual capability matrix.
//! `CapabilityEntry` is the validated, immutable record the registry stores.

use crate::capability_matrix::parse_capability_matrix;
use crate::catalog::identity::{FeatureName, LoadMode};
use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Schema version accepted for descriptor documents.
pub const DESCRIPTOR_SCHEMA_VERSION: &str = "capability_descriptor_v1";

#[derive(Clone, Debug)]
/// One optional feature as recorded in a registry.
///
/// Equality and hashing consider only the name. When the entry is disabled
/// its stored mode is kept for reporting fidelity but never handed out.
pub struct CapabilityEntry {
    name: FeatureName,
    enabled: bool,
    backing_library: Option<String>,
    load_mode: LoadMode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// Three integers as supplied by the build system, before validation.
pub struct RawTriple(pub i64, pub i64, pub i64);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// `(featureName, enabled, backingLibrary, isDynamicModule)` from the descriptor.
pub struct FeatureTuple {
    pub name: String,
    pub enabled: bool,
    #[serde(default)]
    pub library: Option<String>,
    #[serde(default)]
    pub dynamic_module: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// Raw descriptor supplied at process start.
pub struct DescriptorSource {
    pub release: RawTriple,
    pub abi: RawTriple,
    #[serde(default)]
    pub deprecated_api: bool,
    #[serde(default)]
    pub features: Vec<FeatureTuple>,
}

#[derive(Clone, Debug, Deserialize)]
/// Descriptor document as stored on disk.
pub struct DescriptorFile {
    pub schema_version: String,
    #[serde(flatten)]
    pub source: DescriptorSource,
    #[serde(default)]
    pub capability_matrix: Option<String>,
}

impl CapabilityEntry {
    pub fn new(
        name: FeatureName,
        enabled: bool,
        backing_library: Option<String>,
        load_mode: LoadMode,
    ) -> Self {
        Self {
            name,
            enabled,
            backing_library,
            load_mode,
        }
    }

    pub fn name(&self) -> &FeatureName {
        &self.name
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Library named by the descriptor, whether or not the entry is enabled.
    pub fn backing_library(&self) -> Option<&str> {
        self.backing_library.as_deref()
    }

    /// The load mode, or `None` for a disabled entry.
    pub fn effective_load_mode(&self) -> Option<LoadMode> {
        self.enabled.then_some(self.load_mode)
    }

    pub(crate) fn stored_load_mode(&self) -> LoadMode {
        self.load_mode
    }
}

impl PartialEq for CapabilityEntry {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for CapabilityEntry {}

impl Hash for CapabilityEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl FeatureTuple {
    pub fn new(
        name: impl Into<String>,
        enabled: bool,
        library: Option<&str>,
        dynamic_module: bool,
    ) -> Self {
        Self {
            name: name.into(),
            enabled,
            library: library.map(str::to_string),
            dynamic_module,
        }
    }
}

impl DescriptorFile {
    /// Flatten the document into a `DescriptorSource`.
    ///
    /// Tuples parsed from `capability_matrix` follow the explicit `features`
    /// list; a name present in both is left for the parser to reject.
    pub fn into_source(self) -> Result<DescriptorSource, ParseError> {
        let mut source = self.source;
        if let Some(matrix) = self.capability_matrix.as_deref() {
            source.features.extend(parse_capability_matrix(matrix)?);
        }
        Ok(source)
    }
}
