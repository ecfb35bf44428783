//! The capability registry: versions, deprecated-API flag, and an indexed
//! view of every declared feature.
//!
//! A registry is only ever produced by `DescriptorParser`, so name uniqueness
//! and version validity hold by construction. Nothing here mutates after
//! construction; share it by reference or behind an `Arc`.

use crate::catalog::identity::{FeatureName, LoadMode};
use crate::catalog::model::{CapabilityEntry, DESCRIPTOR_SCHEMA_VERSION, DescriptorFile};
use crate::error::CapabilityError;
use crate::parser::DescriptorParser;
use crate::schema_loader::{SchemaLoadOptions, load_json_schema, read_json, validate_instance};
use crate::version::{AbiVersion, ReleaseVersion, is_abi_compatible};
use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

const DESCRIPTOR_SCHEMA_FILE: &str = "schema/capability_descriptor.schema.json";

#[derive(Debug, Clone)]
/// Immutable capability and compatibility view of one library build.
pub struct CapabilityRegistry {
    release: ReleaseVersion,
    abi: AbiVersion,
    deprecated_api_enabled: bool,
    entries: Vec<CapabilityEntry>,
    by_name: BTreeMap<FeatureName, usize>,
}

impl CapabilityRegistry {
    pub(crate) fn new(
        release: ReleaseVersion,
        abi: AbiVersion,
        deprecated_api_enabled: bool,
        entries: Vec<CapabilityEntry>,
    ) -> Self {
        let by_name: BTreeMap<FeatureName, usize> = entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| (entry.name().clone(), idx))
            .collect();
        debug_assert_eq!(by_name.len(), entries.len(), "feature names must be unique");
        Self {
            release,
            abi,
            deprecated_api_enabled,
            entries,
            by_name,
        }
    }

    /// Load, validate, and parse a descriptor document from disk.
    ///
    /// The file is read once and checked against the bundled descriptor schema
    /// before any semantic parsing, so structural problems are reported with
    /// JSON paths. Parser rejections keep their `ParseError` reachable through
    /// `anyhow::Error::downcast_ref`.
    #[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        let value = read_json(path)?;
        Self::from_descriptor_value(value, path)
    }

    /// Validate and parse an already-read descriptor document. `origin` names
    /// the document in errors and locates the schema next to it.
    pub(crate) fn from_descriptor_value(value: Value, origin: &Path) -> Result<Self> {
        validate_against_schema(origin, &value)?;

        let descriptor: DescriptorFile = serde_json::from_value(value)
            .with_context(|| format!("loading {}", origin.display()))?;
        validate_schema_version(&descriptor)?;
        let source = descriptor
            .into_source()
            .with_context(|| format!("reading capability matrix in {}", origin.display()))?;
        DescriptorParser::parse(&source).with_context(|| format!("parsing {}", origin.display()))
    }

    /// True iff the feature is declared and enabled. Unknown names are `false`.
    pub fn is_supported(&self, name: &str) -> bool {
        let supported = self.entry(name).is_some_and(CapabilityEntry::is_enabled);
        if !supported {
            tracing::trace!(feature = name, "feature probe negative");
        }
        supported
    }

    /// How an enabled feature is provided.
    pub fn load_mode(&self, name: &str) -> Result<LoadMode, CapabilityError> {
        self.enabled_entry(name)?
            .effective_load_mode()
            .ok_or_else(|| CapabilityError::Disabled(name.to_string()))
    }

    /// Library backing an enabled feature, if the descriptor named one.
    pub fn backing_library(&self, name: &str) -> Result<Option<&str>, CapabilityError> {
        Ok(self.enabled_entry(name)?.backing_library())
    }

    /// Enabled feature names in declaration order. Each call starts over.
    pub fn list_enabled(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries
            .iter()
            .filter(|entry| entry.is_enabled())
            .map(|entry| entry.name().as_str())
    }

    /// Declared-but-disabled feature names in declaration order.
    pub fn list_disabled(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries
            .iter()
            .filter(|entry| !entry.is_enabled())
            .map(|entry| entry.name().as_str())
    }

    /// Whether a consumer built against `built_against` can use this build.
    pub fn check_abi_compatibility(&self, built_against: &AbiVersion) -> bool {
        is_abi_compatible(built_against, &self.abi)
    }

    pub fn is_deprecated_api_enabled(&self) -> bool {
        self.deprecated_api_enabled
    }

    pub fn release(&self) -> &ReleaseVersion {
        &self.release
    }

    pub fn abi(&self) -> &AbiVersion {
        &self.abi
    }

    /// Resolve an entry by exact name, enabled or not.
    pub fn entry(&self, name: &str) -> Option<&CapabilityEntry> {
        self.by_name.get(name).map(|&idx| &self.entries[idx])
    }

    /// All entries in declaration order.
    pub fn entries(&self) -> &[CapabilityEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn enabled_entry(&self, name: &str) -> Result<&CapabilityEntry, CapabilityError> {
        let entry = self
            .entry(name)
            .ok_or_else(|| CapabilityError::Unknown(name.to_string()))?;
        if !entry.is_enabled() {
            return Err(CapabilityError::Disabled(name.to_string()));
        }
        Ok(entry)
    }
}

fn validate_schema_version(descriptor: &DescriptorFile) -> Result<()> {
    if descriptor.schema_version != DESCRIPTOR_SCHEMA_VERSION {
        bail!(
            "descriptor schema_version '{}' not supported (expected {})",
            descriptor.schema_version,
            DESCRIPTOR_SCHEMA_VERSION
        );
    }
    Ok(())
}

fn validate_against_schema(descriptor_path: &Path, descriptor_value: &Value) -> Result<()> {
    let schema_path = resolve_descriptor_schema_path(descriptor_path);
    let allowed = BTreeSet::from_iter([DESCRIPTOR_SCHEMA_VERSION.to_string()]);
    let schema = load_json_schema(
        &schema_path,
        SchemaLoadOptions {
            allowed_versions: Some(&allowed),
            ..Default::default()
        },
    )
    .with_context(|| format!("loading descriptor schema {}", schema_path.display()))?;
    tracing::trace!(schema_version = %schema.schema_version, "descriptor schema loaded");

    validate_instance(
        &schema,
        descriptor_value,
        &format!("capability descriptor {}", descriptor_path.display()),
    )
}

/// Prefer a schema shipped next to the descriptor's tree, else the crate copy.
fn resolve_descriptor_schema_path(descriptor_path: &Path) -> PathBuf {
    if let Some(base) = descriptor_path.parent().and_then(|p| p.parent()) {
        let candidate = base.join(DESCRIPTOR_SCHEMA_FILE);
        if candidate.exists() {
            return candidate;
        }
    }

    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(DESCRIPTOR_SCHEMA_FILE)
}
