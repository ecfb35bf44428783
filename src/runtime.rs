//! Process startup helpers.
//!
//! Centralizes descriptor discovery and global registry initialization so the
//! CLI and embedding applications follow the same order: an explicit
//! `MEDIACAPS_DESCRIPTOR` path first, then the descriptor bundled with the
//! repository.

use crate::catalog::{CapabilityRegistry, global};
use crate::{default_descriptor_path, find_repo_root};
use anyhow::{Context, Result, bail};
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable naming a descriptor file to load instead of the default.
pub const DESCRIPTOR_ENV: &str = "MEDIACAPS_DESCRIPTOR";

/// Descriptor path from `MEDIACAPS_DESCRIPTOR`, ignoring empty values.
pub fn descriptor_override() -> Option<PathBuf> {
    env::var_os(DESCRIPTOR_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Resolve the descriptor to load for this process.
///
/// An override that points at a missing file is an error rather than a silent
/// fallback, since the caller asked for that specific build description.
pub fn resolve_descriptor_path() -> Result<PathBuf> {
    if let Some(path) = descriptor_override() {
        if !path.is_file() {
            bail!(
                "{DESCRIPTOR_ENV} points at {}, which is not a file",
                path.display()
            );
        }
        return Ok(path);
    }
    let root = find_repo_root()?;
    Ok(default_descriptor_path(&root))
}

/// Load the resolved descriptor and publish it as the process-wide registry.
pub fn init_global() -> Result<&'static CapabilityRegistry> {
    let path = resolve_descriptor_path()?;
    init_global_from(&path)
}

/// Load `path` and publish it as the process-wide registry.
///
/// Fails if a registry was already installed; the first one stays in place.
pub fn init_global_from(path: &Path) -> Result<&'static CapabilityRegistry> {
    let registry = CapabilityRegistry::load(path)?;
    global()
        .install(registry)
        .with_context(|| format!("installing registry from {}", path.display()))
}
