//! Capability and ABI-compatibility registry for a multi-backend media library.
//!
//! The build system describes each library build with a release version, a
//! libtool-style ABI version, a deprecated-API toggle, and the list of
//! optional codecs/subsystems it was compiled with. This crate parses that
//! descriptor once at startup into an immutable `CapabilityRegistry` and
//! answers the questions feature-gated code asks: is a feature available, is it
//! built in or a dynamically loaded module, and can a consumer built against a
//! given ABI run on this build.
//!
//! Public functions here cover repository discovery for the bundled schema and
//! descriptor; everything else is re-exported from the modules below.
#![forbid(unsafe_code)]

use anyhow::{Result, bail};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

pub mod capability_matrix;
pub mod catalog;
pub mod error;
pub mod parser;
pub mod report;
pub mod runtime;
mod schema_loader;
pub mod version;

pub use capability_matrix::{parse_capability_matrix, render_capability_matrix};
pub use catalog::{
    CapabilityEntry, CapabilityRegistry, DESCRIPTOR_SCHEMA_VERSION, DescriptorFile,
    DescriptorSource, FeatureName, FeatureTuple, LoadMode, RawTriple, RegistryCell, RegistryState,
    global,
};
pub use error::{CapabilityError, InvalidVersion, ParseError, RenderError};
pub use parser::DescriptorParser;
pub use report::{CapabilityReport, FeatureReport};
pub use version::{AbiVersion, ReleaseVersion, compare_release, is_abi_compatible};

const ROOT_SENTINEL: &str = "schema/capability_descriptor.schema.json";
const DEFAULT_DESCRIPTOR: &str = "descriptors/default.json";

/// Returns true when `candidate` carries the bundled descriptor schema.
fn is_repo_root(candidate: &Path) -> bool {
    candidate.join(ROOT_SENTINEL).is_file()
}

/// Verifies that an explicit root hint points at a valid repo.
fn repo_root_from_hint(hint: &str) -> Option<PathBuf> {
    if hint.is_empty() {
        return None;
    }
    let hint_path = PathBuf::from(hint);
    if !hint_path.exists() || !is_repo_root(&hint_path) {
        return None;
    }
    fs::canonicalize(hint_path).ok()
}

fn search_upwards(start: &Path) -> Option<PathBuf> {
    let mut dir = fs::canonicalize(start).ok()?;
    loop {
        if is_repo_root(&dir) {
            return Some(dir);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

/// Locate the directory holding the bundled schema and descriptors.
///
/// Search order: `MEDIACAPS_ROOT` if it points at a real tree, then climbing up
/// from the current executable, then the build-time hint.
pub fn find_repo_root() -> Result<PathBuf> {
    if let Ok(env_root) = env::var("MEDIACAPS_ROOT") {
        if let Some(root) = repo_root_from_hint(&env_root) {
            return Ok(root);
        }
    }

    if let Ok(exe_path) = env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            if let Some(root) = search_upwards(exe_dir) {
                return Ok(root);
            }
        }
    }

    if let Some(hint) = option_env!("MEDIACAPS_ROOT_HINT") {
        if let Some(root) = repo_root_from_hint(hint) {
            return Ok(root);
        }
    }

    bail!("Unable to locate the mediacaps tree ({ROOT_SENTINEL}). Set MEDIACAPS_ROOT.");
}

/// Path of the descriptor shipped with the repository.
pub fn default_descriptor_path(repo_root: &Path) -> PathBuf {
    repo_root.join(DEFAULT_DESCRIPTOR)
}

/// Path of the descriptor JSON Schema shipped with the repository.
pub fn descriptor_schema_path(repo_root: &Path) -> PathBuf {
    repo_root.join(ROOT_SENTINEL)
}
