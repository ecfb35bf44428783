#![allow(dead_code)]

use anyhow::{Context, Result};
use mediacaps::find_repo_root;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub fn repo_root() -> PathBuf {
    find_repo_root().expect("tests require repository root")
}

pub fn caps_report_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_caps-report"))
}

/// Run a command and return its output regardless of exit status.
pub fn run_command(mut cmd: Command) -> Result<Output> {
    cmd.output()
        .with_context(|| format!("failed to run command: {:?}", cmd))
}

/// A scratch tree laid out like the repository: `schema/` plus `descriptors/`.
///
/// Descriptors written here resolve the schema next to them, the same way the
/// bundled descriptor does.
pub struct DescriptorTree {
    pub dir: TempDir,
}

impl DescriptorTree {
    pub fn new() -> Result<Self> {
        let dir = TempDir::new().context("failed to allocate descriptor tree")?;
        fs::create_dir_all(dir.path().join("schema"))?;
        fs::create_dir_all(dir.path().join("descriptors"))?;
        fs::copy(
            mediacaps::descriptor_schema_path(&repo_root()),
            dir.path().join("schema/capability_descriptor.schema.json"),
        )
        .context("copying descriptor schema")?;
        Ok(Self { dir })
    }

    pub fn write(&self, name: &str, value: &Value) -> Result<PathBuf> {
        let path = self.dir.path().join("descriptors").join(name);
        fs::write(&path, serde_json::to_vec_pretty(value)?)?;
        Ok(path)
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}
