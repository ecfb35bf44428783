//! Write-once holder for a process's capability registry.
//!
//! A cell starts `Uninitialized` and becomes `Ready` on the first successful
//! `install`; it never goes back. Queries routed through the cell before that
//! fail with `CapabilityError::NotInitialized`. Tests build their own cells or
//! bare registries; the process-wide one lives behind `global()`.

use crate::catalog::identity::LoadMode;
use crate::catalog::index::CapabilityRegistry;
use crate::error::CapabilityError;
use crate::version::AbiVersion;
use std::sync::OnceLock;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistryState {
    Uninitialized,
    Ready,
}

#[derive(Debug, Default)]
/// Late-bound, read-only slot for one `CapabilityRegistry`.
pub struct RegistryCell {
    slot: OnceLock<CapabilityRegistry>,
}

static GLOBAL: RegistryCell = RegistryCell::new();

/// The process-wide registry cell.
pub fn global() -> &'static RegistryCell {
    &GLOBAL
}

impl RegistryCell {
    pub const fn new() -> Self {
        Self {
            slot: OnceLock::new(),
        }
    }

    pub fn state(&self) -> RegistryState {
        if self.slot.get().is_some() {
            RegistryState::Ready
        } else {
            RegistryState::Uninitialized
        }
    }

    /// Publish `registry`. Only the first install wins.
    pub fn install(
        &self,
        registry: CapabilityRegistry,
    ) -> Result<&CapabilityRegistry, CapabilityError> {
        let release = *registry.release();
        if self.slot.set(registry).is_err() {
            tracing::warn!(%release, "capability registry install rejected: already initialized");
            return Err(CapabilityError::AlreadyInitialized);
        }
        let installed = self.get()?;
        tracing::info!(
            release = %installed.release(),
            abi = %installed.abi(),
            features = installed.len(),
            "capability registry ready"
        );
        Ok(installed)
    }

    pub fn get(&self) -> Result<&CapabilityRegistry, CapabilityError> {
        self.slot.get().ok_or(CapabilityError::NotInitialized)
    }

    pub fn is_supported(&self, name: &str) -> Result<bool, CapabilityError> {
        Ok(self.get()?.is_supported(name))
    }

    pub fn load_mode(&self, name: &str) -> Result<LoadMode, CapabilityError> {
        self.get()?.load_mode(name)
    }

    pub fn list_enabled(&self) -> Result<impl Iterator<Item = &str> + '_, CapabilityError> {
        Ok(self.get()?.list_enabled())
    }

    pub fn check_abi_compatibility(
        &self,
        built_against: &AbiVersion,
    ) -> Result<bool, CapabilityError> {
        Ok(self.get()?.check_abi_compatibility(built_against))
    }

    pub fn is_deprecated_api_enabled(&self) -> Result<bool, CapabilityError> {
        Ok(self.get()?.is_deprecated_api_enabled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::model::{DescriptorSource, FeatureTuple, RawTriple};
    use crate::parser::DescriptorParser;
    use std::sync::Arc;
    use std::thread;

    fn registry(release_micro: i64) -> CapabilityRegistry {
        DescriptorParser::parse(&DescriptorSource {
            release: RawTriple(8, 16, release_micro),
            abi: RawTriple(61, 1, 19),
            deprecated_api: false,
            features: vec![FeatureTuple::new("JXL", true, Some("libjxl"), true)],
        })
        .unwrap()
    }

    #[test]
    fn queries_before_install_are_not_initialized() {
        let cell = RegistryCell::new();
        assert_eq!(cell.state(), RegistryState::Uninitialized);
        assert_eq!(cell.is_supported("JXL"), Err(CapabilityError::NotInitialized));
        assert_eq!(cell.load_mode("JXL"), Err(CapabilityError::NotInitialized));
        assert!(matches!(
            cell.list_enabled(),
            Err(CapabilityError::NotInitialized)
        ));
        assert_eq!(
            cell.check_abi_compatibility(&AbiVersion::built_against(45)),
            Err(CapabilityError::NotInitialized)
        );
        assert_eq!(
            cell.is_deprecated_api_enabled(),
            Err(CapabilityError::NotInitialized)
        );
    }

    #[test]
    fn install_transitions_once() {
        let cell = RegistryCell::new();
        cell.install(registry(1)).unwrap();
        assert_eq!(cell.state(), RegistryState::Ready);
        assert_eq!(cell.load_mode("JXL"), Ok(LoadMode::DynamicModule));
        assert_eq!(cell.list_enabled().unwrap().collect::<Vec<_>>(), ["JXL"]);

        assert_eq!(
            cell.install(registry(2)).unwrap_err(),
            CapabilityError::AlreadyInitialized
        );
        assert_eq!(cell.get().unwrap().release().micro, 1);
    }

    #[test]
    fn ready_cell_is_read_concurrently() {
        let cell = Arc::new(RegistryCell::new());
        cell.install(registry(1)).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cell = Arc::clone(&cell);
                thread::spawn(move || {
                    cell.is_supported("JXL").unwrap()
                        && cell
                            .check_abi_compatibility(&AbiVersion::built_against(50))
                            .unwrap()
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
