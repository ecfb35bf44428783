//! Capability registry wiring.
//!
//! `model` holds the entry type and the raw descriptor shapes, `index` the
//! immutable `CapabilityRegistry` with its queries, and `repository` the
//! write-once cell that publishes a registry to the rest of the process.

pub mod identity;
pub mod index;
pub mod model;
pub mod repository;

pub use identity::{FeatureName, LoadMode};
pub use index::CapabilityRegistry;
pub use model::{
    CapabilityEntry, DESCRIPTOR_SCHEMA_VERSION, DescriptorFile, DescriptorSource, FeatureTuple,
    RawTriple,
};
pub use repository::{RegistryCell, RegistryState, global};

