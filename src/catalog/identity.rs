use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;

/// Stable identifier for a capability entry (e.g., `JXL`, `HEIC`).
///
/// Lookups are exact-match and case-sensitive; the registry indexes by this
/// value so `&str` queries resolve without allocating.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureName(pub String);

/// How an enabled capability reaches the process.
///
/// Serialized as `builtin` / `module`, which is also how the capability matrix
/// and the report spell it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum LoadMode {
    BuiltIn,
    DynamicModule,
}

impl FeatureName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for FeatureName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FeatureName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl LoadMode {
    pub fn from_dynamic_flag(is_dynamic_module: bool) -> Self {
        if is_dynamic_module {
            LoadMode::DynamicModule
        } else {
            LoadMode::BuiltIn
        }
    }

    pub fn is_dynamic(self) -> bool {
        matches!(self, LoadMode::DynamicModule)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LoadMode::BuiltIn => "builtin",
            LoadMode::DynamicModule => "module",
        }
    }

    fn from_str(value: &str) -> Option<Self> {
        match value {
            "builtin" => Some(LoadMode::BuiltIn),
            "module" => Some(LoadMode::DynamicModule),
            _ => None,
        }
    }
}

impl fmt::Display for LoadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LoadMode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LoadMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::from_str(&value).ok_or_else(|| {
            serde::de::Error::unknown_variant(&value, &["builtin", "module"])
        })
    }
}
