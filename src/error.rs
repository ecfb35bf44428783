//! Typed failures for version construction, descriptor parsing, and registry
//! queries, plus the one way rendering a registry back to text can fail.
//!
//! `CapabilityError::Unknown` and `CapabilityError::Disabled` are ordinary
//! probing outcomes that callers branch on. Everything else here is a build or
//! wiring defect and is surfaced as-is; retrying cannot change the result.

/// A version component or combination that cannot form a valid triple.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidVersion {
    #[error("invalid version: {component} must be a non-negative integer, got {value}")]
    Negative { component: &'static str, value: i64 },

    #[error("invalid version: {component} {value} does not fit in 32 bits")]
    OutOfRange { component: &'static str, value: i64 },

    #[error("invalid version: abi age {age} exceeds current {current}")]
    AgeExceedsCurrent { current: u32, age: u32 },

    #[error("invalid version: cannot parse '{input}' ({expected})")]
    Syntax {
        input: String,
        expected: &'static str,
    },
}

/// Rejections raised while turning a descriptor into a registry.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("descriptor parse error: duplicate feature '{0}'")]
    DuplicateFeature(String),

    #[error("descriptor parse error: malformed {field} version: {source}")]
    MalformedVersion {
        field: &'static str,
        #[source]
        source: InvalidVersion,
    },

    #[error("descriptor parse error: feature at position {index} has an empty name")]
    EmptyFeatureName { index: usize },

    #[error("descriptor parse error: capability matrix line {line}: {reason}")]
    MalformedMatrixLine { line: usize, reason: String },
}

/// A registry entry the capability matrix format has no way to express.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("capability matrix render error: feature '{name}' {reason}")]
    Unrepresentable { name: String, reason: &'static str },
}

/// Outcomes of registry queries that do not produce a value.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    #[error("capability error: unknown feature '{0}'")]
    Unknown(String),

    #[error("capability error: feature '{0}' is known but disabled in this build")]
    Disabled(String),

    #[error("capability error: registry queried before initialization")]
    NotInitialized,

    #[error("capability error: registry already initialized")]
    AlreadyInitialized,
}

impl ParseError {
    pub fn malformed_version(field: &'static str, source: InvalidVersion) -> Self {
        Self::MalformedVersion { field, source }
    }

    pub fn malformed_line(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedMatrixLine {
            line,
            reason: reason.into(),
        }
    }
}

impl CapabilityError {
    /// True for outcomes that describe the build rather than a caller mistake.
    pub fn is_probe_result(&self) -> bool {
        matches!(self, Self::Unknown(_) | Self::Disabled(_))
    }
}
