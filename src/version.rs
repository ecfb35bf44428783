//! Release and ABI version triples.
//!
//! `ReleaseVersion` is the human-facing `major.minor.micro` number and orders
//! lexicographically. `AbiVersion` follows libtool's `current:revision:age`
//! scheme, where `age` counts how many earlier `current` values a build still
//! serves. The two never compare against each other.

use crate::error::InvalidVersion;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ReleaseVersion {
    pub major: u32,
    pub minor: u32,
    pub micro: u32,
}

/// libtool-style interface version. `age <= current` always holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct AbiVersion {
    current: u32,
    revision: u32,
    age: u32,
}

impl ReleaseVersion {
    pub fn new(major: u32, minor: u32, micro: u32) -> Self {
        Self {
            major,
            minor,
            micro,
        }
    }

    /// Build from untrusted integers, rejecting negatives and overflow.
    pub fn from_components(major: i64, minor: i64, micro: i64) -> Result<Self, InvalidVersion> {
        Ok(Self {
            major: component("major", major)?,
            minor: component("minor", minor)?,
            micro: component("micro", micro)?,
        })
    }
}

impl AbiVersion {
    pub fn new(current: u32, revision: u32, age: u32) -> Result<Self, InvalidVersion> {
        if age > current {
            return Err(InvalidVersion::AgeExceedsCurrent { current, age });
        }
        Ok(Self {
            current,
            revision,
            age,
        })
    }

    /// Build from untrusted integers, rejecting negatives, overflow, and `age > current`.
    pub fn from_components(current: i64, revision: i64, age: i64) -> Result<Self, InvalidVersion> {
        Self::new(
            component("current", current)?,
            component("revision", revision)?,
            component("age", age)?,
        )
    }

    /// The version a consumer records when it links against `current`.
    pub fn built_against(current: u32) -> Self {
        Self {
            current,
            revision: 0,
            age: 0,
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn revision(&self) -> u32 {
        self.revision
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    /// Oldest `current` this build still serves.
    pub fn oldest_supported(&self) -> u32 {
        self.current - self.age
    }

    /// Installed shared object suffix, `(current - age).age.revision`.
    pub fn soname_version(&self) -> String {
        format!("{}.{}.{}", self.oldest_supported(), self.age, self.revision)
    }
}

/// Lexicographic comparison on `(major, minor, micro)`.
pub fn compare_release(a: &ReleaseVersion, b: &ReleaseVersion) -> Ordering {
    a.cmp(b)
}

/// Whether a consumer built against `built` can run on a provider at `runtime`.
///
/// Only `built.current` matters: it must sit inside
/// `[runtime.current - runtime.age, runtime.current]`.
pub fn is_abi_compatible(built: &AbiVersion, runtime: &AbiVersion) -> bool {
    runtime.oldest_supported() <= built.current && built.current <= runtime.current
}

fn component(name: &'static str, value: i64) -> Result<u32, InvalidVersion> {
    if value < 0 {
        return Err(InvalidVersion::Negative {
            component: name,
            value,
        });
    }
    u32::try_from(value).map_err(|_| InvalidVersion::OutOfRange {
        component: name,
        value,
    })
}

fn parse_u32(part: &str, input: &str, expected: &'static str) -> Result<u32, InvalidVersion> {
    part.trim().parse::<u32>().map_err(|_| InvalidVersion::Syntax {
        input: input.to_string(),
        expected,
    })
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)
    }
}

impl fmt::Display for AbiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.current, self.revision, self.age)
    }
}

impl FromStr for ReleaseVersion {
    type Err = InvalidVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const EXPECTED: &str = "expected major.minor.micro";
        let parts: Vec<&str> = s.trim().split('.').collect();
        let [major, minor, micro] = parts.as_slice() else {
            return Err(InvalidVersion::Syntax {
                input: s.to_string(),
                expected: EXPECTED,
            });
        };
        Ok(Self::new(
            parse_u32(major, s, EXPECTED)?,
            parse_u32(minor, s, EXPECTED)?,
            parse_u32(micro, s, EXPECTED)?,
        ))
    }
}

impl FromStr for AbiVersion {
    type Err = InvalidVersion;

    /// Accepts `current:revision:age` or a bare `current`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const EXPECTED: &str = "expected current[:revision:age]";
        let parts: Vec<&str> = s.trim().split(':').collect();
        match parts.as_slice() {
            [current] => Ok(Self::built_against(parse_u32(current, s, EXPECTED)?)),
            [current, revision, age] => Self::new(
                parse_u32(current, s, EXPECTED)?,
                parse_u32(revision, s, EXPECTED)?,
                parse_u32(age, s, EXPECTED)?,
            ),
            _ => Err(InvalidVersion::Syntax {
                input: s.to_string(),
                expected: EXPECTED,
            }),
        }
    }
}
