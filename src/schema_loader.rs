//! JSON Schema loading and instance validation for descriptor documents.
//!
//! The schema file pins its accepted `schema_version` as a `const`; the loader
//! extracts it, checks it against the allowed set, and compiles a validator.
//! Validation errors are collected into one message so a broken descriptor
//! reports every problem at once.

use anyhow::{Context, Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Result of loading and compiling a JSON Schema.
pub(crate) struct SchemaLoadResult {
    pub schema_version: String,
    pub compiled: JSONSchema,
}

/// Controls how schemas are checked before compilation.
pub(crate) struct SchemaLoadOptions<'a> {
    /// Where to find the schema_version const inside the schema payload.
    pub schema_version_pointer: &'a str,
    /// Allowed schema_version values; enforced when present.
    pub allowed_versions: Option<&'a BTreeSet<String>>,
}

impl<'a> Default for SchemaLoadOptions<'a> {
    fn default() -> Self {
        Self {
            schema_version_pointer: "/properties/schema_version/const",
            allowed_versions: None,
        }
    }
}

pub(crate) fn load_json_schema(
    path: &Path,
    options: SchemaLoadOptions<'_>,
) -> Result<SchemaLoadResult> {
    let schema_value =
        read_json(path).with_context(|| format!("loading schema {}", path.display()))?;

    let schema_version = extract_schema_version(&schema_value, options.schema_version_pointer)
        .ok_or_else(|| anyhow!("schema {} missing schema_version const", path.display()))?;

    if let Some(allowed) = options.allowed_versions {
        if !allowed.contains(&schema_version) {
            bail!(
                "schema_version '{}' not in allowed set {:?}",
                schema_version,
                allowed
            );
        }
    }

    // The compile error borrows the schema value, so flatten it to text here.
    let compiled = JSONSchema::compile(&schema_value)
        .map_err(|err| anyhow!("compiling schema {}: {err}", path.display()))?;

    Ok(SchemaLoadResult {
        schema_version,
        compiled,
    })
}

/// Validate `instance` and fold every schema violation into one error.
pub(crate) fn validate_instance(
    schema: &SchemaLoadResult,
    instance: &Value,
    label: &str,
) -> Result<()> {
    if let Err(errors) = schema.compiled.validate(instance) {
        let details = errors
            .map(|err| format!("{}: {err}", err.instance_path))
            .collect::<Vec<_>>()
            .join("\n");
        bail!("{label} failed schema validation:\n{details}");
    }
    Ok(())
}

pub(crate) fn read_json(path: &Path) -> Result<Value> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing {}", path.display()))
}

fn extract_schema_version(schema: &Value, pointer: &str) -> Option<String> {
    let version = schema.pointer(pointer).and_then(Value::as_str)?;
    if version
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        Some(version.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_only_well_formed_versions() {
        let schema =
            json!({"properties": {"schema_version": {"const": "capability_descriptor_v1"}}});
        assert_eq!(
            extract_schema_version(&schema, "/properties/schema_version/const").as_deref(),
            Some("capability_descriptor_v1")
        );

        let bad = json!({"properties": {"schema_version": {"const": "has space"}}});
        assert_eq!(
            extract_schema_version(&bad, "/properties/schema_version/const"),
            None
        );
    }

    #[test]
    fn validation_collects_instance_paths() {
        let schema = SchemaLoadResult {
            schema_version: "test_v1".into(),
            compiled: JSONSchema::compile(&json!({
                "type": "object",
                "properties": {"abi": {"type": "array", "items": {"type": "integer", "minimum": 0}}}
            }))
            .unwrap(),
        };
        assert!(validate_instance(&schema, &json!({"abi": [1, 0, 0]}), "fixture").is_ok());

        let err = validate_instance(&schema, &json!({"abi": [1, -2, 0]}), "fixture").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("fixture failed schema validation"));
        assert!(message.contains("/abi/1"));
    }
}
