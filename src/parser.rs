//! Decoding of npm audit responses into [`Advisory`] records.
//!
//! The audit endpoint answers with an object whose `advisories` member maps
//! advisory ids to advisory objects. [`AdvisoryFeedParser`] walks that object
//! in document order and produces one [`Advisory`] per member.
//!
//! # Example
//!
//! ```
//! use nodeaudit::AdvisoryFeedParser;
//! use serde_json::json;
//!
//! let document = json!({
//!     "advisories": {
//!         "118": {
//!             "id": 118,
//!             "module_name": "minimatch",
//!             "severity": "high",
//!             "findings": [{ "version": "0.3.0", "paths": ["minimatch"] }],
//!             "cves": ["CVE-2016-10540"]
//!         }
//!     }
//! });
//!
//! let advisories = AdvisoryFeedParser::new().parse(&document)?;
//! assert_eq!(advisories[0].version.as_deref(), Some("0.3.0"));
//! # Ok::<(), nodeaudit::ParseError>(())
//! ```

use serde_json::{Map, Value};
use std::io::Read;
use tracing::debug;

use crate::error::{ParseError, Result};
use crate::model::Advisory;

/// Stateless parser for npm audit advisory feeds.
///
/// Any malformed value aborts the whole parse; no partial output is returned.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdvisoryFeedParser;

impl AdvisoryFeedParser {
    pub fn new() -> Self {
        Self
    }

    /// Parses an already-deserialized audit response.
    ///
    /// Advisories are returned in the order their keys appear in the
    /// `advisories` object. The keys themselves are ignored; each advisory's
    /// own `id` is authoritative.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Structure`] if the document or any nested value
    /// has the wrong shape, and [`ParseError::Field`] if an advisory lacks an
    /// integer `id`.
    pub fn parse(&self, document: &Value) -> Result<Vec<Advisory>> {
        debug!("parsing npm audit response");

        let root = expect_object(document, "$")?;
        let advisories = expect_object(required(root, "advisories", "$")?, "advisories")?;

        let mut parsed = Vec::with_capacity(advisories.len());
        for (key, value) in advisories {
            parsed.push(parse_advisory(value, &format!("advisories.{key}"))?);
        }

        debug!(count = parsed.len(), "parsed npm audit advisories");
        Ok(parsed)
    }

    /// Parses an audit response from JSON text.
    pub fn parse_str(&self, text: &str) -> Result<Vec<Advisory>> {
        let document: Value = serde_json::from_str(text)?;
        self.parse(&document)
    }

    /// Parses an audit response read to completion from `reader`.
    pub fn parse_reader<R: Read>(&self, reader: R) -> Result<Vec<Advisory>> {
        let document: Value = serde_json::from_reader(reader)?;
        self.parse(&document)
    }
}

fn parse_advisory(value: &Value, path: &str) -> Result<Advisory> {
    let object = expect_object(value, path)?;

    let mut advisory = Advisory::new(parse_id(object, path)?);
    advisory.overview = optional_string(object, "overview", path)?;
    advisory.references = optional_string(object, "references", path)?;
    advisory.created = optional_string(object, "created", path)?;
    advisory.updated = optional_string(object, "updated", path)?;
    advisory.recommendation = optional_string(object, "recommendation", path)?;
    advisory.title = optional_string(object, "title", path)?;
    advisory.module_name = optional_string(object, "module_name", path)?;
    advisory.vulnerable_versions = optional_string(object, "vulnerable_versions", path)?;
    advisory.patched_versions = optional_string(object, "patched_versions", path)?;
    advisory.access = optional_string(object, "access", path)?;
    advisory.severity = optional_string(object, "severity", path)?;
    advisory.cwe = optional_string(object, "cwe", path)?;

    // Every finding with a path equal to the module name overwrites the
    // version, so the last match in traversal order wins.
    let findings_path = format!("{path}.findings");
    let findings = expect_array(required(object, "findings", path)?, &findings_path)?;
    for (i, finding) in findings.iter().enumerate() {
        let finding_path = format!("{findings_path}[{i}]");
        let finding = expect_object(finding, &finding_path)?;
        let found_version = optional_string(finding, "version", &finding_path)?;

        let paths_path = format!("{finding_path}.paths");
        let paths = expect_array(required(finding, "paths", &finding_path)?, &paths_path)?;
        for (j, dependency_path) in paths.iter().enumerate() {
            let dependency_path = match dependency_path {
                Value::String(s) => s,
                other => {
                    return Err(structure_error(&format!("{paths_path}[{j}]"), "string", other))
                }
            };
            if advisory.module_name.as_deref() == Some(dependency_path.as_str()) {
                advisory.version = found_version.clone();
            }
        }
    }

    advisory.cves = parse_cves(object, path)?;

    Ok(advisory)
}

fn parse_id(object: &Map<String, Value>, path: &str) -> Result<i64> {
    let field_error = |reason: String| ParseError::Field {
        path: format!("{path}.id"),
        field: "id",
        reason,
    };

    match object.get("id") {
        Some(Value::Number(n)) => match n.as_i64() {
            Some(id) => Ok(id),
            None if n.is_u64() => Err(field_error(format!("{n} is out of range"))),
            None => Err(field_error(format!("{n} is not an integer"))),
        },
        Some(other) => Err(field_error(format!(
            "expected a number, found {}",
            type_name(other)
        ))),
        None => Err(field_error("missing".to_string())),
    }
}

fn parse_cves(object: &Map<String, Value>, path: &str) -> Result<Vec<String>> {
    let cves_path = format!("{path}.cves");
    let cves = match object.get("cves") {
        None => return Ok(Vec::new()),
        Some(value) => expect_array(value, &cves_path)?,
    };

    cves.iter()
        .enumerate()
        .map(|(i, cve)| match cve {
            Value::String(s) => Ok(s.clone()),
            other => Err(structure_error(&format!("{cves_path}[{i}]"), "string", other)),
        })
        .collect()
}

/// Reads an optional string member. Absent and `null` both mean "no value".
fn optional_string(object: &Map<String, Value>, key: &str, path: &str) -> Result<Option<String>> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(structure_error(&format!("{path}.{key}"), "string", other)),
    }
}

fn required<'a>(object: &'a Map<String, Value>, key: &str, path: &str) -> Result<&'a Value> {
    object.get(key).ok_or_else(|| ParseError::Structure {
        path: if path == "$" {
            key.to_string()
        } else {
            format!("{path}.{key}")
        },
        expected: "a member",
        found: "nothing",
    })
}

fn expect_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| structure_error(path, "object", value))
}

fn expect_array<'a>(value: &'a Value, path: &str) -> Result<&'a Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| structure_error(path, "array", value))
}

fn structure_error(path: &str, expected: &'static str, found: &Value) -> ParseError {
    ParseError::Structure {
        path: path.to_string(),
        expected,
        found: type_name(found),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
