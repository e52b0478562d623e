use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::diagnostic::{DiagnosticKind, Diagnostics};

/// One file exactly as the generation pipeline emitted it. Both fields stay
/// raw JSON so a malformed record can be rejected per-file instead of
/// failing the whole batch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSourceFile {
    #[serde(default)]
    pub path: Value,
    #[serde(default)]
    pub content: Value,
}

impl RawSourceFile {
    pub fn new(path: impl Into<Value>, content: impl Into<Value>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// A validated generated file. Path is relative and forward-slash segmented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: String,
    pub content: String,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Validate raw generator records, dropping malformed ones per-file with a
/// diagnostic.
pub fn validate_sources(raw: Vec<RawSourceFile>, diagnostics: &mut Diagnostics) -> Vec<SourceFile> {
    let mut files = Vec::with_capacity(raw.len());
    for record in raw {
        let path = match record.path {
            Value::String(path) if !path.is_empty() => path,
            other => {
                diagnostics.push(
                    DiagnosticKind::InvalidSourceFile,
                    format!("skipping record: path is {}", json_kind(&other)),
                );
                continue;
            }
        };
        let content = match record.content {
            Value::String(content) => content,
            other => {
                diagnostics.push(
                    DiagnosticKind::InvalidSourceFile,
                    format!("skipping `{path}`: content is {}", json_kind(&other)),
                );
                continue;
            }
        };
        files.push(SourceFile { path, content });
    }
    files
}

pub fn find_file<'a>(files: &'a [SourceFile], path: &str) -> Option<&'a SourceFile> {
    files.iter().find(|file| file.path == path)
}

pub fn file_content<'a>(files: &'a [SourceFile], path: &str) -> Option<&'a str> {
    find_file(files, path).map(|file| file.content.as_str())
}

#[must_use]
pub fn has_file(files: &[SourceFile], path: &str) -> bool {
    find_file(files, path).is_some()
}

/// Replace the content at `path`, or append a new file when absent.
pub fn upsert_file(files: &mut Vec<SourceFile>, path: &str, content: impl Into<String>) {
    let content = content.into();
    match files.iter_mut().find(|file| file.path == path) {
        Some(file) => file.content = content,
        None => files.push(SourceFile {
            path: path.to_string(),
            content,
        }),
    }
}

/// Remove the file at `path`; returns whether anything was removed.
pub fn remove_file(files: &mut Vec<SourceFile>, path: &str) -> bool {
    let before = files.len();
    files.retain(|file| file.path != path);
    files.len() != before
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "an empty string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
