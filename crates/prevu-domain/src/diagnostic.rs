use serde::{Deserialize, Serialize};

/// Why a preprocessing step skipped, removed, or rewrote something.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DiagnosticKind {
    InvalidSourceFile,
    EmptyPath,
    PathCollision,
    MalformedManifest,
    RemovedDependency,
    RemovedScript,
    RemovedFile,
    RewrittenFile,
    SynthesizedFile,
    DetectedDependency,
}

/// One non-fatal finding from preprocessing. Accumulated, never thrown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub detail: String,
}

/// Ordered accumulator threaded through every preprocessing step so callers
/// and tests can assert on exactly what was changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn push(&mut self, kind: DiagnosticKind, detail: impl Into<String>) {
        let detail = detail.into();
        tracing::debug!(kind = %kind, detail = %detail, "preview diagnostic");
        self.entries.push(Diagnostic { kind, detail });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    #[must_use]
    pub fn contains(&self, kind: DiagnosticKind) -> bool {
        self.entries.iter().any(|entry| entry.kind == kind)
    }

    #[must_use]
    pub fn count_of(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|entry| entry.kind == kind).count()
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
    }
}
