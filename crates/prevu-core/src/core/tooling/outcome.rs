use serde_json::Value;

/// Hard, caller-visible failure from a process-spawning phase. The
/// preprocessing steps never produce one of these; they degrade into
/// diagnostics instead.
#[derive(thiserror::Error, Debug)]
#[error("{message}")]
pub struct PreviewError {
    code: &'static str,
    message: String,
    details: Value,
}

impl PreviewError {
    #[must_use]
    pub fn new(code: &'static str, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
        }
    }

    #[must_use]
    pub fn code(&self) -> &'static str {
        self.code
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn details(&self) -> &Value {
        &self.details
    }
}

pub(crate) fn preview_error(code: &'static str, message: &str, details: Value) -> PreviewError {
    PreviewError::new(code, message, details)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn carries_code_message_and_details() {
        let err = preview_error("PV903", "dependency install failed", json!({ "code": 1 }));
        assert_eq!(err.code(), "PV903");
        assert_eq!(err.to_string(), "dependency install failed");
        assert_eq!(err.details()["code"], json!(1));
    }
}
