use codeintel_protocol::ErrorEnvelope;
use codeintel_search::QueryError;
use serde::Serialize;
use serde_json::Value;

/// JSON answer of one tool call.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    value: Value,
    is_error: bool,
}

impl ToolOutput {
    pub fn success<T: Serialize + ?Sized>(payload: &T) -> Self {
        match serde_json::to_value(payload) {
            Ok(value) => Self {
                value,
                is_error: false,
            },
            Err(err) => Self::failure(ErrorEnvelope::new(
                "internal",
                format!("Failed to serialize result: {err}"),
            )),
        }
    }

    pub fn failure(envelope: ErrorEnvelope) -> Self {
        Self {
            value: envelope.to_value(),
            is_error: true,
        }
    }

    pub fn from_query_error(err: &QueryError) -> Self {
        match err {
            QueryError::Analysis(_) | QueryError::Engine(_) => log::warn!("query failed: {err}"),
            _ => log::debug!("query rejected: {err}"),
        }
        let mut envelope = ErrorEnvelope::new(err.code(), err.to_string());
        if let QueryError::NotFound { hint, .. } = err {
            if !hint.is_empty() {
                envelope = envelope.with_hint(hint.clone());
            }
        }
        Self::failure(envelope)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::failure(ErrorEnvelope::new("invalid_request", message))
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }

    /// The `code` of an error payload.
    pub fn error_code(&self) -> Option<&str> {
        if self.is_error {
            self.value.get("code").and_then(Value::as_str)
        } else {
            None
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    /// Compact JSON text sent over the wire.
    pub fn to_json_string(&self) -> String {
        self.value.to_string()
    }
}
