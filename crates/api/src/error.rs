/// Failures a documentation front end has to tell apart.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A query target that names no type in the snapshot.
    #[error("{0} not found in the snapshot")]
    NotFound(String),
    #[error("Invalid query: {0}")]
    InvalidArgument(String),
    /// Queried before `prepare` finished; carries the session state.
    #[error("Documentation index is not ready (state: {0})")]
    NotReady(String),
    /// The stored index could not be written or removed. The in-memory
    /// index is unaffected.
    #[error("Index storage failed: {0}")]
    Storage(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Stable kebab-case code, used in JSON output.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not-found",
            ApiError::InvalidArgument(_) => "invalid-argument",
            ApiError::NotReady(_) => "not-ready",
            ApiError::Storage(_) => "storage",
            ApiError::Internal(_) => "internal",
        }
    }

    /// Whether the same request can succeed once the session is prepared.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::NotReady(_))
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self.code(),
            "message": self.to_string(),
        })
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_and_retry() {
        let not_ready = ApiError::NotReady("indexing".to_string());
        assert_eq!(not_ready.code(), "not-ready");
        assert!(not_ready.is_retryable());

        let missing = ApiError::NotFound("class 'demo.Missing'".to_string());
        assert!(!missing.is_retryable());
        assert_eq!(
            missing.to_json(),
            serde_json::json!({
                "error": "not-found",
                "message": "class 'demo.Missing' not found in the snapshot",
            })
        );
    }
}
