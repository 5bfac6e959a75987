use thiserror::Error;

/// Errors raised while decoding, resolving or indexing a snapshot.
///
/// Everything except `Io`/`Json`/`Storage` means the snapshot itself is
/// inconsistent and the current operation must stop.
#[derive(Error, Debug)]
pub enum RefdocError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Base64 payload error: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Invalid {table} id {id} (table holds {len} entries)")]
    InvalidId {
        table: &'static str,
        id: i64,
        len: usize,
    },
    #[error("Schema mismatch for {kind}: expected {expected} fields, found {found} in {raw:?}")]
    SchemaMismatch {
        kind: &'static str,
        expected: usize,
        found: usize,
        raw: String,
    },
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Unknown type {id}: {raw}")]
    UnknownType { id: u32, raw: String },
    #[error("Type variable substitution for {id} exceeded {hops} hops")]
    SubstitutionLoop { id: u32, hops: usize },
    #[error("Type {0} inherits from itself")]
    InheritanceCycle(u32),
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    #[error("Relationship graph queried while {0}")]
    NotReady(String),
    #[error("Index storage error: {0}")]
    Storage(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RefdocError> for refdoc_api::ApiError {
    fn from(err: RefdocError) -> Self {
        match err {
            RefdocError::NotReady(state) => refdoc_api::ApiError::NotReady(state),
            RefdocError::InvalidQuery(msg) => refdoc_api::ApiError::InvalidArgument(msg),
            RefdocError::Storage(msg) => refdoc_api::ApiError::Storage(msg),
            other => refdoc_api::ApiError::Internal(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, RefdocError>;
