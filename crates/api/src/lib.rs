pub mod error;
pub mod models;
pub mod service;

pub use error::{ApiError, ApiResult};
pub use models::*;
pub use service::DocumentationService;
