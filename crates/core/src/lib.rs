pub mod config;
pub mod error;
pub mod logging;

pub mod facade;
pub mod graph;
pub mod indexer;
pub mod model;
pub mod render;
pub mod search;
pub mod session;
pub mod snapshot;
pub mod substitution;
pub mod types;

pub use error::Result;
pub use facade::SessionHandle;
