//! The serialized class universe and its decoded, memoized tables.

pub mod decoder;
pub mod scalar;
mod tables;

pub use tables::DataTables;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// Snapshot document as exported. Records stay in their encoded form until
/// first accessed through [`DataTables`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub types: Vec<Value>,
    #[serde(default)]
    pub parameters: Vec<Value>,
    #[serde(default)]
    pub packages: Vec<PackageEntry>,
    #[serde(default)]
    pub names: Vec<NameEntry>,
    #[serde(default)]
    pub annotations: Vec<Value>,
    #[serde(default)]
    pub bindings: Vec<Value>,
}

impl Snapshot {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_slice(&bytes)
    }
}

/// A name-table entry. Long or repeated strings are split into shared
/// fragments and stored as a list of fragment ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NameEntry {
    Text(String),
    Alias(u32),
    Parts(Vec<u32>),
}

/// A package segment, optionally nested under a parent package id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PackageEntry {
    Nested(String, u32),
    Root((String,)),
    Plain(String),
}

impl PackageEntry {
    pub fn segment(&self) -> &str {
        match self {
            PackageEntry::Nested(segment, _) => segment,
            PackageEntry::Root((segment,)) => segment,
            PackageEntry::Plain(segment) => segment,
        }
    }

    pub fn parent(&self) -> Option<u32> {
        match self {
            PackageEntry::Nested(_, parent) => Some(*parent),
            _ => None,
        }
    }
}
