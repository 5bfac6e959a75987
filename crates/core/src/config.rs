use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_INDEX_DIR: &str = ".refdoc/indices";
pub const INDEX_DIR_ENV: &str = "REFDOC_INDEX_DIR";

/// Marker base classes whose subclasses are grouped on the home page.
pub const DEFAULT_EVENT_BASE_CLASSES: [&str; 5] = [
    "dev.latvian.mods.kubejs.event.EventJS",
    "net.fabricmc.fabric.api.event.Event",
    "dev.architectury.event.Event",
    "dev.latvian.mods.kubejs.recipe.RecipeJS",
    "net.minecraftforge.eventbus.api.Event",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefdocConfig {
    pub event_base_classes: Vec<String>,
    /// Cap on type-variable to type-variable hops before a chain is
    /// considered cyclic.
    pub substitution_hop_limit: usize,
    /// Cap on how many owner types are merged into a parameterized type's map.
    pub owner_walk_limit: usize,
    pub cache_dir: Option<PathBuf>,
}

impl Default for RefdocConfig {
    fn default() -> Self {
        Self {
            event_base_classes: DEFAULT_EVENT_BASE_CLASSES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            substitution_hop_limit: 1000,
            owner_walk_limit: 100,
            cache_dir: None,
        }
    }
}

impl RefdocConfig {
    /// Reads a JSON config file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: RefdocConfig = serde_json::from_str(&content)?;
        Ok(config.with_env())
    }

    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    fn with_env(mut self) -> Self {
        if let Ok(dir) = std::env::var(INDEX_DIR_ENV) {
            self.cache_dir = Some(PathBuf::from(dir));
        }
        self
    }

    /// Directory holding persisted indices.
    pub fn index_dir(&self) -> PathBuf {
        if let Some(dir) = &self.cache_dir {
            return dir.clone();
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_INDEX_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: RefdocConfig =
            serde_json::from_str(r#"{"substitution_hop_limit": 16}"#).unwrap();
        assert_eq!(config.substitution_hop_limit, 16);
        assert_eq!(config.owner_walk_limit, 100);
        assert_eq!(config.event_base_classes.len(), 5);
    }

    #[test]
    fn test_explicit_cache_dir_wins() {
        let config = RefdocConfig {
            cache_dir: Some(PathBuf::from("/tmp/refdoc-test")),
            ..Default::default()
        };
        assert_eq!(config.index_dir(), PathBuf::from("/tmp/refdoc-test"));
    }
}
