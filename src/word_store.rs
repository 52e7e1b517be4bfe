//! # Offline Word Store Module
//!
//! ## Purpose
//! Embedded (term, language) -> CEFR level database backing the lazy level
//! resolution of `Word`. The store answers locally when no fresher remote
//! classification is available, and is the only durable state of the engine
//! besides configuration.
//!
//! ## Input/Output Specification
//! - **Input**: level lookups, level inserts, optional JSON seed files
//! - **Output**: cached CEFR levels, store statistics
//! - **Storage**: sled embedded database with bincode-encoded values
//!
//! ## Key Features
//! - Keys are normalized (language tag + lowercased term)
//! - Seedable from a JSON file mapping language -> term -> level tag
//! - Health check and size statistics for the API surface

use crate::config::WordStoreConfig;
use crate::errors::{AnalysisError, Result};
use crate::{CefrLevel, Language};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Store statistics exposed through the stats endpoint
#[derive(Debug, Clone, Serialize)]
pub struct WordStoreStats {
    pub entries: usize,
    pub size_on_disk_bytes: u64,
}

/// Embedded offline word database
pub struct WordStore {
    db: sled::Db,
    levels: sled::Tree,
}

impl WordStore {
    /// Open the store described by the configuration and apply its seed
    /// file, if one is configured
    pub async fn open(config: &WordStoreConfig) -> Result<Self> {
        let store = Self::open_at(config.db_path.clone()).await?;

        if let Some(seed_path) = &config.seed_path {
            let imported = store.import_seed(seed_path).await?;
            tracing::info!(?seed_path, imported, "seeded word store");
        }

        Ok(store)
    }

    /// Open (or create) a store at an explicit path
    pub async fn open_at(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let db = sled::open(&path).map_err(|e| AnalysisError::WordStore {
            details: format!("failed to open {:?}: {}", path, e),
        })?;
        let levels = db.open_tree("levels")?;

        let store = Self { db, levels };
        tracing::info!(entries = store.len(), "word store opened");
        Ok(store)
    }

    fn key(term: &str, language: Language) -> Vec<u8> {
        format!("{}:{}", language.as_tag(), term.trim().to_lowercase()).into_bytes()
    }

    /// Look up the cached CEFR level for a word
    pub async fn level_for(&self, term: &str, language: Language) -> Result<Option<CefrLevel>> {
        match self.levels.get(Self::key(term, language))? {
            Some(value) => {
                let level: CefrLevel = bincode::deserialize(&value)?;
                Ok(Some(level))
            }
            None => Ok(None),
        }
    }

    /// Record the CEFR level for a word
    pub async fn insert_level(
        &self,
        term: &str,
        language: Language,
        level: CefrLevel,
    ) -> Result<()> {
        let value = bincode::serialize(&level)?;
        self.levels.insert(Self::key(term, language), value)?;
        Ok(())
    }

    /// Import a JSON seed file of the shape
    /// `{ "en": { "cat": "A1", ... }, "de": { ... } }`.
    /// Unknown language tags and level tags are skipped with a warning.
    pub async fn import_seed(&self, path: &Path) -> Result<usize> {
        let content = tokio::fs::read_to_string(path).await?;
        let seed: HashMap<String, HashMap<String, String>> = serde_json::from_str(&content)?;

        let mut imported = 0usize;
        for (language_tag, words) in seed {
            let Some(language) = Language::from_tag(&language_tag) else {
                tracing::warn!(%language_tag, "skipping unknown language in seed file");
                continue;
            };
            for (term, level_tag) in words {
                let Some(level) = CefrLevel::from_tag(&level_tag) else {
                    tracing::warn!(%term, %level_tag, "skipping unknown level tag in seed file");
                    continue;
                };
                self.insert_level(&term, language, level).await?;
                imported += 1;
            }
        }

        self.levels.flush_async().await?;
        Ok(imported)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn stats(&self) -> WordStoreStats {
        WordStoreStats {
            entries: self.levels.len(),
            size_on_disk_bytes: self.db.size_on_disk().unwrap_or(0),
        }
    }

    /// Verify the database answers reads
    pub async fn health_check(&self) -> Result<()> {
        self.levels
            .get(Self::key("health-probe", Language::English))
            .map(|_| ())
            .map_err(|e| AnalysisError::WordStore {
                details: format!("health probe failed: {}", e),
            })
    }

    /// Flush pending writes; called on shutdown
    pub async fn flush(&self) -> Result<()> {
        self.db.flush_async().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_store() -> (tempfile::TempDir, WordStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = WordStore::open_at(dir.path().join("words.db"))
            .await
            .expect("store opens");
        (dir, store)
    }

    #[tokio::test]
    async fn levels_round_trip_with_normalized_keys() {
        let (_dir, store) = temp_store().await;

        store
            .insert_level("Cat", Language::English, CefrLevel::A1)
            .await
            .expect("insert");

        let level = store
            .level_for("  cat ", Language::English)
            .await
            .expect("lookup");
        assert_eq!(level, Some(CefrLevel::A1));

        // Same term, different language, different slot.
        let other = store
            .level_for("cat", Language::German)
            .await
            .expect("lookup");
        assert_eq!(other, None);
    }

    #[tokio::test]
    async fn missing_terms_answer_none() {
        let (_dir, store) = temp_store().await;
        let level = store
            .level_for("unknown", Language::French)
            .await
            .expect("lookup");
        assert_eq!(level, None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn seed_files_import_known_languages_and_levels() {
        let (dir, store) = temp_store().await;

        let seed_path = dir.path().join("seed.json");
        tokio::fs::write(
            &seed_path,
            r#"{
                "en": { "cat": "A1", "ubiquitous": "C1", "weird": "Z9" },
                "xx": { "ignored": "A1" }
            }"#,
        )
        .await
        .expect("write seed");

        let imported = store.import_seed(&seed_path).await.expect("import");
        assert_eq!(imported, 2);

        assert_eq!(
            store.level_for("ubiquitous", Language::English).await.expect("lookup"),
            Some(CefrLevel::C1)
        );
        assert_eq!(
            store.level_for("weird", Language::English).await.expect("lookup"),
            None
        );
    }

    #[tokio::test]
    async fn health_check_passes_on_an_open_store() {
        let (_dir, store) = temp_store().await;
        store.health_check().await.expect("healthy");
        assert_eq!(store.stats().entries, 0);
    }
}
