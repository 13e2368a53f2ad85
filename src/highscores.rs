//! Best score persistence
//!
//! The session reads the best score once at construction and writes it again
//! whenever a run beats it. Where it lives is up to the embedder: the store is
//! injected behind [`BestScoreStore`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::BEST_SCORE_KEY;
use crate::error::StoreError;

/// Key-value access to the single persisted best score
pub trait BestScoreStore {
    /// Read the stored best score (0 when nothing has been stored)
    fn load_best(&self) -> Result<u64, StoreError>;

    /// Persist a new best score
    fn save_best(&mut self, score: u64) -> Result<(), StoreError>;
}

/// Process-lifetime store, used by tests and the headless driver
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    best: u64,
    pub writes: u32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_best(best: u64) -> Self {
        Self { best, writes: 0 }
    }
}

impl BestScoreStore for MemoryStore {
    fn load_best(&self) -> Result<u64, StoreError> {
        Ok(self.best)
    }

    fn save_best(&mut self, score: u64) -> Result<(), StoreError> {
        self.best = score;
        self.writes += 1;
        Ok(())
    }
}

/// On-disk layout: a flat JSON object of integer entries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(flatten)]
    entries: BTreeMap<String, u64>,
}

/// JSON file keyed by [`BEST_SCORE_KEY`]
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> Result<StoreFile, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoreFile::default()),
            Err(source) => Err(StoreError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

impl BestScoreStore for JsonFileStore {
    fn load_best(&self) -> Result<u64, StoreError> {
        let file = self.read_file()?;
        let best = file.entries.get(BEST_SCORE_KEY).copied().unwrap_or(0);
        log::info!("Loaded best score {} from {}", best, self.path.display());
        Ok(best)
    }

    fn save_best(&mut self, score: u64) -> Result<(), StoreError> {
        // Keep unrelated keys written by other tools
        let mut file = self.read_file().unwrap_or_default();
        file.entries.insert(BEST_SCORE_KEY.to_string(), score);

        let json = serde_json::to_string_pretty(&file)?;
        std::fs::write(&self.path, json).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        log::info!("Best score {} saved", score);
        Ok(())
    }
}
