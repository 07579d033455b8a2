//! Data loader for Claude Code JSONL transcripts
//!
//! Claude Code writes one JSONL transcript per session under
//! `~/.claude/projects/<encoded-project-dir>/`. Each assistant line carries
//! the model, token usage and (sometimes) a precomputed cost. The loader
//! walks those files, parses them in parallel and returns a deduplicated,
//! time-sorted snapshot of [`UsageEntry`] values.
//!
//! The search root can be overridden with the `CLAUDE_DATA_PATH` environment
//! variable or an explicit directory.
//!
//! # Examples
//!
//! ```no_run
//! use deckstat::data_loader::{DataLoader, UsageSource};
//!
//! # async fn example() -> deckstat_core::Result<()> {
//! let loader = DataLoader::discover()?;
//! let entries = loader.load_entries(None).await?;
//! println!("Loaded {} entries", entries.len());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use deckstat_core::error::{DeckstatError, Result};
use deckstat_core::types::{RawJsonlEntry, UsageEntry};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Environment variable overriding the transcript root
pub const DATA_PATH_ENV: &str = "CLAUDE_DATA_PATH";

/// Anything that can produce a snapshot of usage entries
///
/// Implementations return entries sorted ascending by timestamp, restricted
/// to `project` (exact `project_path` match) when one is given.
#[async_trait]
pub trait UsageSource: Send + Sync {
    async fn load_entries(&self, project: Option<&str>) -> Result<Vec<UsageEntry>>;
}

/// Loads usage entries from JSONL transcripts on disk
#[derive(Debug, Clone)]
pub struct DataLoader {
    root: PathBuf,
}

/// A parsed line plus the key used to drop replays of the same API response
type KeyedEntry = (Option<String>, UsageEntry);

impl DataLoader {
    /// Loader rooted at a specific directory
    pub fn from_path(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Locate the transcript root
    ///
    /// Uses `CLAUDE_DATA_PATH` when set, otherwise `~/.claude/projects`.
    ///
    /// # Errors
    ///
    /// Returns [`DeckstatError::NoDataDirectory`] if no candidate exists
    pub fn discover() -> Result<Self> {
        if let Ok(custom) = std::env::var(DATA_PATH_ENV) {
            let path = PathBuf::from(custom);
            if path.is_dir() {
                debug!("Using {} from {}", path.display(), DATA_PATH_ENV);
                return Ok(Self::from_path(path));
            }
            warn!(
                "{} points to {}, which is not a directory",
                DATA_PATH_ENV,
                path.display()
            );
        }

        let home = dirs::home_dir().ok_or(DeckstatError::NoDataDirectory)?;
        let projects = home.join(".claude").join("projects");
        if projects.is_dir() {
            debug!("Discovered Claude data directory at {}", projects.display());
            Ok(Self::from_path(projects))
        } else {
            Err(DeckstatError::NoDataDirectory)
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find all `.jsonl` files below the root, in a stable order
    pub fn find_jsonl_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(&self.root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("jsonl"))
            .collect();
        files.sort();
        files
    }

    /// Read every transcript synchronously
    ///
    /// Files are parsed in parallel; deduplication runs afterwards in file
    /// order so the first occurrence of a key always wins. A file that cannot
    /// be read is logged and skipped.
    pub fn load_all_blocking(&self) -> Result<Vec<UsageEntry>> {
        if !self.root.exists() {
            warn!("Data directory {} does not exist", self.root.display());
            return Ok(Vec::new());
        }

        let files = self.find_jsonl_files();
        info!("Found {} JSONL files to process", files.len());

        let parsed: Vec<Vec<KeyedEntry>> = files
            .par_iter()
            .map(|path| {
                self.parse_file(path).unwrap_or_else(|e| {
                    warn!("Skipping unreadable file {}: {}", path.display(), e);
                    Vec::new()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        let mut duplicates = 0usize;
        let mut entries = Vec::new();
        for (key, entry) in parsed.into_iter().flatten() {
            if let Some(key) = key {
                if !seen.insert(key) {
                    duplicates += 1;
                    continue;
                }
            }
            entries.push(entry);
        }

        if duplicates > 0 {
            debug!("Skipped {} duplicate entries", duplicates);
        }

        entries.sort_by_key(|e| e.timestamp);
        Ok(entries)
    }

    fn parse_file(&self, path: &Path) -> Result<Vec<KeyedEntry>> {
        let content = std::fs::read_to_string(path)?;
        let fallback_project = self.project_dir_name(path);

        let mut entries = Vec::new();
        for (line_no, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<RawJsonlEntry>(line) {
                Ok(raw) => {
                    let key = UsageEntry::dedup_key(&raw);
                    if let Some(entry) = UsageEntry::from_raw(raw, &fallback_project) {
                        entries.push((key, entry));
                    }
                }
                Err(e) => {
                    debug!(
                        "Skipping non-usage line {} in {}: {}",
                        line_no + 1,
                        path.display(),
                        e
                    );
                }
            }
        }

        debug!("Parsed {} entries from {}", entries.len(), path.display());
        Ok(entries)
    }

    /// Name of the first directory below the root containing `path`
    fn project_dir_name(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .ok()
            .and_then(|rel| rel.components().next())
            .filter(|_| path.parent() != Some(self.root.as_path()))
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

#[async_trait]
impl UsageSource for DataLoader {
    async fn load_entries(&self, project: Option<&str>) -> Result<Vec<UsageEntry>> {
        let loader = self.clone();
        let mut entries = tokio::task::spawn_blocking(move || loader.load_all_blocking())
            .await
            .map_err(|e| DeckstatError::Io(std::io::Error::other(e.to_string())))??;

        if let Some(project) = project {
            entries.retain(|e| e.project_path == project);
        }
        Ok(entries)
    }
}

/// Fixed in-memory snapshot, handy for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    entries: Vec<UsageEntry>,
}

impl StaticSource {
    /// Wrap entries, sorting them by timestamp
    pub fn new(mut entries: Vec<UsageEntry>) -> Self {
        entries.sort_by_key(|e| e.timestamp);
        Self { entries }
    }
}

#[async_trait]
impl UsageSource for StaticSource {
    async fn load_entries(&self, project: Option<&str>) -> Result<Vec<UsageEntry>> {
        Ok(self
            .entries
            .iter()
            .filter(|e| project.is_none_or(|p| e.project_path == p))
            .cloned()
            .collect())
    }
}
