use crate::scanner::ProjectScanner;
use crate::{IndexerError, Result};
use codeintel_protocol::SolutionInfo;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const CACHE_SCHEMA_VERSION: u32 = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedSolution {
    pub schema_version: u32,
    pub created_at_unix_ms: u64,
    pub source_path: String,
    /// Every input file seen when the entry was written, sorted.
    pub input_files: Vec<String>,
    pub solution: SolutionInfo,
}

/// On-disk cache of whole analyzed solutions, one JSON file per solution path.
#[derive(Debug, Clone)]
pub struct SolutionCache {
    dir: PathBuf,
    ttl: Duration,
}

impl SolutionCache {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            ttl,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/<first 16 hex chars of sha256(path)>.json`.
    pub fn entry_path(&self, solution_path: &Path) -> PathBuf {
        let canonical = canonical_string(solution_path);
        let digest = Sha256::digest(canonical.as_bytes());
        let hex = format!("{digest:x}");
        self.dir.join(format!("{}.json", &hex[..16]))
    }

    /// Cached model for `solution_path` if one exists and is still fresh.
    pub async fn load(&self, solution_path: &Path) -> Result<Option<SolutionInfo>> {
        let path = self.entry_path(solution_path);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(None);
        }
        let bytes = tokio::fs::read(&path).await?;
        let cached: CachedSolution = match serde_json::from_slice(&bytes) {
            Ok(cached) => cached,
            Err(e) => {
                log::warn!("Discarding unreadable cache entry {}: {e}", path.display());
                return Ok(None);
            }
        };
        if cached.schema_version != CACHE_SCHEMA_VERSION {
            log::debug!("Cache entry {} has an old schema", path.display());
            return Ok(None);
        }

        let age_ms = unix_now_ms().saturating_sub(cached.created_at_unix_ms);
        if u128::from(age_ms) > self.ttl.as_millis() {
            log::debug!("Cache entry {} expired", path.display());
            return Ok(None);
        }

        let inputs = scan_inputs(solution_path, &cached.solution).await?;
        if inputs.files != cached.input_files {
            log::debug!("Cache entry {} no longer matches its file set", path.display());
            return Ok(None);
        }
        if inputs.newest_ms > cached.created_at_unix_ms {
            log::debug!("Cache entry {} is older than its sources", path.display());
            return Ok(None);
        }

        log::info!(
            "Loaded cached analysis for {} ({} projects)",
            cached.source_path,
            cached.solution.projects.len()
        );
        Ok(Some(cached.solution))
    }

    /// Persist `solution` atomically (tmp file + rename).
    pub async fn store(&self, solution_path: &Path, solution: &SolutionInfo) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.entry_path(solution_path);
        let created_at_unix_ms = unix_now_ms();
        let inputs = scan_inputs(solution_path, solution).await?;
        let payload = CachedSolution {
            schema_version: CACHE_SCHEMA_VERSION,
            created_at_unix_ms,
            source_path: canonical_string(solution_path),
            input_files: inputs.files,
            solution: solution.clone(),
        };
        let bytes = serde_json::to_vec(&payload)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        log::debug!("Stored analysis cache entry {}", path.display());
        Ok(path)
    }

    pub async fn invalidate(&self, solution_path: &Path) -> Result<bool> {
        let path = self.entry_path(solution_path);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

fn canonical_string(path: &Path) -> String {
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .replace('\\', "/")
}

struct InputSnapshot {
    files: Vec<String>,
    newest_ms: u64,
}

/// The solution file, every project manifest and every `.cs` file under the projects'
/// roots, with their latest mtime. A missing solution file or manifest counts as
/// "changed now".
async fn scan_inputs(solution_path: &Path, solution: &SolutionInfo) -> Result<InputSnapshot> {
    let mut manifests = Vec::new();
    if !solution_path.is_dir() {
        manifests.push(solution_path.to_path_buf());
    }
    let mut roots = Vec::new();
    for project in &solution.projects {
        manifests.push(PathBuf::from(&project.project_file_path));
        roots.extend(project.root_directories.iter().map(PathBuf::from));
    }

    tokio::task::spawn_blocking(move || {
        let mut newest_ms = 0u64;
        let mut files = Vec::new();
        for manifest in &manifests {
            match std::fs::metadata(manifest).and_then(|m| m.modified()) {
                Ok(modified) => newest_ms = newest_ms.max(system_time_ms(modified)),
                Err(_) => newest_ms = u64::MAX,
            }
        }
        for root in &roots {
            for file in ProjectScanner::new(root).scan_extension("cs") {
                if let Ok(modified) = std::fs::metadata(&file).and_then(|m| m.modified()) {
                    newest_ms = newest_ms.max(system_time_ms(modified));
                }
                files.push(file.to_string_lossy().replace('\\', "/"));
            }
        }
        files.sort_unstable();
        files.dedup();
        InputSnapshot { files, newest_ms }
    })
    .await
    .map_err(|e| IndexerError::Other(format!("cache freshness scan failed: {e}")))
}

pub(crate) fn system_time_ms(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

pub(crate) fn unix_now_ms() -> u64 {
    system_time_ms(SystemTime::now())
}
