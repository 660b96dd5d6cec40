use crate::{IndexerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = ".codeintel.toml";

const DEFAULT_MAX_CONCURRENCY: usize = 16;
const DEFAULT_EDITOR_CONFIG_DEPTH: usize = 5;
const DEFAULT_CACHE_TTL_SECS: u64 = 24 * 60 * 60;

/// Analyzer settings. Loaded from `.codeintel.toml` at the solution root (all keys
/// optional), then overridden by `CODEINTEL_*` environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Documents analyzed concurrently per wave.
    pub max_concurrency: usize,
    pub include_private_members: bool,
    pub include_forwarding_methods: bool,
    pub exclude_test_projects: bool,
    /// Name tokens marking test/sample projects.
    pub excluded_project_markers: Vec<String>,
    /// Case-insensitive path substrings, or globs when they contain `*`/`?`.
    pub exclude_patterns: Vec<String>,
    /// Parent directories searched for `.editorconfig`.
    pub editor_config_search_depth: usize,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub dir: Option<PathBuf>,
    pub ttl_secs: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            include_private_members: false,
            include_forwarding_methods: false,
            exclude_test_projects: true,
            excluded_project_markers: [
                "Test",
                "Tests",
                "Sample",
                "Samples",
                "Example",
                "Examples",
                "Benchmark",
                "Benchmarks",
            ]
            .iter()
            .map(|s| (*s).to_string())
            .collect(),
            exclude_patterns: Vec::new(),
            editor_config_search_depth: DEFAULT_EDITOR_CONFIG_DEPTH,
            cache: CacheConfig::default(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: None,
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

impl CacheConfig {
    pub fn resolved_dir(&self) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("codeintel-cache"))
    }
}

impl AnalyzerConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| IndexerError::Config(e.to_string()))
    }

    /// Config file under `root` (if any) plus environment overrides.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE_NAME);
        let mut config = if path.is_file() {
            let raw = std::fs::read_to_string(&path)?;
            log::debug!("Loading analyzer config from {}", path.display());
            Self::from_toml_str(&raw)?
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `CODEINTEL_*` overrides read through `lookup`. Unparsable values are
    /// ignored with a warning.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = lookup("CODEINTEL_MAX_CONCURRENCY") {
            match raw.trim().parse::<usize>() {
                Ok(value) if value > 0 => self.max_concurrency = value,
                _ => log::warn!("Ignoring CODEINTEL_MAX_CONCURRENCY={raw}"),
            }
        }
        if let Some(raw) = lookup("CODEINTEL_INCLUDE_PRIVATE") {
            match parse_bool(&raw) {
                Some(value) => self.include_private_members = value,
                None => log::warn!("Ignoring CODEINTEL_INCLUDE_PRIVATE={raw}"),
            }
        }
        if let Some(raw) = lookup("CODEINTEL_CACHE_DIR") {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                self.cache.dir = Some(PathBuf::from(trimmed));
                self.cache.enabled = true;
            }
        }
        if let Some(raw) = lookup("CODEINTEL_CACHE_TTL_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(value) => self.cache.ttl_secs = value,
                Err(_) => log::warn!("Ignoring CODEINTEL_CACHE_TTL_SECS={raw}"),
            }
        }
    }

    pub fn effective_concurrency(&self) -> usize {
        self.max_concurrency.max(1)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
