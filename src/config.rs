//! Engine configuration: weights, component metadata, adjustment mode and the
//! caller-side verdict thresholds.
//!
//! TOML shape (JSON with the same keys works too):
//! ```toml
//! [weights]
//! technical = 0.30
//! orderflow = 0.25
//!
//! [components]
//! orderflow = { kind = "order_flow", reliability = 0.9 }
//!
//! [adjustment]
//! mode = "hybrid"
//! confidence_threshold = 0.7
//! consensus_threshold = 0.8
//! max_amplification = 0.15
//!
//! [thresholds]
//! buy = 60.0
//! sell = 40.0
//! ```
//!
//! Lookup: `$CONFLUENCE_CONFIG_PATH` → `config/confluence.toml` →
//! `config/confluence.json` → built-in defaults.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::RwLock,
    time::SystemTime,
};
use tracing::{info, warn};

use crate::adjust::AdjustmentMode;
use crate::components::ComponentTable;
use crate::error::ScoringError;
use crate::verdict::SignalThresholds;
use crate::weights::WeightConfig;

pub const ENV_CONFIG_PATH: &str = "CONFLUENCE_CONFIG_PATH";
pub const DEFAULT_TOML_PATH: &str = "config/confluence.toml";
pub const DEFAULT_JSON_PATH: &str = "config/confluence.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(flatten)]
    pub weighting: WeightConfig,
    #[serde(default)]
    pub adjustment: AdjustmentMode,
    #[serde(default)]
    pub thresholds: SignalThresholds,
}

impl Default for EngineConfig {
    /// Six standard lenses with their usual production weights,
    /// conservative dampen-only adjustment.
    fn default() -> Self {
        let weighting = WeightConfig::new([
            ("technical", 0.20),
            ("orderflow", 0.25),
            ("volume", 0.15),
            ("sentiment", 0.10),
            ("orderbook", 0.20),
            ("price_structure", 0.10),
        ])
        .with_components(ComponentTable::standard());
        Self {
            weighting,
            adjustment: AdjustmentMode::DampenOnly,
            thresholds: SignalThresholds::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ScoringError> {
        self.adjustment.validate()?;
        self.thresholds.validate()
    }

    /// Parse from text; `ext` ("toml" | "json") picks the format, anything
    /// else tries TOML first, then JSON.
    pub fn parse(content: &str, ext: &str) -> Result<Self> {
        let cfg: EngineConfig = match ext {
            "toml" => toml::from_str(content).context("parsing TOML engine config")?,
            "json" => serde_json::from_str(content).context("parsing JSON engine config")?,
            _ => match toml::from_str(content) {
                Ok(c) => c,
                Err(_) => serde_json::from_str(content)
                    .map_err(|_| anyhow!("unsupported engine config format"))?,
            },
        };
        cfg.validate().context("validating engine config")?;
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading engine config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        Self::parse(&content, ext.as_str())
            .with_context(|| format!("loading engine config from {}", path.display()))
    }

    /// Load using env var + fallbacks (see module docs).
    pub fn load_default() -> Result<Self> {
        match default_path()? {
            Some(p) => Self::load_from(&p),
            None => {
                info!("no engine config file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Resolve the config path the same way [`EngineConfig::load_default`] does.
pub fn default_path() -> Result<Option<PathBuf>> {
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return Ok(Some(pb));
        }
        return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
    }
    for candidate in [DEFAULT_TOML_PATH, DEFAULT_JSON_PATH] {
        let pb = PathBuf::from(candidate);
        if pb.exists() {
            return Ok(Some(pb));
        }
    }
    Ok(None)
}

/// Hot-reload wrapper: re-reads the file when its mtime changes. A reload
/// that fails to parse or validate keeps the last good config.
#[derive(Debug)]
pub struct HotReloadConfig {
    path: Option<PathBuf>,
    inner: RwLock<State>,
}

#[derive(Debug)]
struct State {
    config: EngineConfig,
    last_modified: Option<SystemTime>,
}

impl HotReloadConfig {
    /// Watch `path`; `None` serves `initial` forever.
    pub fn new(path: Option<PathBuf>, initial: EngineConfig) -> Self {
        Self {
            path,
            inner: RwLock::new(State {
                config: initial,
                last_modified: None,
            }),
        }
    }

    /// Resolve the default path and load it once. A file that exists but does
    /// not parse or validate is an error; only a missing file falls back to
    /// the built-in defaults.
    pub fn from_env() -> Result<Self> {
        let Some(path) = default_path()? else {
            info!("no engine config file found, using built-in defaults");
            return Ok(Self::new(None, EngineConfig::default()));
        };
        let config = EngineConfig::load_from(&path)?;
        let last_modified = fs::metadata(&path).and_then(|m| m.modified()).ok();
        info!(path = %path.display(), "engine config loaded");
        Ok(Self {
            path: Some(path),
            inner: RwLock::new(State {
                config,
                last_modified,
            }),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Latest config, reloading if the file changed.
    pub fn current(&self) -> EngineConfig {
        let Some(path) = self.path.as_deref() else {
            return self.read_state().config.clone();
        };

        let mtime = fs::metadata(path).and_then(|m| m.modified()).ok();
        let needs_reload = match mtime {
            Some(m) => self.read_state().last_modified != Some(m),
            // File vanished: keep serving what we have.
            None => false,
        };
        if !needs_reload {
            return self.read_state().config.clone();
        }

        let mut guard = match self.inner.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        // Double-check in case another reader reloaded first.
        if guard.last_modified != mtime {
            match EngineConfig::load_from(path) {
                Ok(cfg) => {
                    info!(path = %path.display(), "engine config reloaded");
                    guard.config = cfg;
                }
                Err(e) => {
                    warn!(error = ?e, path = %path.display(), "engine config reload failed, keeping previous");
                }
            }
            // Remember the mtime either way so a bad file is not re-parsed on every call.
            guard.last_modified = mtime;
        }
        guard.config.clone()
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, State> {
        match self.inner.read() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
