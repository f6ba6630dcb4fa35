//! Agent configuration stored under `.agents/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Agent configuration (TOML).
///
/// This file is intended to be edited by humans and must remain stable and
/// automatable. Missing fields default to sensible values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AgentsConfig {
    /// Directory holding context documents, relative to the project root.
    pub context_dir: PathBuf,

    /// Context documents to load, in prompt order.
    pub context_documents: Vec<String>,

    /// Directory receiving per-family output folders, relative to the project root.
    pub output_dir: PathBuf,

    /// Use the deterministic simulated backend instead of the live one.
    pub simulate: bool,

    pub live: LiveConfig,
}

/// Settings for the live text-completion backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LiveConfig {
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    /// Environment variable holding the API key. The key itself never lives in config.
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.anthropic.com".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 4096,
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            timeout_secs: 300,
        }
    }
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            context_dir: PathBuf::from(".agents").join("context"),
            context_documents: vec![
                "core.md".to_string(),
                "rules.md".to_string(),
                "modules.md".to_string(),
            ],
            output_dir: PathBuf::from("output"),
            simulate: false,
            live: LiveConfig::default(),
        }
    }
}

impl AgentsConfig {
    pub fn validate(&self) -> Result<()> {
        if self.context_dir.as_os_str().is_empty() {
            return Err(anyhow!("context_dir must be non-empty"));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(anyhow!("output_dir must be non-empty"));
        }
        if self.context_dir == self.output_dir {
            return Err(anyhow!("context_dir and output_dir must differ"));
        }
        if self
            .context_documents
            .iter()
            .any(|name| name.trim().is_empty())
        {
            return Err(anyhow!("context_documents entries must be non-empty"));
        }
        if self.live.base_url.trim().is_empty() {
            return Err(anyhow!("live.base_url must be non-empty"));
        }
        if self.live.model.trim().is_empty() {
            return Err(anyhow!("live.model must be non-empty"));
        }
        if self.live.max_tokens == 0 {
            return Err(anyhow!("live.max_tokens must be > 0"));
        }
        if self.live.timeout_secs == 0 {
            return Err(anyhow!("live.timeout_secs must be > 0"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `AgentsConfig::default()`.
pub fn load_config(path: &Path) -> Result<AgentsConfig> {
    if !path.exists() {
        let cfg = AgentsConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: AgentsConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &AgentsConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
