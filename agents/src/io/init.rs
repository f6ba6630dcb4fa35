//! Initialization helpers for `.agents/` scaffolding.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

use super::config::{AgentsConfig, load_config, write_config};

/// Canonical paths within `.agents/` for a project root.
#[derive(Debug, Clone)]
pub struct AgentsPaths {
    pub root: PathBuf,
    pub agents_dir: PathBuf,
    pub config_path: PathBuf,
    pub gitignore_path: PathBuf,
}

impl AgentsPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let agents_dir = root.join(".agents");
        Self {
            root,
            config_path: agents_dir.join("config.toml"),
            gitignore_path: agents_dir.join(".gitignore"),
            agents_dir,
        }
    }

    /// Load the project config, falling back to defaults when absent.
    pub fn load_config(&self) -> Result<AgentsConfig> {
        load_config(&self.config_path)
    }

    pub fn context_dir(&self, cfg: &AgentsConfig) -> PathBuf {
        self.root.join(&cfg.context_dir)
    }

    pub fn output_dir(&self, cfg: &AgentsConfig) -> PathBuf {
        self.root.join(&cfg.output_dir)
    }
}

/// Options for `init_agents`.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// If true, overwrite existing agent-owned files.
    pub force: bool,
}

/// Create `.agents/` scaffolding in `root`: default config plus one stub per
/// context document.
///
/// Fails if `.agents/` already exists unless `options.force` is set.
pub fn init_agents(root: &Path, options: &InitOptions) -> Result<AgentsPaths> {
    let paths = AgentsPaths::new(root);
    if paths.agents_dir.exists() && !paths.agents_dir.is_dir() {
        return Err(anyhow!("agents init: .agents exists but is not a directory"));
    }
    if paths.agents_dir.exists() && !options.force {
        return Err(anyhow!(
            "agents init: .agents already exists (use --force to overwrite)"
        ));
    }

    let cfg = AgentsConfig::default();
    create_dir(&paths.agents_dir)?;
    write_config(&paths.config_path, &cfg)?;
    write_file(&paths.gitignore_path, AGENTS_GITIGNORE)?;

    let context_dir = paths.context_dir(&cfg);
    create_dir(&context_dir)?;
    for name in &cfg.context_documents {
        write_file(&context_dir.join(name), &context_placeholder(name))?;
    }

    Ok(paths)
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).with_context(|| format!("create directory {}", path.display()))
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir(parent)?;
    }
    fs::write(path, contents).with_context(|| format!("write file {}", path.display()))
}

fn context_placeholder(name: &str) -> String {
    let title = name.strip_suffix(".md").unwrap_or(name);
    format!("# {title}\n\nDescribe the project {title} here.\n")
}

const AGENTS_GITIGNORE: &str = "*.tmp\n";

#[cfg(test)]
mod tests {
    use super::*;

    fn read_to_string(path: &Path) -> String {
        fs::read_to_string(path).expect("read file")
    }

    #[test]
    fn init_creates_expected_layout() {
        let temp = tempfile::tempdir().expect("tempdir");
        let paths = init_agents(temp.path(), &InitOptions { force: false }).expect("init");

        assert!(paths.agents_dir.is_dir());
        assert!(paths.config_path.is_file());
        assert_eq!(read_to_string(&paths.gitignore_path), AGENTS_GITIGNORE);

        let cfg = paths.load_config().expect("config");
        assert_eq!(cfg, AgentsConfig::default());
        for name in &cfg.context_documents {
            let doc = read_to_string(&paths.context_dir(&cfg).join(name));
            assert!(doc.starts_with("# "), "{name}: {doc}");
        }
    }

    #[test]
    fn init_without_force_refuses_existing_dir() {
        let temp = tempfile::tempdir().expect("tempdir");
        init_agents(temp.path(), &InitOptions { force: false }).expect("init");
        let err = init_agents(temp.path(), &InitOptions { force: false }).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn init_with_force_rewrites_placeholders() {
        let temp = tempfile::tempdir().expect("tempdir");
        let paths = init_agents(temp.path(), &InitOptions { force: false }).expect("init");
        let core = paths.context_dir(&AgentsConfig::default()).join("core.md");
        fs::write(&core, "custom").expect("write custom");

        init_agents(temp.path(), &InitOptions { force: true }).expect("re-init");
        assert_eq!(read_to_string(&core), context_placeholder("core.md"));
    }

    #[test]
    fn init_rejects_file_in_place_of_dir() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join(".agents"), "oops").expect("write");
        let err = init_agents(temp.path(), &InitOptions { force: true }).unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }
}
