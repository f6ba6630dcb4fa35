//! Read-only loading of context documents and the optional source artifact.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};

use crate::core::types::{ContextBundle, ContextDocument, SourceArtifact};
use crate::error::PipelineError;

/// Loads named context documents from a fixed directory.
#[derive(Debug, Clone)]
pub struct ContextLoader {
    dir: PathBuf,
}

impl ContextLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load `names` in order. Missing or unreadable documents become a
    /// placeholder naming the document; this never fails.
    #[instrument(skip_all, fields(dir = %self.dir.display(), count = names.len()))]
    pub fn load<S: AsRef<str>>(&self, names: &[S]) -> ContextBundle {
        let mut bundle = ContextBundle::default();
        for name in names {
            let name = name.as_ref();
            let document = match self.read(name) {
                Ok(content) => ContextDocument {
                    name: name.to_string(),
                    content,
                    found: true,
                },
                Err(err) => {
                    warn!(error = %err, "using placeholder for context document");
                    ContextDocument {
                        name: name.to_string(),
                        content: missing_placeholder(name),
                        found: false,
                    }
                }
            };
            bundle.push(document);
        }
        debug!(missing = bundle.missing().len(), "context loaded");
        bundle
    }

    fn read(&self, name: &str) -> Result<String, PipelineError> {
        let path = self.dir.join(name);
        fs::read_to_string(&path).map_err(|source| PipelineError::MissingContext {
            name: name.to_string(),
            path,
            source,
        })
    }
}

/// Placeholder text standing in for a context document that could not be read.
pub fn missing_placeholder(name: &str) -> String {
    format!("[context document '{name}' not found]")
}

/// Read the source artifact at `path`.
///
/// An unreadable file yields `None` with a warning; the prompt then carries
/// no source section.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn read_source(path: &Path) -> Option<SourceArtifact> {
    match fs::read_to_string(path) {
        Ok(content) => Some(SourceArtifact {
            language: source_language(path).to_string(),
            content,
        }),
        Err(source) => {
            let err = PipelineError::SourceRead {
                path: path.to_path_buf(),
                source,
            };
            warn!(error = %err, "continuing without source artifact");
            None
        }
    }
}

/// Fence language for a source file, from its extension.
pub fn source_language(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "js" | "mjs" | "cjs" => "javascript",
        "jsx" => "jsx",
        "ts" | "mts" | "cts" => "typescript",
        "tsx" => "tsx",
        "py" => "python",
        "rs" => "rust",
        "go" => "go",
        "java" => "java",
        "rb" => "ruby",
        "php" => "php",
        "sql" => "sql",
        "sh" | "bash" => "bash",
        "json" => "json",
        "yml" | "yaml" => "yaml",
        "html" | "htm" => "html",
        "css" => "css",
        "md" => "markdown",
        _ => "text",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_keeps_requested_order_and_placeholders() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join("core.md"), "core body").expect("write core");
        fs::write(temp.path().join("modules.md"), "modules body").expect("write modules");

        let bundle = ContextLoader::new(temp.path()).load(&["core.md", "rules.md", "modules.md"]);

        let names: Vec<&str> = bundle.documents().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["core.md", "rules.md", "modules.md"]);
        assert_eq!(bundle.get("core.md"), Some("core body"));
        assert_eq!(bundle.get("rules.md"), Some("[context document 'rules.md' not found]"));
        assert_eq!(bundle.missing(), vec!["rules.md"]);
    }

    #[test]
    fn missing_directory_is_not_fatal() {
        let temp = tempfile::tempdir().expect("tempdir");
        let loader = ContextLoader::new(temp.path().join("nope"));
        let bundle = loader.load(&["core.md"]);
        assert_eq!(bundle.len(), 1);
        assert_eq!(bundle.missing(), vec!["core.md"]);
    }

    #[test]
    fn directory_in_place_of_document_is_treated_as_missing() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::create_dir(temp.path().join("rules.md")).expect("mkdir");
        let bundle = ContextLoader::new(temp.path()).load(&["rules.md"]);
        assert_eq!(bundle.missing(), vec!["rules.md"]);
    }

    #[test]
    fn read_source_tags_language() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("server.ts");
        fs::write(&path, "export const x = 1;\n").expect("write");
        let source = read_source(&path).expect("source");
        assert_eq!(source.language, "typescript");
        assert_eq!(source.content, "export const x = 1;\n");
    }

    #[test]
    fn unreadable_source_is_none() {
        let temp = tempfile::tempdir().expect("tempdir");
        assert_eq!(read_source(&temp.path().join("missing.js")), None);
        assert_eq!(read_source(temp.path()), None);
    }

    #[test]
    fn unknown_extension_is_text() {
        assert_eq!(source_language(Path::new("Makefile")), "text");
        assert_eq!(source_language(Path::new("app.JS")), "javascript");
    }
}
