//! Shared deterministic types for the agent pipeline.
//!
//! These types define stable contracts between pipeline stages. They should not
//! depend on external state or I/O and must remain deterministic across runs.

use std::path::PathBuf;

use serde::Serialize;

/// One invocation of an agent: the free-text task and an optional source file
/// to embed in the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentTask {
    pub raw_spec: String,
    pub source_path: Option<PathBuf>,
}

impl AgentTask {
    pub fn new(raw_spec: impl Into<String>) -> Self {
        Self {
            raw_spec: raw_spec.into(),
            source_path: None,
        }
    }

    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(path.into());
        self
    }
}

/// A named context document, or a placeholder when it could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextDocument {
    pub name: String,
    pub content: String,
    pub found: bool,
}

/// Context documents in the order they were requested.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextBundle {
    documents: Vec<ContextDocument>,
}

impl ContextBundle {
    pub fn push(&mut self, document: ContextDocument) {
        self.documents.push(document);
    }

    pub fn documents(&self) -> &[ContextDocument] {
        &self.documents
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.documents
            .iter()
            .find(|doc| doc.name == name)
            .map(|doc| doc.content.as_str())
    }

    /// Names of documents that fell back to a placeholder.
    pub fn missing(&self) -> Vec<&str> {
        self.documents
            .iter()
            .filter(|doc| !doc.found)
            .map(|doc| doc.name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Content of the optional source artifact, tagged for its fenced block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceArtifact {
    pub language: String,
    pub content: String,
}

/// The single prompt string sent to the generation backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptEnvelope {
    content: String,
}

impl PromptEnvelope {
    pub fn new(content: String) -> Self {
        Self { content }
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }

    pub fn into_string(self) -> String {
        self.content
    }
}

/// Lifecycle of the single backend call a task makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationState {
    NotStarted,
    Requested,
    Completed,
    Failed,
}

impl GenerationState {
    /// Allowed moves: `NotStarted -> Requested -> {Completed | Failed}`.
    pub fn can_advance_to(self, next: GenerationState) -> bool {
        matches!(
            (self, next),
            (Self::NotStarted, Self::Requested)
                | (Self::Requested, Self::Completed)
                | (Self::Requested, Self::Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// A file to write, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub path: PathBuf,
    pub content: String,
}

/// Ordered list of files an agent writes for one task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputManifest {
    pub files: Vec<OutputFile>,
}

impl OutputManifest {
    pub fn push(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files.push(OutputFile {
            path: path.into(),
            content: content.into(),
        });
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|file| file.path.as_os_str() == path)
            .map(|file| file.content.as_str())
    }
}
