//! Orchestration for a single `agents run`.
//!
//! One task flows through a fixed sequence: load context, classify, read the
//! source artifact, assemble the prompt, make one backend call, extract the
//! response, write the family's output files. The three families share this
//! pipeline and differ only in what [`TaskFamily`] supplies.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::core::extract::ExtractedArtifactSet;
use crate::core::family::{Classification, TaskFamily};
use crate::core::manifest::build_manifest;
use crate::core::types::{AgentTask, GenerationState};
use crate::error::{PipelineError, Result};
use crate::io::backend::{GenerationRequest, Generator};
use crate::io::config::AgentsConfig;
use crate::io::context::{ContextLoader, read_source};
use crate::io::prompt::PromptAssembler;
use crate::io::writer::ArtifactWriter;

/// Summary of one completed task.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    pub family: TaskFamily,
    pub classification: Classification,
    /// Name of the backend that produced the response.
    pub backend: String,
    pub generation: GenerationState,
    pub output_dir: PathBuf,
    /// Final paths of the written files, in manifest order.
    pub written: Vec<PathBuf>,
    /// Context documents that were replaced by a placeholder.
    pub missing_context: Vec<String>,
    /// Expected section titles absent (or empty) in the response.
    pub missing_sections: Vec<String>,
    /// Whether the response carried a code block in a recognized language.
    pub code_found: bool,
}

/// Run `task` as a `family` agent rooted at `root`.
///
/// Missing context documents and an unreadable source only degrade the
/// prompt. A backend failure aborts before anything is written; a write
/// failure aborts the task.
#[instrument(skip_all, fields(family = %family, backend = generator.name()))]
pub async fn run_task<G: Generator + ?Sized>(
    root: &Path,
    family: TaskFamily,
    task: &AgentTask,
    generator: &G,
    cfg: &AgentsConfig,
) -> Result<PipelineOutcome> {
    let loader = ContextLoader::new(root.join(&cfg.context_dir));
    let bundle = loader.load(&cfg.context_documents);
    let missing_context: Vec<String> = bundle.missing().into_iter().map(str::to_string).collect();

    let classification = family.classify(&task.raw_spec);
    info!(%classification, "task classified");

    let source = task
        .source_path
        .as_deref()
        .and_then(|path| read_source(&root.join(path)));

    let prompt = PromptAssembler::new()?.assemble(&bundle, task, classification, source.as_ref())?;

    let mut generation = GenerationState::NotStarted;
    advance(&mut generation, GenerationState::Requested);
    let request = GenerationRequest {
        prompt: prompt.into_string(),
        classification,
    };
    let response = match generator.generate(&request).await {
        Ok(text) => {
            advance(&mut generation, GenerationState::Completed);
            text
        }
        Err(failure) => {
            advance(&mut generation, GenerationState::Failed);
            warn!(error = %failure, "generation failed; no files written");
            return Err(PipelineError::Generation(failure));
        }
    };

    let artifacts = ExtractedArtifactSet::from_response(
        &response,
        &family.section_titles(),
        family.language_hints(),
    );
    let missing_sections: Vec<String> = artifacts
        .missing_sections()
        .into_iter()
        .map(str::to_string)
        .collect();
    for title in &missing_sections {
        warn!(section = %title, "response missing section; writing empty file");
    }
    let code_found = !artifacts.code_blocks.is_empty();
    if !code_found {
        warn!("response has no recognized code block; writing empty file");
    }

    let manifest = build_manifest(classification, &artifacts, &response);
    let output_dir = root.join(&cfg.output_dir).join(family.as_str());
    let written = ArtifactWriter::new(&output_dir).write(&manifest)?;

    Ok(PipelineOutcome {
        family,
        classification,
        backend: generator.name().to_string(),
        generation,
        output_dir,
        written,
        missing_context,
        missing_sections,
        code_found,
    })
}

fn advance(state: &mut GenerationState, next: GenerationState) {
    debug_assert!(
        state.can_advance_to(next),
        "invalid generation transition {state:?} -> {next:?}"
    );
    *state = next;
}
