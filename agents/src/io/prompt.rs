//! Prompt assembly for the generation backend.

use minijinja::{Environment, context};
use tracing::debug;

use crate::core::family::Classification;
use crate::core::types::{AgentTask, ContextBundle, PromptEnvelope, SourceArtifact};
use crate::error::Result;

const TASK_TEMPLATE: &str = include_str!("prompts/task.md");

/// Renders the single prompt string sent to the backend.
///
/// Output depends only on the context bundle, the classification, the task
/// text and the source artifact. Nothing is truncated.
pub struct PromptAssembler {
    env: Environment<'static>,
}

impl PromptAssembler {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.add_template("task", TASK_TEMPLATE)?;
        Ok(Self { env })
    }

    pub fn assemble(
        &self,
        bundle: &ContextBundle,
        task: &AgentTask,
        classification: Classification,
        source: Option<&SourceArtifact>,
    ) -> Result<PromptEnvelope> {
        let family = classification.family();
        let source = source.filter(|artifact| !artifact.content.is_empty());
        let fence = source.map_or_else(String::new, |artifact| source_fence(&artifact.content));
        let template = self.env.get_template("task")?;
        let rendered = template.render(context! {
            family => family.as_str(),
            classification => classification.label(),
            context => bundle.documents(),
            spec => task.raw_spec.as_str(),
            source => source,
            fence => fence,
            titles => family.section_titles(),
            languages => family.language_hints(),
        })?;
        debug!(bytes = rendered.len(), has_source = source.is_some(), "prompt assembled");
        Ok(PromptEnvelope::new(rendered))
    }
}

/// A backtick fence longer than any backtick run inside `content`.
fn source_fence(content: &str) -> String {
    let longest = content
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat(longest.max(2) + 1)
}
