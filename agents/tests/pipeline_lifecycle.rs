//! End-to-end tests driving `run_task` through the public API.
//!
//! Each test builds a project root on disk, runs one task with a fake or
//! simulated backend, and inspects the files written for the family.

use std::fs;

use agents::core::family::{Classification, SecurityFocus, TaskFamily};
use agents::core::types::AgentTask;
use agents::error::{GenerationFailure, PipelineError};
use agents::io::backend::SimulatedBackend;
use agents::io::init::{InitOptions, init_agents};
use agents::pipeline::run_task;
use agents::test_support::{CapturingGenerator, ScriptedGenerator, TestWorkspace};

/// Response with a prose preamble, two code blocks, and a non-code block.
/// The block mentioning the hint is chosen; the python block is never a
/// candidate.
const MULTI_BLOCK_RESPONSE: &str = r#"Here is my review.

## Análisis de Vulnerabilidades
Tokens are stored in localStorage.

```python
token = "not javascript"
```

## Correcciones Recomendadas
Move tokens to httpOnly cookies.

```js
app.use(helmet());
```

```javascript
// rotate the refresh Token on every use
res.cookie('refresh', rotate(token), { httpOnly: true });
```
"#;

#[tokio::test]
async fn security_run_selects_block_matching_hint() {
    let ws = TestWorkspace::new();
    let generator = ScriptedGenerator::ok(MULTI_BLOCK_RESPONSE);
    let task = AgentTask::new("Harden the login session tokens");

    let outcome = run_task(ws.root(), TaskFamily::Security, &task, &generator, ws.config())
        .await
        .expect("run");
    assert_eq!(
        outcome.classification,
        Classification::Security(SecurityFocus::Auth)
    );

    let dir = ws.root().join("output/security");
    assert_eq!(
        fs::read_to_string(dir.join("security-analysis.md")).expect("analysis"),
        "Tokens are stored in localStorage.\n\n```python\ntoken = \"not javascript\"\n```\n"
    );
    assert_eq!(
        fs::read_to_string(dir.join("secure-code.js")).expect("code"),
        "// rotate the refresh Token on every use\nres.cookie('refresh', rotate(token), { httpOnly: true });\n"
    );
}

#[tokio::test]
async fn initialized_project_feeds_context_into_prompt() {
    let ws = TestWorkspace::new();
    let paths = init_agents(ws.root(), &InitOptions { force: false }).expect("init");
    let cfg = paths.load_config().expect("config");
    fs::write(
        paths.context_dir(&cfg).join("rules.md"),
        "Never log secrets.",
    )
    .expect("rules");

    let generator = CapturingGenerator::new("## Respuesta\nYes.\n\n## Ejemplos\nNone.\n");
    let task = AgentTask::new("Explain the logging rules");
    let outcome = run_task(ws.root(), TaskFamily::Question, &task, &generator, &cfg)
        .await
        .expect("run");

    assert!(outcome.missing_context.is_empty());
    assert!(outcome.missing_sections.is_empty());
    assert!(!outcome.code_found);
    let prompt = &generator.requests()[0].prompt;
    assert!(prompt.contains("Never log secrets."));
    assert!(prompt.contains("Explain the logging rules"));

    let dir = ws.root().join("output/question");
    assert_eq!(fs::read_to_string(dir.join("answer.md")).expect("answer"), "Yes.\n");
    assert_eq!(fs::read_to_string(dir.join("examples.md")).expect("examples"), "None.\n");
    assert_eq!(fs::read_to_string(dir.join("example-code.js")).expect("code"), "");
}

#[tokio::test]
async fn rerun_overwrites_previous_outputs() {
    let ws = TestWorkspace::new();
    let task = AgentTask::new("Review the API");
    let first = ScriptedGenerator::ok("## Análisis de Vulnerabilidades\nfirst\n");
    let second = ScriptedGenerator::ok("## Análisis de Vulnerabilidades\nsecond\n");

    run_task(ws.root(), TaskFamily::Security, &task, &first, ws.config())
        .await
        .expect("first");
    run_task(ws.root(), TaskFamily::Security, &task, &second, ws.config())
        .await
        .expect("second");

    let analysis = ws.root().join("output/security/security-analysis.md");
    assert_eq!(fs::read_to_string(analysis).expect("read"), "second\n");
}

#[tokio::test]
async fn failed_generation_leaves_previous_outputs_untouched() {
    let ws = TestWorkspace::new();
    let task = AgentTask::new("Review the API");
    let backend = SimulatedBackend::new().expect("backend");
    let outcome = run_task(ws.root(), TaskFamily::Security, &task, &backend, ws.config())
        .await
        .expect("simulated");
    let before = fs::read_to_string(&outcome.written[0]).expect("before");

    let failing = ScriptedGenerator::err(GenerationFailure::Network("reset".to_string()));
    let err = run_task(ws.root(), TaskFamily::Security, &task, &failing, ws.config())
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Generation(_)));
    assert_eq!(fs::read_to_string(&outcome.written[0]).expect("after"), before);
}
