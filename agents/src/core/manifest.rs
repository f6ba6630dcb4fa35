//! Mapping from extracted artifacts to a family's fixed output files.

use crate::core::extract::ExtractedArtifactSet;
use crate::core::family::Classification;
use crate::core::types::OutputManifest;

/// Build the manifest for one task.
///
/// Every family writes the same four files in the same order whether or not
/// the response contained the expected pieces; missing pieces produce empty
/// files.
pub fn build_manifest(
    classification: Classification,
    artifacts: &ExtractedArtifactSet,
    raw_response: &str,
) -> OutputManifest {
    let family = classification.family();
    let files = family.output_files();
    let mut manifest = OutputManifest::default();
    manifest.push(
        files.analysis,
        with_trailing_newline(artifacts.section(family.analysis_title())),
    );
    manifest.push(
        files.remediation,
        with_trailing_newline(artifacts.section(family.remediation_title())),
    );
    manifest.push(
        files.code,
        with_trailing_newline(&artifacts.select_code(classification.code_hint())),
    );
    manifest.push(files.response, raw_response.to_string());
    manifest
}

fn with_trailing_newline(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!("{body}\n")
    }
}
