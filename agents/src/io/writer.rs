//! Persist an output manifest to disk.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::core::types::{OutputFile, OutputManifest};
use crate::error::{PipelineError, Result};

/// Writes every manifest file under one output directory.
///
/// Each file is written to a sibling temp file, synced, then renamed over the
/// target, so a reader never observes a partially written artifact. Any
/// failure aborts the write and is reported as [`PipelineError::Write`].
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    output_dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write all files in manifest order and return their final paths.
    #[instrument(skip_all, fields(dir = %self.output_dir.display(), files = manifest.files.len()))]
    pub fn write(&self, manifest: &OutputManifest) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.output_dir).map_err(|source| PipelineError::Write {
            path: self.output_dir.clone(),
            source,
        })?;

        let mut written = Vec::with_capacity(manifest.files.len());
        for file in &manifest.files {
            written.push(self.write_one(file)?);
        }
        info!(count = written.len(), "artifacts written");
        Ok(written)
    }

    fn write_one(&self, file: &OutputFile) -> Result<PathBuf> {
        let target = self.output_dir.join(&file.path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| PipelineError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        write_atomic(&target, file.content.as_bytes()).map_err(|source| PipelineError::Write {
            path: target.clone(),
            source,
        })?;
        debug!(path = %target.display(), bytes = file.content.len(), "wrote artifact");
        Ok(target)
    }
}

fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let tmp_path = temp_path(path);
    let result = (|| {
        let mut tmp = File::create(&tmp_path)?;
        tmp.write_all(contents)?;
        tmp.sync_all()?;
        fs::rename(&tmp_path, path)
    })();
    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}
