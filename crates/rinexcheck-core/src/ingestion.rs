use std::fs;
use std::path::{Path, PathBuf};

use blake3::Hasher;
use rinexcheck_parser::{
    parse_navigation_log, parse_reference_file, NavSystemKind, NavigationLog, ReferenceData,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{PipelineError, Result};

/// An input file read from disk, with the hash recorded in the report.
#[derive(Debug, Clone)]
pub struct InputFile {
    pub path: PathBuf,
    pub hash: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    pub path: String,
    pub blake3: String,
}

impl InputFile {
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|source| PipelineError::ReadInput {
            path: path.to_path_buf(),
            source,
        })?;
        let hash = compute_hash(&bytes);

        let content = match String::from_utf8(bytes) {
            Ok(content) => content,
            Err(err) => {
                warn!(
                    path = %path.display(),
                    "file contents were not valid UTF-8; replacing invalid bytes"
                );
                String::from_utf8_lossy(err.as_bytes()).into_owned()
            }
        };

        debug!(path = %path.display(), hash = %hash, bytes = content.len(), "read input file");
        Ok(Self {
            path: path.to_path_buf(),
            hash,
            content,
        })
    }

    pub fn record(&self) -> FileRecord {
        FileRecord {
            path: self.path.display().to_string(),
            blake3: self.hash.clone(),
        }
    }
}

pub fn load_reference(path: &Path) -> Result<(ReferenceData, FileRecord)> {
    let input = InputFile::read(path)?;
    let reference = parse_reference_file(&input.content)?;
    Ok((reference, input.record()))
}

pub fn load_navigation(
    path: &Path,
    kind: Option<NavSystemKind>,
) -> Result<(NavigationLog, FileRecord)> {
    let input = InputFile::read(path)?;
    let log = parse_navigation_log(&input.content, kind)?;
    Ok((log, input.record()))
}

fn compute_hash(contents: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(contents);
    let hash = hasher.finalize();
    hash.to_hex().to_string()
}
