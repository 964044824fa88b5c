use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::InvoiceDraft;

#[derive(Debug, Error)]
pub enum DraftFileError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid TOML in {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Reads a pre-filled draft. `.json` files are parsed as JSON, anything else
/// as TOML.
pub fn load_draft(path: &Path) -> Result<InvoiceDraft, DraftFileError> {
    let content = fs::read_to_string(path).map_err(|source| DraftFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("json")) {
        serde_json::from_str(&content).map_err(|source| DraftFileError::Json {
            path: path.to_path_buf(),
            source,
        })
    } else {
        toml::from_str(&content).map_err(|source| DraftFileError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }
}
