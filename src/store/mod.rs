//! Project file persistence.
//!
//! Project files are pretty-printed JSON (`*.16core`, or `*.json` for older
//! maps). Loading is tolerant of files written before trait ids, per-group
//! ordering and the `FormatVersion` field existed.

mod settings;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::{Project, FORMAT_VERSION};

pub use settings::*;

pub const PROJECT_EXTENSION: &str = "16core";
pub const LEGACY_EXTENSION: &str = "json";

/// Errors reading or writing project and settings files.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not a valid project file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("the project file is empty or corrupt")]
    Empty,

    #[error("project file version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
}

pub type Result<T> = std::result::Result<T, StoreError>;

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Serialize a project as written to disk.
pub fn to_json(project: &Project) -> Result<String> {
    let mut out = project.clone();
    out.format_version = FORMAT_VERSION;
    out.resolve_all_positions();
    Ok(serde_json::to_string_pretty(&out)?)
}

/// Parse and repair a project document.
pub fn from_json(json: &str) -> Result<Project> {
    let project: Option<Project> = serde_json::from_str(json)?;
    let mut project = project.ok_or(StoreError::Empty)?;

    if project.format_version > FORMAT_VERSION {
        return Err(StoreError::UnsupportedVersion {
            found: project.format_version,
            supported: FORMAT_VERSION,
        });
    }

    project.repair();
    Ok(project)
}

/// Write a project, creating parent directories as needed. Legacy trait
/// keys are migrated in the written copy; `project` itself is untouched.
pub fn save(project: &Project, path: &Path) -> Result<()> {
    let json = to_json(project)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    std::fs::write(path, json).map_err(io_error(path))?;
    tracing::info!(path = %path.display(), characters = project.characters.len(), "saved project");
    Ok(())
}

pub fn load(path: &Path) -> Result<Project> {
    let json = std::fs::read_to_string(path).map_err(io_error(path))?;
    let project = from_json(&json)?;
    tracing::info!(path = %path.display(), characters = project.characters.len(), "loaded project");
    Ok(project)
}

/// Load a project, falling back to a new empty one. The error, if any, is
/// returned alongside so the caller can report it.
pub fn load_or_new(path: &Path) -> (Project, Option<StoreError>) {
    match load(path) {
        Ok(project) => (project, None),
        Err(e) => {
            tracing::warn!(path = %path.display(), "falling back to a new project: {}", e);
            (Project::new(), Some(e))
        }
    }
}

/// Whether the path carries one of the extensions project files use.
pub fn is_project_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(PROJECT_EXTENSION) || e.eq_ignore_ascii_case(LEGACY_EXTENSION))
        .unwrap_or(false)
}
