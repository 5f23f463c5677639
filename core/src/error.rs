//! Error types for the analysis pipeline.
//!
//! Only [`IngestError`] and [`HarnessError`] abort a run. Module level
//! failures ([`AnalyzerError`]) are isolated by the harness and reported
//! alongside the surviving modules.

use std::path::PathBuf;

use thiserror::Error;

/// The replay itself is unusable; nothing is analyzed.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read replay {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse replay: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("fight window ends ({end}) before it starts ({start})")]
    InvalidFightWindow { start: i64, end: i64 },
}

/// Harness wiring is inconsistent; detected before any event is replayed.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("module `{0}` is registered twice")]
    DuplicateModule(&'static str),
    #[error("module `{module}` depends on unregistered module `{dependency}`")]
    UnknownDependency {
        module: &'static str,
        dependency: &'static str,
    },
    #[error("dependency cycle between modules: {}", .0.join(", "))]
    DependencyCycle(Vec<&'static str>),
    #[error("harness is {actual}, expected {expected}")]
    InvalidPhase {
        expected: &'static str,
        actual: &'static str,
    },
}

/// Raised by a module constructor or event handler.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("dependency `{0}` was not declared by this module")]
    UndeclaredDependency(&'static str),
    #[error("dependency `{0}` is unavailable")]
    MissingDependency(&'static str),
    #[error("module state is already borrowed")]
    Reentrant,
    #[error("{0}")]
    Invariant(String),
    #[error("panicked: {0}")]
    Panicked(String),
}

/// Anything that aborts a whole run.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Harness(#[from] HarnessError),
}
