//! Error types for editing commands and document I/O.

use thiserror::Error;

/// Why an editing command declined to run. The scene is untouched when one
/// of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("nothing is selected")]
    NothingSelected,
    #[error("the selection is locked")]
    Locked,
    #[error("the selection is not a single group")]
    NotAGroup,
    #[error("select at least two objects to group")]
    TooFewToGroup,
    #[error("nothing to paste")]
    NothingToPaste,
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("cannot delete the last page")]
    LastPage,
    #[error("page {0} does not exist")]
    PageOutOfRange(usize),
    #[error("no deleted page to restore")]
    NoPendingRestore,
    #[error("the deleted page can no longer be restored")]
    RestoreExpired,
}

/// Failures while reading or writing documents and configuration.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid document: {0}")]
    Invalid(String),
}

pub type DocumentResult<T> = Result<T, DocumentError>;
