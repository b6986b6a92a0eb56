use thiserror::Error;

use crate::flag::FlagError;
use crate::vfs::FsError;

/// Everything a shell command can fail with. None of these are fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShellError {
    #[error("file not found")]
    FileNotFound,
    #[error("not a directory")]
    NotDirectory,
    #[error("is a directory")]
    IsDirectory,
    #[error("missing argument")]
    MissingArgument,
    #[error("too many arguments")]
    TooManyArguments,
    #[error("access denied")]
    AccessDenied,
    #[error("invalid flag: {0}")]
    InvalidFlag(String),
    #[error("not openable")]
    NotOpenable,
}

/// Deliberately lossy: callers only ever learn "not found" or "denied".
impl From<FsError> for ShellError {
    fn from(err: FsError) -> Self {
        match err {
            FsError::NotExist { .. } => ShellError::FileNotFound,
            FsError::Permission { .. } | FsError::Invalid { .. } => ShellError::AccessDenied,
        }
    }
}

impl From<FlagError> for ShellError {
    fn from(err: FlagError) -> Self {
        ShellError::InvalidFlag(err.to_string())
    }
}

/// A failed command plus the exact token the user typed that it failed on,
/// so callers can print `verb: context: reason` without re-parsing.
/// `context` is empty when no single token is to blame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{context}: {kind}")]
pub struct CommandError {
    pub context: String,
    #[source]
    pub kind: ShellError,
}

impl CommandError {
    pub fn new(context: impl Into<String>, kind: impl Into<ShellError>) -> Self {
        Self {
            context: context.into(),
            kind: kind.into(),
        }
    }

    /// Error with no context token.
    pub fn bare(kind: impl Into<ShellError>) -> Self {
        Self::new(String::new(), kind)
    }
}
