use crate::library::relocate::RelocateError;
use crate::naming::TemplateError;
use crate::parser::ParseError;
use crate::services::metadata::LookupError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{0}")]
    InvalidFilename(String),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Filesystem(#[from] RelocateError),

    #[error("Invalid template: {0}")]
    Template(#[from] TemplateError),

    #[error("No valid files were supplied")]
    NoValidFiles,

    #[error("Aborted by user")]
    UserAbort,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Configuration(msg) => Self::Configuration(msg),
            invalid @ ParseError::InvalidFilename { .. } => {
                Self::InvalidFilename(invalid.to_string())
            }
        }
    }
}

impl Error {
    /// Whether the error ends the whole run instead of just the current file.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_)
                | Self::Template(_)
                | Self::NoValidFiles
                | Self::UserAbort
                | Self::Io(_)
                | Self::Lookup(LookupError::UserAbort)
        )
    }
}
