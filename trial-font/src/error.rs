//! Errors produced while making a trial font

use std::path::PathBuf;

use thiserror::Error;
use write_fonts::{read::ReadError, types::Tag};

use crate::pipeline::FileReport;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid input unicode '{0}'")]
    InvalidUnicode(String),

    #[error("Invalid unicode range {start:04X}-{end:04X}: start is after end")]
    InvalidUnicodeRange { start: u32, end: u32 },

    #[error("Invalid replacer '{0}': expected a glyph name or a 'U+' prefixed hex codepoint")]
    InvalidReplacer(String),

    #[error("The name suffix must not be empty")]
    EmptySuffix,

    #[error(
        "Replacer glyph '{0}' has no unicode. Check the font file and copy in an exact \
         glyph name, e.g. 'asterisk' rather than '*'"
    )]
    ReplacerNotFound(String),

    #[error("Replacer codepoint U+{0:04X} is not mapped by the font")]
    ReplacerNotMapped(u32),

    #[error("Glyph '{0}' is not in the font's glyph order")]
    UnknownGlyph(String),

    #[error("Error reading font data: {0}")]
    Read(ReadError),

    #[error("Error reading '{tag}' table: {error}")]
    ReadTable { tag: Tag, error: ReadError },

    #[error("Compiling table '{tag}' failed: {message}")]
    Compile { tag: Tag, message: String },

    #[error("Output path {} is the intermediate file", .0.display())]
    OutputCollision(PathBuf),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn read_table(tag: Tag) -> impl FnOnce(ReadError) -> Error {
        move |error| Error::ReadTable { tag, error }
    }

    pub(crate) fn compile<E: std::fmt::Display>(tag: Tag) -> impl FnOnce(E) -> Error {
        move |error| Error::Compile {
            tag,
            message: error.to_string(),
        }
    }
}

impl From<write_fonts::BuilderError> for Error {
    fn from(err: write_fonts::BuilderError) -> Self {
        Error::Compile {
            tag: err.tag,
            message: err.inner.to_string(),
        }
    }
}

/// A batch of fonts stopped at the first file that failed.
///
/// Fonts written before the failure stay on disk and are listed in
/// `completed`; no file after `path` was attempted.
#[derive(Debug, Error)]
#[error("{}: {source}. Stopping execution after {} completed file(s)", path.display(), completed.len())]
pub struct BatchError {
    pub completed: Vec<FileReport>,
    pub path: PathBuf,
    #[source]
    pub source: Error,
}
