// Error type shared by patch creation and application.

use std::fmt;
use std::io;

/// The part of a patch (or of the old input) an operation was reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Header,
    Control,
    Diff,
    Extra,
    Old,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Header => "header",
            Self::Control => "control block",
            Self::Diff => "diff block",
            Self::Extra => "extra block",
            Self::Old => "old data",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An argument or option is unusable (zero-sized buffers, out-of-range
    /// levels, inputs too large to address).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Bad magic, negative header lengths, or control data that would write
    /// past the declared new-sequence length.
    #[error("corrupt patch: {0}")]
    CorruptPatch(String),

    /// A read asked for more bytes than remain.
    #[error("unexpected end of input while reading {section}")]
    UnexpectedEndOfInput { section: Section },

    #[error("I/O error: {0}")]
    Io(#[source] io::Error),
}

impl Error {
    /// Classify an I/O error raised while reading `section`.
    ///
    /// Short reads become `UnexpectedEndOfInput`. Malformed compressed data
    /// inside one of the patch blocks becomes `CorruptPatch`.
    pub(crate) fn reading(section: Section, e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::UnexpectedEof => Self::UnexpectedEndOfInput { section },
            io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput
                if matches!(section, Section::Control | Section::Diff | Section::Extra) =>
            {
                Self::CorruptPatch(format!("{section}: {e}"))
            }
            _ => Self::Io(e),
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Self::UnexpectedEndOfInput {
                section: Section::Old,
            }
        } else {
            Self::Io(e)
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
