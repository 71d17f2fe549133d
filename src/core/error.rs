use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Dataset could not be read or decoded. Retry by loading again.
    Load,
    /// Collection file has the wrong schema, version or shape.
    Format,
    /// Durable write failed. In-memory state stays authoritative.
    Storage,
    Io,
    Parse,
    InvalidState,
    Internal,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub kind: ErrorKind,
    pub context: String,
}

impl Error {
    pub fn new(kind: ErrorKind, context: impl Into<String>) -> Self {
        Error { kind, context: context.into() }
    }

    pub fn load(context: impl Into<String>) -> Self {
        Self::new(ErrorKind::Load, context)
    }

    pub fn format(context: impl Into<String>) -> Self {
        Self::new(ErrorKind::Format, context)
    }

    pub fn storage(context: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, context)
    }

    pub fn is_format(&self) -> bool {
        self.kind == ErrorKind::Format
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.context)
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error {
            kind: ErrorKind::Io,
            context: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            kind: ErrorKind::Parse,
            context: err.to_string(),
        }
    }
}

impl From<fst::Error> for Error {
    fn from(err: fst::Error) -> Self {
        Error {
            kind: ErrorKind::Internal,
            context: format!("FST error: {}", err),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
