use std::path::PathBuf;

/// The primary error type for all operations in the `blitzcrack` crate.
#[derive(Debug)]
pub enum CrackError {
    /// An invalid search configuration: bad alphabet, zero length or
    /// workers, or a keyspace too large for a 64-bit index.
    /// Always raised before any worker is spawned.
    Config(String),

    /// An I/O error occurred, typically while opening or reading the
    /// archive or writing the recovered password.
    /// Includes the path where the error happened.
    Io { source: std::io::Error, path: PathBuf },

    /// The file exists but is not a readable ZIP container.
    Archive { reason: String, path: PathBuf },

    /// The archive has no non-empty member to test candidates against.
    NoTestMember { path: PathBuf },
}

impl std::fmt::Display for CrackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CrackError::Config(msg) => write!(f, "Invalid configuration: {}", msg),
            CrackError::Io { source, path } => write!(f, "I/O error on path '{}': {}", path.display(), source),
            CrackError::Archive { reason, path } => write!(f, "Bad archive '{}': {}", path.display(), reason),
            CrackError::NoTestMember { path } => write!(f, "Archive '{}' contains no non-empty member to verify against", path.display()),
        }
    }
}

impl std::error::Error for CrackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CrackError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CrackError {
    fn from(err: std::io::Error) -> Self {
        CrackError::Io { source: err, path: PathBuf::new() } // Generic path
    }
}

impl CrackError {
    /// Attach path context to an I/O error.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        CrackError::Io { source, path: path.into() }
    }
}
