//! Candidate verification against a password-protected ZIP container.
//!
//! Every candidate is tested by decrypting a single representative member
//! instead of the whole archive. The container is validated once up front
//! ([`ArchiveHandle::open`]); after that the only outcomes a candidate can
//! produce are "wrong password" and a genuine resource failure, and the
//! two are never conflated. `zip::ZipArchive` hands out entries through
//! `&mut self`, so worker threads never share one handle: each opens its
//! own [`MemberVerifier`] onto the same file.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::CrackError;

/// The seam between the search engine and the archive library.
///
/// `Ok(false)` is the expected-negative "wrong password" outcome and never
/// aborts a search; `Err` is a resource failure and always does.
pub trait PasswordCheck {
    fn check(&mut self, password: &str) -> Result<bool, CrackError>;
}

/// A validated archive plus the member candidates are tested against.
#[derive(Debug, Clone)]
pub struct ArchiveHandle {
    path: PathBuf,
    member_index: usize,
    member_name: String,
}

impl ArchiveHandle {
    /// Open `path`, check that it is a readable ZIP container and pick the
    /// representative member: the first non-empty, non-directory entry.
    ///
    /// All structural failures surface here, before any worker exists.
    pub fn open(path: &Path) -> Result<Self, CrackError> {
        let file = File::open(path).map_err(|e| CrackError::io(e, path))?;
        let mut container = ZipArchive::new(file).map_err(|e| container_error(e, path))?;
        for index in 0..container.len() {
            let entry = container
                .by_index_raw(index)
                .map_err(|e| container_error(e, path))?;
            if !entry.is_dir() && entry.size() > 0 {
                let member_name = entry.name().to_string();
                return Ok(Self {
                    path: path.to_path_buf(),
                    member_index: index,
                    member_name,
                });
            }
        }
        Err(CrackError::NoTestMember { path: path.to_path_buf() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the member candidates are verified against.
    pub fn member_name(&self) -> &str {
        &self.member_name
    }

    /// Open an independent verifier onto this archive.
    ///
    /// Called once per worker thread.
    pub fn verifier(&self) -> Result<MemberVerifier, CrackError> {
        let file = File::open(&self.path).map_err(|e| CrackError::io(e, &self.path))?;
        let container = ZipArchive::new(file).map_err(|e| container_error(e, &self.path))?;
        Ok(MemberVerifier {
            container,
            member_index: self.member_index,
            path: self.path.clone(),
            scratch: Vec::new(),
        })
    }
}

/// One worker's private view of the archive.
pub struct MemberVerifier {
    container: ZipArchive<File>,
    member_index: usize,
    path: PathBuf,
    scratch: Vec<u8>,
}

impl PasswordCheck for MemberVerifier {
    fn check(&mut self, password: &str) -> Result<bool, CrackError> {
        let entry = match self
            .container
            .by_index_decrypt(self.member_index, password.as_bytes())
        {
            Ok(Ok(entry)) => entry,
            // The ZipCrypto check byte rejected the candidate outright.
            Ok(Err(_)) => return Ok(false),
            Err(ZipError::Io(source)) => return Err(CrackError::io(source, &self.path)),
            Err(other) => return Err(container_error(other, &self.path)),
        };

        self.scratch.clear();
        let mut entry = entry;
        match entry.read_to_end(&mut self.scratch) {
            Ok(n) => Ok(n > 0),
            // A wrong candidate can slip past the 1-byte check and then
            // fail CRC/inflate mid-stream. Those errors are created by the
            // decoder libraries, not the OS, and mean "wrong password".
            Err(e) if is_integrity_mismatch(&e) => Ok(false),
            Err(e) => Err(CrackError::io(e, &self.path)),
        }
    }
}

// Library-originated read failures (corrupt deflate stream, checksum
// mismatch) arrive as hand-built io::Errors with these kinds; raw OS
// errors map to concrete or uncategorized kinds and stay fatal.
fn is_integrity_mismatch(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput | io::ErrorKind::Other
    )
}

fn container_error(err: ZipError, path: &Path) -> CrackError {
    match err {
        ZipError::Io(source) => CrackError::Io { source, path: path.to_path_buf() },
        other => CrackError::Archive {
            reason: other.to_string(),
            path: path.to_path_buf(),
        },
    }
}
