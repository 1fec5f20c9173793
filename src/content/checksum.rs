//! Content digests using SHA-256
//!
//! Documents are streamed through the hasher so large files never need to
//! be held in memory. Two files with equal digests are treated as
//! byte-identical.

use crate::error::{DocumentError, DocumentResult};
use sha2::{Digest as _, Sha256};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Fixed-length content digest
pub type Digest = [u8; 32];

/// Compute the SHA-256 digest of in-memory content
///
/// # Example
///
/// ```
/// use doc_compare::content::checksum::{compute_sha256, to_hex};
///
/// let digest = compute_sha256(b"Hello, World!");
/// assert_eq!(to_hex(&digest).len(), 64);
/// ```
pub fn compute_sha256(content: &[u8]) -> Digest {
    Sha256::digest(content).into()
}

/// Stream a reader through SHA-256
pub fn sha256_reader<R: Read>(reader: R) -> io::Result<Digest> {
    let mut reader = BufReader::with_capacity(64 * 1024, reader);
    let mut hasher = Sha256::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(hasher.finalize().into())
}

/// Digest a file on disk
pub fn sha256_file(path: &Path) -> DocumentResult<Digest> {
    let read_err = |source| DocumentError::Read {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(read_err)?;
    sha256_reader(file).map_err(read_err)
}

/// Hex rendering for logs
pub fn to_hex(digest: &Digest) -> String {
    hex::encode(digest)
}
