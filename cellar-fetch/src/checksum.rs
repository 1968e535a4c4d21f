//! SHA-256 checksum verification for downloaded files.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{FetchError, Result};

const CHUNK_SIZE: usize = 64 * 1024;

/// Hashes the file at `path` with SHA-256, returning its digest as a
/// lowercase hex string.
pub fn sha256_file(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|source| FetchError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; CHUNK_SIZE];

    loop {
        let read = reader.read(&mut buf).map_err(|source| FetchError::Io {
            path: path.display().to_string(),
            source,
        })?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Verifies that the file at `path` hashes to `expected` (a lowercase hex
/// SHA-256 digest), case-insensitively.
pub fn verify(path: &Path, expected: &str) -> Result<()> {
    let actual = sha256_file(path)?;
    if actual.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(FetchError::ChecksumMismatch {
            path: path.display().to_string(),
            expected: expected.to_string(),
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn matching_checksum_verifies() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        std::fs::write(&path, b"hello world").unwrap();

        let digest = sha256_file(&path).unwrap();
        assert!(verify(&path, &digest).is_ok());
    }

    #[test]
    fn checksum_comparison_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        std::fs::write(&path, b"hello world").unwrap();

        let digest = sha256_file(&path).unwrap();
        assert!(verify(&path, &digest.to_uppercase()).is_ok());
    }

    #[test]
    fn mismatched_checksum_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        std::fs::write(&path, b"hello world").unwrap();

        let err = verify(&path, "0000000000000000000000000000000000000000000000000000000000000000").unwrap_err();
        assert!(matches!(err, FetchError::ChecksumMismatch { .. }));
    }

    #[test]
    fn hashing_spans_multiple_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.bin");
        let mut file = std::fs::File::create(&path).unwrap();
        let chunk = vec![0x42u8; CHUNK_SIZE];
        file.write_all(&chunk).unwrap();
        file.write_all(&chunk).unwrap();
        file.write_all(b"tail").unwrap();
        drop(file);

        let digest = sha256_file(&path).unwrap();
        assert_eq!(digest.len(), 64);
        assert!(verify(&path, &digest).is_ok());
    }
}
