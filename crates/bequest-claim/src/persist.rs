//! Persistence of the decrypted asset.
//!
//! The single file write is the pipeline's only external side effect. The
//! filename is derived deterministically: an 8-hex-char prefix of the
//! inheritance ID plus the extension inferred from the storage metadata.

use bequest_core::types::InheritanceId;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Write the plaintext once and report where and how much.
pub fn write_asset(
    output_dir: &Path,
    id: &InheritanceId,
    extension: &str,
    plaintext: &[u8],
) -> io::Result<(PathBuf, u64)> {
    fs::create_dir_all(output_dir)?;

    let filename = format!("{}.{}", id.short_prefix(), extension);
    let path = output_dir.join(filename);
    fs::write(&path, plaintext)?;

    tracing::info!(path = %path.display(), size = plaintext.len(), "decrypted asset written");
    Ok((path, plaintext.len() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_from_id_prefix_and_extension() {
        let dir = tempfile::tempdir().unwrap();
        let id = InheritanceId([0xCD; 32]);

        let (path, size) = write_asset(dir.path(), &id, "pdf", b"document").unwrap();

        assert_eq!(path.file_name().unwrap(), "cdcdcdcd.pdf");
        assert_eq!(size, 8);
        assert_eq!(fs::read(&path).unwrap(), b"document");
    }

    #[test]
    fn test_creates_missing_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("claims");
        let id = InheritanceId([0u8; 32]);

        let (path, _) = write_asset(&nested, &id, "bin", &[0x01]).unwrap();
        assert!(path.starts_with(&nested));
        assert!(path.exists());
    }
}
