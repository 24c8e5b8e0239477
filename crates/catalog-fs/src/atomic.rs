//! Atomic file replacement.

use crate::error::Result;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Replace `path` with `content` in one rename.
///
/// The temp file lives next to the target so the rename stays on one
/// filesystem. On any failure the target keeps its previous content and the
/// temp file is removed when dropped.
///
/// # Errors
/// Returns `FsError::Io` if the temp file cannot be created or written, or
/// `FsError::Persist` if the rename fails.
pub fn atomic_write(path: &Path, content: &str) -> Result<()> {
    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no parent directory")
    })?;

    let mut temp_file = NamedTempFile::new_in(parent)?;
    temp_file.write_all(content.as_bytes())?;
    temp_file.as_file().sync_all()?;
    temp_file.persist(path)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_overwrites_without_leftovers() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("products.yml");
        std::fs::write(&path, "initial").unwrap();

        atomic_write(&path, "updated").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "updated");
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_atomic_write_fails_with_missing_parent() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing/dir/products.yml");

        assert!(atomic_write(&path, "content").is_err());
    }
}
