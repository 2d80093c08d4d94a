// Local filesystem adapter - File system operations on the host

use crate::domain::errors::*;
use crate::ports::*;
use async_trait::async_trait;
use std::fs;
use std::io;
use std::path::Path;

/// Local filesystem adapter
#[derive(Debug, Default)]
pub struct LocalFsAdapter;

impl LocalFsAdapter {
    /// Create new local filesystem adapter
    pub fn new() -> Result<Self, DomainError> {
        Ok(Self)
    }

    /// Copy contents, then carry over access/modification times and permissions
    fn copy_preserving(from: &Path, to: &Path) -> io::Result<()> {
        let metadata = fs::metadata(from)?;

        let mut reader = fs::File::open(from)?;
        let mut writer = fs::File::create(to)?;
        io::copy(&mut reader, &mut writer)?;

        let modified = metadata.modified()?;
        let accessed = metadata.accessed().unwrap_or(modified);
        writer.set_times(
            fs::FileTimes::new()
                .set_modified(modified)
                .set_accessed(accessed),
        )?;
        drop(writer);

        // permissions last, a read-only source would otherwise block the time update
        fs::set_permissions(to, metadata.permissions())
    }
}

#[async_trait]
impl FsPort for LocalFsAdapter {
    async fn file_exists(&self, file_path: &Path) -> Result<bool, DomainError> {
        Ok(file_path.is_file())
    }

    async fn directory_exists(&self, dir_path: &Path) -> Result<bool, DomainError> {
        Ok(dir_path.is_dir())
    }

    async fn create_directory(&self, dir_path: &Path) -> Result<(), DomainError> {
        fs::create_dir_all(dir_path).map_err(|e| {
            DomainError::FsFail(format!(
                "Failed to create directory {}: {}",
                dir_path.display(),
                e
            ))
        })
    }

    async fn copy_file(&self, from: &Path, to: &Path) -> Result<(), DomainError> {
        Self::copy_preserving(from, to).map_err(|e| DomainError::CopyFailure {
            path: from.to_path_buf(),
            cause: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_copy_preserves_bytes_and_mtime() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("notes.txt");
        let dst = dir.path().join("copy.txt");
        fs::write(&src, b"lab notes\n").unwrap();

        let stamp = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);
        fs::File::options()
            .write(true)
            .open(&src)
            .unwrap()
            .set_modified(stamp)
            .unwrap();

        let fs_port = LocalFsAdapter::new().unwrap();
        fs_port.copy_file(&src, &dst).await.unwrap();

        assert_eq!(fs::read(&dst).unwrap(), b"lab notes\n");
        assert_eq!(fs::metadata(&dst).unwrap().modified().unwrap(), stamp);
    }

    #[tokio::test]
    async fn test_copy_missing_source_reports_path() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("gone.txt");
        let fs_port = LocalFsAdapter::new().unwrap();

        let err = fs_port
            .copy_file(&src, &dir.path().join("x.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::CopyFailure { ref path, .. } if path == &src));
    }

    #[tokio::test]
    async fn test_create_directory_is_recursive() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a/b/c");
        let fs_port = LocalFsAdapter::new().unwrap();

        fs_port.create_directory(&nested).await.unwrap();
        assert!(fs_port.directory_exists(&nested).await.unwrap());
        assert!(!fs_port.file_exists(&nested).await.unwrap());
    }
}
