//! An explicit storage-location handle for user-submitted files.
//!
//! Each session owns one `UploadStore` directory. Files are written verbatim under their
//! base name; a repeated name overwrites the earlier file (last write wins).

pub mod csv;
pub mod extract;
pub mod handlers;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::errors::AppError;
use crate::models::runbook::UploadedFileRef;

/// Extensions accepted at the upload boundary. Compared case-insensitively.
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "docx", "txt", "md", "csv"];
/// Files per upload request, at least one.
pub const MIN_FILES_PER_UPLOAD: usize = 1;
/// Distinct files a session may hold across all of its uploads.
pub const MAX_FILES_PER_SESSION: usize = 10;

#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    /// Opens (creating if needed) the storage directory.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, AppError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        debug!("Upload store ready at {}", root.display());
        Ok(Self { root })
    }

    #[cfg(test)]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `bytes` under the base name of `name`, replacing any existing file.
    pub async fn save(&self, name: &str, bytes: &[u8]) -> Result<UploadedFileRef, AppError> {
        let file_name = sanitize_file_name(name)?;
        validate_extension(&file_name)?;

        tokio::fs::write(self.root.join(&file_name), bytes).await?;
        info!(
            "Saved upload {} ({} bytes) to {}",
            file_name,
            bytes.len(),
            self.root.display()
        );

        Ok(UploadedFileRef::new(file_name))
    }

    /// Names of the files currently stored, sorted so the order is stable for a given state.
    pub async fn list(&self) -> Result<Vec<UploadedFileRef>, AppError> {
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let mut files = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                files.push(UploadedFileRef::new(name));
            }
        }

        files.sort();
        Ok(files)
    }

    pub async fn read(&self, file: &UploadedFileRef) -> Result<Vec<u8>, AppError> {
        let file_name = sanitize_file_name(file.name())?;
        match tokio::fs::read(self.root.join(&file_name)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::NotFound(format!("Upload {file_name} not found")))
            }
            Err(e) => Err(AppError::Storage(e)),
        }
    }

    /// Removes the storage directory and everything in it.
    pub async fn clear(&self) -> Result<(), AppError> {
        match tokio::fs::remove_dir_all(&self.root).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(e)),
        }
    }
}

/// Keeps only the final path component of a client-reported name.
fn sanitize_file_name(name: &str) -> Result<String, AppError> {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    if base.is_empty() || base == "." || base == ".." {
        return Err(AppError::Validation(format!("Invalid file name: {name:?}")));
    }
    Ok(base.to_string())
}

/// Lower-cased extension of a file name, if it has one.
pub fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

pub fn validate_extension(name: &str) -> Result<(), AppError> {
    match extension_of(name) {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => Err(AppError::Validation(format!(
            "Unsupported file type for {name}. Allowed: {}",
            ALLOWED_EXTENSIONS.join(", ")
        ))),
    }
}

/// Checks a request against the per-session cap. Names already stored, or repeated
/// within the request, overwrite and so do not count twice.
pub fn validate_file_count(
    existing: &[UploadedFileRef],
    incoming: &[String],
) -> Result<(), AppError> {
    if incoming.len() < MIN_FILES_PER_UPLOAD {
        return Err(AppError::Validation(format!(
            "Upload between {MIN_FILES_PER_UPLOAD}-{MAX_FILES_PER_SESSION} pet care files (got {})",
            incoming.len()
        )));
    }

    let mut names: BTreeSet<String> = existing.iter().map(|f| f.name().to_string()).collect();
    for name in incoming {
        names.insert(sanitize_file_name(name)?);
    }

    if names.len() > MAX_FILES_PER_SESSION {
        return Err(AppError::Validation(format!(
            "A session holds at most {MAX_FILES_PER_SESSION} pet care files \
             ({} stored, this upload would make {})",
            existing.len(),
            names.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(sanitize_file_name("../../etc/passwd.txt").unwrap(), "passwd.txt");
        assert_eq!(sanitize_file_name("C:\\pets\\rex.md").unwrap(), "rex.md");
        assert!(sanitize_file_name("uploads/").is_err());
        assert!(sanitize_file_name("..").is_err());
    }

    #[test]
    fn test_extension_allow_list_is_case_insensitive() {
        assert!(validate_extension("Vaccines.PDF").is_ok());
        assert!(validate_extension("notes.md").is_ok());
        assert!(validate_extension("photo.png").is_err());
        assert!(validate_extension("README").is_err());
    }

    fn names(n: usize, prefix: &str) -> Vec<String> {
        (0..n).map(|i| format!("{prefix}{i}.txt")).collect()
    }

    #[test]
    fn test_file_count_bounds() {
        assert!(validate_file_count(&[], &[]).is_err());
        assert!(validate_file_count(&[], &names(1, "a")).is_ok());
        assert!(validate_file_count(&[], &names(10, "a")).is_ok());
        assert!(validate_file_count(&[], &names(11, "a")).is_err());
    }

    #[test]
    fn test_file_count_includes_stored_files() {
        let stored: Vec<UploadedFileRef> =
            names(8, "old").into_iter().map(UploadedFileRef::new).collect();
        assert!(validate_file_count(&stored, &names(2, "new")).is_ok());
        assert!(validate_file_count(&stored, &names(3, "new")).is_err());
    }

    #[test]
    fn test_file_count_ignores_overwrites() {
        let stored: Vec<UploadedFileRef> =
            names(10, "a").into_iter().map(UploadedFileRef::new).collect();
        assert!(validate_file_count(&stored, &names(10, "a")).is_ok());
        let repeated = vec!["dir/a0.txt".to_string(), "a0.txt".to_string()];
        assert!(validate_file_count(&stored, &repeated).is_ok());
    }

    #[tokio::test]
    async fn test_save_then_list_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::open(dir.path().join("session")).await.unwrap();

        store.save("feeding_notes.txt", b"twice daily").await.unwrap();
        store.save("vaccine_record.pdf", b"%PDF").await.unwrap();
        store.save("allergies.md", b"none").await.unwrap();

        let names: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.0)
            .collect();
        assert_eq!(
            names,
            vec!["allergies.md", "feeding_notes.txt", "vaccine_record.pdf"]
        );
    }

    #[tokio::test]
    async fn test_duplicate_name_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::open(dir.path()).await.unwrap();

        store.save("notes.txt", b"first").await.unwrap();
        let file = store.save("notes.txt", b"second").await.unwrap();

        assert_eq!(store.list().await.unwrap().len(), 1);
        assert_eq!(store.read(&file).await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::open(dir.path()).await.unwrap();
        let err = store.read(&UploadedFileRef::new("nope.txt")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_clear_removes_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("s1");
        let store = UploadStore::open(&root).await.unwrap();
        store.save("a.txt", b"a").await.unwrap();

        store.clear().await.unwrap();
        assert!(!root.exists());
        // Clearing twice is fine.
        store.clear().await.unwrap();
    }
}
