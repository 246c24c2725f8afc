//! Local disk storage for uploaded event images.
//!
//! Paths stored on events are relative ("events/<name>.jpg"); this module is
//! the only place that touches the filesystem for them.

use std::path::{Path, PathBuf};

use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// ## Summary
    /// Persists an uploaded image and returns its relative path.
    ///
    /// The stored name is a fresh UUID plus a sanitized extension; nothing
    /// from the client-supplied filename survives.
    ///
    /// ## Errors
    /// Returns an error if the directory cannot be created or the write fails.
    #[tracing::instrument(skip(self, bytes), fields(len = bytes.len()))]
    pub async fn save(&self, extension: &str, bytes: &[u8]) -> ServiceResult<String> {
        let extension = sanitize_extension(extension);
        let name = format!("{}.{extension}", uuid::Uuid::new_v4().simple());

        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(&name), bytes).await?;

        tracing::debug!(name, "Stored image asset");
        Ok(format!("events/{name}"))
    }

    /// ## Summary
    /// Removes a stored image. Missing files are fine (idempotent delete).
    ///
    /// ## Errors
    /// - `InvariantViolation` for traversal-shaped paths
    /// - I/O errors other than "not found"
    pub async fn delete(&self, relative: &str) -> ServiceResult<()> {
        let target = self.resolve(relative)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Maps a stored relative path onto the storage root, rejecting anything
    /// that tries to escape it.
    fn resolve(&self, relative: &str) -> ServiceResult<PathBuf> {
        let path = Path::new(relative);
        let escapes = path.is_absolute()
            || path
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir));
        if escapes {
            return Err(ServiceError::InvariantViolation(
                "image path escapes the storage root",
            ));
        }

        // Stored paths carry the "events/" prefix the public URL uses; on
        // disk everything lives flat under the configured root.
        let name = path
            .file_name()
            .ok_or(ServiceError::InvariantViolation("image path has no name"))?;
        Ok(self.root.join(name))
    }
}

fn sanitize_extension(extension: &str) -> String {
    let cleaned: String = extension
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(5)
        .collect::<String>()
        .to_ascii_lowercase();

    if cleaned.is_empty() {
        "jpg".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_sanitized() {
        assert_eq!(sanitize_extension("JPG"), "jpg");
        assert_eq!(sanitize_extension("p/n\\g"), "png");
        assert_eq!(sanitize_extension("../etc"), "etc");
        assert_eq!(sanitize_extension(""), "jpg");
    }

    #[test]
    fn traversal_paths_are_rejected() {
        let store = ImageStore::new("storage/events");
        assert!(store.resolve("../secrets.txt").is_err());
        assert!(store.resolve("/etc/passwd").is_err());
    }

    #[test]
    fn stored_paths_resolve_to_the_root() {
        let store = ImageStore::new("storage/events");
        let path = store.resolve("events/abc123.jpg").unwrap();
        assert_eq!(path, Path::new("storage/events").join("abc123.jpg"));
    }
}
