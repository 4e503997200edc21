//! User directory backed by a JSON roster file.

use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crewbook_types::{ErrorCode, Failure, Resource};

use crate::startup::UserDirectory;

/// A JSON array of user records; only the number of entries is read.
#[derive(Debug, Clone)]
pub struct RosterFile {
    path: PathBuf,
}

impl RosterFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl UserDirectory for RosterFile {
    async fn user_count(&self) -> Resource<usize> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No roster file; treating as empty");
                return Resource::success(0);
            }
            Err(err) => {
                let message = format!("failed to read roster {}: {err}", self.path.display());
                return Failure::new(message)
                    .with_cause(err)
                    .with_code(ErrorCode::StorageError)
                    .into();
            }
        };
        count_entries(&content)
    }
}

fn count_entries(content: &str) -> Resource<usize> {
    if content.trim().is_empty() {
        return Resource::success(0);
    }

    match serde_json::from_str::<Value>(content) {
        Ok(Value::Array(entries)) => Resource::success(entries.len()),
        Ok(_) => Resource::error_with(
            "roster must be a JSON array",
            None,
            ErrorCode::ValidationFailed,
        ),
        Err(err) => Failure::new(format!("malformed roster: {err}"))
            .with_cause(err)
            .with_code(ErrorCode::ValidationFailed)
            .into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_array_entries() {
        let roster = r#"[{"name": "owner"}, {"name": "foreman"}]"#;
        assert_eq!(count_entries(roster), Resource::success(2));
        assert_eq!(count_entries("[]"), Resource::success(0));
        assert_eq!(count_entries("  \n"), Resource::success(0));
    }

    #[test]
    fn rejects_non_array() {
        let r = count_entries(r#"{"users": []}"#);
        let failure = r.failure().unwrap();
        assert_eq!(failure.code(), ErrorCode::ValidationFailed);
        assert!(failure.cause().is_none());
    }

    #[test]
    fn malformed_json_keeps_cause() {
        let r = count_entries("[{");
        let failure = r.failure().unwrap();
        assert_eq!(failure.code(), ErrorCode::ValidationFailed);
        assert!(failure.message().starts_with("malformed roster"));
        assert!(failure.cause().is_some());
    }

    #[tokio::test]
    async fn missing_file_is_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let roster = RosterFile::new(dir.path().join("users.json"));
        assert_eq!(roster.user_count().await, Resource::success(0));
    }

    #[tokio::test]
    async fn reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, r#"[{"name": "a"}, {"name": "b"}, {"name": "c"}]"#).unwrap();

        let roster = RosterFile::new(&path);
        assert_eq!(roster.path(), path.as_path());
        assert_eq!(roster.user_count().await, Resource::success(3));
    }

    #[tokio::test]
    async fn directory_path_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let roster = RosterFile::new(dir.path());
        let failure = roster.user_count().await.failure().cloned().unwrap();
        assert_eq!(failure.code(), ErrorCode::StorageError);
        assert!(failure.cause().is_some());
    }
}
