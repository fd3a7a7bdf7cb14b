//! Filesystem access with path-carrying errors.

use std::path::{Path, PathBuf};

use crate::session::SessionError;

/// Read a whole file.
///
/// # Errors
///
/// Returns [`SessionError::Io`] naming `path` if the read fails.
pub fn read(path: &Path) -> Result<Vec<u8>, SessionError> {
    std::fs::read(path).map_err(|source| SessionError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a whole file, creating missing parent directories.
///
/// # Errors
///
/// Returns [`SessionError::Io`] naming the path that could not be
/// created or written.
pub fn write(path: &Path, bytes: &[u8]) -> Result<(), SessionError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| SessionError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, bytes).map_err(|source| SessionError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve `path` against `base` unless it is already absolute.
#[must_use]
pub fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_join_the_base() {
        let base = Path::new("/projects/party");
        assert_eq!(
            resolve(base, Path::new("photos/a.png")),
            PathBuf::from("/projects/party/photos/a.png")
        );
    }

    #[test]
    fn absolute_paths_are_kept() {
        let base = Path::new("/projects/party");
        assert_eq!(resolve(base, Path::new("/tmp/x.png")), PathBuf::from("/tmp/x.png"));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = read(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.png"));
    }
}
