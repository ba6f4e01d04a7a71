use std::path::Path;

use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    File,
    Directory,
}

#[derive(Debug, thiserror::Error)]
pub enum LocalPathError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("{0} is neither a regular file nor a directory")]
    UnknownType(String),
    #[error("walking {path}: {source}")]
    Walk {
        path: String,
        source: walkdir::Error,
    },
}

/// Whether `path` is a regular file or a directory.
///
/// Symlinks are followed; sockets, fifos and devices are rejected.
pub fn path_kind(path: &Path) -> Result<PathKind, LocalPathError> {
    let metadata = std::fs::metadata(path).map_err(|source| LocalPathError::Io {
        path: path.display().to_string(),
        source,
    })?;

    if metadata.is_dir() {
        Ok(PathKind::Directory)
    } else if metadata.is_file() {
        Ok(PathKind::File)
    } else {
        Err(LocalPathError::UnknownType(path.display().to_string()))
    }
}

/// Size in bytes of `path`: its length for a file, or the summed
///  length of every file beneath it for a directory.
pub fn dir_size(path: &Path) -> Result<u64, LocalPathError> {
    let mut total = 0;
    for entry in WalkDir::new(path) {
        let entry = entry.map_err(|source| LocalPathError::Walk {
            path: path.display().to_string(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let metadata = entry.metadata().map_err(|source| LocalPathError::Walk {
            path: entry.path().display().to_string(),
            source,
        })?;
        total += metadata.len();
    }
    Ok(total)
}
