//! Artifact extraction
//!
//! Any string result naming an existing local file is an artifact. It is
//! moved into the test case's directory under the run directory and the
//! result value is rewritten to the new location.

use std::io;
use std::path::{Path, PathBuf};

use crate::result::{ResultMap, Value};

/// Move every artifact referenced by `results` into `artifact_dir`
///
/// Walks nested maps to any depth. Values already inside `artifact_dir`
/// are left untouched, so running this twice is harmless. An artifact that
/// cannot be moved is logged and keeps its original value. Returns the
/// number of files moved.
pub fn extract_artifacts(results: &mut ResultMap, artifact_dir: &Path) -> usize {
    let mut moved = 0;

    for (key, value) in results.iter_mut() {
        match value {
            Value::Nested(map) => moved += extract_artifacts(map, artifact_dir),
            Value::Str(s) => match relocate(Path::new(s.as_str()), artifact_dir) {
                Ok(Some(new_path)) => {
                    tracing::debug!(%key, from = %s, to = %new_path.display(), "Artifact extracted");
                    *s = new_path.to_string_lossy().into_owned();
                    moved += 1;
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::error!(%key, path = %s, error = %e, "Failed to extract artifact");
                }
            },
        }
    }

    moved
}

/// Move one file into `artifact_dir`, returning its new path
fn relocate(path: &Path, artifact_dir: &Path) -> io::Result<Option<PathBuf>> {
    if !path.is_file() || path.parent() == Some(artifact_dir) {
        return Ok(None);
    }
    let Some(file_name) = path.file_name() else {
        return Ok(None);
    };

    std::fs::create_dir_all(artifact_dir)?;
    let destination = artifact_dir.join(file_name);
    if destination.exists() {
        tracing::warn!(path = %destination.display(), "Overwriting existing artifact");
    }

    move_file(path, &destination)?;
    Ok(Some(destination))
}

/// Rename, falling back to copy + remove across filesystems
///
/// On failure the source is still in place and no copy is left behind.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    let rename_err = match std::fs::rename(from, to) {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };

    if std::fs::copy(from, to).is_err() {
        let _ = std::fs::remove_file(to);
        return Err(rename_err);
    }
    if let Err(e) = std::fs::remove_file(from) {
        let _ = std::fs::remove_file(to);
        return Err(e);
    }
    Ok(())
}
