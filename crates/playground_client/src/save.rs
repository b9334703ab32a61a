use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use playground_logging::playground_info;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("{0:?} is not a plain file name")]
    InvalidFilename(String),
    #[error("cannot write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Write `contents` to `{dir}/{filename}`, creating `dir` when missing.
///
/// The file is written next to its target and renamed into place, so readers
/// see either the previous contents or the new ones. `filename` must be a bare
/// file name such as `playground.ic`.
pub fn save_download(dir: &Path, filename: &str, contents: &str) -> Result<PathBuf, SaveError> {
    let is_bare = Path::new(filename)
        .file_name()
        .is_some_and(|name| name == filename);
    if !is_bare {
        return Err(SaveError::InvalidFilename(filename.to_string()));
    }

    fs::create_dir_all(dir).map_err(|source| SaveError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let target = dir.join(filename);
    let failed = |source: io::Error| SaveError::Io {
        path: target.clone(),
        source,
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(failed)?;
    tmp.write_all(contents.as_bytes()).map_err(failed)?;
    tmp.as_file().sync_all().map_err(failed)?;
    tmp.persist(&target).map_err(|err| failed(err.error))?;

    playground_info!("Saved {} bytes to {:?}", contents.len(), target);
    Ok(target)
}
