//! Local staging of uploads
//!
//! Every staged file is owned by a [`StagedFile`], which removes it from disk
//! when dropped, whichever way the request ends.

use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};

use crate::error::ProcessingError;

const COPY_BUFFER_BYTES: usize = 64 * 1024;

/// Error an upload reader yields once the request body hits its size limit.
///
/// Readers wrap it in an `io::Error`; staging reports it as
/// [`ProcessingError::TooLarge`] instead of a receive failure.
#[derive(Debug, thiserror::Error)]
#[error("request body exceeded its size limit")]
pub struct BodyLimitExceeded;

fn receive_error(err: std::io::Error, ceiling: u64) -> ProcessingError {
    let limit_hit = err
        .get_ref()
        .is_some_and(|inner| inner.is::<BodyLimitExceeded>());
    if limit_hit {
        ProcessingError::TooLarge { max: ceiling }
    } else {
        ProcessingError::Receive(err)
    }
}

/// A file in the staging directory, deleted on drop.
#[derive(Debug)]
pub struct StagedFile {
    path: TempPath,
    size: u64,
}

impl StagedFile {
    /// Take ownership of `path`, which a tool is about to create.
    ///
    /// The file is removed on drop even if the tool only wrote part of it.
    /// Relative paths are resolved against the current directory.
    pub fn adopt(path: impl AsRef<Path>) -> Result<Self, ProcessingError> {
        let path = TempPath::try_from_path(path.as_ref()).map_err(ProcessingError::Staging)?;
        Ok(Self { path, size: 0 })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes written while staging. Zero for adopted files.
    pub fn size(&self) -> u64 {
        self.size
    }
}

/// Writes upload streams into uniquely named files under one directory.
#[derive(Debug, Clone)]
pub struct Stager {
    dir: PathBuf,
}

impl Stager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copy `reader` into a new staging file, failing once more than
    /// `ceiling` bytes arrive.
    #[tracing::instrument(skip(self, reader), fields(staging.dir = %self.dir.display()))]
    pub async fn stage<R>(
        &self,
        reader: R,
        ceiling: u64,
        suffix: &str,
    ) -> Result<StagedFile, ProcessingError>
    where
        R: AsyncRead + Unpin + Send,
    {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(ProcessingError::Staging)?;

        let named = tempfile::Builder::new()
            .prefix("tubely-upload-")
            .suffix(suffix)
            .tempfile_in(&self.dir)
            .map_err(ProcessingError::Staging)?;
        let (file, path) = named.into_parts();
        let mut staged = StagedFile { path, size: 0 };

        let mut file = tokio::fs::File::from_std(file);
        // One byte past the ceiling is enough to know the upload is too large.
        let mut limited = reader.take(ceiling + 1);
        let mut buf = vec![0u8; COPY_BUFFER_BYTES];
        let mut written = 0u64;
        loop {
            let n = limited
                .read(&mut buf)
                .await
                .map_err(|e| receive_error(e, ceiling))?;
            if n == 0 {
                break;
            }
            file.write_all(&buf[..n])
                .await
                .map_err(ProcessingError::Staging)?;
            written += n as u64;
        }

        if written > ceiling {
            tracing::debug!(ceiling, "Upload exceeded staging ceiling");
            return Err(ProcessingError::TooLarge { max: ceiling });
        }

        file.flush().await.map_err(ProcessingError::Staging)?;
        file.sync_all().await.map_err(ProcessingError::Staging)?;
        staged.size = written;

        tracing::debug!(
            path = %staged.path().display(),
            size_bytes = written,
            "Upload staged"
        );
        Ok(staged)
    }
}
