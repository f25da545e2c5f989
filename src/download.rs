//! # Download Sinks
//!
//! Where downloaded file content ends up. The files store fetches the bytes
//! and hands them, together with a display filename, to a [`DownloadSink`].
//!
//! [`DirectorySink`] saves into a directory: the content goes to a temporary
//! file inside that directory first and is then persisted under the final
//! name, so a failed save never leaves a partial file behind. The temporary
//! handle is released on every path.
//!
//! Existing files are never replaced. When the name is taken the sink tries
//! `name (1).ext`, `name (2).ext` and so on, like a browser download.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::constants::DOWNLOAD_NAME_PREFIX;
use crate::errors::{ApiError, AppResult};
use crate::utils::{build_name_with_date_time, sanitize_filename};

/// Highest ` (n)` suffix tried before giving up on a taken name.
const MAX_DUPLICATE_SUFFIX: u32 = 999;

pub trait DownloadSink: Send + Sync {
    /// Saves `bytes` under `filename`.
    fn save(&self, filename: &str, bytes: &[u8]) -> AppResult<()>;
}

/// Saves downloads into a fixed directory.
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Preferred path for `filename`; unusable names get a generated one.
    pub fn target_path(&self, filename: &str) -> PathBuf {
        let name = sanitize_filename(filename).unwrap_or_else(|| build_name_with_date_time(DOWNLOAD_NAME_PREFIX));
        self.dir.join(name)
    }
}

/// `report.pdf` with `n = 2` becomes `report (2).pdf`; `n = 0` keeps the name.
fn numbered_path(path: &Path, n: u32) -> PathBuf {
    if n == 0 {
        return path.to_path_buf();
    }
    let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{} ({}).{}", stem, n, ext.to_string_lossy()),
        None => format!("{} ({})", stem, n),
    };
    path.with_file_name(name)
}

impl DownloadSink for DirectorySink {
    fn save(&self, filename: &str, bytes: &[u8]) -> AppResult<()> {
        let preferred = self.target_path(filename);
        let mut temp = NamedTempFile::new_in(&self.dir)?;
        temp.write_all(bytes)?;
        temp.flush()?;

        let mut n = 0;
        loop {
            let target = numbered_path(&preferred, n);
            match temp.persist_noclobber(&target) {
                Ok(_) => {
                    tracing::debug!(path = %target.display(), bytes = bytes.len(), "download saved");
                    return Ok(());
                }
                Err(e) if e.error.kind() == ErrorKind::AlreadyExists && n < MAX_DUPLICATE_SUFFIX => {
                    temp = e.file;
                    n += 1;
                }
                Err(e) => return Err(ApiError::Io(e.error)),
            }
        }
    }
}
