//! Durable storage for the archive blob.
//!
//! The default format is one zstd-compressed JSON document per location, fully
//! rewritten on every save: written to `<path>.tmp`, synced, then renamed over the
//! destination.

use crate::archive::{Archive, ARCHIVE_FORMAT_VERSION};
use crate::config::StoreOptions;
use crate::error::ArchiveError;
use crate::util::{create_with_backoff, open_with_backoff, remove_with_backoff, replace_file_atomic_backoff};
use anyhow::{anyhow, Context};
use std::ffi::OsString;
use std::fs;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use zstd::stream::read::Decoder;
use zstd::stream::write::Encoder;

/// Load/store contract for an archive location.
pub trait ArchiveStorage {
    /// `Ok(None)` when nothing exists at `location` yet. A present but undecodable blob
    /// is `ArchiveError::Corrupt`.
    fn load(&self, location: &Path) -> Result<Option<Archive>, ArchiveError>;

    /// Overwrite whatever is at `location` with `archive`.
    fn store(&self, location: &Path, archive: &Archive) -> Result<(), ArchiveError>;
}

#[derive(Clone, Debug)]
pub struct ZstdJsonStorage {
    level: i32,
    read_buffer_bytes: usize,
    write_buffer_bytes: usize,
}

impl Default for ZstdJsonStorage {
    fn default() -> Self {
        Self::new(&StoreOptions::default())
    }
}

impl ZstdJsonStorage {
    pub fn new(opts: &StoreOptions) -> Self {
        Self {
            level: opts.zstd_level,
            read_buffer_bytes: opts.read_buffer_bytes,
            write_buffer_bytes: opts.write_buffer_bytes,
        }
    }

    fn write_tmp(&self, tmp: &Path, archive: &Archive) -> anyhow::Result<()> {
        let f = create_with_backoff(tmp).with_context(|| format!("create {}", tmp.display()))?;
        let w = BufWriter::with_capacity(self.write_buffer_bytes, f);
        let mut enc = Encoder::new(w, self.level)?;
        serde_json::to_writer(&mut enc, archive).context("serialize archive")?;
        let mut w = enc.finish().context("finish zstd frame")?;
        w.flush()?;
        let f = w.into_inner().map_err(|e| e.into_error())?;
        f.sync_all().with_context(|| format!("sync {}", tmp.display()))?;
        Ok(())
    }
}

fn tmp_path(location: &Path) -> PathBuf {
    let mut s: OsString = location.as_os_str().to_owned();
    s.push(".tmp");
    PathBuf::from(s)
}

impl ArchiveStorage for ZstdJsonStorage {
    fn load(&self, location: &Path) -> Result<Option<Archive>, ArchiveError> {
        let file = match open_with_backoff(location) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ArchiveError::Io {
                    path: location.to_path_buf(),
                    source: anyhow::Error::new(e).context("open archive"),
                })
            }
        };

        let corrupt = |source: anyhow::Error| ArchiveError::Corrupt { path: location.to_path_buf(), source };

        let decoder = Decoder::new(file).map_err(|e| corrupt(anyhow::Error::new(e).context("init zstd decoder")))?;
        let reader = BufReader::with_capacity(self.read_buffer_bytes, decoder);
        let archive: Archive =
            serde_json::from_reader(reader).map_err(|e| corrupt(anyhow::Error::new(e).context("decode archive")))?;

        if archive.version != ARCHIVE_FORMAT_VERSION {
            return Err(corrupt(anyhow!(
                "unsupported archive format version {} (expected {})",
                archive.version,
                ARCHIVE_FORMAT_VERSION
            )));
        }
        Ok(Some(archive))
    }

    fn store(&self, location: &Path, archive: &Archive) -> Result<(), ArchiveError> {
        let io_err = |source: anyhow::Error| ArchiveError::Io { path: location.to_path_buf(), source };

        if let Some(parent) = location.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))
                .map_err(io_err)?;
        }

        let tmp = tmp_path(location);
        if let Err(e) = self.write_tmp(&tmp, archive) {
            let _ = remove_with_backoff(&tmp);
            return Err(io_err(e));
        }
        if let Err(e) = replace_file_atomic_backoff(&tmp, location) {
            let _ = remove_with_backoff(&tmp);
            return Err(io_err(e));
        }
        Ok(())
    }
}
