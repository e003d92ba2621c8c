use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::thread::sleep;
use std::time::Duration;

static INIT_ONCE: std::sync::Once = std::sync::Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG` (default `info`). Safe to call
/// repeatedly; a subscriber installed by the host application wins.
pub fn init_tracing_once() {
    INIT_ONCE.call_once(|| {
        let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let _ = tracing_subscriber::fmt().with_env_filter(env_filter).try_init();
    });
}

const TRIES: usize = 20;
const DELAY_MS: u64 = 50;

/// Transient errors seen when AV/backup filter drivers or sync clients hold the file
/// on Windows (access denied, sharing/lock violation, device not ready). The raw codes
/// mean unrelated things elsewhere (21 is EISDIR on Linux), so nothing is retried there.
fn is_retriable_io_error(e: &io::Error) -> bool {
    cfg!(windows) && matches!(e.raw_os_error(), Some(5) | Some(21) | Some(32) | Some(33) | Some(1224))
}

/// Run `op` until it succeeds, fails with a non-transient error, or tries run out.
/// Back-off grows linearly with the attempt number.
fn with_backoff<T>(mut op: impl FnMut() -> io::Result<T>) -> io::Result<T> {
    let mut last_err: Option<io::Error> = None;
    for i in 0..TRIES {
        match op() {
            Ok(v) => return Ok(v),
            Err(e) if is_retriable_io_error(&e) => {
                last_err = Some(e);
                sleep(Duration::from_millis(DELAY_MS.saturating_mul((i + 1) as u64)));
            }
            Err(e) => return Err(e),
        }
    }
    Err(last_err.unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "retries exhausted")))
}

pub fn open_with_backoff(path: &Path) -> io::Result<File> {
    with_backoff(|| File::open(path))
}

pub fn create_with_backoff(path: &Path) -> io::Result<File> {
    with_backoff(|| File::create(path))
}

/// Succeeds if the file doesn't exist.
pub fn remove_with_backoff(path: &Path) -> Result<()> {
    with_backoff(|| match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    })
    .with_context(|| format!("remove {}", path.display()))
}

/// Replace `dest` with `tmp`. Rename is atomic on the same filesystem; if it keeps
/// failing (sharing violations), fall back to copy + remove. The fallback is NOT
/// atomic: a crash mid-copy can leave `dest` truncated while `tmp` still holds the
/// full content.
pub fn replace_file_atomic_backoff(tmp: &Path, dest: &Path) -> Result<()> {
    match with_backoff(|| fs::rename(tmp, dest)) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            tracing::warn!("rename {} -> {} failed ({}), falling back to copy", tmp.display(), dest.display(), rename_err);
            with_backoff(|| fs::copy(tmp, dest))
                .with_context(|| format!("copy {} -> {}", tmp.display(), dest.display()))?;
            remove_with_backoff(tmp)
        }
    }
}
