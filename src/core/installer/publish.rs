// ─── Publishing ───
// Makes a stored file visible in the mods directory. The new entry is built
// under a hidden temporary name and renamed onto the visible name, so a
// failure never leaves a half-written visible entry behind.

use std::io;
use std::path::Path;

use tracing::debug;
use uuid::Uuid;

use crate::core::error::{ModError, ModResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishMethod {
    Symlink,
    Copy,
}

#[cfg(unix)]
async fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    tokio::fs::symlink(target, link).await
}

#[cfg(windows)]
async fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    tokio::fs::symlink_file(target, link).await
}

#[cfg(not(any(unix, windows)))]
async fn symlink(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(io::ErrorKind::Unsupported, "symlinks unsupported"))
}

/// Link (or copy, when links are unsupported) `stored` to `visible`,
/// replacing whatever was at `visible`.
pub async fn publish(stored: &Path, visible: &Path) -> ModResult<PublishMethod> {
    publish_with(stored, visible, true).await
}

/// Same as [`publish`], but `prefer_link = false` always copies.
pub async fn publish_with(
    stored: &Path,
    visible: &Path,
    prefer_link: bool,
) -> ModResult<PublishMethod> {
    let parent = visible
        .parent()
        .ok_or_else(|| ModError::Config(format!("visible path {visible:?} has no parent")))?;
    let name = visible
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let partial = parent.join(format!(".{name}.{}.partial", Uuid::new_v4().simple()));

    let target = tokio::fs::canonicalize(stored)
        .await
        .map_err(|e| ModError::io(stored, e))?;

    let linked = if prefer_link {
        match symlink(&target, &partial).await {
            Ok(()) => true,
            Err(e) => {
                debug!("Symlink into {:?} failed ({}), copying instead", parent, e);
                false
            }
        }
    } else {
        false
    };

    let method = if linked {
        PublishMethod::Symlink
    } else {
        if let Err(e) = tokio::fs::copy(&target, &partial).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(ModError::io(&partial, e));
        }
        PublishMethod::Copy
    };

    if let Err(e) = replace(&partial, visible).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(ModError::io(visible, e));
    }

    Ok(method)
}

/// Rename `from` onto `to`. A directory sitting at `to` cannot be renamed
/// over, so it is cleared and the rename retried; any other failure is
/// returned as is and `to` stays untouched.
async fn replace(from: &Path, to: &Path) -> io::Result<()> {
    let first = match tokio::fs::rename(from, to).await {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };
    let blocked_by_dir = matches!(
        tokio::fs::symlink_metadata(to).await,
        Ok(m) if m.is_dir()
    );
    if !blocked_by_dir || tokio::fs::symlink_metadata(from).await.is_err() {
        return Err(first);
    }
    debug!("Clearing directory {:?} blocking publish ({})", to, first);
    remove_entry(to).await?;
    tokio::fs::rename(from, to).await
}

/// Remove a visible entry (link, file or directory). Missing is fine.
pub async fn remove_entry(path: &Path) -> io::Result<()> {
    let metadata = match tokio::fs::symlink_metadata(path).await {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };
    if metadata.is_dir() {
        tokio::fs::remove_dir_all(path).await
    } else {
        tokio::fs::remove_file(path).await
    }
}
