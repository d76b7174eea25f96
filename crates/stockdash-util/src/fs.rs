use std::path::Path;
use tracing::{debug, trace};

/// Write `contents` to `path`, replacing any existing file.
///
/// `tokio::fs::create_dir_all` is used on the parent of `path`,
/// so directories will be created, as necessary, by write_file().
pub async fn write_file(path: impl AsRef<Path>, contents: &[u8]) -> std::io::Result<()> {
    let path = path.as_ref();

    // Ensure the directory exists
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        trace!("creating directory {}", dir.display());
        tokio::fs::create_dir_all(dir).await?;
    }

    tokio::fs::write(path, contents).await?;
    debug!("{} bytes written to {}", contents.len(), path.display());

    Ok(())
}
