use std::io;
use std::path::{Path, PathBuf};

/// Validates a filename for use inside the server's single flat directory.
///
/// Hidden names (leading `.`) and anything that could resolve outside the
/// directory (path separators, empty names) are rejected alike; the wire
/// carries the same bare `F` for every rejection.
pub fn filename_is_safe(name: &str) -> bool {
    if name.is_empty() || name.starts_with('.') {
        return false;
    }
    !name.contains('/') && !name.contains('\\')
}

/// Joins a validated filename onto the server root. Callers must have
/// checked [`filename_is_safe`] first.
pub fn resolve_in_root(root: &Path, name: &str) -> PathBuf {
    root.join(name)
}

/// Builds the flat listing of non-hidden entries in `root`, one name per
/// line with a trailing newline. Entries are sorted so the listing is stable
/// across runs.
pub async fn directory_listing(root: &Path) -> io::Result<String> {
    let mut entries = tokio::fs::read_dir(root).await?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let name = name.to_string_lossy().into_owned();
        if !name.starts_with('.') {
            names.push(name);
        }
    }
    names.sort();

    let mut listing = String::new();
    for name in names {
        listing.push_str(&name);
        listing.push('\n');
    }
    Ok(listing)
}
