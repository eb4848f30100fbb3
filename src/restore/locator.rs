// graphrestore/src/restore/locator.rs
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Regular files directly inside `directory` whose name starts with
/// `prefix`, sorted by file name. An unreadable or missing directory yields
/// no files.
pub fn files_with_prefix(directory: &Path, prefix: &str) -> Vec<PathBuf> {
    WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(prefix))
        })
        .map(|entry| entry.into_path())
        .collect()
}
