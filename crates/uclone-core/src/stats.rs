use std::path::Path;
use walkdir::WalkDir;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TreeStats {
    /// Files and directories below the root, the root itself excluded.
    pub entries: u64,
    /// Sum of the sizes of all regular files.
    pub bytes: u64,
}

/// Walks `root` without following symlinks. Unreadable entries are skipped.
pub fn scan(root: &Path) -> TreeStats {
    let mut stats = TreeStats::default();

    for entry in WalkDir::new(root).min_depth(1).into_iter().filter_map(|e| e.ok()) {
        stats.entries += 1;
        if entry.file_type().is_file() {
            if let Ok(metadata) = entry.metadata() {
                stats.bytes += metadata.len();
            }
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_counts_entries_and_bytes() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("Config")).unwrap();
        fs::create_dir_all(root.join("Content/Maps")).unwrap();
        fs::write(root.join("Config/DefaultGame.ini"), "12345").unwrap();
        fs::write(root.join("Content/Maps/Main.umap"), [0u8; 10]).unwrap();

        let stats = scan(root);
        assert_eq!(stats.entries, 5);
        assert_eq!(stats.bytes, 15);
    }

    #[test]
    fn test_scan_missing_root() {
        let temp = TempDir::new().unwrap();

        assert_eq!(scan(&temp.path().join("missing")), TreeStats::default());
    }
}
