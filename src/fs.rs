//! File-system capability used by the batch renamer and the settings loader.
//!
//! Batch logic never calls `std::fs` directly; it goes through [`FileSystem`]
//! so that sweeps can be exercised against an in-memory implementation.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The file-system operations a sweep needs.
pub trait FileSystem {
    /// Returns true if `path` is an existing directory.
    fn directory_exists(&self, path: &Path) -> bool;

    /// Returns true if `path` is an existing regular file.
    fn file_exists(&self, path: &Path) -> bool;

    /// Lists the regular files directly inside `path` (non-recursive).
    fn list_files(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Moves `source` to `destination`.
    ///
    /// Implementations are not required to refuse an existing destination;
    /// callers check [`FileSystem::file_exists`] first.
    fn move_file(&self, source: &Path, destination: &Path) -> io::Result<()>;

    /// Reads a whole file as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// [`FileSystem`] backed by the host operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn directory_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn list_files(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            if let Ok(file_type) = entry.file_type()
                && file_type.is_file()
            {
                files.push(entry.path());
            }
        }
        // read_dir order is platform dependent; keep sweeps reproducible
        files.sort();
        Ok(files)
    }

    fn move_file(&self, source: &Path, destination: &Path) -> io::Result<()> {
        fs::rename(source, destination)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_list_files_skips_directories_and_sorts() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();

        fs::write(base_path.join("b.txt"), "b").expect("Failed to write file");
        fs::write(base_path.join("a.txt"), "a").expect("Failed to write file");
        fs::create_dir(base_path.join("nested")).expect("Failed to create dir");

        let files = OsFileSystem
            .list_files(base_path)
            .expect("Failed to list files");

        assert_eq!(files, vec![base_path.join("a.txt"), base_path.join("b.txt")]);
    }

    #[test]
    fn test_list_files_missing_directory_is_error() {
        let result = OsFileSystem.list_files(Path::new("/non/existent/path"));
        assert!(result.is_err());
    }

    #[test]
    fn test_move_file_and_existence_checks() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("old name.txt");
        let destination = temp_dir.path().join("new-name.txt");
        fs::write(&source, "content").expect("Failed to write file");

        assert!(OsFileSystem.directory_exists(temp_dir.path()));
        assert!(OsFileSystem.file_exists(&source));
        assert!(!OsFileSystem.file_exists(temp_dir.path()));

        OsFileSystem
            .move_file(&source, &destination)
            .expect("Failed to move file");

        assert!(!OsFileSystem.file_exists(&source));
        assert_eq!(
            OsFileSystem
                .read_to_string(&destination)
                .expect("Failed to read file"),
            "content"
        );
    }
}
