//! Local content hashing.
//!
//! A package's installed content is fingerprinted by feeding every file under
//! its module directory into a single SHA-256 accumulator.
//!
//! Entries are visited in sorted order: each directory's children are sorted
//! by file name before descending, which is the same as ordering all files by
//! relative path compared component-wise. The digest therefore depends only on
//! the file set and its contents, not on how the filesystem happens to list
//! directories.
//!
//! # Example
//!
//! ```no_run
//! use supplyscan::hasher::hash_package;
//! use supplyscan::model::PackageRecord;
//!
//! let pkg = PackageRecord::new("requests", "2.32.3", "/usr/lib/python3/site-packages");
//! match hash_package(&pkg) {
//!     Ok(digest) => println!("{}", digest),
//!     Err(reason) => println!("unknown: {}", reason),
//! }
//! ```

use crate::model::{Digest, HashResult, PackageRecord, Unavailable};
use sha2::{Digest as _, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// On-disk module directory name for a project: hyphens become underscores.
pub fn module_dir_name(project_name: &str) -> String {
    project_name.replace('-', "_")
}

/// Directory expected to hold the package's importable content.
pub fn package_dir(package: &PackageRecord) -> PathBuf {
    package.location.join(module_dir_name(&package.name))
}

pub fn hash_package(package: &PackageRecord) -> HashResult {
    hash_directory(&package_dir(package))
}

/// Hashes every file beneath `dir`.
///
/// Files that cannot be read are skipped; the remaining files still produce a
/// digest. A missing directory is reported as [`Unavailable::NotInstalled`].
pub fn hash_directory(dir: &Path) -> HashResult {
    if !dir.is_dir() {
        return Err(Unavailable::NotInstalled {
            path: dir.to_path_buf(),
        });
    }

    let mut hasher = Sha256::new();
    let mut files = 0usize;

    for entry in WalkDir::new(dir).follow_links(false).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(Unavailable::Walk(e.to_string())),
            Err(e) => {
                tracing::debug!(error = %e, "skipping unreadable entry");
                continue;
            }
        };

        if entry.file_type().is_dir() {
            continue;
        }

        match fs::read(entry.path()) {
            Ok(bytes) => {
                hasher.update(&bytes);
                files += 1;
            }
            Err(e) => {
                tracing::debug!(path = %entry.path().display(), error = %e, "skipping unreadable file");
            }
        }
    }

    tracing::debug!(dir = %dir.display(), files, "hashed package directory");
    Ok(Digest::from_hasher(hasher))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_module_dir_name() {
        assert_eq!(module_dir_name("typing-extensions"), "typing_extensions");
        assert_eq!(module_dir_name("zope.interface"), "zope.interface");
        assert_eq!(module_dir_name("demo"), "demo");
    }

    #[test]
    fn test_package_dir_joins_location() {
        let pkg = PackageRecord::new("my-pkg", "1.0", "/site");
        assert_eq!(package_dir(&pkg), Path::new("/site").join("my_pkg"));
    }

    #[test]
    fn test_single_file_matches_sha256_of_content() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.txt", "hello");

        let digest = hash_directory(tmp.path()).unwrap();
        assert_eq!(digest, Digest::of_bytes(b"hello"));
    }

    #[test]
    fn test_files_are_fed_in_sorted_order() {
        let tmp = TempDir::new().unwrap();
        // Created out of order on purpose.
        write(tmp.path(), "b.txt", "world");
        write(tmp.path(), "a.txt", "hello");

        let digest = hash_directory(tmp.path()).unwrap();
        assert_eq!(digest, Digest::of_bytes(b"helloworld"));
    }

    #[test]
    fn test_nested_directories_are_component_ordered() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.txt", "3");
        write(tmp.path(), "a/inner.py", "1");
        write(tmp.path(), "a/z/deep.py", "2");
        write(tmp.path(), "b.py", "4");

        let digest = hash_directory(tmp.path()).unwrap();
        assert_eq!(digest, Digest::of_bytes(b"1234"));
    }

    #[test]
    fn test_hash_is_deterministic() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "pkg/__init__.py", "import os\n");
        write(tmp.path(), "pkg/core.py", "def f():\n    pass\n");
        write(tmp.path(), "pkg/data/table.csv", "a,b\n1,2\n");

        let first = hash_directory(tmp.path()).unwrap();
        let second = hash_directory(tmp.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_content_change_changes_digest() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.txt", "hello");
        let before = hash_directory(tmp.path()).unwrap();

        write(tmp.path(), "a.txt", "hellO");
        let after = hash_directory(tmp.path()).unwrap();

        assert_ne!(before, after);
    }

    #[test]
    fn test_empty_directory_hashes_empty_input() {
        let tmp = TempDir::new().unwrap();
        let digest = hash_directory(tmp.path()).unwrap();
        assert_eq!(digest, Digest::of_bytes(b""));
    }

    #[test]
    fn test_missing_directory_is_unavailable() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope");

        let err = hash_directory(&missing).unwrap_err();
        assert_eq!(err, Unavailable::NotInstalled { path: missing });
    }

    #[test]
    fn test_regular_file_is_not_a_package_dir() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "single.py", "x");

        let err = hash_directory(&tmp.path().join("single.py")).unwrap_err();
        assert!(matches!(err, Unavailable::NotInstalled { .. }));
    }

    #[test]
    fn test_hash_package_uses_normalized_dir() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "my_pkg/a.txt", "hello");

        let pkg = PackageRecord::new("my-pkg", "1.0.0", tmp.path());
        assert_eq!(hash_package(&pkg).unwrap(), Digest::of_bytes(b"hello"));
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_skipped() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.txt", "hello");
        std::os::unix::fs::symlink(tmp.path().join("missing"), tmp.path().join("b.link")).unwrap();

        let digest = hash_directory(tmp.path()).unwrap();
        assert_eq!(digest, Digest::of_bytes(b"hello"));
    }
}
