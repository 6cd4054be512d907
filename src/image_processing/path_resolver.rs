use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Destination computed for one input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub directory: PathBuf,
    pub base_name: OsString,
    pub extension: String,
    pub resolved_path: PathBuf,
}

impl OutputTarget {
    /// Resolve a collision-free target against the filesystem
    pub fn resolve(directory: &Path, base_name: &OsStr, extension: &str) -> Self {
        Self::resolve_with(directory, base_name, extension, |p| p.exists())
    }

    /// Resolve a target with a custom occupancy check
    pub fn resolve_with<F>(directory: &Path, base_name: &OsStr, extension: &str, is_taken: F) -> Self
    where
        F: FnMut(&Path) -> bool,
    {
        let resolved_path = resolve_with(directory, base_name, extension, is_taken);
        Self {
            directory: directory.to_path_buf(),
            base_name: base_name.to_os_string(),
            extension: extension.to_string(),
            resolved_path,
        }
    }
}

/// Return `directory/base_name.extension`, or the first free
/// `directory/base_name_N.extension` for N = 1, 2, 3, ...
///
/// Only checks existence; nothing is created, so two calls without a write in
/// between return the same path.
pub fn resolve(directory: &Path, base_name: &OsStr, extension: &str) -> PathBuf {
    resolve_with(directory, base_name, extension, |p| p.exists())
}

/// Same probing order as [`resolve`], with occupancy decided by `is_taken`.
pub fn resolve_with<F>(directory: &Path, base_name: &OsStr, extension: &str, mut is_taken: F) -> PathBuf
where
    F: FnMut(&Path) -> bool,
{
    let candidate = directory.join(file_name(base_name, None, extension));
    if !is_taken(&candidate) {
        return candidate;
    }

    let mut counter: u64 = 1;
    loop {
        let candidate = directory.join(file_name(base_name, Some(counter), extension));
        if !is_taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Split a file name into (stem, extension) the way `splitext` does:
/// only the last dot counts, and leading dots are part of the stem.
pub fn split_extension(file_name: &OsStr) -> (OsString, Option<OsString>) {
    let path = Path::new(file_name);
    match (path.file_stem(), path.extension()) {
        // "..png" and friends: only leading dots before the last one, so no extension
        (Some(stem), Some(_)) if stem.as_encoded_bytes().iter().all(|&b| b == b'.') => {
            (file_name.to_os_string(), None)
        }
        (Some(stem), ext) => (stem.to_os_string(), ext.map(OsStr::to_os_string)),
        (None, _) => (file_name.to_os_string(), None),
    }
}

fn file_name(base_name: &OsStr, counter: Option<u64>, extension: &str) -> OsString {
    let mut name = base_name.to_os_string();
    if let Some(n) = counter {
        name.push(format!("_{}", n));
    }
    name.push(".");
    name.push(extension);
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"x").unwrap();
    }

    #[test]
    fn test_resolve_without_collision() {
        let dir = TempDir::new().unwrap();
        let path = resolve(dir.path(), OsStr::new("photo"), "webp");
        assert_eq!(path, dir.path().join("photo.webp"));
    }

    #[test]
    fn test_resolve_collision_sequence() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "base.png");
        touch(dir.path(), "base_1.png");
        touch(dir.path(), "base_2.png");

        let path = resolve(dir.path(), OsStr::new("base"), "png");
        assert_eq!(path, dir.path().join("base_3.png"));
    }

    #[test]
    fn test_resolve_fills_first_gap() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "base.png");
        touch(dir.path(), "base_2.png");

        let path = resolve(dir.path(), OsStr::new("base"), "png");
        assert_eq!(path, dir.path().join("base_1.png"));
    }

    #[test]
    fn test_resolve_never_returns_existing_path() {
        let dir = TempDir::new().unwrap();
        for name in ["a.jpg", "a_1.jpg", "a.png", "b.jpg", "a_3.jpg"] {
            touch(dir.path(), name);
        }
        for base in ["a", "b", "c"] {
            let path = resolve(dir.path(), OsStr::new(base), "jpg");
            assert!(!path.exists(), "{} already exists", path.display());
        }
    }

    #[test]
    fn test_resolve_has_no_side_effects() {
        let dir = TempDir::new().unwrap();
        let first = resolve(dir.path(), OsStr::new("icon"), "ico");
        let second = resolve(dir.path(), OsStr::new("icon"), "ico");
        assert_eq!(first, second);
        assert!(!first.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_resolve_with_reserved_set() {
        let dir = TempDir::new().unwrap();
        let mut reserved: HashSet<PathBuf> = HashSet::new();

        for expected in ["photo.webp", "photo_1.webp", "photo_2.webp"] {
            let path = resolve_with(dir.path(), OsStr::new("photo"), "webp", |p| {
                p.exists() || reserved.contains(p)
            });
            assert_eq!(path, dir.path().join(expected));
            reserved.insert(path);
        }
    }

    #[test]
    fn test_resolve_in_current_directory() {
        let path = resolve_with(Path::new(""), OsStr::new("photo"), "png", |_| false);
        assert_eq!(path, PathBuf::from("photo.png"));
    }

    #[test]
    fn test_output_target_fields() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "icon.ico");
        let target = OutputTarget::resolve(dir.path(), OsStr::new("icon"), "ico");
        assert_eq!(target.directory, dir.path());
        assert_eq!(target.base_name, OsString::from("icon"));
        assert_eq!(target.extension, "ico");
        assert_eq!(target.resolved_path, dir.path().join("icon_1.ico"));
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(
            split_extension(OsStr::new("photo.png")),
            (OsString::from("photo"), Some(OsString::from("png")))
        );
        assert_eq!(
            split_extension(OsStr::new("archive.tar.gz")),
            (OsString::from("archive.tar"), Some(OsString::from("gz")))
        );
        assert_eq!(
            split_extension(OsStr::new(".hidden")),
            (OsString::from(".hidden"), None)
        );
        assert_eq!(
            split_extension(OsStr::new("README")),
            (OsString::from("README"), None)
        );
    }

    #[test]
    fn test_split_extension_leading_dots() {
        assert_eq!(
            split_extension(OsStr::new("..png")),
            (OsString::from("..png"), None)
        );
        assert_eq!(
            split_extension(OsStr::new("...png")),
            (OsString::from("...png"), None)
        );
        assert_eq!(
            split_extension(OsStr::new("a..png")),
            (OsString::from("a."), Some(OsString::from("png")))
        );
        assert_eq!(
            split_extension(OsStr::new(".config.json")),
            (OsString::from(".config"), Some(OsString::from("json")))
        );
    }
}
