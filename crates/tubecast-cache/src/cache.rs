// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ephemeral file lifecycle under a single cache root.
//!
//! Every file the pipeline touches (thumbnails, converted audio, tagging
//! intermediates) lives under the cache root. Deletion and content
//! inspection refuse any path that resolves outside of it.

use std::io::Read;
use std::path::{Component, Path, PathBuf};

use rand::Rng;
use rand::distributions::Alphanumeric;
use tracing::{debug, warn};
use tubecast_core::TubecastError;

/// Extension used when a path has none.
pub const FALLBACK_EXTENSION: &str = "bin";

const NAME_LEN: usize = 12;
const DEFAULT_NAME_RETRIES: usize = 16;
const SNIFF_LEN: u64 = 8192;

/// Owner of the cache root directory.
#[derive(Debug, Clone)]
pub struct ContentCache {
    root: PathBuf,
    name_retries: usize,
}

impl ContentCache {
    /// Creates the root if needed and pins it to its canonical form.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, TubecastError> {
        let root = root.as_ref();
        std::fs::create_dir_all(root).map_err(|e| io_error("create cache root", root, e))?;
        let root = root
            .canonicalize()
            .map_err(|e| io_error("resolve cache root", root, e))?;
        debug!(root = %root.display(), "content cache opened");
        Ok(Self {
            root,
            name_retries: DEFAULT_NAME_RETRIES,
        })
    }

    /// Overrides how many random names `allocate` tries before giving up.
    pub fn with_name_retries(mut self, retries: usize) -> Self {
        self.name_retries = retries;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns an unused path under the root with the given extension.
    ///
    /// The file is not created; the caller owns the name from here on.
    pub fn allocate(&self, extension: &str) -> Result<PathBuf, TubecastError> {
        let extension = normalize_extension(extension);
        let mut rng = rand::thread_rng();
        for _ in 0..self.name_retries {
            let name: String = (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(NAME_LEN)
                .map(char::from)
                .collect();
            let candidate = self.root.join(format!("{name}{extension}"));
            if std::fs::symlink_metadata(&candidate).is_err() {
                return Ok(candidate);
            }
        }
        Err(TubecastError::ResourceExhausted(format!(
            "no free cache name after {} attempts",
            self.name_retries
        )))
    }

    /// Moves an external file into the cache under a fresh name.
    pub fn adopt(&self, external: &Path) -> Result<PathBuf, TubecastError> {
        let target = self.allocate(&extension_of(external))?;
        if std::fs::rename(external, &target).is_err() {
            // Different filesystem: copy then unlink the original.
            std::fs::copy(external, &target).map_err(|e| io_error("adopt", external, e))?;
            if let Err(e) = std::fs::remove_file(external) {
                if let Err(cleanup) = std::fs::remove_file(&target) {
                    warn!(path = %target.display(), error = %cleanup, "failed to remove partial adoption");
                }
                return Err(io_error("remove adopted source", external, e));
            }
        }
        debug!(from = %external.display(), to = %target.display(), "file adopted into cache");
        Ok(target)
    }

    /// Deletes a cache-owned file. Relative paths resolve against the root.
    pub fn release(&self, path: &Path) -> Result<(), TubecastError> {
        let resolved = self.contain(path)?;
        std::fs::remove_file(&resolved).map_err(|e| io_error("release", &resolved, e))?;
        debug!(path = %resolved.display(), "cache file released");
        Ok(())
    }

    /// Sniffs the MIME type of a cache-owned file from its leading bytes.
    pub fn detect_content_type(&self, path: &Path) -> Result<String, TubecastError> {
        let resolved = self.contain(path)?;
        let mut head = Vec::new();
        std::fs::File::open(&resolved)
            .and_then(|file| file.take(SNIFF_LEN).read_to_end(&mut head))
            .map_err(|e| io_error("inspect", &resolved, e))?;
        Ok(sniff(&head).to_string())
    }

    /// Resolves `path` against the root and checks it stays inside.
    pub fn contain(&self, path: &Path) -> Result<PathBuf, TubecastError> {
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        let mut resolved = normalize(&joined);

        // A symlinked directory inside the root must not smuggle the file out.
        if let (Some(parent), Some(name)) = (resolved.parent(), resolved.file_name())
            && let Ok(real_parent) = parent.canonicalize()
        {
            resolved = real_parent.join(name);
        }

        if resolved.starts_with(&self.root) && resolved != self.root {
            Ok(resolved)
        } else {
            Err(TubecastError::OutsideCache {
                path: path.to_path_buf(),
            })
        }
    }
}

/// Substring after the last `.` of the file name, or [`FALLBACK_EXTENSION`].
pub fn extension_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .and_then(|name| name.rsplit_once('.').map(|(_, ext)| ext.to_string()))
        .filter(|ext| !ext.is_empty())
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
}

fn normalize_extension(extension: &str) -> String {
    if extension.is_empty() || extension.starts_with('.') {
        extension.to_string()
    } else {
        format!(".{extension}")
    }
}

/// Lexical normalization: drops `.` and folds `..` without touching the disk.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn sniff(head: &[u8]) -> &'static str {
    if let Some(kind) = infer::get(head) {
        return kind.mime_type();
    }
    match std::str::from_utf8(head) {
        Ok(_) => "text/plain",
        // Truncated multi-byte sequence at the sniff boundary is still text.
        Err(e) if e.error_len().is_none() => "text/plain",
        Err(_) => "application/octet-stream",
    }
}

fn io_error(action: &str, path: &Path, source: std::io::Error) -> TubecastError {
    TubecastError::Pipeline {
        message: format!("cache {action} failed for {}: {source}", path.display()),
        source: Some(Box::new(source)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> (tempfile::TempDir, ContentCache) {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = ContentCache::open(dir.path().join("cache")).expect("open cache");
        (dir, cache)
    }

    #[test]
    fn allocate_adds_leading_dot_and_stays_inside() {
        let (_dir, cache) = cache();
        let a = cache.allocate("m4a").unwrap();
        let b = cache.allocate(".m4a").unwrap();
        assert_ne!(a, b);
        assert!(!a.exists());
        assert!(a.starts_with(cache.root()));
        assert_eq!(a.extension().unwrap(), "m4a");
        assert_eq!(b.extension().unwrap(), "m4a");
    }

    #[test]
    fn allocate_with_no_budget_is_exhausted() {
        let (_dir, cache) = cache();
        let cache = cache.with_name_retries(0);
        let err = cache.allocate("txt").unwrap_err();
        assert!(err.is_resource_exhausted());
    }

    #[test]
    fn adopt_then_release_leaves_nothing_behind() {
        let (dir, cache) = cache();
        let outside = dir.path().join("cover.jpg");
        std::fs::write(&outside, b"not really a jpeg").unwrap();

        let adopted = cache.adopt(&outside).unwrap();
        assert!(!outside.exists());
        assert!(adopted.exists());
        assert_eq!(extension_of(&adopted), "jpg");

        cache.release(&adopted).unwrap();
        assert!(!adopted.exists());
        assert!(!outside.exists());
    }

    #[test]
    fn failed_adopt_leaves_cache_empty() {
        let (dir, cache) = cache();
        let missing = dir.path().join("gone.jpg");

        assert!(cache.adopt(&missing).is_err());
        assert_eq!(std::fs::read_dir(cache.root()).unwrap().count(), 0);
    }

    #[test]
    fn release_resolves_relative_names() {
        let (_dir, cache) = cache();
        let path = cache.allocate("txt").unwrap();
        std::fs::write(&path, "x").unwrap();
        let name = path.file_name().unwrap();

        cache.release(Path::new(name)).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn release_refuses_paths_outside_root() {
        let (dir, cache) = cache();
        let victim = dir.path().join("victim.txt");
        std::fs::write(&victim, "keep me").unwrap();

        for path in [
            victim.clone(),
            PathBuf::from("../victim.txt"),
            cache.root().join("../victim.txt"),
            PathBuf::from("./nested/../../victim.txt"),
            PathBuf::from("/etc/passwd"),
        ] {
            let err = cache.release(&path).unwrap_err();
            assert!(
                matches!(err, TubecastError::OutsideCache { .. }),
                "{} should be refused, got {err}",
                path.display()
            );
        }
        assert!(victim.exists());
    }

    #[test]
    fn release_refuses_the_root_itself() {
        let (_dir, cache) = cache();
        assert!(matches!(
            cache.release(Path::new(".")),
            Err(TubecastError::OutsideCache { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn release_refuses_symlinked_escape() {
        let (dir, cache) = cache();
        let elsewhere = dir.path().join("elsewhere");
        std::fs::create_dir(&elsewhere).unwrap();
        std::fs::write(elsewhere.join("file.txt"), "keep").unwrap();
        std::os::unix::fs::symlink(&elsewhere, cache.root().join("link")).unwrap();

        let err = cache.release(Path::new("link/file.txt")).unwrap_err();
        assert!(matches!(err, TubecastError::OutsideCache { .. }));
        assert!(elsewhere.join("file.txt").exists());
    }

    #[test]
    fn detect_content_type_reads_bytes_not_names() {
        let (_dir, cache) = cache();
        let text = cache.allocate("jpg").unwrap();
        std::fs::write(&text, "Hello world").unwrap();
        assert_eq!(cache.detect_content_type(&text).unwrap(), "text/plain");

        let png = cache.allocate("txt").unwrap();
        std::fs::write(&png, b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR").unwrap();
        assert_eq!(cache.detect_content_type(&png).unwrap(), "image/png");

        let blob = cache.allocate("bin").unwrap();
        std::fs::write(&blob, [0xffu8, 0xfe, 0x00, 0x80, 0x81]).unwrap();
        assert_eq!(
            cache.detect_content_type(&blob).unwrap(),
            "application/octet-stream"
        );
    }

    #[test]
    fn detect_content_type_is_contained() {
        let (dir, cache) = cache();
        let outside = dir.path().join("out.txt");
        std::fs::write(&outside, "x").unwrap();
        assert!(matches!(
            cache.detect_content_type(&outside),
            Err(TubecastError::OutsideCache { .. })
        ));
    }

    #[test]
    fn extension_of_uses_last_dot() {
        assert_eq!(extension_of(Path::new("a/b/track.tar.gz")), "gz");
        assert_eq!(extension_of(Path::new("cover.jpg")), "jpg");
        assert_eq!(extension_of(Path::new("README")), FALLBACK_EXTENSION);
        assert_eq!(extension_of(Path::new("dir.d/noext")), FALLBACK_EXTENSION);
    }
}
