//! Path resolution module
//!
//! Maps a request URI onto a path under the served root. The computation is purely
//! lexical: nothing here touches the filesystem, so a request that would escape the
//! root is rejected before any handler can stat, open or remove anything.

use hyper::Uri;
use percent_encoding::percent_decode_str;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::RequestError;

/// Directory tree exposed by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootDir {
    path: PathBuf,
}

impl RootDir {
    /// Root at `path`, which must be absolute. It is normalized lexically, not canonicalized.
    pub fn new(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        if !path.is_absolute() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("root directory must be absolute: {}", path.display()),
            ));
        }
        Ok(Self {
            path: normalize(path),
        })
    }

    /// Root at the process working directory
    pub fn current_dir() -> io::Result<Self> {
        Self::new(std::env::current_dir()?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve a request URI to an absolute path contained in the root.
    ///
    /// The URI path is percent-decoded, one leading `/` is dropped and the rest is
    /// joined onto the root and normalized. Query strings are ignored. Anything that
    /// normalizes to a location outside the root fails with
    /// [`RequestError::Forbidden`].
    pub fn resolve(&self, uri: &Uri) -> Result<PathBuf, RequestError> {
        let decoded = percent_decode_str(uri.path()).decode_utf8()?;
        let relative = decoded.strip_prefix('/').unwrap_or(&decoded);

        let resolved = normalize(&self.path.join(relative));
        if !self.contains(&resolved) {
            crate::logger::log_warning(&format!(
                "Path traversal attempt blocked: {} -> {}",
                uri.path(),
                resolved.display()
            ));
            return Err(RequestError::Forbidden);
        }

        Ok(resolved)
    }

    /// True when `path` is the root itself or lies beneath it.
    ///
    /// Comparison is per component, so `/srv/share2` is not inside `/srv/share`.
    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.path)
    }
}

/// Collapse `.` and `..` segments without consulting the filesystem.
/// `..` at the filesystem root stays at the root.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => normalized.push(prefix.as_os_str()),
            Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            Component::Normal(name) => normalized.push(name),
        }
    }
    normalized
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn root() -> RootDir {
        RootDir::new("/srv/share").unwrap()
    }

    fn resolve(url: &str) -> Result<PathBuf, RequestError> {
        root().resolve(&url.parse::<Uri>().unwrap())
    }

    #[test]
    fn test_root_and_descendants() {
        assert_eq!(resolve("/").unwrap(), PathBuf::from("/srv/share"));
        assert_eq!(resolve("/notes.txt").unwrap(), PathBuf::from("/srv/share/notes.txt"));
        assert_eq!(resolve("/a/b/c.txt").unwrap(), PathBuf::from("/srv/share/a/b/c.txt"));
        assert_eq!(resolve("/a/b/").unwrap(), PathBuf::from("/srv/share/a/b"));
    }

    #[test]
    fn test_dot_segments_are_collapsed() {
        assert_eq!(resolve("/a/./b/../c").unwrap(), PathBuf::from("/srv/share/a/c"));
        assert_eq!(resolve("/a/..").unwrap(), PathBuf::from("/srv/share"));
    }

    #[test]
    fn test_query_is_ignored() {
        assert_eq!(resolve("/a.txt?download=1").unwrap(), PathBuf::from("/srv/share/a.txt"));
    }

    #[test]
    fn test_percent_decoding() {
        assert_eq!(
            resolve("/my%20file.txt").unwrap(),
            PathBuf::from("/srv/share/my file.txt")
        );
        assert_eq!(
            resolve("/%E4%BD%A0%E5%A5%BD.md").unwrap(),
            PathBuf::from("/srv/share/你好.md")
        );
        assert_eq!(resolve("/a%2Fb").unwrap(), PathBuf::from("/srv/share/a/b"));
    }

    #[test]
    fn test_traversal_is_forbidden() {
        for url in [
            "/..",
            "/../etc/passwd",
            "/a/../../etc/passwd",
            "/%2e%2e/%2e%2e/etc/passwd",
            "/a%2F..%2F..%2Fetc",
            "//etc/passwd",
            "/%2Fetc/passwd",
        ] {
            assert!(
                matches!(resolve(url), Err(RequestError::Forbidden)),
                "{url} should be forbidden"
            );
        }
    }

    #[test]
    fn test_sibling_with_shared_prefix_is_forbidden() {
        assert!(matches!(resolve("/../share2/x"), Err(RequestError::Forbidden)));
        assert!(matches!(resolve("/../shared"), Err(RequestError::Forbidden)));
    }

    #[test]
    fn test_traversal_that_returns_inside_is_allowed() {
        assert_eq!(
            resolve("/../share/inside.txt").unwrap(),
            PathBuf::from("/srv/share/inside.txt")
        );
    }

    #[test]
    fn test_invalid_utf8_is_unclassified() {
        let err = resolve("/%FF%FE").unwrap_err();
        assert!(matches!(err, RequestError::MalformedPath(_)));
        assert!(err.status().is_none());
    }

    #[test]
    fn test_root_must_be_absolute() {
        assert!(RootDir::new("relative/dir").is_err());
        assert_eq!(
            RootDir::new("/srv/./share/../share").unwrap().path(),
            Path::new("/srv/share")
        );
    }
}
