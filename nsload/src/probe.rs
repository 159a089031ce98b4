// Existence checks for candidate paths, kept apart from pure resolution

use std::path::Path;

/// Decides whether a candidate path exists.
///
/// Closures of type `Fn(&Path) -> bool` are probes, which lets hosts and
/// tests answer from memory instead of touching the filesystem.
pub trait Probe: Send + Sync {
    fn exists(&self, path: &Path) -> bool;
}

/// Probe backed by the real filesystem; only regular files count.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProbe;

impl Probe for FsProbe {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

impl<F> Probe for F
where
    F: Fn(&Path) -> bool + Send + Sync,
{
    fn exists(&self, path: &Path) -> bool {
        self(path)
    }
}
