//! Temporary tile directories for filesystem-backed policy tests.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tile_mosaic::TileInput;

/// A temporary directory removed on drop.
pub struct TileDir {
    dir: TempDir,
}

impl TileDir {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// File input for a path below the directory.
    pub fn input(&self, relative: &str) -> TileInput {
        TileInput::file(self.path(relative))
    }

    /// Create a small file (and its parent directories).
    pub fn touch(&self, relative: &str) -> io::Result<PathBuf> {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, b"tile")?;
        Ok(path)
    }

    /// Create a directory, which is not a tile file.
    pub fn mkdir(&self, relative: &str) -> io::Result<PathBuf> {
        let path = self.path(relative);
        fs::create_dir_all(&path)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touch_creates_parents() {
        let dir = TileDir::new().unwrap();
        let path = dir.touch("L0/0_0.png").unwrap();
        assert!(path.is_file());
        assert!(dir.root().join("L0").is_dir());
        assert_eq!(dir.input("L0/0_0.png").as_path(), Some(path.as_path()));
    }
}
