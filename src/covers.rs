//! Local cover image storage.
//!
//! Covers live flat under `<data_dir>/images` as `<AVID_UPPER>.jpg`. The
//! store only computes paths and existence; downloading is done by the source
//! that produced the record, since the cover host may require that source's
//! session cookie.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Filesystem layout for downloaded cover images.
#[derive(Debug, Clone)]
pub struct CoverStore {
    dir: PathBuf,
}

impl CoverStore {
    /// Create a cover store rooted at `<data_dir>/images`, creating the
    /// directory if needed.
    pub fn new(data_dir: &Path) -> Result<Self> {
        let dir = data_dir.join("images");
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create image directory: {}", dir.display()))?;
        Ok(Self { dir })
    }

    /// Path where the cover for `avid` is (or would be) stored.
    pub fn path_for(&self, avid: &str) -> PathBuf {
        self.dir.join(format!("{}.jpg", avid.to_uppercase()))
    }

    /// Whether a cover for `avid` has already been downloaded.
    pub fn exists(&self, avid: &str) -> bool {
        self.path_for(avid).exists()
    }

    /// The image directory itself.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
