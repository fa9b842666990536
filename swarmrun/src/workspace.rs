use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use rand::Rng;

use crate::error::{SwarmRunError, SwarmRunResult};

/// Per-run scratch folder, `<base>/<8 hex chars>`, removed when dropped.
#[derive(Debug)]
pub struct TempWorkspace {
    path: PathBuf,
    keep: bool,
}

impl TempWorkspace {
    pub fn create(base: &Path) -> SwarmRunResult<Self> {
        let id = format!("{:08x}", rand::thread_rng().gen::<u32>());
        Self::create_named(base, &id)
    }

    pub(crate) fn create_named(base: &Path, name: &str) -> SwarmRunResult<Self> {
        let path = base.join(name);
        if path.exists() {
            return Err(SwarmRunError::WorkspaceExists(path));
        }
        fs::create_dir(&path)?;

        Ok(Self { path, keep: false })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn join<P: AsRef<Path>>(&self, name: P) -> PathBuf {
        self.path.join(name)
    }

    /// Where the run log of `sample` is written.
    #[must_use]
    pub fn log_path(&self, sample: &str) -> PathBuf {
        self.join(format!("{}.log.txt", sample))
    }

    /// Leave the folder on disk after the workspace is dropped.
    pub fn keep(&mut self) {
        self.keep = true;
    }

    #[must_use]
    pub fn is_kept(&self) -> bool {
        self.keep
    }
}

impl Drop for TempWorkspace {
    fn drop(&mut self) {
        if self.keep {
            return;
        }

        info!("Removing temporary folder: {}", self.path.display());
        if let Err(e) = fs::remove_dir_all(&self.path) {
            warn!(
                "Could not remove temporary folder {}: {}",
                self.path.display(),
                e
            );
        }
    }
}
