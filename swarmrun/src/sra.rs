use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;

use crate::command::CommandRunner;
use crate::error::{SwarmRunError, SwarmRunResult};
use crate::tools::{Tool, ToolPaths};
use crate::workspace::TempWorkspace;

pub const DEFAULT_NCBI_ROOT: &str = "/root/ncbi";

/// The SRA toolkit download cache, `<ncbi_root>/public/sra`, redirected into
/// the temporary folder for the duration of a download.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SraCache {
    ncbi_root: PathBuf,
}

impl SraCache {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(ncbi_root: P) -> Self {
        Self {
            ncbi_root: ncbi_root.into(),
        }
    }

    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.ncbi_root.join("public").join("sra")
    }

    /// Points the cache folder at `<workspace>/sra`.
    pub fn set_up(&self, workspace: &TempWorkspace) -> SwarmRunResult<PathBuf> {
        info!(
            "Setting up fastq-dump cache within {}",
            workspace.path().display()
        );
        fs::create_dir_all(self.ncbi_root.join("public"))?;

        let cache_dir = self.cache_dir();
        match fs::symlink_metadata(&cache_dir) {
            Ok(metadata) if metadata.file_type().is_symlink() || metadata.is_file() => {
                fs::remove_file(&cache_dir)?
            }
            Ok(_) => fs::remove_dir_all(&cache_dir)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let temp_cache = workspace.join("sra");
        if temp_cache.exists() {
            return Err(SwarmRunError::WorkspaceExists(temp_cache));
        }
        fs::create_dir(&temp_cache)?;
        symlink_dir(&temp_cache, &cache_dir)?;

        Ok(temp_cache)
    }

    /// Downloads `accession` and returns the path of the single combined FASTQ
    /// file, `<workspace>/<accession>.fastq`.
    pub fn download(
        &self,
        accession: &str,
        workspace: &TempWorkspace,
        tools: &ToolPaths,
        runner: &CommandRunner,
    ) -> SwarmRunResult<PathBuf> {
        self.set_up(workspace)?;

        info!("Downloading {} from SRA", accession);
        let local_path = workspace.join(format!("{}.fastq", accession));
        info!("Local path: {}", local_path.display());

        info!("Downloading via fastq-dump");
        runner.run(&tools.command(Tool::Prefetch).arg(accession))?;
        runner.run(
            &tools
                .command(Tool::FastqDump)
                .arg("--split-files")
                .arg("--outdir")
                .arg(workspace.path())
                .arg(accession),
        )?;

        let parts = downloaded_parts(workspace.path(), accession)?;
        if parts.is_empty() {
            return Err(SwarmRunError::SraDownloadFailed(accession.to_owned()));
        }

        info!("Concatenating output files");
        let combined_path = workspace.join(format!("{}.fastq.temp", accession));
        concatenate(&parts, &combined_path)?;

        for part in &parts {
            info!("Removing {}", part.display());
            fs::remove_file(part)?;
        }

        let cached = self.cache_dir().join(format!("{}.sra", accession));
        if cached.exists() {
            info!("Removing {}", cached.display());
            fs::remove_file(&cached)?;
        }

        fs::rename(&combined_path, &local_path)?;
        info!("Done fetching {}", accession);

        Ok(local_path)
    }
}

impl Default for SraCache {
    fn default() -> Self {
        Self::new(DEFAULT_NCBI_ROOT)
    }
}

/// `<accession>*fastq` files in `dir`, sorted by name.
fn downloaded_parts(dir: &Path, accession: &str) -> io::Result<Vec<PathBuf>> {
    let mut parts = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(accession) && name.ends_with("fastq") && entry.file_type()?.is_file()
        {
            parts.push(entry.path());
        }
    }
    parts.sort();

    Ok(parts)
}

fn concatenate(parts: &[PathBuf], output: &Path) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(output)?);
    for part in parts {
        io::copy(&mut File::open(part)?, &mut writer)?;
    }
    writer.flush()
}

#[cfg(unix)]
fn symlink_dir(original: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(original, link)
}

#[cfg(windows)]
fn symlink_dir(original: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(original, link)
}
