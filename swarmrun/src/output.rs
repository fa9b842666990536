use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;

use crate::command::CommandRunner;
use crate::compression::gzip_file;
use crate::error::{SwarmRunError, SwarmRunResult};
use crate::tools::{Tool, ToolPaths};

const S3_PREFIX: &str = "s3://";

/// Where finished results are placed.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum OutputLocation {
    S3(String),
    Local(PathBuf),
}

impl OutputLocation {
    #[must_use]
    pub fn parse(output: &str) -> Self {
        if output.starts_with(S3_PREFIX) {
            Self::S3(output.to_owned())
        } else {
            Self::Local(PathBuf::from(output))
        }
    }
}

impl Display for OutputLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputLocation::S3(prefix) => write!(f, "{}", prefix),
            OutputLocation::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Copies results out of the temporary folder.
#[derive(Debug, Clone)]
pub struct ResultDelivery<'a> {
    tools: &'a ToolPaths,
    runner: &'a CommandRunner,
    location: &'a OutputLocation,
    gzip: bool,
}

impl<'a> ResultDelivery<'a> {
    #[must_use]
    pub fn new(tools: &'a ToolPaths, runner: &'a CommandRunner, location: &'a OutputLocation) -> Self {
        Self {
            tools,
            runner,
            location,
            gzip: true,
        }
    }

    #[must_use]
    pub fn gzip(mut self, gzip: bool) -> Self {
        self.gzip = gzip;
        self
    }

    /// Delivers `path` and returns where it ended up. The source file is gone
    /// afterwards, except for S3 uploads, which leave a copy in place.
    pub fn deliver(&self, path: &Path) -> SwarmRunResult<String> {
        let path = if self.gzip {
            gzip_file(path)?
        } else {
            path.to_owned()
        };
        let file_name = path
            .file_name()
            .ok_or_else(|| SwarmRunError::MissingOutput(path.clone()))?;

        let delivered = match self.location {
            OutputLocation::S3(prefix) => {
                let command = self
                    .tools
                    .command(Tool::Aws)
                    .args(["s3", "cp", "--quiet", "--sse", "AES256"])
                    .arg(&path)
                    .arg(prefix);
                self.runner.run(&command)?;
                if prefix.ends_with('/') {
                    format!("{}{}", prefix, file_name.to_string_lossy())
                } else {
                    prefix.clone()
                }
            }
            OutputLocation::Local(folder) => {
                fs::create_dir_all(folder)?;
                let target = folder.join(file_name);
                move_file(&path, &target)?;
                target.display().to_string()
            }
        };

        info!("Delivered {}", delivered);
        Ok(delivered)
    }
}

/// `rename`, falling back to copy and remove when the target lives on another
/// filesystem.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }

    fs::copy(from, to)?;
    fs::remove_file(from)
}
