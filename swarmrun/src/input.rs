use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::command::CommandRunner;
use crate::compression::{gunzip_file, is_gzip_path};
use crate::error::{SwarmRunError, SwarmRunResult};
use crate::sra::SraCache;
use crate::tools::{Tool, ToolPaths};
use crate::workspace::TempWorkspace;

const S3_PREFIX: &str = "s3://";
const SRA_PREFIX: &str = "sra://";
const REMOTE_SCHEMES: [&str; 3] = ["ftp", "https", "http"];

/// Where the reads come from.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum InputLocation {
    Local(PathBuf),
    S3(String),
    /// FTP or HTTP(S) URL, downloaded with `wget`.
    Remote(String),
    Sra { accession: String },
}

impl InputLocation {
    pub fn parse(input: &str) -> SwarmRunResult<Self> {
        if input.starts_with(S3_PREFIX) {
            return Ok(Self::S3(input.to_owned()));
        }
        if input.starts_with(SRA_PREFIX) {
            let accession = last_segment(input);
            if accession.is_empty() {
                return Err(SwarmRunError::UnsupportedInput(input.to_owned()));
            }
            return Ok(Self::Sra {
                accession: accession.to_owned(),
            });
        }

        match input.split_once("://") {
            Some((scheme, _)) if REMOTE_SCHEMES.contains(&scheme) => {
                Ok(Self::Remote(input.to_owned()))
            }
            Some(_) => Err(SwarmRunError::UnsupportedInput(input.to_owned())),
            None => Ok(Self::Local(PathBuf::from(input))),
        }
    }

    /// Name of the file once it lands in the temporary folder.
    #[must_use]
    pub fn filename(&self) -> String {
        match self {
            InputLocation::Local(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            InputLocation::S3(url) | InputLocation::Remote(url) => last_segment(url).to_owned(),
            InputLocation::Sra { accession } => format!("{}.fastq", accession),
        }
    }
}

impl Display for InputLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InputLocation::Local(path) => write!(f, "{}", path.display()),
            InputLocation::S3(url) | InputLocation::Remote(url) => write!(f, "{}", url),
            InputLocation::Sra { accession } => write!(f, "{}{}", SRA_PREFIX, accession),
        }
    }
}

fn last_segment(input: &str) -> &str {
    input.rsplit('/').next().unwrap_or(input)
}

/// Brings an [`InputLocation`] into the temporary folder as a plain FASTA
/// file.
#[derive(Debug, Clone)]
pub struct InputFetcher<'a> {
    tools: &'a ToolPaths,
    runner: &'a CommandRunner,
    sra_cache: &'a SraCache,
}

impl<'a> InputFetcher<'a> {
    #[must_use]
    pub fn new(tools: &'a ToolPaths, runner: &'a CommandRunner, sra_cache: &'a SraCache) -> Self {
        Self {
            tools,
            runner,
            sra_cache,
        }
    }

    /// Returns the path of the FASTA file inside `workspace`.
    pub fn fetch(
        &self,
        location: &InputLocation,
        workspace: &TempWorkspace,
    ) -> SwarmRunResult<PathBuf> {
        info!("Getting reads from {}", location);

        let mut local_path = workspace.join(location.filename());
        info!("Filename: {}", location.filename());
        info!("Local path: {}", local_path.display());

        match location {
            InputLocation::Local(path) => {
                info!("Treating as local path");
                if !path.exists() {
                    return Err(SwarmRunError::InputNotFound(path.clone()));
                }
                info!("Making a copy in the temporary folder");
                fs::copy(path, &local_path)?;
            }
            InputLocation::S3(url) => {
                info!("Getting reads from S3");
                let command = self
                    .tools
                    .command(Tool::Aws)
                    .args(["s3", "cp", "--quiet", "--sse", "AES256"])
                    .arg(url)
                    .arg(workspace.path());
                self.runner.run(&command)?;
            }
            InputLocation::Remote(url) => {
                info!("Getting reads from FTP");
                let command = self
                    .tools
                    .command(Tool::Wget)
                    .arg("-P")
                    .arg(workspace.path())
                    .arg(url);
                self.runner.run(&command)?;
            }
            InputLocation::Sra { accession } => {
                info!("Getting reads from SRA: {}", accession);
                local_path = self
                    .sra_cache
                    .download(accession, workspace, self.tools, self.runner)?;
            }
        }

        if is_gzip_path(&local_path) {
            info!("Decompressing {}", local_path.display());
            local_path = gunzip_file(&local_path)?;
        }

        if let Some(fasta_path) = fastq_to_fasta_path(&local_path) {
            info!("Converting to FASTA");
            let command = self
                .tools
                .command(Tool::FastqToFasta)
                .arg("-i")
                .arg(&local_path)
                .arg("-o")
                .arg(&fasta_path);
            self.runner.run(&command)?;
            local_path = fasta_path;
        }

        Ok(local_path)
    }
}

/// `reads.fastq` -> `reads.fasta`, `reads.fq` -> `reads.fa`; `None` when the
/// path does not look like FASTQ.
#[must_use]
pub fn fastq_to_fasta_path(path: &Path) -> Option<PathBuf> {
    let path = path.to_str()?;
    let stem = path
        .strip_suffix('q')
        .or_else(|| path.strip_suffix('Q'))?;

    Some(PathBuf::from(format!("{}a", stem)))
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use crate::error::SwarmRunError;
    use crate::input::{fastq_to_fasta_path, InputLocation};

    #[test]
    fn test_parse_locations() {
        assert_eq!(
            InputLocation::parse("s3://bucket/dir/reads.fastq.gz").unwrap(),
            InputLocation::S3("s3://bucket/dir/reads.fastq.gz".to_owned())
        );
        assert_eq!(
            InputLocation::parse("sra://SRR123456").unwrap(),
            InputLocation::Sra {
                accession: "SRR123456".to_owned()
            }
        );
        assert_eq!(
            InputLocation::parse("https://example.org/reads.fasta").unwrap(),
            InputLocation::Remote("https://example.org/reads.fasta".to_owned())
        );
        assert_eq!(
            InputLocation::parse("ftp://example.org/reads.fasta").unwrap(),
            InputLocation::Remote("ftp://example.org/reads.fasta".to_owned())
        );
        assert_eq!(
            InputLocation::parse("/data/reads.fasta").unwrap(),
            InputLocation::Local(PathBuf::from("/data/reads.fasta"))
        );
    }

    #[test]
    fn test_unknown_scheme_is_rejected() {
        let err = InputLocation::parse("gs://bucket/reads.fasta").unwrap_err();
        assert!(matches!(err, SwarmRunError::UnsupportedInput(_)));
    }

    #[test]
    fn test_empty_sra_accession_is_rejected() {
        for input in ["sra://", "sra://SRR1/"] {
            let err = InputLocation::parse(input).unwrap_err();
            assert!(matches!(err, SwarmRunError::UnsupportedInput(_)), "{}", input);
        }
    }

    #[test]
    fn test_filename() {
        let location = InputLocation::parse("s3://bucket/dir/reads.fastq.gz").unwrap();
        assert_eq!(location.filename(), "reads.fastq.gz");

        let location = InputLocation::parse("sra://SRR1").unwrap();
        assert_eq!(location.filename(), "SRR1.fastq");

        let location = InputLocation::parse("inputs/reads.fasta").unwrap();
        assert_eq!(location.filename(), "reads.fasta");
    }

    #[test]
    fn test_fastq_to_fasta_path() {
        assert_eq!(
            fastq_to_fasta_path(Path::new("/tmp/x/reads.fastq")),
            Some(PathBuf::from("/tmp/x/reads.fasta"))
        );
        assert_eq!(
            fastq_to_fasta_path(Path::new("reads.FQ")),
            Some(PathBuf::from("reads.Fa"))
        );
        assert_eq!(fastq_to_fasta_path(Path::new("reads.fasta")), None);
    }
}
