use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;

/// Error occurring while preparing the input, running the external tools or
/// delivering the results.
#[derive(Debug)]
pub enum SwarmRunError {
    /// I/O error occurred when touching the local filesystem.
    IoError(io::Error),
    /// The external program could not be started at all.
    CommandSpawn { program: String, source: io::Error },
    /// The external program exited unsuccessfully. `code` is `None` when the
    /// process was killed by a signal.
    CommandFailed { command: String, code: Option<i32> },
    /// Local input file does not exist.
    InputNotFound(PathBuf),
    /// Input location has a scheme we do not know how to fetch.
    UnsupportedInput(String),
    /// `fastq-dump` finished without producing any FASTQ file.
    SraDownloadFailed(String),
    /// The temporary folder name is already taken.
    WorkspaceExists(PathBuf),
    /// Sample name cannot be used to name output files.
    InvalidSampleName(String),
    /// An output file expected from Swarm was not created.
    MissingOutput(PathBuf),
    /// An output file expected from Swarm is empty.
    EmptyOutput(PathBuf),
}

impl From<io::Error> for SwarmRunError {
    fn from(e: io::Error) -> Self {
        Self::IoError(e)
    }
}

impl Display for SwarmRunError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SwarmRunError::IoError(e) => write!(f, "IO error: {}", e),
            SwarmRunError::CommandSpawn { program, source } => {
                write!(f, "Could not start `{}`: {}", program, source)
            }
            SwarmRunError::CommandFailed {
                command,
                code: Some(code),
            } => write!(f, "Exit code {} from `{}`", code, command),
            SwarmRunError::CommandFailed {
                command,
                code: None,
            } => write!(f, "`{}` was terminated by a signal", command),
            SwarmRunError::InputNotFound(path) => {
                write!(f, "Input file does not exist ({})", path.display())
            }
            SwarmRunError::UnsupportedInput(input) => {
                write!(f, "Did not recognize prefix for input: {}", input)
            }
            SwarmRunError::SraDownloadFailed(accession) => {
                write!(f, "File could not be downloaded from SRA: {}", accession)
            }
            SwarmRunError::WorkspaceExists(path) => {
                write!(f, "Temporary folder already exists: {}", path.display())
            }
            SwarmRunError::InvalidSampleName(name) => {
                write!(f, "Invalid sample name: `{}`", name)
            }
            SwarmRunError::MissingOutput(path) => {
                write!(f, "Output file was not created: {}", path.display())
            }
            SwarmRunError::EmptyOutput(path) => {
                write!(f, "Output file is empty: {}", path.display())
            }
        }
    }
}

impl Error for SwarmRunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SwarmRunError::IoError(e) => Some(e),
            SwarmRunError::CommandSpawn { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// The result of a swarmrun operation.
pub type SwarmRunResult<T> = Result<T, SwarmRunError>;
