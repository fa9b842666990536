use std::fmt::Display;
use std::path::{Path, PathBuf};

use anyhow::bail;
use swarmrun::input::InputLocation;
use swarmrun::output::OutputLocation;
use swarmrun::pipeline::SampleName;
use swarmrun::sra::{SraCache, DEFAULT_NCBI_ROOT};
use swarmrun::tools::{Tool, ToolPaths};

#[derive(Debug, Clone)]
pub struct Directory {
    path: PathBuf,
}

impl Display for Directory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

pub fn directory(path: &str) -> Result<Directory, String> {
    let result = Directory {
        path: PathBuf::from(path),
    };

    Ok(result)
}

impl Directory {
    pub fn as_path_buf(&self) -> Result<PathBuf, anyhow::Error> {
        let path = Path::new(&self.path);
        if !path.is_dir() {
            bail!(
                "Provided path: {} does not point to a directory",
                path.display()
            );
        }

        Ok(path.to_path_buf())
    }
}

#[derive(Debug, Clone)]
pub struct InputFile {
    path: PathBuf,
}

impl Display for InputFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

pub fn input_file(path: &str) -> Result<InputFile, String> {
    let input_path = Path::new(path);
    if !input_path.is_file() {
        return Err(format!("{} is not a file", input_path.display()));
    }

    Ok(InputFile {
        path: input_path.to_path_buf(),
    })
}

impl InputFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub fn input_location(input: &str) -> Result<InputLocation, String> {
    InputLocation::parse(input).map_err(|e| e.to_string())
}

pub fn output_location(output: &str) -> Result<OutputLocation, String> {
    Ok(OutputLocation::parse(output))
}

pub fn sample_name(name: &str) -> Result<SampleName, String> {
    SampleName::new(name).map_err(|e| e.to_string())
}

/// Where the external programs live. Each value is a launcher: a program
/// optionally followed by leading arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct ToolOpts {
    /// Launcher for `swarmwrapper`
    #[clap(long, global = true, env = "SWARMRUN_SWARMWRAPPER", value_parser)]
    pub swarmwrapper: Option<String>,

    /// Launcher for the AWS CLI
    #[clap(long, global = true, env = "SWARMRUN_AWS", value_parser)]
    pub aws: Option<String>,

    /// Launcher for `wget`
    #[clap(long, global = true, env = "SWARMRUN_WGET", value_parser)]
    pub wget: Option<String>,

    /// Launcher for the SRA toolkit `prefetch`
    #[clap(long, global = true, env = "SWARMRUN_PREFETCH", value_parser)]
    pub prefetch: Option<String>,

    /// Launcher for the SRA toolkit `fastq-dump`
    #[clap(long, global = true, env = "SWARMRUN_FASTQ_DUMP", value_parser)]
    pub fastq_dump: Option<String>,

    /// Launcher for the FASTX toolkit `fastq_to_fasta`
    #[clap(long, global = true, env = "SWARMRUN_FASTQ_TO_FASTA", value_parser)]
    pub fastq_to_fasta: Option<String>,

    /// NCBI configuration folder holding the SRA download cache
    #[clap(long, global = true, env = "SWARMRUN_NCBI_ROOT", default_value = DEFAULT_NCBI_ROOT, value_parser)]
    pub ncbi_root: PathBuf,
}

impl ToolOpts {
    #[must_use]
    pub fn tool_paths(&self) -> ToolPaths {
        let mut tools = ToolPaths::new();
        let overrides = [
            (Tool::SwarmWrapper, &self.swarmwrapper),
            (Tool::Aws, &self.aws),
            (Tool::Wget, &self.wget),
            (Tool::Prefetch, &self.prefetch),
            (Tool::FastqDump, &self.fastq_dump),
            (Tool::FastqToFasta, &self.fastq_to_fasta),
        ];
        for (tool, launcher) in overrides {
            if let Some(launcher) = launcher {
                tools.set_from_str(tool, launcher);
            }
        }

        tools
    }

    #[must_use]
    pub fn sra_cache(&self) -> SraCache {
        SraCache::new(&self.ncbi_root)
    }
}
