use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::info;
use serde::{Deserialize, Serialize};

use crate::command::{CommandRunner, CommandSpec};
use crate::error::{SwarmRunError, SwarmRunResult};
use crate::tools::{Tool, ToolPaths};

/// Clustering parameters passed through to `swarmwrapper cluster`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmParams {
    /// Resolution, `-d`.
    pub differences: u32,
    /// Drop OTUs with a total mass lower than this, `-M`; 1 drops nothing.
    pub min_mass: u32,
    /// Keep abundance annotations in seed names.
    pub keep_abundance: bool,
}

impl Default for SwarmParams {
    fn default() -> Self {
        Self {
            differences: 1,
            min_mass: 1,
            keep_abundance: false,
        }
    }
}

/// The two files produced by a clustering run.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SwarmOutputs {
    /// Seeds, `-w`.
    pub fasta: PathBuf,
    /// Cluster assignments, `-a`.
    pub csv: PathBuf,
}

impl SwarmOutputs {
    /// `<dir>/<sample>.swarm.fasta` and `<dir>/<sample>.swarm.csv`.
    #[must_use]
    pub fn for_sample(dir: &Path, sample: &str) -> Self {
        Self {
            fasta: dir.join(format!("{}.swarm.fasta", sample)),
            csv: dir.join(format!("{}.swarm.csv", sample)),
        }
    }

    /// Both files must exist and be non-empty.
    pub fn verify(&self) -> SwarmRunResult<()> {
        for path in [&self.fasta, &self.csv] {
            let metadata = match fs::metadata(path) {
                Ok(metadata) => metadata,
                Err(_) => return Err(SwarmRunError::MissingOutput(path.clone())),
            };
            if metadata.len() == 0 {
                return Err(SwarmRunError::EmptyOutput(path.clone()));
            }
        }

        Ok(())
    }
}

/// `swarmwrapper cluster <input> -D -w <fasta> -a <csv> -d <d> -M <m>`.
#[must_use]
pub fn cluster_command(
    tools: &ToolPaths,
    input: &Path,
    outputs: &SwarmOutputs,
    params: &SwarmParams,
) -> CommandSpec {
    let command = tools
        .command(Tool::SwarmWrapper)
        .arg("cluster")
        .arg(input)
        .arg("-D")
        .arg("-w")
        .arg(&outputs.fasta)
        .arg("-a")
        .arg(&outputs.csv)
        .arg("-d")
        .arg(params.differences.to_string())
        .arg("-M")
        .arg(params.min_mass.to_string());

    if params.keep_abundance {
        command.arg("--keep-abundance")
    } else {
        command
    }
}

/// Runs the clustering and checks that both outputs were written.
pub fn cluster(
    tools: &ToolPaths,
    runner: &CommandRunner,
    input: &Path,
    outputs: &SwarmOutputs,
    params: &SwarmParams,
) -> SwarmRunResult<()> {
    info!("FASTA output: {}", outputs.fasta.display());
    info!("CSV output: {}", outputs.csv.display());

    let start_time = Instant::now();
    runner.run(&cluster_command(tools, input, outputs, params))?;
    info!(
        "Seconds elapsed: {:.2}",
        start_time.elapsed().as_secs_f32()
    );

    outputs.verify()
}
