use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use swarmrun::input::InputLocation;
use swarmrun::output::OutputLocation;
use swarmrun::pipeline::SampleName;

use crate::cmd::check::ReportFormat;
use crate::opts::{
    directory, input_file, input_location, output_location, sample_name, Directory, InputFile,
    ToolOpts,
};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
pub struct Cli {
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,

    /// Don't display a progress spinner
    #[clap(long, global = true, value_parser)]
    pub no_progress: bool,

    #[clap(flatten)]
    pub tools: ToolOpts,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Cluster a set of reads with Swarm
    Run {
        /// Location of the input file: a local path or a `sra://`, `s3://`,
        /// `ftp://`, `http://` or `https://` URL; FASTA or FASTQ, optionally
        /// gzipped
        #[clap(long, value_parser = input_location)]
        input: InputLocation,

        /// Name of the sample; determines output file names
        #[clap(long, value_parser = sample_name)]
        sample_name: SampleName,

        /// Folder to place results in: a local path or a `s3://` prefix
        #[clap(long, value_parser = output_location)]
        output_folder: OutputLocation,

        /// Resolution parameter used by Swarm
        #[clap(long, default_value_t = 1, value_parser)]
        differences: u32,

        /// Drop OTUs with a total mass less than N (1 drops nothing)
        #[clap(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        min_mass: u32,

        /// Keep abundance annotations in seed names
        #[clap(long, value_parser)]
        keep_abundance: bool,

        /// Folder used for temporary files
        #[clap(long, env = "SWARMRUN_TEMP_FOLDER", default_value = "/share", value_parser = directory)]
        temp_folder: Directory,

        /// Leave the temporary folder on disk after the run
        #[clap(long, value_parser)]
        keep_temp: bool,

        /// Number of times a failed download or tool invocation is repeated
        #[clap(long, default_value_t = 0, value_parser)]
        retries: u32,
    },

    /// Verify the installed tools and, given a fixture, the shape of the
    /// clustering outputs
    Check {
        /// JSON manifest with version pins and the fixture expectation
        #[clap(long, value_parser = input_file)]
        manifest: Option<InputFile>,

        /// Fixture FASTA file to cluster; overrides the manifest fixture
        #[clap(long, value_parser)]
        fixture: Option<PathBuf>,

        /// Expected number of lines of the clusters CSV
        #[clap(long, default_value_t = 340, value_parser)]
        csv_lines: usize,

        /// Expected number of lines of the clusters FASTA
        #[clap(long, default_value_t = 680, value_parser)]
        fasta_lines: usize,

        /// Folder hosting the fixture runs
        #[clap(long, env = "SWARMRUN_TEMP_FOLDER", default_value = "/tmp", value_parser = directory)]
        scratch: Directory,

        /// Report format printed to the standard output
        #[clap(long, value_enum, default_value_t = ReportFormat::Csv)]
        format: ReportFormat,
    },
}
