use anyhow::{bail, Context};
use atty::Stream;
use clap::Parser;
use cli::{Cli, Commands};
use cmd::{check, run};
use human_panic::setup_panic;
use lazy_static::lazy_static;
use swarmrun::acceptance::{AcceptanceManifest, FixtureExpectation};
use swarmrun::command::CommandRunner;
use swarmrun::pipeline::PipelineConfig;
use swarmrun::swarm::SwarmParams;

use crate::logging::init_logging;
use crate::progress_bar::StageSpinner;

mod cli;
mod cmd;
mod csv_report;
mod logging;
mod opts;
mod progress_bar;

lazy_static! {
    pub(crate) static ref PROGRESS_BAR: StageSpinner = StageSpinner::new();
}

fn main() -> anyhow::Result<()> {
    setup_panic!();

    let cli: Cli = Cli::parse();

    if !cli.no_progress && atty::is(Stream::Stderr) {
        PROGRESS_BAR.show();
    }

    init_logging(cli.verbose.log_level_filter()).expect("Could not initialize logging");

    let tools = cli.tools.tool_paths();

    match &cli.command {
        Commands::Run {
            input,
            sample_name,
            output_folder,
            differences,
            min_mass,
            keep_abundance,
            temp_folder,
            keep_temp,
            retries,
        } => {
            let config = PipelineConfig {
                input: input.clone(),
                sample: sample_name.clone(),
                output: output_folder.clone(),
                params: SwarmParams {
                    differences: *differences,
                    min_mass: *min_mass,
                    keep_abundance: *keep_abundance,
                },
                tools,
                sra_cache: cli.tools.sra_cache(),
                runner: CommandRunner::new().with_retries(*retries),
            };

            run::run(config, &temp_folder.as_path_buf()?, *keep_temp)?;
        }
        Commands::Check {
            manifest,
            fixture,
            csv_lines,
            fasta_lines,
            scratch,
            format,
        } => {
            let mut manifest = match manifest {
                Some(path) => AcceptanceManifest::from_path(path.path())
                    .with_context(|| format!("Could not read the manifest {}", path))?,
                None => AcceptanceManifest::default(),
            };
            if let Some(fixture) = fixture {
                let mut expectation = FixtureExpectation::new(fixture);
                expectation.csv_lines = *csv_lines;
                expectation.fasta_lines = *fasta_lines;
                manifest.fixture = Some(expectation);
            }

            let passed = check::check(manifest, tools, &scratch.as_path_buf()?, *format)?;
            if !passed {
                bail!("Some acceptance checks failed");
            }
        }
    }

    PROGRESS_BAR.finish();
    Ok(())
}
