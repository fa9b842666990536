use std::path::Path;

use anyhow::Context;
use log::{error, info};
use swarmrun::pipeline::{Pipeline, PipelineConfig};
use swarmrun::workspace::TempWorkspace;

use crate::logging::{attach_log_file, detach_log_file};
use crate::PROGRESS_BAR;

/// Runs one sample end to end; the temporary folder is removed afterwards
/// unless `keep_temp` is set.
pub fn run(config: PipelineConfig, temp_folder: &Path, keep_temp: bool) -> anyhow::Result<()> {
    let mut workspace =
        TempWorkspace::create(temp_folder).context("Could not create the temporary folder")?;
    if keep_temp {
        workspace.keep();
    }

    let log_path = workspace.log_path(config.sample.as_str());
    attach_log_file(&log_path).context("Could not open the log file")?;
    info!("Temporary folder: {}", workspace.path().display());

    let pipeline = Pipeline::new(config);
    let outcome = match pipeline.run(&workspace, &*PROGRESS_BAR) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("There was an unexpected failure");
            error!("{}", e);
            detach_log_file();
            return Err(e).context("Failed to cluster the sample");
        }
    };
    for delivered in &outcome.delivered {
        info!("Output: {}", delivered);
    }

    info!("Returning the log file");
    detach_log_file();
    let delivered = pipeline
        .delivery()
        .deliver(&log_path)
        .context("Could not deliver the log file")?;
    info!("Output: {}", delivered);

    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use std::fs;
    use std::io::Read;
    use std::path::Path;

    use log::LevelFilter;
    use swarmrun::_internal_test_data::{
        fake_swarmwrapper, fasta_records, script_command, write_script,
    };
    use swarmrun::command::{CommandRunner, CommandSpec};
    use swarmrun::compression::open_maybe_gz;
    use swarmrun::input::InputLocation;
    use swarmrun::output::OutputLocation;
    use swarmrun::pipeline::{PipelineConfig, SampleName};
    use swarmrun::sra::SraCache;
    use swarmrun::swarm::SwarmParams;
    use swarmrun::tools::{Tool, ToolPaths};

    use crate::cmd::run::run;
    use crate::logging::init_logging;

    fn config(input: &Path, output: &Path, wrapper: CommandSpec) -> PipelineConfig {
        let mut tools = ToolPaths::new();
        tools.set(Tool::SwarmWrapper, wrapper);
        PipelineConfig {
            input: InputLocation::Local(input.to_owned()),
            sample: SampleName::new("S1").unwrap(),
            output: OutputLocation::Local(output.to_owned()),
            params: SwarmParams::default(),
            tools,
            sra_cache: SraCache::new(output.join("ncbi")),
            runner: CommandRunner::new(),
        }
    }

    // Both runs share the global log file sink, so they live in one test.
    #[test]
    fn test_log_file_delivered_only_on_success() {
        let _ = init_logging(LevelFilter::Info);

        let inputs = tempfile::tempdir().unwrap();
        let bin = tempfile::tempdir().unwrap();
        let input = inputs.path().join("reads.fasta");
        fs::write(&input, fasta_records(10)).unwrap();

        let temp = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let wrapper = fake_swarmwrapper(bin.path(), "0.0.0", 6, 3);
        run(config(&input, out.path(), script_command(&wrapper)), temp.path(), false).unwrap();

        let log_gz = out.path().join("S1.log.txt.gz");
        let mut log = String::new();
        open_maybe_gz(&log_gz)
            .unwrap()
            .read_to_string(&mut log)
            .unwrap();
        assert!(log.contains("[Swarm] Fetching input file"), "{}", log);
        assert!(log.contains("[Swarm] Returning the log file"), "{}", log);
        assert!(out.path().join("S1.swarm.csv.gz").exists());
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);

        let temp = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let broken = write_script(bin.path(), "broken_swarmwrapper", "exit 3\n");
        let result = run(config(&input, out.path(), script_command(&broken)), temp.path(), false);

        assert!(result.is_err());
        assert!(!out.path().join("S1.log.txt.gz").exists());
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
    }
}
