use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use log::info;

use crate::command::CommandRunner;
use crate::error::{SwarmRunError, SwarmRunResult};
use crate::input::{InputFetcher, InputLocation};
use crate::output::{OutputLocation, ResultDelivery};
use crate::progress::{Stage, StageNotifier};
use crate::sra::SraCache;
use crate::swarm::{cluster, SwarmOutputs, SwarmParams};
use crate::tools::ToolPaths;
use crate::workspace::TempWorkspace;

/// Name of a sample; every output file is prefixed with it.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct SampleName(String);

impl SampleName {
    pub fn new<S: Into<String>>(name: S) -> SwarmRunResult<Self> {
        let name = name.into();
        if name.is_empty() || name.contains('/') || name == "." || name == ".." {
            return Err(SwarmRunError::InvalidSampleName(name));
        }

        Ok(Self(name))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SampleName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything one wrapper run needs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input: InputLocation,
    pub sample: SampleName,
    pub output: OutputLocation,
    pub params: SwarmParams,
    pub tools: ToolPaths,
    pub sra_cache: SraCache,
    pub runner: CommandRunner,
}

/// What a finished run delivered, in delivery order.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PipelineOutcome {
    pub input_fasta: PathBuf,
    pub delivered: Vec<String>,
}

/// Fetch, cluster and deliver a single sample.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn run<N: StageNotifier>(
        &self,
        workspace: &TempWorkspace,
        notifier: &N,
    ) -> SwarmRunResult<PipelineOutcome> {
        let config = &self.config;

        notifier.stage_started(Stage::FetchInput);
        info!("Fetching input file");
        let input_fasta = InputFetcher::new(&config.tools, &config.runner, &config.sra_cache)
            .fetch(&config.input, workspace)?;
        notifier.stage_finished(Stage::FetchInput);

        notifier.stage_started(Stage::Cluster);
        let outputs = SwarmOutputs::for_sample(workspace.path(), config.sample.as_str());
        cluster(
            &config.tools,
            &config.runner,
            &input_fasta,
            &outputs,
            &config.params,
        )?;
        notifier.stage_finished(Stage::Cluster);

        notifier.stage_started(Stage::ReturnResults);
        let delivery = self.delivery();
        let delivered = [&outputs.fasta, &outputs.csv]
            .into_iter()
            .map(|path| delivery.deliver(path))
            .collect::<SwarmRunResult<Vec<_>>>()?;
        notifier.stage_finished(Stage::ReturnResults);

        Ok(PipelineOutcome {
            input_fasta,
            delivered,
        })
    }

    /// Delivery to the configured output location, gzipping each file.
    #[must_use]
    pub fn delivery(&self) -> ResultDelivery<'_> {
        ResultDelivery::new(&self.config.tools, &self.config.runner, &self.config.output)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::fs;

    use crate::_internal_test_data::{fake_swarmwrapper, fasta_records, script_command};
    use crate::command::CommandRunner;
    use crate::compression::count_lines;
    use crate::error::SwarmRunError;
    use crate::input::InputLocation;
    use crate::output::OutputLocation;
    use crate::pipeline::{Pipeline, PipelineConfig, SampleName};
    use crate::progress::DummyStageNotifier;
    use crate::sra::SraCache;
    use crate::swarm::SwarmParams;
    use crate::tools::{Tool, ToolPaths};
    use crate::workspace::TempWorkspace;

    #[test]
    fn test_sample_name_validation() {
        assert!(SampleName::new("S1").is_ok());
        for name in ["", "a/b", ".", ".."] {
            assert!(matches!(
                SampleName::new(name),
                Err(SwarmRunError::InvalidSampleName(_))
            ));
        }
    }

    #[test_log::test]
    fn test_run_local_fasta() {
        let inputs = tempfile::tempdir().unwrap();
        let temp = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let bin = tempfile::tempdir().unwrap();

        let input = inputs.path().join("reads.fasta");
        fs::write(&input, fasta_records(10)).unwrap();
        let wrapper = fake_swarmwrapper(bin.path(), "0.0.0", 6, 3);
        let mut tools = ToolPaths::new();
        tools.set(Tool::SwarmWrapper, script_command(&wrapper));

        let pipeline = Pipeline::new(PipelineConfig {
            input: InputLocation::Local(input.clone()),
            sample: SampleName::new("S1").unwrap(),
            output: OutputLocation::Local(out.path().to_owned()),
            params: SwarmParams::default(),
            tools,
            sra_cache: SraCache::new(temp.path().join("ncbi")),
            runner: CommandRunner::new(),
        });
        let workspace = TempWorkspace::create(temp.path()).unwrap();

        let outcome = pipeline.run(&workspace, &DummyStageNotifier).unwrap();

        assert_eq!(outcome.input_fasta, workspace.join("reads.fasta"));
        assert_eq!(outcome.delivered.len(), 2);
        assert_eq!(
            count_lines(&out.path().join("S1.swarm.fasta.gz")).unwrap(),
            6
        );
        assert_eq!(count_lines(&out.path().join("S1.swarm.csv.gz")).unwrap(), 3);
        // The source file is copied, not moved.
        assert!(input.exists());
    }

    #[test]
    fn test_run_missing_input() {
        let temp = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(PipelineConfig {
            input: InputLocation::Local(temp.path().join("nope.fasta")),
            sample: SampleName::new("S1").unwrap(),
            output: OutputLocation::Local(temp.path().join("out")),
            params: SwarmParams::default(),
            tools: ToolPaths::new(),
            sra_cache: SraCache::new(temp.path().join("ncbi")),
            runner: CommandRunner::new(),
        });
        let workspace = TempWorkspace::create(temp.path()).unwrap();

        let err = pipeline.run(&workspace, &DummyStageNotifier).unwrap_err();
        assert!(matches!(err, SwarmRunError::InputNotFound(_)));
        assert!(!temp.path().join("out").exists());
    }
}
