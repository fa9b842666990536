//! Checks that an assembled environment carries the pinned tools and that a
//! clustering run on a known fixture produces outputs of the known shape.

use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::command::{CommandRunner, CommandSpec};
use crate::compression::count_lines;
use crate::error::SwarmRunResult;
use crate::input::InputLocation;
use crate::output::OutputLocation;
use crate::pipeline::{Pipeline, PipelineConfig, SampleName};
use crate::progress::{DummyStageNotifier, Stage, StageNotifier};
use crate::sra::SraCache;
use crate::swarm::{SwarmOutputs, SwarmParams};
use crate::tools::{Tool, ToolPaths};
use crate::workspace::TempWorkspace;

/// A tool that must report `expected` somewhere in its version output.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ToolPin {
    pub name: String,
    pub program: String,
    pub args: Vec<String>,
    pub expected: String,
}

impl ToolPin {
    #[must_use]
    pub fn new(name: &str, program: &str, args: &[&str], expected: &str) -> Self {
        Self {
            name: name.to_owned(),
            program: program.to_owned(),
            args: args.iter().map(|&arg| arg.to_owned()).collect(),
            expected: expected.to_owned(),
        }
    }

    /// The program to launch; a program named like a known tool honours the
    /// configured launcher.
    #[must_use]
    pub fn command(&self, tools: &ToolPaths) -> CommandSpec {
        let base = Tool::VALUES
            .iter()
            .find(|tool| tool.default_program() == self.program)
            .map_or_else(|| CommandSpec::new(&self.program), |&tool| tools.command(tool));
        base.args(&self.args)
    }
}

lazy_static! {
    static ref DEFAULT_PINS: Vec<ToolPin> = vec![
        ToolPin::new("aws", "aws", &["--version"], "aws-cli/1.16"),
        ToolPin::new("curl", "curl", &["--version"], "curl 7.58.0"),
        ToolPin::new("swarm", "swarm", &["-v"], "Swarm 2.2.2"),
        ToolPin::new("swarmwrapper", "swarmwrapper", &["-V"], "0.5.0"),
    ];
}

/// Known-good output shape of the fixture.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct FixtureExpectation {
    pub path: PathBuf,
    #[serde(default = "default_sample")]
    pub sample: String,
    #[serde(default = "default_csv_lines")]
    pub csv_lines: usize,
    #[serde(default = "default_fasta_lines")]
    pub fasta_lines: usize,
}

fn default_sample() -> String {
    "test".to_owned()
}

const fn default_csv_lines() -> usize {
    340
}

const fn default_fasta_lines() -> usize {
    680
}

impl FixtureExpectation {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            sample: default_sample(),
            csv_lines: default_csv_lines(),
            fasta_lines: default_fasta_lines(),
        }
    }
}

/// The full list of checks, loadable from JSON.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct AcceptanceManifest {
    #[serde(default = "default_pins")]
    pub pins: Vec<ToolPin>,
    #[serde(default)]
    pub fixture: Option<FixtureExpectation>,
}

fn default_pins() -> Vec<ToolPin> {
    DEFAULT_PINS.clone()
}

impl AcceptanceManifest {
    pub fn from_path(path: &Path) -> SwarmRunResult<Self> {
        let reader = BufReader::new(fs::File::open(path)?);
        let manifest = serde_json::from_reader(reader).map_err(std::io::Error::from)?;
        Ok(manifest)
    }
}

impl Default for AcceptanceManifest {
    fn default() -> Self {
        Self {
            pins: default_pins(),
            fixture: None,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

impl CheckResult {
    fn pass<D: Into<String>>(name: &str, detail: D) -> Self {
        Self {
            name: name.to_owned(),
            passed: true,
            detail: detail.into(),
        }
    }

    fn fail<D: Into<String>>(name: &str, detail: D) -> Self {
        Self {
            name: name.to_owned(),
            passed: false,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
pub struct AcceptanceReport {
    pub checks: Vec<CheckResult>,
}

impl AcceptanceReport {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|check| check.passed)
    }

    #[must_use]
    pub fn failures(&self) -> usize {
        self.checks.iter().filter(|check| !check.passed).count()
    }

    pub fn push(&mut self, check: CheckResult) {
        if check.passed {
            info!("ok - {}", check.name);
        } else {
            warn!("not ok - {}: {}", check.name, check.detail);
        }
        self.checks.push(check);
    }

    pub fn extend<I: IntoIterator<Item = CheckResult>>(&mut self, checks: I) {
        for check in checks {
            self.push(check);
        }
    }
}

/// Any exit code is accepted; only the printed version text matters.
#[must_use]
pub fn check_version(pin: &ToolPin, tools: &ToolPaths) -> CheckResult {
    let name = format!("{} version", pin.name);
    let command = pin.command(tools);
    match CommandRunner::new().allow_failure(true).run(&command) {
        Ok(output) if output.combined().contains(&pin.expected) => {
            CheckResult::pass(&name, pin.expected.clone())
        }
        Ok(output) => CheckResult::fail(
            &name,
            format!(
                "expected `{}` in output of `{}`, got `{}`",
                pin.expected,
                command,
                output.combined().trim()
            ),
        ),
        Err(e) => CheckResult::fail(&name, e.to_string()),
    }
}

/// Runs `command` and expects a zero exit code.
#[must_use]
pub fn check_runs(name: &str, command: &CommandSpec) -> CheckResult {
    match CommandRunner::new().run(command) {
        Ok(_) => CheckResult::pass(name, command.to_string()),
        Err(e) => CheckResult::fail(name, e.to_string()),
    }
}

/// A file that must exist, be non-empty and have exactly `lines` lines.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct LineExpectation {
    pub path: PathBuf,
    pub lines: usize,
}

impl LineExpectation {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(path: P, lines: usize) -> Self {
        Self {
            path: path.into(),
            lines,
        }
    }

    #[must_use]
    pub fn check(&self) -> Vec<CheckResult> {
        let display = self.path.display().to_string();
        let size = match fs::metadata(&self.path) {
            Ok(metadata) => metadata.len(),
            Err(_) => {
                return vec![CheckResult::fail(
                    &format!("{} exists", display),
                    "file not found",
                )]
            }
        };

        let mut checks = vec![CheckResult::pass(&format!("{} exists", display), "")];
        if size == 0 {
            checks.push(CheckResult::fail(&format!("{} not empty", display), "0 bytes"));
            return checks;
        }
        checks.push(CheckResult::pass(
            &format!("{} not empty", display),
            format!("{} bytes", size),
        ));

        let name = format!("{} has {} lines", display, self.lines);
        checks.push(match count_lines(&self.path) {
            Ok(lines) if lines == self.lines => CheckResult::pass(&name, lines.to_string()),
            Ok(lines) => CheckResult::fail(&name, format!("found {} lines", lines)),
            Err(e) => CheckResult::fail(&name, e.to_string()),
        });
        checks
    }
}

/// Runs every check of a manifest, never stopping at the first failure.
#[derive(Debug, Clone)]
pub struct AcceptanceSuite {
    manifest: AcceptanceManifest,
    tools: ToolPaths,
    scratch: PathBuf,
}

impl AcceptanceSuite {
    /// `scratch` hosts the temporary folders and outputs of the fixture runs.
    #[must_use]
    pub fn new<P: Into<PathBuf>>(manifest: AcceptanceManifest, tools: ToolPaths, scratch: P) -> Self {
        Self {
            manifest,
            tools,
            scratch: scratch.into(),
        }
    }

    pub fn run<N: StageNotifier>(&self, notifier: &N) -> AcceptanceReport {
        notifier.stage_started(Stage::Acceptance);
        let mut report = AcceptanceReport::default();

        for pin in &self.manifest.pins {
            report.push(check_version(pin, &self.tools));
        }

        if let Some(fixture) = &self.manifest.fixture {
            match self.check_direct_run(fixture) {
                Ok(checks) => report.extend(checks),
                Err(e) => report.push(CheckResult::fail("swarmwrapper cluster", e.to_string())),
            }
            match self.check_wrapper_run(fixture) {
                Ok(checks) => report.extend(checks),
                Err(e) => report.push(CheckResult::fail("run-swarm wrapper", e.to_string())),
            }
        }

        notifier.stage_finished(Stage::Acceptance);
        report
    }

    /// `swarmwrapper cluster <fixture> -D -w out.fasta -a out.csv`.
    fn check_direct_run(&self, fixture: &FixtureExpectation) -> SwarmRunResult<Vec<CheckResult>> {
        let workspace = TempWorkspace::create(&self.scratch)?;
        let outputs = SwarmOutputs::for_sample(workspace.path(), &fixture.sample);
        let command = self
            .tools
            .command(Tool::SwarmWrapper)
            .arg("cluster")
            .arg(&fixture.path)
            .arg("-D")
            .arg("-w")
            .arg(&outputs.fasta)
            .arg("-a")
            .arg(&outputs.csv);

        let mut checks = vec![check_runs("swarmwrapper cluster", &command)];
        checks.extend(LineExpectation::new(&outputs.csv, fixture.csv_lines).check());
        checks.extend(LineExpectation::new(&outputs.fasta, fixture.fasta_lines).check());
        Ok(checks)
    }

    /// The full wrapper pipeline, delivering gzipped outputs.
    fn check_wrapper_run(&self, fixture: &FixtureExpectation) -> SwarmRunResult<Vec<CheckResult>> {
        let output_dir = TempWorkspace::create(&self.scratch)?;
        let workspace = TempWorkspace::create(&self.scratch)?;
        let pipeline = Pipeline::new(PipelineConfig {
            input: InputLocation::Local(fixture.path.clone()),
            sample: SampleName::new(fixture.sample.as_str())?,
            output: OutputLocation::Local(output_dir.path().to_owned()),
            params: SwarmParams::default(),
            tools: self.tools.clone(),
            sra_cache: SraCache::default(),
            runner: CommandRunner::new(),
        });

        let run = pipeline.run(&workspace, &DummyStageNotifier);
        let mut checks = vec![match run {
            Ok(_) => CheckResult::pass("run-swarm wrapper", fixture.path.display().to_string()),
            Err(e) => CheckResult::fail("run-swarm wrapper", e.to_string()),
        }];

        let delivered = SwarmOutputs::for_sample(output_dir.path(), &fixture.sample);
        checks.extend(
            LineExpectation::new(gz_name(&delivered.csv), fixture.csv_lines).check(),
        );
        checks.extend(
            LineExpectation::new(gz_name(&delivered.fasta), fixture.fasta_lines).check(),
        );
        Ok(checks)
    }
}

fn gz_name(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".gz");
    PathBuf::from(name)
}
