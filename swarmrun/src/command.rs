use std::ffi::OsStr;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use itertools::Itertools;
use log::info;

use crate::error::{SwarmRunError, SwarmRunResult};

/// A single external program invocation.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
}

impl CommandSpec {
    #[must_use]
    pub fn new<P: AsRef<OsStr>>(program: P) -> Self {
        Self {
            program: program.as_ref().to_string_lossy().into_owned(),
            args: Vec::new(),
        }
    }

    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            self = self.arg(arg);
        }
        self
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[must_use]
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }
}

impl Display for CommandSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            std::iter::once(&self.program).chain(&self.args).join(" ")
        )
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CommandOutput {
    status_code: Option<i32>,
    stdout: String,
    stderr: String,
}

impl CommandOutput {
    fn from_output(output: Output) -> Self {
        Self {
            status_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }

    #[must_use]
    pub fn status_code(&self) -> Option<i32> {
        self.status_code
    }

    #[must_use]
    pub fn success(&self) -> bool {
        self.status_code == Some(0)
    }

    #[must_use]
    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    #[must_use]
    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    /// Standard output followed by standard error.
    #[must_use]
    pub fn combined(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }
}

/// Runs external programs, logging their arguments and everything they print.
#[derive(Debug, Clone, Default)]
pub struct CommandRunner {
    retries: u32,
    allow_failure: bool,
}

impl CommandRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of additional attempts after a non-zero exit code.
    #[must_use]
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Return the output of a failed command instead of an error.
    #[must_use]
    pub fn allow_failure(mut self, allow_failure: bool) -> Self {
        self.allow_failure = allow_failure;
        self
    }

    pub fn run(&self, spec: &CommandSpec) -> SwarmRunResult<CommandOutput> {
        self.run_with(spec, None)
    }

    /// Runs the command with its standard output written to `path`.
    pub fn run_to_file(&self, spec: &CommandSpec, path: &Path) -> SwarmRunResult<CommandOutput> {
        self.run_with(spec, Some(path))
    }

    fn run_with(&self, spec: &CommandSpec, stdout: Option<&Path>) -> SwarmRunResult<CommandOutput> {
        let mut retries = self.retries;
        loop {
            let output = Self::execute(spec, stdout)?;
            if output.success() {
                return Ok(output);
            }

            let code = output
                .status_code()
                .map_or_else(|| "<signal>".to_owned(), |code| code.to_string());
            if retries > 0 {
                info!("Exit code {}, retrying {} more times", code, retries);
                retries -= 1;
            } else if self.allow_failure {
                info!("Exit code was {}, but we will continue anyway", code);
                return Ok(output);
            } else {
                return Err(SwarmRunError::CommandFailed {
                    command: spec.to_string(),
                    code: output.status_code(),
                });
            }
        }
    }

    fn execute(spec: &CommandSpec, stdout: Option<&Path>) -> SwarmRunResult<CommandOutput> {
        info!("Commands:");
        info!("{}", spec);

        let mut command = spec.to_command();
        command.stdin(Stdio::null()).stderr(Stdio::piped());
        match stdout {
            Some(path) => command.stdout(Stdio::from(File::create(path)?)),
            None => command.stdout(Stdio::piped()),
        };

        let output = command.output().map_err(|source| SwarmRunError::CommandSpawn {
            program: spec.program().to_owned(),
            source,
        })?;
        let output = CommandOutput::from_output(output);

        if !output.stdout().is_empty() {
            info!("Standard output of subprocess:");
            output.stdout().lines().for_each(|line| info!("{}", line));
        }
        if !output.stderr().is_empty() {
            info!("Standard error of subprocess:");
            output.stderr().lines().for_each(|line| info!("{}", line));
        }

        Ok(output)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::fs;

    use crate::_internal_test_data::{script_command, write_script};
    use crate::command::{CommandRunner, CommandSpec};
    use crate::error::SwarmRunError;

    #[test]
    fn test_display_joins_arguments() {
        let spec = CommandSpec::new("swarmwrapper")
            .arg("cluster")
            .args(["in.fasta", "-D"]);
        assert_eq!(spec.to_string(), "swarmwrapper cluster in.fasta -D");
    }

    #[test_log::test]
    fn test_run_captures_both_streams() {
        let spec = CommandSpec::new("sh").args(["-c", "echo out; echo err >&2"]);
        let output = CommandRunner::new().run(&spec).unwrap();

        assert!(output.success());
        assert_eq!(output.stdout(), "out\n");
        assert_eq!(output.stderr(), "err\n");
        assert_eq!(output.combined(), "out\nerr\n");
    }

    #[test]
    fn test_failure_is_an_error() {
        let spec = CommandSpec::new("sh").args(["-c", "exit 3"]);
        let err = CommandRunner::new().run(&spec).unwrap_err();

        match err {
            SwarmRunError::CommandFailed { code, .. } => assert_eq!(code, Some(3)),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_allowed_failure_returns_output() {
        let spec = CommandSpec::new("sh").args(["-c", "echo partial; exit 1"]);
        let output = CommandRunner::new()
            .allow_failure(true)
            .run(&spec)
            .unwrap();

        assert_eq!(output.status_code(), Some(1));
        assert_eq!(output.stdout(), "partial\n");
    }

    #[test_log::test]
    fn test_retries_until_success() {
        let dir = tempfile::tempdir().unwrap();
        let counter = dir.path().join("attempts");
        // Fails on the first two attempts.
        let script = write_script(
            dir.path(),
            "flaky",
            &format!(
                "echo x >> {0}\n[ $(wc -l < {0}) -ge 3 ]\n",
                counter.display()
            ),
        );

        let output = CommandRunner::new()
            .with_retries(2)
            .run(&script_command(&script))
            .unwrap();

        assert!(output.success());
        assert_eq!(fs::read_to_string(&counter).unwrap().lines().count(), 3);
    }

    #[test]
    fn test_retries_exhausted() {
        let dir = tempfile::tempdir().unwrap();
        let counter = dir.path().join("attempts");
        let script = write_script(
            dir.path(),
            "always_fails",
            &format!("echo x >> {}\nexit 1\n", counter.display()),
        );

        let result = CommandRunner::new()
            .with_retries(1)
            .run(&script_command(&script));

        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&counter).unwrap().lines().count(), 2);
    }

    #[test]
    fn test_missing_program() {
        let spec = CommandSpec::new("/definitely/not/a/program");
        let err = CommandRunner::new().with_retries(3).run(&spec).unwrap_err();

        assert!(matches!(err, SwarmRunError::CommandSpawn { .. }));
    }

    #[test]
    fn test_run_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("stdout.txt");
        let spec = CommandSpec::new("sh").args(["-c", "echo first; echo second"]);

        let output = CommandRunner::new().run_to_file(&spec, &out).unwrap();

        assert!(output.stdout().is_empty());
        assert_eq!(fs::read_to_string(&out).unwrap(), "first\nsecond\n");
    }
}
