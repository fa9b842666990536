use std::fmt::{Display, Formatter};

use crate::command::CommandSpec;

/// External programs the wrapper depends on.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Tool {
    SwarmWrapper,
    Aws,
    Wget,
    Prefetch,
    FastqDump,
    FastqToFasta,
}

impl Tool {
    pub const VALUES: [Tool; 6] = [
        Tool::SwarmWrapper,
        Tool::Aws,
        Tool::Wget,
        Tool::Prefetch,
        Tool::FastqDump,
        Tool::FastqToFasta,
    ];

    /// Executable name looked up in `PATH` by default.
    #[must_use]
    pub const fn default_program(&self) -> &'static str {
        match self {
            Tool::SwarmWrapper => "swarmwrapper",
            Tool::Aws => "aws",
            Tool::Wget => "wget",
            Tool::Prefetch => "prefetch",
            Tool::FastqDump => "fastq-dump",
            Tool::FastqToFasta => "fastq_to_fasta",
        }
    }
}

impl Display for Tool {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.default_program())
    }
}

/// How each [`Tool`] is launched.
///
/// A launcher is a program followed by any leading arguments, e.g.
/// `python3 -m swarmwrapper`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ToolPaths {
    swarmwrapper: CommandSpec,
    aws: CommandSpec,
    wget: CommandSpec,
    prefetch: CommandSpec,
    fastq_dump: CommandSpec,
    fastq_to_fasta: CommandSpec,
}

impl ToolPaths {
    #[must_use]
    pub fn new() -> Self {
        Self {
            swarmwrapper: CommandSpec::new(Tool::SwarmWrapper.default_program()),
            aws: CommandSpec::new(Tool::Aws.default_program()),
            wget: CommandSpec::new(Tool::Wget.default_program()),
            prefetch: CommandSpec::new(Tool::Prefetch.default_program()),
            fastq_dump: CommandSpec::new(Tool::FastqDump.default_program()),
            fastq_to_fasta: CommandSpec::new(Tool::FastqToFasta.default_program()),
        }
    }

    /// Replaces the launcher used for `tool`.
    pub fn set(&mut self, tool: Tool, launcher: CommandSpec) -> &mut Self {
        *self.slot_mut(tool) = launcher;
        self
    }

    /// Parses a whitespace-separated launcher. Blank strings are ignored.
    pub fn set_from_str(&mut self, tool: Tool, launcher: &str) -> &mut Self {
        let mut parts = launcher.split_whitespace();
        if let Some(program) = parts.next() {
            self.set(tool, CommandSpec::new(program).args(parts));
        }
        self
    }

    /// A fresh command for `tool`, ready for its arguments.
    #[must_use]
    pub fn command(&self, tool: Tool) -> CommandSpec {
        self.slot(tool).clone()
    }

    fn slot(&self, tool: Tool) -> &CommandSpec {
        match tool {
            Tool::SwarmWrapper => &self.swarmwrapper,
            Tool::Aws => &self.aws,
            Tool::Wget => &self.wget,
            Tool::Prefetch => &self.prefetch,
            Tool::FastqDump => &self.fastq_dump,
            Tool::FastqToFasta => &self.fastq_to_fasta,
        }
    }

    fn slot_mut(&mut self, tool: Tool) -> &mut CommandSpec {
        match tool {
            Tool::SwarmWrapper => &mut self.swarmwrapper,
            Tool::Aws => &mut self.aws,
            Tool::Wget => &mut self.wget,
            Tool::Prefetch => &mut self.prefetch,
            Tool::FastqDump => &mut self.fastq_dump,
            Tool::FastqToFasta => &mut self.fastq_to_fasta,
        }
    }
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self::new()
    }
}
