use std::fmt::{Debug, Display, Formatter};

use number_prefix::NumberPrefix;

#[must_use]
pub(crate) fn format_bytes(bytes: u64) -> String {
    match NumberPrefix::decimal(bytes as f32) {
        NumberPrefix::Standalone(bytes) => {
            format!("{} bytes", bytes)
        }
        NumberPrefix::Prefixed(prefix, n) => {
            format!("{:.2} {}B", n, prefix)
        }
    }
}

/// Coarse steps of a wrapper run.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Stage {
    FetchInput,
    Cluster,
    ReturnResults,
    Acceptance,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::FetchInput => write!(f, "Fetching input file"),
            Stage::Cluster => write!(f, "Running Swarm"),
            Stage::ReturnResults => write!(f, "Returning results"),
            Stage::Acceptance => write!(f, "Running acceptance checks"),
        }
    }
}

pub trait StageNotifier: Debug + Send + Sync {
    fn stage_started(&self, stage: Stage);

    fn stage_finished(&self, stage: Stage);
}

impl<T: StageNotifier> StageNotifier for &T {
    fn stage_started(&self, stage: Stage) {
        T::stage_started(self, stage)
    }

    fn stage_finished(&self, stage: Stage) {
        T::stage_finished(self, stage)
    }
}

#[derive(Clone, Debug)]
pub struct DummyStageNotifier;

impl StageNotifier for DummyStageNotifier {
    fn stage_started(&self, _stage: Stage) {
        // do nothing
    }

    fn stage_finished(&self, _stage: Stage) {
        // do nothing
    }
}
