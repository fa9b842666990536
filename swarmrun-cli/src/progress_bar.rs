use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use swarmrun::progress::{Stage, StageNotifier};

#[derive(Debug, Clone)]
pub(crate) struct StageSpinner {
    bar: ProgressBar,
}

impl StageSpinner {
    pub fn new() -> StageSpinner {
        let init_bar = ProgressBar::hidden();
        init_bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner} {msg} [{elapsed}]")
                .expect("Invalid progress bar template"),
        );
        init_bar.enable_steady_tick(Duration::from_millis(100));
        init_bar.set_message("Initializing...");

        Self { bar: init_bar }
    }

    pub fn show(&self) {
        self.bar.set_draw_target(ProgressDrawTarget::stderr());
    }

    pub fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear()
    }

    pub fn println<I: AsRef<str>>(&self, msg: I) {
        self.bar.println(msg);
    }
}

impl StageNotifier for StageSpinner {
    fn stage_started(&self, stage: Stage) {
        self.bar.set_message(format!("{}...", stage));
    }

    fn stage_finished(&self, stage: Stage) {
        self.bar.set_message(format!("{}: done", stage));
    }
}
