use crate::ports::progress::{Phase, ProgressObserver};

/// Renders mix progress as log lines.
pub struct LogObserver;

impl ProgressObserver for LogObserver {
    fn start(&self, phase: Phase) {
        log::info!("{}...", phase);
    }

    fn complete(&self, phase: Phase, detail: Option<&str>) {
        match detail {
            Some(detail) => log::info!("{}: done. {}", phase, detail),
            None => log::info!("{}: done", phase),
        }
    }

    fn skip(&self, phase: Phase) {
        log::debug!("{}: skipped", phase);
    }

    fn fail(&self, phase: Phase, context: &str, error: &(dyn std::error::Error + 'static)) {
        log::error!("{}: failed ({}): {}", phase, context, error);
    }
}
