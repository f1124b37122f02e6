use std::sync::Mutex;

use crate::ports::progress::{Phase, ProgressObserver};
use crate::ports::spotify::{PlaylistRef, Track};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Start(Phase),
    Complete(Phase, Option<String>),
    Skip(Phase),
    Fail(Phase, String, String),
}

/// Observer that keeps every notification for later assertions.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Events for a single phase, in emission order
    pub fn events_for(&self, phase: Phase) -> Vec<ProgressEvent> {
        self.events()
            .into_iter()
            .filter(|event| match event {
                ProgressEvent::Start(p)
                | ProgressEvent::Complete(p, _)
                | ProgressEvent::Skip(p)
                | ProgressEvent::Fail(p, _, _) => *p == phase,
            })
            .collect()
    }

    pub fn failed(&self, phase: Phase) -> bool {
        self.events_for(phase)
            .iter()
            .any(|event| matches!(event, ProgressEvent::Fail(..)))
    }

    pub fn skipped(&self, phase: Phase) -> bool {
        self.events_for(phase).contains(&ProgressEvent::Skip(phase))
    }

    fn push(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl ProgressObserver for RecordingObserver {
    fn start(&self, phase: Phase) {
        self.push(ProgressEvent::Start(phase));
    }

    fn complete(&self, phase: Phase, detail: Option<&str>) {
        self.push(ProgressEvent::Complete(phase, detail.map(str::to_string)));
    }

    fn skip(&self, phase: Phase) {
        self.push(ProgressEvent::Skip(phase));
    }

    fn fail(&self, phase: Phase, context: &str, error: &(dyn std::error::Error + 'static)) {
        self.push(ProgressEvent::Fail(
            phase,
            context.to_string(),
            error.to_string(),
        ));
    }
}

pub fn track(id: &str) -> Track {
    Track {
        id: id.to_string(),
        uri: format!("spotify:track:{}", id),
    }
}

pub fn playlist(id: &str, owner_id: &str, name: &str) -> PlaylistRef {
    PlaylistRef {
        id: id.to_string(),
        owner_id: owner_id.to_string(),
        name: name.to_string(),
    }
}
