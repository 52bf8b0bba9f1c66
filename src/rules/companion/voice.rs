use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::DialogId;

/// Called once the voice is done with a request.
pub type Finished = Box<dyn FnOnce() + Send>;

/// What the companion reactions can make the agent do.
///
/// Every method taking a [`Finished`] must call it exactly once, possibly
/// later and from another thread.
pub trait Voice: Send + Sync {
    fn speak(&self, lines: Vec<DialogId>, finished: Finished);

    fn repeat_last_dialog(&self, finished: Finished);

    fn repeat_last_question(&self, finished: Finished);

    /// The line spoken before the most recent one, if any.
    fn previous_to_last_line(&self) -> Option<DialogId>;

    fn can_change_rate(&self) -> bool {
        false
    }

    fn change_rate(&self, faster: bool, finished: Finished);

    /// Cut the current playback short.
    fn stop(&self);

    fn dim_light(&self) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceEvent {
    Said(Vec<DialogId>),
    RepeatedLastDialog,
    RepeatedLastQuestion,
    RateChanged { faster: bool },
    Stopped,
    DimmedLight,
}

/// A [`Voice`] that records requests and finishes them immediately.
///
/// Used by the CLI to show what a handler would do, and by tests.
#[derive(Debug, Default)]
pub struct Transcript {
    events: Mutex<Vec<VoiceEvent>>,
    previous_to_last: Option<DialogId>,
    rate_control: bool,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_previous_to_last(mut self, line: Option<DialogId>) -> Self {
        self.previous_to_last = line;
        self
    }

    pub fn with_rate_control(mut self, enabled: bool) -> Self {
        self.rate_control = enabled;
        self
    }

    pub fn events(&self) -> Vec<VoiceEvent> {
        self.lock().clone()
    }

    /// Every line spoken so far, flattened.
    pub fn lines(&self) -> Vec<DialogId> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                VoiceEvent::Said(lines) => Some(lines.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    fn record(&self, event: VoiceEvent) {
        tracing::debug!(?event, "voice");
        self.lock().push(event);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<VoiceEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Voice for Transcript {
    fn speak(&self, lines: Vec<DialogId>, finished: Finished) {
        self.record(VoiceEvent::Said(lines));
        finished();
    }

    fn repeat_last_dialog(&self, finished: Finished) {
        self.record(VoiceEvent::RepeatedLastDialog);
        finished();
    }

    fn repeat_last_question(&self, finished: Finished) {
        self.record(VoiceEvent::RepeatedLastQuestion);
        finished();
    }

    fn previous_to_last_line(&self) -> Option<DialogId> {
        self.previous_to_last.clone()
    }

    fn can_change_rate(&self) -> bool {
        self.rate_control
    }

    fn change_rate(&self, faster: bool, finished: Finished) {
        self.record(VoiceEvent::RateChanged { faster });
        finished();
    }

    fn stop(&self) {
        self.record(VoiceEvent::Stopped);
    }

    fn dim_light(&self) {
        self.record(VoiceEvent::DimmedLight);
    }
}
