//! One-shot resume tokens.
//!
//! A matched handler receives a [`Resume`]. Whatever it does (speak, wait for
//! audio, ask a follow-up question), it must hand control back to the
//! conversation driver exactly once by calling [`Resume::resume`].
//!
//! - Calling it twice does not compile: `resume` consumes the token.
//! - Never calling it stalls the conversation. Dropping an unused token logs a
//!   warning and, in debug builds, fails a `debug_assert!` so tests catch it.
//!
//! ```text
//! Inquiry::respond(resume) ──▶ handler ──▶ ... later ... ──▶ resume.resume(directive)
//!                                                             │
//!                           Resumption (future) ◀─────────────┘  (Resume::channel)
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;

use crate::ResumeDirective;
use crate::error::ResumeError;

type Sink = Box<dyn FnOnce(ResumeDirective) + Send>;

pub struct Resume {
    sink: Option<Sink>,
}

impl Resume {
    /// Wrap a callback that receives the directive.
    pub fn new<F>(on_resume: F) -> Self
    where
        F: FnOnce(ResumeDirective) + Send + 'static,
    {
        Resume { sink: Some(Box::new(on_resume)) }
    }

    /// Create a token together with a future that completes when the token is
    /// used.
    pub fn channel() -> (Resume, Resumption) {
        let (tx, rx) = oneshot::channel();
        let resume = Resume::new(move |directive| {
            // The driver may have stopped waiting; that is not the handler's problem.
            let _ = tx.send(directive);
        });
        (resume, Resumption { rx })
    }

    pub fn resume(mut self, directive: ResumeDirective) {
        if let Some(sink) = self.sink.take() {
            tracing::debug!(?directive, "resuming conversation");
            sink(directive);
        }
    }

    pub fn continue_existing_train(self) {
        self.resume(ResumeDirective::ContinueExistingTrain)
    }

    pub fn repeat_current_dialog(self) {
        self.resume(ResumeDirective::RepeatCurrentDialog)
    }
}

impl fmt::Debug for Resume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resume").field("pending", &self.sink.is_some()).finish()
    }
}

impl Drop for Resume {
    fn drop(&mut self) {
        if self.sink.is_some() && !std::thread::panicking() {
            tracing::warn!("resume token dropped without resuming; the conversation will stall");
            debug_assert!(false, "resume token dropped without resuming");
        }
    }
}

/// Completes with the directive passed to the paired [`Resume`], or with
/// [`ResumeError::Abandoned`] if the token was dropped unused.
#[derive(Debug)]
pub struct Resumption {
    rx: oneshot::Receiver<ResumeDirective>,
}

impl Future for Resumption {
    type Output = Result<ResumeDirective, ResumeError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|res| res.map_err(|_| ResumeError::Abandoned))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::{Arc, Mutex};

    #[test]
    fn callback_receives_the_directive() {
        let seen = Arc::new(Mutex::new(None));
        let slot = seen.clone();
        let resume = Resume::new(move |directive| *slot.lock().unwrap() = Some(directive));
        resume.repeat_current_dialog();
        assert_eq!(*seen.lock().unwrap(), Some(ResumeDirective::RepeatCurrentDialog));
    }

    #[test]
    fn channel_resolves_after_resume_on_another_thread() {
        let (resume, resumption) = Resume::channel();
        std::thread::spawn(move || resume.continue_existing_train()).join().unwrap();
        assert_eq!(block_on(resumption), Ok(ResumeDirective::ContinueExistingTrain));
    }

    #[test]
    fn dropping_an_unused_token_is_caught() {
        let (resume, resumption) = Resume::channel();
        let dropped = catch_unwind(AssertUnwindSafe(move || drop(resume)));
        assert_eq!(dropped.is_err(), cfg!(debug_assertions));
        assert_eq!(block_on(resumption), Err(ResumeError::Abandoned));
    }
}
