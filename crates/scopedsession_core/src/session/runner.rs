//! Scoped session execution.
//!
//! # Responsibility
//! - Acquire one session per call, lend it to caller work, release it.
//!
//! # Invariants
//! - Exactly one `close` per successful `create_session`, on every exit path:
//!   returned value, returned error, or panic unwinding.
//! - Release happens before the caller observes the outcome.
//! - Unless work panicked, a release error always reaches the caller;
//!   otherwise the work error is returned unchanged.
//! - A panic from work is rethrown with its original payload after release.
//! - Work only ever sees `&mut Session`, so the session cannot outlive the call.

use super::{Session, SessionFactory, SessionId};
use crate::logging::describe_panic_payload;
use log::debug;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

/// Runs caller logic against a freshly created session and always closes it.
#[derive(Debug, Clone)]
pub struct ScopedSessionRunner<F> {
    factory: F,
}

impl<F: SessionFactory> ScopedSessionRunner<F> {
    pub fn new(factory: F) -> Self {
        Self { factory }
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn into_factory(self) -> F {
        self.factory
    }

    /// Executes `work` with a new session and returns its result.
    ///
    /// # Contract
    /// - Acquisition failure is returned without invoking `work`.
    /// - The session is closed before this returns or before a panic from
    ///   `work` resumes unwinding.
    /// - If `work` fails, that exact error is returned after the close.
    /// - If `work` succeeds but close fails, the close error is returned.
    /// - If both fail, the close error is returned, as the later failure.
    pub fn run_with_result<R, E, W>(&self, work: W) -> Result<R, E>
    where
        W: FnOnce(&mut F::Session) -> Result<R, E>,
        E: From<F::Error>,
    {
        let session_id = SessionId::new();
        let mut session = acquire(&self.factory, session_id)?;
        let acquired_at = Instant::now();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| work(&mut session)));
        let released = release(session, session_id, acquired_at);

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(payload) => {
                debug!(
                    "event=session_scope module=session status=error session_id={} cause=panic payload={}",
                    session_id,
                    describe_panic_payload(payload.as_ref())
                );
                panic::resume_unwind(payload)
            }
        };

        match (outcome, released) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(release_err)) => Err(release_err.into()),
            (Err(work_err), Ok(())) => Err(work_err),
            (Err(_), Err(release_err)) => {
                debug!(
                    "event=session_scope module=session status=error session_id={} cause=release_failed work_error=superseded",
                    session_id
                );
                Err(release_err.into())
            }
        }
    }

    /// Executes `work` with a new session when no result value is needed.
    ///
    /// Same guarantees as [`Self::run_with_result`].
    pub fn run<E, W>(&self, work: W) -> Result<(), E>
    where
        W: FnOnce(&mut F::Session) -> Result<(), E>,
        E: From<F::Error>,
    {
        self.run_with_result(|session| {
            work(session)?;
            Ok(())
        })
    }
}

fn acquire<F: SessionFactory>(
    factory: &F,
    session_id: SessionId,
) -> Result<F::Session, F::Error> {
    let started_at = Instant::now();
    match factory.create_session() {
        Ok(session) => {
            debug!(
                "event=session_acquire module=session status=ok session_id={} duration_ms={}",
                session_id,
                started_at.elapsed().as_millis()
            );
            Ok(session)
        }
        Err(err) => {
            debug!(
                "event=session_acquire module=session status=error session_id={} duration_ms={} error={}",
                session_id,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn release<S: Session>(
    session: S,
    session_id: SessionId,
    acquired_at: Instant,
) -> Result<(), S::Error> {
    match session.close() {
        Ok(()) => {
            debug!(
                "event=session_release module=session status=ok session_id={} held_ms={}",
                session_id,
                acquired_at.elapsed().as_millis()
            );
            Ok(())
        }
        Err(err) => {
            debug!(
                "event=session_release module=session status=error session_id={} held_ms={} error={}",
                session_id,
                acquired_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ScopedSessionRunner;
    use crate::session::{Session, SessionFactory};
    use std::cell::Cell;

    struct CountingSession<'a> {
        closed: &'a Cell<u32>,
    }

    impl Session for CountingSession<'_> {
        type Error = String;

        fn close(self) -> Result<(), String> {
            self.closed.set(self.closed.get() + 1);
            Ok(())
        }
    }

    struct CountingFactory<'a> {
        created: &'a Cell<u32>,
        closed: &'a Cell<u32>,
        refuse: bool,
    }

    impl<'a> SessionFactory for CountingFactory<'a> {
        type Session = CountingSession<'a>;
        type Error = String;

        fn create_session(&self) -> Result<Self::Session, String> {
            if self.refuse {
                return Err("factory unavailable".to_string());
            }
            self.created.set(self.created.get() + 1);
            Ok(CountingSession {
                closed: self.closed,
            })
        }
    }

    #[test]
    fn acquisition_error_skips_work() {
        let created = Cell::new(0);
        let closed = Cell::new(0);
        let runner = ScopedSessionRunner::new(CountingFactory {
            created: &created,
            closed: &closed,
            refuse: true,
        });
        let mut invoked = false;

        let err = runner
            .run(|_session| -> Result<(), String> {
                invoked = true;
                Ok(())
            })
            .unwrap_err();

        assert_eq!(err, "factory unavailable");
        assert!(!invoked);
        assert_eq!(created.get(), 0);
        assert_eq!(closed.get(), 0);
    }

    #[test]
    fn run_closes_session_once_per_call() {
        let created = Cell::new(0);
        let closed = Cell::new(0);
        let runner = ScopedSessionRunner::new(CountingFactory {
            created: &created,
            closed: &closed,
            refuse: false,
        });

        runner.run(|_session| Ok::<(), String>(())).unwrap();
        runner.run(|_session| Ok::<(), String>(())).unwrap();

        assert_eq!(created.get(), 2);
        assert_eq!(closed.get(), 2);
    }
}
