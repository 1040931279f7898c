//! Session capability contracts and the scoped runner built on them.
//!
//! # Responsibility
//! - Describe the two capabilities a persistence backend must provide:
//!   "create a session" and "close a session".
//! - Keep the runner independent from any concrete backend.
//!
//! # Invariants
//! - A session is closed at most once; `Session::close` consumes it.
//! - Factory and session share one error type, so acquisition and release
//!   failures land in the same category.

use std::fmt::{Display, Formatter};
use std::sync::Arc;
use uuid::Uuid;

pub mod runner;

pub use runner::ScopedSessionRunner;

/// One unit-of-work handle produced by a [`SessionFactory`].
pub trait Session {
    type Error: Display;

    /// Releases the underlying resource.
    fn close(self) -> Result<(), Self::Error>;
}

/// Producer of fresh [`Session`] values.
pub trait SessionFactory {
    type Session: Session<Error = Self::Error>;
    type Error: Display;

    /// Creates a new session owned exclusively by the caller.
    fn create_session(&self) -> Result<Self::Session, Self::Error>;
}

impl<F: SessionFactory + ?Sized> SessionFactory for &F {
    type Session = F::Session;
    type Error = F::Error;

    fn create_session(&self) -> Result<Self::Session, Self::Error> {
        (**self).create_session()
    }
}

impl<F: SessionFactory + ?Sized> SessionFactory for Arc<F> {
    type Session = F::Session;
    type Error = F::Error;

    fn create_session(&self) -> Result<Self::Session, Self::Error> {
        (**self).create_session()
    }
}

/// Correlation id attached to log events of one scoped invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
