//! Transaction sessions.
//!
//! A [`Session`] is a cheap, cloneable handle to one backend session with an
//! open transaction. Repository calls enlist in the transaction by receiving
//! a clone. The paired [`TxCallback`] is the only way to finish the session.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, MutexGuard};

use crate::db::memory::MemoryTx;
use crate::error::{AppError, AppResult};

/// Commit, abort and end operations of a backend session.
#[async_trait]
pub trait TxControl: Send {
    async fn commit_transaction(&mut self) -> AppResult<()>;

    async fn abort_transaction(&mut self) -> AppResult<()>;

    /// Release the session. Must not fail.
    async fn end_session(&mut self);
}

/// Finish a transaction according to the outcome of its body.
///
/// A successful body is committed; a failed body, or a failed commit, is
/// aborted. When the abort fails as well, both errors are returned in an
/// [`AppError::TransactionAborted`]. The session is ended in every case.
pub async fn finalize<C>(control: &mut C, outcome: AppResult<()>) -> AppResult<()>
where
    C: TxControl + ?Sized,
{
    let committed = match outcome {
        Ok(()) => control.commit_transaction().await,
        Err(err) => Err(err),
    };

    let result = match committed {
        Ok(()) => Ok(()),
        Err(err) => match control.abort_transaction().await {
            Ok(()) => Err(err),
            Err(abort_error) => Err(AppError::TransactionAborted {
                source: Box::new(err),
                abort_error: Box::new(abort_error),
            }),
        },
    };

    control.end_session().await;
    result
}

/// Backend-specific session state.
pub(crate) enum SessionKind {
    Mongo(mongodb::ClientSession),
    Memory(MemoryTx),
    Ended,
}

impl SessionKind {
    fn label(&self) -> &'static str {
        match self {
            SessionKind::Mongo(_) => "mongo",
            SessionKind::Memory(_) => "memory",
            SessionKind::Ended => "ended",
        }
    }

    /// The driver session, or an error if this session belongs elsewhere.
    pub(crate) fn as_mongo(&mut self) -> AppResult<&mut mongodb::ClientSession> {
        match self {
            SessionKind::Mongo(session) => Ok(session),
            other => Err(foreign_session("mongo", other.label())),
        }
    }

    pub(crate) fn as_memory(&mut self) -> AppResult<&mut MemoryTx> {
        match self {
            SessionKind::Memory(tx) => Ok(tx),
            other => Err(foreign_session("memory", other.label())),
        }
    }
}

fn foreign_session(expected: &str, actual: &str) -> AppError {
    AppError::Internal {
        source: anyhow::anyhow!("{expected} repository called with a {actual} session"),
    }
}

#[async_trait]
impl TxControl for SessionKind {
    async fn commit_transaction(&mut self) -> AppResult<()> {
        match self {
            SessionKind::Mongo(session) => session
                .commit_transaction()
                .await
                .map_err(|e| AppError::database("commit transaction", e)),
            SessionKind::Memory(tx) => tx.commit(),
            SessionKind::Ended => Err(foreign_session("active", "ended")),
        }
    }

    async fn abort_transaction(&mut self) -> AppResult<()> {
        match self {
            SessionKind::Mongo(session) => session
                .abort_transaction()
                .await
                .map_err(|e| AppError::database("abort transaction", e)),
            SessionKind::Memory(tx) => {
                tx.abort();
                Ok(())
            }
            SessionKind::Ended => Err(foreign_session("active", "ended")),
        }
    }

    async fn end_session(&mut self) {
        // Dropping the driver session returns it to the pool.
        *self = SessionKind::Ended;
    }
}

/// Handle to a backend session with an open transaction.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Mutex<SessionKind>>,
    backend: &'static str,
}

impl Session {
    pub(crate) fn new(kind: SessionKind) -> Self {
        let backend = kind.label();
        Self {
            inner: Arc::new(Mutex::new(kind)),
            backend,
        }
    }

    /// Backend that issued this session.
    pub fn backend(&self) -> &'static str {
        self.backend
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, SessionKind> {
        self.inner.lock().await
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}

/// Finalizer of one [`Session`].
///
/// Consumed by [`TxCallback::call`], so it cannot run twice. Dropping it
/// uncalled logs a warning; the backend then discards the transaction when
/// the last session handle goes away.
pub struct TxCallback {
    session: Option<Session>,
}

impl TxCallback {
    pub(crate) fn new(session: Session) -> Self {
        Self {
            session: Some(session),
        }
    }

    /// Commit on `Ok`, abort on `Err`, then end the session.
    pub async fn call(mut self, outcome: AppResult<()>) -> AppResult<()> {
        let Some(session) = self.session.take() else {
            return outcome;
        };
        let mut state = session.lock().await;
        finalize(&mut *state, outcome).await
    }
}

impl Drop for TxCallback {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::warn!(
                backend = session.backend(),
                "transaction callback dropped without being called"
            );
        }
    }
}

impl fmt::Debug for TxCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TxCallback")
            .field("pending", &self.session.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct StubTx {
        fail_commit: bool,
        fail_abort: bool,
        commits: usize,
        aborts: usize,
        ends: usize,
    }

    #[async_trait]
    impl TxControl for StubTx {
        async fn commit_transaction(&mut self) -> AppResult<()> {
            self.commits += 1;
            if self.fail_commit {
                return Err(AppError::database("commit", anyhow::anyhow!("write conflict")));
            }
            Ok(())
        }

        async fn abort_transaction(&mut self) -> AppResult<()> {
            self.aborts += 1;
            if self.fail_abort {
                return Err(AppError::database("abort", anyhow::anyhow!("connection reset")));
            }
            Ok(())
        }

        async fn end_session(&mut self) {
            self.ends += 1;
        }
    }

    fn body_error() -> AppError {
        AppError::Validation {
            field: "bio".to_string(),
            reason: "too short".to_string(),
        }
    }

    #[tokio::test]
    async fn test_success_commits_and_ends() {
        let mut tx = StubTx::default();
        assert!(finalize(&mut tx, Ok(())).await.is_ok());
        assert_eq!((tx.commits, tx.aborts, tx.ends), (1, 0, 1));
    }

    #[tokio::test]
    async fn test_body_error_aborts_without_commit() {
        let mut tx = StubTx::default();
        let err = finalize(&mut tx, Err(body_error())).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!((tx.commits, tx.aborts, tx.ends), (0, 1, 1));
    }

    #[tokio::test]
    async fn test_failed_commit_is_aborted() {
        let mut tx = StubTx {
            fail_commit: true,
            ..Default::default()
        };
        let err = finalize(&mut tx, Ok(())).await.unwrap_err();
        assert!(err.to_string().contains("write conflict"));
        assert_eq!((tx.commits, tx.aborts, tx.ends), (1, 1, 1));
    }

    #[tokio::test]
    async fn test_failed_abort_composes_errors_and_still_ends() {
        let mut tx = StubTx {
            fail_abort: true,
            ..Default::default()
        };
        let err = finalize(&mut tx, Err(body_error())).await.unwrap_err();

        let message = err.to_string();
        assert!(matches!(err, AppError::TransactionAborted { .. }));
        assert!(message.contains("too short"));
        assert!(message.contains("connection reset"));
        assert_eq!((tx.commits, tx.aborts, tx.ends), (0, 1, 1));
    }

    #[tokio::test]
    async fn test_ended_session_cannot_commit() {
        let mut kind = SessionKind::Ended;
        assert!(kind.commit_transaction().await.is_err());
        assert!(kind.as_memory().is_err());
    }
}
