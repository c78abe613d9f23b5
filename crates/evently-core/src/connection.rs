//! Connection lifecycle management.
//!
//! `ConnectionManager` hands out one shared handle to the backing store per
//! process. Concurrent first callers share a single in-flight attempt; a
//! failed attempt is discarded so that the next caller starts a fresh one.
//! A handle that dies after it was established is the client's problem, not
//! this module's: only the acquisition phase is managed here.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, info, warn};

use crate::error::DomainError;

/// Opens a connection to a backing store.
#[async_trait]
pub trait Connector<T>: Send + Sync {
    /// Connects to the store at `uri`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Connection` if the store cannot be reached.
    async fn connect(&self, uri: &str) -> Result<T, DomainError>;
}

type Attempt<T> = Shared<BoxFuture<'static, Result<T, DomainError>>>;

enum Phase<T> {
    Uninitialized,
    Connecting { generation: u64, attempt: Attempt<T> },
    Connected(T),
}

impl<T> Phase<T> {
    fn name(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Connecting { .. } => "connecting",
            Self::Connected(_) => "connected",
        }
    }
}

struct State<T> {
    phase: Phase<T>,
    generation: u64,
}

/// Single-flight owner of the process-wide store handle.
pub struct ConnectionManager<T> {
    uri: Option<String>,
    setting: String,
    connector: Arc<dyn Connector<T>>,
    state: Mutex<State<T>>,
}

impl<T> ConnectionManager<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a manager for the store at `uri`. A `None` URI makes every
    /// `acquire` fail with `DomainError::Configuration`.
    pub fn new(uri: Option<String>, connector: Arc<dyn Connector<T>>) -> Self {
        Self {
            uri,
            setting: "store URI".to_owned(),
            connector,
            state: Mutex::new(State {
                phase: Phase::Uninitialized,
                generation: 0,
            }),
        }
    }

    /// Creates a manager whose URI is read once from the environment variable
    /// `var`. Blank values count as absent.
    pub fn from_env(var: &str, connector: Arc<dyn Connector<T>>) -> Self {
        let uri = std::env::var(var).ok().filter(|v| !v.trim().is_empty());
        let mut manager = Self::new(uri, connector);
        var.clone_into(&mut manager.setting);
        manager
    }

    /// Returns the shared store handle, connecting on first use.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Configuration` if no URI was configured, or the
    /// connector's error (normally `DomainError::Connection`) if the attempt
    /// this call joined failed. Every caller that joined a failed attempt sees
    /// the same error.
    pub async fn acquire(&self) -> Result<T, DomainError> {
        let (generation, attempt) = {
            let mut state = self.lock_state();
            match &state.phase {
                Phase::Connected(handle) => return Ok(handle.clone()),
                Phase::Connecting {
                    generation,
                    attempt,
                } => {
                    debug!(generation, "joining in-flight connection attempt");
                    (*generation, attempt.clone())
                }
                Phase::Uninitialized => {
                    let uri = self.uri.clone().ok_or_else(|| {
                        DomainError::Configuration(format!("{} is not set", self.setting))
                    })?;
                    state.generation += 1;
                    let generation = state.generation;
                    info!(generation, "opening document store connection");

                    let connector = Arc::clone(&self.connector);
                    let attempt = async move { connector.connect(&uri).await }
                        .boxed()
                        .shared();
                    state.phase = Phase::Connecting {
                        generation,
                        attempt: attempt.clone(),
                    };
                    (generation, attempt)
                }
            }
        };

        let outcome = attempt.await;

        let mut state = self.lock_state();
        let current = matches!(
            &state.phase,
            Phase::Connecting { generation: g, .. } if *g == generation
        );
        if current {
            match &outcome {
                Ok(handle) => {
                    info!(generation, "document store connection established");
                    state.phase = Phase::Connected(handle.clone());
                }
                Err(err) => {
                    warn!(generation, error = %err, "document store connection failed");
                    state.phase = Phase::Uninitialized;
                }
            }
        }
        outcome
    }

    /// Returns `true` once a handle has been established and cached.
    pub fn is_connected(&self) -> bool {
        matches!(self.lock_state().phase, Phase::Connected(_))
    }

    fn lock_state(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> fmt::Debug for ConnectionManager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = self
            .state
            .lock()
            .map_or("poisoned", |state| state.phase.name());
        f.debug_struct("ConnectionManager")
            .field("setting", &self.setting)
            .field("configured", &self.uri.is_some())
            .field("phase", &phase)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use futures::future::join_all;

    use super::*;

    /// Connector that fails its first `failures` attempts, then hands out the
    /// attempt number as the handle.
    struct ScriptedConnector {
        attempts: AtomicU32,
        failures: u32,
    }

    impl ScriptedConnector {
        fn new(failures: u32) -> Self {
            Self {
                attempts: AtomicU32::new(0),
                failures,
            }
        }

        fn attempts(&self) -> u32 {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Connector<u32> for ScriptedConnector {
        async fn connect(&self, _uri: &str) -> Result<u32, DomainError> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::time::sleep(Duration::from_millis(20)).await;
            if attempt <= self.failures {
                return Err(DomainError::Connection(format!("attempt {attempt} refused")));
            }
            Ok(attempt)
        }
    }

    fn manager(connector: &Arc<ScriptedConnector>) -> ConnectionManager<u32> {
        let dyn_connector: Arc<dyn Connector<u32>> = connector.clone();
        ConnectionManager::new(Some("postgres://localhost/evently".to_owned()), dyn_connector)
    }

    #[tokio::test]
    async fn test_acquire_without_uri_fails_with_configuration_error() {
        // Arrange
        let connector = Arc::new(ScriptedConnector::new(0));
        let dyn_connector: Arc<dyn Connector<u32>> = connector.clone();
        let manager = ConnectionManager::new(None, dyn_connector);

        // Act
        let result = manager.acquire().await;

        // Assert
        match result {
            Err(DomainError::Configuration(msg)) => assert!(msg.contains("store URI")),
            other => panic!("expected Configuration, got {other:?}"),
        }
        assert_eq!(connector.attempts(), 0);
        assert!(!manager.is_connected());
    }

    #[tokio::test]
    async fn test_from_env_names_unset_variable() {
        let connector = Arc::new(ScriptedConnector::new(0));
        let dyn_connector: Arc<dyn Connector<u32>> = connector.clone();
        let manager = ConnectionManager::from_env("EVENTLY_UNSET_STORE_URI", dyn_connector);

        let result = manager.acquire().await;

        assert_eq!(
            result,
            Err(DomainError::Configuration(
                "EVENTLY_UNSET_STORE_URI is not set".into()
            ))
        );
        assert_eq!(connector.attempts(), 0);
    }

    #[tokio::test]
    async fn test_connected_handle_is_reused() {
        // Arrange
        let connector = Arc::new(ScriptedConnector::new(0));
        let manager = manager(&connector);

        // Act
        let first = manager.acquire().await.unwrap();
        let second = manager.acquire().await.unwrap();

        // Assert
        assert_eq!(first, 1);
        assert_eq!(second, 1);
        assert_eq!(connector.attempts(), 1);
        assert!(manager.is_connected());
    }

    #[tokio::test]
    async fn test_concurrent_first_use_shares_one_attempt() {
        // Arrange
        let connector = Arc::new(ScriptedConnector::new(0));
        let manager = manager(&connector);

        // Act
        let results = join_all((0..16).map(|_| manager.acquire())).await;

        // Assert
        assert_eq!(connector.attempts(), 1);
        for result in results {
            assert_eq!(result.unwrap(), 1);
        }
    }

    #[tokio::test]
    async fn test_concurrent_failure_is_shared_and_next_call_retries() {
        // Arrange
        let connector = Arc::new(ScriptedConnector::new(1));
        let manager = manager(&connector);

        // Act
        let results = join_all((0..8).map(|_| manager.acquire())).await;

        // Assert: every waiter saw the single failed attempt.
        assert_eq!(connector.attempts(), 1);
        for result in results {
            assert_eq!(
                result.unwrap_err(),
                DomainError::Connection("attempt 1 refused".to_owned())
            );
        }
        assert!(!manager.is_connected());

        // Act: the failed attempt was cleared, so this starts a fresh one.
        let retried = manager.acquire().await.unwrap();

        // Assert
        assert_eq!(retried, 2);
        assert_eq!(connector.attempts(), 2);
        assert!(manager.is_connected());
    }

    #[test]
    fn test_debug_reports_phase_without_uri() {
        let connector = Arc::new(ScriptedConnector::new(0));
        let manager = manager(&connector);

        let rendered = format!("{manager:?}");

        assert!(rendered.contains("uninitialized"));
        assert!(!rendered.contains("postgres://"));
    }
}
