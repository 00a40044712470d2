// packages/httptap/src/activation.rs
//! Process-wide default transport
//!
//! [`HttpClient::new`](crate::HttpClient::new) sends through whatever sits in
//! the default slot at call time. [`start`] puts an [`Interceptor`] there and
//! [`end`] puts the real transport back. Only one interceptor can own the slot;
//! tests that run in parallel should use [`start_scoped`], which serializes
//! activations and restores the slot on drop.
//!
//! Prefer handing an `Interceptor` to the client explicitly
//! ([`HttpClient::with_transport`](crate::HttpClient::with_transport)); the
//! global slot exists for code that cannot be given a transport.

use crate::interception::http_interceptor::Interceptor;
use crate::interception::transport::{HyperTransport, Transport};
use crate::utils::config::InterceptorConfig;
use once_cell::sync::Lazy;
use parking_lot::{const_mutex, Mutex, MutexGuard, RwLock};
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// The real transport, captured the first time the slot is touched
static REAL_TRANSPORT: Lazy<Arc<dyn Transport>> = Lazy::new(|| Arc::new(HyperTransport::new()));

static DEFAULT_TRANSPORT: Lazy<RwLock<Arc<dyn Transport>>> =
    Lazy::new(|| RwLock::new(real_transport()));

static ACTIVE: AtomicBool = AtomicBool::new(false);

static ACTIVATION: Mutex<()> = const_mutex(());

/// Transport currently installed as the process-wide default
pub fn default_transport() -> Arc<dyn Transport> {
    Arc::clone(&*DEFAULT_TRANSPORT.read())
}

/// The real network transport that [`end`] restores
pub fn real_transport() -> Arc<dyn Transport> {
    Arc::clone(&*REAL_TRANSPORT)
}

/// Whether an interceptor currently owns the default slot
pub fn is_active() -> bool {
    ACTIVE.load(Ordering::SeqCst)
}

/// Install a fresh interceptor as the default transport
///
/// Pair with [`end`]. Pass-through expectations reach the real transport.
pub fn start() -> Interceptor {
    start_with_config(InterceptorConfig::default())
}

/// [`start`] with explicit configuration
pub fn start_with_config(config: InterceptorConfig) -> Interceptor {
    let interceptor = Interceptor::with_config(config, real_transport());

    let transport: Arc<dyn Transport> = Arc::new(interceptor.clone());
    *DEFAULT_TRANSPORT.write() = transport;
    let was_active = ACTIVE.swap(true, Ordering::SeqCst);

    if was_active {
        info!("Replaced active interceptor with a new one");
    } else {
        info!("HTTP interception started");
    }

    interceptor
}

/// Restore the real transport as the default
///
/// Safe to call without a prior [`start`].
pub fn end() {
    *DEFAULT_TRANSPORT.write() = real_transport();

    if ACTIVE.swap(false, Ordering::SeqCst) {
        info!("HTTP interception ended");
    } else {
        debug!("end() called with no active interceptor");
    }
}

/// Exclusive activation: holds the process-wide activation lock until dropped
pub struct InterceptScope {
    interceptor: Interceptor,
    _lock: MutexGuard<'static, ()>,
}

/// Wait for any other scope to finish, then [`start`]
///
/// The lock is not reentrant: a task holding a scope must not open another.
/// The scope is `Send` and may be held across `.await` in spawned tasks.
pub fn start_scoped() -> InterceptScope {
    start_scoped_with_config(InterceptorConfig::default())
}

/// [`start_scoped`] with explicit configuration
pub fn start_scoped_with_config(config: InterceptorConfig) -> InterceptScope {
    let lock = ACTIVATION.lock();

    InterceptScope {
        interceptor: start_with_config(config),
        _lock: lock,
    }
}

impl InterceptScope {
    pub fn interceptor(&self) -> &Interceptor {
        &self.interceptor
    }
}

impl Deref for InterceptScope {
    type Target = Interceptor;

    fn deref(&self) -> &Interceptor {
        &self.interceptor
    }
}

impl Drop for InterceptScope {
    fn drop(&mut self) {
        end();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_restores_real_transport() {
        {
            let scope = start_scoped();
            assert!(is_active());
            assert!(scope.is_empty());
        }
        // Another scope may start right after ours; take the lock to check
        let _lock = ACTIVATION.lock();
        assert!(!is_active());
    }

    #[test]
    fn test_end_without_start_is_harmless() {
        let _lock = ACTIVATION.lock();
        end();
        end();
        assert!(!is_active());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_scope_moves_into_spawned_task() {
        let handle = tokio::spawn(async {
            let scope = start_scoped();
            tokio::task::yield_now().await;
            (is_active(), scope.len())
        });

        assert_eq!(handle.await.unwrap(), (true, 0));
    }

    #[test]
    fn test_scope_uses_config() {
        let scope = start_scoped_with_config(InterceptorConfig::strict());
        assert_eq!(
            scope.config().unmatched_policy,
            crate::utils::config::UnmatchedPolicy::Reject
        );
    }
}
