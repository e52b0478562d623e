//! Process-wide registry for the sandbox runtime handle and the readiness
//! cache. The underlying runtime allows exactly one boot per session; that
//! disguised global singleton is confined to this module and reached only
//! through `acquire`/`is_ready`/`teardown`.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, OnceLock};

use tokio::sync::Mutex;

use super::{BootError, ReadinessRecord, SandboxRuntime};

/// Boot operation supplied by the caller; produces the runtime handle.
pub type BootFuture = Pin<Box<dyn Future<Output = Result<Arc<dyn SandboxRuntime>, BootError>> + Send>>;

#[derive(Default)]
struct RegistryState {
    runtime: Option<Arc<dyn SandboxRuntime>>,
    readiness: Option<ReadinessRecord>,
}

struct RuntimeRegistry {
    state: Mutex<RegistryState>,
}

// Process-wide, not module-local, so the handle survives module
// re-execution in the host page.
static REGISTRY: OnceLock<RuntimeRegistry> = OnceLock::new();

fn registry() -> &'static RuntimeRegistry {
    REGISTRY.get_or_init(|| RuntimeRegistry {
        state: Mutex::new(RegistryState::default()),
    })
}

/// Return the cached runtime handle, booting it on first use.
///
/// Concurrent callers are deduplicated onto one underlying boot: the lock
/// holder boots, everyone queued behind it finds the cached handle. If the
/// boot fails because the runtime is already booted (a near-simultaneous
/// caller raced us through a different path, e.g. a remounting host page)
/// and a handle is cached by then, the cached handle is returned instead of
/// the error.
///
/// # Errors
///
/// Propagates the boot failure when no recoverable handle exists; fatal for
/// the session, recoverable only by a full reload.
pub async fn acquire<F>(boot: F) -> Result<Arc<dyn SandboxRuntime>, BootError>
where
    F: FnOnce() -> BootFuture,
{
    let mut state = registry().state.lock().await;
    if let Some(runtime) = &state.runtime {
        return Ok(Arc::clone(runtime));
    }
    match boot().await {
        Ok(runtime) => {
            tracing::info!("sandbox runtime booted");
            state.runtime = Some(Arc::clone(&runtime));
            Ok(runtime)
        }
        Err(BootError::AlreadyBooted) => match &state.runtime {
            Some(runtime) => Ok(Arc::clone(runtime)),
            None => Err(BootError::AlreadyBooted),
        },
        Err(err) => Err(err),
    }
}

/// Non-blocking cache check; `false` while a boot is still in flight.
#[must_use]
pub fn is_ready() -> bool {
    registry()
        .state
        .try_lock()
        .map(|state| state.runtime.is_some())
        .unwrap_or(false)
}

/// Drop the cached handle and the readiness record.
///
/// Call only on full page navigation. A transient component unmount must
/// not tear down: other consumers may still depend on the live handle.
pub async fn teardown() {
    let mut state = registry().state.lock().await;
    state.runtime = None;
    state.readiness = None;
    tracing::info!("sandbox runtime registry cleared");
}

/// The readiness record cached by the last successful start, if any.
pub async fn cached_readiness() -> Option<ReadinessRecord> {
    registry().state.lock().await.readiness.clone()
}

// The orchestrator is the sole writer of the readiness cache.
pub(crate) async fn cache_readiness(record: ReadinessRecord) {
    registry().state.lock().await.readiness = Some(record);
}
