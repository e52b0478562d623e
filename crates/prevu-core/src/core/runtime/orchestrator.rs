//! Drives install-then-start against an acquired runtime: streaming output,
//! hard deadlines with force-kill, and the process-wide readiness cache
//! that keeps a remounting host page from double-spawning the dev server.

use std::time::Duration;

use serde_json::json;

use crate::core::config::PreviewConfig;
use crate::core::pipeline::PreparedPreview;
use crate::core::runtime::registry;
use crate::core::runtime::{ReadinessRecord, SandboxRuntime};
use crate::core::tooling::diagnostics::codes;
use crate::core::tooling::outcome::{preview_error, PreviewError};

/// Lifecycle of one preview launch, reported through `on_phase`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum PreviewPhase {
    Idle,
    Installing,
    Installed,
    Starting,
    Ready,
    InstallFailed,
    StartFailed,
    TimedOut,
}

/// Exit code reported when the installer is killed on timeout.
pub const INSTALL_TIMEOUT_EXIT_CODE: i32 = -1;

const INSTALL_PROGRAM: &str = "npm";
// Post-install hooks stay disabled so packages never try to fetch native
// binaries the sandbox cannot run; peer resolution is relaxed so generator
// version skew still installs.
const INSTALL_ARGS: &[&str] = &["install", "--ignore-scripts", "--legacy-peer-deps"];
const START_PROGRAM: &str = "npm";
const START_ARGS: &[&str] = &["run", "dev"];

/// Run the dependency installer, streaming every output chunk to
/// `on_output`, and return its exit code.
///
/// Natural exit races the timeout: a timed-out install is force-killed and
/// resolves with [`INSTALL_TIMEOUT_EXIT_CODE`] rather than hanging. A
/// retried install is idempotent over the partial dependency tree; nothing
/// is rolled back.
///
/// # Errors
///
/// Returns an error only when the installer cannot be spawned.
pub async fn install_dependencies(
    runtime: &dyn SandboxRuntime,
    on_output: &mut (dyn FnMut(&str) + Send),
    timeout: Duration,
) -> Result<i32, PreviewError> {
    let mut process = runtime.spawn(INSTALL_PROGRAM, INSTALL_ARGS).await?;
    let deadline = tokio::time::Instant::now() + timeout;
    let timed_out = loop {
        tokio::select! {
            chunk = process.next_chunk() => match chunk {
                Some(chunk) => on_output(&chunk),
                None => break false,
            },
            () = tokio::time::sleep_until(deadline) => break true,
        }
    };
    if timed_out {
        tracing::warn!(timeout_ms = timeout.as_millis() as u64, "installer timed out; killing");
        process.kill().await;
        return Ok(INSTALL_TIMEOUT_EXIT_CODE);
    }
    let code = process.wait().await;
    tracing::debug!(code, "installer exited");
    Ok(code)
}

/// Start the dev server and wait for its readiness event.
///
/// A cached [`ReadinessRecord`] short-circuits without spawning, so a
/// remount never puts a second server on the same port. Otherwise the
/// server-ready event races process exit and the timeout; on ready the
/// record is cached process-wide before `on_ready` fires.
///
/// # Errors
///
/// Fails when the server exits before reporting ready, when the runtime
/// goes away, or when the timeout expires (the process is killed first).
pub async fn start_dev_server(
    runtime: &dyn SandboxRuntime,
    on_output: &mut (dyn FnMut(&str) + Send),
    on_ready: &mut (dyn FnMut(&ReadinessRecord) + Send),
    timeout: Duration,
) -> Result<ReadinessRecord, PreviewError> {
    if let Some(record) = registry::cached_readiness().await {
        tracing::debug!(port = record.port, "dev server already listening; skipping spawn");
        on_ready(&record);
        return Ok(record);
    }
    let mut process = runtime.spawn(START_PROGRAM, START_ARGS).await?;
    let ready = runtime.server_ready();
    tokio::pin!(ready);
    let deadline = tokio::time::sleep(timeout);
    tokio::pin!(deadline);

    enum StartOutcome {
        Exited,
        Listening(Option<ReadinessRecord>),
        TimedOut,
    }

    let outcome = loop {
        tokio::select! {
            chunk = process.next_chunk() => match chunk {
                Some(chunk) => on_output(&chunk),
                None => break StartOutcome::Exited,
            },
            listening = &mut ready => break StartOutcome::Listening(listening),
            () = &mut deadline => break StartOutcome::TimedOut,
        }
    };
    match outcome {
        StartOutcome::Exited => {
            let code = process.wait().await;
            Err(preview_error(
                codes::START,
                "dev server exited before reporting ready",
                json!({ "code": code }),
            ))
        }
        StartOutcome::Listening(Some(record)) => {
            tracing::info!(port = record.port, url = %record.url, "dev server listening");
            registry::cache_readiness(record.clone()).await;
            on_ready(&record);
            Ok(record)
        }
        StartOutcome::Listening(None) => {
            process.kill().await;
            Err(preview_error(
                codes::START,
                "sandbox runtime went away while waiting for the dev server",
                json!({}),
            ))
        }
        StartOutcome::TimedOut => {
            process.kill().await;
            Err(preview_error(
                codes::START_TIMEOUT,
                "dev server did not report ready in time; inspect the streamed output",
                json!({ "timeout_ms": timeout.as_millis() as u64 }),
            ))
        }
    }
}

/// Drive a full launch: readiness short-circuit, mount, install, start.
/// Every state transition is reported through `on_phase`; `on_ready` fires
/// exactly once on success.
///
/// Concurrent fresh launches are a caller-serialization responsibility;
/// only the cached-readiness path is guarded here.
///
/// # Errors
///
/// Surfaces mount rejections, install failures (non-zero or timed-out exit
/// code), and start failures or timeouts, with the streamed output as the
/// caller's context.
pub async fn launch_preview(
    runtime: &dyn SandboxRuntime,
    prepared: &PreparedPreview,
    config: &PreviewConfig,
    on_output: &mut (dyn FnMut(&str) + Send),
    on_phase: &mut (dyn FnMut(PreviewPhase) + Send),
    on_ready: &mut (dyn FnMut(&ReadinessRecord) + Send),
) -> Result<ReadinessRecord, PreviewError> {
    note_phase(on_phase, PreviewPhase::Idle);
    if let Some(record) = registry::cached_readiness().await {
        // A previous launch already has a server listening on this port.
        note_phase(on_phase, PreviewPhase::Ready);
        on_ready(&record);
        return Ok(record);
    }

    runtime
        .mount(&prepared.tree)
        .await
        .map_err(|err| preview_error(codes::MOUNT, err.message(), err.details().clone()))?;

    note_phase(on_phase, PreviewPhase::Installing);
    let code = match install_dependencies(runtime, on_output, config.install_timeout).await {
        Ok(code) => code,
        Err(err) => {
            note_phase(on_phase, PreviewPhase::InstallFailed);
            return Err(err);
        }
    };
    if code != 0 {
        note_phase(on_phase, PreviewPhase::InstallFailed);
        return Err(preview_error(
            codes::INSTALL,
            "dependency install failed; inspect the streamed output",
            json!({ "code": code, "timed_out": code == INSTALL_TIMEOUT_EXIT_CODE }),
        ));
    }
    note_phase(on_phase, PreviewPhase::Installed);

    note_phase(on_phase, PreviewPhase::Starting);
    match start_dev_server(runtime, on_output, on_ready, config.start_timeout).await {
        Ok(record) => {
            note_phase(on_phase, PreviewPhase::Ready);
            Ok(record)
        }
        Err(err) => {
            note_phase(
                on_phase,
                if err.code() == codes::START_TIMEOUT {
                    PreviewPhase::TimedOut
                } else {
                    PreviewPhase::StartFailed
                },
            );
            Err(err)
        }
    }
}

fn note_phase(on_phase: &mut (dyn FnMut(PreviewPhase) + Send), phase: PreviewPhase) {
    tracing::info!(phase = %phase, "preview phase");
    on_phase(phase);
}
