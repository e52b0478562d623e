//! The sandbox runtime seam. The real runtime lives in the host page; this
//! crate only ever sees it through these traits, which keeps the
//! one-boot-per-session constraint testable.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use prevu_domain::FileSystemTree;

use crate::core::tooling::outcome::PreviewError;

pub mod orchestrator;
pub mod registry;

/// Where the dev server can be reached once it reports it is listening.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessRecord {
    pub port: u16,
    pub url: String,
}

/// The sandbox runtime refused to come up. Fatal for the session unless a
/// cached handle can stand in for the failed boot.
#[derive(Debug, thiserror::Error)]
pub enum BootError {
    /// The underlying runtime allows exactly one boot per session and one
    /// already happened outside this registry.
    #[error("sandbox runtime is already booted in this session")]
    AlreadyBooted,
    #[error("sandbox runtime boot failed")]
    Failed(#[from] anyhow::Error),
}

impl BootError {
    /// Stable error code, for uniform reporting next to [`PreviewError`].
    #[must_use]
    pub fn code(&self) -> &'static str {
        crate::core::tooling::diagnostics::codes::BOOT
    }
}

/// A process spawned inside the sandbox.
///
/// Dropping a handle must not kill the process: the dev server keeps
/// serving after `start` returns its readiness record.
#[async_trait]
pub trait SandboxProcess: Send {
    /// Next chunk of interleaved stdout/stderr; `None` once the process has
    /// exited and the stream is drained.
    async fn next_chunk(&mut self) -> Option<String>;

    /// Wait for natural exit and return the exit code.
    async fn wait(&mut self) -> i32;

    /// Force-kill the process.
    async fn kill(&mut self);
}

/// The one-per-session sandbox runtime handle.
#[async_trait]
pub trait SandboxRuntime: Send + Sync {
    /// Materialize the file tree into the sandbox filesystem.
    ///
    /// # Errors
    ///
    /// Returns an error when the sandbox rejects the mount.
    async fn mount(&self, tree: &FileSystemTree) -> Result<(), PreviewError>;

    /// Spawn `program` with `args` inside the sandbox.
    ///
    /// # Errors
    ///
    /// Returns an error when the process cannot be spawned.
    async fn spawn(&self, program: &str, args: &[&str])
        -> Result<Box<dyn SandboxProcess>, PreviewError>;

    /// Resolves once the runtime reports a listening dev server; `None` if
    /// the runtime goes away first.
    async fn server_ready(&self) -> Option<ReadinessRecord>;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use tokio::sync::watch;

    use super::*;

    pub(crate) struct MockProcess {
        chunks: VecDeque<String>,
        exit_code: i32,
        hang: bool,
        killed: bool,
        kill_counter: Option<Arc<AtomicUsize>>,
    }

    impl MockProcess {
        pub(crate) fn exiting(chunks: &[&str], exit_code: i32) -> Self {
            Self {
                chunks: chunks.iter().map(|chunk| (*chunk).to_string()).collect(),
                exit_code,
                hang: false,
                killed: false,
                kill_counter: None,
            }
        }

        /// A process that streams its chunks and then never exits, like a
        /// dev server or a wedged installer.
        pub(crate) fn hanging(chunks: &[&str]) -> Self {
            Self {
                chunks: chunks.iter().map(|chunk| (*chunk).to_string()).collect(),
                exit_code: 0,
                hang: true,
                killed: false,
                kill_counter: None,
            }
        }
    }

    #[async_trait]
    impl SandboxProcess for MockProcess {
        async fn next_chunk(&mut self) -> Option<String> {
            if let Some(chunk) = self.chunks.pop_front() {
                return Some(chunk);
            }
            if self.hang && !self.killed {
                std::future::pending::<()>().await;
            }
            None
        }

        async fn wait(&mut self) -> i32 {
            if self.hang && !self.killed {
                std::future::pending::<()>().await;
            }
            self.exit_code
        }

        async fn kill(&mut self) {
            self.killed = true;
            if let Some(counter) = &self.kill_counter {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    pub(crate) struct MockRuntime {
        spawns: AtomicUsize,
        mounts: AtomicUsize,
        kills: Arc<AtomicUsize>,
        processes: Mutex<VecDeque<MockProcess>>,
        ready_tx: watch::Sender<Option<ReadinessRecord>>,
        ready_rx: watch::Receiver<Option<ReadinessRecord>>,
    }

    impl MockRuntime {
        pub(crate) fn new(processes: Vec<MockProcess>) -> Self {
            let (ready_tx, ready_rx) = watch::channel(None);
            Self {
                spawns: AtomicUsize::new(0),
                mounts: AtomicUsize::new(0),
                kills: Arc::new(AtomicUsize::new(0)),
                processes: Mutex::new(processes.into()),
                ready_tx,
                ready_rx,
            }
        }

        pub(crate) fn announce_ready(&self, record: ReadinessRecord) {
            let _ = self.ready_tx.send(Some(record));
        }

        pub(crate) fn spawn_count(&self) -> usize {
            self.spawns.load(Ordering::SeqCst)
        }

        pub(crate) fn mount_count(&self) -> usize {
            self.mounts.load(Ordering::SeqCst)
        }

        pub(crate) fn kill_count(&self) -> usize {
            self.kills.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SandboxRuntime for MockRuntime {
        async fn mount(&self, _tree: &FileSystemTree) -> Result<(), PreviewError> {
            self.mounts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn spawn(
            &self,
            _program: &str,
            _args: &[&str],
        ) -> Result<Box<dyn SandboxProcess>, PreviewError> {
            self.spawns.fetch_add(1, Ordering::SeqCst);
            let mut process = self
                .processes
                .lock()
                .expect("mock process queue")
                .pop_front()
                .expect("a scripted process for every spawn");
            process.kill_counter = Some(Arc::clone(&self.kills));
            Ok(Box::new(process))
        }

        async fn server_ready(&self) -> Option<ReadinessRecord> {
            let mut rx = self.ready_rx.clone();
            loop {
                let current = rx.borrow().clone();
                if let Some(record) = current {
                    return Some(record);
                }
                rx.changed().await.ok()?;
            }
        }
    }
}
