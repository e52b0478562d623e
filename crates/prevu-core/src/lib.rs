#![deny(clippy::all, warnings)]

mod core;

pub mod api;

pub use crate::core::config::PreviewConfig;
pub use crate::core::pipeline::{prepare_preview, PreparedPreview};
pub use crate::core::runtime::orchestrator::{
    install_dependencies, launch_preview, start_dev_server, PreviewPhase,
    INSTALL_TIMEOUT_EXIT_CODE,
};
pub use crate::core::runtime::registry::{acquire, cached_readiness, is_ready, teardown, BootFuture};
pub use crate::core::runtime::{BootError, ReadinessRecord, SandboxProcess, SandboxRuntime};
pub use crate::core::sanitize::{is_denied, sanitize, SanitizeOutcome, DENY_LIST};
pub use crate::core::tooling::diagnostics::codes;
pub use crate::core::tooling::outcome::PreviewError;
