// Intended public API surface for `prevu-core`.
//
// This module exists to keep the crate root small and make it explicit which
// types/functions are part of the stable interface used by the hosting-page
// bindings and other crates.

pub use crate::core::config::PreviewConfig;
pub use crate::core::detect::detect;
pub use crate::core::neutralize::neutralize;
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
