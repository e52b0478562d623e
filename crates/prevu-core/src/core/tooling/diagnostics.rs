/// Stable error codes attached to orchestrator failures, so the hosting
/// page can branch on what went wrong without parsing messages.
pub mod codes {
    pub const BOOT: &str = "PV901";
    pub const MOUNT: &str = "PV902";
    pub const INSTALL: &str = "PV903";
    pub const START: &str = "PV904";
    pub const START_TIMEOUT: &str = "PV905";
}
