use std::time::Duration;

const DEFAULT_INSTALL_TIMEOUT_MS: u64 = 120_000;
const DEFAULT_START_TIMEOUT_MS: u64 = 90_000;

/// Deadlines for the two process phases. Both are hard: on expiry the
/// underlying process is force-killed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewConfig {
    pub install_timeout: Duration,
    pub start_timeout: Duration,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            install_timeout: Duration::from_millis(DEFAULT_INSTALL_TIMEOUT_MS),
            start_timeout: Duration::from_millis(DEFAULT_START_TIMEOUT_MS),
        }
    }
}

impl PreviewConfig {
    /// Defaults with `PREVU_INSTALL_TIMEOUT_MS` / `PREVU_START_TIMEOUT_MS`
    /// overrides applied.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            install_timeout: env_timeout("PREVU_INSTALL_TIMEOUT_MS", DEFAULT_INSTALL_TIMEOUT_MS),
            start_timeout: env_timeout("PREVU_START_TIMEOUT_MS", DEFAULT_START_TIMEOUT_MS),
        }
    }
}

fn env_timeout(key: &str, default_ms: u64) -> Duration {
    let ms = std::env::var(key)
        .ok()
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default_ms);
    Duration::from_millis(ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn defaults_are_sane() {
        let config = PreviewConfig::default();
        assert_eq!(config.install_timeout, Duration::from_secs(120));
        assert_eq!(config.start_timeout, Duration::from_secs(90));
    }

    #[test]
    #[serial]
    fn env_overrides_apply_and_ignore_junk() {
        std::env::set_var("PREVU_INSTALL_TIMEOUT_MS", "5000");
        std::env::set_var("PREVU_START_TIMEOUT_MS", "not a number");
        let config = PreviewConfig::from_env();
        std::env::remove_var("PREVU_INSTALL_TIMEOUT_MS");
        std::env::remove_var("PREVU_START_TIMEOUT_MS");
        assert_eq!(config.install_timeout, Duration::from_secs(5));
        assert_eq!(config.start_timeout, Duration::from_secs(90));
    }
}
