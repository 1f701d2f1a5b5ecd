//! RSI session configuration.

/// RSI default UDP port, per the KUKA RSI specification.
pub const DEFAULT_PORT: u16 = 59152;

/// Default liveness-timeout budget, in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u32 = 1000;

/// Listen address, port, liveness timeout, and logging verbosity for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Local address to bind; `"0.0.0.0"` binds to any interface.
    pub local_ip: String,
    /// UDP port to bind to.
    pub local_port: u16,
    /// Liveness-timeout budget in milliseconds; `0` disables detection.
    pub timeout_ms: u32,
    /// When set, the worker emits diagnostic `tracing` events for
    /// lifecycle transitions, socket-option failures, slow cycles, and
    /// connection-loss events at `info`/`warn` level instead of staying
    /// silent at `debug`.
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            local_ip: "0.0.0.0".to_string(),
            local_port: DEFAULT_PORT,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            verbose: false,
        }
    }
}

impl Config {
    /// Build a config from `Config::default()`, overridden field-by-field
    /// by any of `KUKA_RSI_LOCAL_IP`, `KUKA_RSI_LOCAL_PORT`,
    /// `KUKA_RSI_TIMEOUT_MS`, `KUKA_RSI_VERBOSE` that parse successfully.
    /// A present-but-unparsable variable is ignored in favor of the default,
    /// the same permissive fallback the rest of the ambient stack uses for
    /// env-sourced settings.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(ip) = std::env::var("KUKA_RSI_LOCAL_IP") {
            cfg.local_ip = ip;
        }
        if let Some(port) = std::env::var("KUKA_RSI_LOCAL_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            cfg.local_port = port;
        }
        if let Some(timeout) = std::env::var("KUKA_RSI_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            cfg.timeout_ms = timeout;
        }
        if let Some(verbose) = std::env::var("KUKA_RSI_VERBOSE")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            cfg.verbose = verbose;
        }

        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_rsi_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.local_ip, "0.0.0.0");
        assert_eq!(cfg.local_port, DEFAULT_PORT);
        assert_eq!(cfg.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert!(!cfg.verbose);
    }

    #[test]
    fn from_env_ignores_unparsable_overrides() {
        std::env::set_var("KUKA_RSI_LOCAL_PORT", "not-a-port");
        let cfg = Config::from_env();
        assert_eq!(cfg.local_port, DEFAULT_PORT);
        std::env::remove_var("KUKA_RSI_LOCAL_PORT");
    }
}
