// ABOUTME: Keep-alive configuration and status types for the client's automatic enquire_link loop
// ABOUTME: The actual keepalive loop lives on Connection; this module only carries config in and a snapshot out

use std::time::Duration;

/// Tunable knobs for the connection's automatic `enquire_link` keepalive.
///
/// The keepalive itself runs as one of [`crate::connection::Connection`]'s
/// background tasks; this type exists so callers can configure it through
/// the same builder-style API used for the rest of the client without
/// reaching into [`crate::connection::ConnectionConfig`] directly.
#[derive(Debug, Clone)]
pub struct KeepAliveConfig {
    /// Spacing between automatic `enquire_link` PDUs.
    pub interval: Duration,
    /// How long a single `enquire_link` round trip may take before it's
    /// treated as a failure.
    pub timeout: Duration,
}

impl Default for KeepAliveConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            timeout: Duration::from_secs(10),
        }
    }
}

impl KeepAliveConfig {
    /// Create a new configuration with the given interval and the default timeout.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            ..Self::default()
        }
    }

    /// Override the per-ping timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Read-only snapshot of the connection's keepalive health, as queried from
/// [`crate::connection::Connection::keepalive_status`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeepAliveStatus {
    /// Total number of automatic `enquire_link` PDUs sent so far.
    pub total_pings: u32,
    /// How many of those were acknowledged before their timeout.
    pub total_pongs: u32,
    /// Consecutive failures since the last successful round trip. A fault
    /// on the connection follows the first failure, so in practice this is
    /// 0 or 1 by the time a caller observes it.
    pub consecutive_failures: u32,
}

impl From<crate::connection::KeepaliveStatus> for KeepAliveStatus {
    fn from(s: crate::connection::KeepaliveStatus) -> Self {
        Self {
            total_pings: s.enquires_sent,
            total_pongs: s.enquires_acked,
            consecutive_failures: s.consecutive_failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_spec_defaults() {
        let config = KeepAliveConfig::default();
        assert_eq!(config.interval, Duration::from_secs(60));
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn builder_overrides_timeout_only() {
        let config = KeepAliveConfig::new(Duration::from_secs(30)).with_timeout(Duration::from_secs(5));
        assert_eq!(config.interval, Duration::from_secs(30));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn status_converts_from_connection_snapshot() {
        let raw = crate::connection::KeepaliveStatus {
            enquires_sent: 4,
            enquires_acked: 3,
            consecutive_failures: 1,
        };
        let status: KeepAliveStatus = raw.into();
        assert_eq!(status.total_pings, 4);
        assert_eq!(status.total_pongs, 3);
        assert_eq!(status.consecutive_failures, 1);
    }
}
