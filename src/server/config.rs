// ABOUTME: Server-side configuration surface: listen address, connection limits, graceful shutdown timing
// ABOUTME: Builder-style setters mirror the teacher's ConnectionConfig/ClientOptions idiom

use std::time::Duration;

/// Cap applied by every `with_*` duration setter so a host can't wedge the
/// shutdown sequence open indefinitely by mistake.
const MAX_DURATION_SETTER: Duration = Duration::from_secs(3600);

/// How a departing server tells a still-bound client to leave.
///
/// The core never inspects PDU bodies to guess shutdown intent; the host
/// picks one of these up front and `ServerListener` follows it literally.
#[derive(Debug, Clone)]
pub enum ShutdownNotification {
    /// Send an `unbind` request and wait for the client to act on it.
    Unbind,
    /// Send an advisory `deliver_sm` from `SYSTEM`/`SMSC` carrying `text`,
    /// for hosts whose clients don't handle server-initiated unbind.
    AdvisoryDeliverSm { text: String },
}

impl Default for ShutdownNotification {
    fn default() -> Self {
        ShutdownNotification::Unbind
    }
}

/// Tunables for a [`ServerListener`](crate::server::ServerListener).
///
/// See each field's doc comment for the default `ServerConfig::default()`
/// supplies, matching §6.5 of the SMSC configuration surface.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind the listening socket to.
    pub host: String,
    /// Port to bind the listening socket to.
    pub port: u16,
    /// `system_id` returned in successful bind responses.
    pub system_id: String,
    /// Maximum number of simultaneously connected sockets.
    pub max_connections: usize,
    /// How long a client has to complete a bind before the session is
    /// dropped (enforced by the session's own bind handling).
    pub bind_timeout: Duration,
    /// How long the server waits for a response to its own requests (e.g.
    /// outbound `deliver_sm`).
    pub response_timeout: Duration,
    /// How long bound clients are given to disconnect voluntarily once
    /// shutdown notification has gone out.
    pub grace_period: Duration,
    /// How long after the grace period begins a reminder notification is
    /// sent to clients that are still bound.
    pub reminder_delay: Duration,
    /// How long the force-disconnect phase waits for sockets to close
    /// before the drain phase proceeds regardless.
    pub shutdown_timeout: Duration,
    /// Which convention bound clients are told to leave with during
    /// graceful shutdown.
    pub shutdown_notification: ShutdownNotification,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 2775,
            system_id: "SMSC".to_string(),
            max_connections: 100,
            bind_timeout: Duration::from_secs(30),
            response_timeout: Duration::from_secs(30),
            grace_period: Duration::from_secs(15),
            reminder_delay: Duration::from_secs(5),
            shutdown_timeout: Duration::from_secs(10),
            shutdown_notification: ShutdownNotification::default(),
        }
    }
}

impl ServerConfig {
    /// Start from the defaults and bind to `host:port`.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Override the `system_id` advertised in bind responses.
    ///
    /// Truncated to 15 octets if longer: `SystemId` is a 16-byte
    /// NUL-terminated field and a value that doesn't fit can never be
    /// encoded onto the wire.
    pub fn with_system_id(mut self, system_id: impl Into<String>) -> Self {
        let system_id = system_id.into();
        self.system_id = match system_id.char_indices().nth(15) {
            Some((idx, _)) => system_id[..idx].to_string(),
            None => system_id,
        };
        self
    }

    /// Override the maximum number of simultaneously connected sockets.
    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Override the grace period, clamped to at most one hour.
    pub fn with_grace_period(mut self, period: Duration) -> Self {
        self.grace_period = period.min(MAX_DURATION_SETTER);
        self
    }

    /// Override the reminder delay, clamped to at most one hour.
    pub fn with_reminder_delay(mut self, delay: Duration) -> Self {
        self.reminder_delay = delay.min(MAX_DURATION_SETTER);
        self
    }

    /// Override the forced-disconnect window, clamped to at most one hour.
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout.min(MAX_DURATION_SETTER);
        self
    }

    /// Override the shutdown notification convention.
    pub fn with_shutdown_notification(mut self, notification: ShutdownNotification) -> Self {
        self.shutdown_notification = notification;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_configuration_surface() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 2775);
        assert_eq!(config.system_id, "SMSC");
        assert_eq!(config.max_connections, 100);
        assert_eq!(config.grace_period, Duration::from_secs(15));
        assert_eq!(config.reminder_delay, Duration::from_secs(5));
        assert_eq!(config.shutdown_timeout, Duration::from_secs(10));
    }

    #[test]
    fn duration_setters_clamp_to_one_hour() {
        let config = ServerConfig::default().with_grace_period(Duration::from_secs(7200));
        assert_eq!(config.grace_period, MAX_DURATION_SETTER);
    }
}
