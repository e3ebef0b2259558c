// ABOUTME: Client factory and builder patterns for easy SMPP client creation
// ABOUTME: Provides convenient constructors for different types of SMPP clients with trait objects

use crate::client::default::DefaultClient;
use crate::client::error::SmppResult;
use crate::client::traits::{SmppClient, SmppConnection, SmppTransmitter};
use crate::client::types::{BindCredentials, ClientHooks};
use crate::connection::ConnectionConfig;
use std::time::Duration;
use tokio::net::ToSocketAddrs;

/// Factory for creating different types of SMPP clients.
///
/// Handles the connect + bind sequence in one call for the common cases;
/// reach for [`ClientOptions`] when timeouts or hooks need to be
/// customized first.
pub struct ClientBuilder;

impl ClientBuilder {
    /// Connect and bind as transmitter.
    pub async fn transmitter<T: ToSocketAddrs + Send>(
        addr: T,
        credentials: BindCredentials,
    ) -> SmppResult<impl SmppTransmitter> {
        let mut client = DefaultClient::connect(addr).await?;
        client.bind(&credentials).await?;
        Ok(client)
    }

    /// Connect and bind with whatever role `credentials.bind_type` names.
    pub async fn client<T: ToSocketAddrs + Send>(
        addr: T,
        credentials: BindCredentials,
    ) -> SmppResult<impl SmppClient> {
        let mut client = DefaultClient::connect(addr).await?;
        client.bind(&credentials).await?;
        Ok(client)
    }

    /// Open the transport only; the caller binds separately.
    pub async fn connection<T: ToSocketAddrs + Send>(addr: T) -> SmppResult<impl SmppConnection> {
        DefaultClient::connect(addr).await
    }
}

impl ClientBuilder {
    /// Quick transmitter creation with minimal parameters.
    pub async fn quick_transmitter<T: ToSocketAddrs + Send>(
        addr: T,
        system_id: impl Into<String>,
        password: impl Into<String>,
    ) -> SmppResult<impl SmppTransmitter> {
        let credentials = BindCredentials::transmitter(system_id, password);
        Self::transmitter(addr, credentials).await
    }

    /// Quick client creation, bound as transmitter.
    pub async fn quick_client<T: ToSocketAddrs + Send>(
        addr: T,
        system_id: impl Into<String>,
        password: impl Into<String>,
    ) -> SmppResult<impl SmppClient> {
        let credentials = BindCredentials::transmitter(system_id, password);
        Self::client(addr, credentials).await
    }
}

/// Builder for client configuration beyond the quick constructors: timeouts,
/// the pending-PDU ceiling, the enquire_link interval, and lifecycle hooks.
#[derive(Default)]
pub struct ClientOptions {
    /// Connection-engine configuration (timeouts, keepalive interval, pending cap).
    pub connection: ConnectionConfig,
    /// Hooks fired on bind success, unbind, inbound deliver_sm, and connection loss.
    pub hooks: ClientHooks,
}

impl ClientOptions {
    /// Create new client options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the TCP connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connection.connect_timeout = timeout;
        self
    }

    /// Override the read timeout used while awaiting PDU responses.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.connection.read_timeout = timeout;
        self
    }

    /// Override the enquire_link keepalive interval.
    pub fn with_enquire_link_interval(mut self, interval: Duration) -> Self {
        self.connection.enquire_link_interval = interval;
        self
    }

    /// Override the maximum number of outstanding request/response waiters.
    pub fn with_max_pending_pdus(mut self, max: usize) -> Self {
        self.connection.max_pending_pdus = max;
        self
    }

    /// Install lifecycle hooks (§6.6). Bound once; not reassignable afterward.
    pub fn with_hooks(mut self, hooks: ClientHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Build a transmitter client with these options.
    pub async fn build_transmitter<T: ToSocketAddrs + Send>(
        self,
        addr: T,
        credentials: BindCredentials,
    ) -> SmppResult<impl SmppTransmitter> {
        let mut client =
            DefaultClient::connect_with_config(addr, self.connection, self.hooks).await?;
        client.bind(&credentials).await?;
        Ok(client)
    }

    /// Build a client bound with whatever role `credentials.bind_type` names.
    pub async fn build_client<T: ToSocketAddrs + Send>(
        self,
        addr: T,
        credentials: BindCredentials,
    ) -> SmppResult<impl SmppClient> {
        let mut client =
            DefaultClient::connect_with_config(addr, self.connection, self.hooks).await?;
        client.bind(&credentials).await?;
        Ok(client)
    }
}
