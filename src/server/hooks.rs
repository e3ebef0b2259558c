// ABOUTME: Server-side authentication trait and lifecycle callbacks, mirroring client/types.rs's ClientHooks
// ABOUTME: Authenticator uses native async-fn-in-trait; hooks are Option<Arc<dyn Fn>> bound once at construction

use crate::datatypes::DeliverSm;
use crate::server::session::BindInfo;
use std::future::Future;
use std::sync::Arc;

/// Authenticates a bind request's credentials.
///
/// Implementations run once per bind attempt; a panic or long block here
/// stalls only that one session's bind, never the listener.
pub trait Authenticator: Send + Sync {
    fn authenticate(
        &self,
        system_id: &str,
        password: &str,
        system_type: &str,
    ) -> impl Future<Output = bool> + Send;
}

/// Accepts every bind attempt. The default for a `ServerListener` that
/// hasn't been given a real `Authenticator`.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAllAuthenticator;

impl Authenticator for AllowAllAuthenticator {
    async fn authenticate(&self, _system_id: &str, _password: &str, _system_type: &str) -> bool {
        true
    }
}

/// Callbacks a host may supply to observe the listener's session lifecycle
/// (§6.6). Bound once at construction; never reassigned afterward.
#[derive(Clone, Default)]
pub struct ServerHooks {
    /// Fired once a socket is accepted and registered, before any PDU is read.
    pub on_client_connected: Option<Arc<dyn Fn(&str) + Send + Sync>>,
    /// Fired once a session completes a successful bind.
    pub on_client_bound: Option<Arc<dyn Fn(&str, &BindInfo) + Send + Sync>>,
    /// Fired when a session's connection tears down, bound or not.
    pub on_client_disconnected: Option<Arc<dyn Fn(&str) + Send + Sync>>,
    /// Fired for every accepted `submit_sm`. Returning `Some(id)` overrides
    /// the server-assigned `message_id` in the response.
    pub on_message_received: Option<Arc<dyn Fn(&str, &crate::datatypes::SubmitSm) -> Option<String> + Send + Sync>>,
    /// Fired for every `deliver_sm` routed to a connected receiver/transceiver.
    pub on_deliver_sm: Option<Arc<dyn Fn(&DeliverSm) + Send + Sync>>,
    /// Fired once the six-phase graceful shutdown has fully drained.
    pub on_shutdown_complete: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl std::fmt::Debug for ServerHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerHooks")
            .field("on_client_connected", &self.on_client_connected.is_some())
            .field("on_client_bound", &self.on_client_bound.is_some())
            .field(
                "on_client_disconnected",
                &self.on_client_disconnected.is_some(),
            )
            .field(
                "on_message_received",
                &self.on_message_received.is_some(),
            )
            .field("on_deliver_sm", &self.on_deliver_sm.is_some())
            .field(
                "on_shutdown_complete",
                &self.on_shutdown_complete.is_some(),
            )
            .finish()
    }
}
