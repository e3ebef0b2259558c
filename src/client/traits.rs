// ABOUTME: Core SMPP client traits using native async functions for modern Rust implementations
// ABOUTME: Defines extensible interfaces for different SMPP client types and connection management

use crate::client::error::SmppResult;
use crate::client::keepalive::KeepAliveStatus;
use crate::client::types::{BindCredentials, SmsMessage};
use crate::datatypes::{DeliverSm, SubmitSm};
use std::future::Future;
use tokio::net::ToSocketAddrs;

/// Base connection management for SMPP clients.
pub trait SmppConnection {
    /// Open a TCP connection to the SMSC and start the connection engine's
    /// background tasks. Does not bind.
    fn connect<T: ToSocketAddrs + Send>(addr: T) -> impl Future<Output = SmppResult<Self>> + Send
    where
        Self: Sized;

    /// Tear the connection down. Idempotent. If still bound, sends `unbind`
    /// best-effort first.
    fn disconnect(&mut self) -> impl Future<Output = SmppResult<()>> + Send;

    /// Whether the underlying connection is still up.
    fn is_connected(&self) -> bool;
}

/// Core SMPP client session operations: bind lifecycle and keepalive.
pub trait SmppClient: SmppConnection {
    /// Bind to the SMSC with the given credentials, selecting transmitter,
    /// receiver, or transceiver mode per `credentials.bind_type`.
    fn bind(
        &mut self,
        credentials: &BindCredentials,
    ) -> impl Future<Output = SmppResult<()>> + Send;

    /// Send `unbind` and await the response; the local state transitions to
    /// unbound regardless of the peer's reply.
    fn unbind(&mut self) -> impl Future<Output = SmppResult<()>> + Send;

    /// Send an on-demand `enquire_link` and report whether it was
    /// acknowledged with `ESME_ROK`.
    fn enquire_link(&mut self) -> impl Future<Output = SmppResult<bool>> + Send;

    /// Snapshot of the connection's automatic `enquire_link` keepalive.
    fn keep_alive_status(&self) -> KeepAliveStatus;
}

/// SMPP transmitter client operations (`submit_sm`).
pub trait SmppTransmitter: SmppClient {
    /// Send an SMS using the simplified [`SmsMessage`] type.
    fn send_sms(&mut self, message: &SmsMessage)
    -> impl Future<Output = SmppResult<String>> + Send;

    /// Send a fully-constructed `submit_sm` PDU, returning the assigned
    /// `message_id` on `ESME_ROK`.
    fn submit_sm(&mut self, submit: &SubmitSm) -> impl Future<Output = SmppResult<String>> + Send;
}

/// SMPP receiver client operations (`deliver_sm`).
///
/// Inbound `deliver_sm` PDUs are auto-acknowledged by the session as they
/// arrive (per the bind contract); `receive_message` lets the host consume
/// them in order without racing the acknowledgment.
pub trait SmppReceiver: SmppClient {
    /// Await the next `deliver_sm` forwarded by the session. Returns `None`
    /// once the connection is torn down and no further messages will arrive.
    fn receive_message(&mut self) -> impl Future<Output = Option<DeliverSm>> + Send;
}

/// Combined transmitter + receiver capabilities for a transceiver bind.
pub trait SmppTransceiver: SmppTransmitter + SmppReceiver {}

impl<T> SmppTransceiver for T where T: SmppTransmitter + SmppReceiver {}
