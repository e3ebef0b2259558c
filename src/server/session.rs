// ABOUTME: Per-connection server session: bind/submit_sm/enquire_link dispatch driven by inbound PDUs
// ABOUTME: Grounded on other_examples' ZedSquad smsc.rs handle_pdu/handle_bind_pdu and original_source's _handle_bind_request

use crate::client::BindType;
use crate::codec::Frame;
use crate::connection::{Connection, ConnectionState};
use crate::datatypes::*;
use crate::server::hooks::{Authenticator, ServerHooks};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// What a session looked like at the moment its bind succeeded, handed to
/// [`ServerHooks::on_client_bound`].
#[derive(Debug, Clone)]
pub struct BindInfo {
    pub bind_type: BindType,
    pub system_id: String,
    pub address_range: String,
}

/// Monotonic decimal-string `message_id` allocator shared across every
/// session a listener owns.
#[derive(Default)]
pub struct MessageIdAllocator {
    counter: AtomicU64,
}

impl MessageIdAllocator {
    pub fn next(&self) -> String {
        self.counter.fetch_add(1, Ordering::Relaxed).to_string()
    }
}

/// One accepted socket's server-side session state: the underlying
/// [`Connection`], and whatever bind succeeded on it (if any).
pub struct ServerSession {
    pub connection: Connection,
    pub client_key: String,
    system_id: AsyncMutex<Option<String>>,
    bind_type: AsyncMutex<Option<BindType>>,
    bound: AtomicBool,
    address_range: AsyncMutex<String>,
}

impl ServerSession {
    pub fn new(connection: Connection, client_key: String) -> Arc<Self> {
        Arc::new(Self {
            connection,
            client_key,
            system_id: AsyncMutex::new(None),
            bind_type: AsyncMutex::new(None),
            bound: AtomicBool::new(false),
            address_range: AsyncMutex::new(String::new()),
        })
    }

    pub fn is_bound(&self) -> bool {
        self.bound.load(Ordering::SeqCst)
    }

    pub async fn system_id(&self) -> Option<String> {
        self.system_id.lock().await.clone()
    }

    pub async fn bind_type(&self) -> Option<BindType> {
        *self.bind_type.lock().await
    }

    pub async fn can_receive(&self) -> bool {
        matches!(
            self.bind_type().await,
            Some(BindType::Receiver) | Some(BindType::Transceiver)
        )
    }

    async fn mark_bound(&self, bind_type: BindType, system_id: &str, address_range: &str) {
        *self.system_id.lock().await = Some(system_id.to_string());
        *self.bind_type.lock().await = Some(bind_type);
        *self.address_range.lock().await = address_range.to_string();
        self.bound.store(true, Ordering::SeqCst);
    }

    async fn mark_unbound(&self) {
        self.bound.store(false, Ordering::SeqCst);
    }
}

/// Drains `unsolicited_rx` for one accepted connection, dispatching every
/// inbound PDU per spec.md §4.6 until the connection closes.
#[allow(clippy::too_many_arguments)]
pub async fn run_session<A: Authenticator>(
    session: Arc<ServerSession>,
    mut unsolicited_rx: mpsc::UnboundedReceiver<Frame>,
    server_system_id: String,
    authenticator: Arc<A>,
    hooks: ServerHooks,
    message_ids: Arc<MessageIdAllocator>,
) {
    while let Some(frame) = unsolicited_rx.recv().await {
        let response = match frame {
            Frame::BindTransmitter(pdu) => {
                Some(
                    handle_bind(
                        &session,
                        BindType::Transmitter,
                        pdu.sequence_number,
                        pdu.system_id.as_str().unwrap_or("").to_string(),
                        pdu.password
                            .and_then(|p| p.as_str().ok().map(str::to_string))
                            .unwrap_or_default(),
                        pdu.system_type.as_str().unwrap_or("").to_string(),
                        pdu.address_range.as_str().unwrap_or("").to_string(),
                        &server_system_id,
                        authenticator.as_ref(),
                        &hooks,
                    )
                    .await,
                )
            }
            Frame::BindReceiver(pdu) => Some(
                handle_bind(
                    &session,
                    BindType::Receiver,
                    pdu.sequence_number,
                    pdu.system_id.as_str().unwrap_or("").to_string(),
                    pdu.password
                        .and_then(|p| p.as_str().ok().map(str::to_string))
                        .unwrap_or_default(),
                    pdu.system_type.as_str().unwrap_or("").to_string(),
                    pdu.address_range.as_str().unwrap_or("").to_string(),
                    &server_system_id,
                    authenticator.as_ref(),
                    &hooks,
                )
                .await,
            ),
            Frame::BindTransceiver(pdu) => Some(
                handle_bind(
                    &session,
                    BindType::Transceiver,
                    pdu.sequence_number,
                    pdu.system_id.as_str().unwrap_or("").to_string(),
                    pdu.password
                        .and_then(|p| p.as_str().ok().map(str::to_string))
                        .unwrap_or_default(),
                    pdu.system_type.as_str().unwrap_or("").to_string(),
                    pdu.address_range.as_str().unwrap_or("").to_string(),
                    &server_system_id,
                    authenticator.as_ref(),
                    &hooks,
                )
                .await,
            ),
            Frame::Unbind(pdu) => {
                let resp = Frame::UnbindResp(UnbindResponse {
                    command_status: CommandStatus::Ok,
                    sequence_number: pdu.sequence_number,
                });
                if let Err(e) = session.connection.send_pdu(resp, false, None).await {
                    warn!(error = %e, "failed to respond to unbind");
                }
                session.mark_unbound().await;
                session.connection.set_bound_state(ConnectionState::Open).await;
                session.connection.disconnect().await;
                None
            }
            Frame::EnquireLink(pdu) => Some(Frame::EnquireLinkResp(EnquireLinkResponse::new(
                pdu.sequence_number,
            ))),
            Frame::SubmitSm(pdu) => Some(handle_submit_sm(&session, *pdu, &hooks, &message_ids).await),
            other => {
                debug!(command_id = ?other.command_id(), "unsupported PDU, sending generic_nack");
                Some(Frame::GenericNack(GenericNack::invalid_command_id(
                    other.sequence_number(),
                )))
            }
        };

        if let Some(response) = response {
            if let Err(e) = session.connection.send_pdu(response, false, None).await {
                warn!(error = %e, "failed to write response, dropping session");
                break;
            }
        }
    }

    if let Some(hook) = &hooks.on_client_disconnected {
        hook(&session.client_key);
    }
}

#[allow(clippy::too_many_arguments)]
async fn handle_bind<A: Authenticator>(
    session: &Arc<ServerSession>,
    bind_type: BindType,
    sequence_number: u32,
    system_id: String,
    password: String,
    system_type: String,
    address_range: String,
    server_system_id: &str,
    authenticator: &A,
    hooks: &ServerHooks,
) -> Frame {
    if session.is_bound() {
        return bind_error_frame(bind_type, sequence_number, CommandStatus::AlreadyBoundState);
    }

    if authenticator
        .authenticate(&system_id, &password, &system_type)
        .await
    {
        let state = match bind_type {
            BindType::Transmitter => ConnectionState::BoundTx,
            BindType::Receiver => ConnectionState::BoundRx,
            BindType::Transceiver => ConnectionState::BoundTrx,
        };
        session.connection.set_bound_state(state).await;
        session
            .mark_bound(bind_type, &system_id, &address_range)
            .await;

        if let Some(hook) = &hooks.on_client_bound {
            hook(
                &session.client_key,
                &BindInfo {
                    bind_type,
                    system_id: system_id.clone(),
                    address_range,
                },
            );
        }

        bind_success_frame(bind_type, sequence_number, server_system_id)
    } else {
        bind_error_frame(bind_type, sequence_number, CommandStatus::BindFailed)
    }
}

fn bind_success_frame(bind_type: BindType, sequence_number: u32, server_system_id: &str) -> Frame {
    let system_id = server_system_id.parse::<SystemId>().unwrap_or_else(|_| {
        warn!(
            system_id = server_system_id,
            "configured system_id does not fit in a SystemId field, truncating"
        );
        let truncate_at = server_system_id
            .char_indices()
            .nth(15)
            .map(|(idx, _)| idx)
            .unwrap_or(server_system_id.len());
        SystemId::from(&server_system_id[..truncate_at])
    });
    match bind_type {
        BindType::Transmitter => Frame::BindTransmitterResp(BindTransmitterResponse {
            command_status: CommandStatus::Ok,
            sequence_number,
            system_id,
            sc_interface_version: None,
        }),
        BindType::Receiver => Frame::BindReceiverResp(BindReceiverResponse {
            command_status: CommandStatus::Ok,
            sequence_number,
            system_id,
            sc_interface_version: None,
        }),
        BindType::Transceiver => Frame::BindTransceiverResp(BindTransceiverResponse {
            command_status: CommandStatus::Ok,
            sequence_number,
            system_id,
            sc_interface_version: None,
        }),
    }
}

fn bind_error_frame(bind_type: BindType, sequence_number: u32, status: CommandStatus) -> Frame {
    let system_id = SystemId::default();
    match bind_type {
        BindType::Transmitter => Frame::BindTransmitterResp(BindTransmitterResponse {
            command_status: status,
            sequence_number,
            system_id,
            sc_interface_version: None,
        }),
        BindType::Receiver => Frame::BindReceiverResp(BindReceiverResponse {
            command_status: status,
            sequence_number,
            system_id,
            sc_interface_version: None,
        }),
        BindType::Transceiver => Frame::BindTransceiverResp(BindTransceiverResponse {
            command_status: status,
            sequence_number,
            system_id,
            sc_interface_version: None,
        }),
    }
}

async fn handle_submit_sm(
    session: &Arc<ServerSession>,
    pdu: SubmitSm,
    hooks: &ServerHooks,
    message_ids: &Arc<MessageIdAllocator>,
) -> Frame {
    let sequence_number = pdu.sequence_number;
    let bind_type = session.bind_type().await;
    if !matches!(bind_type, Some(BindType::Transmitter) | Some(BindType::Transceiver)) {
        return Frame::SubmitSmResp(SubmitSmResponse::error(
            sequence_number,
            CommandStatus::IncorrectBindStatus,
        ));
    }

    let override_id = hooks
        .on_message_received
        .as_ref()
        .and_then(|hook| hook(&session.client_key, &pdu));
    let message_id = override_id.unwrap_or_else(|| message_ids.next());

    match MessageId::try_from(message_id.clone()) {
        Ok(id) => Frame::SubmitSmResp(SubmitSmResponse::success(sequence_number, id)),
        Err(_) => Frame::SubmitSmResp(SubmitSmResponse::error(
            sequence_number,
            CommandStatus::SubmitSmFailed,
        )),
    }
}
