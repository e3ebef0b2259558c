// ABOUTME: Default SMPP client implementation driving the Connection engine through the ESME bind lifecycle
// ABOUTME: Owns the session state machine (Closed -> Open -> Bound{Tx,Rx,Trx} -> Unbound) described in spec.md 4.5

use crate::client::error::{SmppError, SmppResult};
use crate::client::keepalive::KeepAliveStatus;
use crate::client::traits::{SmppClient, SmppConnection, SmppReceiver, SmppTransmitter};
use crate::client::types::{BindCredentials, BindType, ClientHooks, SmsMessage};
use crate::codec::Frame;
use crate::connection::{Connection, ConnectionConfig, ConnectionState};
use crate::datatypes::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Default ESME client implementation.
///
/// Wraps a [`Connection`] and enforces the bind state machine from
/// spec.md §4.5: `connect` only opens the transport, `bind_*` negotiates a
/// role, `submit_sm`/`send_sms` require `Bound{Tx,Trx}`, and inbound
/// `deliver_sm`/`enquire_link`/server-initiated `unbind` are handled
/// automatically by a background session task fed from the connection's
/// unsolicited-frame channel.
pub struct DefaultClient {
    connection: Connection,
    bind_type: std::sync::Mutex<Option<BindType>>,
    bound: Arc<AtomicBool>,
    delivered_rx: mpsc::UnboundedReceiver<DeliverSm>,
    session_task: Option<JoinHandle<()>>,
    bind_timeout: Duration,
    response_timeout: Duration,
}

async fn session_loop(
    connection: Connection,
    mut unsolicited_rx: mpsc::UnboundedReceiver<Frame>,
    delivered_tx: mpsc::UnboundedSender<DeliverSm>,
    bound: Arc<AtomicBool>,
    hooks: ClientHooks,
) {
    while let Some(frame) = unsolicited_rx.recv().await {
        match frame {
            Frame::DeliverSm(pdu) => {
                let seq = pdu.sequence_number;
                let resp = Frame::DeliverSmResp(DeliverSmResponse {
                    command_status: CommandStatus::Ok,
                    sequence_number: seq,
                    message_id: MessageId::default(),
                });
                if let Err(e) = connection.send_pdu(resp, false, None).await {
                    warn!(error = %e, "failed to auto-acknowledge deliver_sm");
                }
                if let Some(hook) = &hooks.on_deliver_sm {
                    hook(pdu.as_ref());
                }
                let _ = delivered_tx.send(*pdu);
            }
            Frame::EnquireLink(pdu) => {
                let resp = Frame::EnquireLinkResp(EnquireLinkResponse::new(pdu.sequence_number));
                if let Err(e) = connection.send_pdu(resp, false, None).await {
                    warn!(error = %e, "failed to answer peer enquire_link");
                }
            }
            Frame::Unbind(pdu) => {
                let resp = Frame::UnbindResp(UnbindResponse {
                    command_status: CommandStatus::Ok,
                    sequence_number: pdu.sequence_number,
                });
                if let Err(e) = connection.send_pdu(resp, false, None).await {
                    warn!(error = %e, "failed to answer server-initiated unbind");
                }
                bound.store(false, Ordering::SeqCst);
                connection.set_bound_state(ConnectionState::Open).await;
                if let Some(hook) = &hooks.on_unbind {
                    hook();
                }
            }
            other => {
                debug!(command_id = ?other.command_id(), "ignoring unsolicited PDU");
            }
        }
    }
}

impl DefaultClient {
    /// Connect with an explicit [`ConnectionConfig`] and lifecycle hooks.
    pub async fn connect_with_config<T: ToSocketAddrs + Send>(
        addr: T,
        config: ConnectionConfig,
        hooks: ClientHooks,
    ) -> SmppResult<Self> {
        let bind_timeout = Duration::from_secs(30);
        let response_timeout = config.read_timeout;
        let (connection, unsolicited_rx) =
            Connection::connect_with_config(addr, config).await?;

        if let Some(on_lost) = hooks.on_connection_lost.clone() {
            connection.set_on_connection_lost(move |err| on_lost(err));
        }

        let bound = Arc::new(AtomicBool::new(false));
        let (delivered_tx, delivered_rx) = mpsc::unbounded_channel();
        let session_task = tokio::spawn(session_loop(
            connection.clone(),
            unsolicited_rx,
            delivered_tx,
            bound.clone(),
            hooks,
        ));

        Ok(DefaultClient {
            connection,
            bind_type: std::sync::Mutex::new(None),
            bound,
            delivered_rx,
            session_task: Some(session_task),
            bind_timeout,
            response_timeout,
        })
    }

    fn bind_type(&self) -> Option<BindType> {
        *self.bind_type.lock().unwrap()
    }

    fn require_bound_for_submit(&self) -> SmppResult<()> {
        match self.bind_type() {
            Some(BindType::Transmitter) | Some(BindType::Transceiver)
                if self.bound.load(Ordering::SeqCst) =>
            {
                Ok(())
            }
            _ => Err(SmppError::InvalidState(
                "submit_sm requires a Bound{Tx,Trx} session".to_string(),
            )),
        }
    }
}

impl SmppConnection for DefaultClient {
    async fn connect<T: ToSocketAddrs + Send>(addr: T) -> SmppResult<Self> {
        Self::connect_with_config(addr, ConnectionConfig::default(), ClientHooks::default()).await
    }

    async fn disconnect(&mut self) -> SmppResult<()> {
        if self.bound.load(Ordering::SeqCst) {
            // Best-effort: send errors are logged and swallowed, the local
            // state still transitions per spec.md 4.5.
            let _ = SmppClient::unbind(self).await;
        }
        self.connection.disconnect().await;
        if let Some(task) = self.session_task.take() {
            task.abort();
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }
}

impl SmppClient for DefaultClient {
    async fn bind(&mut self, credentials: &BindCredentials) -> SmppResult<()> {
        if self.bind_type().is_some() {
            return Err(SmppError::InvalidState(
                "session is already bound or binding".to_string(),
            ));
        }

        let seq = self.connection.next_sequence();
        let password = credentials
            .password
            .parse::<Password>()
            .map_err(|e| SmppError::InvalidData(e.to_string()))?;
        let password = Some(password);
        let system_type = credentials
            .system_type
            .as_deref()
            .unwrap_or("")
            .parse::<SystemType>()
            .map_err(|e| SmppError::InvalidData(e.to_string()))?;
        let system_id = credentials
            .system_id
            .parse::<SystemId>()
            .map_err(|e| SmppError::InvalidData(e.to_string()))?;

        let frame = match credentials.bind_type {
            BindType::Transmitter => Frame::BindTransmitter(BindTransmitter {
                command_status: CommandStatus::Ok,
                sequence_number: seq,
                system_id,
                password,
                system_type,
                interface_version: credentials.interface_version,
                addr_ton: TypeOfNumber::Unknown,
                addr_npi: NumericPlanIndicator::Unknown,
                address_range: AddressRange::default(),
            }),
            BindType::Receiver => Frame::BindReceiver(BindReceiver {
                command_status: CommandStatus::Ok,
                sequence_number: seq,
                system_id,
                password,
                system_type,
                interface_version: credentials.interface_version,
                addr_ton: TypeOfNumber::Unknown,
                addr_npi: NumericPlanIndicator::Unknown,
                address_range: AddressRange::default(),
            }),
            BindType::Transceiver => Frame::BindTransceiver(BindTransceiver {
                command_status: CommandStatus::Ok,
                sequence_number: seq,
                system_id,
                password,
                system_type,
                interface_version: credentials.interface_version,
                addr_ton: TypeOfNumber::Unknown,
                addr_npi: NumericPlanIndicator::Unknown,
                address_range: AddressRange::default(),
            }),
        };

        let response = self
            .connection
            .send_pdu(frame, true, Some(self.bind_timeout))
            .await
            .map_err(|e| match e {
                crate::connection::ConnectionError::Timeout => SmppError::Timeout,
                other => SmppError::from(other),
            })?
            .expect("wait_response=true always yields a frame or an error");

        let status = match &response {
            Frame::BindTransmitterResp(r) => r.command_status,
            Frame::BindReceiverResp(r) => r.command_status,
            Frame::BindTransceiverResp(r) => r.command_status,
            other => {
                return Err(SmppError::UnexpectedPdu {
                    expected: "a bind response".to_string(),
                    actual: format!("{other:?}"),
                });
            }
        };

        if status != CommandStatus::Ok {
            return Err(SmppError::Protocol(status));
        }

        let connection_state = match credentials.bind_type {
            BindType::Transmitter => ConnectionState::BoundTx,
            BindType::Receiver => ConnectionState::BoundRx,
            BindType::Transceiver => ConnectionState::BoundTrx,
        };
        self.connection.set_bound_state(connection_state).await;
        *self.bind_type.lock().unwrap() = Some(credentials.bind_type);
        self.bound.store(true, Ordering::SeqCst);

        Ok(())
    }

    async fn unbind(&mut self) -> SmppResult<()> {
        if !self.bound.load(Ordering::SeqCst) {
            return Err(SmppError::InvalidState("session is not bound".to_string()));
        }

        let seq = self.connection.next_sequence();
        let frame = Frame::Unbind(Unbind {
            command_status: CommandStatus::Ok,
            sequence_number: seq,
        });

        // Send errors are logged and swallowed; the local state transitions
        // regardless, per spec.md 4.5.
        if let Err(e) = self
            .connection
            .send_pdu(frame, true, Some(self.response_timeout))
            .await
        {
            warn!(error = %e, "unbind request failed, transitioning local state anyway");
        }

        self.bound.store(false, Ordering::SeqCst);
        self.connection.set_bound_state(ConnectionState::Open).await;
        Ok(())
    }

    async fn enquire_link(&mut self) -> SmppResult<bool> {
        let seq = self.connection.next_sequence();
        let frame = Frame::EnquireLink(EnquireLink::new(seq));
        match self
            .connection
            .send_pdu(frame, true, Some(self.response_timeout))
            .await?
        {
            Some(Frame::EnquireLinkResp(_)) => Ok(true),
            Some(_) => Ok(false),
            None => Ok(false),
        }
    }

    fn keep_alive_status(&self) -> KeepAliveStatus {
        self.connection.keepalive_status().into()
    }
}

impl SmppTransmitter for DefaultClient {
    async fn send_sms(&mut self, message: &SmsMessage) -> SmppResult<String> {
        let encoded_text = crate::codec::encode_message(&message.text, message.options.data_coding)?;
        if encoded_text.len() > 254 {
            return Err(SmppError::InvalidData(
                "message too long (>254 bytes); use message_payload TLV for longer messages"
                    .to_string(),
            ));
        }
        let short_message = ShortMessage::new(&encoded_text)
            .map_err(|e| SmppError::InvalidData(e.to_string()))?;

        let submit_sm = SubmitSm {
            command_status: CommandStatus::Ok,
            sequence_number: 0,
            service_type: ServiceType::default(),
            source_addr_ton: message.options.source_ton,
            source_addr_npi: message.options.source_npi,
            source_addr: SourceAddr::new(&message.from, message.options.source_ton)
                .unwrap_or_default(),
            dest_addr_ton: message.options.dest_ton,
            dest_addr_npi: message.options.dest_npi,
            destination_addr: DestinationAddr::new(&message.to, message.options.dest_ton)
                .unwrap_or_default(),
            esm_class: EsmClass::default(),
            protocol_id: 0,
            priority_flag: message.options.priority,
            schedule_delivery_time: ScheduleDeliveryTime::default(),
            validity_period: ValidityPeriod::default(),
            registered_delivery: message.options.registered_delivery,
            replace_if_present_flag: 0,
            data_coding: message.options.data_coding,
            sm_default_msg_id: 0,
            sm_length: encoded_text.len() as u8,
            short_message,
            user_message_reference: None,
            source_port: None,
            source_addr_submit: None,
            destination_port: None,
            dest_addr_submit: None,
            sar_msg_ref_num: None,
            sar_total_segments: None,
            sar_segment_seqnum: None,
            more_messages_to_send: None,
            payload_type: None,
            message_payload: None,
            privacy_indicator: None,
            callback_num: None,
            callback_num_pres_ind: None,
            callback_num_atag: None,
            source_subaddress: None,
            dest_subaddress: None,
            display_time: None,
            sms_signal: None,
            ms_validity: None,
            ms_msg_wait_facilities: None,
            number_of_messages: None,
            alert_on_msg_delivery: None,
            language_indicator: None,
            its_reply_type: None,
            its_session_info: None,
            ussd_service_op: None,
        };

        self.submit_sm(&submit_sm).await
    }

    async fn submit_sm(&mut self, submit: &SubmitSm) -> SmppResult<String> {
        self.require_bound_for_submit()?;

        let mut submit = submit.clone();
        if submit.sequence_number == 0 {
            submit.sequence_number = self.connection.next_sequence();
        }

        let frame = Frame::SubmitSm(Box::new(submit));
        let response = self
            .connection
            .send_pdu(frame, true, Some(self.response_timeout))
            .await?
            .expect("wait_response=true always yields a frame or an error");

        match response {
            Frame::SubmitSmResp(r) if r.command_status == CommandStatus::Ok => {
                Ok(r.message_id.as_str().unwrap_or_default().to_string())
            }
            Frame::SubmitSmResp(r) => Err(SmppError::Protocol(r.command_status)),
            other => Err(SmppError::UnexpectedPdu {
                expected: "submit_sm_resp".to_string(),
                actual: format!("{other:?}"),
            }),
        }
    }
}

impl SmppReceiver for DefaultClient {
    async fn receive_message(&mut self) -> Option<DeliverSm> {
        self.delivered_rx.recv().await
    }
}
