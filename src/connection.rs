//! The transport-level SMPP connection: a single TCP socket wrapped with
//! PDU framing, sequence-number correlation, and the background tasks that
//! keep a session alive and its pending request map bounded.
//!
//! A [`Connection`] is a cheap, `Clone`-able handle around a shared, `Arc`ed
//! inner state. Cloning it and moving a clone into a background task is the
//! normal way to give that task access to the socket and pending map without
//! fighting the borrow checker over a single owned value.
//!
//! Three cooperative tasks run for the lifetime of a connection:
//!
//! - `receive_loop` reads PDUs off the socket and either completes a pending
//!   waiter (for responses) or forwards the frame on the unsolicited channel
//!   returned by [`Connection::connect`].
//! - `enquire_link_loop` sends a periodic `enquire_link` and treats a failed
//!   round trip as a fatal connection fault.
//! - `cleanup_loop` evicts pending entries that have sat unanswered past the
//!   read timeout and enforces the `max_pending_pdus` bound.
//!
//! None of these tasks call [`Connection::disconnect`] directly from within
//! themselves: aborting your own task handle while still running it is not
//! something `tokio` promises will behave, so a fault is handled by spawning
//! a fresh task to perform the disconnect instead.

use crate::codec::{CodecError, Frame, PduHeader};
use crate::datatypes::{CommandStatus, EnquireLink, GenericNack};
use bytes::{Buf, Bytes, BytesMut};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::sync::{mpsc, oneshot, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// Highest sequence number SMPP allows; 0 is reserved to mean "assign one at
/// send time" and values above this are out of range per the spec.
const MAX_SEQUENCE_NUMBER: u32 = 0x7FFF_FFFF;

/// Where a connection sits in the SMPP bind lifecycle.
///
/// This tracks the same states a bound client session moves through; the
/// connection itself doesn't enforce the transitions, it just records the
/// current one so the read loop can size its timeout and the owner can ask
/// what mode the link is in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Closed,
    Open,
    BoundTx,
    BoundRx,
    BoundTrx,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Closed => "closed",
            ConnectionState::Open => "open",
            ConnectionState::BoundTx => "bound_tx",
            ConnectionState::BoundRx => "bound_rx",
            ConnectionState::BoundTrx => "bound_trx",
        };
        f.write_str(s)
    }
}

/// Tunables for a single [`Connection`]. See each field's doc comment for
/// the default that `ConnectionConfig::default()` supplies.
#[derive(Clone, Copy, Debug)]
pub struct ConnectionConfig {
    /// How long `connect`/`connect_with_config` wait for the TCP handshake.
    pub connect_timeout: Duration,
    /// How long `send_pdu` waits for a correlated response, and how long a
    /// pending entry may sit unanswered before `cleanup_loop` evicts it.
    pub read_timeout: Duration,
    /// How long a single write (including flush) may take before it's
    /// treated as a fault.
    pub write_timeout: Duration,
    /// Spacing between automatic `enquire_link` keep-alives.
    pub enquire_link_interval: Duration,
    /// Upper bound on the number of outstanding (sequence_number -> waiter)
    /// entries; the oldest entry is evicted to admit a new one past this.
    pub max_pending_pdus: usize,
    /// How often `cleanup_loop` sweeps the pending map for stale entries.
    pub cleanup_interval: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(30),
            write_timeout: Duration::from_secs(30),
            enquire_link_interval: Duration::from_secs(60),
            max_pending_pdus: 1000,
            cleanup_interval: Duration::from_secs(60),
        }
    }
}

/// Everything that can go wrong at the transport layer.
#[derive(thiserror::Error, Debug)]
pub enum ConnectionError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("timed out waiting for a response")]
    Timeout,
    #[error("pending request queue is full (max {max})")]
    QueueFull { max: usize },
    #[error("connection is closed")]
    Closed,
    #[error("unreachable: {0}")]
    Unreachable(String),
}

/// Result of one `try_parse_frame` attempt against the receive buffer.
enum ParseOutcome {
    /// A complete frame was parsed and the buffer advanced past it.
    Frame(Frame),
    /// Not enough bytes buffered yet for a complete PDU.
    NeedMore,
    /// A well-framed PDU failed to decode; the buffer has already been
    /// advanced past it. The caller answers with a `generic_nack` carrying
    /// `command_status` instead of tearing the connection down.
    Recoverable {
        command_status: CommandStatus,
        sequence_number: u32,
    },
}

struct PendingEntry {
    tx: oneshot::Sender<Result<Frame, ConnectionError>>,
    issued_at: Instant,
}

#[derive(Default)]
struct ConnectionTasks {
    receive: Option<JoinHandle<()>>,
    enquire_link: Option<JoinHandle<()>>,
    cleanup: Option<JoinHandle<()>>,
}

type ConnectionLostHook = dyn Fn(&ConnectionError) + Send + Sync;

struct Shared {
    state: AsyncMutex<ConnectionState>,
    sequence_counter: AtomicU32,
    pending: AsyncMutex<HashMap<u32, PendingEntry>>,
    writer: AsyncMutex<BufWriter<OwnedWriteHalf>>,
    tasks: AsyncMutex<ConnectionTasks>,
    config: ConnectionConfig,
    closed: AtomicBool,
    unsolicited_tx: mpsc::UnboundedSender<Frame>,
    on_connection_lost: std::sync::Mutex<Option<Arc<ConnectionLostHook>>>,
    enquires_sent: AtomicU32,
    enquires_acked: AtomicU32,
    consecutive_enquire_failures: AtomicU32,
}

/// Read-only snapshot of the connection's automatic `enquire_link` keepalive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeepaliveStatus {
    /// Number of automatic `enquire_link` PDUs sent so far.
    pub enquires_sent: u32,
    /// Number of those that were acknowledged before their timeout.
    pub enquires_acked: u32,
    /// Consecutive failures since the last successful round trip.
    pub consecutive_failures: u32,
}

/// A handle to a live SMPP transport connection.
///
/// Cheap to clone: every clone shares the same socket, pending map and
/// background tasks via an inner `Arc`.
#[derive(Clone)]
pub struct Connection {
    shared: Arc<Shared>,
}

impl Connection {
    /// Connect with the default [`ConnectionConfig`].
    pub async fn connect<A: ToSocketAddrs>(
        addr: A,
    ) -> Result<(Self, mpsc::UnboundedReceiver<Frame>), ConnectionError> {
        Self::connect_with_config(addr, ConnectionConfig::default()).await
    }

    /// Connect with an explicit [`ConnectionConfig`].
    pub async fn connect_with_config<A: ToSocketAddrs>(
        addr: A,
        config: ConnectionConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<Frame>), ConnectionError> {
        let stream = tokio::time::timeout(config.connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| ConnectionError::Timeout)??;
        Ok(Self::new(stream, config))
    }

    /// Wrap an already-connected socket. Spawns the three background tasks
    /// and returns the handle together with the receiving half of the
    /// unsolicited-frame channel (requests and events the caller didn't ask
    /// for a response to, e.g. inbound `deliver_sm` or `enquire_link`).
    pub fn new(
        stream: TcpStream,
        config: ConnectionConfig,
    ) -> (Self, mpsc::UnboundedReceiver<Frame>) {
        let (read_half, write_half) = stream.into_split();
        let (unsolicited_tx, unsolicited_rx) = mpsc::unbounded_channel();

        let shared = Arc::new(Shared {
            state: AsyncMutex::new(ConnectionState::Open),
            sequence_counter: AtomicU32::new(1),
            pending: AsyncMutex::new(HashMap::new()),
            writer: AsyncMutex::new(BufWriter::new(write_half)),
            tasks: AsyncMutex::new(ConnectionTasks::default()),
            config,
            closed: AtomicBool::new(false),
            unsolicited_tx,
            on_connection_lost: std::sync::Mutex::new(None),
            enquires_sent: AtomicU32::new(0),
            enquires_acked: AtomicU32::new(0),
            consecutive_enquire_failures: AtomicU32::new(0),
        });

        let conn = Connection { shared };

        let receive = tokio::spawn(conn.clone().receive_loop(read_half));
        let enquire_link = tokio::spawn(conn.clone().enquire_link_loop());
        let cleanup = tokio::spawn(conn.clone().cleanup_loop());

        {
            let mut tasks = conn
                .shared
                .tasks
                .try_lock()
                .expect("tasks mutex is uncontended immediately after construction");
            tasks.receive = Some(receive);
            tasks.enquire_link = Some(enquire_link);
            tasks.cleanup = Some(cleanup);
        }

        (conn, unsolicited_rx)
    }

    /// Install the hook invoked when a fault tears the connection down.
    /// Intended to be called once, right after construction.
    pub fn set_on_connection_lost<F>(&self, hook: F)
    where
        F: Fn(&ConnectionError) + Send + Sync + 'static,
    {
        *self.shared.on_connection_lost.lock().unwrap() = Some(Arc::new(hook));
    }

    /// The connection's current bind state.
    pub async fn state(&self) -> ConnectionState {
        *self.shared.state.lock().await
    }

    /// Record a new bind state, e.g. after a successful `bind_transmitter`.
    pub async fn set_bound_state(&self, state: ConnectionState) {
        *self.shared.state.lock().await = state;
    }

    /// Whether the connection has been torn down (by `disconnect` or a
    /// fault). Once true, it never becomes false again.
    pub fn is_connected(&self) -> bool {
        !self.shared.closed.load(Ordering::SeqCst)
    }

    /// Allocate the next outbound sequence number, wrapping from
    /// `0x7FFFFFFF` back to `1` (0 is reserved for "assign one now").
    pub fn next_sequence(&self) -> u32 {
        loop {
            let current = self.shared.sequence_counter.load(Ordering::Relaxed);
            let next = if current >= MAX_SEQUENCE_NUMBER {
                1
            } else {
                current + 1
            };
            if self
                .shared
                .sequence_counter
                .compare_exchange_weak(current, next, Ordering::Relaxed, Ordering::Relaxed)
                .is_ok()
            {
                return current;
            }
        }
    }

    /// Send a PDU, optionally correlating it with its response.
    ///
    /// If `frame`'s sequence number is 0 one is assigned before sending. When
    /// `wait_response` is true this registers a waiter keyed by that
    /// sequence number and awaits it (bounded by `timeout`, defaulting to
    /// `read_timeout`), returning the matching response frame. When false,
    /// the write completes the call.
    pub async fn send_pdu(
        &self,
        mut frame: Frame,
        wait_response: bool,
        timeout: Option<Duration>,
    ) -> Result<Option<Frame>, ConnectionError> {
        if self.shared.closed.load(Ordering::SeqCst) {
            return Err(ConnectionError::Closed);
        }

        if frame.sequence_number() == 0 {
            frame.set_sequence_number(self.next_sequence());
        }
        let seq = frame.sequence_number();

        let rx = if wait_response {
            let (tx, rx) = oneshot::channel();
            self.admit_pending(seq, tx).await;
            Some(rx)
        } else {
            None
        };

        let bytes = frame.to_bytes();
        let write_timeout = self.shared.config.write_timeout;
        let write_result = tokio::time::timeout(write_timeout, async {
            let mut writer = self.shared.writer.lock().await;
            writer.write_all(&bytes).await?;
            writer.flush().await
        })
        .await;

        if let Err(e) = match write_result {
            Ok(inner) => inner.map_err(ConnectionError::Io),
            Err(_) => Err(ConnectionError::Timeout),
        } {
            self.shared.pending.lock().await.remove(&seq);
            return Err(e);
        }

        match rx {
            None => Ok(None),
            Some(rx) => {
                let wait = timeout.unwrap_or(self.shared.config.read_timeout);
                match tokio::time::timeout(wait, rx).await {
                    Ok(Ok(Ok(response))) => Ok(Some(response)),
                    Ok(Ok(Err(e))) => Err(e),
                    Ok(Err(_)) => Err(ConnectionError::Closed),
                    Err(_) => {
                        self.shared.pending.lock().await.remove(&seq);
                        Err(ConnectionError::Timeout)
                    }
                }
            }
        }
    }

    /// Register a pending waiter, evicting the oldest entry first if the
    /// map is already at `max_pending_pdus`.
    async fn admit_pending(&self, seq: u32, tx: oneshot::Sender<Result<Frame, ConnectionError>>) {
        let mut pending = self.shared.pending.lock().await;
        let max = self.shared.config.max_pending_pdus;
        if pending.len() >= max {
            if let Some(oldest) = pending
                .iter()
                .min_by_key(|(_, entry)| entry.issued_at)
                .map(|(seq, _)| *seq)
            {
                if let Some(evicted) = pending.remove(&oldest) {
                    warn!(
                        sequence_number = oldest,
                        max, "evicting oldest pending PDU to admit a new one"
                    );
                    let _ = evicted.tx.send(Err(ConnectionError::QueueFull { max }));
                }
            }
        }
        pending.insert(
            seq,
            PendingEntry {
                tx,
                issued_at: Instant::now(),
            },
        );
    }

    /// Tear the connection down. Safe to call more than once or
    /// concurrently: only the first caller does any work.
    pub async fn disconnect(&self) {
        if self.shared.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        *self.shared.state.lock().await = ConnectionState::Closed;

        let (receive, enquire_link, cleanup) = {
            let mut tasks = self.shared.tasks.lock().await;
            (
                tasks.receive.take(),
                tasks.enquire_link.take(),
                tasks.cleanup.take(),
            )
        };
        if let Some(h) = receive {
            h.abort();
        }
        if let Some(h) = enquire_link {
            h.abort();
        }
        if let Some(h) = cleanup {
            h.abort();
        }

        {
            let mut writer = self.shared.writer.lock().await;
            let _ = writer.shutdown().await;
        }

        let mut pending = self.shared.pending.lock().await;
        for (_, entry) in pending.drain() {
            let _ = entry.tx.send(Err(ConnectionError::Closed));
        }
    }

    /// Handle a fatal error from one of the background tasks: notify the
    /// hook, then spawn (never directly await) the teardown so the task
    /// reporting the fault isn't asked to abort its own handle.
    async fn fault(&self, err: ConnectionError) {
        warn!(error = %err, "connection fault, tearing down");
        let hook = self.shared.on_connection_lost.lock().unwrap().clone();
        if let Some(hook) = hook {
            hook(&err);
        }
        let conn = self.clone();
        tokio::spawn(async move {
            conn.disconnect().await;
        });
    }

    /// Pull a complete frame out of `buffer` if one is there, without
    /// blocking for more socket data. Mirrors the teacher's mini-redis style
    /// check-then-parse framing, generalized to the full PDU registry.
    fn try_parse_frame(&self, buffer: &mut BytesMut) -> Result<ParseOutcome, CodecError> {
        let mut cursor = Cursor::new(&buffer[..]);
        match Frame::check(&mut cursor) {
            Ok(()) => match Frame::parse(&mut cursor) {
                Ok(frame) => {
                    let consumed = cursor.position() as usize;
                    buffer.advance(consumed);
                    Ok(ParseOutcome::Frame(frame))
                }
                // The header parsed fine apart from a command_id the wire
                // never defined; the frame is still well-formed enough to
                // skip cleanly and answer. Framing recovers by consuming
                // exactly `command_length` bytes rather than faulting the
                // whole connection over one unrecognized PDU.
                Err(CodecError::UnknownCommandId {
                    command_length,
                    command_id,
                    sequence_number,
                }) => {
                    let body = Bytes::copy_from_slice(
                        &buffer[PduHeader::SIZE..command_length as usize],
                    );
                    buffer.advance(command_length as usize);
                    Ok(ParseOutcome::Frame(Frame::Unknown {
                        command_id,
                        sequence_number,
                        body,
                    }))
                }
                // Header and body content errors on an otherwise well-framed
                // PDU (command_length already validated by `Frame::check`,
                // so the full PDU is buffered): recover with a generic_nack
                // instead of tearing the connection down, per spec §4.6/§7's
                // PDUError handling. `command_status` comes from the error's
                // own classification so the nack reflects what actually went
                // wrong rather than a blanket "bad command_id".
                Err(e @ (CodecError::InvalidPduLength { .. }
                | CodecError::InvalidCommandStatus(_)
                | CodecError::InvalidRequestStatus { .. }
                | CodecError::ReservedSequenceNumber(_)
                | CodecError::FieldValidation { .. }
                | CodecError::TlvError(_)
                | CodecError::Utf8Error { .. }
                | CodecError::Unterminated(_)
                | CodecError::StringTooLong(..))) => {
                    let command_length = u32::from_be_bytes(buffer[0..4].try_into().unwrap());
                    let sequence_number = u32::from_be_bytes(buffer[12..16].try_into().unwrap());
                    let command_status = e.to_command_status();
                    warn!(error = %e, sequence_number, "malformed PDU body, recovering with generic_nack");
                    buffer.advance(command_length as usize);
                    Ok(ParseOutcome::Recoverable {
                        command_status,
                        sequence_number,
                    })
                }
                Err(e) => Err(e),
            },
            Err(CodecError::Incomplete) => Ok(ParseOutcome::NeedMore),
            Err(e) => Err(e),
        }
    }

    /// Complete a pending waiter for a response frame, or forward an
    /// unsolicited frame to the owner's channel.
    async fn dispatch(&self, frame: Frame) {
        let seq = frame.sequence_number();
        if frame.is_response() {
            let waiter = self.shared.pending.lock().await.remove(&seq);
            match waiter {
                Some(entry) => {
                    let _ = entry.tx.send(Ok(frame));
                }
                None => {
                    debug!(
                        sequence_number = seq,
                        "dropping stale response with no matching waiter"
                    );
                }
            }
            return;
        }

        if self.shared.unsolicited_tx.send(frame).is_err() {
            trace!("unsolicited frame dropped, owner channel closed");
        }
    }

    async fn receive_loop(self, mut read_half: OwnedReadHalf) {
        let mut buffer = BytesMut::with_capacity(4096);
        let config = self.shared.config;
        let read_timeout = std::cmp::max(
            config.read_timeout,
            config.enquire_link_interval + Duration::from_secs(10),
        );

        loop {
            loop {
                match self.try_parse_frame(&mut buffer) {
                    Ok(ParseOutcome::Frame(frame)) => self.dispatch(frame).await,
                    Ok(ParseOutcome::NeedMore) => break,
                    Ok(ParseOutcome::Recoverable {
                        command_status,
                        sequence_number,
                    }) => {
                        let nack = Frame::GenericNack(GenericNack::new(
                            command_status,
                            sequence_number,
                        ));
                        if let Err(e) = self.send_pdu(nack, false, None).await {
                            warn!(error = %e, "failed to send generic_nack for malformed PDU");
                        }
                    }
                    Err(e) => {
                        self.fault(ConnectionError::Codec(e)).await;
                        return;
                    }
                }
            }

            let read = tokio::time::timeout(read_timeout, read_half.read_buf(&mut buffer)).await;
            match read {
                Ok(Ok(0)) => {
                    let err = if buffer.is_empty() {
                        ConnectionError::Closed
                    } else {
                        ConnectionError::Io(io::Error::new(
                            io::ErrorKind::UnexpectedEof,
                            "peer closed connection mid-frame",
                        ))
                    };
                    self.fault(err).await;
                    return;
                }
                Ok(Ok(_)) => continue,
                Ok(Err(e)) => {
                    self.fault(ConnectionError::Io(e)).await;
                    return;
                }
                Err(_) => {
                    self.fault(ConnectionError::Timeout).await;
                    return;
                }
            }
        }
    }

    async fn enquire_link_loop(self) {
        let interval = self.shared.config.enquire_link_interval;
        loop {
            tokio::time::sleep(interval).await;
            if self.shared.closed.load(Ordering::SeqCst) {
                return;
            }

            let seq = self.next_sequence();
            let frame = Frame::EnquireLink(EnquireLink::new(seq));
            self.shared.enquires_sent.fetch_add(1, Ordering::Relaxed);
            match self
                .send_pdu(frame, true, Some(Duration::from_secs(10)))
                .await
            {
                Ok(_) => {
                    trace!("enquire_link keep-alive acknowledged");
                    self.shared.enquires_acked.fetch_add(1, Ordering::Relaxed);
                    self.shared
                        .consecutive_enquire_failures
                        .store(0, Ordering::Relaxed);
                }
                Err(e) => {
                    self.shared
                        .consecutive_enquire_failures
                        .fetch_add(1, Ordering::Relaxed);
                    self.fault(e).await;
                    return;
                }
            }
        }
    }

    /// Snapshot of the automatic keepalive's running counters.
    pub fn keepalive_status(&self) -> KeepaliveStatus {
        KeepaliveStatus {
            enquires_sent: self.shared.enquires_sent.load(Ordering::Relaxed),
            enquires_acked: self.shared.enquires_acked.load(Ordering::Relaxed),
            consecutive_failures: self
                .shared
                .consecutive_enquire_failures
                .load(Ordering::Relaxed),
        }
    }

    async fn cleanup_loop(self) {
        let interval = self.shared.config.cleanup_interval;
        loop {
            tokio::time::sleep(interval).await;
            if self.shared.closed.load(Ordering::SeqCst) {
                return;
            }

            let stale_after = self.shared.config.read_timeout;
            let max = self.shared.config.max_pending_pdus;
            let mut pending = self.shared.pending.lock().await;

            let now = Instant::now();
            let stale: Vec<u32> = pending
                .iter()
                .filter(|(_, entry)| now.duration_since(entry.issued_at) > stale_after)
                .map(|(seq, _)| *seq)
                .collect();
            for seq in stale {
                if let Some(entry) = pending.remove(&seq) {
                    let _ = entry.tx.send(Err(ConnectionError::Timeout));
                }
            }

            while pending.len() > max {
                let oldest = pending
                    .iter()
                    .min_by_key(|(_, entry)| entry.issued_at)
                    .map(|(seq, _)| *seq);
                match oldest {
                    Some(seq) => {
                        if let Some(entry) = pending.remove(&seq) {
                            let _ = entry.tx.send(Err(ConnectionError::QueueFull { max }));
                        }
                    }
                    None => break,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::EnquireLinkResponse;

    fn test_config() -> ConnectionConfig {
        ConnectionConfig {
            connect_timeout: Duration::from_millis(200),
            read_timeout: Duration::from_millis(200),
            write_timeout: Duration::from_millis(200),
            enquire_link_interval: Duration::from_secs(3600),
            max_pending_pdus: 2,
            cleanup_interval: Duration::from_secs(3600),
        }
    }

    async fn connected_pair() -> (Connection, mpsc::UnboundedReceiver<Frame>, TcpStream) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client_fut = TcpStream::connect(addr);
        let (client, server) =
            tokio::join!(client_fut, async { listener.accept().await.unwrap().0 });
        let (conn, rx) = Connection::new(client.unwrap(), test_config());
        (conn, rx, server)
    }

    #[tokio::test]
    async fn sequence_allocation_wraps_before_overflow() {
        let (conn, _rx, _server) = connected_pair().await;
        conn.shared
            .sequence_counter
            .store(MAX_SEQUENCE_NUMBER, Ordering::Relaxed);
        assert_eq!(conn.next_sequence(), MAX_SEQUENCE_NUMBER);
        assert_eq!(conn.next_sequence(), 1);
        assert_eq!(conn.next_sequence(), 2);
        conn.disconnect().await;
    }

    #[tokio::test]
    async fn disconnect_is_idempotent() {
        let (conn, _rx, _server) = connected_pair().await;
        conn.disconnect().await;
        conn.disconnect().await;
        assert!(!conn.is_connected());
    }

    #[tokio::test]
    async fn send_pdu_correlates_response_by_sequence_number() {
        let (conn, _rx, mut server) = connected_pair().await;

        let responder = tokio::spawn(async move {
            let mut header = [0u8; 16];
            server.read_exact(&mut header).await.unwrap();
            let seq = u32::from_be_bytes([header[12], header[13], header[14], header[15]]);
            let resp = Frame::EnquireLinkResp(EnquireLinkResponse::new(seq));
            server.write_all(&resp.to_bytes()).await.unwrap();
        });

        let seq = conn.next_sequence();
        let frame = Frame::EnquireLink(EnquireLink::new(seq));
        let response = conn
            .send_pdu(frame, true, Some(Duration::from_secs(2)))
            .await
            .unwrap()
            .expect("expected a correlated response");

        assert_eq!(response.sequence_number(), seq);
        assert!(response.is_response());

        responder.await.unwrap();
        conn.disconnect().await;
    }

    #[tokio::test]
    async fn pending_map_evicts_oldest_when_full() {
        let (conn, _rx, _server) = connected_pair().await;

        let (tx1, rx1) = oneshot::channel();
        let (tx2, rx2) = oneshot::channel();
        let (tx3, rx3) = oneshot::channel();
        conn.admit_pending(1, tx1).await;
        conn.admit_pending(2, tx2).await;
        conn.admit_pending(3, tx3).await;

        assert_eq!(conn.shared.pending.lock().await.len(), 2);
        assert!(matches!(
            rx1.await.unwrap(),
            Err(ConnectionError::QueueFull { max: 2 })
        ));
        drop(rx2);
        drop(rx3);

        conn.disconnect().await;
    }

    #[tokio::test]
    async fn disconnect_fails_pending_waiters() {
        let (conn, _rx, _server) = connected_pair().await;
        let (tx, rx) = oneshot::channel();
        conn.admit_pending(7, tx).await;
        conn.disconnect().await;
        assert!(matches!(rx.await.unwrap(), Err(ConnectionError::Closed)));
    }

    #[tokio::test]
    async fn unknown_command_id_is_recovered_not_faulted() {
        let (conn, mut rx, mut server) = connected_pair().await;

        // 0x0000000A is reserved: no CommandId variant claims it.
        let mut pdu = Vec::new();
        pdu.extend_from_slice(&20u32.to_be_bytes()); // command_length
        pdu.extend_from_slice(&0x0000_000Au32.to_be_bytes()); // command_id
        pdu.extend_from_slice(&0u32.to_be_bytes()); // command_status
        pdu.extend_from_slice(&7u32.to_be_bytes()); // sequence_number
        pdu.extend_from_slice(&[0xAA, 0xBB, 0xCC, 0xDD]); // body
        server.write_all(&pdu).await.unwrap();

        let frame = rx.recv().await.expect("frame forwarded, not dropped");
        match frame {
            Frame::Unknown {
                command_id,
                sequence_number,
                body,
            } => {
                assert_eq!(command_id, 0x0000_000A);
                assert_eq!(sequence_number, 7);
                assert_eq!(body.as_ref(), &[0xAA, 0xBB, 0xCC, 0xDD]);
            }
            other => panic!("expected Frame::Unknown, got {other:?}"),
        }

        // The connection must still be usable afterwards: one bad PDU
        // does not tear down the whole session.
        assert!(conn.is_connected());
        conn.disconnect().await;
    }

    #[tokio::test]
    async fn malformed_body_on_known_command_gets_generic_nack_not_fault() {
        let (conn, _rx, mut server) = connected_pair().await;

        // enquire_link is a recognized, body-less command_id, but 0 is a
        // reserved sequence_number: the header decodes far enough to know
        // command_id and sequence_number, then fails.
        let mut pdu = Vec::new();
        pdu.extend_from_slice(&16u32.to_be_bytes()); // command_length
        pdu.extend_from_slice(&0x0000_0015u32.to_be_bytes()); // command_id: enquire_link
        pdu.extend_from_slice(&0u32.to_be_bytes()); // command_status
        pdu.extend_from_slice(&0u32.to_be_bytes()); // sequence_number (reserved)
        server.write_all(&pdu).await.unwrap();

        let mut response_header = [0u8; PduHeader::SIZE];
        server.read_exact(&mut response_header).await.unwrap();
        let command_id = u32::from_be_bytes(response_header[4..8].try_into().unwrap());
        assert_eq!(command_id, 0x8000_0000); // generic_nack

        // The connection stays usable: a malformed body does not fault it.
        assert!(conn.is_connected());
        conn.disconnect().await;
    }
}
