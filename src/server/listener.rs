// ABOUTME: Accept loop, session registry, and six-phase graceful shutdown for the SMSC role
// ABOUTME: Grounded on other_examples' ZedSquad smsc.rs listen_loop/Semaphore admission and original_source's _graceful_client_shutdown

use crate::connection::{Connection, ConnectionConfig};
use crate::datatypes::*;
use crate::server::config::{ServerConfig, ShutdownNotification};
use crate::server::error::ServerResult;
use crate::server::hooks::{AllowAllAuthenticator, Authenticator, ServerHooks};
use crate::server::session::{run_session, MessageIdAllocator, ServerSession};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::{Mutex as AsyncMutex, Notify, Semaphore, TryAcquireError};
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Accepts sockets, enforces `max_connections`, registers sessions, and
/// coordinates the graceful shutdown protocol (spec.md §4.7, §4.7.1).
pub struct ServerListener<A: Authenticator = AllowAllAuthenticator> {
    config: ServerConfig,
    authenticator: Arc<A>,
    hooks: ServerHooks,
    sessions: Arc<AsyncMutex<HashMap<String, Arc<ServerSession>>>>,
    message_ids: Arc<MessageIdAllocator>,
    quiesce: Arc<Notify>,
    shutdown_started: Arc<AtomicBool>,
    shutdown_done: Arc<Notify>,
}

impl ServerListener<AllowAllAuthenticator> {
    /// A listener that accepts every bind attempt. Replace with
    /// [`ServerListener::with_authenticator`] for real deployments.
    pub fn new(config: ServerConfig, hooks: ServerHooks) -> Self {
        Self::with_authenticator(config, AllowAllAuthenticator, hooks)
    }
}

impl<A: Authenticator + 'static> ServerListener<A> {
    pub fn with_authenticator(config: ServerConfig, authenticator: A, hooks: ServerHooks) -> Self {
        Self {
            config,
            authenticator: Arc::new(authenticator),
            hooks,
            sessions: Arc::new(AsyncMutex::new(HashMap::new())),
            message_ids: Arc::new(MessageIdAllocator::default()),
            quiesce: Arc::new(Notify::new()),
            shutdown_started: Arc::new(AtomicBool::new(false)),
            shutdown_done: Arc::new(Notify::new()),
        }
    }

    /// Bind the listening socket and run the accept loop until [`ServerListener::stop`]
    /// is called (from this task or another holding a clone of the returned handle).
    pub async fn serve(&self) -> ServerResult<()> {
        let listener = TcpListener::bind((self.config.host.as_str(), self.config.port)).await?;
        info!(host = %self.config.host, port = self.config.port, "server listening");
        let sem = Arc::new(Semaphore::new(self.config.max_connections));

        // Pinned once outside the loop: a fresh `notified()` per iteration
        // would drop its registration between iterations and could miss a
        // `stop()` landing in that gap.
        tokio::pin! {
            let quiesced = self.quiesce.notified();
        }

        loop {
            tokio::select! {
                _ = &mut quiesced => {
                    info!("quiesced, no longer accepting new connections");
                    return Ok(());
                }
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => self.admit(stream, addr, &sem),
                        Err(e) => warn!(error = %e, "accept failed"),
                    }
                }
            }
        }
    }

    fn admit(&self, stream: tokio::net::TcpStream, addr: std::net::SocketAddr, sem: &Arc<Semaphore>) {
        let permit = match Arc::clone(sem).try_acquire_owned() {
            Ok(permit) => permit,
            Err(TryAcquireError::NoPermits) => {
                warn!(%addr, "refused connection: max_connections reached");
                return;
            }
            Err(TryAcquireError::Closed) => {
                warn!("semaphore closed, dropping connection");
                return;
            }
        };

        let client_key = addr.to_string();
        let (connection, unsolicited_rx) =
            Connection::new(stream, ConnectionConfig::default());
        let session = ServerSession::new(connection, client_key.clone());

        let sessions = Arc::clone(&self.sessions);
        let hooks = self.hooks.clone();
        let authenticator = Arc::clone(&self.authenticator);
        let message_ids = Arc::clone(&self.message_ids);
        let server_system_id = self.config.system_id.clone();

        tokio::spawn(async move {
            let _permit = permit;
            sessions
                .lock()
                .await
                .insert(client_key.clone(), Arc::clone(&session));

            if let Some(hook) = &hooks.on_client_connected {
                hook(&client_key);
            }

            run_session(
                Arc::clone(&session),
                unsolicited_rx,
                server_system_id,
                authenticator,
                hooks,
                message_ids,
            )
            .await;

            sessions.lock().await.remove(&client_key);
        });
    }

    /// Send `deliver_sm` to the bound receiver/transceiver session identified
    /// by `target_system_id`. Returns `false` if no such session is bound or
    /// the response wasn't `ESME_ROK` within 30s.
    pub async fn send_to_system_id(
        &self,
        target_system_id: &str,
        source_addr: &str,
        text: &str,
    ) -> bool {
        let target = self.find_bound_receiver(target_system_id).await;
        match target {
            Some(session) => deliver_to(&session, source_addr, text).await,
            None => false,
        }
    }

    /// `deliver_sm` to every bound receiver/transceiver concurrently.
    /// Returns `(success_count, failure_count)`; a per-client failure never
    /// aborts the rest of the broadcast.
    pub async fn broadcast_message(&self, source_addr: &str, text: &str) -> (usize, usize) {
        let targets: Vec<Arc<ServerSession>> = {
            let sessions = self.sessions.lock().await;
            let mut out = Vec::new();
            for session in sessions.values() {
                if session.can_receive().await {
                    out.push(Arc::clone(session));
                }
            }
            out
        };

        let mut set = JoinSet::new();
        for session in targets {
            let source_addr = source_addr.to_string();
            let text = text.to_string();
            set.spawn(async move { deliver_to(&session, &source_addr, &text).await });
        }

        let (mut success, mut failure) = (0usize, 0usize);
        while let Some(result) = set.join_next().await {
            match result {
                Ok(true) => success += 1,
                _ => failure += 1,
            }
        }
        (success, failure)
    }

    async fn find_bound_receiver(&self, target_system_id: &str) -> Option<Arc<ServerSession>> {
        let sessions = self.sessions.lock().await;
        for session in sessions.values() {
            if session.can_receive().await && session.system_id().await.as_deref() == Some(target_system_id)
            {
                return Some(Arc::clone(session));
            }
        }
        None
    }

    async fn bound_session_count(&self) -> usize {
        let sessions = self.sessions.lock().await;
        let mut count = 0;
        for session in sessions.values() {
            if session.is_bound() {
                count += 1;
            }
        }
        count
    }

    async fn notify_bound_clients(&self) {
        let targets: Vec<Arc<ServerSession>> = {
            let sessions = self.sessions.lock().await;
            sessions
                .values()
                .filter(|s| s.is_bound())
                .cloned()
                .collect()
        };

        for session in targets {
            match &self.config.shutdown_notification {
                ShutdownNotification::Unbind => {
                    let seq = session.connection.next_sequence();
                    let frame = Frame::Unbind(Unbind {
                        command_status: CommandStatus::Ok,
                        sequence_number: seq,
                    });
                    if let Err(e) = session.connection.send_pdu(frame, false, None).await {
                        warn!(error = %e, "failed to send shutdown unbind notification");
                    }
                }
                ShutdownNotification::AdvisoryDeliverSm { text } => {
                    let _ = deliver_to(&session, "SMSC", text).await;
                }
            }
        }
    }

    /// Trigger the six-phase graceful shutdown (spec.md §4.7.1). Idempotent:
    /// a second caller while shutdown is already underway awaits the first
    /// caller's completion rather than re-running the phases.
    pub async fn stop(&self) {
        if self.shutdown_started.swap(true, Ordering::SeqCst) {
            self.shutdown_done.notified().await;
            return;
        }

        // Phase 1: quiesce.
        self.quiesce.notify_waiters();

        // Phase 2: notify bound clients.
        self.notify_bound_clients().await;

        // Phase 3 + 4: grace period, with a reminder partway through.
        let grace = self.config.grace_period;
        let reminder_at = grace.saturating_sub(self.config.reminder_delay);
        let poll_interval = Duration::from_millis(100);
        let start = Instant::now();
        let mut reminder_sent = false;

        while start.elapsed() < grace {
            if self.bound_session_count().await == 0 {
                break;
            }
            if !reminder_sent && start.elapsed() >= reminder_at {
                self.notify_bound_clients().await;
                reminder_sent = true;
            }
            let remaining = grace - start.elapsed();
            tokio::time::sleep(poll_interval.min(remaining)).await;
        }

        // Phase 5: force-disconnect whatever remains, bounded by shutdown_timeout.
        let stragglers: Vec<Arc<ServerSession>> = {
            let sessions = self.sessions.lock().await;
            sessions.values().cloned().collect()
        };
        if !stragglers.is_empty() {
            let force = async move {
                let mut set = JoinSet::new();
                for session in stragglers {
                    set.spawn(async move { session.connection.disconnect().await });
                }
                while set.join_next().await.is_some() {}
            };
            if tokio::time::timeout(self.config.shutdown_timeout, force)
                .await
                .is_err()
            {
                warn!("shutdown_timeout elapsed before all sessions force-disconnected");
            }
        }

        // Phase 6: drain.
        self.sessions.lock().await.clear();
        if let Some(hook) = &self.hooks.on_shutdown_complete {
            hook();
        }
        self.shutdown_done.notify_waiters();
    }
}

use crate::codec::Frame;

async fn deliver_to(session: &Arc<ServerSession>, source_addr: &str, text: &str) -> bool {
    let seq = session.connection.next_sequence();
    let pdu = match DeliverSm::builder()
        .sequence_number(seq)
        .source_addr(source_addr)
        .destination_addr(session.system_id().await.as_deref().unwrap_or(""))
        .short_message(text)
        .build()
    {
        Ok(pdu) => pdu,
        Err(e) => {
            warn!(error = %e, "failed to build advisory deliver_sm");
            return false;
        }
    };

    let frame = Frame::DeliverSm(Box::new(pdu));
    match session
        .connection
        .send_pdu(frame, true, Some(Duration::from_secs(30)))
        .await
    {
        Ok(Some(Frame::DeliverSmResp(resp))) => resp.command_status == CommandStatus::Ok,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::hooks::ServerHooks;

    #[tokio::test]
    async fn stop_is_idempotent_with_no_sessions() {
        let listener = ServerListener::new(
            ServerConfig::new("127.0.0.1", 0).with_grace_period(Duration::from_millis(10)),
            ServerHooks::default(),
        );
        listener.stop().await;
        listener.stop().await;
        assert_eq!(listener.bound_session_count().await, 0);
    }
}
