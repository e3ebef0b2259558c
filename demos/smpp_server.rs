// ABOUTME: Example SMSC server demonstrating ServerListener with a fixed-credential authenticator
// ABOUTME: Shows bind/submit_sm lifecycle hooks and signal-driven graceful shutdown

//! # Example SMSC Server
//!
//! Accepts ESME connections, authenticates against one configured
//! `system_id`/`password` pair, and logs bind/submit_sm/disconnect events
//! through [`ServerHooks`]. `Ctrl-C` triggers the six-phase graceful
//! shutdown described in spec.md §4.7.1.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --example smpp_server -- --system-id test --password secret
//! ```

use argh::FromArgs;
use smpp::server::{Authenticator, ServerConfig, ServerHooks, ServerListener};
use std::error::Error;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Example SMSC server accepting a single configured system_id/password pair
#[derive(FromArgs)]
struct CliArgs {
    /// whether or not to enable debugging
    #[argh(switch, short = 'd')]
    debugging: bool,

    /// the interface to bind the listening socket to (default: 0.0.0.0)
    #[argh(option)]
    host: Option<String>,

    /// the port to listen on (default: 2775)
    #[argh(option, short = 'p')]
    port: Option<u16>,

    /// the system_id this SMSC accepts (default: accept every system_id)
    #[argh(option)]
    system_id: Option<String>,

    /// the password this SMSC requires for `system_id` (default: accept any password)
    #[argh(option)]
    password: Option<String>,
}

/// Accepts only the configured `system_id`/`password` pair; if either is
/// unset, that field is not checked (an empty configuration accepts
/// everything, matching the library's `AllowAllAuthenticator` default).
struct FixedCredentialAuthenticator {
    system_id: Option<String>,
    password: Option<String>,
}

impl Authenticator for FixedCredentialAuthenticator {
    async fn authenticate(&self, system_id: &str, password: &str, _system_type: &str) -> bool {
        if let Some(expected) = &self.system_id {
            if expected != system_id {
                return false;
            }
        }
        if let Some(expected) = &self.password {
            if expected != password {
                return false;
            }
        }
        true
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli_args: CliArgs = argh::from_env();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli_args.debugging {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");

    let host = cli_args.host.unwrap_or_else(|| "0.0.0.0".to_owned());
    let port = cli_args.port.unwrap_or(2775);
    let config = ServerConfig::new(host, port).with_system_id("SMSC");

    let hooks = ServerHooks {
        on_client_connected: Some(Arc::new(|client_key: &str| {
            info!(%client_key, "client connected");
        })),
        on_client_bound: Some(Arc::new(|client_key: &str, info_: &smpp::server::BindInfo| {
            info!(%client_key, system_id = %info_.system_id, bind_type = ?info_.bind_type, "client bound");
        })),
        on_client_disconnected: Some(Arc::new(|client_key: &str| {
            info!(%client_key, "client disconnected");
        })),
        on_message_received: Some(Arc::new(|client_key: &str, pdu: &smpp::datatypes::SubmitSm| {
            info!(%client_key, sequence_number = pdu.sequence_number, "submit_sm received");
            None
        })),
        on_deliver_sm: None,
        on_shutdown_complete: Some(Arc::new(|| {
            info!("graceful shutdown complete");
        })),
    };

    let authenticator = FixedCredentialAuthenticator {
        system_id: cli_args.system_id,
        password: cli_args.password,
    };

    let listener = Arc::new(ServerListener::with_authenticator(config, authenticator, hooks));

    let shutdown_listener = Arc::clone(&listener);
    let shutdown_task = tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("ctrl-c received, starting graceful shutdown");
        shutdown_listener.stop().await;
    });

    info!("serving until interrupted");
    listener.serve().await?;
    let _ = shutdown_task.await;
    Ok(())
}
