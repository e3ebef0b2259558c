// ABOUTME: Long-running SMPP client example demonstrating the connection engine's keepalive
// ABOUTME: Shows how to monitor enquire_link health and send SMS on an interval in production

//! # Long-Running SMPP Client
//!
//! The connection engine already runs its `enquire_link` keepalive as a
//! background task (spec.md §4.4.2); this example just polls
//! [`SmppClient::keep_alive_status`] to report on it and optionally sends a
//! periodic SMS.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --example long_running_client -- --system-id test --password secret
//!
//! cargo run --example long_running_client -- \
//!   --system-id test --password secret \
//!   --to 123456789 --from 987654321 --sms-interval 120
//! ```

use argh::FromArgs;
use smpp::client::{BindCredentials, ClientOptions, SmppClient, SmppConnection, SmppTransmitter, SmsMessage};
use std::error::Error;
use std::time::Duration;
use tokio::time::{interval, sleep};
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Long-running SMPP client monitoring the automatic enquire_link keepalive
#[derive(FromArgs)]
struct CliArgs {
    /// whether or not to enable debugging
    #[argh(switch, short = 'd')]
    debugging: bool,

    /// the system id
    #[argh(option)]
    system_id: Option<String>,

    /// the password
    #[argh(option)]
    password: Option<String>,

    /// the hostname or IP address of the SMSC (default: localhost)
    #[argh(option)]
    host: Option<String>,

    /// the port to use when connecting to the SMSC (default: 2775)
    #[argh(option, short = 'p')]
    port: Option<u32>,

    /// enquire_link interval in seconds (default: 60, per the connection engine's default)
    #[argh(option)]
    keep_alive_interval: Option<u64>,

    /// how long to run the client in seconds (default: 300, i.e. 5 minutes)
    #[argh(option)]
    run_duration: Option<u64>,

    /// interval between SMS sends in seconds (default: 60)
    #[argh(option)]
    sms_interval: Option<u64>,

    /// the recipient telephone number (optional - no SMS sent if not provided)
    #[argh(option, short = 't')]
    to: Option<String>,

    /// the telephone number that the message will be from (optional)
    #[argh(option, short = 'f')]
    from: Option<String>,
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

    let host = cli_args.host.unwrap_or_else(|| "localhost".to_owned());
    let port = cli_args.port.unwrap_or(2775);
    let system_id = cli_args.system_id.unwrap_or_default();
    let password = cli_args.password.unwrap_or_default();
    let run_duration = Duration::from_secs(cli_args.run_duration.unwrap_or(300));
    let sms_interval = Duration::from_secs(cli_args.sms_interval.unwrap_or(60));

    info!("Starting long-running SMPP client");
    info!("Connecting to {host}:{port}");
    info!("Will run for {} seconds", run_duration.as_secs());

    let mut options = ClientOptions::new();
    if let Some(secs) = cli_args.keep_alive_interval {
        options = options.with_enquire_link_interval(Duration::from_secs(secs));
    }

    let credentials = BindCredentials::transmitter(system_id, password);
    let mut client = options
        .build_transmitter(format!("{host}:{port}"), credentials)
        .await
        .map_err(|e| {
            error!("connect/bind failed: {e}");
            Box::<dyn Error>::from(e.to_string())
        })?;

    info!("Connected and bound successfully");

    let send_messages = cli_args.to.is_some() && cli_args.from.is_some();
    let mut sms_timer = if send_messages {
        Some(interval(sms_interval))
    } else {
        None
    };

    let mut status_timer = interval(Duration::from_secs(5));
    let start_time = std::time::Instant::now();
    let mut message_count = 0u32;

    info!("Entering main loop");

    loop {
        tokio::select! {
            _ = sleep(run_duration.saturating_sub(start_time.elapsed())) => {
                info!("Run duration elapsed, shutting down");
                break;
            }

            _ = status_timer.tick() => {
                let status = client.keep_alive_status();
                debug!(
                    "keepalive: sent={} acked={} consecutive_failures={}",
                    status.total_pings, status.total_pongs, status.consecutive_failures
                );
                if status.consecutive_failures > 0 {
                    warn!("enquire_link has failed {} time(s) in a row", status.consecutive_failures);
                }
            }

            _ = async {
                if let Some(ref mut timer) = sms_timer {
                    timer.tick().await;
                } else {
                    std::future::pending::<()>().await
                }
            } => {
                if let (Some(to), Some(from)) = (&cli_args.to, &cli_args.from) {
                    message_count += 1;
                    let text = format!("Test message #{message_count} from long-running client");
                    let sms = SmsMessage::new(to, from, &text);
                    match client.send_sms(&sms).await {
                        Ok(message_id) => info!("message {message_count} sent, id={message_id}"),
                        Err(e) => error!("failed to send message {message_count}: {e}"),
                    }
                }
            }
        }
    }

    info!("Shutting down client");
    if let Err(e) = client.unbind().await {
        warn!("unbind failed: {e}");
    }
    if let Err(e) = client.disconnect().await {
        warn!("disconnect failed: {e}");
    }

    let final_status = client.keep_alive_status();
    info!("final keepalive: sent={} acked={}", final_status.total_pings, final_status.total_pongs);
    info!("total SMS messages sent: {message_count}");
    info!("client ran for {:.1} seconds", start_time.elapsed().as_secs_f64());

    Ok(())
}
