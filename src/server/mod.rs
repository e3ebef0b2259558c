// ABOUTME: SMSC server module: accept loop, per-connection session dispatch, shutdown coordination
// ABOUTME: Exports the listener, its configuration, authenticator/hooks traits, and per-session types

//! SMPP Server Module
//!
//! The server side of the engine (spec.md §4.6, §4.7): one [`ServerListener`]
//! accepts sockets, hands each off to a [`ServerSession`] that enforces the
//! bind/submit_sm/enquire_link dispatch table, and coordinates the six-phase
//! graceful shutdown protocol across every bound session.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use smpp::server::{ServerConfig, ServerHooks, ServerListener};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::new("0.0.0.0", 2775).with_system_id("SMSC");
//! let listener = ServerListener::new(config, ServerHooks::default());
//! listener.serve().await?;
//! # Ok(())
//! # }
//! ```
//!
//! Replace [`hooks::AllowAllAuthenticator`] with a real [`Authenticator`] via
//! [`ServerListener::with_authenticator`] before accepting production traffic.

pub mod config;
pub mod error;
pub mod hooks;
pub mod listener;
pub mod session;

pub use config::{ServerConfig, ShutdownNotification};
pub use error::{AuthenticationError, ServerError, ServerResult, ThrottlingError};
pub use hooks::{AllowAllAuthenticator, Authenticator, ServerHooks};
pub use listener::ServerListener;
pub use session::{BindInfo, MessageIdAllocator, ServerSession};
