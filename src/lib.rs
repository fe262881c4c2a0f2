//! # eslink
//!
//! A client for the event socket of a telephony switch:
//! - Header-framed text protocol with length-prefixed bodies
//! - Password handshake guarded by a timeout
//! - Blocking `api` calls and background `bgapi` jobs
//! - Event subscriptions delivered over a channel
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Caller threads                           │
//! │        api / job / subscribe / filter / sendevent           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ write (request lock)     ▲ reply
//! ┌─────────────────────▼──────────────────────────┴────────────┐
//! │                       Client                                │
//! │        reply channel (rendezvous) + error channel           │
//! └─────────────────────┬──────────────────────────▲────────────┘
//!                       │                          │
//!                       ▼                          │
//!               ┌──────────────┐          ┌────────┴───────┐
//!               │  Connection  │─────────▶│ Reader thread  │──▶ event sink
//!               │ (write lock) │  frames  │  (dispatcher)  │
//!               └──────┬───────┘          └────────────────┘
//!                      │
//!                      ▼
//!                 TCP stream
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use eslink::{Client, Config};
//!
//! let (tx, rx) = crossbeam::channel::bounded(16);
//! let config = Config::builder().events(tx, true).build();
//! let client = Client::connect("127.0.0.1", "ClueCon", config)?;
//!
//! println!("{}", client.api("status")?);
//! client.subscribe(&["BACKGROUND_JOB"])?;
//! let job = client.job("uptime s")?;
//!
//! for event in rx.iter() {
//!     if event.job_uuid() == job {
//!         println!("{}", event.body_str());
//!         break;
//!     }
//! }
//! client.close()?;
//! # Ok::<(), eslink::EslError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{EslError, Result};
pub use config::Config;
pub use client::{Client, ClientState};
pub use protocol::{Command, Event, Response};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of eslink
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
