//! Core library for msgdeck, a terminal dashboard for a WhatsApp-gateway
//! backend.
//!
//! The gateway backend owns all real logic (session lifecycle, pairing,
//! message delivery); this crate is a thin client over its HTTP surface:
//!
//! - [`client`] — the [`GatewayClient`] trait and the production
//!   [`HttpGatewayClient`] built on blocking reqwest.
//! - [`state`] — the connection-state model polled from the backend, plus
//!   the transient outbound message types.
//! - [`qr`] — pairing-code rendering as a scannable terminal QR.
//! - [`tui`] — the ratatui dashboard (event loop + views).
//! - [`config`] — `msgdeck.toml` loading with serde defaults.
//!
//! The client is deliberately synchronous: one blocking request per render
//! cycle, short fixed timeouts, no in-flight concurrency. Every failure is
//! terminal for its cycle only; the next poll starts from scratch.

pub mod client;
pub mod config;
pub mod qr;
pub mod state;
pub mod tui;

pub use client::{GatewayClient, GatewayError, HttpGatewayClient};
pub use config::Config;
pub use qr::PairingQr;
pub use state::{BackendStatus, ConnectionState, MediaMessage, StatusSnapshot, TextMessage};
