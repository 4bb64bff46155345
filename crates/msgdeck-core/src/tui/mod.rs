//! Terminal dashboard for the gateway backend
//!
//! Strict separation between UI and data access, with the event loop owning
//! all state:
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                App (event loop)                 │
//! │  ┌────────────┐   ┌────────────┐                │
//! │  │   Views    │ ← │ ViewState  │                │
//! │  └────────────┘   └────────────┘                │
//! └─────────────────────────────────────────────────┘
//!              │
//!              ▼
//! ┌─────────────────────────────────────────────────┐
//! │              GatewayClient (trait)              │
//! │   fetch_status() | fetch_qr() | send_text()...  │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! The app polls on a fixed cadence and redraws from scratch; a new cycle
//! supersedes the previous render wholesale. Views are pure functions over
//! `&ViewState`, so the whole screen partition is testable with a mock
//! client and no terminal.

mod app;
mod views;

pub use app::{App, AppConfig, TuiError, TuiResult, run_tui};
pub use views::{Screen, Tab, ViewState};
