//! Showroom API Library Crate
//!
//! This library contains all the logic for the sales-assistant web service:
//! configuration, the session registry, HTTP handlers, WebSocket session
//! handling, and routing. The `api` binary is a thin wrapper around this
//! library.

pub mod config;
pub mod handlers;
pub mod registry;
pub mod router;
pub mod state;
pub mod ws;
