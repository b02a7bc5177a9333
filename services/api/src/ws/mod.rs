//! WebSocket session handling.
//!
//! This module contains the real-time core of the service, structured into
//! submodules:
//!
//! - `protocol`: the JSON envelope format for client-server frames.
//! - `session`: the per-connection lifecycle, from registration to teardown.
//! - `turn`: one user input driven through the agent to a classified outcome.
//! - `stream`: paced word/audio delivery of a finished response.
//! - `outbound`: the ordered event sink the above emit through.

mod outbound;
pub mod protocol;
pub mod session;
mod stream;
mod turn;

#[cfg(test)]
mod testing;

pub use session::{ws_text_handler, ws_voice_handler};
