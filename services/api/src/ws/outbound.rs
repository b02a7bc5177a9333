//! Outbound event delivery.
//!
//! The orchestrator and synchronizer emit [`ServerEvent`]s through this trait
//! rather than writing to the socket directly, so tests can capture the exact
//! event sequence a turn produces.

use super::protocol::ServerEvent;
use anyhow::Result;
use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, stream::SplitSink};

/// A strictly ordered sink for server events on one connection.
#[async_trait]
pub trait Outbound: Send {
    async fn send(&mut self, event: ServerEvent) -> Result<()>;
}

/// The production sink: serializes each event and writes it as a text frame.
pub struct WsSink {
    sink: SplitSink<WebSocket, Message>,
}

impl WsSink {
    pub fn new(sink: SplitSink<WebSocket, Message>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl Outbound for WsSink {
    async fn send(&mut self, event: ServerEvent) -> Result<()> {
        let serialized = serde_json::to_string(&event)?;
        self.sink.send(Message::Text(serialized.into())).await?;
        Ok(())
    }
}
