//! Test doubles shared by the turn and streaming tests.

use super::outbound::Outbound;
use super::protocol::ServerEvent;
use anyhow::Result;
use async_trait::async_trait;
use mockall::mock;
use showroom_core::agent::{AgentError, SalesAgent};
use showroom_core::speech::{SpeechAudio, SpeechError, SpeechSynthesizer};
use showroom_core::transcript::Message;
use std::time::Duration;

/// Captures every event a turn emits, in order.
#[derive(Default)]
pub(crate) struct EventRecorder {
    pub events: Vec<ServerEvent>,
}

#[async_trait]
impl Outbound for EventRecorder {
    async fn send(&mut self, event: ServerEvent) -> Result<()> {
        self.events.push(event);
        Ok(())
    }
}

mock! {
    pub(crate) Agent {}

    #[async_trait]
    impl SalesAgent for Agent {
        async fn respond(&self, transcript: &[Message]) -> Result<String, AgentError>;
    }
}

mock! {
    pub(crate) Speech {}

    #[async_trait]
    impl SpeechSynthesizer for Speech {
        async fn synthesize(&self, text: &str) -> Result<SpeechAudio, SpeechError>;
    }
}

/// An agent that never answers within the test timeout.
pub(crate) struct StalledAgent;

#[async_trait]
impl SalesAgent for StalledAgent {
    async fn respond(&self, _transcript: &[Message]) -> Result<String, AgentError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok("too late".to_string())
    }
}

/// A synthesizer that never produces audio within the test timeout.
pub(crate) struct StalledSpeech;

#[async_trait]
impl SpeechSynthesizer for StalledSpeech {
    async fn synthesize(&self, _text: &str) -> Result<SpeechAudio, SpeechError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(audio_fixture())
    }
}

pub(crate) fn audio_fixture() -> SpeechAudio {
    SpeechAudio {
        bytes: vec![1, 2, 3, 4],
        format: "mp3",
    }
}
