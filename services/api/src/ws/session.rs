//! Manages the WebSocket connection lifecycle for a chat or voice session.
//!
//! One tokio task per connection: register a session, send the welcome,
//! then process inbound frames one at a time. A frame is fully handled,
//! including any streaming, before the next is taken up, so outbound events
//! of two turns never interleave. A disconnect mid-turn cancels the in-flight
//! agent or synthesis call. The session is deregistered on every exit path.

use super::{
    outbound::{Outbound, WsSink},
    protocol::{ServerEvent, TextFrame, VoiceFrame},
    stream,
    turn::{self, Indicator, Outcome},
};
use crate::{registry::Session, state::AppState};
use anyhow::Result;
use axum::{
    extract::{
        State,
        ws::{Message, Utf8Bytes, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{Stream, StreamExt};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

const TEXT_WELCOME: &str = "Welcome to ProVia Doors! I'm your personal door consultant. \
     I can help you find the perfect entry door, storm door, or patio door for your home. \
     Would you like to explore our door series, or do you have specific requirements in mind?";

const VOICE_WELCOME: &str = "Welcome to ProVia Doors! I'm ready to help you find the \
     perfect door. You can speak to me or type your questions.";

/// Axum handler for the text-chat endpoint.
pub async fn ws_text_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state, Endpoint::Text))
}

/// Axum handler for the streaming-audio voice endpoint.
pub async fn ws_voice_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state, Endpoint::Voice))
}

/// The two connection variants and their protocol differences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Endpoint {
    Text,
    Voice,
}

impl Endpoint {
    fn indicator(self) -> Indicator {
        match self {
            Endpoint::Text => Indicator::Typing,
            Endpoint::Voice => Indicator::Processing,
        }
    }

    fn welcome(self) -> &'static str {
        match self {
            Endpoint::Text => TEXT_WELCOME,
            Endpoint::Voice => VOICE_WELCOME,
        }
    }

    /// Extracts the user-supplied text from a raw inbound frame.
    ///
    /// Malformed JSON yields `None`; the frame is dropped silently, the same
    /// policy as empty input.
    fn user_text(self, raw: &str) -> Option<String> {
        match self {
            Endpoint::Text => serde_json::from_str::<TextFrame>(raw)
                .ok()
                .map(|frame| frame.message),
            Endpoint::Voice => serde_json::from_str::<VoiceFrame>(raw)
                .ok()
                .map(|frame| frame.content),
        }
    }
}

/// Main handler for an individual WebSocket connection.
#[instrument(name = "ws_session", skip_all, fields(session_id, endpoint = ?endpoint))]
async fn handle_socket(socket: WebSocket, state: Arc<AppState>, endpoint: Endpoint) {
    let connection_id = Uuid::new_v4().to_string();
    tracing::Span::current().record("session_id", &connection_id);

    let (socket_tx, mut socket_rx) = socket.split();
    let mut outbound = WsSink::new(socket_tx);

    // A fresh v4 id per physical connection cannot collide with a live entry.
    let session = match state.registry.open(&connection_id) {
        Ok(session) => session,
        Err(e) => {
            error!(error = %e, "Failed to register session.");
            return;
        }
    };
    info!(live_sessions = state.registry.len(), "New WebSocket connection registered.");

    if let Err(e) = send_welcome(&state, &mut outbound, endpoint).await {
        warn!(error = ?e, "Failed to deliver welcome; closing session.");
        state.registry.close(&connection_id);
        return;
    }

    run_session(&state, &session, &mut outbound, &mut socket_rx, endpoint).await;

    state.registry.close(&connection_id);
    info!("WebSocket connection closed and session deregistered.");
}

/// The receive loop. A turn in flight races against the receive half so a
/// disconnect cancels the agent or synthesis call instead of letting it run
/// out its timeout against a closed transport. Text frames arriving mid-turn
/// are queued and taken up in order once the current turn's terminal
/// indicator has been sent; a disconnect abandons both the turn and the
/// queue.
async fn run_session<S, R>(
    state: &AppState,
    session: &Session,
    outbound: &mut S,
    socket_rx: &mut R,
    endpoint: Endpoint,
) where
    S: Outbound + ?Sized,
    R: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    let mut queued: VecDeque<Utf8Bytes> = VecDeque::new();
    loop {
        let raw = match queued.pop_front() {
            Some(raw) => raw,
            None => match socket_rx.next().await {
                Some(Ok(Message::Text(text))) => text,
                Some(Ok(Message::Close(_))) | None => {
                    info!("Client closed the connection.");
                    return;
                }
                Some(Ok(Message::Binary(_))) => {
                    warn!("Ignoring unexpected binary frame.");
                    continue;
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                Some(Err(e)) => {
                    warn!(error = ?e, "Error receiving from client WebSocket.");
                    return;
                }
            },
        };

        let turn = process_frame(state, session, &mut *outbound, endpoint, &raw);
        tokio::pin!(turn);
        loop {
            tokio::select! {
                biased;
                result = &mut turn => {
                    if let Err(e) = result {
                        // The transport is gone; stop without sending
                        // further events.
                        warn!(error = ?e, "Failed to deliver turn events; closing session.");
                        return;
                    }
                    break;
                }
                frame = socket_rx.next() => match frame {
                    Some(Ok(Message::Text(text))) => queued.push_back(text),
                    Some(Ok(Message::Close(_))) | None => {
                        info!("Client disconnected mid-turn; abandoning the turn.");
                        return;
                    }
                    Some(Err(e)) => {
                        warn!(error = ?e, "Transport error mid-turn; abandoning the turn.");
                        return;
                    }
                    Some(Ok(_)) => {}
                },
            }
        }
    }
}

async fn send_welcome<S: Outbound + ?Sized>(
    state: &AppState,
    outbound: &mut S,
    endpoint: Endpoint,
) -> Result<()> {
    match endpoint {
        Endpoint::Text => {
            outbound
                .send(ServerEvent::Assistant {
                    content: endpoint.welcome().to_string(),
                })
                .await
        }
        Endpoint::Voice => {
            stream::stream(
                outbound,
                state.speech.as_ref(),
                state.config.speech_timeout,
                endpoint.welcome(),
            )
            .await
        }
    }
}

/// Handles one inbound frame end to end: orchestrate the turn, deliver the
/// outcome, and close the indicator pair. Returns an error only when the
/// transport refuses writes.
async fn process_frame<S: Outbound + ?Sized>(
    state: &AppState,
    session: &Session,
    outbound: &mut S,
    endpoint: Endpoint,
    raw: &str,
) -> Result<()> {
    let Some(user_text) = endpoint.user_text(raw) else {
        warn!("Dropping malformed inbound frame.");
        return Ok(());
    };

    let outcome = turn::handle_turn(
        state.agent.as_ref(),
        state.config.agent_timeout,
        session,
        &user_text,
        endpoint.indicator(),
        outbound,
    )
    .await?;
    let Some(outcome) = outcome else {
        return Ok(());
    };

    let delivery = match outcome {
        Outcome::Answered(answer) => match endpoint {
            Endpoint::Text => {
                outbound
                    .send(ServerEvent::Assistant { content: answer })
                    .await
            }
            Endpoint::Voice => {
                stream::stream(
                    outbound,
                    state.speech.as_ref(),
                    state.config.speech_timeout,
                    &answer,
                )
                .await
            }
        },
        Outcome::Failed(message) => outbound.send(ServerEvent::Error { content: message }).await,
    };

    // The indicator-stop is the turn's terminal event on every path.
    let stop = outbound.send(endpoint.indicator().event(false)).await;
    delivery?;
    stop
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::registry::SessionRegistry;
    use crate::ws::testing::{EventRecorder, MockAgent, MockSpeech, StalledAgent, audio_fixture};
    use showroom_core::agent::{AgentError, SalesAgent};
    use showroom_core::speech::SpeechSynthesizer;
    use std::time::Duration;

    fn test_state(
        agent: impl SalesAgent + 'static,
        speech: impl SpeechSynthesizer + 'static,
    ) -> AppState {
        AppState {
            registry: Arc::new(SessionRegistry::new()),
            agent: Arc::new(agent),
            speech: Arc::new(speech),
            config: Arc::new(Config {
                bind_address: "127.0.0.1:0".parse().unwrap(),
                openai_api_key: "sk-test".to_string(),
                chat_model: "gpt-4o-mini".to_string(),
                speech_model: "tts-1".to_string(),
                speech_voice: "alloy".to_string(),
                static_dir: "./static".into(),
                agent_timeout: Duration::from_secs(5),
                speech_timeout: Duration::from_secs(5),
                log_level: tracing::Level::INFO,
            }),
        }
    }

    #[test]
    fn malformed_and_missing_fields_are_dropped() {
        assert!(Endpoint::Text.user_text("not json").is_none());
        assert!(Endpoint::Voice.user_text("{broken").is_none());
        // Missing fields default to empty, which the turn then drops.
        assert_eq!(Endpoint::Text.user_text("{}").as_deref(), Some(""));
        assert_eq!(
            Endpoint::Voice.user_text(r#"{"type": "speech"}"#).as_deref(),
            Some("")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn voice_turn_emits_ordered_event_sequence() {
        let mut agent = MockAgent::new();
        agent
            .expect_respond()
            .returning(|_| Ok("Hello there. How can I help?".to_string()));
        let mut speech = MockSpeech::new();
        speech.expect_synthesize().returning(|_| Ok(audio_fixture()));
        let state = test_state(agent, speech);
        let session = state.registry.open("conn").unwrap();
        let mut out = EventRecorder::default();

        process_frame(
            &state,
            &session,
            &mut out,
            Endpoint::Voice,
            r#"{"type": "text", "content": "hi"}"#,
        )
        .await
        .unwrap();

        assert_eq!(
            out.events.first(),
            Some(&ServerEvent::Processing { content: true })
        );
        assert_eq!(out.events.get(1), Some(&ServerEvent::StreamStart));
        assert_eq!(
            out.events.last(),
            Some(&ServerEvent::Processing { content: false })
        );
        assert!(matches!(
            out.events[out.events.len() - 2],
            ServerEvent::StreamEnd { .. }
        ));
        let word_count = out
            .events
            .iter()
            .filter(|e| matches!(e, ServerEvent::StreamWord { .. }))
            .count();
        assert_eq!(word_count, 6);
    }

    #[tokio::test]
    async fn text_turn_sends_single_assistant_frame() {
        let mut agent = MockAgent::new();
        agent
            .expect_respond()
            .returning(|_| Ok("We carry four series.".to_string()));
        let state = test_state(agent, MockSpeech::new());
        let session = state.registry.open("conn").unwrap();
        let mut out = EventRecorder::default();

        process_frame(
            &state,
            &session,
            &mut out,
            Endpoint::Text,
            r#"{"message": "what series do you carry?"}"#,
        )
        .await
        .unwrap();

        assert_eq!(
            out.events,
            vec![
                ServerEvent::Typing { content: true },
                ServerEvent::Assistant {
                    content: "We carry four series.".to_string()
                },
                ServerEvent::Typing { content: false },
            ]
        );
    }

    #[tokio::test]
    async fn failed_turn_surfaces_single_error_between_indicators() {
        let mut agent = MockAgent::new();
        agent
            .expect_respond()
            .returning(|_| Err(AgentError::EmptyResponse));
        let state = test_state(agent, MockSpeech::new());
        let session = state.registry.open("conn").unwrap();
        let mut out = EventRecorder::default();

        process_frame(
            &state,
            &session,
            &mut out,
            Endpoint::Voice,
            r#"{"content": "hello"}"#,
        )
        .await
        .unwrap();

        assert_eq!(out.events.len(), 3);
        assert_eq!(
            out.events[0],
            ServerEvent::Processing { content: true }
        );
        assert!(matches!(out.events[1], ServerEvent::Error { .. }));
        assert_eq!(
            out.events[2],
            ServerEvent::Processing { content: false }
        );
        // No streaming events on the failure path.
        assert!(!out
            .events
            .iter()
            .any(|e| matches!(e, ServerEvent::StreamStart)));
    }

    #[tokio::test(start_paused = true)]
    async fn welcome_is_plain_on_text_and_streamed_on_voice() {
        let mut speech = MockSpeech::new();
        speech.expect_synthesize().returning(|_| Ok(audio_fixture()));
        let state = test_state(MockAgent::new(), speech);

        let mut out = EventRecorder::default();
        send_welcome(&state, &mut out, Endpoint::Text).await.unwrap();
        assert_eq!(
            out.events,
            vec![ServerEvent::Assistant {
                content: TEXT_WELCOME.to_string()
            }]
        );

        let mut out = EventRecorder::default();
        send_welcome(&state, &mut out, Endpoint::Voice).await.unwrap();
        assert_eq!(out.events.first(), Some(&ServerEvent::StreamStart));
        assert!(matches!(
            out.events.last(),
            Some(ServerEvent::StreamEnd { .. })
        ));
    }

    fn frames(items: Vec<Message>) -> impl Stream<Item = Result<Message, axum::Error>> + Unpin {
        futures_util::stream::iter(items.into_iter().map(Ok))
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_mid_turn_cancels_the_agent_call() {
        let state = test_state(StalledAgent, MockSpeech::new());
        let session = state.registry.open("conn").unwrap();
        let mut out = EventRecorder::default();
        // The stream ends right after the frame, which reads as a disconnect
        // while the agent call is still pending.
        let mut rx = frames(vec![Message::Text(r#"{"message": "hi"}"#.into())]);

        run_session(&state, &session, &mut out, &mut rx, Endpoint::Text).await;

        // The turn got as far as the indicator start, then was abandoned:
        // no error event, no indicator stop, no assistant frame.
        assert_eq!(out.events, vec![ServerEvent::Typing { content: true }]);
        assert_eq!(session.transcript_len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_mid_turn_drops_queued_frames() {
        let state = test_state(StalledAgent, MockSpeech::new());
        let session = state.registry.open("conn").unwrap();
        let mut out = EventRecorder::default();
        let mut rx = frames(vec![
            Message::Text(r#"{"message": "first"}"#.into()),
            Message::Text(r#"{"message": "second"}"#.into()),
            Message::Close(None),
        ]);

        run_session(&state, &session, &mut out, &mut rx, Endpoint::Text).await;

        // The second frame was queued behind the stalled turn and never
        // processed once the close frame arrived.
        assert_eq!(out.events, vec![ServerEvent::Typing { content: true }]);
        assert_eq!(session.transcript_len(), 1);
    }

    #[tokio::test]
    async fn turns_complete_in_arrival_order() {
        let mut agent = MockAgent::new();
        agent
            .expect_respond()
            .returning(|transcript| Ok(format!("reply {}", transcript.len())));
        let state = test_state(agent, MockSpeech::new());
        let session = state.registry.open("conn").unwrap();
        let mut out = EventRecorder::default();
        let mut rx = frames(vec![
            Message::Text(r#"{"message": "first"}"#.into()),
            Message::Text(r#"{"message": "second"}"#.into()),
            Message::Close(None),
        ]);

        run_session(&state, &session, &mut out, &mut rx, Endpoint::Text).await;

        let answers: Vec<&str> = out
            .events
            .iter()
            .filter_map(|e| match e {
                ServerEvent::Assistant { content } => Some(content.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(answers, vec!["reply 1", "reply 3"]);
        assert_eq!(session.transcript_len(), 4);
    }

    #[tokio::test]
    async fn empty_content_produces_no_events_at_all() {
        let state = test_state(MockAgent::new(), MockSpeech::new());
        let session = state.registry.open("conn").unwrap();
        let mut out = EventRecorder::default();

        process_frame(&state, &session, &mut out, Endpoint::Text, r#"{"message": ""}"#)
            .await
            .unwrap();
        process_frame(&state, &session, &mut out, Endpoint::Voice, "garbage")
            .await
            .unwrap();

        assert!(out.events.is_empty());
        assert_eq!(session.transcript_len(), 0);
    }
}
