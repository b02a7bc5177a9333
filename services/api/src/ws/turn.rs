//! Drives one request/response turn against the sales agent.
//!
//! A turn appends the user's message, emits the indicator-start event,
//! invokes the agent with the full transcript, and classifies the result.
//! On failure the transcript keeps only the user message, so the next turn
//! re-submits full context including the unanswered question. The paired
//! indicator-stop event is sent by the connection loop after delivery, as the
//! last event of the turn.

use super::outbound::Outbound;
use super::protocol::ServerEvent;
use crate::registry::Session;
use anyhow::Result;
use showroom_core::agent::SalesAgent;
use showroom_core::transcript::Message;
use std::time::Duration;
use tracing::{debug, warn};

/// Which indicator event pair an endpoint uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Typing,
    Processing,
}

impl Indicator {
    pub fn event(self, on: bool) -> ServerEvent {
        match self {
            Indicator::Typing => ServerEvent::Typing { content: on },
            Indicator::Processing => ServerEvent::Processing { content: on },
        }
    }
}

/// The classified result of one turn.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Answered(String),
    Failed(String),
}

/// Runs one turn. Returns `None` for empty input, which is silently dropped
/// with no transcript mutation and no protocol events.
pub async fn handle_turn<S: Outbound + ?Sized>(
    agent: &dyn SalesAgent,
    agent_timeout: Duration,
    session: &Session,
    user_text: &str,
    indicator: Indicator,
    outbound: &mut S,
) -> Result<Option<Outcome>> {
    if user_text.trim().is_empty() {
        debug!("Dropping empty user message.");
        return Ok(None);
    }

    session.append(Message::user(user_text));
    outbound.send(indicator.event(true)).await?;

    let snapshot = session.snapshot();
    let outcome = match tokio::time::timeout(agent_timeout, agent.respond(&snapshot)).await {
        Ok(Ok(answer)) => {
            session.append(Message::assistant(answer.clone()));
            Outcome::Answered(answer)
        }
        Ok(Err(e)) => {
            warn!(error = %e, "Agent invocation failed.");
            Outcome::Failed(failure_message(&e.to_string()))
        }
        Err(_) => {
            warn!(timeout = ?agent_timeout, "Agent invocation timed out.");
            Outcome::Failed(failure_message("the agent did not respond in time"))
        }
    };

    Ok(Some(outcome))
}

fn failure_message(detail: &str) -> String {
    format!("I apologize, but I encountered an error: {detail}. Please try again.")
}
