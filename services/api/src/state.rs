//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds all shared,
//! clonable resources: the session registry and the two external
//! collaborators (agent and speech synthesizer).

use crate::config::Config;
use crate::registry::SessionRegistry;
use showroom_core::{agent::SalesAgent, speech::SpeechSynthesizer};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
/// All fields are public to be accessible from other modules.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
    pub agent: Arc<dyn SalesAgent>,
    pub speech: Arc<dyn SpeechSynthesizer>,
    pub config: Arc<Config>,
}
