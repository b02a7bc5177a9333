//! Core domain logic for the showroom sales assistant.
//!
//! This crate holds everything the web service drives but that is independent
//! of any transport: the conversation transcript, the product catalog, and
//! the two external collaborators (the sales agent and the speech
//! synthesizer) behind service traits.

pub mod agent;
pub mod catalog;
pub mod speech;
pub mod transcript;
