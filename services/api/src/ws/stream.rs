//! Streams a finished response as a timed sequence of word and audio events.
//!
//! The response is split into sentences; each sentence is synthesized and
//! emitted as word-reveal events followed by one audio chunk. Word events go
//! out before the audio so the client can start rendering text without
//! waiting on synthesis latency; the `delay` hints pace the client's own
//! reveal. Synthesis failures degrade that sentence to text-only delivery
//! and are never surfaced to the client.

use super::outbound::Outbound;
use super::protocol::ServerEvent;
use anyhow::Result;
use base64::Engine;
use showroom_core::speech::SpeechSynthesizer;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::warn;

/// Display delay hint per word when audio accompanies the sentence.
const WORD_DELAY_MS: u64 = 350;
/// Faster reveal when the sentence has no audio to keep pace with.
const DEGRADED_WORD_DELAY_MS: u64 = 100;
/// Pause inserted after each sentence.
const SENTENCE_PAUSE_MS: u64 = 100;

/// Removes markdown decoration characters. The stripped text is canonical:
/// it drives sentence/word derivation, synthesis input, and the emitted
/// word and full-text payloads.
pub fn strip_decoration(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '*' | '#' | '`'))
        .collect()
}

/// Splits text into sentences after `.`, `!`, or `?` followed by whitespace,
/// dropping empty fragments.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') && chars.peek().is_some_and(|n| n.is_whitespace()) {
            while chars.peek().is_some_and(|n| n.is_whitespace()) {
                chars.next();
            }
            let sentence = current.trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            current.clear();
        }
    }
    let tail = current.trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}

/// Splits a sentence into whitespace-delimited words, reattaching a single
/// trailing space to every word except the last.
pub fn split_words(sentence: &str) -> Vec<String> {
    let tokens: Vec<&str> = sentence.split_whitespace().collect();
    let last = tokens.len().saturating_sub(1);
    tokens
        .iter()
        .enumerate()
        .map(|(i, token)| {
            if i < last {
                format!("{token} ")
            } else {
                (*token).to_string()
            }
        })
        .collect()
}

/// Streams one finished response over `outbound`.
///
/// Emits `stream-start`, then per sentence the word events (and the audio
/// chunk when synthesis succeeded), then `stream-end` with the full
/// undecorated text.
pub async fn stream<S: Outbound + ?Sized>(
    outbound: &mut S,
    speech: &dyn SpeechSynthesizer,
    speech_timeout: Duration,
    text: &str,
) -> Result<()> {
    outbound.send(ServerEvent::StreamStart).await?;

    let clean_text = strip_decoration(text);
    for sentence in split_sentences(&clean_text) {
        let words = split_words(&sentence);
        if words.is_empty() {
            continue;
        }

        let audio = match timeout(speech_timeout, speech.synthesize(&sentence)).await {
            Ok(Ok(audio)) => Some(audio),
            Ok(Err(e)) => {
                warn!(error = %e, "Speech synthesis failed; sentence delivered text-only.");
                None
            }
            Err(_) => {
                warn!(timeout = ?speech_timeout, "Speech synthesis timed out; sentence delivered text-only.");
                None
            }
        };

        let delay = if audio.is_some() {
            WORD_DELAY_MS
        } else {
            DEGRADED_WORD_DELAY_MS
        };
        for (index, word) in words.iter().enumerate() {
            outbound
                .send(ServerEvent::StreamWord {
                    word: word.clone(),
                    index,
                    delay,
                })
                .await?;
        }

        if let Some(audio) = audio {
            outbound
                .send(ServerEvent::StreamAudio {
                    audio: base64::engine::general_purpose::STANDARD.encode(&audio.bytes),
                    format: audio.format.to_string(),
                    word_count: words.len(),
                })
                .await?;
        }

        sleep(Duration::from_millis(SENTENCE_PAUSE_MS)).await;
    }

    outbound
        .send(ServerEvent::StreamEnd {
            full_text: clean_text,
        })
        .await?;
    Ok(())
}
