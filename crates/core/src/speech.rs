//! Text-to-speech collaborator.
//!
//! The synchronizer calls this once per sentence; a failure degrades that
//! sentence to text-only delivery, so implementations report errors rather
//! than panic.

use async_openai::{
    Client,
    config::OpenAIConfig,
    error::OpenAIError,
    types::{CreateSpeechRequestArgs, SpeechModel, SpeechResponseFormat, Voice},
};
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("speech synthesis request failed: {0}")]
    Api(#[from] OpenAIError),
    #[error("speech synthesis returned no audio")]
    EmptyAudio,
}

/// Encoded audio for one synthesized sentence.
#[derive(Debug, Clone)]
pub struct SpeechAudio {
    pub bytes: Vec<u8>,
    /// Container format of `bytes`, e.g. "mp3".
    pub format: &'static str,
}

/// Contract for any service that can turn a sentence into spoken audio.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<SpeechAudio, SpeechError>;
}

/// An implementation of `SpeechSynthesizer` backed by the OpenAI speech API.
pub struct OpenAiSpeechSynthesizer {
    client: Client<OpenAIConfig>,
    model: SpeechModel,
    voice: Voice,
}

impl OpenAiSpeechSynthesizer {
    /// Creates a new synthesizer.
    ///
    /// Unrecognized model or voice names fall back to `tts-1` / `alloy`.
    pub fn new(config: OpenAIConfig, model: &str, voice: &str) -> Self {
        let model = match model {
            "tts-1-hd" => SpeechModel::Tts1Hd,
            _ => SpeechModel::Tts1,
        };
        let voice = match voice {
            "echo" => Voice::Echo,
            "fable" => Voice::Fable,
            "onyx" => Voice::Onyx,
            "nova" => Voice::Nova,
            "shimmer" => Voice::Shimmer,
            _ => Voice::Alloy,
        };
        Self {
            client: Client::with_config(config),
            model,
            voice,
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSpeechSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<SpeechAudio, SpeechError> {
        let request = CreateSpeechRequestArgs::default()
            .input(text)
            .model(self.model.clone())
            .voice(self.voice.clone())
            .response_format(SpeechResponseFormat::Mp3)
            .build()?;

        let response = self.client.audio().speech(request).await?;
        if response.bytes.is_empty() {
            return Err(SpeechError::EmptyAudio);
        }
        Ok(SpeechAudio {
            bytes: response.bytes.to_vec(),
            format: "mp3",
        })
    }
}
