//! The sales-agent collaborator.
//!
//! Given the full ordered transcript of a conversation, the agent returns a
//! finished text answer or an error. The OpenAI-backed implementation grounds
//! its answers in the door catalog through chat-completion tool calls; the
//! caller never sees intermediate tool traffic, only the final text.

use crate::catalog;
use crate::transcript::{Message, MessageRole};
use async_openai::{
    Client,
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestToolMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionTool, ChatCompletionToolArgs,
        CreateChatCompletionRequestArgs, FunctionObjectArgs,
    },
};
use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

/// Upper bound on consecutive tool-call rounds in a single turn.
const MAX_TOOL_ROUNDS: usize = 4;

/// Instructions given to the model on every turn.
pub const SYSTEM_PROMPT: &str = "\
You are a knowledgeable and friendly sales consultant for ProVia Doors - \
\"The Professional Way\".

Your role is to help customers choose the right door products: explain the \
differences between entry door series, cover storm and patio doors, guide \
them through glass, hardware, and finish options, and answer warranty and \
Energy Star questions.

Entry door series, from premium to value: Embarq (2.5\" fiberglass, highest \
efficiency), Signet (dovetailed fiberglass, most customizable), Heritage \
(mid-range fiberglass), Legacy (20-gauge steel). Storm doors: Spectrum, \
Deluxe, Superview, Decorator. Patio doors: vinyl and steel sliding plus \
fiberglass hinged.

Guidelines:
- Be warm, professional, and consultative.
- Ask clarifying questions about style, climate, budget, and security needs.
- Always use the tools to provide accurate product information.
- Keep responses conversational but informative for voice interaction.";

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("agent request failed: {0}")]
    Api(#[from] OpenAIError),
    #[error("agent response had neither text content nor tool calls")]
    EmptyResponse,
    #[error("agent requested unknown tool '{0}'")]
    UnknownTool(String),
    #[error("malformed arguments for tool '{0}'")]
    BadToolArguments(String),
    #[error("agent exceeded {MAX_TOOL_ROUNDS} tool rounds without answering")]
    TooManyToolRounds,
}

/// Contract for the conversational agent: ordered transcript in, finished
/// answer out.
#[async_trait]
pub trait SalesAgent: Send + Sync {
    async fn respond(&self, transcript: &[Message]) -> Result<String, AgentError>;
}

/// An implementation of `SalesAgent` for any OpenAI-compatible chat API.
pub struct OpenAiSalesAgent {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiSalesAgent {
    /// Creates a new agent.
    ///
    /// # Arguments
    ///
    /// * `config` - OpenAI client configuration (API key, base URL).
    /// * `model` - Chat model identifier (e.g., "gpt-4o-mini").
    pub fn new(config: OpenAIConfig, model: String) -> Self {
        Self {
            client: Client::with_config(config),
            model,
        }
    }

    fn build_messages(
        &self,
        transcript: &[Message],
    ) -> Result<Vec<ChatCompletionRequestMessage>, AgentError> {
        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_PROMPT)
                .build()?
                .into(),
        ];
        for msg in transcript {
            match msg.role {
                MessageRole::User => messages.push(
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(msg.content.clone())
                        .build()?
                        .into(),
                ),
                MessageRole::Assistant => messages.push(
                    ChatCompletionRequestAssistantMessageArgs::default()
                        .content(msg.content.clone())
                        .build()?
                        .into(),
                ),
            }
        }
        Ok(messages)
    }
}

#[async_trait]
impl SalesAgent for OpenAiSalesAgent {
    async fn respond(&self, transcript: &[Message]) -> Result<String, AgentError> {
        let mut messages = self.build_messages(transcript)?;
        let tools = catalog_tools()?;

        // Let the model consult the catalog for a bounded number of rounds,
        // then insist on a text answer.
        for _ in 0..MAX_TOOL_ROUNDS {
            let request = CreateChatCompletionRequestArgs::default()
                .model(&self.model)
                .messages(messages.clone())
                .tools(tools.clone())
                .tool_choice("auto")
                .build()?;

            let response = self.client.chat().create(request).await?;
            let choice = response
                .choices
                .into_iter()
                .next()
                .ok_or(AgentError::EmptyResponse)?;

            if let Some(tool_calls) = choice.message.tool_calls {
                messages.push(
                    ChatCompletionRequestAssistantMessageArgs::default()
                        .tool_calls(tool_calls.clone())
                        .build()?
                        .into(),
                );
                for call in &tool_calls {
                    debug!(tool = %call.function.name, "Executing catalog tool");
                    let args: Value = serde_json::from_str(&call.function.arguments)
                        .unwrap_or_else(|_| json!({}));
                    let result = run_tool(&call.function.name, &args)?;
                    messages.push(
                        ChatCompletionRequestToolMessageArgs::default()
                            .tool_call_id(call.id.clone())
                            .content(result)
                            .build()?
                            .into(),
                    );
                }
            } else if let Some(content) = choice.message.content {
                return Ok(content);
            } else {
                return Err(AgentError::EmptyResponse);
            }
        }
        Err(AgentError::TooManyToolRounds)
    }
}

/// Tool definitions advertised to the chat model, one per catalog lookup.
fn catalog_tools() -> Result<Vec<ChatCompletionTool>, AgentError> {
    let no_args = json!({ "type": "object", "properties": {} });
    let specs = [
        (
            "list_door_series",
            "List all entry door series with tier and material.",
            no_args.clone(),
        ),
        (
            "get_door_details",
            "Get detailed information about a specific entry door series.",
            json!({
                "type": "object",
                "properties": {
                    "series": {
                        "type": "string",
                        "description": "Series id: embarq, signet, heritage, or legacy"
                    }
                },
                "required": ["series"]
            }),
        ),
        (
            "list_storm_doors",
            "List all storm door series with tier.",
            no_args.clone(),
        ),
        (
            "list_patio_doors",
            "List all patio door options with available configurations.",
            no_args.clone(),
        ),
        (
            "list_glass_options",
            "List all available glass options.",
            no_args.clone(),
        ),
        (
            "list_hardware_options",
            "List all available hardware options.",
            no_args.clone(),
        ),
        (
            "list_finish_options",
            "List all available finish options.",
            no_args,
        ),
        (
            "search_catalog",
            "Search the whole catalog by keyword.",
            json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search term, e.g. 'fiberglass' or 'security'"
                    }
                },
                "required": ["query"]
            }),
        ),
    ];

    specs
        .into_iter()
        .map(|(name, description, parameters)| {
            Ok(ChatCompletionToolArgs::default()
                .function(
                    FunctionObjectArgs::default()
                        .name(name)
                        .description(description)
                        .parameters(parameters)
                        .build()?,
                )
                .build()?)
        })
        .collect()
}

/// Dispatches one tool call against the catalog.
fn run_tool(name: &str, args: &Value) -> Result<String, AgentError> {
    match name {
        "list_door_series" => {
            let lines: Vec<String> = catalog::entry_door_series()
                .iter()
                .map(|d| format!("- **{}** ({}, {})", d.name, d.tier, d.material))
                .collect();
            Ok(format!("Entry door series:\n{}", lines.join("\n")))
        }
        "get_door_details" => {
            let series = args
                .get("series")
                .and_then(Value::as_str)
                .ok_or_else(|| AgentError::BadToolArguments(name.to_string()))?;
            Ok(match catalog::entry_door(series) {
                Some(door) => catalog::format_door_summary(door),
                None => format!(
                    "Door series '{series}' not found. Available series: embarq, signet, heritage, legacy"
                ),
            })
        }
        "list_storm_doors" => {
            let lines: Vec<String> = catalog::storm_doors()
                .iter()
                .map(|s| format!("- **{}** ({}): {}", s.name, s.tier, s.description))
                .collect();
            Ok(format!("Storm door series:\n{}", lines.join("\n")))
        }
        "list_patio_doors" => {
            let lines: Vec<String> = catalog::patio_doors()
                .iter()
                .map(|p| {
                    format!(
                        "- **{}**: {} Configurations: {}",
                        p.name,
                        p.description,
                        p.configurations.join(", ")
                    )
                })
                .collect();
            Ok(format!("Patio door options:\n{}", lines.join("\n")))
        }
        "list_glass_options" => {
            let lines: Vec<String> = catalog::glass_options()
                .iter()
                .map(|g| format!("- **{}**: {}", g.name, g.description))
                .collect();
            Ok(format!("Glass options:\n{}", lines.join("\n")))
        }
        "list_hardware_options" => {
            let lines: Vec<String> = catalog::hardware_options()
                .iter()
                .map(|h| format!("- **{}**: {}", h.name, h.description))
                .collect();
            Ok(format!("Hardware options:\n{}", lines.join("\n")))
        }
        "list_finish_options" => {
            let lines: Vec<String> = catalog::finish_options()
                .iter()
                .map(|f| format!("- **{}**: {}", f.name, f.description))
                .collect();
            Ok(format!("Finish options:\n{}", lines.join("\n")))
        }
        "search_catalog" => {
            let query = args
                .get("query")
                .and_then(Value::as_str)
                .ok_or_else(|| AgentError::BadToolArguments(name.to_string()))?;
            let hits = catalog::search_products(query);
            if hits.is_empty() {
                return Ok(format!("No products found matching '{query}'."));
            }
            let lines: Vec<String> = hits
                .iter()
                .take(10)
                .map(|h| format!("- **{}** ({}): {}", h.name, h.kind, h.description))
                .collect();
            Ok(format!("Search results for '{query}':\n{}", lines.join("\n")))
        }
        other => Err(AgentError::UnknownTool(other.to_string())),
    }
}
