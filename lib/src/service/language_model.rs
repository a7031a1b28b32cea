use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::utilities::ImageEncoding;


/// A structured-output tool the model is forced to call.
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub schema: Value,
}

impl ToolDefinition {
    pub fn new(name: &str, description: &str, schema: Value) -> Self {
        Self {
            name: name.to_owned(),
            description: description.to_owned(),
            schema,
        }
    }
}


#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub encoding: ImageEncoding,
    pub bytes: Vec<u8>,
}


#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub system_prompt: String,
    pub text: String,
    pub image: Option<ImageAttachment>,
    pub tool: Option<ToolDefinition>,
    pub max_tokens: i32,
    pub temperature: f32,
}

impl ModelRequest {
    pub fn new(system_prompt: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            text: text.into(),
            image: None,
            tool: None,
            max_tokens: 1000,
            temperature: 0.7,
        }
    }

    pub fn with_image(mut self, image: ImageAttachment) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_tool(mut self, tool: ToolDefinition) -> Self {
        self.tool = Some(tool);
        self
    }

    pub fn with_limits(mut self, max_tokens: i32, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }
}


/// Text/vision model used for emotion classification and song suggestions.
///
/// The reply is the raw text the caller parses: the JSON input of the forced
/// tool when one was requested and used, otherwise the model's text output.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, request: ModelRequest) -> Result<String>;
}
