
pub mod tools;

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use aws_sdk_bedrockruntime::operation::converse::ConverseOutput;
use aws_sdk_bedrockruntime::primitives::Blob;
use aws_sdk_bedrockruntime::types::{
    ContentBlock, ConversationRole::User, ImageBlock, ImageFormat, ImageSource,
    InferenceConfiguration, Message, SpecificToolChoice, SystemContentBlock, Tool, ToolChoice,
    ToolConfiguration, ToolInputSchema, ToolSpecification,
};
use aws_sdk_bedrockruntime::Client;
use tracing::{debug, warn};

use tools::{ToDocument, ToValue};
use crate::utilities::ImageEncoding;
use super::language_model::{ImageAttachment, LanguageModel, ModelRequest, ToolDefinition};


/// Bedrock Converse API backed model.
#[derive(Debug, Clone)]
pub struct BedrockService {
    client: Client,
    chat_model_id: String,
    timeout: Duration,
}

impl BedrockService {
    pub fn new(client: &Client, chat_model_id: &str, timeout: Duration) -> Self {
        Self {
            client: client.to_owned(),
            chat_model_id: chat_model_id.to_owned(),
            timeout,
        }
    }

    fn build_tool_config(&self, tool_definition: &ToolDefinition) -> Result<ToolConfiguration> {
        let tool = Tool::ToolSpec(
            ToolSpecification::builder()
                .name(&tool_definition.name)
                .description(&tool_definition.description)
                .input_schema(ToolInputSchema::Json(tool_definition.schema.to_document()))
                .build()?
        );

        let tool_config = ToolConfiguration::builder()
            .set_tools(Some(vec![tool]))
            .tool_choice(ToolChoice::Tool(SpecificToolChoice::builder().name(&tool_definition.name).build()?))
            .build()?;
        Ok(tool_config)
    }

    fn build_message(&self, request: &ModelRequest) -> Result<Message> {
        let mut builder = Message::builder()
            .role(User)
            .content(ContentBlock::Text(request.text.to_owned()));

        if let Some(image) = &request.image {
            builder = builder.content(ContentBlock::Image(self.build_image(image)?));
        }
        Ok(builder.build()?)
    }

    fn build_image(&self, image: &ImageAttachment) -> Result<ImageBlock> {
        let format = match image.encoding {
            ImageEncoding::Jpeg => ImageFormat::Jpeg,
            ImageEncoding::Png => ImageFormat::Png,
            ImageEncoding::Gif => ImageFormat::Gif,
            ImageEncoding::Webp => ImageFormat::Webp,
        };
        let block = ImageBlock::builder()
            .format(format)
            .source(ImageSource::Bytes(Blob::new(image.bytes.clone())))
            .build()?;
        Ok(block)
    }

    /// Tool input as JSON when the forced tool was used, otherwise the joined text blocks.
    fn process_output(&self, response: ConverseOutput, tool_name: Option<&str>) -> Result<String> {
        let output = response.output.context("Error getting output")?;
        let message = match output.as_message() {
            Ok(message) => message.to_owned(),
            Err(output) => {
                bail!("Converse output is not message: {:?}", output)
            },
        };

        let mut texts: Vec<String> = vec![];
        for content in message.content {
            if let Ok(tool_use) = content.as_tool_use() {
                if tool_name.is_some_and(|name| name == tool_use.name()) {
                    let input = tool_use.input().to_value();
                    debug!(tool = tool_use.name(), "tool use received");
                    return Ok(input.to_string());
                }
                warn!(tool = tool_use.name(), "ignoring unexpected tool use");
                continue;
            }
            if let Ok(text) = content.as_text() {
                texts.push(text.to_owned());
            }
        }

        if texts.is_empty() {
            bail!("Converse output has no text or tool use")
        }
        Ok(texts.join("\n"))
    }

    async fn send(&self, request: &ModelRequest) -> Result<ConverseOutput> {
        let tool_config = match &request.tool {
            Some(tool) => Some(self.build_tool_config(tool)?),
            None => None,
        };

        let inference = InferenceConfiguration::builder()
            .max_tokens(request.max_tokens)
            .temperature(request.temperature)
            .build();

        let builder = self.client
            .converse()
            .model_id(&self.chat_model_id)
            .system(SystemContentBlock::Text(request.system_prompt.to_owned()))
            .set_messages(Some(vec![self.build_message(request)?]))
            .inference_config(inference)
            .set_tool_config(tool_config);

        let response = tokio::time::timeout(self.timeout, builder.send())
            .await
            .with_context(|| format!("Bedrock call timed out after {:?}", self.timeout))??;
        Ok(response)
    }
}


#[async_trait]
impl LanguageModel for BedrockService {
    async fn complete(&self, request: ModelRequest) -> Result<String> {
        let response = self.send(&request).await?;
        debug!(usage = ?response.usage, "converse response received");
        self.process_output(response, request.tool.as_ref().map(|t| t.name.as_str()))
    }
}
