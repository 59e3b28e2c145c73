use async_trait::async_trait;

use crate::error::Result;
use crate::media::ImageFile;

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single turn in a chat conversation, optionally carrying inline images.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub images: Vec<ImageFile>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            images: Vec::new(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            images: Vec::new(),
        }
    }

    pub fn user_with_image(content: impl Into<String>, image: ImageFile) -> Self {
        Self::user_with_images(content, vec![image])
    }

    pub fn user_with_images(content: impl Into<String>, images: Vec<ImageFile>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            images,
        }
    }
}

/// VisionClient is the interface to a vision-capable chat-completion service.
///
/// The library ships one implementation, [`GrokClient`](crate::GrokClient),
/// bound to xAI's OpenAI-compatible API. The trait exists so higher layers
/// (notably [`LatexConverter`](crate::LatexConverter)) can be exercised
/// against a scripted client in tests.
#[async_trait]
pub trait VisionClient {
    /// Send a full message list and return the first completion choice's
    /// message text.
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Single-turn prompt + image convenience wrapper.
    async fn query_with_image_file(&self, prompt: &str, image: &ImageFile) -> Result<String> {
        self.chat(&[ChatMessage::user_with_image(prompt, image.clone())])
            .await
    }

    /// Single-turn text-only completion.
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.chat(&[ChatMessage::user(prompt)]).await
    }
}
