//! LaTeX conversion on top of a vision client.
//!
//! Carries the application prompts: a system turn pinning the model to
//! LaTeX-only output, a user turn with the instruction and the image, and a
//! cleanup pass removing markdown fences the model may add anyway.

use std::path::Path;

use tracing::{debug, info, instrument};

use crate::backend::client::{ChatMessage, VisionClient};
use crate::backend::utils::strip_latex_fences;
use crate::error::{LatexifyError, Result};
use crate::media::ImageFile;

/// Default instruction sent alongside the image.
pub const DEFAULT_CONVERT_PROMPT: &str =
    "Convert this image to LaTeX code. Return ONLY the LaTeX code with no additional text or formatting.";

const CONVERT_SYSTEM_PROMPT: &str = "You are a LaTeX converter. You must respond with ONLY the \
     LaTeX code needed to reproduce the image. No explanations, no markdown formatting, no \
     additional text.";

const COMBINE_SYSTEM_PROMPT: &str = "You are a LaTeX combiner. You must respond with ONLY the \
     combined LaTeX code. No explanations, no markdown formatting, no additional text.";

const SNIPPET_SEPARATOR: &str = "\n\n=====\n\n";

/// Converts images to LaTeX and merges LaTeX snippets, using any
/// [`VisionClient`] implementation.
#[derive(Debug)]
pub struct LatexConverter<C> {
    client: C,
    prompt: String,
}

impl<C: VisionClient> LatexConverter<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            prompt: DEFAULT_CONVERT_PROMPT.to_string(),
        }
    }

    /// Override the instruction sent alongside the image.
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Access the underlying client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Convert a prepared image to LaTeX.
    #[instrument(skip(self, image), fields(mime_type = %image.mime_type))]
    pub async fn convert(&self, image: &ImageFile) -> Result<String> {
        info!("Converting image to LaTeX");
        let messages = [
            ChatMessage::system(CONVERT_SYSTEM_PROMPT),
            ChatMessage::user_with_image(&self.prompt, image.clone()),
        ];
        let reply = self.client.chat(&messages).await?;
        let latex = strip_latex_fences(&reply);
        debug!(latex_len = latex.len(), "Conversion complete");
        Ok(latex)
    }

    /// Load the image at `path` and convert it to LaTeX.
    pub async fn convert_path(&self, path: impl AsRef<Path>) -> Result<String> {
        let image = ImageFile::from_path(path)?;
        self.convert(&image).await
    }

    /// Merge multiple LaTeX snippets into a single coherent document.
    #[instrument(skip(self, snippets), fields(snippet_count = snippets.len()))]
    pub async fn combine(&self, snippets: &[String]) -> Result<String> {
        if snippets.is_empty() {
            return Err(LatexifyError::ConfigError(
                "no LaTeX snippets to combine".to_string(),
            ));
        }

        info!("Combining LaTeX snippets");
        let joined = snippets.join(SNIPPET_SEPARATOR);
        let prompt = format!(
            "Here are multiple LaTeX code snippets. Combine them into a single coherent LaTeX \
             document. Return ONLY the combined LaTeX code with no additional text or \
             formatting:\n\n{joined}"
        );
        let messages = [
            ChatMessage::system(COMBINE_SYSTEM_PROMPT),
            ChatMessage::user(prompt),
        ];
        let reply = self.client.chat(&messages).await?;
        Ok(strip_latex_fences(&reply))
    }
}
