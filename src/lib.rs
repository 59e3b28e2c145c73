//! latexify: convert images of formulas and documents to LaTeX using xAI's
//! Grok vision models.
//!
//! # Overview
//!
//! The crate wraps the OpenAI-compatible chat-completions endpoint at
//! `https://api.x.ai/v1`. An image is read from disk, base64-encoded into a
//! `data:` URI with its real MIME type detected from the content, and sent as
//! a multi-part user message (one text part, one image part). The reply is
//! cleaned of markdown fences and returned as LaTeX.
//!
//! # Quick Start
//!
//! ```no_run
//! use latexify::{GrokClient, LatexConverter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads XAI_API_KEY from the environment
//!     let client = GrokClient::from_env()?;
//!     let converter = LatexConverter::new(client);
//!
//!     let latex = converter.convert_path("formula.png").await?;
//!     println!("{latex}");
//!
//!     Ok(())
//! }
//! ```
//!
//! For lower-level access, [`GrokClient::query_with_image`] sends a raw
//! prompt + image pair, and the [`VisionClient`] trait lets other layers be
//! tested against scripted clients.

mod backend;
mod error;

pub mod convert;
#[cfg(feature = "logging")]
pub mod logging;
pub mod media;

// Re-exports for convenience
pub use backend::{ChatMessage, Role, VisionClient};
pub use convert::{DEFAULT_CONVERT_PROMPT, LatexConverter};
pub use error::{LatexifyError, Result};
pub use media::{ImageFile, encode_image};

#[cfg(feature = "grok")]
pub use backend::{GrokClient, GrokConfig, GrokModel};
