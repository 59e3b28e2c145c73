pub mod client;
#[cfg(feature = "grok")]
pub mod grok;
pub(crate) mod utils;

pub use client::{ChatMessage, Role, VisionClient};
#[cfg(feature = "grok")]
pub use grok::{GrokClient, GrokConfig, Model as GrokModel};
