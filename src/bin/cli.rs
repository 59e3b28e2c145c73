//! Command-line image-to-LaTeX conversion.
//!
//! ```bash
//! export XAI_API_KEY=your_key_here
//! latexify image.png ["custom prompt"]
//! ```

use std::env;
use std::process::ExitCode;

use latexify::logging::{LogLevel, init_logging};
use latexify::{GrokClient, LatexConverter};

#[tokio::main]
async fn main() -> ExitCode {
    init_logging(LogLevel::Warn);

    let mut args = env::args().skip(1);
    let Some(image_path) = args.next() else {
        eprintln!("usage: latexify <image> [prompt]");
        return ExitCode::from(2);
    };
    let prompt = args.next();

    match run(&image_path, prompt).await {
        Ok(latex) => {
            println!("{latex}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("latexify: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(image_path: &str, prompt: Option<String>) -> latexify::Result<String> {
    let client = GrokClient::from_env()?;
    let mut converter = LatexConverter::new(client);
    if let Some(prompt) = prompt {
        converter = converter.prompt(prompt);
    }
    converter.convert_path(image_path).await
}
