#[cfg(feature = "grok")]
use crate::error::{LatexifyError, Result};
#[cfg(feature = "grok")]
use reqwest::Response;
#[cfg(feature = "grok")]
use tracing::error;

/// Extract LaTeX from a markdown code fence if present, otherwise return the
/// content trimmed.
///
/// Models frequently wrap their answer in ```latex ... ``` fences even when
/// told not to. This keeps the fenced body and drops the markers, including
/// a leading `latex` language tag.
pub(crate) fn strip_latex_fences(content: &str) -> String {
    let trimmed = content.trim();

    let Some(start) = trimmed.find("```") else {
        return trimmed.to_string();
    };

    let after = &trimmed[start + 3..];
    let after = after.strip_prefix("latex").unwrap_or(after);
    let inner = match after.find("```") {
        Some(end) => &after[..end],
        None => after,
    };
    inner.trim().to_string()
}

/// Convert a reqwest error to a LatexifyError, handling timeouts specially.
#[cfg(feature = "grok")]
pub(crate) fn handle_http_error(e: reqwest::Error) -> LatexifyError {
    error!(error = %e, "HTTP request to Grok API failed");
    if e.is_timeout() {
        LatexifyError::Timeout
    } else {
        LatexifyError::HttpError(e)
    }
}

/// Check HTTP response status and extract the error body if unsuccessful.
#[cfg(feature = "grok")]
pub(crate) async fn check_response_status(response: Response) -> Result<Response> {
    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await?;
        error!(
            status = %status,
            error = %error_text,
            "Grok API returned error response"
        );
        return Err(LatexifyError::ApiError(format!(
            "Grok API error ({status}): {error_text}"
        )));
    }
    Ok(response)
}
