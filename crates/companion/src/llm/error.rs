//! Upstream completion errors.

use thiserror::Error;

/// Errors that can occur when calling the completion API.
#[derive(Debug, Error)]
pub enum LLMError {
    /// Transport failure, or a body that did not decode.
    #[error("http request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-2xx response other than 429.
    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// 429 from the provider.
    #[error("rate limited{}", retry_hint(.retry_after))]
    RateLimit { retry_after: Option<u64> },
}

fn retry_hint(retry_after: &Option<u64>) -> String {
    match retry_after {
        Some(secs) => format!(" (retry after {secs}s)"),
        None => String::new(),
    }
}

/// Pass a successful response through; turn anything else into an `LLMError`.
///
/// 429 maps to `RateLimit` (honouring `retry-after` in seconds); other
/// statuses map to `Api` carrying the response body as the message.
pub async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response, LLMError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        return Err(LLMError::RateLimit { retry_after });
    }

    let message = response.text().await.unwrap_or_default();
    Err(LLMError::Api {
        status: status.as_u16(),
        message,
    })
}
