//! Shared JSON-over-HTTP plumbing and error classification.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use waypoint_core::BackendError;

/// Longest slice of an error body carried into a `BackendError`.
const MAX_ERROR_BODY: usize = 500;

pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client, BackendError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| BackendError::Unavailable(format!("Failed to build HTTP client: {e}")))
}

/// POST a JSON body and decode a JSON response.
pub(crate) async fn post_json<B, T>(
    client: &reqwest::Client,
    url: &str,
    headers: &[(&str, &str)],
    body: &B,
) -> Result<T, BackendError>
where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let mut request = client.post(url);
    for (key, value) in headers {
        request = request.header(*key, *value);
    }

    let response = request.json(body).send().await.map_err(classify_send_error)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(classify_status(status.as_u16(), &body));
    }

    response.json::<T>().await.map_err(|e| {
        if e.is_timeout() {
            BackendError::Timeout(e.to_string())
        } else {
            BackendError::InvalidResponse(e.to_string())
        }
    })
}

fn classify_send_error(e: reqwest::Error) -> BackendError {
    if e.is_timeout() {
        BackendError::Timeout(e.to_string())
    } else {
        BackendError::Network(e.to_string())
    }
}

fn classify_status(status: u16, body: &str) -> BackendError {
    let message = error_message(body);
    match status {
        429 => BackendError::RateLimited(message),
        _ => BackendError::Api { status, message },
    }
}

/// Pull `error.message` out of a JSON error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    let from_json = parsed.as_ref().and_then(|v| {
        v.pointer("/error/message")
            .or_else(|| v.get("message"))
            .and_then(|m| m.as_str())
            .map(str::to_string)
    });

    from_json.unwrap_or_else(|| body.chars().take(MAX_ERROR_BODY).collect())
}
